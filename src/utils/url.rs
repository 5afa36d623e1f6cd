/// Split text into URLs: one per line, trimmed, blank lines dropped, order kept
pub fn parse_url_lines(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}
