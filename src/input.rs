use anyhow::{Context, Result};
use std::collections::VecDeque;
use std::fs;
use std::path::Path;

use crate::prompt::Prompter;
use crate::utils::parse_url_lines;

/// Where the URLs to scrape come from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UrlSource {
    /// URLs known up front, from the argument or a list file
    Batch { urls: VecDeque<String>, total: usize },
    /// URLs typed (or piped) on stdin, read one at a time
    Interactive { started: bool },
}

impl UrlSource {
    /// Resolve the positional argument and `--list` flag into a source
    pub fn resolve(urls: Option<&str>, is_list: bool) -> Result<Self> {
        match (urls, is_list) {
            (None, true) => anyhow::bail!("`--list` requires a file path."),
            (None, false) => Ok(UrlSource::Interactive { started: false }),
            (Some(path), true) => Self::from_list_file(Path::new(path)),
            (Some(text), false) => Ok(Self::batch(parse_url_lines(text))),
        }
    }

    pub fn from_list_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Unable to read file {}", path.display()))?;
        Ok(Self::batch(parse_url_lines(&content)))
    }

    fn batch(urls: Vec<String>) -> Self {
        let total = urls.len();
        UrlSource::Batch {
            urls: urls.into(),
            total,
        }
    }

    /// Number of URLs, when known in advance
    pub fn total(&self) -> Option<usize> {
        match self {
            UrlSource::Batch { total, .. } => Some(*total),
            UrlSource::Interactive { .. } => None,
        }
    }

    /// Next URL to scrape, `None` once the input is exhausted
    ///
    /// On a terminal an empty answer ends the input. Piped input skips blank lines
    /// and ends at end of file.
    pub fn next_url(&mut self, prompter: &mut dyn Prompter) -> Result<Option<String>> {
        match self {
            UrlSource::Batch { urls, .. } => Ok(urls.pop_front()),
            UrlSource::Interactive { started } => {
                let prompt = if *started {
                    "\nEnter next URL to scrape (empty to stop):\n>> "
                } else {
                    "\nEnter first URL to scrape:\n>> "
                };
                *started = true;

                let interactive = prompter.is_interactive();
                while let Some(line) = prompter.read_line(prompt)? {
                    let url = line.trim();
                    if !url.is_empty() {
                        return Ok(Some(url.to_string()));
                    }
                    if interactive {
                        break;
                    }
                }
                Ok(None)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompt::ScriptedPrompter;
    use tempfile::NamedTempFile;

    fn drain(source: &mut UrlSource, prompter: &mut dyn Prompter) -> Vec<String> {
        let mut urls = Vec::new();
        while let Some(url) = source.next_url(prompter).unwrap() {
            urls.push(url);
        }
        urls
    }

    #[test]
    fn test_inline_argument() {
        let mut source = UrlSource::resolve(Some(" https://a.example/1 \nhttps://b.example/2"), false).unwrap();
        assert_eq!(source.total(), Some(2));
        let mut prompter = ScriptedPrompter::new(&[], true);
        assert_eq!(
            drain(&mut source, &mut prompter),
            vec!["https://a.example/1", "https://b.example/2"]
        );
        assert!(prompter.prompts.is_empty());
    }

    #[test]
    fn test_list_file() {
        let file = NamedTempFile::new().unwrap();
        fs::write(file.path(), "https://a.example/1\n\n  https://b.example/2\n\n").unwrap();
        let path = file.path().to_str().unwrap();

        let mut source = UrlSource::resolve(Some(path), true).unwrap();
        assert_eq!(source.total(), Some(2));
        let mut prompter = ScriptedPrompter::new(&[], false);
        assert_eq!(
            drain(&mut source, &mut prompter),
            vec!["https://a.example/1", "https://b.example/2"]
        );
    }

    #[test]
    fn test_empty_list_file() {
        let file = NamedTempFile::new().unwrap();
        let mut source = UrlSource::from_list_file(file.path()).unwrap();
        assert_eq!(source.total(), Some(0));
        let mut prompter = ScriptedPrompter::new(&[], false);
        assert!(source.next_url(&mut prompter).unwrap().is_none());
    }

    #[test]
    fn test_missing_list_file() {
        let err = UrlSource::resolve(Some("/nonexistent/urls.txt"), true).unwrap_err();
        assert!(err.to_string().contains("Unable to read file"));
    }

    #[test]
    fn test_list_flag_without_path() {
        assert!(UrlSource::resolve(None, true).is_err());
    }

    #[test]
    fn test_interactive_terminal_stops_on_empty() {
        let mut source = UrlSource::resolve(None, false).unwrap();
        assert_eq!(source.total(), None);
        let mut prompter = ScriptedPrompter::new(&["https://a.example/1", " ", "https://b.example/2"], true);
        assert_eq!(drain(&mut source, &mut prompter), vec!["https://a.example/1"]);
        assert_eq!(prompter.prompts[0], "\nEnter first URL to scrape:\n>> ");
        assert_eq!(prompter.prompts[1], "\nEnter next URL to scrape (empty to stop):\n>> ");
    }

    #[test]
    fn test_interactive_piped_reads_until_eof() {
        let mut source = UrlSource::resolve(None, false).unwrap();
        let mut prompter =
            ScriptedPrompter::new(&["https://a.example/1", "", "  https://b.example/2  ", ""], false);
        assert_eq!(
            drain(&mut source, &mut prompter),
            vec!["https://a.example/1", "https://b.example/2"]
        );
        // exhausted input stays exhausted
        assert!(source.next_url(&mut prompter).unwrap().is_none());
    }
}
