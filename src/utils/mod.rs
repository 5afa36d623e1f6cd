pub mod url;

pub use url::parse_url_lines;
