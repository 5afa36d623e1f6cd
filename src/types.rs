use clap::Parser;
use std::ffi::OsString;
use std::fmt;
use std::path::PathBuf;

use crate::constants::{NO_RELOAD_SHORT_ALIAS, VALUE_OPTIONS, default_config_path};

/// Type of object to scrape
#[derive(clap::ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ObjectType {
    #[default]
    Scene,
    Movie,
    Gallery,
}

impl fmt::Display for ObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ObjectType::Scene => write!(f, "scene"),
            ObjectType::Movie => write!(f, "movie"),
            ObjectType::Gallery => write!(f, "gallery"),
        }
    }
}

/// Test Stash scrapers by scraping one or more URLs and printing the result.
#[derive(Parser, Debug, Clone)]
#[command(name = "scrape_url", author, version, about, long_about = None)]
pub struct Cli {
    /// URL(s) to scrape - one per line, a path to a list file (with `--list`), or nothing for continuous input.
    pub urls: Option<String>,

    /// Load URLs list from the provided list file path.
    #[arg(short = 'l', long = "list", requires = "urls")]
    pub is_list: bool,

    // STASH
    /// Stash config path.
    #[arg(short, long, default_value_os_t = default_config_path(), help_heading = "STASH")]
    pub config: PathBuf,

    /// Stash password, if set. Required in order to use GraphQL.
    #[arg(short, long, allow_hyphen_values = true, help_heading = "STASH")]
    pub password: Option<String>,

    // SCRAPE
    /// Type of scraped object.
    #[arg(short = 't', long = "type", value_enum, default_value_t = ObjectType::Scene, help_heading = "SCRAPE")]
    pub object_type: ObjectType,

    /// Reload the scrapers and clear the scraper cache before scraping (default).
    #[arg(short = 'r', long, conflicts_with = "no_reload", help_heading = "SCRAPE")]
    pub reload: bool,

    /// Disable reloading the scrapers and clearing the scraper cache before scraping. Also `-nr`.
    #[arg(long, help_heading = "SCRAPE")]
    pub no_reload: bool,

    /// Answer every prompt with "yes" (continue batches, show images).
    #[arg(short = 'y', long, help_heading = "SCRAPE")]
    pub yes: bool,

    // NETWORK
    /// Timeout for each request in seconds.
    #[arg(long, default_value_t = 30, help_heading = "NETWORK")]
    pub timeout: u64,

    /// Verify SSL certificates (default: false, Stash usually runs with a self-signed certificate).
    #[arg(long, default_value_t = false, help_heading = "NETWORK")]
    pub verify_ssl: bool,

    // OUTPUT
    /// Disable color output.
    #[arg(long, help_heading = "OUTPUT")]
    pub no_color: bool,
}

impl Cli {
    /// Parse arguments from the process environment, accepting `-nr` for `--no-reload`
    pub fn parse_args() -> Self {
        Self::parse_from(normalize_args(std::env::args_os()))
    }

    pub fn should_reload(&self) -> bool {
        self.reload || !self.no_reload
    }
}

/// Rewrite the two-letter `-nr` flag, which clap cannot express as a short option
///
/// Option values and anything after `--` are left alone.
pub fn normalize_args<I>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = OsString>,
{
    let mut expects_value = false;
    let mut after_separator = false;
    args.into_iter()
        .map(|arg| {
            let rewrite = !expects_value && !after_separator && arg == NO_RELOAD_SHORT_ALIAS;
            after_separator |= !expects_value && arg == "--";
            expects_value = !after_separator
                && !expects_value
                && VALUE_OPTIONS.iter().any(|opt| arg == *opt);
            if rewrite {
                OsString::from("--no-reload")
            } else {
                arg
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
        let args = std::iter::once("scrape_url")
            .chain(args.iter().copied())
            .map(OsString::from);
        Cli::try_parse_from(normalize_args(args))
    }

    #[test]
    fn test_defaults() {
        let cli = parse(&[]).unwrap();
        assert_eq!(cli.urls, None);
        assert!(!cli.is_list);
        assert_eq!(cli.object_type, ObjectType::Scene);
        assert!(cli.should_reload());
        assert!(cli.config.ends_with("config.yml"));
    }

    #[test]
    fn test_short_no_reload_alias() {
        let cli = parse(&["-nr", "https://example.com/scene/1"]).unwrap();
        assert!(!cli.should_reload());
        assert_eq!(cli.urls.as_deref(), Some("https://example.com/scene/1"));
    }

    #[test]
    fn test_no_reload_alias_as_option_value() {
        let cli = parse(&["-p", "-nr", "https://example.com/scene/1"]).unwrap();
        assert_eq!(cli.password.as_deref(), Some("-nr"));
        assert!(cli.should_reload());
        assert_eq!(cli.urls.as_deref(), Some("https://example.com/scene/1"));
    }

    #[test]
    fn test_no_reload_alias_after_separator() {
        let args = normalize_args(["scrape_url", "-nr", "--", "-nr"].map(OsString::from));
        assert_eq!(args, ["scrape_url", "--no-reload", "--", "-nr"].map(OsString::from));

        let cli = parse(&["--", "-nr"]).unwrap();
        assert!(cli.should_reload());
        assert_eq!(cli.urls.as_deref(), Some("-nr"));
    }

    #[test]
    fn test_reload_flags_conflict() {
        assert!(parse(&["--reload", "--no-reload"]).is_err());
        assert!(parse(&["-r", "-nr"]).is_err());
    }

    #[test]
    fn test_list_requires_path() {
        let err = parse(&["--list"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);
        assert!(parse(&["-l", "urls.txt"]).unwrap().is_list);
    }

    #[test]
    fn test_object_type_values() {
        let cli = parse(&["-t", "movie", "-c", "/tmp/config.yml", "-p", "secret"]).unwrap();
        assert_eq!(cli.object_type, ObjectType::Movie);
        assert_eq!(cli.config, PathBuf::from("/tmp/config.yml"));
        assert_eq!(cli.password.as_deref(), Some("secret"));
        assert!(parse(&["-t", "performer"]).is_err());
    }
}
