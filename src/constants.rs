use std::path::PathBuf;

/// Stash connection constants
pub const DEFAULT_HOST: &str = "localhost";
pub const DEFAULT_PORT: u16 = 9999;
pub const BIND_ALL_HOST: &str = "0.0.0.0";
pub const GRAPHQL_PATH: &str = "/graphql";
pub const LOGIN_PATH: &str = "/login";
pub const API_KEY_HEADER: &str = "ApiKey";

/// Stash config layout
pub const STASH_DIR: &str = ".stash";
pub const CONFIG_FILE: &str = "config.yml";
pub const SSL_CERT_FILE: &str = "stash.crt";
pub const SSL_KEY_FILE: &str = "stash.key";

/// CLI constants
pub const NO_RELOAD_SHORT_ALIAS: &str = "-nr";
/// Options whose next argument is a value, never a flag
pub const VALUE_OPTIONS: [&str; 7] = ["-c", "--config", "-p", "--password", "-t", "--type", "--timeout"];

/// Output constants
pub const TAGS_PER_LINE: usize = 7;
pub const INDENT: &str = "  ";

/// Default Stash config path: `~/.stash/config.yml`
pub fn default_config_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(STASH_DIR)
        .join(CONFIG_FILE)
}
