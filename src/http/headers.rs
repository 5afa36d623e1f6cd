use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};

use crate::constants::API_KEY_HEADER;

/// Default headers for every request to Stash, including the API key when configured
pub fn stash_headers(api_key: &str) -> HeaderMap {
    let mut header_map = HeaderMap::new();
    header_map.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

    if api_key.is_empty() {
        return header_map;
    }

    match HeaderValue::from_str(api_key.trim()) {
        Ok(mut value) => {
            value.set_sensitive(true);
            header_map.insert(HeaderName::from_static("apikey"), value);
        }
        Err(_) => {
            eprintln!(
                "[Warning] Invalid value for the {} header, ignoring the configured API key",
                API_KEY_HEADER
            );
        }
    }
    header_map
}
