use thiserror::Error;

use crate::http::graphql::{GraphQLError, format_graphql_errors};

pub type StashResult<T> = Result<T, StashError>;

/// Errors returned while talking to a Stash server
#[derive(Debug, Error)]
pub enum StashError {
    #[error("Unable to connect to Stash")]
    Connection(#[source] reqwest::Error),

    #[error("Request to Stash failed")]
    Request(#[source] reqwest::Error),

    #[error("Unable to authenticate with Stash: {0}")]
    Authentication(String),

    #[error("Password required for user {username}, provide it using `-p password`.")]
    AuthenticationRequired { username: String },

    #[error("GraphQL Errors:\n{}", format_graphql_errors(.0))]
    GraphQL(Vec<GraphQLError>),

    #[error("Invalid API response ({status}):\n{body}")]
    InvalidResponse { status: u16, body: String },

    #[error("No scraper returned a result for {0}")]
    NoScraperMatch(String),

    #[error("URL must not be empty")]
    EmptyUrl,
}

impl StashError {
    pub fn is_auth(&self) -> bool {
        matches!(
            self,
            StashError::Authentication(_) | StashError::AuthenticationRequired { .. }
        )
    }

    /// Unreachable server or rejected credentials stop the whole run
    pub fn is_fatal(&self) -> bool {
        self.is_auth() || matches!(self, StashError::Connection(_))
    }
}

impl From<reqwest::Error> for StashError {
    fn from(err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) if status.as_u16() == 401 || status.as_u16() == 403 => {
                StashError::Authentication(status.to_string())
            }
            _ if err.is_connect() => StashError::Connection(err),
            _ => StashError::Request(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_auth() {
        assert!(StashError::Authentication("401".into()).is_auth());
        assert!(
            StashError::AuthenticationRequired {
                username: "admin".into()
            }
            .is_auth()
        );
        assert!(!StashError::EmptyUrl.is_auth());
        assert!(!StashError::NoScraperMatch("https://example.com".into()).is_auth());
    }

    #[test]
    fn test_is_fatal() {
        assert!(StashError::Authentication("403 Forbidden".into()).is_fatal());
        assert!(!StashError::EmptyUrl.is_fatal());
        assert!(
            !StashError::InvalidResponse {
                status: 500,
                body: String::new()
            }
            .is_fatal()
        );
    }

    #[test]
    fn test_authentication_required_message() {
        let err = StashError::AuthenticationRequired {
            username: "admin".into(),
        };
        assert_eq!(
            err.to_string(),
            "Password required for user admin, provide it using `-p password`."
        );
    }
}
