use reqwest::Client;
use tracing::debug;

use crate::config::StashConfig;
use crate::error::{StashError, StashResult};

/// How requests to Stash are authenticated
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthState {
    /// `ApiKey` header sent with every request
    ApiKey,
    /// Session cookie obtained from `/login`
    Session,
    /// No credentials; `password_required` when the server has a password set
    Anonymous {
        username: String,
        password_required: bool,
    },
}

impl AuthState {
    /// Fail unless the session may use privileged GraphQL operations
    pub fn require(&self) -> StashResult<()> {
        match self {
            AuthState::Anonymous {
                username,
                password_required: true,
            } => Err(StashError::AuthenticationRequired {
                username: username.clone(),
            }),
            _ => Ok(()),
        }
    }
}

/// Pick the authentication method for a config and optional password, logging in if needed
///
/// The cookie set by `/login` lands in the client's cookie store and is reused by every later
/// request made through the same client.
pub async fn authenticate(
    client: &Client,
    cfg: &StashConfig,
    password: Option<&str>,
) -> StashResult<AuthState> {
    if !cfg.api_key.is_empty() {
        debug!("using API key authentication");
        return Ok(AuthState::ApiKey);
    }

    match password {
        Some(password) if !cfg.username.is_empty() => {
            login(client, &cfg.login_url(), &cfg.username, password).await?;
            Ok(AuthState::Session)
        }
        _ => Ok(AuthState::Anonymous {
            username: cfg.username.clone(),
            password_required: cfg.password_set,
        }),
    }
}

async fn login(client: &Client, login_url: &str, username: &str, password: &str) -> StashResult<()> {
    println!("Authenticating with Stash...");

    let response = client
        .post(login_url)
        .form(&[
            ("username", username),
            ("password", password),
            ("returnURL", "/"),
        ])
        .send()
        .await
        .map_err(|e| StashError::Authentication(e.to_string()))?;

    let status = response.status();
    debug!(%status, url = %response.url(), "login response");
    if !status.is_success() {
        return Err(StashError::Authentication(format!(
            "Unexpected response from Stash while authenticating ({})",
            status
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(api_key: &str, username: &str, password_set: bool) -> StashConfig {
        StashConfig {
            host: "localhost".into(),
            port: "9999".into(),
            username: username.into(),
            password_set,
            api_key: api_key.into(),
            ssl: false,
        }
    }

    #[tokio::test]
    async fn test_api_key_wins() {
        let client = Client::new();
        let state = authenticate(&client, &config("key", "admin", true), Some("secret"))
            .await
            .unwrap();
        assert_eq!(state, AuthState::ApiKey);
        assert!(state.require().is_ok());
    }

    #[tokio::test]
    async fn test_anonymous_without_password() {
        let client = Client::new();
        let state = authenticate(&client, &config("", "admin", true), None)
            .await
            .unwrap();
        assert_eq!(
            state,
            AuthState::Anonymous {
                username: "admin".into(),
                password_required: true
            }
        );
        let err = state.require().unwrap_err();
        assert!(err.is_auth());
    }

    fn server_config(server: &wiremock::MockServer, username: &str) -> StashConfig {
        let content = format!(
            "host: 127.0.0.1\nport: {}\nusername: {}\npassword: hash\n",
            server.address().port(),
            username
        );
        StashConfig::parse(&content, false).unwrap()
    }

    #[tokio::test]
    async fn test_login_posts_form() {
        let server = wiremock::MockServer::start().await;
        wiremock::Mock::given(wiremock::matchers::method("POST"))
            .and(wiremock::matchers::path("/login"))
            .and(wiremock::matchers::header(
                "content-type",
                "application/x-www-form-urlencoded",
            ))
            .and(wiremock::matchers::body_string(
                "username=admin&password=pw&returnURL=%2F",
            ))
            .respond_with(
                wiremock::ResponseTemplate::new(200).insert_header("set-cookie", "session=abc; Path=/"),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = Client::builder().cookie_store(true).build().unwrap();
        let state = authenticate(&client, &server_config(&server, "admin"), Some("pw"))
            .await
            .unwrap();
        assert_eq!(state, AuthState::Session);
        assert!(state.require().is_ok());
    }

    #[tokio::test]
    async fn test_login_rejected() {
        let server = wiremock::MockServer::start().await;
        wiremock::Mock::given(wiremock::matchers::method("POST"))
            .and(wiremock::matchers::path("/login"))
            .respond_with(wiremock::ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let client = Client::new();
        let err = authenticate(&client, &server_config(&server, "admin"), Some("wrong"))
            .await
            .unwrap_err();
        assert!(err.is_auth());
        assert!(err.to_string().contains("401"));
    }

    #[tokio::test]
    async fn test_password_without_username_skips_login() {
        let server = wiremock::MockServer::start().await;
        wiremock::Mock::given(wiremock::matchers::method("POST"))
            .and(wiremock::matchers::path("/login"))
            .respond_with(wiremock::ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let client = Client::new();
        let state = authenticate(&client, &server_config(&server, ""), Some("pw"))
            .await
            .unwrap();
        assert!(matches!(state, AuthState::Anonymous { .. }));
    }

    #[tokio::test]
    async fn test_anonymous_open_server() {
        let client = Client::new();
        let state = authenticate(&client, &config("", "", false), None)
            .await
            .unwrap();
        assert!(state.require().is_ok());
    }
}
