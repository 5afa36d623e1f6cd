use anyhow::Result;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

use crate::config::StashConfig;
use crate::error::{StashError, StashResult};
use crate::http::graphql::{self, GraphQLQuery, ScrapedObject};
use crate::http::headers::stash_headers;
use crate::http::session::{AuthState, authenticate};
use crate::types::{Cli, ObjectType};

/// Scraper operations offered by a Stash server
#[async_trait]
pub trait ScraperApi {
    /// Clear the scraper cache and reload scraper definitions
    async fn reload_scrapers(&self) -> StashResult<bool>;

    /// Scrape `url` as the given object type
    async fn scrape_url(&self, object_type: ObjectType, url: &str) -> StashResult<ScrapedObject>;
}

/// Build HTTP client from CLI configuration
pub fn build_http_client(cli: &Cli, cfg: &StashConfig) -> Result<Client> {
    let mut client_builder = Client::builder()
        .timeout(Duration::from_secs(cli.timeout))
        .cookie_store(true)
        .default_headers(stash_headers(&cfg.api_key));

    // Stash usually serves a self-signed certificate
    if !cli.verify_ssl {
        client_builder = client_builder.danger_accept_invalid_certs(true);
    }

    Ok(client_builder.build()?)
}

/// GraphQL client for a single Stash server
pub struct StashClient {
    client: Client,
    endpoint: String,
    auth: AuthState,
}

impl StashClient {
    /// Build the HTTP client and authenticate against the server
    pub async fn connect(cli: &Cli, cfg: &StashConfig) -> Result<Self> {
        let client = build_http_client(cli, cfg)?;
        let auth = authenticate(&client, cfg, cli.password.as_deref()).await?;
        debug!(endpoint = %cfg.graphql_url(), ?auth, "connected to Stash");
        Ok(Self {
            client,
            endpoint: cfg.graphql_url(),
            auth,
        })
    }

    async fn call(&self, query: &GraphQLQuery) -> StashResult<Option<Value>> {
        debug!(operation = query.operation_name, "sending GraphQL request");
        let response = self
            .client
            .post(&self.endpoint)
            .json(&query.to_json())
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(StashError::Authentication(status.to_string()));
        }

        let body = response.text().await?;
        graphql::parse_response(query, status.as_u16(), &body)
    }
}

#[async_trait]
impl ScraperApi for StashClient {
    async fn reload_scrapers(&self) -> StashResult<bool> {
        self.auth.require()?;
        println!("Reloading scrapers...");

        let result = self.call(&graphql::reload_scrapers()).await?;
        Ok(result.and_then(|v| v.as_bool()).unwrap_or(false))
    }

    async fn scrape_url(&self, object_type: ObjectType, url: &str) -> StashResult<ScrapedObject> {
        let url = url.trim();
        if url.is_empty() {
            return Err(StashError::EmptyUrl);
        }
        println!("Scraping {} URL {}", object_type, url);

        match self.call(&graphql::scrape_url(object_type, url)).await? {
            Some(Value::Object(object)) if !object.is_empty() => Ok(object),
            Some(Value::Object(_)) | None => Err(StashError::NoScraperMatch(url.to_string())),
            Some(other) => Err(StashError::InvalidResponse {
                status: StatusCode::OK.as_u16(),
                body: other.to_string(),
            }),
        }
    }
}
