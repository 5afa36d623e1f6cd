use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use crate::error::{StashError, StashResult};
use crate::types::ObjectType;

/// A scraped object as returned by Stash, field name to value
pub type ScrapedObject = Map<String, Value>;

/// A GraphQL operation sent to Stash
#[derive(Debug, Clone, PartialEq)]
pub struct GraphQLQuery {
    pub operation_name: &'static str,
    /// Name of the field in `data` that holds the result
    pub object_name: &'static str,
    pub query: String,
    pub variables: Value,
}

impl GraphQLQuery {
    pub fn to_json(&self) -> Value {
        json!({
            "operationName": self.operation_name,
            "query": self.query,
            "variables": self.variables,
        })
    }
}

const SCENE_FIELDS: &str = "
    title
    details
    url
    date
    image

    studio {
      name
    }

    tags {
      name
    }

    performers {
      name
      url
    }

    movies {
      name
    }";

const MOVIE_FIELDS: &str = "
    name
    aliases
    duration
    date
    rating
    director
    url
    synopsis

    studio {
      name
    }

    front_image
    back_image";

const GALLERY_FIELDS: &str = "
    title
    details
    url
    date

    studio {
      name
    }

    tags {
      name
    }

    performers {
      name
      url
    }";

/// `mutation ReloadScrapers { reloadScrapers }`
pub fn reload_scrapers() -> GraphQLQuery {
    let operation_name = "ReloadScrapers";
    let object_name = "reloadScrapers";
    GraphQLQuery {
        operation_name,
        object_name,
        query: format!("mutation {} {{\n  {}\n}}", operation_name, object_name),
        variables: json!({}),
    }
}

/// Scrape-by-URL query for the given object type
pub fn scrape_url(object_type: ObjectType, url: &str) -> GraphQLQuery {
    let (operation_name, object_name, fields) = match object_type {
        ObjectType::Scene => ("ScrapeSceneURL", "scrapeSceneURL", SCENE_FIELDS),
        ObjectType::Movie => ("ScrapeMovieURL", "scrapeMovieURL", MOVIE_FIELDS),
        ObjectType::Gallery => ("ScrapeGalleryURL", "scrapeGalleryURL", GALLERY_FIELDS),
    };
    GraphQLQuery {
        operation_name,
        object_name,
        query: format!(
            "query {}($url: String!) {{\n  {}(url: $url) {{{}\n  }}\n}}",
            operation_name, object_name, fields
        ),
        variables: json!({ "url": url }),
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct ErrorLocation {
    pub line: u64,
    pub column: u64,
}

/// One entry of a GraphQL `errors` array
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct GraphQLError {
    pub message: String,
    #[serde(default)]
    pub locations: Vec<ErrorLocation>,
    #[serde(default)]
    pub path: Vec<Value>,
    #[serde(default)]
    pub extensions: Option<Value>,
}

impl GraphQLError {
    fn code(&self) -> Option<&str> {
        self.extensions.as_ref()?.get("code")?.as_str()
    }
}

/// Render GraphQL errors one per line, with their location or path when known
pub fn format_graphql_errors(errors: &[GraphQLError]) -> String {
    let mut lines = Vec::new();
    for error in errors {
        if !error.locations.is_empty() {
            let code = error.code().unwrap_or("UNKNOWN");
            for location in &error.locations {
                lines.push(format!(
                    "At line {} column {}",
                    location.line, location.column
                ));
                lines.push(format!("  [{}] {}", code, error.message));
            }
        } else if !error.path.is_empty() {
            let path = error
                .path
                .iter()
                .map(|p| match p {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                })
                .collect::<Vec<_>>()
                .join("/");
            lines.push(format!("At path /{}: {}", path, error.message));
        } else {
            lines.push(error.message.clone());
        }
    }
    lines.join("\n")
}

#[derive(Deserialize, Debug)]
struct GraphQLResponse {
    #[serde(default)]
    data: Option<Value>,
    #[serde(default)]
    errors: Option<Vec<GraphQLError>>,
}

/// Extract the `data.<object_name>` value from a raw response body
///
/// Returns `Ok(None)` when the server answered without data for the field.
pub fn parse_response(query: &GraphQLQuery, status: u16, body: &str) -> StashResult<Option<Value>> {
    let response: GraphQLResponse =
        serde_json::from_str(body).map_err(|_| StashError::InvalidResponse {
            status,
            body: body.to_string(),
        })?;

    if let Some(errors) = response.errors
        && !errors.is_empty()
    {
        return Err(StashError::GraphQL(errors));
    }

    Ok(response
        .data
        .and_then(|mut data| data.get_mut(query.object_name).map(Value::take))
        .filter(|value| !value.is_null()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reload_query() {
        let query = reload_scrapers();
        assert_eq!(query.query, "mutation ReloadScrapers {\n  reloadScrapers\n}");
        let body = query.to_json();
        assert_eq!(body["operationName"], "ReloadScrapers");
        assert_eq!(body["variables"], json!({}));
    }

    #[test]
    fn test_scrape_queries_per_type() {
        let scene = scrape_url(ObjectType::Scene, "https://example.com/s/1");
        assert_eq!(scene.object_name, "scrapeSceneURL");
        assert!(scene.query.starts_with("query ScrapeSceneURL($url: String!)"));
        assert!(scene.query.contains("scrapeSceneURL(url: $url)"));
        assert!(scene.query.contains("image"));
        assert_eq!(scene.to_json()["variables"]["url"], "https://example.com/s/1");

        let movie = scrape_url(ObjectType::Movie, "https://example.com/m/1");
        assert_eq!(movie.operation_name, "ScrapeMovieURL");
        assert!(movie.query.contains("front_image"));

        let gallery = scrape_url(ObjectType::Gallery, "https://example.com/g/1");
        assert_eq!(gallery.object_name, "scrapeGalleryURL");
        assert!(!gallery.query.contains("image"));
        assert!(!gallery.query.contains("movies"));
    }

    #[test]
    fn test_parse_response_data() {
        let query = scrape_url(ObjectType::Scene, "https://example.com");
        let body = r#"{"data":{"scrapeSceneURL":{"title":"A title"}}}"#;
        let value = parse_response(&query, 200, body).unwrap().unwrap();
        assert_eq!(value["title"], "A title");
    }

    #[test]
    fn test_parse_response_null_result() {
        let query = scrape_url(ObjectType::Scene, "https://example.com");
        assert_eq!(
            parse_response(&query, 200, r#"{"data":{"scrapeSceneURL":null}}"#).unwrap(),
            None
        );
        assert_eq!(parse_response(&query, 200, r#"{"data":null}"#).unwrap(), None);
    }

    #[test]
    fn test_parse_response_invalid_json() {
        let query = reload_scrapers();
        match parse_response(&query, 502, "Bad Gateway") {
            Err(StashError::InvalidResponse { status, body }) => {
                assert_eq!(status, 502);
                assert_eq!(body, "Bad Gateway");
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_parse_response_errors() {
        let query = scrape_url(ObjectType::Scene, "https://example.com");
        let body = r#"{
            "errors": [
                {"message": "Cannot query field", "locations": [{"line": 3, "column": 5}], "extensions": {"code": "GRAPHQL_VALIDATION_FAILED"}},
                {"message": "scraper failed", "path": ["scrapeSceneURL", 0]}
            ],
            "data": null
        }"#;
        let Err(StashError::GraphQL(errors)) = parse_response(&query, 422, body) else {
            panic!("expected GraphQL errors");
        };
        assert_eq!(
            format_graphql_errors(&errors),
            "At line 3 column 5\n  [GRAPHQL_VALIDATION_FAILED] Cannot query field\nAt path /scrapeSceneURL/0: scraper failed"
        );
    }
}
