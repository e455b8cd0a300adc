//! Framework-free handler for `GET ?url=` parse requests.
//!
//! The handler produces status, headers and JSON body; wiring it into an
//! HTTP server is left to the caller.

use log::{error, info};
use regex::Regex;
use serde_json::{json, Value};
use std::sync::LazyLock;

use crate::config::Settings;
use crate::error::RecipeError;
use crate::model::RecipeResponse;

static HTTP_URL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)^https?://").unwrap());

pub const CORS_HEADERS: &[(&str, &str)] = &[
    ("Access-Control-Allow-Origin", "*"),
    ("Access-Control-Allow-Methods", "GET, OPTIONS"),
    ("Access-Control-Allow-Headers", "Content-Type"),
];

const INVALID_URL_MESSAGE: &str = "Missing or invalid ?url";
const PARSE_FAILED_MESSAGE: &str = "Failed to parse this page.";

#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    /// `None` for the empty preflight body
    pub body: Option<Value>,
}

impl ApiResponse {
    fn new(status: u16, body: Option<Value>) -> Self {
        Self {
            status,
            headers: CORS_HEADERS
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            body,
        }
    }

    fn error(status: u16, message: &str) -> Self {
        Self::new(status, Some(json!({ "error": message })))
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Check that `url` is present and starts with http:// or https://.
pub fn validate_url(url: Option<&str>) -> Result<&str, RecipeError> {
    match url.map(str::trim) {
        Some(url) if HTTP_URL.is_match(url) => Ok(url),
        other => Err(RecipeError::InvalidUrl(other.unwrap_or_default().to_string())),
    }
}

/// Answer a request with the given method and `url` query parameter.
pub async fn handle_request(method: &str, url: Option<&str>, settings: &Settings) -> ApiResponse {
    if method.eq_ignore_ascii_case("OPTIONS") {
        return ApiResponse::new(200, None);
    }

    let url = match validate_url(url) {
        Ok(url) => url,
        Err(e) => {
            info!("Rejected request: {e}");
            return ApiResponse::error(400, INVALID_URL_MESSAGE);
        }
    };

    match crate::fetch_recipe_with_settings(url, settings).await {
        Ok(recipe) => match serde_json::to_value(RecipeResponse::from(recipe)) {
            Ok(body) => ApiResponse::new(200, Some(body)),
            Err(e) => {
                error!("Failed to serialize recipe from {url}: {e}");
                ApiResponse::error(500, PARSE_FAILED_MESSAGE)
            }
        },
        Err(e) => {
            error!("Failed to parse {url}: {e}");
            ApiResponse::error(500, PARSE_FAILED_MESSAGE)
        }
    }
}
