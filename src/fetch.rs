use log::debug;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE};
use reqwest::Client;
use std::time::Duration;

use crate::config::FetchConfig;
use crate::error::RecipeError;

const ACCEPT_HTML: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";
const ACCEPT_LANGUAGE_EN: &str = "en-US,en;q=0.9";

/// Fetches recipe pages: one GET per call, no retry.
pub struct RequestFetcher {
    client: Client,
}

impl RequestFetcher {
    pub fn new(config: &FetchConfig) -> Result<Self, RecipeError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_HTML));
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static(ACCEPT_LANGUAGE_EN));

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout))
            .user_agent(config.user_agent.as_str())
            .default_headers(headers)
            .build()?;

        Ok(Self { client })
    }

    /// Body of the page at `url`. A non-2xx status is an error.
    pub async fn fetch(&self, url: &str) -> Result<String, RecipeError> {
        debug!("Fetching {url}");
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(RecipeError::UpstreamStatus(status.as_u16()));
        }
        let html = response.text().await?;
        debug!("Fetched {} bytes from {url}", html.len());
        Ok(html)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};

    #[tokio::test]
    async fn test_fetch_sends_browser_headers() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/page")
            .match_header("user-agent", Matcher::Regex("^Mozilla/5.0".to_string()))
            .match_header("accept", Matcher::Regex("text/html".to_string()))
            .match_header("accept-language", "en-US,en;q=0.9")
            .with_status(200)
            .with_body("<html></html>")
            .create_async()
            .await;

        let fetcher = RequestFetcher::new(&FetchConfig::default()).unwrap();
        let body = fetcher.fetch(&format!("{}/page", server.url())).await.unwrap();

        assert_eq!(body, "<html></html>");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_non_success_status_is_terminal() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/missing")
            .with_status(404)
            .expect(1)
            .create_async()
            .await;

        let fetcher = RequestFetcher::new(&FetchConfig::default()).unwrap();
        let result = fetcher.fetch(&format!("{}/missing", server.url())).await;

        assert!(matches!(result, Err(RecipeError::UpstreamStatus(404))));
        mock.assert_async().await;
    }
}
