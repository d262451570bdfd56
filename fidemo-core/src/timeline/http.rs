//! HTTP client for the live Timeline API

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;

use async_trait::async_trait;

use crate::config::BackendConfig;
use crate::error::{Error, Result};
use crate::types::{SessionDetail, SessionSummary, SummaryQuery, TimelineStats};

use super::TimelineApi;

/// Client for `GET /api/timeline/...` endpoints
pub struct HttpTimelineClient {
    http_client: reqwest::Client,
    base_url: String,
}

impl HttpTimelineClient {
    /// Create a client from backend configuration.
    ///
    /// Returns an error if `backend.url` is missing or not an http(s) URL.
    pub fn new(config: &BackendConfig) -> Result<Self> {
        config.validate()?;

        let base_url = config
            .url
            .clone()
            .ok_or_else(|| Error::Config("backend.url is required".to_string()))?
            .trim_end_matches('/')
            .to_string();

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .default_headers(headers)
            .build()
            .map_err(|e| Error::Config(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            base_url,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn sessions_url(&self, query: &SummaryQuery) -> String {
        format!(
            "{}/api/timeline/sessions?limit={}&offset={}&sort={}",
            self.base_url, query.limit, query.offset, query.sort
        )
    }

    fn session_url(&self, session_id: &str) -> String {
        format!(
            "{}/api/timeline/sessions/{}",
            self.base_url,
            urlencoding::encode(session_id)
        )
    }

    fn stats_url(&self) -> String {
        format!("{}/api/timeline/stats", self.base_url)
    }

    /// GET `url` and decode the JSON body; `Ok(None)` on 404.
    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<Option<T>> {
        let response = self
            .http_client
            .get(url)
            .send()
            .await
            .map_err(|e| Error::Http(format!("HTTP request failed: {}", e)))?;

        let status = response.status();

        if status.is_success() {
            let body = response
                .json()
                .await
                .map_err(|e| Error::Http(format!("failed to parse response: {}", e)))?;
            Ok(Some(body))
        } else if status == StatusCode::NOT_FOUND {
            Ok(None)
        } else {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown".to_string());
            tracing::warn!(url, status = %status, "Timeline API request failed");
            Err(Error::Http(format!("API error ({}): {}", status, error_text)))
        }
    }
}

#[async_trait]
impl TimelineApi for HttpTimelineClient {
    async fn get_session_summaries(&self, query: SummaryQuery) -> Result<Vec<SessionSummary>> {
        let url = self.sessions_url(&query);
        self.get_json(&url)
            .await?
            .ok_or_else(|| Error::Http(format!("endpoint not found: {}", url)))
    }

    async fn get_session_detail(&self, session_id: &str) -> Result<SessionDetail> {
        self.get_json(&self.session_url(session_id))
            .await?
            .ok_or_else(|| Error::SessionNotFound(session_id.to_string()))
    }

    async fn get_timeline_stats(&self) -> Result<TimelineStats> {
        let url = self.stats_url();
        self.get_json(&url)
            .await?
            .ok_or_else(|| Error::Http(format!("endpoint not found: {}", url)))
    }

    fn source(&self) -> &'static str {
        "live"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SortOrder;

    fn client(url: &str) -> HttpTimelineClient {
        HttpTimelineClient::new(&BackendConfig {
            url: Some(url.to_string()),
            timeout_secs: 5,
        })
        .unwrap()
    }

    #[test]
    fn test_trailing_slash_is_trimmed() {
        assert_eq!(client("http://api.local/").base_url(), "http://api.local");
    }

    #[test]
    fn test_route_construction() {
        let c = client("https://api.local");
        let query = SummaryQuery {
            limit: 5,
            offset: 10,
            sort: SortOrder::EventsDesc,
        };
        assert_eq!(
            c.sessions_url(&query),
            "https://api.local/api/timeline/sessions?limit=5&offset=10&sort=events_desc"
        );
        assert_eq!(
            c.session_url("session-a b/c"),
            "https://api.local/api/timeline/sessions/session-a%20b%2Fc"
        );
        assert_eq!(c.stats_url(), "https://api.local/api/timeline/stats");
    }

    #[test]
    fn test_rejects_invalid_url() {
        let config = BackendConfig {
            url: Some("ftp://api.local".to_string()),
            timeout_secs: 5,
        };
        assert!(matches!(
            HttpTimelineClient::new(&config),
            Err(Error::Config(_))
        ));
    }
}
