//! HTTP client for the QC REST API.
//!
//! Every call goes through [`ApiClient::send`], which attaches the bearer
//! token and maps the response onto [`ApiError`]:
//!
//! | Response                        | Result                               |
//! |---------------------------------|--------------------------------------|
//! | 401                             | `ApiError::Unauthorized`             |
//! | 403                             | `ApiError::Forbidden`                |
//! | other non-2xx                   | `ApiError::Status` (JSON `error` or body text) |
//! | 2xx, content type not JSON      | `ApiError::UnexpectedContentType`    |
//! | 204, or 2xx with an empty body  | `null`                               |
//!
//! Endpoint groups live in submodules: `entries`, `catalog` (auth, products,
//! users) and `reports` (summaries, history, aggregates).

pub mod catalog;
pub mod entries;
pub mod reports;

use std::time::Duration;

use reqwest::{Method, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::errors::ApiError;

pub use catalog::ProductQuery;
pub use reports::{AggregateQuery, HistoryQuery, SortOrder};

pub type Query = Vec<(&'static str, String)>;

#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|source| ApiError::Request {
                url: base_url.to_string(),
                source,
            })?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: None,
        })
    }

    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token.filter(|t| !t.is_empty());
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    pub(crate) async fn get<T: DeserializeOwned>(&self, path: &str, query: &Query) -> Result<T, ApiError> {
        self.send(Method::GET, path, query, None::<&()>).await
    }

    pub(crate) async fn post<B: Serialize, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T, ApiError> {
        self.send(Method::POST, path, &Vec::new(), Some(body)).await
    }

    pub(crate) async fn patch<B: Serialize, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T, ApiError> {
        self.send(Method::PATCH, path, &Vec::new(), Some(body)).await
    }

    pub(crate) async fn delete(&self, path: &str) -> Result<serde_json::Value, ApiError> {
        self.send(Method::DELETE, path, &Vec::new(), None::<&()>).await
    }

    async fn send<B: Serialize, T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        query: &Query,
        body: Option<&B>,
    ) -> Result<T, ApiError> {
        let url = self.url(path);
        debug!(%method, %url, "api request");

        let mut req = self.http.request(method, &url);
        if !query.is_empty() {
            req = req.query(query);
        }
        if let Some(token) = &self.token {
            req = req.bearer_auth(token);
        }
        if let Some(body) = body {
            req = req.json(body);
        }

        let resp = req.send().await.map_err(|source| ApiError::Request {
            url: url.clone(),
            source,
        })?;
        decode(resp, &url).await
    }
}

async fn decode<T: DeserializeOwned>(resp: reqwest::Response, url: &str) -> Result<T, ApiError> {
    let status = resp.status();
    match status {
        StatusCode::UNAUTHORIZED => return Err(ApiError::Unauthorized),
        StatusCode::FORBIDDEN => return Err(ApiError::Forbidden),
        _ => {}
    }

    let content_type = resp
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();
    let text = resp.text().await.map_err(|source| ApiError::Request {
        url: url.to_string(),
        source,
    })?;

    if !status.is_success() {
        return Err(ApiError::Status {
            status: status.as_u16(),
            message: error_message(&text, status),
        });
    }

    if status == StatusCode::NO_CONTENT || text.trim().is_empty() {
        return serde_json::from_value(serde_json::Value::Null).map_err(|source| ApiError::Decode {
            url: url.to_string(),
            source,
        });
    }

    if !content_type.contains("application/json") {
        return Err(ApiError::UnexpectedContentType {
            content_type,
            url: url.to_string(),
        });
    }

    serde_json::from_str(&text).map_err(|source| ApiError::Decode {
        url: url.to_string(),
        source,
    })
}

/// Pull a human-readable message out of an error body.
fn error_message(body: &str, status: StatusCode) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        for key in ["error", "message"] {
            if let Some(msg) = value.get(key).and_then(|v| v.as_str()) {
                return msg.to_string();
            }
        }
    }
    let trimmed = body.trim();
    if trimmed.is_empty() {
        format!("Request failed ({})", status.as_u16())
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_joins_without_double_slash() {
        let client = ApiClient::new("http://localhost:3001/api/", Duration::from_secs(5)).unwrap();
        assert_eq!(client.url("/entries"), "http://localhost:3001/api/entries");
        assert_eq!(client.url("users/7"), "http://localhost:3001/api/users/7");
    }

    #[test]
    fn empty_token_is_ignored() {
        let client = ApiClient::new("http://x", Duration::from_secs(1))
            .unwrap()
            .with_token(Some(String::new()));
        assert!(!client.has_token());
    }

    #[test]
    fn error_message_prefers_json_error_field() {
        let msg = error_message(r#"{"error":"Product code taken"}"#, StatusCode::CONFLICT);
        assert_eq!(msg, "Product code taken");
        let msg = error_message("  upstream down ", StatusCode::BAD_GATEWAY);
        assert_eq!(msg, "upstream down");
        let msg = error_message("", StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(msg, "Request failed (500)");
    }
}
