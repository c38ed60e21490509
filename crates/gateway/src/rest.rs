//! Shared HTTP plumbing for provider clients

use log::{debug, warn};
use reqwest::header::{HeaderMap, RETRY_AFTER};
use reqwest::{Client, Method, StatusCode};
use serde::{Serialize, de::DeserializeOwned};
use std::time::Duration;

use crate::error::{GatewayError, Result};

/// JSON-over-HTTP client for one provider host
///
/// Infrastructure component: performs the exchange and classifies the
/// status code, nothing more.
#[derive(Clone)]
pub struct RestClient {
    client: Client,
    base_url: String,
}

impl RestClient {
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        RestClient {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        headers: HeaderMap,
        query: &[(&str, String)],
    ) -> Result<T> {
        self.send::<T, ()>(Method::GET, path, headers, query, None)
            .await
    }

    pub async fn post<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        headers: HeaderMap,
        body: &B,
    ) -> Result<T> {
        self.send(Method::POST, path, headers, &[], Some(body)).await
    }

    async fn send<T: DeserializeOwned, B: Serialize>(
        &self,
        method: Method,
        path: &str,
        headers: HeaderMap,
        query: &[(&str, String)],
        body: Option<&B>,
    ) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);
        debug!("{} {}", method, url);

        let mut request = self.client.request(method, &url).headers(headers);
        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let resp = request.send().await?;
        Self::handle_response(resp).await
    }

    async fn handle_response<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T> {
        let status = resp.status();

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(GatewayError::Unauthorized(status.as_u16()));
        }
        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = retry_after(resp.headers());
            warn!("Provider throttled request, retry after {:?}", retry_after);
            return Err(GatewayError::Throttled { retry_after });
        }

        let text = resp.text().await?;
        if !status.is_success() {
            return Err(GatewayError::Api {
                status: status.as_u16(),
                message: error_message(&text),
            });
        }

        serde_json::from_str(&text).map_err(|e| GatewayError::Decode(e.to_string()))
    }
}

/// `Retry-After` in delta-seconds form
fn retry_after(headers: &HeaderMap) -> Option<Duration> {
    headers
        .get(RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse::<u64>()
        .ok()
        .map(Duration::from_secs)
}

/// Best-effort `message` field from an error body
fn error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(str::to_string))
        .unwrap_or_else(|| body.chars().take(200).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;

    #[test]
    fn test_retry_after_seconds() {
        let mut headers = HeaderMap::new();
        assert_eq!(retry_after(&headers), None);

        headers.insert(RETRY_AFTER, HeaderValue::from_static("12"));
        assert_eq!(retry_after(&headers), Some(Duration::from_secs(12)));

        headers.insert(
            RETRY_AFTER,
            HeaderValue::from_static("Wed, 21 Oct 2015 07:28:00 GMT"),
        );
        assert_eq!(retry_after(&headers), None);
    }

    #[test]
    fn test_error_message() {
        assert_eq!(error_message(r#"{"code":3,"message":"bad"}"#), "bad");
        assert_eq!(error_message("oops"), "oops");
    }
}
