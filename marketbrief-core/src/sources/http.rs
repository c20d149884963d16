//! Shared blocking HTTP client with retry and exponential backoff.
//!
//! All adapters go through this helper so rate-limit handling lives in one
//! place and stays invisible to the orchestrator beyond elapsed time.

use super::FetchError;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;

pub struct HttpClient {
    client: reqwest::blocking::Client,
    max_retries: u32,
    base_delay: Duration,
}

impl HttpClient {
    pub fn new() -> Self {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent("marketbrief/0.1 (+data pipeline)")
            .build()
            .expect("failed to build HTTP client");

        Self {
            client,
            max_retries: 3,
            base_delay: Duration::from_millis(500),
        }
    }

    #[cfg(test)]
    pub fn with_retries(max_retries: u32, base_delay: Duration) -> Self {
        let mut this = Self::new();
        this.max_retries = max_retries;
        this.base_delay = base_delay;
        this
    }

    /// GET a JSON document.
    pub fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, FetchError> {
        let body = self.request_with_retry(url, None)?;
        serde_json::from_str(&body)
            .map_err(|e| FetchError::ResponseFormatChanged(format!("{url}: {e}")))
    }

    /// GET a text body (RSS XML, CSV).
    pub fn get_text(&self, url: &str) -> Result<String, FetchError> {
        self.request_with_retry(url, None)
    }

    /// POST a JSON body and parse a JSON response.
    pub fn post_json<B: Serialize, T: DeserializeOwned>(
        &self,
        url: &str,
        body: &B,
    ) -> Result<T, FetchError> {
        let payload = serde_json::to_string(body)
            .map_err(|e| FetchError::Provider(format!("request serialization: {e}")))?;
        let text = self.request_with_retry(url, Some(payload))?;
        serde_json::from_str(&text)
            .map_err(|e| FetchError::ResponseFormatChanged(format!("{url}: {e}")))
    }

    fn request_with_retry(&self, url: &str, body: Option<String>) -> Result<String, FetchError> {
        let mut last_error = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                let delay = self.base_delay * 2u32.pow(attempt - 1);
                std::thread::sleep(delay);
            }

            let request = match &body {
                Some(payload) => self
                    .client
                    .post(url)
                    .header("Content-Type", "application/json")
                    .body(payload.clone()),
                None => self.client.get(url),
            };

            match request.send() {
                Ok(resp) => {
                    let status = resp.status();

                    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                        let retry_after = resp
                            .headers()
                            .get("retry-after")
                            .and_then(|v| v.to_str().ok())
                            .and_then(|v| v.parse::<u64>().ok())
                            .unwrap_or(60);
                        last_error = Some(FetchError::RateLimited {
                            retry_after_secs: retry_after,
                        });
                        continue;
                    }

                    if status == reqwest::StatusCode::UNAUTHORIZED
                        || status == reqwest::StatusCode::FORBIDDEN
                    {
                        return Err(FetchError::AuthenticationFailed(format!(
                            "HTTP {status} for {url}"
                        )));
                    }

                    if !status.is_success() {
                        last_error = Some(FetchError::Provider(format!("HTTP {status} for {url}")));
                        continue;
                    }

                    return resp
                        .text()
                        .map_err(|e| FetchError::NetworkUnreachable(e.to_string()));
                }
                Err(e) => {
                    if e.is_connect() || e.is_timeout() {
                        last_error = Some(FetchError::NetworkUnreachable(e.to_string()));
                        continue;
                    }
                    return Err(FetchError::NetworkUnreachable(e.to_string()));
                }
            }
        }

        Err(last_error.unwrap_or_else(|| FetchError::Provider("max retries exceeded".into())))
    }
}

impl Default for HttpClient {
    fn default() -> Self {
        Self::new()
    }
}
