//! Single-page GET with bounded retry.

use std::time::Duration;

use serde_json::Value;

use crate::error::{CatalogueError, CatalogueResult};

use super::client::CatalogueClient;
use super::query::basename;

/// Terminal state of a retried fetch.
#[derive(Debug)]
pub enum FetchOutcome {
    Success(Value),
    ExhaustedRetries {
        url: String,
        attempts: u32,
        last_error: String,
    },
}

impl FetchOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, FetchOutcome::Success(_))
    }

    /// Exhaustion becomes [`CatalogueError::ExhaustedRetries`].
    pub fn into_result(self) -> CatalogueResult<Value> {
        match self {
            FetchOutcome::Success(body) => Ok(body),
            FetchOutcome::ExhaustedRetries {
                url,
                attempts,
                last_error,
            } => Err(CatalogueError::ExhaustedRetries {
                url,
                attempts,
                last_error,
            }),
        }
    }
}

impl CatalogueClient {
    /// GET `url` as JSON, retrying up to `max_retries` attempts in total.
    ///
    /// Non-2xx statuses, transport errors and bodies that are not JSON all
    /// count as a failed attempt. Retry `n` waits `base_delay × 2^n` first.
    pub async fn fetch_page(&self, url: &str, max_retries: u32, timeout: Duration) -> FetchOutcome {
        let mut last_error = String::from("no attempt was made");

        for attempt in 0..max_retries {
            match self.attempt_get(url, timeout).await {
                Ok(body) => return FetchOutcome::Success(body),
                Err(err) => {
                    tracing::warn!(
                        "Service Catalogue API error for {} (attempt {}/{}): {}",
                        basename(url),
                        attempt + 1,
                        max_retries,
                        err
                    );
                    last_error = err.to_string();
                }
            }

            if attempt + 1 < max_retries {
                tokio::time::sleep(self.retry.backoff(attempt)).await;
            }
        }

        FetchOutcome::ExhaustedRetries {
            url: basename(url).to_string(),
            attempts: max_retries,
            last_error,
        }
    }

    async fn attempt_get(&self, url: &str, timeout: Duration) -> CatalogueResult<Value> {
        let response = self
            .http
            .get(url)
            .headers(self.headers.clone())
            .timeout(timeout)
            .send()
            .await
            .map_err(|err| CatalogueError::network(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(CatalogueError::Status {
                status: status.as_u16(),
                url: basename(url).to_string(),
            });
        }

        response
            .json::<Value>()
            .await
            .map_err(|err| CatalogueError::parse(err.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn into_result_maps_exhaustion_to_error() {
        let outcome = FetchOutcome::ExhaustedRetries {
            url: "https://x/v1/components".into(),
            attempts: 3,
            last_error: "HTTP 500".into(),
        };
        assert!(!outcome.is_success());

        let err = outcome.into_result().unwrap_err();
        assert!(err.to_string().starts_with("Exceeded retries"));
        assert!(matches!(err, CatalogueError::ExhaustedRetries { attempts: 3, .. }));
    }

    #[test]
    fn into_result_passes_success_through() {
        let outcome = FetchOutcome::Success(serde_json::json!({"data": []}));
        assert!(outcome.is_success());
        assert_eq!(outcome.into_result().unwrap(), serde_json::json!({"data": []}));
    }
}
