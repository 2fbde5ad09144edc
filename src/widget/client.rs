use std::time::Duration;

use folio_common::ActivityPayload;
use serde::Deserialize;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::errors::WidgetError;

/// Same budget the proxy gives its upstream call.
pub const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Error body returned by the proxy on failure.
#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

/// HTTP client for the activity proxy.
pub struct ActivityClient {
    client: reqwest::Client,
    endpoint: String,
    timeout: Duration,
}

impl ActivityClient {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
            timeout: FETCH_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Fetch the payload, racing the request against the timeout and `cancel`.
    ///
    /// Whichever loses is dropped, so a timeout or cancellation aborts the
    /// underlying connection rather than discarding a late result.
    pub async fn fetch(&self, cancel: &CancellationToken) -> Result<ActivityPayload, WidgetError> {
        info!(endpoint = %self.endpoint, "fetching activity from proxy");
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                debug!("activity fetch cancelled");
                Err(WidgetError::Cancelled)
            }
            _ = tokio::time::sleep(self.timeout) => Err(WidgetError::TimedOut),
            result = self.request() => result,
        }
    }

    async fn request(&self) -> Result<ActivityPayload, WidgetError> {
        let resp = self
            .client
            .get(&self.endpoint)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| WidgetError::Transport(transport_message(&e.to_string())))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(WidgetError::Status {
                status: status.as_u16(),
                message: error_message(status.as_u16(), &body),
            });
        }

        // The proxy already validated the shape; only a typed decode happens here.
        resp.json::<ActivityPayload>()
            .await
            .map_err(|e| WidgetError::Decode(e.to_string()))
    }
}

/// Prefer the proxy's `error` field, fall back to a message naming the status.
pub fn error_message(status: u16, body: &str) -> String {
    serde_json::from_str::<ErrorBody>(body)
        .map(|b| b.error)
        .ok()
        .filter(|msg| !msg.is_empty())
        .unwrap_or_else(|| format!("Failed to fetch activity data (status {status})"))
}

fn transport_message(raw: &str) -> String {
    if raw.is_empty() {
        "Failed to load GitHub activity".to_string()
    } else {
        raw.to_string()
    }
}
