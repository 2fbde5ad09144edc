use std::collections::BTreeMap;

use async_trait::async_trait;
use folio_common::ContributionDay;
use serde::Deserialize;
use serde_json::Value;
use tracing::{info, warn};

use crate::errors::ProxyError;

/// Validated upstream response: per-year totals plus the raw daily series.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpstreamActivity {
    pub total: BTreeMap<String, u64>,
    pub contributions: Vec<ContributionDay>,
}

/// Anything that can produce the upstream contribution feed.
///
/// The HTTP handler only sees this trait so tests can substitute a stub for
/// the third-party API.
#[async_trait]
pub trait ContributionSource: Send + Sync {
    async fn fetch(&self) -> Result<UpstreamActivity, ProxyError>;
}

/// Wire shape of one entry as the upstream sends it.
#[derive(Debug, Deserialize)]
struct RawContributionDay {
    date: String,
    count: u64,
    level: u8,
}

/// Decode an upstream body into typed data.
///
/// `total` must be a mapping of key to non-negative integer and
/// `contributions` must be a sequence, otherwise the whole response is a
/// contract violation. Entries inside `contributions` that fail validation
/// are dropped individually.
pub fn decode_upstream(body: &[u8]) -> Result<UpstreamActivity, ProxyError> {
    let value: Value =
        serde_json::from_slice(body).map_err(|e| invalid(format!("body is not JSON: {e}")))?;

    let object = value
        .as_object()
        .ok_or_else(|| invalid("body is not a JSON object".into()))?;

    let total = object
        .get("total")
        .and_then(Value::as_object)
        .ok_or_else(|| invalid("`total` is missing or not a mapping".into()))?;

    let contributions = object
        .get("contributions")
        .and_then(Value::as_array)
        .ok_or_else(|| invalid("`contributions` is missing or not a sequence".into()))?;

    let total = total
        .iter()
        .map(|(key, v)| {
            let reason = || invalid(format!("total for '{key}' is not a non-negative integer"));
            v.as_u64().map(|n| (key.clone(), n)).ok_or_else(reason)
        })
        .collect::<Result<BTreeMap<_, _>, _>>()?;

    let mut days = Vec::with_capacity(contributions.len());
    for (index, entry) in contributions.iter().enumerate() {
        match decode_day(entry) {
            Ok(day) => days.push(day),
            Err(reason) => warn!(index, %reason, "dropping malformed contribution entry"),
        }
    }

    Ok(UpstreamActivity {
        total,
        contributions: days,
    })
}

fn decode_day(entry: &Value) -> Result<ContributionDay, String> {
    let raw = RawContributionDay::deserialize(entry).map_err(|e| e.to_string())?;
    ContributionDay::parse(&raw.date, raw.count, raw.level).map_err(|e| e.to_string())
}

fn invalid(reason: String) -> ProxyError {
    ProxyError::InvalidShape { reason }
}

/// reqwest client for the public contributions API.
pub struct UpstreamClient {
    client: reqwest::Client,
    base_url: String,
    username: String,
}

impl UpstreamClient {
    /// `base_url` is like `https://github-contributions-api.jogruber.de/v4`.
    pub fn new(base_url: &str, username: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            username: username.to_string(),
        }
    }

    pub fn url(&self) -> String {
        format!("{}/{}", self.base_url, self.username)
    }
}

#[async_trait]
impl ContributionSource for UpstreamClient {
    async fn fetch(&self) -> Result<UpstreamActivity, ProxyError> {
        let url = self.url();
        info!(url = %url, "fetching contributions from upstream");

        let resp = self
            .client
            .get(&url)
            .header("Accept", "application/json")
            .header("User-Agent", "folio-activity")
            .send()
            .await
            .map_err(|e| ProxyError::Transport(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            warn!(status = status.as_u16(), "upstream returned error status");
            return Err(ProxyError::UpstreamStatus {
                status: status.as_u16(),
            });
        }

        let body = resp
            .bytes()
            .await
            .map_err(|e| ProxyError::Transport(e.to_string()))?;
        let activity = decode_upstream(&body)?;
        info!(
            days = activity.contributions.len(),
            "decoded upstream contributions"
        );
        Ok(activity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_valid_body() {
        let body = br#"{
            "total": {"2023": 100, "2024": 50},
            "contributions": [
                {"date": "2024-01-01", "count": 2, "level": 1},
                {"date": "2024-01-02", "count": 0, "level": 0}
            ]
        }"#;
        let activity = decode_upstream(body).unwrap();
        assert_eq!(activity.total.get("2023"), Some(&100));
        assert_eq!(activity.total.get("2024"), Some(&50));
        assert_eq!(activity.contributions.len(), 2);
        assert_eq!(activity.contributions[0].count, 2);
    }

    #[test]
    fn test_missing_contributions_is_invalid_shape() {
        let body = br#"{"total": {"2024": 5}}"#;
        assert!(matches!(
            decode_upstream(body),
            Err(ProxyError::InvalidShape { .. })
        ));
    }

    #[test]
    fn test_missing_total_is_invalid_shape() {
        let body = br#"{"contributions": []}"#;
        assert!(matches!(
            decode_upstream(body),
            Err(ProxyError::InvalidShape { .. })
        ));
    }

    #[test]
    fn test_contributions_not_a_sequence_is_invalid_shape() {
        let body = br#"{"total": {}, "contributions": {"date": "2024-01-01"}}"#;
        let err = decode_upstream(body).unwrap_err();
        match err {
            ProxyError::InvalidShape { reason } => assert!(reason.contains("contributions")),
            other => panic!("Expected InvalidShape, got {other:?}"),
        }
    }

    #[test]
    fn test_total_not_a_mapping_is_invalid_shape() {
        let body = br#"{"total": [1, 2], "contributions": []}"#;
        assert!(matches!(
            decode_upstream(body),
            Err(ProxyError::InvalidShape { .. })
        ));
    }

    #[test]
    fn test_negative_total_is_invalid_shape() {
        let body = br#"{"total": {"2024": -3}, "contributions": []}"#;
        assert!(matches!(
            decode_upstream(body),
            Err(ProxyError::InvalidShape { .. })
        ));
    }

    #[test]
    fn test_non_json_body_is_invalid_shape() {
        assert!(matches!(
            decode_upstream(b"<html>rate limited</html>"),
            Err(ProxyError::InvalidShape { .. })
        ));
    }

    #[test]
    fn test_malformed_entries_are_dropped() {
        let body = br#"{
            "total": {"2024": 9},
            "contributions": [
                {"date": "2024-01-01", "count": 2, "level": 1},
                {"date": "not-a-date", "count": 1, "level": 1},
                {"date": "2024-01-03", "count": -1, "level": 1},
                {"date": "2024-01-04", "count": 1, "level": 9},
                {"count": 1, "level": 1},
                {"date": "2024-01-05", "count": 7, "level": 4}
            ]
        }"#;
        let activity = decode_upstream(body).unwrap();
        let dates: Vec<String> = activity
            .contributions
            .iter()
            .map(|d| d.date.to_string())
            .collect();
        assert_eq!(dates, vec!["2024-01-01", "2024-01-05"]);
    }

    #[test]
    fn test_client_trims_trailing_slash() {
        let client = UpstreamClient::new("https://example.com/v4/", "ferris");
        assert_eq!(client.url(), "https://example.com/v4/ferris");
    }
}
