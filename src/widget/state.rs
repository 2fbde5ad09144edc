use chrono::{DateTime, Utc};
use tokio::time::Instant;
use folio_common::ActivityPayload;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::cache::ActivityCache;
use super::client::ActivityClient;
use crate::errors::WidgetError;

/// Lifecycle of one mounted widget. `Success` and `Error` are terminal.
#[derive(Debug, Clone, PartialEq)]
pub enum WidgetState {
    Loading,
    Success(ActivityPayload),
    Error(String),
}

impl WidgetState {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, WidgetState::Loading)
    }
}

/// The activity calendar widget: cache lookup, proxy fetch, state transitions.
///
/// Each instance runs its state machine once. Remounting means building a
/// new instance.
pub struct ActivityWidget {
    client: ActivityClient,
    cache: ActivityCache,
    cancel: CancellationToken,
    state: WidgetState,
}

impl ActivityWidget {
    pub fn new(client: ActivityClient, cache: ActivityCache) -> Self {
        Self {
            client,
            cache,
            cancel: CancellationToken::new(),
            state: WidgetState::Loading,
        }
    }

    pub fn state(&self) -> &WidgetState {
        &self.state
    }

    /// Token that unmounts this widget when cancelled, usable from another task.
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Abort any in-flight fetch; no further state updates are applied.
    pub fn unmount(&self) {
        self.cancel.cancel();
    }

    pub async fn mount(&mut self) -> &WidgetState {
        self.mount_at(Utc::now()).await
    }

    /// Run the mount sequence with `now` as the cache clock.
    ///
    /// A fetched payload is stamped with `now` plus the time the fetch took,
    /// so the TTL runs from when the data arrived.
    pub async fn mount_at(&mut self, now: DateTime<Utc>) -> &WidgetState {
        if self.state.is_terminal() || self.cancel.is_cancelled() {
            return &self.state;
        }

        if let Some(cached) = self.cache.load(now) {
            self.state = WidgetState::Success(cached.data);
            return &self.state;
        }

        let started = Instant::now();
        match self.client.fetch(&self.cancel).await {
            Ok(payload) => {
                let elapsed = chrono::Duration::from_std(started.elapsed())
                    .unwrap_or_else(|_| chrono::Duration::zero());
                self.cache.store(&payload, now + elapsed);
                self.state = WidgetState::Success(payload);
            }
            Err(WidgetError::Cancelled) => {
                debug!("widget unmounted before fetch settled");
            }
            Err(e) => {
                warn!(error = %e, "activity fetch failed");
                self.state = WidgetState::Error(e.to_string());
            }
        }

        &self.state
    }
}
