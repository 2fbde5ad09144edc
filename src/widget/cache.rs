//! Versioned, time-boxed cache for the widget's last successful payload.
//!
//! The record is stored as one JSON document:
//!
//! ```json
//! { "version": 1, "timestamp": 1704240000000, "data": { ...ActivityPayload } }
//! ```
//!
//! Decoding goes through a version-keyed envelope first so a record written
//! by an older or newer build is discarded instead of failing to parse into
//! the current payload type. Malformed JSON, unknown versions, and records
//! at or past the TTL all count as a miss.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, Utc};
use folio_common::ActivityPayload;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::errors::CacheError;

/// Format version compiled into this build. Bump when `ActivityPayload` changes shape.
pub const CACHE_VERSION: u32 = 1;

/// Records at or past this age are ignored.
pub const CACHE_TTL: Duration = Duration::from_secs(60 * 60);

/// A cache record in the current format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CachedActivity {
    pub data: ActivityPayload,
    /// Write time, epoch milliseconds.
    pub timestamp: i64,
    pub version: u32,
}

impl CachedActivity {
    pub fn new(data: ActivityPayload, now: DateTime<Utc>) -> Self {
        Self {
            data,
            timestamp: now.timestamp_millis(),
            version: CACHE_VERSION,
        }
    }

    /// Age at `now`; `None` when the timestamp lies in the future.
    pub fn age(&self, now: DateTime<Utc>) -> Option<Duration> {
        let elapsed = now.timestamp_millis().checked_sub(self.timestamp)?;
        u64::try_from(elapsed).ok().map(Duration::from_millis)
    }

    pub fn is_fresh(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        self.age(now).is_some_and(|age| age < ttl)
    }
}

/// Version-agnostic outer shape of a stored record.
#[derive(Deserialize)]
struct Envelope {
    version: u32,
    timestamp: i64,
    data: serde_json::Value,
}

/// A decoded record, keyed by the version it was written with.
#[derive(Debug, Clone, PartialEq)]
pub enum CacheRecord {
    Current(CachedActivity),
    /// Written by a build with a different format; always discarded.
    Unsupported { version: u32 },
}

impl CacheRecord {
    pub fn decode(raw: &str) -> Result<Self, serde_json::Error> {
        let envelope: Envelope = serde_json::from_str(raw)?;
        match envelope.version {
            CACHE_VERSION => {
                let data: ActivityPayload = serde_json::from_value(envelope.data)?;
                Ok(CacheRecord::Current(CachedActivity {
                    data,
                    timestamp: envelope.timestamp,
                    version: envelope.version,
                }))
            }
            version => Ok(CacheRecord::Unsupported { version }),
        }
    }
}

// ── Storage backends ──────────────────────────────────────────────────

/// Where the serialized record lives.
pub trait CacheStorage: Send + Sync {
    fn read(&self) -> Result<Option<String>, CacheError>;
    fn write(&self, contents: &str) -> Result<(), CacheError>;
    fn clear(&self) -> Result<(), CacheError>;
}

/// Single namespaced JSON file on disk.
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> CacheError {
        CacheError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl CacheStorage for FileStorage {
    fn read(&self) -> Result<Option<String>, CacheError> {
        match std::fs::read_to_string(&self.path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(self.io_error(e)),
        }
    }

    fn write(&self, contents: &str) -> Result<(), CacheError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
        }
        std::fs::write(&self.path, contents).map_err(|e| self.io_error(e))
    }

    fn clear(&self) -> Result<(), CacheError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(self.io_error(e)),
        }
    }
}

/// In-process slot, shared by cloning the `Arc` that wraps it.
#[derive(Default)]
pub struct MemoryStorage {
    slot: Mutex<Option<String>>,
}

impl CacheStorage for MemoryStorage {
    fn read(&self) -> Result<Option<String>, CacheError> {
        let slot = self.slot.lock().map_err(|_| CacheError::LockPoisoned)?;
        Ok(slot.clone())
    }

    fn write(&self, contents: &str) -> Result<(), CacheError> {
        let mut slot = self.slot.lock().map_err(|_| CacheError::LockPoisoned)?;
        *slot = Some(contents.to_string());
        Ok(())
    }

    fn clear(&self) -> Result<(), CacheError> {
        let mut slot = self.slot.lock().map_err(|_| CacheError::LockPoisoned)?;
        *slot = None;
        Ok(())
    }
}

// ── Cache front-end ───────────────────────────────────────────────────

/// TTL- and version-aware access to a [`CacheStorage`].
///
/// Writes from concurrent widget instances are not coordinated; the last
/// write wins.
#[derive(Clone)]
pub struct ActivityCache {
    storage: Arc<dyn CacheStorage>,
    ttl: Duration,
}

impl ActivityCache {
    pub fn new(storage: Arc<dyn CacheStorage>) -> Self {
        Self {
            storage,
            ttl: CACHE_TTL,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Decode whatever is stored, fresh or not. Read or parse failures yield `None`.
    pub fn record(&self) -> Option<CacheRecord> {
        let raw = match self.storage.read() {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                warn!(error = %e, "failed to read activity cache");
                return None;
            }
        };

        match CacheRecord::decode(&raw) {
            Ok(record) => Some(record),
            Err(e) => {
                debug!(error = %e, "ignoring malformed activity cache record");
                None
            }
        }
    }

    /// Return the cached payload if it is in the current format and younger than the TTL.
    pub fn load(&self, now: DateTime<Utc>) -> Option<CachedActivity> {
        match self.record()? {
            CacheRecord::Current(cached) if cached.is_fresh(now, self.ttl) => {
                debug!(timestamp = cached.timestamp, "activity cache hit");
                Some(cached)
            }
            CacheRecord::Current(cached) => {
                debug!(timestamp = cached.timestamp, "activity cache expired");
                None
            }
            CacheRecord::Unsupported { version } => {
                debug!(
                    version,
                    expected = CACHE_VERSION,
                    "discarding activity cache with mismatched version"
                );
                None
            }
        }
    }

    /// Persist `payload` stamped with `now`. Failures are logged, never returned.
    pub fn store(&self, payload: &ActivityPayload, now: DateTime<Utc>) {
        let record = CachedActivity::new(payload.clone(), now);
        let result = serde_json::to_string(&record)
            .map_err(CacheError::from)
            .and_then(|json| self.storage.write(&json));
        if let Err(e) = result {
            warn!(error = %e, "failed to write activity cache");
        }
    }

    pub fn clear(&self) -> Result<(), CacheError> {
        self.storage.clear()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use folio_common::ContributionDay;
    use tempfile::tempdir;

    fn payload() -> ActivityPayload {
        ActivityPayload {
            contributions: vec![ContributionDay::parse("2024-01-01", 2, 1).unwrap()],
            last_year_total: 2,
            all_time_total: 150,
            year_range: "2024".to_string(),
        }
    }

    fn noon() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 3, 12, 0, 0).unwrap()
    }

    fn memory_cache() -> (Arc<MemoryStorage>, ActivityCache) {
        let storage = Arc::new(MemoryStorage::default());
        let cache = ActivityCache::new(storage.clone());
        (storage, cache)
    }

    #[test]
    fn test_store_then_load_within_ttl() {
        let (_, cache) = memory_cache();
        cache.store(&payload(), noon());
        let cached = cache.load(noon() + chrono::Duration::minutes(59)).unwrap();
        assert_eq!(cached.data, payload());
        assert_eq!(cached.version, CACHE_VERSION);
        assert_eq!(cached.timestamp, noon().timestamp_millis());
    }

    #[test]
    fn test_record_older_than_ttl_is_ignored() {
        let (_, cache) = memory_cache();
        cache.store(&payload(), noon());
        assert!(cache.load(noon() + chrono::Duration::minutes(61)).is_none());
    }

    #[test]
    fn test_record_exactly_at_ttl_is_ignored() {
        let (_, cache) = memory_cache();
        cache.store(&payload(), noon());
        assert!(cache.load(noon() + chrono::Duration::hours(1)).is_none());
    }

    #[test]
    fn test_future_timestamp_is_ignored() {
        let (_, cache) = memory_cache();
        cache.store(&payload(), noon() + chrono::Duration::minutes(5));
        assert!(cache.load(noon()).is_none());
    }

    #[test]
    fn test_mismatched_version_is_ignored() {
        let (storage, cache) = memory_cache();
        let stale = serde_json::json!({
            "version": CACHE_VERSION + 1,
            "timestamp": noon().timestamp_millis(),
            "data": {"something": "else"}
        });
        storage.write(&stale.to_string()).unwrap();

        assert_eq!(
            cache.record(),
            Some(CacheRecord::Unsupported {
                version: CACHE_VERSION + 1
            })
        );
        assert!(cache.load(noon()).is_none());
    }

    #[test]
    fn test_malformed_json_is_a_miss() {
        let (storage, cache) = memory_cache();
        storage.write("{not json").unwrap();
        assert!(cache.record().is_none());
        assert!(cache.load(noon()).is_none());
    }

    #[test]
    fn test_current_version_with_wrong_payload_shape_is_a_miss() {
        let (storage, cache) = memory_cache();
        let broken = serde_json::json!({
            "version": CACHE_VERSION,
            "timestamp": noon().timestamp_millis(),
            "data": {"contributions": "nope"}
        });
        storage.write(&broken.to_string()).unwrap();
        assert!(cache.load(noon()).is_none());
    }

    #[test]
    fn test_stored_record_uses_documented_field_names() {
        let (storage, cache) = memory_cache();
        cache.store(&payload(), noon());
        let raw = storage.read().unwrap().unwrap();
        let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(json["version"], CACHE_VERSION);
        assert_eq!(json["timestamp"], noon().timestamp_millis());
        assert_eq!(json["data"]["lastYearTotal"], 2);
    }

    #[test]
    fn test_file_storage_roundtrip_and_clear() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested/folio/github-activity.json");
        let storage = Arc::new(FileStorage::new(&path));
        let cache = ActivityCache::new(storage.clone());

        assert!(cache.load(noon()).is_none());
        cache.store(&payload(), noon());
        assert!(path.exists());
        assert!(cache.load(noon()).is_some());

        cache.clear().unwrap();
        assert!(!path.exists());
        // Clearing twice is fine.
        cache.clear().unwrap();
    }

    #[test]
    fn test_last_write_wins_across_instances() {
        let storage: Arc<dyn CacheStorage> = Arc::new(MemoryStorage::default());
        let first = ActivityCache::new(storage.clone());
        let second = ActivityCache::new(storage);

        let mut other = payload();
        other.all_time_total = 999;
        first.store(&payload(), noon());
        second.store(&other, noon());

        assert_eq!(first.load(noon()).unwrap().data.all_time_total, 999);
    }
}
