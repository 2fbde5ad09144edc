//! CLI command implementations.
//!
//! Each submodule owns one `Commands` variant:
//!
//! | Module     | Commands handled |
//! |------------|------------------|
//! | `serve`    | `Serve`          |
//! | `calendar` | `Calendar`       |
//! | `cache`    | `Cache`          |
//! | `config`   | `Config`         |

pub mod cache;
pub mod calendar;
pub mod config;
pub mod serve;

use anyhow::{Result, bail};
use folio::config::{DEFAULT_CONFIG_FILE, FolioToml};
use folio::widget::{ActivityCache, FileStorage};
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub use cache::cmd_cache;
pub use calendar::cmd_calendar;
pub use config::cmd_config;
pub use serve::cmd_serve;

/// Resolve `folio.toml` (explicit path must exist) and apply environment overrides.
pub fn load_config(path: Option<&Path>) -> Result<FolioToml> {
    let mut config = match path {
        Some(path) => {
            if !path.exists() {
                bail!("Config file not found: {}", path.display());
            }
            FolioToml::load(path)?
        }
        None => FolioToml::load_or_default(&PathBuf::from(DEFAULT_CONFIG_FILE))?,
    };
    config.apply_env()?;
    Ok(config)
}

/// The widget cache backed by the configured file.
pub fn file_cache(config: &FolioToml) -> ActivityCache {
    ActivityCache::new(Arc::new(FileStorage::new(config.cache_file())))
}
