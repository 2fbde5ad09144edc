//! Widget cache commands (`folio cache`).

use anyhow::{Context, Result};
use chrono::Utc;
use folio::config::FolioToml;
use folio::widget::CACHE_VERSION;
use folio::widget::cache::CacheRecord;

use super::super::CacheCommands;

pub fn cmd_cache(config: &FolioToml, command: CacheCommands) -> Result<()> {
    let path = config.cache_file();
    let cache = super::file_cache(config);

    match command {
        CacheCommands::Show => {
            println!("Cache file: {}", path.display());
            match cache.record() {
                None => println!("No usable cache record."),
                Some(CacheRecord::Unsupported { version }) => {
                    println!(
                        "Record version {} does not match expected version {}; it will be ignored.",
                        version, CACHE_VERSION
                    );
                }
                Some(CacheRecord::Current(cached)) => {
                    let now = Utc::now();
                    println!("Version: {}", cached.version);
                    match cached.age(now) {
                        Some(age) => println!("Age: {}s", age.as_secs()),
                        None => println!("Age: timestamp is in the future"),
                    }
                    println!(
                        "Fresh: {}",
                        if cached.is_fresh(now, cache.ttl()) {
                            "yes"
                        } else {
                            "no"
                        }
                    );
                    println!("Days: {}", cached.data.contributions.len());
                    println!("Year range: {}", cached.data.year_range);
                }
            }
        }
        CacheCommands::Clear => {
            cache.clear().context("Failed to clear activity cache")?;
            println!("Cleared activity cache at {}", path.display());
        }
    }

    Ok(())
}
