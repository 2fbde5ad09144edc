//! Activity widget: client side of the GitHub activity pipeline.
//!
//! On mount the widget checks its local cache (`cache`), falls back to the
//! proxy (`client`) on a miss, records the outcome in `state`, and `render`
//! turns the resulting state into a calendar heatmap, an error with a
//! profile link, or a loading indicator.

pub mod cache;
pub mod client;
pub mod render;
pub mod state;

pub use cache::{ActivityCache, CACHE_TTL, CACHE_VERSION, FileStorage, MemoryStorage};
pub use client::ActivityClient;
pub use state::{ActivityWidget, WidgetState};
