//! GitHub activity calendar for a portfolio site.
//!
//! The crate has two halves connected by one HTTP call:
//! - [`proxy`]: an axum endpoint that fetches the public contributions feed,
//!   validates and reshapes it, and serves a compact payload with cache headers.
//! - [`widget`]: a client that checks a versioned local cache, calls the
//!   proxy on a miss, and renders the contribution heatmap.

pub mod config;
pub mod errors;
pub mod logging;
pub mod proxy;
pub mod widget;

pub use folio_common::{ActivityPayload, ContributionDay};
