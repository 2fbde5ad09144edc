//! Activity proxy: server side of the GitHub activity pipeline.
//!
//! ## Module Map
//!
//! ```text
//! ┌──────────┐   GET    ┌──────────────────────────────────────────────────┐
//! │  Widget  │ ───────> │  server.rs  (axum Router, CORS, ServerConfig)    │
//! │          │ <─────── │    └─ api.rs  (handler, AppState, ApiError)      │
//! └──────────┘   JSON   │         │                                        │
//!                       │         │ ContributionSource::fetch() (≤ 10 s)   │
//!                       │         v                                        │
//!                       │  upstream.rs  (reqwest client, decode gate)      │
//!                       │         │                                        │
//!                       │         │ UpstreamActivity                       │
//!                       │         v                                        │
//!                       │  reshape.rs  (filter, sort, window, totals)      │
//!                       └──────────────────────────────────────────────────┘
//! ```
//!
//! Every request re-fetches live data; there is no server-side state beyond
//! the configured source. Failures map to `{ "error": ... }` bodies:
//! upstream status passthrough, `502` for contract violations, `504` for
//! timeouts, `500` otherwise.

pub mod api;
pub mod reshape;
pub mod server;
pub mod upstream;
