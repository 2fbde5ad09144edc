//! Activity proxy server command (`folio serve`).

use anyhow::Result;
use folio::config::FolioToml;
use folio::proxy::api::AppState;
use folio::proxy::server::{ServerConfig, start_server};
use folio::proxy::upstream::UpstreamClient;
use std::sync::Arc;
use tracing::info;

pub async fn cmd_serve(
    config: FolioToml,
    port: Option<u16>,
    host: Option<String>,
    dev: bool,
) -> Result<()> {
    let source = UpstreamClient::new(&config.github.api_base_url, &config.github.username);
    info!(
        username = %config.github.username,
        upstream = %source.url(),
        "configured contributions source"
    );

    let state = Arc::new(AppState::new(Arc::new(source)));

    start_server(
        ServerConfig {
            host: host.unwrap_or(config.server.host),
            port: port.unwrap_or(config.server.port),
            dev_mode: dev || config.server.dev,
            allowed_origins: config.server.allowed_origins,
        },
        state,
    )
    .await
}
