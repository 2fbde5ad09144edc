//! Activity widget command (`folio calendar`).

use anyhow::{Context, Result, bail};
use folio::config::FolioToml;
use folio::widget::render::{LOADING_TEXT, render_html, render_terminal, tooltip};
use folio::widget::{ActivityClient, ActivityWidget, WidgetState};
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

pub async fn cmd_calendar(
    config: &FolioToml,
    endpoint: Option<String>,
    html: bool,
    no_cache: bool,
    list: bool,
) -> Result<()> {
    let cache = super::file_cache(config);
    if no_cache {
        cache.clear().context("Failed to clear activity cache")?;
    }

    let endpoint = endpoint.unwrap_or_else(|| config.endpoint());
    let mut widget = ActivityWidget::new(ActivityClient::new(endpoint), cache);

    // Ctrl+C unmounts the widget, aborting the in-flight request.
    let token = widget.cancel_token();
    let interrupt = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            token.cancel();
        }
    });

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner} {msg}")
            .context("Invalid spinner template")?,
    );
    spinner.set_message(LOADING_TEXT);
    spinner.enable_steady_tick(Duration::from_millis(80));

    let state = widget.mount().await.clone();

    spinner.finish_and_clear();
    interrupt.abort();

    let profile_url = config.profile_url();
    if html {
        print!("{}", render_html(&state, &profile_url));
    } else {
        print!("{}", render_terminal(&state, &profile_url));
    }

    match state {
        WidgetState::Success(payload) => {
            if list {
                for day in &payload.contributions {
                    println!("{}", tooltip(day));
                }
            }
            Ok(())
        }
        WidgetState::Error(message) => bail!("Failed to load GitHub activity: {}", message),
        WidgetState::Loading => bail!("Cancelled before activity finished loading"),
    }
}
