use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod cmd;

#[derive(Parser)]
#[command(name = "folio")]
#[command(version, about = "GitHub activity calendar: contributions proxy and heatmap widget")]
pub struct Cli {
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub json_logs: bool,

    /// Path to folio.toml (defaults to ./folio.toml when present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the activity proxy
    Serve {
        /// Port to serve on
        #[arg(short, long)]
        port: Option<u16>,

        /// Address to bind
        #[arg(long)]
        host: Option<String>,

        /// Enable dev mode (CORS permissive for a local front-end dev server)
        #[arg(long)]
        dev: bool,
    },
    /// Mount the activity widget once and print the rendered calendar
    Calendar {
        /// Activity proxy URL
        #[arg(long)]
        endpoint: Option<String>,

        /// Render an embeddable HTML fragment instead of terminal output
        #[arg(long)]
        html: bool,

        /// Discard the cached record before mounting
        #[arg(long)]
        no_cache: bool,

        /// Also print one tooltip line per day
        #[arg(long)]
        list: bool,
    },
    /// Inspect or clear the widget's local cache
    Cache {
        #[command(subcommand)]
        command: CacheCommands,
    },
    /// View configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
}

#[derive(Subcommand, Clone)]
pub enum CacheCommands {
    /// Show the cached record's version, age and freshness
    Show,
    /// Delete the cached record
    Clear,
}

#[derive(Subcommand, Clone)]
pub enum ConfigCommands {
    /// Show the effective configuration
    Show,
    /// Print a default folio.toml
    Init,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    folio::logging::init_logging(cli.verbose, cli.json_logs);

    let config = cmd::load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Serve { port, host, dev } => cmd::cmd_serve(config, port, host, dev).await?,
        Commands::Calendar {
            endpoint,
            html,
            no_cache,
            list,
        } => cmd::cmd_calendar(&config, endpoint, html, no_cache, list).await?,
        Commands::Cache { command } => cmd::cmd_cache(&config, command)?,
        Commands::Config { command } => cmd::cmd_config(&config, command)?,
    }

    Ok(())
}
