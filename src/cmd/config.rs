//! Configuration view command (`folio config`).

use anyhow::Result;
use folio::config::FolioToml;

use super::super::ConfigCommands;

pub fn cmd_config(config: &FolioToml, command: Option<ConfigCommands>) -> Result<()> {
    match command {
        None | Some(ConfigCommands::Show) => {
            println!();
            println!("Folio Configuration");
            println!("===================");
            println!();

            println!("[github]");
            println!("  username = \"{}\"", config.github.username);
            println!("  api_base_url = \"{}\"", config.github.api_base_url);
            println!();

            println!("[server]");
            println!("  host = \"{}\"", config.server.host);
            println!("  port = {}", config.server.port);
            println!("  dev = {}", config.server.dev);
            println!("  allowed_origins = {:?}", config.server.allowed_origins);
            println!();

            println!("[widget]");
            println!("  endpoint = \"{}\"", config.endpoint());
            println!("  cache_file = \"{}\"", config.cache_file().display());
            println!();
        }
        Some(ConfigCommands::Init) => {
            print!("{}", FolioToml::default().to_toml_string()?);
        }
    }

    Ok(())
}
