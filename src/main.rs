mod cli;
mod clock;
mod config;
mod models;
mod prayer_times;
mod tui;
mod utils;

use anyhow::{Context, Result};
use clap::Parser;

use cli::args::{Cli, Commands};
use cli::handlers::{self, ConfigChanges};
use config::AppConfig;

fn main() -> Result<()> {
    // The TUI owns the terminal; send stderr elsewhere when RUST_LOG is set.
    env_logger::init();

    let cli = Cli::parse();
    let mut config = AppConfig::load().context("Loading config")?;

    match cli.command {
        Some(Commands::Times { location }) => {
            handlers::handle_times(&config, &location)?;
        }
        Some(Commands::Config {
            base_url,
            key,
            style,
            default_location,
            timeout_secs,
            show_hijri,
            hijri_offset,
        }) => {
            let changes = ConfigChanges {
                base_url,
                key,
                style,
                default_location,
                timeout_secs,
                show_hijri,
                hijri_offset,
            };
            handlers::handle_config(&mut config, changes)?;
        }

        // No subcommand → launch TUI
        None => {
            tui::app::run(config, cli.location)?;
        }
    }

    Ok(())
}
