use clap::{Parser, Subcommand};

use crate::config::ApiStyle;

#[derive(Parser, Debug)]
#[command(name = "waqt", version, author, about = "Daily prayer times for any location, with a live clock")]
pub struct Cli {
    /// Look this location up as soon as the TUI opens
    #[arg(short, long)]
    pub location: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print today's prayer times for a location and the next prayer
    Times {
        /// City or place name (e.g. Mumbai)
        location: String,
    },
    /// Show or change the saved configuration
    Config {
        /// Base URL of the prayer-times API
        #[arg(long)]
        base_url: Option<String>,
        /// API key sent with each request (empty string removes it)
        #[arg(long)]
        key: Option<String>,
        /// How the location is put in the request URL
        #[arg(long, value_enum)]
        style: Option<ApiStyle>,
        /// Location to look up when the TUI starts (empty string removes it)
        #[arg(long)]
        default_location: Option<String>,
        /// Request timeout in seconds
        #[arg(long)]
        timeout_secs: Option<u64>,
        /// Show the Hijri date in the header
        #[arg(long)]
        show_hijri: Option<bool>,
        /// Days to shift the Hijri date for local moon sighting
        #[arg(long, allow_negative_numbers = true)]
        hijri_offset: Option<i32>,
    },
}
