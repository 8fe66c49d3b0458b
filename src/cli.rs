//! Command-line interface definitions for News Pager.
//!
//! Every option is optional here; [`crate::config::Config::resolve`] layers
//! these values over the YAML config file and the built-in defaults.

use crate::locale::Language;
use clap::Parser;
use std::path::PathBuf;

/// Command-line arguments for the News Pager application.
///
/// # Examples
///
/// ```sh
/// # Browse a local backend
/// news_pager
///
/// # Point at another backend and show ten cards per page
/// news_pager --base-url https://news.example.com --page-size 10
///
/// # Print the first page and exit
/// news_pager --once
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Base URL of the news backend (the client appends /api/v1/news)
    #[arg(long, env = "NEWS_API_BASE_URL")]
    pub base_url: Option<String>,

    /// Number of articles requested per page
    #[arg(long)]
    pub page_size: Option<u32>,

    /// HTTP request timeout in seconds
    #[arg(long)]
    pub timeout_secs: Option<u64>,

    /// Initial display language
    #[arg(long, value_enum, ignore_case = true)]
    pub language: Option<Language>,

    /// Command used to open article links (defaults to the system opener)
    #[arg(long, env = "BROWSER")]
    pub browser: Option<String>,

    /// Optional path to a config.yaml file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Render the first page and exit instead of reading commands
    #[arg(long)]
    pub once: bool,
}
