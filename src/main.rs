//! # News Pager
//!
//! A terminal client for a paginated news API. It fetches one page of
//! articles at a time from `<base>/api/v1/news?page=<n>&size=<k>` and renders
//! them as cards under a header with a language toggle, above Previous/Next
//! page controls.
//!
//! ## Usage
//!
//! ```sh
//! news_pager --base-url http://localhost:8080
//! news_pager --once
//! ```
//!
//! ## Architecture
//!
//! 1. **Configuration**: CLI flags, environment, and an optional YAML file
//!    are resolved once into a [`config::Config`]
//! 2. **Container**: [`app::App`] owns the view state and issues fetch tickets
//! 3. **Session**: [`session::Session`] runs fetches as tasks, applies only the
//!    latest outcome, and routes commands to the views
//! 4. **Views**: header, news cards, and pagination render the screen as text

use clap::Parser;
use std::error::Error;
use std::sync::Arc;
use tracing::{debug, error, info, instrument};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod api;
mod app;
mod cli;
mod config;
mod error;
mod locale;
mod models;
mod navigator;
mod session;
mod utils;
mod views;

use api::HttpNewsSource;
use app::App;
use cli::Cli;
use config::Config;
use navigator::SystemNavigator;
use session::Session;

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    // Logs go to stderr; stdout carries the rendered screen.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tfmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("news_pager starting up");

    let args = Cli::parse();
    debug!(?args, "Parsed CLI arguments");

    let config = match Config::resolve(&args) {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "Invalid configuration");
            return Err(e.into());
        }
    };
    info!(
        base_url = %config.base_url,
        page_size = config.page_size,
        timeout = ?config.timeout,
        language = %config.language,
        "Configuration resolved"
    );

    let source = HttpNewsSource::new(&config)?;
    let mut app = App::new(config.page_size, config.language);

    if args.once {
        let applied = app.load(&source).await;
        let state = app.state();
        debug!(
            ?applied,
            articles = state.articles.len(),
            total_pages = state.total_pages,
            "Single page loaded"
        );
        let today = chrono::Local::now().date_naive();
        print!("{}", app.screen(today));
    } else {
        let navigator = SystemNavigator::new(config.browser.clone());
        let stdin = tokio::io::BufReader::new(tokio::io::stdin());
        Session::new(app, Arc::new(source), navigator)
            .run(stdin, tokio::io::stdout())
            .await?;
    }

    let elapsed = start_time.elapsed();
    info!(?elapsed, secs = elapsed.as_secs(), "Execution complete");
    Ok(())
}
