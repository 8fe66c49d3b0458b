//! Runtime configuration.
//!
//! The resolved [`Config`] is built once in `main` and handed to the HTTP
//! source and the session; nothing else reads the environment. Precedence,
//! highest first: CLI flag (or its environment variable), YAML config file,
//! the `NEWS_API_BASE_URL` value captured at build time, built-in defaults.

use crate::cli::Cli;
use crate::error::{Error, Result};
use crate::locale::Language;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, instrument};
use url::Url;

/// Backend address used when nothing else is configured.
pub const DEFAULT_BASE_URL: &str = match option_env!("NEWS_API_BASE_URL") {
    Some(url) => url,
    None => "http://localhost:8080",
};

pub const DEFAULT_PAGE_SIZE: u32 = 5;
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Shape of the optional `config.yaml` file.
///
/// ```yaml
/// base_url: https://news.example.com
/// page_size: 5
/// timeout_secs: 10
/// language: ENG
/// browser: firefox
/// ```
#[derive(Debug, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    pub base_url: Option<String>,
    pub page_size: Option<u32>,
    pub timeout_secs: Option<u64>,
    pub language: Option<Language>,
    pub browser: Option<String>,
}

impl ConfigFile {
    #[instrument(level = "debug", skip_all, fields(path = %path.display()))]
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let file: ConfigFile = serde_yaml::from_str(&text)?;
        debug!(?file, "Loaded config file");
        Ok(file)
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    /// Backend base URL; always http or https.
    pub base_url: Url,
    /// Articles per page, at least 1.
    pub page_size: u32,
    pub timeout: Duration,
    /// Language shown when the session starts.
    pub language: Language,
    /// Explicit browser command; `None` means the platform opener.
    pub browser: Option<String>,
}

impl Config {
    /// A config for `base_url` with every other value at its default.
    pub fn new(base_url: &str) -> Result<Self> {
        Ok(Self {
            base_url: parse_base_url(base_url)?,
            page_size: DEFAULT_PAGE_SIZE,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            language: Language::default(),
            browser: None,
        })
    }

    /// Build the effective configuration from the CLI and its config file.
    pub fn resolve(cli: &Cli) -> Result<Self> {
        let file = match &cli.config {
            Some(path) => ConfigFile::load(path)?,
            None => ConfigFile::default(),
        };
        Self::merge(cli, file)
    }

    fn merge(cli: &Cli, file: ConfigFile) -> Result<Self> {
        let base_url = cli
            .base_url
            .as_deref()
            .or(file.base_url.as_deref())
            .unwrap_or(DEFAULT_BASE_URL);

        let page_size = cli.page_size.or(file.page_size).unwrap_or(DEFAULT_PAGE_SIZE);
        if page_size == 0 {
            return Err(Error::Config("page_size must be at least 1".to_string()));
        }

        let timeout_secs = cli
            .timeout_secs
            .or(file.timeout_secs)
            .unwrap_or(DEFAULT_TIMEOUT_SECS);
        if timeout_secs == 0 {
            return Err(Error::Config("timeout_secs must be at least 1".to_string()));
        }

        let mut config = Self::new(base_url)?;
        config.page_size = page_size;
        config.timeout = Duration::from_secs(timeout_secs);
        config.language = cli.language.or(file.language).unwrap_or_default();
        config.browser = cli
            .browser
            .clone()
            .or(file.browser)
            .filter(|b| !b.trim().is_empty());
        Ok(config)
    }
}

fn parse_base_url(raw: &str) -> Result<Url> {
    let url = Url::parse(raw.trim())?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(Error::Config(format!(
            "base URL must be http or https, got {other}:"
        ))),
    }
}
