//! Opening article links outside the terminal.
//!
//! "New browsing context" means handing the URL to the system browser. The
//! [`Navigator`] trait keeps that side effect out of the views so tests can
//! record what would have been opened.

use crate::error::{Error, Result};
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, instrument};

/// Target opened when an article carries no link.
pub const PLACEHOLDER_TARGET: &str = "about:blank";

pub trait Navigator {
    /// Open `target` in a new browsing context without blocking.
    ///
    /// Called from inside the tokio runtime.
    fn open(&self, target: &str) -> Result<()>;
}

/// Opens links with the platform opener or a configured browser command.
#[derive(Debug, Clone, Default)]
pub struct SystemNavigator {
    /// Whitespace-separated command line; the target is appended.
    browser: Option<String>,
}

impl SystemNavigator {
    pub fn new(browser: Option<String>) -> Self {
        Self { browser }
    }

    /// Program and arguments used to open `target`.
    pub fn command_line(&self, target: &str) -> (String, Vec<String>) {
        if let Some(browser) = &self.browser {
            let mut parts = browser.split_whitespace().map(str::to_string);
            if let Some(program) = parts.next() {
                let mut args: Vec<String> = parts.collect();
                args.push(target.to_string());
                return (program, args);
            }
        }

        if cfg!(target_os = "macos") {
            ("open".to_string(), vec![target.to_string()])
        } else if cfg!(windows) {
            let args = ["/C", "start", "", target];
            ("cmd".to_string(), args.iter().map(|a| a.to_string()).collect())
        } else {
            ("xdg-open".to_string(), vec![target.to_string()])
        }
    }
}

impl Navigator for SystemNavigator {
    #[instrument(level = "debug", skip(self))]
    fn open(&self, target: &str) -> Result<()> {
        let (program, args) = self.command_line(target);
        // Dropping the handle leaves the opener running; tokio reaps it once it exits.
        let child = Command::new(&program)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|source| Error::Open {
                target: target.to_string(),
                source,
            })?;
        debug!(%program, pid = ?child.id(), "Spawned browser");
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::sync::Mutex;

    /// Records every target instead of launching anything.
    #[derive(Debug, Default)]
    pub struct RecordingNavigator {
        pub opened: Mutex<Vec<String>>,
        pub fail: bool,
    }

    impl RecordingNavigator {
        pub fn failing() -> Self {
            Self {
                fail: true,
                ..Default::default()
            }
        }

        pub fn opened(&self) -> Vec<String> {
            self.opened.lock().unwrap().clone()
        }
    }

    impl Navigator for RecordingNavigator {
        fn open(&self, target: &str) -> Result<()> {
            self.opened.lock().unwrap().push(target.to_string());
            if self.fail {
                return Err(Error::Open {
                    target: target.to_string(),
                    source: std::io::Error::new(std::io::ErrorKind::NotFound, "no browser"),
                });
            }
            Ok(())
        }
    }
}
