//! Configuration file watcher for hot reload.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use crate::config::loader::load_config;
use crate::config::runtime::RuntimeConfig;
use crate::config::schema::LoggingConfig;

/// Monitors the configuration file and swaps valid changes into a [`RuntimeConfig`].
pub struct ConfigWatcher {
    path: PathBuf,
    runtime: Arc<RuntimeConfig>,
    reloaded_tx: mpsc::UnboundedSender<Arc<LoggingConfig>>,
}

impl ConfigWatcher {
    /// Create a new ConfigWatcher.
    ///
    /// The receiver yields each config once it has been applied.
    pub fn new(
        path: &Path,
        runtime: Arc<RuntimeConfig>,
    ) -> (Self, mpsc::UnboundedReceiver<Arc<LoggingConfig>>) {
        let (reloaded_tx, reloaded_rx) = mpsc::unbounded_channel();

        (
            Self {
                path: path.to_path_buf(),
                runtime,
                reloaded_tx,
            },
            reloaded_rx,
        )
    }

    /// Re-read the file once. Invalid configs leave the live one untouched.
    pub fn reload(&self) -> bool {
        let next = match load_config(&self.path) {
            Ok(next) => next,
            Err(e) => {
                tracing::error!(path = ?self.path, error = %e, "Failed to reload config, keeping current configuration");
                return false;
            }
        };
        match self.runtime.swap(next) {
            Ok(()) => {
                let _ = self.reloaded_tx.send(self.runtime.load());
                true
            }
            Err(e) => {
                tracing::error!(path = ?self.path, error = %e, "Rejected reloaded config");
                false
            }
        }
    }

    /// Start watching the file in a background thread.
    ///
    /// The returned watcher must be kept alive for events to keep flowing.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let path = self.path.clone();
        let this = self;

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) if event.kind.is_modify() || event.kind.is_create() => {
                    tracing::info!("Config file change detected, reloading...");
                    this.reload();
                }
                Ok(_) => {}
                Err(e) => tracing::error!(error = ?e, "Watch error"),
            },
            Config::default().with_poll_interval(Duration::from_secs(2)),
        )?;

        watcher.watch(&path, RecursiveMode::NonRecursive)?;

        tracing::info!(path = ?path, "Config watcher started");
        Ok(watcher)
    }
}
