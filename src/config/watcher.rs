//! Configuration file watcher for hot reload.
//!
//! Only the policy sections (routes, origins, auth) take effect on reload.
//! Limiter state and limits live for the whole process.

use std::path::{Path, PathBuf};
use std::time::Duration;

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use crate::config::loader::load_config;
use crate::config::schema::GateConfig;

/// Watches one config file and publishes every successfully validated version.
pub struct ConfigWatcher {
    reloader: Reloader,
}

impl ConfigWatcher {
    /// Returns the watcher and the receiving end of its update channel.
    pub fn new(path: &Path) -> (Self, mpsc::UnboundedReceiver<GateConfig>) {
        let (updates, rx) = mpsc::unbounded_channel();
        let reloader = Reloader {
            path: path.to_path_buf(),
            updates,
        };
        (Self { reloader }, rx)
    }

    /// Start watching. The returned handle must be kept alive.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let path = self.reloader.path.clone();
        let reloader = self.reloader;

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| reloader.on_event(res),
            Config::default().with_poll_interval(Duration::from_secs(2)),
        )?;
        watcher.watch(&path, RecursiveMode::NonRecursive)?;

        tracing::info!(path = ?path, "Config watcher started");
        Ok(watcher)
    }
}

/// Turns file events into validated configs on the update channel.
struct Reloader {
    path: PathBuf,
    updates: mpsc::UnboundedSender<GateConfig>,
}

impl Reloader {
    fn on_event(&self, res: notify::Result<Event>) {
        match res {
            Ok(event) if event.kind.is_modify() || event.kind.is_create() => {
                self.reload();
            }
            Ok(_) => {}
            Err(e) => tracing::error!(error = ?e, "Config watch error"),
        }
    }

    /// Returns whether a new config was published.
    fn reload(&self) -> bool {
        match load_config(&self.path) {
            Ok(config) => {
                tracing::info!(path = ?self.path, "Config reloaded");
                self.updates.send(config).is_ok()
            }
            Err(e) => {
                tracing::error!(error = %e, "Rejected config reload, keeping current policy");
                false
            }
        }
    }
}
