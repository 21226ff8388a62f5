//! Hot reload of the `[security]` section.
//!
//! The watch is placed on the directory holding the file, not on the file
//! itself: editors that save by writing a temporary file and renaming it over
//! the original replace the inode, and a file watch would go silent after the
//! first such save.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::Duration;

use notify::event::{AccessKind, AccessMode, EventKind, ModifyKind};
use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use crate::config::loader::load_config;
use crate::config::schema::SecureConfig;

/// Watches a configuration file and publishes each new, valid security config.
///
/// Listener and timeout changes need a restart.
pub struct ConfigWatcher {
    path: PathBuf,
    update_tx: mpsc::UnboundedSender<SecureConfig>,
}

impl ConfigWatcher {
    /// Returns the watcher and the receiver security configs are published on.
    pub fn new(path: &Path) -> (Self, mpsc::UnboundedReceiver<SecureConfig>) {
        let (update_tx, update_rx) = mpsc::unbounded_channel();
        let watcher = Self {
            path: path.to_path_buf(),
            update_tx,
        };
        (watcher, update_rx)
    }

    /// Start watching. Reloads stop when the returned watcher is dropped.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let directory = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let file_name = self.path.file_name().map(|name| name.to_os_string());

        let mut reload = Reload {
            path: self.path.clone(),
            file_name,
            update_tx: self.update_tx,
            last_sent: None,
        };

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) => reload.on_event(&event),
                Err(e) => tracing::error!(error = %e, "Config watch error"),
            },
            Config::default().with_poll_interval(Duration::from_secs(2)),
        )?;
        watcher.watch(&directory, RecursiveMode::NonRecursive)?;

        tracing::info!(path = %self.path.display(), "Config watcher started");
        Ok(watcher)
    }
}

/// State owned by the notify callback.
struct Reload {
    path: PathBuf,
    file_name: Option<OsString>,
    update_tx: mpsc::UnboundedSender<SecureConfig>,
    last_sent: Option<SecureConfig>,
}

impl Reload {
    fn on_event(&mut self, event: &Event) {
        if !self.concerns_config(event) {
            return;
        }

        match event.kind {
            EventKind::Create(_)
            | EventKind::Modify(ModifyKind::Data(_))
            | EventKind::Access(AccessKind::Close(AccessMode::Write)) => {}
            EventKind::Modify(ModifyKind::Name(_)) | EventKind::Modify(ModifyKind::Any) => {
                // A rename away from the path leaves nothing to load; the
                // rename onto it is reported separately.
                if !self.path.exists() {
                    return;
                }
            }
            EventKind::Remove(_) => {
                tracing::debug!(path = %self.path.display(), "Config file removed, waiting for replacement");
                return;
            }
            _ => return,
        }

        self.reload();
    }

    fn concerns_config(&self, event: &Event) -> bool {
        let Some(file_name) = &self.file_name else {
            return false;
        };
        event
            .paths
            .iter()
            .any(|path| path.file_name() == Some(file_name.as_os_str()))
    }

    fn reload(&mut self) {
        let config = match load_config(&self.path) {
            Ok(config) => config.security,
            Err(e) => {
                tracing::error!(error = %e, "Failed to reload config, keeping current policy");
                return;
            }
        };

        // One save fires several events.
        if self.last_sent.as_ref() == Some(&config) {
            return;
        }

        tracing::info!(path = %self.path.display(), "Config file changed, publishing security policy");
        if self.update_tx.send(config.clone()).is_ok() {
            self.last_sent = Some(config);
        }
    }
}
