//! Live re-conversion of vault changes.
//!
//! Change events flow through an mpsc channel into a single drain
//! thread, so conversions are strictly serialized: events arriving
//! while one conversion runs queue in the channel and are handled in
//! order, never dropped and never run concurrently.

use anyhow::{Context, Result};
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::Path;
use std::sync::mpsc;

use crate::config::Config;
use crate::pipeline;
use crate::vault::VAULT_CONFIG_DIR;

/// Watches the vault and re-converts changed files one at a time.
///
/// Dropping the watcher stops event delivery; the drain thread ends
/// once the channel disconnects.
pub struct VaultWatcher {
    _watcher: RecommendedWatcher,
}

impl VaultWatcher {
    /// Starts watching the vault root recursively.
    ///
    /// # Arguments
    ///
    /// * `config`: Conversion configuration, owned by the drain thread
    ///
    /// # Errors
    ///
    /// Returns error if the watcher cannot be created or attached to
    /// the vault root.
    pub fn spawn(config: Config) -> Result<Self> {
        let (tx, rx) = mpsc::channel();

        let mut watcher = notify::recommended_watcher(move |event| {
            // A send failure means the drain thread is gone; nothing to do
            let _ = tx.send(event);
        })
        .context("failed to create file watcher")?;

        watcher
            .watch(&config.vault, RecursiveMode::Recursive)
            .with_context(|| format!("failed to watch vault: {}", config.vault.display()))?;

        std::thread::spawn(move || drain(&config, rx));

        Ok(Self { _watcher: watcher })
    }
}

/// Serial event loop: one conversion at a time, in arrival order.
fn drain(config: &Config, rx: mpsc::Receiver<notify::Result<Event>>) {
    for result in rx {
        let event = match result {
            Ok(event) => event,
            Err(e) => {
                log::warn!("watch error: {}", e);
                continue;
            }
        };

        if !matches!(event.kind, EventKind::Create(_) | EventKind::Modify(_)) {
            continue;
        }

        for path in &event.paths {
            let Some(rel) = vault_relative(&config.vault, path) else {
                continue;
            };

            if is_ignored(&rel) || !path.is_file() {
                continue;
            }

            log::info!("change detected, re-converting {}", rel);
            if let Err(e) = pipeline::convert_one(config, &rel) {
                log::error!("failed to re-convert {}: {:#}", rel, e);
            }
        }
    }
}

/// Maps an absolute event path to a `/`-separated vault-relative path.
fn vault_relative(vault: &Path, path: &Path) -> Option<String> {
    let rel = path.strip_prefix(vault).ok()?;
    let rel = rel.to_str()?;
    Some(rel.replace(std::path::MAIN_SEPARATOR, "/"))
}

/// Filters events the pipeline must not react to.
fn is_ignored(rel: &str) -> bool {
    rel.split('/').next() == Some(VAULT_CONFIG_DIR)
}
