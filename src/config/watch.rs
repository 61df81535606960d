//! Live configuration snapshot store and file-change watcher.
//!
//! Startup produces one immutable [`Snapshot`]; the watcher callback is the
//! sole writer afterwards and always swaps in a whole new snapshot rather
//! than mutating fields in place, so readers never see a torn update.

use std::env;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use notify::{Event, RecommendedWatcher, RecursiveMode, Watcher};
use tracing::{error, info};

use crate::error::AppError;

use super::resolve::{self, Resolution};
use super::types::Settings;

/// One immutable resolved configuration.
#[derive(Debug)]
pub struct Snapshot {
    /// Typed view of the effective configuration.
    pub settings: Settings,
    /// Raw merged key namespace, as persisted to `saved.toml`.
    pub table: toml::value::Table,
}

impl From<Resolution> for Snapshot {
    fn from(resolution: Resolution) -> Self {
        Self {
            settings: resolution.settings,
            table: resolution.table,
        }
    }
}

/// Process-wide configuration slot. Built once at startup, read by every
/// subcommand; the reload path replaces the inner `Arc` atomically.
#[derive(Debug)]
pub struct ConfigStore {
    blitzd_dir: PathBuf,
    /// System config file the startup resolution loaded. Reloads go through
    /// the same file rather than re-deriving it from the platform.
    system_path: PathBuf,
    current: RwLock<Arc<Snapshot>>,
}

impl ConfigStore {
    pub fn new(blitzd_dir: PathBuf, resolution: Resolution) -> Self {
        Self {
            blitzd_dir,
            system_path: PathBuf::from(&resolution.settings.default_cfg_path),
            current: RwLock::new(Arc::new(resolution.into())),
        }
    }

    /// The current effective configuration. The returned snapshot stays
    /// valid even if a reload swaps in a newer one while it is held.
    pub fn current(&self) -> Arc<Snapshot> {
        match self.current.read() {
            Ok(guard) => Arc::clone(&guard),
            Err(poisoned) => Arc::clone(&poisoned.into_inner()),
        }
    }

    /// Home directory this store was resolved against.
    pub fn blitzd_dir(&self) -> &Path {
        &self.blitzd_dir
    }

    /// Re-run the full resolution and swap the result in. A failed reload
    /// leaves the current snapshot in place; fatal-on-malformed applies
    /// only at startup, where no prior good configuration exists.
    fn reload(&self) {
        match resolve::resolve(&self.blitzd_dir, &self.system_path, env::vars()) {
            Ok(resolution) => self.swap(Arc::new(resolution.into())),
            Err(e) => {
                error!(error = %e, "config reload failed, keeping previous configuration");
            }
        }
    }

    fn swap(&self, snapshot: Arc<Snapshot>) {
        match self.current.write() {
            Ok(mut guard) => *guard = snapshot,
            Err(poisoned) => *poisoned.into_inner() = snapshot,
        }
    }
}

/// Watch the given config file for changes.
///
/// The watch is registered on the file's parent directory and filtered to
/// the file's name, so rename-replace saves (vim and most IDEs swap in a
/// new inode) keep being observed after the original file disappears. On a
/// matching create/modify/remove event the change is logged, the full
/// resolution re-runs, and on success the new snapshot replaces the current
/// one (re-persisting `saved.toml` along the way). A failed reload keeps
/// the previous snapshot; a live process is never killed by an edit that
/// does not parse.
///
/// The returned watcher must stay alive for watching to continue; dropping
/// it stops the notifications.
pub fn watch(store: Arc<ConfigStore>, file: PathBuf) -> Result<RecommendedWatcher, AppError> {
    let watch_dir = file
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));
    let watched = file;

    let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| {
        let event = match res {
            Ok(event) => event,
            Err(e) => {
                error!(error = %e, "config watch error");
                return;
            }
        };
        if !(event.kind.is_modify() || event.kind.is_create() || event.kind.is_remove()) {
            return;
        }
        // The directory watch sees every sibling, including our own
        // saved.toml snapshot writes; only the config file matters.
        if !event
            .paths
            .iter()
            .any(|p| p.file_name() == watched.file_name())
        {
            return;
        }

        info!(file = %watched.display(), "config file changed");
        store.reload();
    })
    .map_err(|e| AppError::Watch(e.to_string()))?;

    watcher
        .watch(&watch_dir, RecursiveMode::NonRecursive)
        .map_err(|e| AppError::Watch(e.to_string()))?;

    Ok(watcher)
}
