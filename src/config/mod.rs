//! Configuration resolution and live snapshot store.
//!
//! Startup applies four layers in fixed precedence order: hard-coded
//! defaults, the required system-wide file (`/etc/blitzd.toml`, or
//! `C:\blitzd.toml` on Windows), an optional `config.toml` override in the
//! blitzd home directory, and `BLITZD_*` environment variables. The merged
//! result is persisted to `saved.toml` and the last-loaded file is watched
//! for changes.
//!
//! # Module layout
//!
//! - **paths** — platform tag, fixed system-config paths, default blitzd
//!   home directory, tilde expansion.
//! - **types** — typed `Settings` structs consumed by subcommands.
//! - **resolve** — the layering algorithm: `apply_defaults`,
//!   `load_system_config`, `merge_user_config`, `apply_env_overrides`,
//!   `persist_snapshot`, orchestrated by `resolve`/`init`.
//! - **watch** — `ConfigStore` snapshot slot and the `notify`-backed
//!   file watcher that swaps new snapshots in on change.

mod paths;
mod resolve;
mod types;
mod watch;

pub use paths::{Platform, default_blitzd_dir, expand_home};
pub use resolve::{
    RECOGNIZED_KEYS, Resolution, SNAPSHOT_FILENAME, USER_CONFIG_FILENAME, get_key, init, resolve,
};
pub use types::{ClientSettings, ListenerSettings, ServerSettings, Settings};
pub use watch::{ConfigStore, Snapshot, watch};
