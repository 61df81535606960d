//! Resolved configuration types consumed by subcommands.
//!
//! These deserialize from the merged key namespace after all layers are
//! applied; unknown keys contributed by config files are ignored here but
//! survive in the raw table (and in the snapshot).

use std::path::PathBuf;

use serde::Deserialize;

/// Fully-resolved effective configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    /// blitzd home directory (already expanded, no `~`).
    pub blitzd_dir: PathBuf,
    /// Path of the system config file that was loaded.
    pub default_cfg_path: String,
    /// Path of the user override file, empty if none was merged.
    pub custom_cfg_path: String,
    /// Node alias shown to peers and in logs.
    pub alias: String,
    /// host:port the REST proxy listens on.
    pub rest_host_port: String,
    /// host:port the RPC server listens on.
    pub rpc_host_port: String,
    pub server: ServerSettings,
    pub client: ClientSettings,
}

/// Server-side TLS material and listener switches.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub cacert: PathBuf,
    pub tlscert: PathBuf,
    pub tlskey: PathBuf,
    pub http: ListenerSettings,
    pub https: ListenerSettings,
    pub rpc: ListenerSettings,
}

/// Client-side TLS material.
#[derive(Debug, Clone, Deserialize)]
pub struct ClientSettings {
    pub cacert: PathBuf,
    pub tlscert: PathBuf,
    pub tlskey: PathBuf,
}

/// One enable/port pair for a listener.
#[derive(Debug, Clone, Deserialize)]
pub struct ListenerSettings {
    pub enabled: bool,
    pub port: u16,
}
