//! Fixed-precedence configuration resolution.
//!
//! Layers, lowest to highest: hard-coded defaults, the required system-wide
//! file, the optional per-user override file, `BLITZD_*` environment
//! variables. Later layers win key-by-key; tables merge recursively, they
//! never replace each other wholesale.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use toml::Value;
use toml::value::Table;
use tracing::{info, warn};

use crate::error::AppError;

use super::paths::Platform;
use super::types::Settings;

/// Per-user override file, looked up under the blitzd home directory.
pub const USER_CONFIG_FILENAME: &str = "config.toml";
/// Snapshot of the effective configuration, written under the home directory.
pub const SNAPSHOT_FILENAME: &str = "saved.toml";

const ENV_PREFIX: &str = "BLITZD";

const DEFAULT_ALIAS: &str = "MyBlitz42";

const TLS_SERVER_CA_CERT_FILENAME: &str = "blitzd_ca.crt";
const TLS_SERVER_CERT_FILENAME: &str = "blitzd_server.crt";
const TLS_SERVER_KEY_FILENAME: &str = "blitzd_server.key";

const TLS_CLIENT_CA_CERT_FILENAME: &str = "blitzd_ca.crt";
const TLS_CLIENT_CERT_FILENAME: &str = "blitzd_client.crt";
const TLS_CLIENT_KEY_FILENAME: &str = "blitzd_client.key";

const DEFAULT_REST_HOST_PORT: &str = "localhost:38080";
const DEFAULT_RPC_HOST_PORT: &str = "localhost:39735";

/// Every dotted key the resolver recognises. Environment overrides are
/// scanned for exactly this set; anything else in the environment is
/// ignored.
pub const RECOGNIZED_KEYS: &[&str] = &[
    "blitzdDir",
    "defaultCfgPath",
    "customCfgPath",
    "alias",
    "server.cacert",
    "server.tlscert",
    "server.tlskey",
    "client.cacert",
    "client.tlscert",
    "client.tlskey",
    "restHostPort",
    "rpcHostPort",
    "server.http.enabled",
    "server.http.port",
    "server.https.enabled",
    "server.https.port",
    "server.rpc.enabled",
    "server.rpc.port",
];

/// Outcome of a full resolution pass.
#[derive(Debug, Clone)]
pub struct Resolution {
    /// Typed view of the effective configuration.
    pub settings: Settings,
    /// Raw merged key namespace, exactly what the snapshot persists.
    pub table: Table,
    /// The last config file successfully loaded: the user override if it
    /// was merged, otherwise the system file. This is the file the watcher
    /// monitors.
    pub active_file: PathBuf,
}

/// Resolve using the platform system-config path and the live process
/// environment. This is the entrypoint `main` (and the reload path) uses.
pub fn init(blitzd_dir: &Path) -> Result<Resolution, AppError> {
    let system_path = Platform::current().system_config_path();
    resolve(blitzd_dir, &system_path, env::vars())
}

/// Run the full resolution sequence against explicit inputs. The steps run
/// strictly in order: defaults, system file, user override, environment,
/// then snapshot persistence. Tests pass their own paths and variables
/// instead of mutating process state.
pub fn resolve<I>(blitzd_dir: &Path, system_path: &Path, env_vars: I) -> Result<Resolution, AppError>
where
    I: IntoIterator<Item = (String, String)>,
{
    let defaults = apply_defaults(blitzd_dir);
    let config = load_system_config(defaults, system_path)?;
    let (mut config, user_merged) = merge_user_config(config, blitzd_dir)?;
    apply_env_overrides(&mut config, env_vars);

    let settings: Settings = Value::Table(config.clone())
        .try_into()
        .map_err(|e| AppError::Config(format!("invalid effective configuration: {e}")))?;

    let active_file = if user_merged {
        blitzd_dir.join(USER_CONFIG_FILENAME)
    } else {
        system_path.to_path_buf()
    };

    persist_snapshot(&config, blitzd_dir);

    Ok(Resolution {
        settings,
        table: config,
        active_file,
    })
}

/// Populate every recognised key with its hard-coded default. Path defaults
/// are the blitzd home directory joined with a fixed filename. Pure
/// assignment, no failure mode.
pub fn apply_defaults(blitzd_dir: &Path) -> Table {
    let mut t = Table::new();

    set_key(&mut t, "blitzdDir", path_value(blitzd_dir.to_path_buf()));
    set_key(&mut t, "defaultCfgPath", Value::String(String::new()));
    set_key(&mut t, "customCfgPath", Value::String(String::new()));
    set_key(&mut t, "alias", Value::String(DEFAULT_ALIAS.to_string()));

    set_key(&mut t, "server.cacert", path_value(blitzd_dir.join(TLS_SERVER_CA_CERT_FILENAME)));
    set_key(&mut t, "server.tlscert", path_value(blitzd_dir.join(TLS_SERVER_CERT_FILENAME)));
    set_key(&mut t, "server.tlskey", path_value(blitzd_dir.join(TLS_SERVER_KEY_FILENAME)));
    set_key(&mut t, "client.cacert", path_value(blitzd_dir.join(TLS_CLIENT_CA_CERT_FILENAME)));
    set_key(&mut t, "client.tlscert", path_value(blitzd_dir.join(TLS_CLIENT_CERT_FILENAME)));
    set_key(&mut t, "client.tlskey", path_value(blitzd_dir.join(TLS_CLIENT_KEY_FILENAME)));

    set_key(&mut t, "restHostPort", Value::String(DEFAULT_REST_HOST_PORT.to_string()));
    set_key(&mut t, "rpcHostPort", Value::String(DEFAULT_RPC_HOST_PORT.to_string()));

    set_key(&mut t, "server.http.enabled", Value::Boolean(true));
    set_key(&mut t, "server.http.port", Value::Integer(30080));
    set_key(&mut t, "server.https.enabled", Value::Boolean(true));
    set_key(&mut t, "server.https.port", Value::Integer(30080));
    set_key(&mut t, "server.rpc.enabled", Value::Boolean(true));
    set_key(&mut t, "server.rpc.port", Value::Integer(39735));

    t
}

/// Read the required system-wide config file and overlay it onto the
/// defaults. A missing or malformed file is an error; the caller treats it
/// as fatal.
pub fn load_system_config(config: Table, path: &Path) -> Result<Table, AppError> {
    let overlay = read_toml(path)?;
    let mut merged = merge_tables(config, overlay);
    set_key(
        &mut merged,
        "defaultCfgPath",
        Value::String(path.display().to_string()),
    );
    info!(path = %path.display(), "loaded system config file");
    Ok(merged)
}

/// Merge the optional per-user override file from the blitzd home
/// directory. An absent file is skipped with an info log; a present but
/// unreadable/unparsable file is an error. Returns whether a merge
/// happened, so the caller knows which file to watch.
pub fn merge_user_config(config: Table, blitzd_dir: &Path) -> Result<(Table, bool), AppError> {
    let path = blitzd_dir.join(USER_CONFIG_FILENAME);
    if !path.exists() {
        info!(path = %path.display(), "user config file does not exist - skipping");
        return Ok((config, false));
    }

    let overlay = read_toml(&path)?;
    let mut merged = merge_tables(config, overlay);
    set_key(
        &mut merged,
        "customCfgPath",
        Value::String(path.display().to_string()),
    );
    info!(path = %path.display(), "merged user config file");
    Ok((merged, true))
}

/// Overlay matching `BLITZD_*` environment variables onto the
/// configuration. A recognised key maps to its upper-cased,
/// underscore-joined form (`server.http.port` → `BLITZD_SERVER_HTTP_PORT`).
/// Values are coerced to the type of the value they replace; a variable
/// that fails bool/integer coercion is ignored with a warning. Variables
/// matching no recognised key are ignored entirely. No failure mode.
pub fn apply_env_overrides<I>(config: &mut Table, env_vars: I)
where
    I: IntoIterator<Item = (String, String)>,
{
    let vars: std::collections::HashMap<String, String> = env_vars.into_iter().collect();

    for key in RECOGNIZED_KEYS {
        let name = env_var_name(key);
        let Some(raw) = vars.get(&name) else {
            continue;
        };
        let value = match get_key(config, key) {
            Some(Value::Boolean(_)) => match raw.parse::<bool>() {
                Ok(b) => Value::Boolean(b),
                Err(_) => {
                    warn!(var = %name, value = %raw, "ignoring non-boolean env override");
                    continue;
                }
            },
            Some(Value::Integer(_)) => match raw.parse::<i64>() {
                Ok(i) => Value::Integer(i),
                Err(_) => {
                    warn!(var = %name, value = %raw, "ignoring non-integer env override");
                    continue;
                }
            },
            _ => Value::String(raw.clone()),
        };
        set_key(config, key, value);
    }
}

/// Write the fully resolved configuration to `saved.toml` under the blitzd
/// home directory, overwriting any prior snapshot. Best-effort: failure is
/// logged at warn level and never fatal.
pub fn persist_snapshot(config: &Table, blitzd_dir: &Path) {
    let path = blitzd_dir.join(SNAPSHOT_FILENAME);
    let rendered = match toml::to_string_pretty(config) {
        Ok(s) => s,
        Err(e) => {
            warn!(error = %e, "cannot serialize config snapshot");
            return;
        }
    };
    if let Err(e) = fs::write(&path, rendered) {
        warn!(path = %path.display(), error = %e, "cannot write config snapshot");
    }
}

/// Deep-merge two TOML values.
/// Tables are merged recursively — the overlay only needs to specify keys
/// that differ from the base. For every other type (string, integer,
/// boolean, array, …) the overlay value replaces the base value wholesale.
fn merge_toml(base: Value, overlay: Value) -> Value {
    match (base, overlay) {
        (Value::Table(base_tbl), Value::Table(overlay_tbl)) => {
            Value::Table(merge_tables(base_tbl, overlay_tbl))
        }
        (_, overlay) => overlay,
    }
}

fn merge_tables(mut base: Table, overlay: Table) -> Table {
    for (key, ov_val) in overlay {
        let merged = match base.remove(&key) {
            Some(base_val) => merge_toml(base_val, ov_val),
            None => ov_val,
        };
        base.insert(key, merged);
    }
    base
}

fn read_toml(path: &Path) -> Result<Table, AppError> {
    let raw = fs::read_to_string(path)
        .map_err(|e| AppError::Config(format!("cannot read {}: {e}", path.display())))?;
    toml::from_str(&raw)
        .map_err(|e| AppError::Config(format!("parse error in {}: {e}", path.display())))
}

/// Set a dotted key, creating intermediate tables as needed. A scalar in
/// the way of an intermediate segment is replaced by a table.
fn set_key(table: &mut Table, dotted: &str, value: Value) {
    match dotted.split_once('.') {
        None => {
            table.insert(dotted.to_string(), value);
        }
        Some((head, rest)) => {
            let entry = table
                .entry(head.to_string())
                .or_insert_with(|| Value::Table(Table::new()));
            if let Value::Table(inner) = entry {
                set_key(inner, rest, value);
            } else {
                let mut inner = Table::new();
                set_key(&mut inner, rest, value);
                *entry = Value::Table(inner);
            }
        }
    }
}

/// Look up a dotted key.
pub fn get_key<'a>(table: &'a Table, dotted: &str) -> Option<&'a Value> {
    match dotted.split_once('.') {
        None => table.get(dotted),
        Some((head, rest)) => get_key(table.get(head)?.as_table()?, rest),
    }
}

fn env_var_name(key: &str) -> String {
    format!("{ENV_PREFIX}_{}", key.replace('.', "_").to_uppercase())
}

fn path_value(path: PathBuf) -> Value {
    Value::String(path.to_string_lossy().into_owned())
}
