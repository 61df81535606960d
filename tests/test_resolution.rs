//! End-to-end tests for the configuration resolution sequence:
//! defaults → system file → user override → environment → snapshot.

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use toml::Value;
use toml::value::Table;

use blitzd::config::{self, RECOGNIZED_KEYS, Resolution, SNAPSHOT_FILENAME, USER_CONFIG_FILENAME};

const SYSTEM_TOML: &str = r#"
alias = "SystemAlias"
restHostPort = "0.0.0.0:48080"

[server.http]
port = 18080
"#;

const USER_TOML: &str = r#"
alias = "UserAlias"

[server.https]
enabled = false
"#;

fn write_system(dir: &TempDir, content: &str) -> PathBuf {
    let path = dir.path().join("system.toml");
    fs::write(&path, content).unwrap();
    path
}

fn write_user(dir: &TempDir, content: &str) {
    fs::write(dir.path().join(USER_CONFIG_FILENAME), content).unwrap();
}

fn no_env() -> Vec<(String, String)> {
    Vec::new()
}

fn resolve(dir: &TempDir, system: &Path, env: Vec<(String, String)>) -> Resolution {
    config::resolve(dir.path(), system, env).unwrap()
}

fn str_key<'a>(table: &'a Table, key: &str) -> &'a str {
    config::get_key(table, key)
        .and_then(Value::as_str)
        .unwrap_or_else(|| panic!("missing string key '{key}'"))
}

#[test]
fn layering_precedence_defaults_system_user_env() {
    let dir = TempDir::new().unwrap();
    let system = write_system(&dir, SYSTEM_TOML);
    write_user(&dir, USER_TOML);

    let env = vec![("BLITZD_RPCHOSTPORT".to_string(), "envhost:1".to_string())];
    let r = resolve(&dir, &system, env);

    // user file beats system file
    assert_eq!(r.settings.alias, "UserAlias");
    // system file beats defaults
    assert_eq!(r.settings.rest_host_port, "0.0.0.0:48080");
    assert_eq!(r.settings.server.http.port, 18080);
    // env beats everything
    assert_eq!(r.settings.rpc_host_port, "envhost:1");
    // merge, not replace: user's https section coexists with system's http
    assert!(!r.settings.server.https.enabled);
    assert!(r.settings.server.http.enabled);
    // untouched keys keep their defaults
    assert_eq!(r.settings.server.rpc.port, 39735);
    assert_eq!(
        r.settings.server.tlskey,
        dir.path().join("blitzd_server.key")
    );
}

#[test]
fn env_alias_overrides_both_files() {
    let dir = TempDir::new().unwrap();
    let system = write_system(&dir, SYSTEM_TOML);
    write_user(&dir, USER_TOML);

    let env = vec![("BLITZD_ALIAS".to_string(), "Foo".to_string())];
    let r = resolve(&dir, &system, env);
    assert_eq!(r.settings.alias, "Foo");
}

#[test]
fn every_recognized_key_is_populated() {
    let dir = TempDir::new().unwrap();
    let system = write_system(&dir, "alias = \"x\"\n");
    let r = resolve(&dir, &system, no_env());
    for key in RECOGNIZED_KEYS {
        assert!(
            config::get_key(&r.table, key).is_some(),
            "key '{key}' missing from effective configuration"
        );
    }
}

#[test]
fn absent_user_file_is_skipped() {
    let dir = TempDir::new().unwrap();
    let system = write_system(&dir, SYSTEM_TOML);

    let r = resolve(&dir, &system, no_env());
    assert_eq!(r.settings.alias, "SystemAlias");
    assert_eq!(r.settings.custom_cfg_path, "");
    // the system file is the last one loaded, so it is the watch target
    assert_eq!(r.active_file, system);
}

#[test]
fn merged_user_file_becomes_watch_target() {
    let dir = TempDir::new().unwrap();
    let system = write_system(&dir, SYSTEM_TOML);
    write_user(&dir, USER_TOML);

    let r = resolve(&dir, &system, no_env());
    let user_path = dir.path().join(USER_CONFIG_FILENAME);
    assert_eq!(r.active_file, user_path);
    assert_eq!(
        str_key(&r.table, "customCfgPath"),
        user_path.display().to_string()
    );
    assert_eq!(
        str_key(&r.table, "defaultCfgPath"),
        system.display().to_string()
    );
}

#[test]
fn missing_system_file_is_fatal() {
    let dir = TempDir::new().unwrap();
    let result = config::resolve(dir.path(), &dir.path().join("absent.toml"), no_env());
    let msg = result.unwrap_err().to_string();
    assert!(msg.contains("cannot read"), "got: {msg}");
}

#[test]
fn malformed_system_file_is_fatal() {
    let dir = TempDir::new().unwrap();
    let system = write_system(&dir, "alias = [unterminated\n");
    let result = config::resolve(dir.path(), &system, no_env());
    let msg = result.unwrap_err().to_string();
    assert!(msg.contains("parse error"), "got: {msg}");
}

#[test]
fn malformed_user_file_is_fatal() {
    let dir = TempDir::new().unwrap();
    let system = write_system(&dir, SYSTEM_TOML);
    write_user(&dir, "this is not toml ===");
    let result = config::resolve(dir.path(), &system, no_env());
    let msg = result.unwrap_err().to_string();
    assert!(msg.contains("parse error"), "got: {msg}");
}

#[test]
fn resolution_is_idempotent() {
    let dir = TempDir::new().unwrap();
    let system = write_system(&dir, SYSTEM_TOML);
    write_user(&dir, USER_TOML);

    let first = resolve(&dir, &system, no_env());
    let first_snapshot = fs::read_to_string(dir.path().join(SNAPSHOT_FILENAME)).unwrap();

    let second = resolve(&dir, &system, no_env());
    let second_snapshot = fs::read_to_string(dir.path().join(SNAPSHOT_FILENAME)).unwrap();

    assert_eq!(first.table, second.table);
    assert_eq!(first_snapshot, second_snapshot);
}

#[test]
fn snapshot_reparses_to_effective_configuration() {
    let dir = TempDir::new().unwrap();
    let system = write_system(&dir, SYSTEM_TOML);
    write_user(&dir, USER_TOML);

    let r = resolve(&dir, &system, no_env());
    let raw = fs::read_to_string(dir.path().join(SNAPSHOT_FILENAME)).unwrap();
    let reparsed: Table = toml::from_str(&raw).unwrap();
    assert_eq!(reparsed, r.table);
}

#[test]
fn snapshot_write_failure_is_not_fatal() {
    let dir = TempDir::new().unwrap();
    let system = write_system(&dir, SYSTEM_TOML);
    // a directory in the snapshot's place makes the write fail
    fs::create_dir(dir.path().join(SNAPSHOT_FILENAME)).unwrap();

    let result = config::resolve(dir.path(), &system, no_env());
    assert!(result.is_ok());
}

#[test]
fn unknown_keys_from_files_survive_in_table_and_snapshot() {
    let dir = TempDir::new().unwrap();
    let system = write_system(&dir, "alias = \"x\"\n\n[extras]\nnote = \"kept\"\n");

    let r = resolve(&dir, &system, no_env());
    assert_eq!(str_key(&r.table, "extras.note"), "kept");

    let raw = fs::read_to_string(dir.path().join(SNAPSHOT_FILENAME)).unwrap();
    let reparsed: Table = toml::from_str(&raw).unwrap();
    assert_eq!(str_key(&reparsed, "extras.note"), "kept");
}

#[test]
fn typed_settings_reject_bad_port() {
    let dir = TempDir::new().unwrap();
    let system = write_system(&dir, "[server.http]\nport = 123456\n");
    let result = config::resolve(dir.path(), &system, no_env());
    let msg = result.unwrap_err().to_string();
    assert!(msg.contains("invalid effective configuration"), "got: {msg}");
}
