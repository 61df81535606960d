//! `gencert` — show where TLS material is expected.
//!
//! Certificate issuance lives outside this crate; this command only reports
//! the resolved paths and whether anything is already in place.

use std::path::Path;

use crate::config::ConfigStore;
use crate::error::AppError;

pub fn run(store: &ConfigStore) -> Result<(), AppError> {
    let snapshot = store.current();
    let s = &snapshot.settings;

    println!("certificate paths for '{}':", s.alias);
    for (role, path) in [
        ("server ca", &s.server.cacert),
        ("server cert", &s.server.tlscert),
        ("server key", &s.server.tlskey),
        ("client ca", &s.client.cacert),
        ("client cert", &s.client.tlscert),
        ("client key", &s.client.tlskey),
    ] {
        println!("  {role:<12} {} ({})", path.display(), presence(path));
    }
    Ok(())
}

fn presence(path: &Path) -> &'static str {
    if path.exists() { "present" } else { "missing" }
}
