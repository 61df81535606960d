//! `demo` — print the effective configuration.

use crate::config::ConfigStore;
use crate::error::AppError;

pub fn run(store: &ConfigStore) -> Result<(), AppError> {
    let snapshot = store.current();
    let rendered = toml::to_string_pretty(&snapshot.table)
        .map_err(|e| AppError::Config(format!("cannot render configuration: {e}")))?;
    println!("# effective blitzd configuration");
    print!("{rendered}");
    Ok(())
}
