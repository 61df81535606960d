//! `grace` — run until interrupted, reading the live configuration.
//!
//! Edit the active config file while this runs: the watcher swaps in a new
//! snapshot and the logged alias follows without a restart.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tracing::info;

use crate::config::ConfigStore;
use crate::error::AppError;

const TICK: Duration = Duration::from_secs(1);
const LOG_EVERY: u64 = 5;

pub fn run(store: &ConfigStore) -> Result<(), AppError> {
    let stop = Arc::new(AtomicBool::new(false));
    register_signals(&stop)?;

    info!("running until SIGINT/SIGTERM");
    let mut ticks = 0u64;
    while !stop.load(Ordering::Relaxed) {
        std::thread::sleep(TICK);
        ticks += 1;
        if ticks % LOG_EVERY == 0 {
            let snapshot = store.current();
            info!(alias = %snapshot.settings.alias, "alive");
        }
    }
    info!("shutting down");
    Ok(())
}

#[cfg(unix)]
fn register_signals(stop: &Arc<AtomicBool>) -> Result<(), AppError> {
    use signal_hook::consts::{SIGINT, SIGTERM};

    for sig in [SIGINT, SIGTERM] {
        signal_hook::flag::register(sig, Arc::clone(stop))?;
    }
    Ok(())
}

#[cfg(not(unix))]
fn register_signals(_stop: &Arc<AtomicBool>) -> Result<(), AppError> {
    // No signal integration here; the default handler terminates the process.
    Ok(())
}
