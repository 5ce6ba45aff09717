//! The lifespan sweeper: a background worker that periodically deletes
//! expired quads (spec.md §4.5).

use crate::store::TripleStore;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Default sweep rate, matching the system this is ported from.
pub const SWEEP_HZ: u64 = 2;

/// Deletes every quad whose `expires` has passed; returns how many were
/// removed.
pub fn sweep(store: &mut TripleStore) -> usize {
    let expired = store.expired_hashes(chrono::Utc::now());
    store.delete_by_hash(&expired)
}

/// Runs the sweeper on its own thread at [`SWEEP_HZ`] until `running` is
/// cleared.
pub fn spawn(store: Arc<Mutex<TripleStore>>, running: Arc<AtomicBool>, rate_hz: u64) -> std::thread::JoinHandle<()> {
    std::thread::spawn(move || {
        let period = Duration::from_millis(1000 / rate_hz);
        tracing::info!(rate_hz, "lifespan sweeper started");
        while running.load(Ordering::SeqCst) {
            std::thread::sleep(period);
            let removed = {
                let mut guard = store.lock().unwrap();
                sweep(&mut guard)
            };
            if removed > 0 {
                tracing::debug!(removed, "lifespan sweeper removed expired rows");
            }
        }
        tracing::info!("lifespan sweeper stopped");
    })
}
