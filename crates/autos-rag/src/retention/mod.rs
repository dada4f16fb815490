//! Retention sweeper for stale temp documents
//!
//! Temp documents have an at-most ~24h lifetime regardless of state. A
//! background loop deletes the expired ones every hour, with an immediate
//! first pass on startup. Overlapping ticks are skipped through an atomic
//! guard, each pass is bounded by a timeout, and the loop exits cleanly
//! when the shutdown signal flips.

use chrono::Utc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::timeout;

use crate::config::RetentionConfig;
use crate::storage::Database;

/// Background cleaner of the autos_temp table
pub struct RetentionSweeper {
    store: Arc<Database>,
    interval: Duration,
    older_than: chrono::Duration,
    run_timeout: Duration,
    running: AtomicBool,
}

impl RetentionSweeper {
    pub fn new(store: Arc<Database>, config: &RetentionConfig) -> Self {
        Self {
            store,
            interval: Duration::from_secs(config.sweep_interval_secs.max(1)),
            older_than: chrono::Duration::hours(config.max_age_hours.max(1) as i64),
            run_timeout: Duration::from_secs(config.run_timeout_secs.max(1)),
            running: AtomicBool::new(false),
        }
    }

    /// Spawn the sweeper loop. Flip the sender of `shutdown` to stop it.
    pub fn spawn(self: Arc<Self>, mut shutdown: watch::Receiver<bool>) -> JoinHandle<()> {
        tokio::spawn(async move {
            // Immediate first pass
            self.run_once().await;

            let mut ticker = tokio::time::interval(self.interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            ticker.tick().await; // consume the immediate tick

            loop {
                tokio::select! {
                    _ = shutdown.changed() => {
                        if *shutdown.borrow() {
                            tracing::info!("retention sweeper stopping (shutdown)");
                            return;
                        }
                    }
                    _ = ticker.tick() => {
                        self.run_once().await;
                    }
                }
            }
        })
    }

    /// One sweep pass. Skips instead of queueing when the previous pass is
    /// still running.
    pub async fn run_once(&self) {
        if self
            .running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            tracing::warn!("previous sweep still running; skipping this tick");
            return;
        }

        let start = std::time::Instant::now();
        let cutoff = Utc::now() - self.older_than;
        tracing::info!(cutoff = %cutoff.to_rfc3339(), "temp document sweep started");

        let store = Arc::clone(&self.store);
        let sweep = tokio::task::spawn_blocking(move || store.delete_temp_older_than(cutoff));

        match timeout(self.run_timeout, sweep).await {
            Ok(Ok(Ok(deleted))) => {
                tracing::info!(
                    deleted,
                    elapsed_ms = start.elapsed().as_millis() as u64,
                    "temp document sweep finished"
                );
            }
            Ok(Ok(Err(e))) => {
                tracing::warn!(error = %e, "sweep pass failed");
            }
            Ok(Err(e)) => {
                tracing::warn!(error = %e, "sweep task panicked");
            }
            Err(_) => {
                tracing::warn!(
                    timeout_secs = self.run_timeout.as_secs(),
                    "sweep pass timed out"
                );
            }
        }

        self.running.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sweeper(store: Arc<Database>) -> Arc<RetentionSweeper> {
        Arc::new(RetentionSweeper::new(store, &RetentionConfig::default()))
    }

    #[tokio::test]
    async fn expired_temp_documents_are_swept_and_fresh_ones_kept() {
        let store = Arc::new(Database::in_memory().unwrap());
        let old = store.insert_temp_document(1, 0, "old", "texto").unwrap();
        let fresh = store.insert_temp_document(1, 0, "fresh", "texto").unwrap();
        store.backdate_temp_document(&old.id, 25).unwrap();

        sweeper(Arc::clone(&store)).run_once().await;

        assert!(store.get_temp_document(&old.id).unwrap().is_none());
        assert!(store.get_temp_document(&fresh.id).unwrap().is_some());
    }

    #[tokio::test]
    async fn overlap_guard_skips_instead_of_queueing() {
        let store = Arc::new(Database::in_memory().unwrap());
        let old = store.insert_temp_document(1, 0, "old", "texto").unwrap();
        store.backdate_temp_document(&old.id, 25).unwrap();

        let sweeper = sweeper(Arc::clone(&store));
        // Simulate a pass still in flight
        sweeper.running.store(true, Ordering::Release);
        sweeper.run_once().await;
        assert!(store.get_temp_document(&old.id).unwrap().is_some());

        // Released guard sweeps normally
        sweeper.running.store(false, Ordering::Release);
        sweeper.run_once().await;
        assert!(store.get_temp_document(&old.id).unwrap().is_none());
    }

    #[tokio::test]
    async fn spawned_loop_runs_immediately_and_stops_on_shutdown() {
        let store = Arc::new(Database::in_memory().unwrap());
        let old = store.insert_temp_document(1, 0, "old", "texto").unwrap();
        store.backdate_temp_document(&old.id, 25).unwrap();

        let (tx, rx) = watch::channel(false);
        let handle = sweeper(Arc::clone(&store)).spawn(rx);

        // The immediate first pass deletes the expired record
        tokio::time::sleep(Duration::from_millis(200)).await;
        assert!(store.get_temp_document(&old.id).unwrap().is_none());

        tx.send(true).unwrap();
        tokio::time::timeout(Duration::from_secs(2), handle)
            .await
            .expect("sweeper did not stop on shutdown")
            .unwrap();
    }
}
