//! Background expiry task.

use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use waste_core::expiry::{sweep, ExpiryPolicy, SweepReport};
use waste_core::Database;

/// Run one sweep on the blocking pool.
///
/// Failures are logged and reported as `None`; the next cycle starts over.
pub async fn run_sweep(db: Arc<Database>, policy: ExpiryPolicy) -> Option<SweepReport> {
    tracing::info!("Expiry running");
    let now = chrono::Utc::now().timestamp();
    match tokio::task::spawn_blocking(move || sweep(&db, &policy, now)).await {
        Ok(Ok(report)) => {
            tracing::info!(
                scanned = report.scanned,
                permanent = report.permanent,
                undecodable = report.undecodable,
                expired = report.expired,
                "Expiry finished"
            );
            Some(report)
        }
        Ok(Err(err)) => {
            tracing::error!("Expiry sweep failed: {}", err);
            None
        }
        Err(err) => {
            tracing::error!("Expiry task panicked: {}", err);
            None
        }
    }
}

/// Spawn the periodic sweep. The first run happens one `every` after startup.
pub fn spawn_expiry(db: Arc<Database>, policy: ExpiryPolicy, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = interval_at(Instant::now() + every, every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            run_sweep(db.clone(), policy).await;
        }
    })
}
