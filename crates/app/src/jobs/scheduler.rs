use std::future::Future;
use std::time::Duration;

use tokio::time::{interval, sleep};
use tracing::warn;

use crate::jobs::JobError;

/// Runs `job` on a fixed cadence, pausing for `failure_backoff` after a
/// failed run so a broken dependency is not hammered.
pub async fn run_interval<F, Fut>(
    name: &'static str,
    interval_duration: Duration,
    failure_backoff: Duration,
    mut job: F,
) -> Result<(), JobError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<(), JobError>>,
{
    let mut ticker = interval(interval_duration);
    loop {
        ticker.tick().await;
        if let Err(err) = job().await {
            warn!(error = %err, job = name, "job execution failed");
            sleep(failure_backoff).await;
        }
    }
}
