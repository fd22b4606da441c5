pub mod scheduler;
pub mod tasks;

use std::time::Duration;

use thiserror::Error;
use tracing::{info, warn};

use crate::state::AppState;

const FAILURE_BACKOFF: Duration = Duration::from_secs(30);

#[derive(Debug, Error)]
pub enum JobError {
    #[error("reset tokens db error: {0}")]
    ResetTokens(#[from] pinboard_infra::db::reset_tokens_repo::ResetTokensRepoError),
}

pub async fn start(state: AppState) -> Result<(), JobError> {
    if state.db.is_none() {
        warn!("db not configured; worker has nothing to do");
        return Ok(());
    }

    let cleanup_interval = state.config.token_cleanup_interval;
    let cleanup_state = state.clone();
    scheduler::run_interval(
        "reset_token_cleanup",
        cleanup_interval,
        FAILURE_BACKOFF,
        move || {
            let state = cleanup_state.clone();
            async move {
                match tasks::token_cleanup::run(&state).await {
                    Ok(0) => {}
                    Ok(removed) => info!(removed, "expired reset tokens removed"),
                    Err(err) => warn!(error = %err, "reset token cleanup failed"),
                }
                Ok(())
            }
        },
    )
    .await
}
