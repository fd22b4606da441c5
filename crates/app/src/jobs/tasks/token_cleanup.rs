use chrono::Utc;

use crate::jobs::JobError;
use crate::state::AppState;
use pinboard_infra::db::reset_tokens_repo;

pub async fn run(state: &AppState) -> Result<u64, JobError> {
    let Some(pool) = state.db.as_ref() else {
        return Ok(0);
    };
    let removed = reset_tokens_repo::delete_expired(pool, Utc::now()).await?;
    Ok(removed)
}
