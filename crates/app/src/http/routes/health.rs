use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub modules: HealthModules,
}

#[derive(Debug, Serialize)]
pub struct HealthModules {
    pub database: DatabaseStatus,
    pub sessions: SessionStatus,
    pub mail: MailStatus,
    pub uploads: UploadStatus,
}

#[derive(Debug, Serialize)]
pub struct DatabaseStatus {
    pub configured: bool,
}

#[derive(Debug, Serialize)]
pub struct SessionStatus {
    pub configured: bool,
}

#[derive(Debug, Serialize)]
pub struct MailStatus {
    pub enabled: bool,
}

#[derive(Debug, Serialize)]
pub struct UploadStatus {
    pub dir: String,
    pub max_bytes: usize,
}

pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let sessions_configured = state
        .config
        .session_secret
        .as_ref()
        .is_some_and(|value| !value.is_empty());

    Json(HealthResponse {
        status: "ok",
        modules: HealthModules {
            database: DatabaseStatus {
                configured: state.db.is_some(),
            },
            sessions: SessionStatus {
                configured: sessions_configured,
            },
            mail: MailStatus {
                enabled: state.mailer.is_enabled(),
            },
            uploads: UploadStatus {
                dir: state.media.root().display().to_string(),
                max_bytes: state.media.max_bytes(),
            },
        },
    })
}
