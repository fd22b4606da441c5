use std::sync::Arc;

use thiserror::Error;

use crate::config::AppConfig;
use crate::state::AppState;
use pinboard_infra::db::{connect_lazy, DbPoolError};
use pinboard_infra::mail::{MailSettings, Mailer, MailerError};
use pinboard_infra::media::MediaStore;

#[derive(Debug, Error)]
pub enum WiringError {
    #[error("db error: {0}")]
    Db(#[from] DbPoolError),
    #[error("mailer error: {0}")]
    Mail(#[from] MailerError),
}

pub fn build_state(config: AppConfig) -> Result<AppState, WiringError> {
    let db = match config.database_url.as_deref() {
        Some(url) => Some(connect_lazy(url, config.db_max_connections)?),
        None => None,
    };
    let mailer = Mailer::new(&MailSettings {
        smtp_host: config.smtp_host.clone(),
        smtp_port: config.smtp_port,
        smtp_username: config.smtp_username.clone(),
        smtp_password: config.smtp_password.clone(),
        from: config.mail_from.clone(),
    })?;
    let media = MediaStore::new(
        config.upload_dir.clone(),
        config.upload_base_url.clone(),
        config.max_upload_bytes,
    );
    Ok(AppState {
        config: Arc::new(config),
        db,
        mailer: Arc::new(mailer),
        media: Arc::new(media),
    })
}
