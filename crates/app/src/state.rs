use std::sync::Arc;

use crate::config::AppConfig;
use pinboard_infra::db::DbPool;
use pinboard_infra::mail::Mailer;
use pinboard_infra::media::MediaStore;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub db: Option<DbPool>,
    pub mailer: Arc<Mailer>,
    pub media: Arc<MediaStore>,
}
