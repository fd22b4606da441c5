use axum::extract::multipart::{Multipart, MultipartError};
use axum::extract::{Extension, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

use crate::http::middleware::session::CurrentUser;
use crate::state::AppState;
use pinboard_infra::media::MediaStoreError;

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub urls: Vec<String>,
}

#[derive(Debug, Error)]
pub enum UploadsApiError {
    #[error("no files selected")]
    NoFiles,
    #[error("multipart error: {0}")]
    Multipart(#[from] MultipartError),
    #[error("media store error: {0}")]
    Store(#[from] MediaStoreError),
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

/// Accepts any number of `files` parts. Files outside the allow-list or
/// over the size ceiling are skipped without a per-file error; the
/// response lists only the URLs that were stored.
pub async fn upload_files(
    State(state): State<AppState>,
    Extension(_current): Extension<CurrentUser>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, UploadsApiError> {
    let mut saw_file = false;
    let mut urls = Vec::new();
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some("files") {
            continue;
        }
        let Some(file_name) = field.file_name().map(str::to_string) else {
            continue;
        };
        let content_type = field.content_type().map(str::to_string).unwrap_or_default();
        let bytes = field.bytes().await?;
        saw_file = true;
        if let Some(url) = state.media.save(&file_name, &content_type, &bytes).await? {
            urls.push(url);
        }
    }
    if !saw_file {
        return Err(UploadsApiError::NoFiles);
    }
    Ok(Json(UploadResponse { urls }))
}

impl IntoResponse for UploadsApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            UploadsApiError::NoFiles | UploadsApiError::Multipart(_) => StatusCode::BAD_REQUEST,
            UploadsApiError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let body = Json(ErrorBody {
            error: self.to_string(),
        });
        (status, body).into_response()
    }
}
