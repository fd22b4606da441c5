use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

const ALLOWED_TYPES: [&str; 6] = [
    "image/jpeg",
    "image/png",
    "image/gif",
    "image/webp",
    "video/mp4",
    "video/webm",
];
const MAX_EXTENSION_LEN: usize = 8;

#[derive(Debug, Error)]
pub enum MediaStoreError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Local-disk file store for uploaded media. Files outside the MIME
/// allow-list or over the byte ceiling are skipped, not errors — the
/// upload endpoint reports only the files that made it.
#[derive(Debug, Clone)]
pub struct MediaStore {
    root: PathBuf,
    public_base: String,
    max_bytes: usize,
}

impl MediaStore {
    pub fn new(root: impl Into<PathBuf>, public_base: impl Into<String>, max_bytes: usize) -> Self {
        Self {
            root: root.into(),
            public_base: public_base.into(),
            max_bytes,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn max_bytes(&self) -> usize {
        self.max_bytes
    }

    pub async fn prepare(&self) -> Result<(), MediaStoreError> {
        tokio::fs::create_dir_all(&self.root).await?;
        Ok(())
    }

    pub fn accepts(content_type: &str) -> bool {
        ALLOWED_TYPES.contains(&content_type)
    }

    /// Stores one uploaded file and returns its public URL, or `None`
    /// when the file is rejected by type or size.
    pub async fn save(
        &self,
        original_name: &str,
        content_type: &str,
        bytes: &[u8],
    ) -> Result<Option<String>, MediaStoreError> {
        if !Self::accepts(content_type) {
            debug!(%content_type, "upload rejected: type not allowed");
            return Ok(None);
        }
        if bytes.len() > self.max_bytes {
            debug!(size = bytes.len(), "upload rejected: over size ceiling");
            return Ok(None);
        }
        let filename = format!("{}{}", Uuid::new_v4(), sanitize_extension(original_name));
        tokio::fs::write(self.root.join(&filename), bytes).await?;
        Ok(Some(format!(
            "{}/{}",
            self.public_base.trim_end_matches('/'),
            filename
        )))
    }
}

/// Keeps a short alphanumeric extension from the client filename, dot
/// included; anything else becomes an extension-less name.
fn sanitize_extension(name: &str) -> String {
    let Some((_, ext)) = name.rsplit_once('.') else {
        return String::new();
    };
    let ext = ext.to_ascii_lowercase();
    if ext.is_empty()
        || ext.len() > MAX_EXTENSION_LEN
        || !ext.chars().all(|ch| ch.is_ascii_alphanumeric())
    {
        return String::new();
    }
    format!(".{ext}")
}

#[cfg(test)]
mod tests {
    use super::{sanitize_extension, MediaStore};

    #[test]
    fn accepts_images_and_videos_only() {
        assert!(MediaStore::accepts("image/png"));
        assert!(MediaStore::accepts("video/webm"));
        assert!(!MediaStore::accepts("application/pdf"));
        assert!(!MediaStore::accepts("text/html"));
    }

    #[test]
    fn sanitize_extension_keeps_simple_suffix() {
        assert_eq!(sanitize_extension("photo.JPG"), ".jpg");
        assert_eq!(sanitize_extension("clip.webm"), ".webm");
    }

    #[test]
    fn sanitize_extension_drops_suspicious_names() {
        assert_eq!(sanitize_extension("no-extension"), "");
        assert_eq!(sanitize_extension("weird.{ext}"), "");
        assert_eq!(sanitize_extension("dot."), "");
        assert_eq!(sanitize_extension("long.abcdefghij"), "");
    }
}
