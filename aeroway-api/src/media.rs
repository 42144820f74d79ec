//! Local-disk image storage. Uploads land under the configured media root
//! with a uuid filename; repositories record the returned relative path.

use std::path::{Path, PathBuf};

use anyhow::Context;
use axum::extract::Multipart;
use uuid::Uuid;

use crate::error::AppError;

pub struct MediaStore {
    root: PathBuf,
}

impl MediaStore {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// Writes the bytes under `{root}/{prefix}/` keeping the original file
    /// extension, and returns the path relative to the media root.
    pub async fn save(
        &self,
        prefix: &str,
        original_name: &str,
        bytes: &[u8],
    ) -> anyhow::Result<String> {
        let extension = Path::new(original_name)
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or("bin");
        let relative = format!("{}/{}.{}", prefix, Uuid::new_v4(), extension);

        let full_path = self.root.join(&relative);
        if let Some(parent) = full_path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("creating media directory {}", parent.display()))?;
        }
        tokio::fs::write(&full_path, bytes)
            .await
            .with_context(|| format!("writing media file {}", full_path.display()))?;

        Ok(relative)
    }
}

/// Pulls the single `image` field out of a multipart upload.
pub async fn read_image_field(mut multipart: Multipart) -> Result<(String, Vec<u8>), AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|err| AppError::Validation(err.to_string()))?
    {
        if field.name() != Some("image") {
            continue;
        }
        let file_name = field.file_name().unwrap_or("upload").to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|err| AppError::Validation(err.to_string()))?;
        return Ok((file_name, bytes.to_vec()));
    }
    Err(AppError::Validation(
        "multipart field \"image\" is required".to_string(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn save_keeps_prefix_and_extension() {
        let dir = tempfile::tempdir().unwrap();
        let store = MediaStore::new(dir.path().to_path_buf());

        let path = store.save("airports", "photo.png", b"bytes").await.unwrap();
        assert!(path.starts_with("airports/"));
        assert!(path.ends_with(".png"));

        let written = tokio::fs::read(dir.path().join(&path)).await.unwrap();
        assert_eq!(written, b"bytes");
    }

    #[tokio::test]
    async fn save_falls_back_to_bin_without_extension() {
        let dir = tempfile::tempdir().unwrap();
        let store = MediaStore::new(dir.path().to_path_buf());

        let path = store.save("airplanes", "photo", b"bytes").await.unwrap();
        assert!(path.ends_with(".bin"));
    }
}
