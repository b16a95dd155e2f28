//! Avatar image storage.

use std::io::Cursor;
use std::path::PathBuf;

use bytes::Bytes;
use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat};
use tracing::{debug, info};
use twitter_config::StorageConfig;
use uuid::Uuid;

use crate::types::{UserError, UserResult};

/// Persists uploaded avatars and returns the path to record on the user.
pub trait AvatarStore {
    async fn save(&self, image: Bytes) -> UserResult<String>;
}

/// Writes square JPEG avatars below `<web_root>/<avatar_dir>`.
#[derive(Debug, Clone)]
pub struct DiskAvatarStore {
    web_root: PathBuf,
    avatar_dir: String,
    size: u32,
}

impl DiskAvatarStore {
    pub fn new(config: &StorageConfig) -> Self {
        Self {
            web_root: PathBuf::from(&config.web_root),
            avatar_dir: config.avatar_dir.trim_matches('/').to_string(),
            size: config.avatar_size.max(1),
        }
    }

    pub fn directory(&self) -> PathBuf {
        self.web_root.join(&self.avatar_dir)
    }
}

impl AvatarStore for DiskAvatarStore {
    async fn save(&self, image: Bytes) -> UserResult<String> {
        let size = self.size;
        let encoded = tokio::task::spawn_blocking(move || resize_to_jpeg(&image, size))
            .await
            .map_err(std::io::Error::other)??;

        // One name for both the file on disk and the recorded path.
        let file_name = format!("{}.jpg", Uuid::new_v4());
        let directory = self.directory();
        tokio::fs::create_dir_all(&directory).await?;
        tokio::fs::write(directory.join(&file_name), &encoded).await?;

        let relative = format!("/{}/{}", self.avatar_dir, file_name);
        info!(path = %relative, bytes = encoded.len(), "stored avatar");
        Ok(relative)
    }
}

fn resize_to_jpeg(bytes: &[u8], size: u32) -> UserResult<Vec<u8>> {
    let decoded =
        image::load_from_memory(bytes).map_err(|err| UserError::InvalidImage(err.to_string()))?;
    debug!(
        width = decoded.width(),
        height = decoded.height(),
        size,
        "resizing avatar"
    );

    let resized = decoded.resize_exact(size, size, FilterType::Triangle);
    let mut output = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(resized.to_rgb8())
        .write_to(&mut output, ImageFormat::Jpeg)
        .map_err(|err| UserError::InvalidImage(err.to_string()))?;

    Ok(output.into_inner())
}
