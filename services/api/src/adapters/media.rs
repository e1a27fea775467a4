//! services/api/src/adapters/media.rs
//!
//! Object storage for product images. The port keeps handlers independent of
//! where image bytes actually live; the bundled implementation writes them to
//! a local directory that the server exposes as static files.

use async_trait::async_trait;
use std::path::PathBuf;
use storefront_core::ports::{PortError, PortResult};
use uuid::Uuid;

/// Stores uploaded image bytes and hands back the public URL they will be
/// served under.
#[async_trait]
pub trait MediaStore: Send + Sync {
    async fn store_image(&self, original_file_name: &str, bytes: &[u8]) -> PortResult<String>;
}

/// A `MediaStore` backed by a directory on the local filesystem.
pub struct LocalMediaStore {
    root: PathBuf,
    public_base: String,
}

impl LocalMediaStore {
    pub fn new(root: PathBuf, public_base: String) -> Self {
        Self {
            root,
            public_base: public_base.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl MediaStore for LocalMediaStore {
    async fn store_image(&self, original_file_name: &str, bytes: &[u8]) -> PortResult<String> {
        // Only the extension is kept from the client-supplied name.
        let extension = original_file_name
            .rsplit('.')
            .next()
            .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()))
            .unwrap_or("bin");
        let file_name = format!("{}.{}", Uuid::new_v4(), extension);

        tokio::fs::create_dir_all(&self.root)
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;
        tokio::fs::write(self.root.join(&file_name), bytes)
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        Ok(format!("{}/{}", self.public_base, file_name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn stored_image_url_uses_public_base_and_keeps_extension() {
        let dir = std::env::temp_dir().join(format!("media-test-{}", Uuid::new_v4()));
        let store = LocalMediaStore::new(dir.clone(), "/media/".to_string());

        let url = store.store_image("photo.JPG", b"not really a jpeg").await.unwrap();
        assert!(url.starts_with("/media/"));
        assert!(url.ends_with(".JPG"));

        let file_name = url.rsplit('/').next().unwrap();
        let on_disk = tokio::fs::read(dir.join(file_name)).await.unwrap();
        assert_eq!(on_disk, b"not really a jpeg");
        tokio::fs::remove_dir_all(dir).await.unwrap();
    }

    #[tokio::test]
    async fn suspicious_file_names_fall_back_to_bin_extension() {
        let dir = std::env::temp_dir().join(format!("media-test-{}", Uuid::new_v4()));
        let store = LocalMediaStore::new(dir.clone(), "/media".to_string());

        let url = store.store_image("../../etc/passwd", b"x").await.unwrap();
        assert!(url.ends_with(".bin"));
        tokio::fs::remove_dir_all(dir).await.unwrap();
    }
}
