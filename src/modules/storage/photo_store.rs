use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;

use crate::core::error::Result;
use crate::modules::google::DriveClient;

/// An uploaded photo, already renamed to its final safe filename
#[derive(Debug, Clone)]
pub struct PhotoUpload {
    pub file_name: String,
    pub content_type: String,
    pub data: Vec<u8>,
}

/// Where report photos end up.
///
/// Returns the reference recorded on the report: a bare filename for local
/// storage, a URL for hosted storage.
#[async_trait]
pub trait PhotoStore: Send + Sync {
    async fn store(&self, photo: PhotoUpload) -> Result<String>;
}

/// Writes photos into the local upload directory
pub struct LocalPhotoStore {
    upload_dir: PathBuf,
}

impl LocalPhotoStore {
    pub fn new(upload_dir: impl Into<PathBuf>) -> Self {
        Self {
            upload_dir: upload_dir.into(),
        }
    }
}

#[async_trait]
impl PhotoStore for LocalPhotoStore {
    async fn store(&self, photo: PhotoUpload) -> Result<String> {
        tokio::fs::create_dir_all(&self.upload_dir).await?;

        let path = self.upload_dir.join(&photo.file_name);
        tokio::fs::write(&path, &photo.data).await?;

        debug!("Photo saved to {}", path.display());
        Ok(photo.file_name)
    }
}

/// Keeps a local copy, then publishes the photo on Drive
pub struct DrivePhotoStore {
    local: LocalPhotoStore,
    drive: Arc<DriveClient>,
}

impl DrivePhotoStore {
    pub fn new(local: LocalPhotoStore, drive: Arc<DriveClient>) -> Self {
        Self { local, drive }
    }
}

#[async_trait]
impl PhotoStore for DrivePhotoStore {
    async fn store(&self, photo: PhotoUpload) -> Result<String> {
        let file_name = self.local.store(photo.clone()).await?;
        self.drive
            .upload_public(&file_name, &photo.content_type, photo.data)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::google::StaticTokenSource;
    use serde_json::json;
    use tempfile::TempDir;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn upload(name: &str) -> PhotoUpload {
        PhotoUpload {
            file_name: name.to_string(),
            content_type: "image/jpeg".into(),
            data: vec![0xFF, 0xD8, 0xFF, 0xE0],
        }
    }

    #[tokio::test]
    async fn test_local_store_writes_file() {
        let dir = TempDir::new().unwrap();
        let store = LocalPhotoStore::new(dir.path().join("uploads"));

        let reference = store.store(upload("sink_20240101000000.jpg")).await.unwrap();

        assert_eq!(reference, "sink_20240101000000.jpg");
        let written = std::fs::read(dir.path().join("uploads").join(&reference)).unwrap();
        assert_eq!(written, vec![0xFF, 0xD8, 0xFF, 0xE0]);
    }

    #[tokio::test]
    async fn test_drive_store_returns_hosted_url() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/upload/drive/v3/files"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "abc" })))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/drive/v3/files/abc/permissions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .mount(&server)
            .await;

        let dir = TempDir::new().unwrap();
        let drive = DriveClient::new(
            &server.uri(),
            "folder",
            Arc::new(StaticTokenSource("t".into())),
        )
        .unwrap();
        let store = DrivePhotoStore::new(LocalPhotoStore::new(dir.path()), Arc::new(drive));

        let reference = store.store(upload("door.jpg")).await.unwrap();
        assert_eq!(reference, "https://drive.google.com/uc?id=abc");
        assert!(dir.path().join("door.jpg").exists());
    }
}
