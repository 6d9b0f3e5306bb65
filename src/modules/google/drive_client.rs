use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

use super::{ensure_success, transport_error, AccessTokenSource};
use crate::core::error::{AppError, Result};

#[derive(Debug, Deserialize)]
struct CreatedFile {
    id: String,
}

/// Drive v3 client that uploads photos into one folder and shares them
/// publicly.
pub struct DriveClient {
    http: reqwest::Client,
    base_url: String,
    folder_id: String,
    tokens: Arc<dyn AccessTokenSource>,
}

impl DriveClient {
    pub fn new(base_url: &str, folder_id: &str, tokens: Arc<dyn AccessTokenSource>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent("ApartmentReports/1.0")
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            folder_id: folder_id.to_string(),
            tokens,
        })
    }

    /// Public view URL for a Drive file id
    pub fn public_url(file_id: &str) -> String {
        format!("https://drive.google.com/uc?id={}", file_id)
    }

    /// Upload `data` as `name`, grant anyone read access, and return the
    /// public URL.
    pub async fn upload_public(&self, name: &str, content_type: &str, data: Vec<u8>) -> Result<String> {
        let file_id = self.create_file(name, content_type, data).await?;
        self.share_with_anyone(&file_id).await?;

        info!("Uploaded {} to Drive as {}", name, file_id);
        Ok(Self::public_url(&file_id))
    }

    async fn create_file(&self, name: &str, content_type: &str, data: Vec<u8>) -> Result<String> {
        let token = self.tokens.access_token().await?;

        let metadata = json!({
            "name": name,
            "parents": [self.folder_id],
        });
        let boundary = format!("apartment-reports-{}", Uuid::new_v4().simple());
        let body = multipart_related(&boundary, &metadata.to_string(), content_type, &data);

        debug!("Drive upload: {} ({} bytes)", name, data.len());

        let response = self
            .http
            .post(format!("{}/upload/drive/v3/files", self.base_url))
            .bearer_auth(token)
            .query(&[
                ("uploadType", "multipart"),
                ("supportsAllDrives", "true"),
                ("fields", "id"),
            ])
            .header(
                reqwest::header::CONTENT_TYPE,
                format!("multipart/related; boundary={}", boundary),
            )
            .body(body)
            .send()
            .await
            .map_err(|e| transport_error("Drive upload", e))?;

        let created: CreatedFile = ensure_success(response, "Drive upload")
            .await?
            .json()
            .await
            .map_err(|e| transport_error("Drive upload", e))?;

        Ok(created.id)
    }

    async fn share_with_anyone(&self, file_id: &str) -> Result<()> {
        let token = self.tokens.access_token().await?;

        let response = self
            .http
            .post(format!(
                "{}/drive/v3/files/{}/permissions",
                self.base_url, file_id
            ))
            .bearer_auth(token)
            .query(&[("supportsAllDrives", "true")])
            .json(&json!({ "role": "reader", "type": "anyone" }))
            .send()
            .await
            .map_err(|e| transport_error("Drive share", e))?;

        ensure_success(response, "Drive share").await?;
        Ok(())
    }
}

/// Assemble a `multipart/related` body: JSON metadata part, then the media
fn multipart_related(boundary: &str, metadata: &str, content_type: &str, data: &[u8]) -> Vec<u8> {
    let mut body = Vec::with_capacity(data.len() + metadata.len() + 256);
    body.extend_from_slice(
        format!(
            "--{b}\r\nContent-Type: application/json; charset=UTF-8\r\n\r\n{m}\r\n--{b}\r\nContent-Type: {ct}\r\n\r\n",
            b = boundary,
            m = metadata,
            ct = content_type
        )
        .as_bytes(),
    );
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{}--\r\n", boundary).as_bytes());
    body
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::google::StaticTokenSource;
    use wiremock::matchers::{body_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_client(base_url: &str) -> DriveClient {
        DriveClient::new(
            base_url,
            "folder-abc",
            Arc::new(StaticTokenSource("test-token".into())),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_upload_public_returns_view_url() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/upload/drive/v3/files"))
            .and(query_param("uploadType", "multipart"))
            .and(query_param("supportsAllDrives", "true"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "file-42" })))
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path("/drive/v3/files/file-42/permissions"))
            .and(body_json(json!({ "role": "reader", "type": "anyone" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "anyoneWithLink" })))
            .expect(1)
            .mount(&server)
            .await;

        let url = test_client(&server.uri())
            .upload_public("leak_20240101120000.jpg", "image/jpeg", vec![0xFF, 0xD8, 0xFF])
            .await
            .unwrap();

        assert_eq!(url, "https://drive.google.com/uc?id=file-42");
    }

    #[tokio::test]
    async fn test_upload_failure_is_reported() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/upload/drive/v3/files"))
            .respond_with(ResponseTemplate::new(500).set_body_string("backend error"))
            .mount(&server)
            .await;

        let result = test_client(&server.uri())
            .upload_public("x.jpg", "image/jpeg", vec![1, 2, 3])
            .await;
        assert!(matches!(result, Err(AppError::ExternalServiceError(_))));
    }

    #[test]
    fn test_multipart_related_layout() {
        let body = multipart_related("XYZ", r#"{"name":"a.png"}"#, "image/png", b"PNGDATA");
        let text = String::from_utf8(body).unwrap();

        assert!(text.starts_with("--XYZ\r\nContent-Type: application/json; charset=UTF-8\r\n\r\n{\"name\":\"a.png\"}\r\n"));
        assert!(text.contains("--XYZ\r\nContent-Type: image/png\r\n\r\nPNGDATA\r\n"));
        assert!(text.ends_with("--XYZ--\r\n"));
    }
}
