//! Storage service proxy.
//!
//! # Responsibilities
//! - Build the multipart body for an upload and forward it to storage
//! - Import a remote image by URL (JSON body instead of multipart)
//! - Delete a stored file by locator
//! - Interpret storage responses (200 + `{"file_path"}` or rejection)
//!
//! # Design Decisions
//! - Uploads are fully buffered, so sniffing and forwarding read the same bytes
//! - The file part's Content-Type is always set explicitly from classification
//! - One attempt per call; non-200 is a hard failure carrying status and body

use std::fmt;
use std::time::Instant;

use axum::http::StatusCode;
use bytes::Bytes;
use reqwest::multipart::{Form, Part};
use serde::{Deserialize, Serialize};

use crate::error::{upstream_rejection, GatewayError, GatewayResult, Upstream};
use crate::files::kind::{self, Classification, FileKind};
use crate::observability::metrics;
use crate::security::headers::RelayedHeaders;

/// Query parameter carrying the locator on delete.
pub const FILE_PATH_PARAM: &str = "file_path";

/// A file received from a client, buffered in memory.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub filename: String,
    pub content: Bytes,
    /// Size the client declared, if any. `content.len()` is authoritative.
    pub declared_size: Option<u64>,
}

impl UploadedFile {
    pub fn new(filename: impl Into<String>, content: impl Into<Bytes>) -> Self {
        Self {
            filename: filename.into(),
            content: content.into(),
            declared_size: None,
        }
    }

    pub fn classify(&self) -> Classification {
        kind::classify(&self.filename, &self.content)
    }
}

/// Opaque reference to a stored file.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StorageLocator(String);

impl StorageLocator {
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for StorageLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Ownership tag sent alongside a file. Storage deployments expect one or the other.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OwnerTag {
    Acl(String),
    Email(String),
}

impl OwnerTag {
    pub fn field_name(&self) -> &'static str {
        match self {
            OwnerTag::Acl(_) => "Acl",
            OwnerTag::Email(_) => "Email",
        }
    }

    pub fn value(&self) -> &str {
        match self {
            OwnerTag::Acl(v) | OwnerTag::Email(v) => v,
        }
    }
}

/// How an endpoint treats the classified kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveMode {
    /// Send whatever was detected; Unknown goes out as an empty `Kindfile`.
    Auto,
    /// Refuse Unknown files.
    Strict,
    /// Only image extensions are accepted; always tagged `Images`.
    ForceImage,
}

impl SaveMode {
    /// Mode implied by an endpoint URL, for callers that only hold the URL.
    pub fn for_endpoint(url: &str) -> Self {
        if url.contains("Images") {
            SaveMode::ForceImage
        } else {
            SaveMode::Auto
        }
    }

    /// Decide the `Kindfile` tag for a classified file, or refuse it.
    pub fn resolve(&self, filename: &str, classification: &Classification) -> GatewayResult<FileKind> {
        match self {
            SaveMode::ForceImage => {
                if kind::is_image_extension(filename) {
                    Ok(FileKind::Image)
                } else {
                    Err(GatewayError::ValidationFailure(format!(
                        "File must be an image, received extension: {}",
                        kind::extension(filename)
                            .map(|e| format!(".{e}"))
                            .unwrap_or_else(|| "(none)".to_string())
                    )))
                }
            }
            SaveMode::Strict if classification.kind == FileKind::Unknown => {
                Err(GatewayError::UnsupportedFileType(filename.to_string()))
            }
            SaveMode::Strict | SaveMode::Auto => Ok(classification.kind),
        }
    }
}

/// Where and how to save a file.
#[derive(Debug, Clone)]
pub struct SaveTarget {
    pub url: String,
    pub mode: SaveMode,
}

impl SaveTarget {
    pub fn new(url: impl Into<String>, mode: SaveMode) -> Self {
        Self {
            url: url.into(),
            mode,
        }
    }
}

#[derive(Debug, Deserialize)]
struct SaveResponse {
    file_path: String,
}

#[derive(Debug, Serialize)]
struct RemoteImageRequest<'a> {
    #[serde(rename = "Url")]
    url: &'a str,
    #[serde(rename = "Kindfile")]
    kindfile: &'static str,
    #[serde(rename = "Acl", skip_serializing_if = "Option::is_none")]
    acl: Option<&'a str>,
    #[serde(rename = "Email", skip_serializing_if = "Option::is_none")]
    email: Option<&'a str>,
}

/// Client for the storage service.
#[derive(Clone)]
pub struct UploadProxy {
    client: reqwest::Client,
}

impl UploadProxy {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }

    /// Forward an upload to storage and return where it was stored.
    pub async fn save_file(
        &self,
        file: &UploadedFile,
        target: &SaveTarget,
        headers: &RelayedHeaders,
        owner: Option<&OwnerTag>,
    ) -> GatewayResult<StorageLocator> {
        let classification = file.classify();
        let kind = target.mode.resolve(&file.filename, &classification)?;

        tracing::debug!(
            filename = %file.filename,
            kind = ?kind,
            content_type = classification.content_type,
            bytes = file.content.len(),
            declared_size = ?file.declared_size,
            "Forwarding upload to storage"
        );

        let part = file_part(file, classification.content_type)?;

        let mut form = Form::new()
            .part("file", part)
            .text("Kindfile", kind.kindfile());
        if let Some(owner) = owner {
            form = form.text(owner.field_name(), owner.value().to_string());
        }

        let start = Instant::now();
        let result = self
            .send_for_locator(
                self.client
                    .post(&target.url)
                    .headers(headers.to_header_map())
                    .multipart(form),
            )
            .await;
        metrics::record_storage_call("save", result.is_ok(), start);
        result
    }

    /// Ask storage to fetch an image from a third-party URL (e.g. a profile picture).
    pub async fn save_file_from_url(
        &self,
        url: &str,
        owner: &OwnerTag,
        endpoint: &str,
    ) -> GatewayResult<StorageLocator> {
        let (acl, email) = match owner {
            OwnerTag::Acl(v) => (Some(v.as_str()), None),
            OwnerTag::Email(v) => (None, Some(v.as_str())),
        };
        let body = RemoteImageRequest {
            url,
            kindfile: "images",
            acl,
            email,
        };

        let start = Instant::now();
        let result = self
            .send_for_locator(self.client.post(endpoint).json(&body))
            .await;
        metrics::record_storage_call("save_from_url", result.is_ok(), start);
        result
    }

    /// Delete a stored file.
    pub async fn delete_file(
        &self,
        locator: &StorageLocator,
        endpoint: &str,
        headers: &RelayedHeaders,
    ) -> GatewayResult<()> {
        let start = Instant::now();
        let result = self
            .client
            .delete(endpoint)
            .query(&[(FILE_PATH_PARAM, locator.as_str())])
            .headers(headers.to_header_map())
            .send()
            .await
            .map_err(GatewayError::transport(Upstream::Storage));
        let result = match result {
            Ok(response) => ensure_ok(response).await.map(|_| ()),
            Err(e) => Err(e),
        };
        metrics::record_storage_call("delete", result.is_ok(), start);
        result
    }

    async fn send_for_locator(&self, request: reqwest::RequestBuilder) -> GatewayResult<StorageLocator> {
        let response = request
            .send()
            .await
            .map_err(GatewayError::transport(Upstream::Storage))?;
        let response = ensure_ok(response).await?;

        let bytes = response
            .bytes()
            .await
            .map_err(GatewayError::transport(Upstream::Storage))?;
        let decoded: SaveResponse =
            serde_json::from_slice(&bytes).map_err(|e| GatewayError::DecodeFailure {
                upstream: Upstream::Storage,
                reason: e.to_string(),
            })?;
        Ok(StorageLocator(decoded.file_path))
    }
}

async fn ensure_ok(response: reqwest::Response) -> GatewayResult<reqwest::Response> {
    if response.status() == StatusCode::OK {
        return Ok(response);
    }
    Err(upstream_rejection(Upstream::Storage, response).await)
}

/// File part with its Content-Type set from classification.
fn file_part(file: &UploadedFile, content_type: &str) -> GatewayResult<Part> {
    Part::stream_with_length(file.content.clone(), file.content.len() as u64)
        .file_name(file.filename.clone())
        .mime_str(content_type)
        .map_err(|e| {
            GatewayError::ValidationFailure(format!("Invalid content type {content_type}: {e}"))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classification(name: &str, content: &[u8]) -> Classification {
        kind::classify(name, content)
    }

    #[test]
    fn test_force_image_rejects_non_image_extensions() {
        let c = classification("report.pdf", b"%PDF-1.4");
        let err = SaveMode::ForceImage.resolve("report.pdf", &c).unwrap_err();
        assert!(matches!(err, GatewayError::ValidationFailure(ref m) if m.contains(".pdf")));

        let c = classification("avatar.bin", &[0xFF, 0xD8, 0xFF, 0xE0]);
        assert!(SaveMode::ForceImage.resolve("avatar.bin", &c).is_err());
    }

    #[test]
    fn test_unknown_kind_per_mode() {
        let c = classification("notes.txt", b"hello");
        assert_eq!(SaveMode::Auto.resolve("notes.txt", &c).unwrap(), FileKind::Unknown);
        assert!(matches!(
            SaveMode::Strict.resolve("notes.txt", &c),
            Err(GatewayError::UnsupportedFileType(_))
        ));
    }

    #[test]
    fn test_mode_from_endpoint_url() {
        assert_eq!(
            SaveMode::for_endpoint("http://storage/api/v1/SavePrivateImages"),
            SaveMode::ForceImage
        );
        assert_eq!(
            SaveMode::for_endpoint("http://storage/api/v1/SaveFiles"),
            SaveMode::Auto
        );
    }

    #[test]
    fn test_bad_content_type_is_a_validation_failure() {
        let file = UploadedFile::new("cover.jpg", &b"\xFF\xD8\xFF"[..]);
        assert!(file_part(&file, "image/jpeg").is_ok());

        let err = file_part(&file, "not a mime").unwrap_err();
        assert!(matches!(err, GatewayError::ValidationFailure(ref m) if m.contains("not a mime")));
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_remote_image_body_carries_one_owner_field() {
        let body = RemoteImageRequest {
            url: "https://cdn.example.com/p.jpg",
            kindfile: "images",
            acl: None,
            email: Some("ana@example.com"),
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            serde_json::json!({
                "Url": "https://cdn.example.com/p.jpg",
                "Kindfile": "images",
                "Email": "ana@example.com",
            })
        );
    }
}
