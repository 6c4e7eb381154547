//! Application routes backed by the gateway core.
//!
//! Every route except the public root runs behind session validation, so the
//! handlers here only deal with their own inputs.

use std::sync::Arc;

use axum::{
    extract::{
        multipart::MultipartRejection,
        rejection::{JsonRejection, QueryRejection},
        Multipart, Path, Query, State,
    },
    http::{header::CONTENT_LENGTH, HeaderMap, StatusCode, Uri},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::error::{GatewayError, GatewayResult};
use crate::files::{
    OwnerTag, SaveTarget, StorageEndpoints, StorageLocator, UpdateOrchestrator, UploadProxy,
    UploadedFile,
};
use crate::security::{extract_user_id, RelayedHeaders, UserId};

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub uploads: UploadProxy,
    pub endpoints: Arc<StorageEndpoints>,
}

#[derive(Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    pub version: &'static str,
}

#[derive(Serialize)]
pub struct CurrentUser {
    pub user_id: UserId,
}

#[derive(Serialize)]
pub struct SavedFile {
    pub file_path: StorageLocator,
}

#[derive(Serialize)]
pub struct UpdatedFile {
    pub file_path: StorageLocator,
    pub old_file: &'static str,
}

#[derive(Deserialize)]
pub struct DeleteParams {
    pub file_path: String,
}

#[derive(Deserialize)]
pub struct RemoteImage {
    pub url: String,
    pub acl: Option<String>,
    pub email: Option<String>,
}

pub async fn health() -> Json<HealthStatus> {
    Json(HealthStatus {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Identifier of the caller, read from the bearer token without verification.
pub async fn current_user(headers: HeaderMap, uri: Uri) -> GatewayResult<Json<CurrentUser>> {
    let relayed = RelayedHeaders::extract(&headers, uri.path());
    let user_id = extract_user_id(relayed.authorization())?;
    Ok(Json(CurrentUser { user_id }))
}

pub async fn upload(
    State(state): State<AppState>,
    Path(bucket): Path<String>,
    headers: HeaderMap,
    uri: Uri,
    multipart: Result<Multipart, MultipartRejection>,
) -> GatewayResult<Json<SavedFile>> {
    let target = save_target(&state.endpoints, &bucket)?;
    let form = read_upload_form(multipart?).await?;
    let relayed = RelayedHeaders::extract(&headers, uri.path());

    let file_path = state
        .uploads
        .save_file(&form.file, target, &relayed, form.owner.as_ref())
        .await?;
    tracing::info!(bucket = %bucket, file_path = %file_path, "File saved");
    Ok(Json(SavedFile { file_path }))
}

pub async fn update(
    State(state): State<AppState>,
    Path(bucket): Path<String>,
    headers: HeaderMap,
    uri: Uri,
    multipart: Result<Multipart, MultipartRejection>,
) -> GatewayResult<Json<UpdatedFile>> {
    let target = save_target(&state.endpoints, &bucket)?;
    let form = read_upload_form(multipart?).await?;
    let relayed = RelayedHeaders::extract(&headers, uri.path());

    let outcome = UpdateOrchestrator::new(&state.uploads)
        .update_file(
            &form.file,
            form.old_file_path.as_ref(),
            target,
            &state.endpoints.delete,
            &relayed,
            form.owner.as_ref(),
        )
        .await?;

    Ok(Json(UpdatedFile {
        file_path: outcome.locator,
        old_file: outcome.cleanup.label(),
    }))
}

pub async fn delete(
    State(state): State<AppState>,
    params: Result<Query<DeleteParams>, QueryRejection>,
    headers: HeaderMap,
    uri: Uri,
) -> GatewayResult<StatusCode> {
    let Query(params) = params?;
    if params.file_path.is_empty() {
        return Err(GatewayError::ValidationFailure(
            "file_path must not be empty".to_string(),
        ));
    }
    let relayed = RelayedHeaders::extract(&headers, uri.path());
    let locator = StorageLocator::new(params.file_path);

    state
        .uploads
        .delete_file(&locator, &state.endpoints.delete, &relayed)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn save_from_url(
    State(state): State<AppState>,
    body: Result<Json<RemoteImage>, JsonRejection>,
) -> GatewayResult<Json<SavedFile>> {
    let Json(body) = body?;
    let owner = match (body.acl, body.email) {
        (Some(acl), None) => OwnerTag::Acl(acl),
        (None, Some(email)) => OwnerTag::Email(email),
        _ => {
            return Err(GatewayError::ValidationFailure(
                "exactly one of acl or email is required".to_string(),
            ))
        }
    };

    let file_path = state
        .uploads
        .save_file_from_url(&body.url, &owner, &state.endpoints.from_url)
        .await?;
    Ok(Json(SavedFile { file_path }))
}

fn save_target<'a>(endpoints: &'a StorageEndpoints, bucket: &str) -> GatewayResult<&'a SaveTarget> {
    endpoints
        .bucket(bucket)
        .ok_or_else(|| GatewayError::ValidationFailure(format!("Unknown bucket: {bucket}")))
}

struct UploadForm {
    file: UploadedFile,
    owner: Option<OwnerTag>,
    old_file_path: Option<StorageLocator>,
}

async fn read_upload_form(mut multipart: Multipart) -> GatewayResult<UploadForm> {
    let mut file = None;
    let mut owner = None;
    let mut old_file_path = None;

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                let filename = field.file_name().unwrap_or_default().to_string();
                let declared_size = field
                    .headers()
                    .get(CONTENT_LENGTH)
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.parse().ok());
                let content = field.bytes().await?;
                file = Some(UploadedFile {
                    filename,
                    content,
                    declared_size,
                });
            }
            "acl" => owner = Some(OwnerTag::Acl(field.text().await?)),
            "email" => owner = Some(OwnerTag::Email(field.text().await?)),
            "old_file_path" => {
                let path = field.text().await?;
                old_file_path = Some(StorageLocator::new(path));
            }
            other => tracing::warn!(field = %other, "Ignoring unknown multipart field"),
        }
    }

    let file = file.ok_or_else(|| {
        GatewayError::ValidationFailure("Missing multipart field: file".to_string())
    })?;
    Ok(UploadForm {
        file,
        owner,
        old_file_path,
    })
}
