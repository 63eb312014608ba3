//! `POST {prefix}/upload`: receive, parse, ingest, respond with the link.

use std::time::Instant;

use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::extract::{Multipart, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::Response;
use loginwall_core::{IngestError, PublicReference, UploadRequest};

use super::error::AppError;
use super::pages::{render_template, UploadResultPage};
use super::AppState;

pub async fn upload(
    State(state): State<AppState>,
    headers: HeaderMap,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Response, AppError> {
    let limit = state.config.limits.max_upload_bytes;

    // Refuse oversized bodies before reading any of them.
    if let Some(length) = headers
        .get(header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<u64>().ok())
    {
        if length > limit {
            return Err(IngestError::SizeLimitExceeded { limit }.into());
        }
    }

    let multipart = multipart.map_err(|e| IngestError::MalformedRequest(e.body_text()))?;

    let parse_start = Instant::now();
    let upload = read_upload_field(multipart, &state.config.upload.field_name, limit).await?;
    tracing::debug!(
        content_type = %upload.content_type,
        bytes = upload.body.len(),
        "Parse took {:?}",
        parse_start.elapsed()
    );

    let outcome = state.ingestor.ingest(upload).await?;
    tracing::info!(
        object = %outcome.name,
        written = outcome.written,
        "Upload stored ({}x{})",
        outcome.width,
        outcome.height
    );

    let reference = PublicReference::for_object(&state.config.server, &outcome.name)
        .map_err(|e| AppError::Internal(format!("Cannot build download URL: {}", e)))?;
    Ok(render_template(UploadResultPage::new(&state.config, &reference)))
}

/// Pull the named file field out of the multipart body.
///
/// Other fields are skipped. The body is already capped by the route's
/// `DefaultBodyLimit`; crossing it mid-stream surfaces as a 413 multipart
/// error and is reported as `SizeLimitExceeded`.
async fn read_upload_field(
    mut multipart: Multipart,
    field_name: &str,
    limit: u64,
) -> Result<UploadRequest, IngestError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, limit))?
    {
        if field.name() != Some(field_name) {
            continue;
        }

        let content_type = field.content_type().unwrap_or_default().to_string();
        let body = field.bytes().await.map_err(|e| multipart_error(e, limit))?;
        return Ok(UploadRequest::new(content_type, body));
    }

    Err(IngestError::MalformedRequest(format!(
        "missing upload field `{}`",
        field_name
    )))
}

fn multipart_error(err: MultipartError, limit: u64) -> IngestError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        IngestError::SizeLimitExceeded { limit }
    } else {
        IngestError::MalformedRequest(err.body_text())
    }
}
