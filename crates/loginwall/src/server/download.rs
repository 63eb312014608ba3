//! `GET {prefix}/download/{name}`: serve a stored object.
//!
//! Objects are immutable and named by digest, so the digest doubles as a
//! strong ETag. `Last-Modified`, `If-Modified-Since` and byte ranges are
//! handled by `tower-http`'s file service.

use axum::body::Body;
use axum::extract::{Path, Request, State};
use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use tower::ServiceExt;
use tower_http::services::ServeFile;

use super::error::AppError;
use super::AppState;

const IMMUTABLE: &str = "public, max-age=31536000, immutable";

pub async fn download(
    State(state): State<AppState>,
    Path(name): Path<String>,
    request: Request,
) -> Result<Response, AppError> {
    let object = state.ingestor.store().get(&name).await?;
    let etag = HeaderValue::from_str(&format!("\"{}\"", object.digest.to_hex()))
        .map_err(|e| AppError::Internal(e.to_string()))?;

    if etag_matches(request.headers(), &etag) {
        tracing::trace!(object = %object.name, "ETag match, not modified");
        return Ok((
            StatusCode::NOT_MODIFIED,
            [(header::ETAG, etag), (header::CACHE_CONTROL, HeaderValue::from_static(IMMUTABLE))],
        )
            .into_response());
    }

    let response = match ServeFile::new(&object.path).oneshot(request).await {
        Ok(response) => response,
        Err(never) => match never {},
    };

    let mut response = response.map(Body::new);
    if response.status().is_success() || response.status() == StatusCode::NOT_MODIFIED {
        let headers = response.headers_mut();
        headers.insert(header::ETAG, etag);
        headers.insert(header::CACHE_CONTROL, HeaderValue::from_static(IMMUTABLE));
    }
    Ok(response)
}

/// `If-None-Match` check: `*` or any listed tag equal to ours (weak or strong).
fn etag_matches(headers: &HeaderMap, etag: &HeaderValue) -> bool {
    let Ok(ours) = etag.to_str() else {
        return false;
    };
    headers
        .get_all(header::IF_NONE_MATCH)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(','))
        .map(str::trim)
        .any(|tag| tag == "*" || tag == ours || tag.strip_prefix("W/") == Some(ours))
}
