//! Mapping of pipeline and store failures onto HTTP responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use loginwall_core::{IngestError, StoreError};
use thiserror::Error;

/// Error returned by the HTTP handlers.
///
/// Logged once, here, when it becomes a response.
#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Ingest(#[from] IngestError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("{0}")]
    Internal(String),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Store(StoreError::NotFound(_)) => StatusCode::NOT_FOUND,
            AppError::Ingest(_) | AppError::Store(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match &self {
            AppError::Ingest(e) => {
                tracing::error!(stage = %e.stage(), "Upload failed: {}", e);
            }
            AppError::Store(StoreError::NotFound(name)) => {
                tracing::debug!(object = %name, "Client requested missing object");
            }
            AppError::Store(e) => {
                tracing::error!("Object store error: {}", e);
            }
            AppError::Internal(message) => {
                tracing::error!("Internal service error: {}", message);
            }
        }

        (self.status_code(), self.to_string()).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_maps_to_404() {
        let err = AppError::from(StoreError::NotFound("x.png".into()));
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_upload_errors_map_to_500_with_message() {
        let err = AppError::from(IngestError::UnsupportedFormat {
            content_type: "image/gif".into(),
        });
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.to_string(), "Unrecognized image format: image/gif");
    }

    #[test]
    fn test_store_io_is_not_a_404() {
        let err = AppError::from(StoreError::Io {
            path: "/srv/objects".into(),
            source: std::io::Error::other("disk on fire"),
        });
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
