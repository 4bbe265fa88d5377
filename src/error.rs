//! Typed error set for the query service.
//!
//! A closed enum instead of a catch-all: every failure a handler can
//! produce is one of these three kinds, each mapped to exactly one HTTP
//! status. Not-found responses echo the attempted region back in the body.
//!
//! ```json
//! { "error": { "code": "not_found", "message": "No hay sitios en Sucre", "departamento": "Sucre" } }
//! ```

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

/// Application-level error type that implements `IntoResponse`.
///
/// - `Validation` → 400
/// - `NotFound` → 404
/// - `Storage` → 500 (underlying fault text attached, no retry)
#[derive(Debug, Error)]
pub enum ApiError {
    /// Region string rejected before any storage access.
    #[error("{0}")]
    Validation(String),
    /// The filter yielded zero rows (post-flattening where applicable).
    #[error("{message}")]
    NotFound {
        /// The attempted region, echoed verbatim.
        departamento: String,
        message: String,
    },
    /// Storage or transport fault while reading a collection.
    #[error("{0}")]
    Storage(String),
}

impl ApiError {
    pub fn not_found(departamento: impl Into<String>, message: impl Into<String>) -> Self {
        Self::NotFound {
            departamento: departamento.into(),
            message: message.into(),
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "bad_request",
            Self::NotFound { .. } => "not_found",
            Self::Storage(_) => "storage",
        }
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        Self::Storage(err.to_string())
    }
}

/// JSON error response body.
#[derive(Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    code: &'static str,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    departamento: Option<String>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let departamento = match &self {
            Self::NotFound { departamento, .. } => Some(departamento.clone()),
            _ => None,
        };
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code(),
                message: self.to_string(),
                departamento,
            },
        };
        (self.status(), Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_echoes_region_verbatim() {
        let err = ApiError::not_found("SuCrE", "No hay sitios en SuCrE");
        match err {
            ApiError::NotFound { departamento, .. } => assert_eq!(departamento, "SuCrE"),
            _ => panic!("expected NotFound"),
        }
    }

    #[test]
    fn storage_keeps_fault_text() {
        let err = ApiError::Storage("connection refused".into());
        assert_eq!(err.to_string(), "connection refused");
    }
}
