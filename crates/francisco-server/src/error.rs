use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

/// Handler failures, each mapped to the status and `{"error": ...}` body the
/// front-end expects.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Carries its own text: the theme handlers end it with a period, chat doesn't.
    #[error("{0}")]
    MethodNotAllowed(&'static str),

    #[error("{0}")]
    BadRequest(&'static str),

    #[error("Route inconnue.")]
    NotFound,

    #[error("{message}")]
    Upstream { status: u16, message: &'static str },

    #[error("{0}")]
    Internal(&'static str),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Upstream { status, .. } => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY)
            }
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(json!({ "error": self.to_string() }));
        match self {
            ApiError::MethodNotAllowed(_) => {
                (self.status(), [(header::ALLOW, "POST")], body).into_response()
            }
            _ => (self.status(), body).into_response(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upstream_status_is_relayed() {
        let err = ApiError::Upstream {
            status: 503,
            message: "Erreur lors de la génération.",
        };
        assert_eq!(err.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn test_invalid_upstream_status_falls_back_to_bad_gateway() {
        let err = ApiError::Upstream {
            status: 42,
            message: "Erreur lors de la génération.",
        };
        assert_eq!(err.status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn test_method_not_allowed_sets_allow_header() {
        let response = ApiError::MethodNotAllowed("Méthode non autorisée").into_response();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(response.headers()[header::ALLOW], "POST");
    }
}
