use crate::app_error::{AppError, ErrorCode};
use axum::Json;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Log the error before it gets converted into a status response.
        tracing::error!(error = ?self, "Request failed");

        match self {
            AppError::InvalidDomainFormat(msg) => error_resp(
                StatusCode::BAD_REQUEST,
                ErrorCode::InvalidDomainFormat,
                Some(msg),
            ),
            AppError::DomainAlreadyRegistered => error_resp(
                StatusCode::CONFLICT,
                ErrorCode::DomainAlreadyRegistered,
                None,
            ),
            AppError::ProviderRejected(msg) => error_resp(
                StatusCode::UNPROCESSABLE_ENTITY,
                ErrorCode::ProviderRejected,
                Some(msg),
            ),
            AppError::ProviderTransport(_) => error_resp(
                StatusCode::BAD_GATEWAY,
                ErrorCode::ProviderUnavailable,
                None,
            ),
            AppError::Persistence(_) => error_resp(
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorCode::PersistenceError,
                None,
            ),
            AppError::NotFound => error_resp(StatusCode::NOT_FOUND, ErrorCode::NotFound, None),
        }
    }
}

fn error_resp(status: StatusCode, code: ErrorCode, message: Option<String>) -> Response {
    let body = match message {
        Some(msg) => serde_json::json!({ "code": code.as_str(), "message": msg }),
        None => serde_json::json!({ "code": code.as_str() }),
    };
    (status, Json(body)).into_response()
}
