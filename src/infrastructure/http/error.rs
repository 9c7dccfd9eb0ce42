//! HTTP error responses
//!
//! Every failing endpoint answers with an [`ErrorResponseDto`] body.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use crate::application::dto::ErrorResponseDto;
use crate::application::services::ServiceError;
use crate::domain::validation::INVALID_PAYLOAD;

pub const DECODE_MESSAGE: &str = "problem to decode your input";
pub const QUERY_MESSAGE: &str = "invalid query string";
const INTERNAL_MESSAGE: &str = "internal server error";

/// Error type returned by the route handlers
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The body was not valid JSON for the endpoint.
    #[error("problem to decode your input: {0}")]
    Decode(#[from] JsonRejection),

    /// Query parameters that do not fit the endpoint, such as a negative limit.
    #[error("invalid query string: {0}")]
    Query(#[from] QueryRejection),

    /// A path id that is not a UUID.
    #[error("invalid {0} id")]
    InvalidId(&'static str),

    #[error(transparent)]
    Service(#[from] ServiceError),
}

pub type ApiResult<T> = Result<T, ApiError>;

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message, detail) = match &self {
            ApiError::Decode(rejection) => {
                tracing::debug!(error = %rejection, "Undecodable request body");
                (StatusCode::BAD_REQUEST, DECODE_MESSAGE.to_string(), None)
            }
            ApiError::Query(rejection) => {
                tracing::debug!(error = %rejection, "Unparseable query string");
                (StatusCode::BAD_REQUEST, QUERY_MESSAGE.to_string(), None)
            }
            ApiError::InvalidId(_) => (StatusCode::BAD_REQUEST, self.to_string(), None),
            ApiError::Service(err) if !err.is_client_error() => {
                tracing::error!(error = %err, "Request failed");
                match err {
                    // Names the character so the lord references can be cleared by hand
                    ServiceError::CascadeFailed { .. } => {
                        (StatusCode::INTERNAL_SERVER_ERROR, err.to_string(), None)
                    }
                    _ => (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        INTERNAL_MESSAGE.to_string(),
                        None,
                    ),
                }
            }
            ApiError::Service(err) => match err {
                ServiceError::ValidationFailed(errors) => (
                    StatusCode::BAD_REQUEST,
                    INVALID_PAYLOAD.to_string(),
                    Some(errors.violations.clone()),
                ),
                ServiceError::NameAlreadyUsed(_) => {
                    (StatusCode::CONFLICT, err.to_string(), None)
                }
                ServiceError::HouseNotFound(_) | ServiceError::CharacterNotFound(_) => {
                    (StatusCode::NOT_FOUND, err.to_string(), None)
                }
                _ => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    INTERNAL_MESSAGE.to_string(),
                    None,
                ),
            },
        };

        let body = ErrorResponseDto {
            http_code: status.as_u16(),
            message,
            detail,
        };

        (status, Json(body)).into_response()
    }
}
