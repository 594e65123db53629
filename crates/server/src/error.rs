use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::{Value, json};

use movies_api_core::error::Error;

pub const RESOURCE_NOT_FOUND: &str = "Resource not found";
pub const RESOURCE_EXISTS: &str = "Resource already exists";
pub const INTERNAL_ERROR: &str = "Internal server error";

/// Unified API error type: a status plus the JSON body sent to the client
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub body: Value,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            body: json!({ "message": message.into() }),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

/// The single place where a failure is turned into a response.
/// Rules are checked in order and the first match wins.
impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        if let Error::Validation(errors) = &err {
            return Self {
                status: StatusCode::BAD_REQUEST,
                body: json!(errors),
            };
        }

        if let Some(code) = err.status_code() {
            let status = StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            return Self::new(status, err.to_string());
        }

        if let Error::MalformedId(raw) = &err {
            tracing::debug!(id = %raw, "Rejected malformed identifier");
            return Self::new(StatusCode::NOT_FOUND, RESOURCE_NOT_FOUND);
        }

        if err.is_duplicate_key() {
            return Self::new(StatusCode::CONFLICT, RESOURCE_EXISTS);
        }

        tracing::error!(error = %err, "Unhandled error while serving request");
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR)
    }
}

/// Unreadable request bodies carry their own status.
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        let status = match &rejection {
            JsonRejection::JsonDataError(_) | JsonRejection::JsonSyntaxError(_) => {
                StatusCode::BAD_REQUEST
            }
            other => other.status(),
        };

        Error::BadRequest {
            status: status.as_u16(),
            message: rejection.body_text(),
        }
        .into()
    }
}

/// Result type alias for API handlers
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use movies_api_core::models::{FieldError, ValidationErrors};

    #[test]
    fn test_validation_maps_to_field_keyed_400() {
        let mut errors = ValidationErrors::new();
        errors.add(FieldError::required("title", None));
        errors.add(FieldError::max("rating", 11.2, 10.0));

        let api: ApiError = Error::Validation(errors).into();
        assert_eq!(api.status, StatusCode::BAD_REQUEST);
        assert_eq!(api.body["title"]["kind"], "required");
        assert_eq!(api.body["rating"]["kind"], "max");
        assert!(api.body.get("message").is_none());
    }

    #[test]
    fn test_explicit_status_keeps_message() {
        let api: ApiError = Error::movie_not_found().into();
        assert_eq!(api.status, StatusCode::NOT_FOUND);
        assert_eq!(api.body, json!({ "message": "Movie not found" }));

        let api: ApiError = Error::BadRequest {
            status: 415,
            message: "Expected JSON".to_string(),
        }
        .into();
        assert_eq!(api.status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
        assert_eq!(api.body["message"], "Expected JSON");
    }

    #[test]
    fn test_malformed_id_maps_to_generic_404() {
        let api: ApiError = Error::MalformedId("xyz".to_string()).into();
        assert_eq!(api.status, StatusCode::NOT_FOUND);
        assert_eq!(api.body, json!({ "message": RESOURCE_NOT_FOUND }));
    }

    #[test]
    fn test_duplicate_maps_to_409() {
        let api: ApiError = Error::Duplicate("movie".to_string()).into();
        assert_eq!(api.status, StatusCode::CONFLICT);
        assert_eq!(api.body, json!({ "message": RESOURCE_EXISTS }));
    }

    #[test]
    fn test_unexpected_errors_are_not_leaked() {
        let api: ApiError = Error::Internal("connection reset by peer".to_string()).into();
        assert_eq!(api.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(api.body, json!({ "message": INTERNAL_ERROR }));

        let api: ApiError = Error::Database(sqlx_row_not_found()).into();
        assert_eq!(api.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(api.body, json!({ "message": INTERNAL_ERROR }));
    }

    fn sqlx_row_not_found() -> movies_api_core::error::DbError {
        movies_api_core::error::DbError::RowNotFound
    }
}
