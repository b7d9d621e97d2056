use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use goalpost_core::errors::Error as CoreError;
use goalpost_core::webhook::WebhookError;
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    Core(#[from] CoreError),
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Anyhow(#[from] anyhow::Error),
}

#[derive(Serialize)]
struct ErrorBody {
    code: u16,
    message: String,
}

const INTERNAL_MESSAGE: &str = "Internal server error";

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, msg) = match &self {
            ApiError::Core(e) => match e {
                CoreError::Validation(_) => (StatusCode::BAD_REQUEST, e.to_string()),
                CoreError::Webhook(WebhookError::Malformed(_)) => {
                    (StatusCode::BAD_REQUEST, e.to_string())
                }
                CoreError::Webhook(WebhookError::Unauthorized) => {
                    (StatusCode::UNAUTHORIZED, "Unauthorized".to_string())
                }
                CoreError::Database(_) | CoreError::Unexpected(_) => {
                    tracing::error!("Request failed: {}", e);
                    (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_MESSAGE.to_string())
                }
            },
            ApiError::BadRequest(reason) => (StatusCode::BAD_REQUEST, reason.clone()),
            ApiError::Anyhow(err) => {
                tracing::error!("Request failed: {:#}", err);
                (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_MESSAGE.to_string())
            }
        };
        let body = Json(ErrorBody {
            code: status.as_u16(),
            message: msg,
        });
        (status, body).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use goalpost_core::errors::{DatabaseError, ValidationError};

    fn status_of(err: ApiError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn core_errors_map_to_statuses() {
        assert_eq!(
            status_of(CoreError::from(ValidationError::NegativeAmount("amount".into())).into()),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(CoreError::from(WebhookError::Malformed("bad json".into())).into()),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(CoreError::from(WebhookError::Unauthorized).into()),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            status_of(CoreError::from(DatabaseError::NotFound("goal".into())).into()),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            status_of(CoreError::from(DatabaseError::QueryFailed("locked".into())).into()),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn internal_errors_hide_details() {
        let response =
            ApiError::from(CoreError::from(DatabaseError::QueryFailed("disk I/O".into())))
                .into_response();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["code"], 500);
        assert_eq!(body["message"], INTERNAL_MESSAGE);
    }
}
