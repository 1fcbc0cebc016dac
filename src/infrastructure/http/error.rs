//! HTTP Error Handling

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::application::ApplicationError;

/// 统一错误响应格式
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub errno: i32,
    pub error: String,
    pub data: Option<()>,
}

impl ErrorResponse {
    pub fn new(errno: i32, error: impl Into<String>) -> Self {
        Self {
            errno,
            error: error.into(),
            data: None,
        }
    }
}

/// 错误码定义
pub mod errno {
    pub const BAD_REQUEST: i32 = 400;
    pub const UNPROCESSABLE: i32 = 422;
    pub const INTERNAL_ERROR: i32 = 500;
    pub const SERVICE_UNAVAILABLE: i32 = 503;
}

/// API 错误
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    /// 文档内容无法被分词
    Unprocessable(String),
    Internal(String),
    ServiceUnavailable(String),
}

impl ApiError {
    pub fn errno(&self) -> i32 {
        match self {
            ApiError::BadRequest(_) => errno::BAD_REQUEST,
            ApiError::Unprocessable(_) => errno::UNPROCESSABLE,
            ApiError::Internal(_) => errno::INTERNAL_ERROR,
            ApiError::ServiceUnavailable(_) => errno::SERVICE_UNAVAILABLE,
        }
    }

    fn message(&self) -> &str {
        match self {
            ApiError::BadRequest(msg)
            | ApiError::Unprocessable(msg)
            | ApiError::Internal(msg)
            | ApiError::ServiceUnavailable(msg) => msg,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let errno = self.errno();
        match &self {
            ApiError::BadRequest(msg) | ApiError::Unprocessable(msg) => {
                tracing::warn!(errno = errno, error = %msg, "Rejected chunk request");
            }
            ApiError::Internal(msg) | ApiError::ServiceUnavailable(msg) => {
                tracing::error!(errno = errno, error = %msg, "Chunk request failed");
            }
        }

        // 业务错误统一返回 HTTP 200，由 errno 区分
        (StatusCode::OK, Json(ErrorResponse::new(errno, self.message()))).into_response()
    }
}

impl From<ApplicationError> for ApiError {
    fn from(e: ApplicationError) -> Self {
        let message = e.to_string();
        match e {
            ApplicationError::ValidationError(msg) => ApiError::BadRequest(msg),
            ApplicationError::Encoding { .. } => ApiError::Unprocessable(message),
            ApplicationError::Split { .. } => ApiError::ServiceUnavailable(message),
            ApplicationError::NonProgress { .. }
            | ApplicationError::SinkError(_)
            | ApplicationError::InternalError(_) => ApiError::Internal(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::{EncodingError, SplitError};

    #[test]
    fn test_application_error_mapping() {
        let cases = [
            (ApplicationError::validation("bad"), errno::BAD_REQUEST),
            (
                ApplicationError::Encoding {
                    segment_index: 2,
                    source: EncodingError::UnsupportedInput { offset: 9 },
                },
                errno::UNPROCESSABLE,
            ),
            (
                ApplicationError::Split {
                    segment_index: 0,
                    source: SplitError::Timeout,
                },
                errno::SERVICE_UNAVAILABLE,
            ),
            (
                ApplicationError::NonProgress {
                    segment_index: 1,
                    attempts: 3,
                    reason: "largest piece did not shrink",
                },
                errno::INTERNAL_ERROR,
            ),
        ];

        for (error, expected) in cases {
            assert_eq!(ApiError::from(error).errno(), expected);
        }
    }

    #[test]
    fn test_message_keeps_segment_position() {
        let api = ApiError::from(ApplicationError::Encoding {
            segment_index: 2,
            source: EncodingError::UnsupportedInput { offset: 9 },
        });
        assert!(api.message().contains("segment 2"));
    }
}
