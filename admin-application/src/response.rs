//! 控制器响应（ApiResponse）
//!
//! 把分发结果翻译成 HTTP 风格的 `{ status, code, message, data }`，
//! 由外部 Web 层原样序列化返回。

use crate::error::AppError;
use admin_domain::error::DomainError;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApiResponse<T> {
    pub status: u16,
    pub code: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            status: 200,
            code: "OK",
            message: "success".to_string(),
            data: Some(data),
        }
    }

    pub fn from_result(result: Result<T, AppError>) -> Self {
        match result {
            Ok(data) => Self::ok(data),
            Err(err) => Self::from_error(&err),
        }
    }

    pub fn from_error(err: &AppError) -> Self {
        let (status, code) = classify(err);
        if status >= 500 {
            tracing::error!(status, code, error = %err, "request failed");
        }
        Self {
            status,
            code,
            message: err.to_string(),
            data: None,
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// 错误到 (HTTP 状态码, 错误码) 的映射
pub fn classify(err: &AppError) -> (u16, &'static str) {
    match err {
        AppError::Validation(_) => (400, "VALIDATION_FAILED"),
        AppError::Authorization(_) => (403, "FORBIDDEN"),
        AppError::Domain(domain) => match domain {
            DomainError::InvalidValue { .. } | DomainError::InvalidCommand { .. } => {
                (400, "VALIDATION_FAILED")
            }
            DomainError::NotFound { .. } => (404, "NOT_FOUND"),
            DomainError::DuplicateEntity { .. } => (409, "DUPLICATE_ENTITY"),
            DomainError::ReferenceNotFound { .. } => (422, "REFERENCE_NOT_FOUND"),
            DomainError::StorageUnavailable { .. } => (503, "STORAGE_UNAVAILABLE"),
            _ => (500, "INTERNAL_ERROR"),
        },
        _ => (500, "INTERNAL_ERROR"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(err: AppError) -> u16 {
        ApiResponse::<()>::from_result(Err(err)).status
    }

    #[test]
    fn success_carries_data() {
        let res = ApiResponse::from_result(Ok::<_, AppError>(vec!["a"]));
        assert!(res.is_success());
        assert_eq!(res.data, Some(vec!["a"]));

        let json = serde_json::to_value(&res).unwrap();
        assert_eq!(json["status"], 200);
        assert_eq!(json["data"][0], "a");
    }

    #[test]
    fn errors_map_to_http_statuses() {
        assert_eq!(status_of(AppError::Validation("id".into())), 400);
        assert_eq!(status_of(DomainError::invalid_value("x").into()), 400);
        assert_eq!(status_of(DomainError::invalid_command("x").into()), 400);
        assert_eq!(status_of(AppError::Authorization("no".into())), 403);
        assert_eq!(status_of(DomainError::not_found("user").into()), 404);
        assert_eq!(status_of(DomainError::duplicate("user", "alice").into()), 409);
        assert_eq!(
            status_of(DomainError::reference_not_found("role", vec![9]).into()),
            422
        );
        assert_eq!(status_of(DomainError::storage_unavailable("down").into()), 503);
        assert_eq!(status_of(AppError::HandlerNotFound("CreateUser")), 500);
    }

    #[test]
    fn error_body_omits_data() {
        let res =
            ApiResponse::<()>::from_result(Err(DomainError::duplicate("user", "alice").into()));
        assert_eq!(res.code, "DUPLICATE_ENTITY");
        assert!(res.message.contains("alice"));

        let json = serde_json::to_value(&res).unwrap();
        assert!(json.get("data").is_none());
    }
}
