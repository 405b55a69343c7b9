//! 领域层统一错误定义
//!
//! 聚焦业务冲突、关联引用、存储可用性与序列化等最小必要集合，
//! 便于在各实现层统一转换为 `DomainError`。
//!
use thiserror::Error;

/// 统一错误类型（基础库最小必要集）
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum DomainError {
    // --- 序列化 ---
    #[error("serialization error: {source}")]
    Serde {
        #[from]
        source: serde_json::Error,
    },

    // --- 业务规则 ---
    #[error("duplicate entity: {entity} with key `{key}` already exists")]
    DuplicateEntity { entity: &'static str, key: String },
    #[error("reference not found: {entity} ids={ids:?}")]
    ReferenceNotFound { entity: &'static str, ids: Vec<u64> },
    #[error("not found: {reason}")]
    NotFound { reason: String },
    #[error("invalid value: {reason}")]
    InvalidValue { reason: String },
    #[error("invalid command: {reason}")]
    InvalidCommand { reason: String },

    // --- 基础设施 ---
    #[error("storage unavailable: {reason}")]
    StorageUnavailable { reason: String },
    #[error("password hash error: {reason}")]
    PasswordHash { reason: String },

    // --- 事件系统 ---
    #[error("event handler error: handler={handler}, reason={reason}")]
    EventHandler { handler: String, reason: String },
}

impl DomainError {
    pub fn duplicate(entity: &'static str, key: impl Into<String>) -> Self {
        DomainError::DuplicateEntity {
            entity,
            key: key.into(),
        }
    }

    pub fn reference_not_found(entity: &'static str, ids: Vec<u64>) -> Self {
        DomainError::ReferenceNotFound { entity, ids }
    }

    pub fn not_found(reason: impl Into<String>) -> Self {
        DomainError::NotFound {
            reason: reason.into(),
        }
    }

    pub fn invalid_value(reason: impl Into<String>) -> Self {
        DomainError::InvalidValue {
            reason: reason.into(),
        }
    }

    pub fn invalid_command(reason: impl Into<String>) -> Self {
        DomainError::InvalidCommand {
            reason: reason.into(),
        }
    }

    pub fn storage_unavailable(reason: impl Into<String>) -> Self {
        DomainError::StorageUnavailable {
            reason: reason.into(),
        }
    }
}

/// 统一 Result 类型别名
pub type DomainResult<T> = Result<T, DomainError>;
