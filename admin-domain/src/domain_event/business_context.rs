use bon::Builder;
use serde::{Deserialize, Serialize};

/// 业务上下文信息
///
/// 由控制器在请求入口构造，随命令流转并被复制进其产生的事件信封。
#[derive(Builder, Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusinessContext {
    /// 关联ID（一次外部请求内的所有命令/事件共享）
    correlation_id: Option<String>,
    /// 因果ID（触发本次操作的上游命令或事件）
    causation_id: Option<String>,
    /// 触发事件的主体类型（如用户、系统等）
    actor_type: Option<String>,
    /// 触发事件的主体ID
    actor_id: Option<String>,
}

impl BusinessContext {
    /// 系统内部触发（无外部请求主体）
    pub fn system() -> Self {
        Self::builder().actor_type("system".to_string()).build()
    }

    pub fn correlation_id(&self) -> Option<&str> {
        self.correlation_id.as_deref()
    }

    pub fn causation_id(&self) -> Option<&str> {
        self.causation_id.as_deref()
    }

    pub fn actor_type(&self) -> Option<&str> {
        self.actor_type.as_deref()
    }

    pub fn actor_id(&self) -> Option<&str> {
        self.actor_id.as_deref()
    }
}
