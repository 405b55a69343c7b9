use bon::Builder;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use super::{BusinessContext, DomainEvent};
use crate::entity::EntityId;
use crate::error::{DomainError, DomainResult};

/// 事件信封：事件载荷 + 主体信息 + 业务上下文
///
/// 载荷以 JSON 形式保存，使事件总线可以在进程范围内按 `event_type`
/// 路由任意聚合的事件；处理器通过 [`EventEnvelope::decode`] 还原强类型事件。
/// 信封构造后不可变。
#[derive(Debug, Clone, PartialEq, Builder, Serialize, Deserialize)]
pub struct EventEnvelope {
    /// 事件唯一标识符
    #[builder(default = Uuid::new_v4())]
    event_id: Uuid,
    /// 事件类型，用于处理器订阅
    event_type: String,
    /// 事件载荷版本
    #[builder(default = 1)]
    event_version: usize,
    /// 事件主体类型
    subject_type: String,
    /// 事件主体 ID
    subject_id: EntityId,
    /// 事件发生时间
    #[builder(default = Utc::now())]
    occurred_at: DateTime<Utc>,
    /// 事件负载
    payload: Value,
    /// 产生该事件的命令所携带的业务上下文
    #[builder(default)]
    context: BusinessContext,
}

impl EventEnvelope {
    /// 将强类型领域事件封装为信封
    pub fn wrap<E>(event: &E, context: BusinessContext) -> DomainResult<Self>
    where
        E: DomainEvent,
    {
        Ok(Self::builder()
            .event_type(event.event_type().to_string())
            .event_version(event.event_version())
            .subject_type(E::SUBJECT_TYPE.to_string())
            .subject_id(event.subject_id())
            .payload(serde_json::to_value(event)?)
            .context(context)
            .build())
    }

    /// 将载荷还原为强类型领域事件
    pub fn decode<E>(&self) -> DomainResult<E>
    where
        E: DomainEvent,
    {
        if self.subject_type != E::SUBJECT_TYPE {
            return Err(DomainError::invalid_value(format!(
                "subject type mismatch: expected={}, found={}",
                E::SUBJECT_TYPE,
                self.subject_type
            )));
        }
        Ok(serde_json::from_value(self.payload.clone())?)
    }

    pub fn event_id(&self) -> Uuid {
        self.event_id
    }

    pub fn event_type(&self) -> &str {
        &self.event_type
    }

    pub fn event_version(&self) -> usize {
        self.event_version
    }

    pub fn subject_type(&self) -> &str {
        &self.subject_type
    }

    pub fn subject_id(&self) -> EntityId {
        self.subject_id
    }

    pub fn occurred_at(&self) -> DateTime<Utc> {
        self.occurred_at
    }

    pub fn payload(&self) -> &Value {
        &self.payload
    }

    pub fn context(&self) -> &BusinessContext {
        &self.context
    }
}
