//! 用户事件处理器
//!
//! 处理器在事件总线的后台任务中运行，失败只会被总线记录。

use crate::events::UserEvent;
use admin_domain::domain_event::EventEnvelope;
use admin_domain::entity::EntityId;
use admin_domain::eventing::{EventHandler, HandledEventType};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::Mutex;
use uuid::Uuid;

/// 记录新建用户
#[derive(Debug, Default)]
pub struct UserCreatedLogger;

#[async_trait]
impl EventHandler for UserCreatedLogger {
    fn handler_name(&self) -> &str {
        "user-created-logger"
    }

    fn handled_event_type(&self) -> HandledEventType {
        HandledEventType::One(UserEvent::CREATED.to_string())
    }

    async fn handle(&self, event: &EventEnvelope) -> anyhow::Result<()> {
        if let UserEvent::Created { user_id, user } = event.decode::<UserEvent>()? {
            tracing::info!(
                user_id,
                username = %user.username,
                correlation_id = event.context().correlation_id().unwrap_or_default(),
                "handling user created event"
            );
        }
        Ok(())
    }
}

/// 审计记录
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuditRecord {
    pub event_id: Uuid,
    pub event_type: String,
    pub subject_id: EntityId,
    pub actor: Option<String>,
    pub occurred_at: DateTime<Utc>,
}

impl AuditRecord {
    fn from_envelope(event: &EventEnvelope) -> Self {
        let ctx = event.context();
        let actor = match (ctx.actor_type(), ctx.actor_id()) {
            (Some(kind), Some(id)) => Some(format!("{kind}:{id}")),
            (Some(kind), None) => Some(kind.to_string()),
            (None, Some(id)) => Some(id.to_string()),
            (None, None) => None,
        };
        Self {
            event_id: event.event_id(),
            event_type: event.event_type().to_string(),
            subject_id: event.subject_id(),
            actor,
            occurred_at: event.occurred_at(),
        }
    }
}

/// 内存审计轨迹：订阅全部用户事件
#[derive(Debug, Default)]
pub struct AuditTrail {
    records: Mutex<Vec<AuditRecord>>,
}

impl AuditTrail {
    pub fn new() -> Self {
        Self::default()
    }

    /// 按写入顺序返回快照
    pub async fn records(&self) -> Vec<AuditRecord> {
        self.records.lock().await.clone()
    }
}

#[async_trait]
impl EventHandler for AuditTrail {
    fn handler_name(&self) -> &str {
        "user-audit-trail"
    }

    fn handled_event_type(&self) -> HandledEventType {
        HandledEventType::Many(UserEvent::ALL.iter().map(|t| t.to_string()).collect())
    }

    async fn handle(&self, event: &EventEnvelope) -> anyhow::Result<()> {
        let record = AuditRecord::from_envelope(event);
        tracing::debug!(
            event_type = %record.event_type,
            subject_id = record.subject_id,
            "audit record appended"
        );
        self.records.lock().await.push(record);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::CreatedUser;
    use admin_domain::domain_event::BusinessContext;

    fn created() -> EventEnvelope {
        let event = UserEvent::Created {
            user_id: 1,
            user: CreatedUser {
                username: "alice".into(),
                email: None,
                nickname: "alice".into(),
            },
        };
        let ctx = BusinessContext::builder()
            .actor_type("admin".to_string())
            .actor_id("9".to_string())
            .build();
        EventEnvelope::wrap(&event, ctx).unwrap()
    }

    #[tokio::test]
    async fn audit_trail_records_actor_and_type() {
        let trail = AuditTrail::new();
        let envelope = created();
        trail.handle(&envelope).await.unwrap();

        let records = trail.records().await;
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].event_type, UserEvent::CREATED);
        assert_eq!(records[0].actor.as_deref(), Some("admin:9"));
        assert_eq!(records[0].event_id, envelope.event_id());
    }

    #[tokio::test]
    async fn logger_rejects_foreign_payloads() {
        let foreign = EventEnvelope::builder()
            .event_type(UserEvent::CREATED.to_string())
            .subject_type("order".to_string())
            .subject_id(1)
            .payload(serde_json::json!({}))
            .build();
        assert!(UserCreatedLogger.handle(&foreign).await.is_err());
        assert!(UserCreatedLogger.handle(&created()).await.is_ok());
    }

    #[test]
    fn subscriptions() {
        assert_eq!(
            UserCreatedLogger.handled_event_type(),
            HandledEventType::One("UserEvent.Created".into())
        );
        match AuditTrail::new().handled_event_type() {
            HandledEventType::Many(types) => assert_eq!(types.len(), 4),
            other => panic!("unexpected subscription: {other:?}"),
        }
    }
}
