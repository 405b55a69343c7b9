//! 用户领域事件
//!
//! 封闭枚举，每个变体对应一个已发生的事实。事件只携带脱敏快照，
//! 不包含口令或哈希。

use admin_application::context::AppContext;
use admin_domain::domain_event::{DomainEvent, EventEnvelope, FieldChanged};
use admin_domain::entity::EntityId;
use admin_domain::eventing::EventBus;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 新建用户的脱敏快照
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedUser {
    pub username: String,
    pub email: Option<String>,
    pub nickname: String,
}

/// 资料变更：字段名 -> 旧值/新值，仅包含实际发生变化的字段
pub type ProfileChanges = BTreeMap<String, FieldChanged<Option<String>>>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum UserEvent {
    Created {
        user_id: EntityId,
        user: CreatedUser,
    },
    PasswordChanged {
        user_id: EntityId,
        changed_at: DateTime<Utc>,
    },
    ProfileUpdated {
        user_id: EntityId,
        changes: ProfileChanges,
        updated_at: DateTime<Utc>,
    },
    Deactivated {
        user_id: EntityId,
        deactivated_at: DateTime<Utc>,
    },
}

impl UserEvent {
    pub const CREATED: &'static str = "UserEvent.Created";
    pub const PASSWORD_CHANGED: &'static str = "UserEvent.PasswordChanged";
    pub const PROFILE_UPDATED: &'static str = "UserEvent.ProfileUpdated";
    pub const DEACTIVATED: &'static str = "UserEvent.Deactivated";

    /// 全部事件类型
    pub const ALL: [&'static str; 4] = [
        Self::CREATED,
        Self::PASSWORD_CHANGED,
        Self::PROFILE_UPDATED,
        Self::DEACTIVATED,
    ];
}

impl DomainEvent for UserEvent {
    const SUBJECT_TYPE: &'static str = "user";

    fn event_type(&self) -> &'static str {
        match self {
            UserEvent::Created { .. } => Self::CREATED,
            UserEvent::PasswordChanged { .. } => Self::PASSWORD_CHANGED,
            UserEvent::ProfileUpdated { .. } => Self::PROFILE_UPDATED,
            UserEvent::Deactivated { .. } => Self::DEACTIVATED,
        }
    }

    fn subject_id(&self) -> EntityId {
        match self {
            UserEvent::Created { user_id, .. }
            | UserEvent::PasswordChanged { user_id, .. }
            | UserEvent::ProfileUpdated { user_id, .. }
            | UserEvent::Deactivated { user_id, .. } => *user_id,
        }
    }
}

/// 封装并发布事件。
///
/// 状态已经写入，封装失败只记录日志，不影响命令结果。
pub(crate) async fn publish(bus: &dyn EventBus, ctx: &AppContext, event: &UserEvent) {
    match EventEnvelope::wrap(event, ctx.biz.clone()) {
        Ok(envelope) => bus.publish(envelope).await,
        Err(err) => tracing::error!(
            event_type = event.event_type(),
            user_id = event.subject_id(),
            error = %err,
            "failed to wrap user event"
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use admin_domain::domain_event::BusinessContext;

    #[test]
    fn created_envelope_round_trips_without_secrets() {
        let event = UserEvent::Created {
            user_id: 7,
            user: CreatedUser {
                username: "alice".into(),
                email: None,
                nickname: "alice".into(),
            },
        };
        let ctx = BusinessContext::builder()
            .correlation_id("req-1".to_string())
            .build();
        let envelope = EventEnvelope::wrap(&event, ctx).unwrap();

        assert_eq!(envelope.event_type(), UserEvent::CREATED);
        assert_eq!(envelope.subject_type(), "user");
        assert_eq!(envelope.subject_id(), 7);
        assert_eq!(envelope.context().correlation_id(), Some("req-1"));
        assert!(!envelope.payload().to_string().contains("password"));
        assert_eq!(envelope.decode::<UserEvent>().unwrap(), event);
    }

    #[test]
    fn event_types_are_distinct() {
        let mut types = UserEvent::ALL.to_vec();
        types.sort_unstable();
        types.dedup();
        assert_eq!(types.len(), UserEvent::ALL.len());
    }
}
