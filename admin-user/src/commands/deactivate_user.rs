use super::DeactivateUser;
use crate::events::{self, UserEvent};
use crate::model::UserStatus;
use crate::repository::{UserPatch, UserRepository};
use admin_application::command_handler::CommandHandler;
use admin_application::context::AppContext;
use admin_application::error::AppError;
use admin_domain::error::DomainError;
use admin_domain::eventing::EventBus;
use async_trait::async_trait;
use std::sync::Arc;

/// 停用用户；已停用时直接成功，不写入也不发布事件
pub struct DeactivateUserHandler {
    users: Arc<dyn UserRepository>,
    events: Arc<dyn EventBus>,
}

impl DeactivateUserHandler {
    pub fn new(users: Arc<dyn UserRepository>, events: Arc<dyn EventBus>) -> Self {
        Self { users, events }
    }
}

#[async_trait]
impl CommandHandler<DeactivateUser> for DeactivateUserHandler {
    async fn handle(&self, ctx: &AppContext, cmd: DeactivateUser) -> Result<(), AppError> {
        let Some(user) = self.users.find_by_id(cmd.user_id).await? else {
            return Err(DomainError::not_found(format!("user id={}", cmd.user_id)).into());
        };

        if !user.is_enabled() {
            tracing::debug!(user_id = user.id, "user already disabled");
            return Ok(());
        }

        let saved = self
            .users
            .update(user.id, UserPatch::Status(UserStatus::Disabled))
            .await?;

        let event = UserEvent::Deactivated {
            user_id: saved.id,
            deactivated_at: saved.updated_at,
        };
        events::publish(self.events.as_ref(), ctx, &event).await;
        Ok(())
    }
}
