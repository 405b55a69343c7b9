use super::UpdateUserPassword;
use crate::events::{self, UserEvent};
use crate::password::PasswordHasher;
use crate::repository::{UserPatch, UserRepository};
use admin_application::command_handler::CommandHandler;
use admin_application::context::AppContext;
use admin_application::error::AppError;
use admin_domain::error::DomainError;
use admin_domain::eventing::EventBus;
use async_trait::async_trait;
use std::sync::Arc;

pub struct UpdateUserPasswordHandler {
    users: Arc<dyn UserRepository>,
    hasher: PasswordHasher,
    events: Arc<dyn EventBus>,
}

impl UpdateUserPasswordHandler {
    pub fn new(
        users: Arc<dyn UserRepository>,
        hasher: PasswordHasher,
        events: Arc<dyn EventBus>,
    ) -> Self {
        Self {
            users,
            hasher,
            events,
        }
    }
}

#[async_trait]
impl CommandHandler<UpdateUserPassword> for UpdateUserPasswordHandler {
    async fn handle(&self, ctx: &AppContext, cmd: UpdateUserPassword) -> Result<(), AppError> {
        if cmd.new_password.is_empty() {
            return Err(AppError::Validation("new password is required".to_string()));
        }

        let Some(user) = self.users.find_by_id(cmd.user_id).await? else {
            return Err(DomainError::not_found(format!("user id={}", cmd.user_id)).into());
        };

        if !self.hasher.verify(&cmd.old_password, user.password_hash()).await? {
            return Err(DomainError::invalid_command("old password does not match").into());
        }

        let hash = self.hasher.hash(&cmd.new_password).await?;
        let saved = self
            .users
            .update(user.id, UserPatch::PasswordHash(hash))
            .await?;

        let event = UserEvent::PasswordChanged {
            user_id: saved.id,
            changed_at: saved.updated_at,
        };
        events::publish(self.events.as_ref(), ctx, &event).await;
        Ok(())
    }
}
