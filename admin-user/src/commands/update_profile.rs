use super::UpdateUserProfile;
use crate::events::{self, ProfileChanges, UserEvent};
use crate::model::UserDto;
use crate::projection::RelationResolver;
use crate::repository::{UserPatch, UserProfile, UserRepository};
use admin_application::command_handler::CommandHandler;
use admin_application::context::AppContext;
use admin_application::error::AppError;
use admin_domain::domain_event::FieldChanged;
use admin_domain::error::DomainError;
use admin_domain::eventing::EventBus;
use async_trait::async_trait;
use std::sync::Arc;

pub struct UpdateUserProfileHandler {
    users: Arc<dyn UserRepository>,
    relations: RelationResolver,
    events: Arc<dyn EventBus>,
}

impl UpdateUserProfileHandler {
    pub fn new(
        users: Arc<dyn UserRepository>,
        relations: RelationResolver,
        events: Arc<dyn EventBus>,
    ) -> Self {
        Self {
            users,
            relations,
            events,
        }
    }
}

/// 仅在提供了新值且与旧值不同时写入，并记录变更
fn apply(
    changes: &mut ProfileChanges,
    field: &str,
    slot: &mut Option<String>,
    new: Option<String>,
) {
    let Some(new) = new else {
        return;
    };
    if let Some(changed) = FieldChanged::diff(slot.clone(), Some(new)) {
        *slot = changed.new.clone();
        changes.insert(field.to_string(), changed);
    }
}

#[async_trait]
impl CommandHandler<UpdateUserProfile> for UpdateUserProfileHandler {
    async fn handle(&self, ctx: &AppContext, cmd: UpdateUserProfile) -> Result<UserDto, AppError> {
        let Some(mut user) = self.users.find_by_id(cmd.user_id).await? else {
            return Err(DomainError::not_found(format!("user id={}", cmd.user_id)).into());
        };

        let mut changes = ProfileChanges::new();

        let mut nickname = Some(user.nickname.clone());
        match cmd.nickname {
            Some(n) if n.trim().is_empty() => {
                return Err(AppError::Validation("nickname must not be blank".to_string()));
            }
            n => apply(&mut changes, "nickname", &mut nickname, n),
        }
        if let Some(n) = nickname {
            user.nickname = n;
        }
        apply(&mut changes, "avatar", &mut user.avatar, cmd.avatar);
        apply(&mut changes, "email", &mut user.email, cmd.email);
        apply(&mut changes, "phone", &mut user.phone, cmd.phone);
        apply(&mut changes, "qq", &mut user.qq, cmd.qq);
        apply(&mut changes, "remark", &mut user.remark, cmd.remark);

        if changes.is_empty() {
            tracing::debug!(user_id = user.id, "profile unchanged");
            return Ok(self.relations.project(&user).await?);
        }

        // 只写资料列，不会回写读取时的口令或状态
        let saved = self
            .users
            .update(user.id, UserPatch::Profile(UserProfile::of(&user)))
            .await?;

        let event = UserEvent::ProfileUpdated {
            user_id: saved.id,
            changes,
            updated_at: saved.updated_at,
        };
        events::publish(self.events.as_ref(), ctx, &event).await;

        Ok(self.relations.project(&saved).await?)
    }
}
