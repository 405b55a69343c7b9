use super::ValidateUserCredentials;
use crate::model::UserDto;
use crate::password::PasswordHasher;
use crate::projection::RelationResolver;
use crate::repository::UserReader;
use admin_application::context::AppContext;
use admin_application::error::AppError;
use admin_application::query_handler::QueryHandler;
use async_trait::async_trait;
use std::sync::Arc;

/// 校验登录凭据：用户不存在、已停用或口令不符时返回 `None`
pub struct ValidateUserCredentialsHandler {
    users: Arc<dyn UserReader>,
    relations: RelationResolver,
    hasher: PasswordHasher,
}

impl ValidateUserCredentialsHandler {
    pub fn new(
        users: Arc<dyn UserReader>,
        relations: RelationResolver,
        hasher: PasswordHasher,
    ) -> Self {
        Self {
            users,
            relations,
            hasher,
        }
    }
}

#[async_trait]
impl QueryHandler<ValidateUserCredentials> for ValidateUserCredentialsHandler {
    async fn handle(
        &self,
        _ctx: &AppContext,
        q: ValidateUserCredentials,
    ) -> Result<Option<UserDto>, AppError> {
        let Some(user) = self.users.find_by_username(q.username.trim()).await? else {
            return Ok(None);
        };
        if !user.is_enabled() {
            tracing::debug!(user_id = user.id, "credentials rejected: user disabled");
            return Ok(None);
        }
        if !self.hasher.verify(&q.password, user.password_hash()).await? {
            tracing::debug!(user_id = user.id, "credentials rejected: password mismatch");
            return Ok(None);
        }
        Ok(Some(self.relations.project(&user).await?))
    }
}
