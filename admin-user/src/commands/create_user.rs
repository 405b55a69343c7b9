use super::CreateUser;
use crate::events::{self, CreatedUser, UserEvent};
use crate::model::{User, UserDto};
use crate::password::PasswordHasher;
use crate::projection::RelationResolver;
use crate::repository::UserRepository;
use crate::value_objects::Username;
use admin_application::command_handler::CommandHandler;
use admin_application::context::AppContext;
use admin_application::error::AppError;
use admin_domain::entity::Entity;
use admin_domain::error::DomainError;
use admin_domain::eventing::EventBus;
use async_trait::async_trait;
use std::sync::Arc;

/// 新建用户
///
/// 1. 校验用户名与口令；
/// 2. 按用户名查重（快速路径，存储层唯一约束兜底并发竞争）；
/// 3. Argon2 哈希口令；
/// 4. 解析角色与部门，任一无法解析即失败；
/// 5. 单次写入；
/// 6. 发布 `UserEvent::Created`（不含口令）；
/// 7. 返回持久化后的投影。
pub struct CreateUserHandler {
    users: Arc<dyn UserRepository>,
    relations: RelationResolver,
    hasher: PasswordHasher,
    events: Arc<dyn EventBus>,
}

impl CreateUserHandler {
    pub fn new(
        users: Arc<dyn UserRepository>,
        relations: RelationResolver,
        hasher: PasswordHasher,
        events: Arc<dyn EventBus>,
    ) -> Self {
        Self {
            users,
            relations,
            hasher,
            events,
        }
    }
}

#[async_trait]
impl CommandHandler<CreateUser> for CreateUserHandler {
    async fn handle(&self, ctx: &AppContext, cmd: CreateUser) -> Result<UserDto, AppError> {
        let username = Username::new(cmd.username)?;
        if cmd.password.is_empty() {
            return Err(AppError::Validation("password is required".to_string()));
        }

        if self.users.find_by_username(username.as_str()).await?.is_some() {
            return Err(DomainError::duplicate(User::TYPE, username.as_str()).into());
        }

        let password_hash = self.hasher.hash(&cmd.password).await?;
        let roles = self.relations.require_roles(&cmd.role_ids).await?;
        let dept = self.relations.require_dept(cmd.dept_id).await?;

        let nickname = cmd
            .nickname
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| username.as_str().to_string());
        let user = User::builder()
            .username(username.into_inner())
            .password_hash(password_hash)
            .maybe_email(cmd.email)
            .nickname(nickname)
            .role_ids(roles.iter().map(|r| r.id).collect())
            .maybe_dept_id(dept.as_ref().map(|d| d.id))
            .build();

        let saved = self.users.save(user).await?;
        tracing::info!(user_id = saved.id, username = %saved.username, "user created");

        let event = UserEvent::Created {
            user_id: saved.id,
            user: CreatedUser {
                username: saved.username.clone(),
                email: saved.email.clone(),
                nickname: saved.nickname.clone(),
            },
        };
        events::publish(self.events.as_ref(), ctx, &event).await;

        Ok(UserDto::assemble(&saved, roles, dept))
    }
}
