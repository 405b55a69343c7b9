//! 用户控制器
//!
//! 每个方法只负责把外部输入组装成一个命令或查询并分发，不包含业务逻辑。
//! 路径参数以字符串传入，非数字的标识返回 `AppError::Validation`。

use crate::commands::{CreateUser, DeactivateUser, UpdateUserPassword, UpdateUserProfile};
use crate::model::{UserDto, UserStatus};
use crate::queries::{
    GetUserById, GetUserByUsername, GetUserPermissions, GetUsers, ValidateUserCredentials,
};
use admin_application::command_bus::CommandBus;
use admin_application::context::AppContext;
use admin_application::error::AppError;
use admin_application::query_bus::QueryBus;
use admin_application::{InMemoryCommandBus, InMemoryQueryBus};
use admin_domain::entity::EntityId;
use admin_domain::value_object::{Page, Pagination};
use serde::Deserialize;
use std::sync::Arc;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    pub username: String,
    pub password: String,
    pub email: Option<String>,
    pub nickname: Option<String>,
    #[serde(default)]
    pub role_ids: Vec<EntityId>,
    pub dept_id: Option<EntityId>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListUsersRequest {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub keyword: Option<String>,
    pub dept_id: Option<EntityId>,
    pub status: Option<UserStatus>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePasswordRequest {
    pub old_password: String,
    pub new_password: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    pub nickname: Option<String>,
    pub avatar: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub qq: Option<String>,
    pub remark: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CredentialsRequest {
    pub username: String,
    pub password: String,
}

pub struct UserController<C = InMemoryCommandBus, Q = InMemoryQueryBus> {
    commands: Arc<C>,
    queries: Arc<Q>,
}

impl<C, Q> Clone for UserController<C, Q> {
    fn clone(&self) -> Self {
        Self {
            commands: self.commands.clone(),
            queries: self.queries.clone(),
        }
    }
}

fn parse_id(raw: &str) -> Result<EntityId, AppError> {
    raw.trim()
        .parse::<EntityId>()
        .map_err(|_| AppError::Validation(format!("invalid user id `{raw}`")))
}

impl<C, Q> UserController<C, Q>
where
    C: CommandBus,
    Q: QueryBus,
{
    pub fn new(commands: Arc<C>, queries: Arc<Q>) -> Self {
        Self { commands, queries }
    }

    pub async fn create_user(
        &self,
        ctx: &AppContext,
        req: CreateUserRequest,
    ) -> Result<UserDto, AppError> {
        let cmd = CreateUser::builder()
            .username(req.username)
            .password(req.password)
            .maybe_email(req.email)
            .maybe_nickname(req.nickname)
            .role_ids(req.role_ids)
            .maybe_dept_id(req.dept_id)
            .build();
        self.commands.dispatch(ctx, cmd).await
    }

    pub async fn get_user_by_id(
        &self,
        ctx: &AppContext,
        id: &str,
    ) -> Result<Option<UserDto>, AppError> {
        let user_id = parse_id(id)?;
        self.queries.dispatch(ctx, GetUserById { user_id }).await
    }

    pub async fn get_user_by_username(
        &self,
        ctx: &AppContext,
        username: &str,
    ) -> Result<Option<UserDto>, AppError> {
        let q = GetUserByUsername {
            username: username.to_string(),
        };
        self.queries.dispatch(ctx, q).await
    }

    pub async fn list_users(
        &self,
        ctx: &AppContext,
        req: ListUsersRequest,
    ) -> Result<Page<UserDto>, AppError> {
        let q = GetUsers::builder()
            .page(req.page.unwrap_or(1))
            .limit(req.limit.unwrap_or(Pagination::DEFAULT_LIMIT))
            .maybe_keyword(req.keyword)
            .maybe_dept_id(req.dept_id)
            .maybe_status(req.status)
            .build();
        self.queries.dispatch(ctx, q).await
    }

    pub async fn update_password(
        &self,
        ctx: &AppContext,
        id: &str,
        req: UpdatePasswordRequest,
    ) -> Result<(), AppError> {
        let cmd = UpdateUserPassword {
            user_id: parse_id(id)?,
            old_password: req.old_password,
            new_password: req.new_password,
        };
        self.commands.dispatch(ctx, cmd).await
    }

    pub async fn update_profile(
        &self,
        ctx: &AppContext,
        id: &str,
        req: UpdateProfileRequest,
    ) -> Result<UserDto, AppError> {
        let cmd = UpdateUserProfile::builder()
            .user_id(parse_id(id)?)
            .maybe_nickname(req.nickname)
            .maybe_avatar(req.avatar)
            .maybe_email(req.email)
            .maybe_phone(req.phone)
            .maybe_qq(req.qq)
            .maybe_remark(req.remark)
            .build();
        self.commands.dispatch(ctx, cmd).await
    }

    pub async fn deactivate_user(&self, ctx: &AppContext, id: &str) -> Result<(), AppError> {
        let user_id = parse_id(id)?;
        self.commands.dispatch(ctx, DeactivateUser { user_id }).await
    }

    pub async fn permissions(&self, ctx: &AppContext, id: &str) -> Result<Vec<String>, AppError> {
        let user_id = parse_id(id)?;
        self.queries.dispatch(ctx, GetUserPermissions { user_id }).await
    }

    pub async fn validate_credentials(
        &self,
        ctx: &AppContext,
        req: CredentialsRequest,
    ) -> Result<Option<UserDto>, AppError> {
        let q = ValidateUserCredentials {
            username: req.username,
            password: req.password,
        };
        self.queries.dispatch(ctx, q).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_must_be_numeric() {
        assert_eq!(parse_id(" 42 ").unwrap(), 42);
        assert!(matches!(parse_id("abc"), Err(AppError::Validation(_))));
        assert!(matches!(parse_id("-1"), Err(AppError::Validation(_))));
    }

    #[test]
    fn create_request_accepts_camel_case_body() {
        let req: CreateUserRequest = serde_json::from_str(
            r#"{"username":"alice","password":"pw1","roleIds":[1,2],"deptId":3}"#,
        )
        .unwrap();
        assert_eq!(req.role_ids, vec![1, 2]);
        assert_eq!(req.dept_id, Some(3));
        assert!(req.email.is_none());
    }
}
