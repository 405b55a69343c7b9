//! 用户查询
//!
//! 查询处理器只持有只读的存储接口，点查未命中返回 `None` 而不是错误。

mod credentials;
mod get_user;
mod list_users;
mod permissions;

pub use credentials::ValidateUserCredentialsHandler;
pub use get_user::{GetUserByIdHandler, GetUserByUsernameHandler};
pub use list_users::GetUsersHandler;
pub use permissions::GetUserPermissionsHandler;

use crate::model::{UserDto, UserStatus};
use admin_application::query::Query;
use admin_domain::entity::EntityId;
use admin_domain::value_object::{Page, Pagination};
use bon::Builder;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GetUserById {
    pub user_id: EntityId,
}

impl Query for GetUserById {
    const NAME: &'static str = "GetUserById";
    type Dto = Option<UserDto>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetUserByUsername {
    pub username: String,
}

impl Query for GetUserByUsername {
    const NAME: &'static str = "GetUserByUsername";
    type Dto = Option<UserDto>;
}

/// 分页列表
#[derive(Debug, Clone, PartialEq, Eq, Builder)]
pub struct GetUsers {
    #[builder(default = 1)]
    pub page: u32,
    #[builder(default = Pagination::DEFAULT_LIMIT)]
    pub limit: u32,
    #[builder(into)]
    pub keyword: Option<String>,
    pub dept_id: Option<EntityId>,
    pub status: Option<UserStatus>,
}

impl Default for GetUsers {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl Query for GetUsers {
    const NAME: &'static str = "GetUsers";
    type Dto = Page<UserDto>;
}

/// 用户拥有的权限码（来自其全部角色，排序去重）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GetUserPermissions {
    pub user_id: EntityId,
}

impl Query for GetUserPermissions {
    const NAME: &'static str = "GetUserPermissions";
    type Dto = Vec<String>;
}

#[derive(Clone)]
pub struct ValidateUserCredentials {
    pub username: String,
    pub password: String,
}

impl Query for ValidateUserCredentials {
    const NAME: &'static str = "ValidateUserCredentials";
    type Dto = Option<UserDto>;
}

impl fmt::Debug for ValidateUserCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidateUserCredentials")
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserQueryKind {
    GetUserById,
    GetUserByUsername,
    GetUsers,
    GetUserPermissions,
    ValidateUserCredentials,
}

impl UserQueryKind {
    pub const ALL: [UserQueryKind; 5] = [
        UserQueryKind::GetUserById,
        UserQueryKind::GetUserByUsername,
        UserQueryKind::GetUsers,
        UserQueryKind::GetUserPermissions,
        UserQueryKind::ValidateUserCredentials,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            UserQueryKind::GetUserById => GetUserById::NAME,
            UserQueryKind::GetUserByUsername => GetUserByUsername::NAME,
            UserQueryKind::GetUsers => GetUsers::NAME,
            UserQueryKind::GetUserPermissions => GetUserPermissions::NAME,
            UserQueryKind::ValidateUserCredentials => ValidateUserCredentials::NAME,
        }
    }

    pub fn names() -> Vec<&'static str> {
        Self::ALL.iter().map(|k| k.name()).collect()
    }
}
