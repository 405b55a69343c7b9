//! 用户命令
//!
//! 每个命令对应唯一处理器；`UserCommandKind` 列出本模块的全部命令，
//! 启动时据此校验命令总线的注册是否完整。

mod create_user;
mod deactivate_user;
mod update_password;
mod update_profile;

pub use create_user::CreateUserHandler;
pub use deactivate_user::DeactivateUserHandler;
pub use update_password::UpdateUserPasswordHandler;
pub use update_profile::UpdateUserProfileHandler;

use crate::model::UserDto;
use admin_application::command::Command;
use admin_domain::entity::EntityId;
use bon::Builder;
use std::fmt;

/// 新建用户
#[derive(Clone, Builder)]
pub struct CreateUser {
    #[builder(into)]
    pub username: String,
    #[builder(into)]
    pub password: String,
    #[builder(into)]
    pub email: Option<String>,
    #[builder(into)]
    pub nickname: Option<String>,
    #[builder(default)]
    pub role_ids: Vec<EntityId>,
    pub dept_id: Option<EntityId>,
}

impl Command for CreateUser {
    const NAME: &'static str = "CreateUser";
    type Output = UserDto;
}

impl fmt::Debug for CreateUser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CreateUser")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("email", &self.email)
            .field("nickname", &self.nickname)
            .field("role_ids", &self.role_ids)
            .field("dept_id", &self.dept_id)
            .finish()
    }
}

/// 修改口令：需要提供旧口令
#[derive(Clone)]
pub struct UpdateUserPassword {
    pub user_id: EntityId,
    pub old_password: String,
    pub new_password: String,
}

impl Command for UpdateUserPassword {
    const NAME: &'static str = "UpdateUserPassword";
    type Output = ();
}

impl fmt::Debug for UpdateUserPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UpdateUserPassword")
            .field("user_id", &self.user_id)
            .finish_non_exhaustive()
    }
}

/// 修改资料：只应用提供了值的字段
#[derive(Debug, Clone, Default, Builder)]
pub struct UpdateUserProfile {
    pub user_id: EntityId,
    #[builder(into)]
    pub nickname: Option<String>,
    #[builder(into)]
    pub avatar: Option<String>,
    #[builder(into)]
    pub email: Option<String>,
    #[builder(into)]
    pub phone: Option<String>,
    #[builder(into)]
    pub qq: Option<String>,
    #[builder(into)]
    pub remark: Option<String>,
}

impl Command for UpdateUserProfile {
    const NAME: &'static str = "UpdateUserProfile";
    type Output = UserDto;
}

/// 停用用户（幂等）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeactivateUser {
    pub user_id: EntityId,
}

impl Command for DeactivateUser {
    const NAME: &'static str = "DeactivateUser";
    type Output = ();
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserCommandKind {
    CreateUser,
    UpdateUserPassword,
    UpdateUserProfile,
    DeactivateUser,
}

impl UserCommandKind {
    pub const ALL: [UserCommandKind; 4] = [
        UserCommandKind::CreateUser,
        UserCommandKind::UpdateUserPassword,
        UserCommandKind::UpdateUserProfile,
        UserCommandKind::DeactivateUser,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            UserCommandKind::CreateUser => CreateUser::NAME,
            UserCommandKind::UpdateUserPassword => UpdateUserPassword::NAME,
            UserCommandKind::UpdateUserProfile => UpdateUserProfile::NAME,
            UserCommandKind::DeactivateUser => DeactivateUser::NAME,
        }
    }

    pub fn names() -> Vec<&'static str> {
        Self::ALL.iter().map(|k| k.name()).collect()
    }
}
