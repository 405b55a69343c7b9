//! 用户聚合的数据模型
//!
//! `User` 持有口令哈希，因此不实现 `Serialize`；对外一律通过 [`UserDto`] 输出。

use admin_application::dto::Dto;
use admin_domain::entity::{Entity, EntityId};
use bon::Builder;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserStatus {
    #[default]
    Enabled,
    Disabled,
}

#[derive(Clone, PartialEq, Builder)]
pub struct User {
    #[builder(default)]
    pub id: EntityId,
    pub username: String,
    password_hash: String,
    pub email: Option<String>,
    pub nickname: String,
    pub avatar: Option<String>,
    pub phone: Option<String>,
    pub qq: Option<String>,
    pub remark: Option<String>,
    #[builder(default)]
    pub status: UserStatus,
    #[builder(default)]
    pub role_ids: Vec<EntityId>,
    pub dept_id: Option<EntityId>,
    #[builder(default = Utc::now())]
    pub created_at: DateTime<Utc>,
    #[builder(default = Utc::now())]
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn password_hash(&self) -> &str {
        &self.password_hash
    }

    pub fn set_password_hash(&mut self, hash: String) {
        self.password_hash = hash;
        self.touch();
    }

    pub fn is_enabled(&self) -> bool {
        self.status == UserStatus::Enabled
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

impl fmt::Debug for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("username", &self.username)
            .field("password_hash", &"<redacted>")
            .field("email", &self.email)
            .field("nickname", &self.nickname)
            .field("status", &self.status)
            .field("role_ids", &self.role_ids)
            .field("dept_id", &self.dept_id)
            .finish_non_exhaustive()
    }
}

impl Entity for User {
    const TYPE: &'static str = "user";

    fn id(&self) -> EntityId {
        self.id
    }

    fn assign_id(&mut self, id: EntityId) {
        self.id = id;
    }

    fn natural_key(&self) -> Option<&str> {
        Some(&self.username)
    }
}

/// 角色：`value` 为唯一编码，`permissions` 为权限码列表
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    pub id: EntityId,
    pub name: String,
    pub value: String,
    #[serde(default)]
    pub permissions: Vec<String>,
}

impl Role {
    pub fn new(
        name: impl Into<String>,
        value: impl Into<String>,
        permissions: Vec<String>,
    ) -> Self {
        Self {
            id: 0,
            name: name.into(),
            value: value.into(),
            permissions,
        }
    }
}

impl Entity for Role {
    const TYPE: &'static str = "role";

    fn id(&self) -> EntityId {
        self.id
    }

    fn assign_id(&mut self, id: EntityId) {
        self.id = id;
    }

    fn natural_key(&self) -> Option<&str> {
        Some(&self.value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dept {
    pub id: EntityId,
    pub name: String,
}

impl Dept {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: 0,
            name: name.into(),
        }
    }
}

impl Entity for Dept {
    const TYPE: &'static str = "dept";

    fn id(&self) -> EntityId {
        self.id
    }

    fn assign_id(&mut self, id: EntityId) {
        self.id = id;
    }
}

/// 用户的对外投影：不含口令哈希，关联角色与部门已解析
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserDto {
    pub id: EntityId,
    pub username: String,
    pub email: Option<String>,
    pub nickname: String,
    pub avatar: Option<String>,
    pub phone: Option<String>,
    pub qq: Option<String>,
    pub remark: Option<String>,
    pub status: UserStatus,
    pub roles: Vec<Role>,
    pub dept: Option<Dept>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Dto for UserDto {}

impl UserDto {
    pub fn assemble(user: &User, roles: Vec<Role>, dept: Option<Dept>) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            nickname: user.nickname.clone(),
            avatar: user.avatar.clone(),
            phone: user.phone.clone(),
            qq: user.qq.clone(),
            remark: user.remark.clone(),
            status: user.status,
            roles,
            dept,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }

    pub fn role_ids(&self) -> Vec<EntityId> {
        self.roles.iter().map(|r| r.id).collect()
    }
}
