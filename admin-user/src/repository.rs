//! 用户存储协作方
//!
//! 查询处理器只拿到 `UserReader`，命令处理器拿到 `UserRepository`。
//! 角色与部门在本模块中只读。

use crate::model::{Dept, Role, User, UserStatus};
use admin_application::deadline::with_deadline;
use admin_domain::entity::EntityId;
use admin_domain::error::DomainResult;
use admin_domain::persist::{EntityReader, InMemoryRepository, Repository};
use async_trait::async_trait;
use std::time::Duration;

pub type RoleReader = dyn EntityReader<Role>;
pub type DeptReader = dyn EntityReader<Dept>;

/// 列表过滤条件；各条件之间为“与”关系
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserFilter {
    /// 用户名、昵称、邮箱的子串匹配（不区分大小写）
    pub keyword: Option<String>,
    pub dept_id: Option<EntityId>,
    pub status: Option<UserStatus>,
}

impl UserFilter {
    pub fn matches(&self, user: &User) -> bool {
        if self.dept_id.is_some_and(|d| user.dept_id != Some(d)) {
            return false;
        }
        if self.status.is_some_and(|s| user.status != s) {
            return false;
        }
        match self.keyword.as_deref().map(str::trim) {
            None | Some("") => true,
            Some(kw) => {
                let kw = kw.to_lowercase();
                [
                    Some(user.username.as_str()),
                    Some(user.nickname.as_str()),
                    user.email.as_deref(),
                ]
                .into_iter()
                .flatten()
                .any(|field| field.to_lowercase().contains(&kw))
            }
        }
    }
}

/// 资料字段
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserProfile {
    pub nickname: String,
    pub avatar: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub qq: Option<String>,
    pub remark: Option<String>,
}

impl UserProfile {
    pub fn of(user: &User) -> Self {
        Self {
            nickname: user.nickname.clone(),
            avatar: user.avatar.clone(),
            email: user.email.clone(),
            phone: user.phone.clone(),
            qq: user.qq.clone(),
            remark: user.remark.clone(),
        }
    }
}

/// 对单条用户记录的局部写入；未涉及的列保留存储中的当前值
#[derive(Clone)]
pub enum UserPatch {
    Profile(UserProfile),
    PasswordHash(String),
    Status(UserStatus),
}

impl UserPatch {
    pub fn apply_to(self, user: &mut User) {
        match self {
            UserPatch::Profile(p) => {
                user.nickname = p.nickname;
                user.avatar = p.avatar;
                user.email = p.email;
                user.phone = p.phone;
                user.qq = p.qq;
                user.remark = p.remark;
            }
            UserPatch::PasswordHash(hash) => user.set_password_hash(hash),
            UserPatch::Status(status) => user.status = status,
        }
        user.touch();
    }
}

#[async_trait]
pub trait UserReader: Send + Sync {
    async fn find_by_id(&self, id: EntityId) -> DomainResult<Option<User>>;

    async fn find_by_username(&self, username: &str) -> DomainResult<Option<User>>;

    /// 满足条件的用户，按标识升序
    async fn list(&self, filter: &UserFilter) -> DomainResult<Vec<User>>;
}

#[async_trait]
pub trait UserRepository: UserReader {
    /// 新建或更新；用户名冲突返回 `DomainError::DuplicateEntity`
    async fn save(&self, user: User) -> DomainResult<User>;

    /// 原子地局部更新一条已存在的记录；不存在返回 `DomainError::NotFound`
    async fn update(&self, id: EntityId, patch: UserPatch) -> DomainResult<User>;
}

/// 内存版用户存储，可为每次调用设置时限
#[derive(Default)]
pub struct InMemoryUserStore {
    rows: InMemoryRepository<User>,
    deadline: Option<Duration>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_deadline(mut self, deadline: Option<Duration>) -> Self {
        self.deadline = deadline;
        self
    }

    pub fn set_available(&self, available: bool) {
        self.rows.set_available(available);
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[async_trait]
impl UserReader for InMemoryUserStore {
    async fn find_by_id(&self, id: EntityId) -> DomainResult<Option<User>> {
        with_deadline(self.deadline, self.rows.find_by_id(id)).await
    }

    async fn find_by_username(&self, username: &str) -> DomainResult<Option<User>> {
        with_deadline(self.deadline, self.rows.find_by_key(username)).await
    }

    async fn list(&self, filter: &UserFilter) -> DomainResult<Vec<User>> {
        let all = with_deadline(self.deadline, self.rows.find_all()).await?;
        Ok(all.into_iter().filter(|u| filter.matches(u)).collect())
    }
}

#[async_trait]
impl UserRepository for InMemoryUserStore {
    async fn save(&self, user: User) -> DomainResult<User> {
        with_deadline(self.deadline, self.rows.save(user)).await
    }

    async fn update(&self, id: EntityId, patch: UserPatch) -> DomainResult<User> {
        with_deadline(self.deadline, async {
            self.rows.update_with(id, |user| patch.apply_to(user))
        })
        .await
    }
}
