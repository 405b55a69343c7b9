use super::{GetUserById, GetUserByUsername};
use crate::model::UserDto;
use crate::projection::RelationResolver;
use crate::repository::UserReader;
use admin_application::context::AppContext;
use admin_application::error::AppError;
use admin_application::query_handler::QueryHandler;
use async_trait::async_trait;
use std::sync::Arc;

/// 按标识点查，关联角色与部门一并返回
pub struct GetUserByIdHandler {
    users: Arc<dyn UserReader>,
    relations: RelationResolver,
}

impl GetUserByIdHandler {
    pub fn new(users: Arc<dyn UserReader>, relations: RelationResolver) -> Self {
        Self { users, relations }
    }
}

#[async_trait]
impl QueryHandler<GetUserById> for GetUserByIdHandler {
    async fn handle(&self, _ctx: &AppContext, q: GetUserById) -> Result<Option<UserDto>, AppError> {
        match self.users.find_by_id(q.user_id).await? {
            Some(user) => Ok(Some(self.relations.project(&user).await?)),
            None => Ok(None),
        }
    }
}

pub struct GetUserByUsernameHandler {
    users: Arc<dyn UserReader>,
    relations: RelationResolver,
}

impl GetUserByUsernameHandler {
    pub fn new(users: Arc<dyn UserReader>, relations: RelationResolver) -> Self {
        Self { users, relations }
    }
}

#[async_trait]
impl QueryHandler<GetUserByUsername> for GetUserByUsernameHandler {
    async fn handle(
        &self,
        _ctx: &AppContext,
        q: GetUserByUsername,
    ) -> Result<Option<UserDto>, AppError> {
        match self.users.find_by_username(q.username.trim()).await? {
            Some(user) => Ok(Some(self.relations.project(&user).await?)),
            None => Ok(None),
        }
    }
}
