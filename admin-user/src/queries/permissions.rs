use super::GetUserPermissions;
use crate::projection::RelationResolver;
use crate::repository::UserReader;
use admin_application::context::AppContext;
use admin_application::error::AppError;
use admin_application::query_handler::QueryHandler;
use async_trait::async_trait;
use std::collections::BTreeSet;
use std::sync::Arc;

pub struct GetUserPermissionsHandler {
    users: Arc<dyn UserReader>,
    relations: RelationResolver,
}

impl GetUserPermissionsHandler {
    pub fn new(users: Arc<dyn UserReader>, relations: RelationResolver) -> Self {
        Self { users, relations }
    }
}

#[async_trait]
impl QueryHandler<GetUserPermissions> for GetUserPermissionsHandler {
    async fn handle(
        &self,
        _ctx: &AppContext,
        q: GetUserPermissions,
    ) -> Result<Vec<String>, AppError> {
        let Some(user) = self.users.find_by_id(q.user_id).await? else {
            return Ok(Vec::new());
        };

        let perms: BTreeSet<String> = self
            .relations
            .roles_of(&user)
            .await?
            .into_iter()
            .flat_map(|role| role.permissions)
            .collect();
        Ok(perms.into_iter().collect())
    }
}
