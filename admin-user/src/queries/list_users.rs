use super::GetUsers;
use crate::model::UserDto;
use crate::projection::RelationResolver;
use crate::repository::{UserFilter, UserReader};
use admin_application::context::AppContext;
use admin_application::error::AppError;
use admin_application::query_handler::QueryHandler;
use admin_domain::value_object::{Page, Pagination};
use async_trait::async_trait;
use std::sync::Arc;

pub struct GetUsersHandler {
    users: Arc<dyn UserReader>,
    relations: RelationResolver,
}

impl GetUsersHandler {
    pub fn new(users: Arc<dyn UserReader>, relations: RelationResolver) -> Self {
        Self { users, relations }
    }
}

#[async_trait]
impl QueryHandler<GetUsers> for GetUsersHandler {
    async fn handle(&self, _ctx: &AppContext, q: GetUsers) -> Result<Page<UserDto>, AppError> {
        let pagination = Pagination::new(q.page, q.limit)?;
        let filter = UserFilter {
            keyword: q.keyword,
            dept_id: q.dept_id,
            status: q.status,
        };

        let page = Page::slice(self.users.list(&filter).await?, pagination);

        let mut items = Vec::with_capacity(page.items.len());
        for user in &page.items {
            items.push(self.relations.project(user).await?);
        }
        Ok(Page {
            items,
            total: page.total,
            page: page.page,
            limit: page.limit,
        })
    }
}
