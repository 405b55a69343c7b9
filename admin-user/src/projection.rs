use crate::model::{Dept, Role, User, UserDto};
use crate::repository::{DeptReader, RoleReader};
use admin_domain::entity::{Entity, EntityId};
use admin_domain::error::{DomainError, DomainResult};
use std::collections::BTreeSet;
use std::sync::Arc;

/// 角色与部门引用的解析
///
/// - 写路径（`require_*`）：任一标识无法解析即返回 `ReferenceNotFound`；
/// - 读路径（`project`）：已被删除的关联直接缺席，不影响读取用户本身。
#[derive(Clone)]
pub struct RelationResolver {
    roles: Arc<RoleReader>,
    depts: Arc<DeptReader>,
}

impl RelationResolver {
    pub fn new(roles: Arc<RoleReader>, depts: Arc<DeptReader>) -> Self {
        Self { roles, depts }
    }

    pub async fn require_roles(&self, ids: &[EntityId]) -> DomainResult<Vec<Role>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let wanted: BTreeSet<EntityId> = ids.iter().copied().collect();
        let wanted: Vec<EntityId> = wanted.into_iter().collect();
        let found = self.roles.find_by_ids(&wanted).await?;

        let missing: Vec<EntityId> = wanted
            .iter()
            .copied()
            .filter(|id| !found.iter().any(|r| r.id == *id))
            .collect();
        if !missing.is_empty() {
            return Err(DomainError::reference_not_found(Role::TYPE, missing));
        }
        Ok(found)
    }

    pub async fn require_dept(&self, id: Option<EntityId>) -> DomainResult<Option<Dept>> {
        let Some(id) = id else {
            return Ok(None);
        };
        match self.depts.find_by_id(id).await? {
            Some(dept) => Ok(Some(dept)),
            None => Err(DomainError::reference_not_found(Dept::TYPE, vec![id])),
        }
    }

    pub async fn roles_of(&self, user: &User) -> DomainResult<Vec<Role>> {
        if user.role_ids.is_empty() {
            return Ok(Vec::new());
        }
        self.roles.find_by_ids(&user.role_ids).await
    }

    pub async fn project(&self, user: &User) -> DomainResult<UserDto> {
        let roles = self.roles_of(user).await?;
        let dept = match user.dept_id {
            Some(id) => self.depts.find_by_id(id).await?,
            None => None,
        };
        Ok(UserDto::assemble(user, roles, dept))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use admin_domain::persist::{InMemoryRepository, Repository};

    async fn resolver() -> RelationResolver {
        let roles = Arc::new(InMemoryRepository::<Role>::new());
        roles.save(Role::new("Admin", "admin", vec![])).await.unwrap();
        roles.save(Role::new("User", "user", vec![])).await.unwrap();
        let depts = Arc::new(InMemoryRepository::<Dept>::new());
        depts.save(Dept::new("R&D")).await.unwrap();
        RelationResolver::new(roles, depts)
    }

    #[tokio::test]
    async fn require_roles_reports_every_missing_id() {
        let r = resolver().await;
        assert_eq!(r.require_roles(&[2, 1, 2]).await.unwrap().len(), 2);

        match r.require_roles(&[1, 9, 8]).await {
            Err(DomainError::ReferenceNotFound { entity, ids }) => {
                assert_eq!(entity, "role");
                assert_eq!(ids, vec![8, 9]);
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[tokio::test]
    async fn require_dept_fails_on_unknown_id() {
        let r = resolver().await;
        assert!(r.require_dept(None).await.unwrap().is_none());
        assert_eq!(r.require_dept(Some(1)).await.unwrap().unwrap().name, "R&D");
        assert!(matches!(
            r.require_dept(Some(5)).await,
            Err(DomainError::ReferenceNotFound { entity: "dept", .. })
        ));
    }
}
