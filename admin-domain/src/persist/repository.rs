use crate::entity::{Entity, EntityId};
use crate::error::DomainResult;
use async_trait::async_trait;
use std::sync::Arc;

/// 只读访问：查询处理器只持有该 trait，因而在类型上无法修改状态
#[async_trait]
pub trait EntityReader<E>: Send + Sync
where
    E: Entity,
{
    async fn find_by_id(&self, id: EntityId) -> DomainResult<Option<E>>;

    /// 返回能找到的记录（按标识升序），找不到的标识直接缺席
    async fn find_by_ids(&self, ids: &[EntityId]) -> DomainResult<Vec<E>>;

    /// 按自然唯一键查找
    async fn find_by_key(&self, key: &str) -> DomainResult<Option<E>>;

    /// 全量读取（按标识升序）
    async fn find_all(&self) -> DomainResult<Vec<E>>;
}

/// 读写访问：单记录原子写入
#[async_trait]
pub trait Repository<E>: EntityReader<E>
where
    E: Entity,
{
    /// 新建（`is_transient`）或更新一条记录，返回持久化后的实体。
    /// 自然键冲突时返回 `DomainError::DuplicateEntity`。
    async fn save(&self, entity: E) -> DomainResult<E>;
}

#[async_trait]
impl<E, T> EntityReader<E> for Arc<T>
where
    E: Entity,
    T: EntityReader<E> + ?Sized,
{
    async fn find_by_id(&self, id: EntityId) -> DomainResult<Option<E>> {
        (**self).find_by_id(id).await
    }

    async fn find_by_ids(&self, ids: &[EntityId]) -> DomainResult<Vec<E>> {
        (**self).find_by_ids(ids).await
    }

    async fn find_by_key(&self, key: &str) -> DomainResult<Option<E>> {
        (**self).find_by_key(key).await
    }

    async fn find_all(&self) -> DomainResult<Vec<E>> {
        (**self).find_all().await
    }
}

#[async_trait]
impl<E, T> Repository<E> for Arc<T>
where
    E: Entity,
    T: Repository<E> + ?Sized,
{
    async fn save(&self, entity: E) -> DomainResult<E> {
        (**self).save(entity).await
    }
}
