//! 内存版存储（InMemoryRepository）
//!
//! 基于 `DashMap` 的线程安全实现，满足 `EntityReader`/`Repository` 协议：
//! - 标识由自增序列分配（从 1 开始）；
//! - 自然键唯一约束在存储层以 `entry` 原子占位，是并发创建下的最终防线；
//! - `update_with` 在持有行锁期间完成“读取-修改-写回”，只改动闭包触及的列；
//! - `set_available(false)` 模拟存储不可用，所有调用返回 `StorageUnavailable`。
//!
//! 典型用途：测试环境、示例与本地开发。

use super::{EntityReader, Repository};
use crate::entity::{Entity, EntityId};
use crate::error::{DomainError, DomainResult};
use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

pub struct InMemoryRepository<E>
where
    E: Entity,
{
    rows: DashMap<EntityId, E>,
    unique_keys: DashMap<String, EntityId>,
    seq: AtomicU64,
    available: AtomicBool,
}

impl<E> Default for InMemoryRepository<E>
where
    E: Entity,
{
    fn default() -> Self {
        Self {
            rows: DashMap::new(),
            unique_keys: DashMap::new(),
            seq: AtomicU64::new(0),
            available: AtomicBool::new(true),
        }
    }
}

impl<E> InMemoryRepository<E>
where
    E: Entity,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// 切换存储可用性
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// 原子地修改一条已存在的记录并返回修改后的值。
    /// 闭包不得改动自然键，否则返回 `DomainError::InvalidCommand` 且记录保持原样。
    pub fn update_with(&self, id: EntityId, f: impl FnOnce(&mut E)) -> DomainResult<E> {
        self.ensure_available()?;
        let Some(mut row) = self.rows.get_mut(&id) else {
            return Err(DomainError::not_found(format!("{} id={id}", E::TYPE)));
        };

        let mut next = row.value().clone();
        f(&mut next);
        if next.id() != id || next.natural_key() != row.natural_key() {
            return Err(DomainError::invalid_command(format!(
                "{} id={id}: identity and natural key cannot change in place",
                E::TYPE
            )));
        }
        *row.value_mut() = next.clone();
        Ok(next)
    }

    fn ensure_available(&self) -> DomainResult<()> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(DomainError::storage_unavailable(format!(
                "{} store is offline",
                E::TYPE
            )))
        }
    }

    fn claim_key(&self, key: &str, id: EntityId) -> DomainResult<()> {
        match self.unique_keys.entry(key.to_string()) {
            Entry::Occupied(o) if *o.get() != id => Err(DomainError::duplicate(E::TYPE, key)),
            Entry::Occupied(_) => Ok(()),
            Entry::Vacant(v) => {
                v.insert(id);
                Ok(())
            }
        }
    }

    fn insert(&self, mut entity: E) -> DomainResult<E> {
        let id = self.seq.fetch_add(1, Ordering::SeqCst) + 1;
        if let Some(key) = entity.natural_key() {
            self.claim_key(key, id)?;
        }
        entity.assign_id(id);
        self.rows.insert(id, entity.clone());
        Ok(entity)
    }

    fn update(&self, entity: E) -> DomainResult<E> {
        let id = entity.id();
        let old_key = match self.rows.get(&id) {
            Some(row) => row.natural_key().map(str::to_string),
            None => {
                return Err(DomainError::not_found(format!("{} id={id}", E::TYPE)));
            }
        };

        let new_key = entity.natural_key().map(str::to_string);
        if new_key != old_key {
            if let Some(key) = &new_key {
                self.claim_key(key, id)?;
            }
            if let Some(key) = &old_key {
                self.unique_keys.remove(key);
            }
        }

        self.rows.insert(id, entity.clone());
        Ok(entity)
    }
}

#[async_trait]
impl<E> EntityReader<E> for InMemoryRepository<E>
where
    E: Entity,
{
    async fn find_by_id(&self, id: EntityId) -> DomainResult<Option<E>> {
        self.ensure_available()?;
        Ok(self.rows.get(&id).map(|row| row.value().clone()))
    }

    async fn find_by_ids(&self, ids: &[EntityId]) -> DomainResult<Vec<E>> {
        self.ensure_available()?;
        let mut found: Vec<E> = ids
            .iter()
            .filter_map(|id| self.rows.get(id).map(|row| row.value().clone()))
            .collect();
        found.sort_by_key(|e| e.id());
        found.dedup_by_key(|e| e.id());
        Ok(found)
    }

    async fn find_by_key(&self, key: &str) -> DomainResult<Option<E>> {
        self.ensure_available()?;
        let Some(id) = self.unique_keys.get(key).map(|r| *r.value()) else {
            return Ok(None);
        };
        Ok(self.rows.get(&id).map(|row| row.value().clone()))
    }

    async fn find_all(&self) -> DomainResult<Vec<E>> {
        self.ensure_available()?;
        let mut all: Vec<E> = self.rows.iter().map(|row| row.value().clone()).collect();
        all.sort_by_key(|e| e.id());
        Ok(all)
    }
}

#[async_trait]
impl<E> Repository<E> for InMemoryRepository<E>
where
    E: Entity,
{
    async fn save(&self, entity: E) -> DomainResult<E> {
        self.ensure_available()?;
        if entity.is_transient() {
            self.insert(entity)
        } else {
            self.update(entity)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tokio::task::JoinSet;

    #[derive(Debug, Clone, PartialEq)]
    struct Tag {
        id: EntityId,
        slug: String,
    }

    impl Tag {
        fn new(slug: &str) -> Self {
            Self {
                id: 0,
                slug: slug.to_string(),
            }
        }
    }

    impl Entity for Tag {
        const TYPE: &'static str = "tag";

        fn id(&self) -> EntityId {
            self.id
        }

        fn assign_id(&mut self, id: EntityId) {
            self.id = id;
        }

        fn natural_key(&self) -> Option<&str> {
            Some(&self.slug)
        }
    }

    #[tokio::test]
    async fn save_assigns_ids_and_finds_by_key() {
        let repo = InMemoryRepository::<Tag>::new();
        let a = repo.save(Tag::new("a")).await.unwrap();
        let b = repo.save(Tag::new("b")).await.unwrap();

        assert_eq!((a.id, b.id), (1, 2));
        assert_eq!(repo.find_by_key("b").await.unwrap(), Some(b.clone()));
        assert_eq!(repo.find_by_id(1).await.unwrap(), Some(a));
        assert_eq!(repo.find_by_key("zzz").await.unwrap(), None);
    }

    #[tokio::test]
    async fn duplicate_key_is_rejected_without_writing() {
        let repo = InMemoryRepository::<Tag>::new();
        repo.save(Tag::new("a")).await.unwrap();

        let err = repo.save(Tag::new("a")).await.unwrap_err();

        assert!(matches!(err, DomainError::DuplicateEntity { entity: "tag", .. }));
        assert_eq!(repo.len(), 1);
    }

    #[tokio::test]
    async fn update_moves_unique_key() {
        let repo = InMemoryRepository::<Tag>::new();
        let mut a = repo.save(Tag::new("a")).await.unwrap();
        repo.save(Tag::new("b")).await.unwrap();

        a.slug = "b".into();
        assert!(repo.save(a.clone()).await.is_err());

        a.slug = "c".into();
        repo.save(a.clone()).await.unwrap();
        assert_eq!(repo.find_by_key("c").await.unwrap(), Some(a));
        assert_eq!(repo.find_by_key("a").await.unwrap(), None);
        assert_eq!(repo.len(), 2);
    }

    #[tokio::test]
    async fn update_of_unknown_id_is_not_found() {
        let repo = InMemoryRepository::<Tag>::new();
        let ghost = Tag {
            id: 42,
            slug: "ghost".into(),
        };
        assert!(matches!(
            repo.save(ghost).await,
            Err(DomainError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn find_by_ids_skips_missing_and_sorts() {
        let repo = InMemoryRepository::<Tag>::new();
        for slug in ["a", "b", "c"] {
            repo.save(Tag::new(slug)).await.unwrap();
        }

        let found = repo.find_by_ids(&[3, 99, 1, 3]).await.unwrap();
        let ids: Vec<EntityId> = found.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![1, 3]);
    }

    #[tokio::test]
    async fn offline_store_reports_unavailable() {
        let repo = InMemoryRepository::<Tag>::new();
        repo.set_available(false);

        assert!(matches!(
            repo.find_by_id(1).await,
            Err(DomainError::StorageUnavailable { .. })
        ));
        assert!(matches!(
            repo.save(Tag::new("a")).await,
            Err(DomainError::StorageUnavailable { .. })
        ));

        repo.set_available(true);
        assert!(repo.save(Tag::new("a")).await.is_ok());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_saves_of_same_key_admit_exactly_one() {
        let repo = Arc::new(InMemoryRepository::<Tag>::new());
        let mut set = JoinSet::new();
        for _ in 0..32 {
            let repo = repo.clone();
            set.spawn(async move { repo.save(Tag::new("same")).await.is_ok() });
        }

        let mut ok = 0;
        while let Some(res) = set.join_next().await {
            if res.unwrap() {
                ok += 1;
            }
        }
        assert_eq!(ok, 1);
        assert_eq!(repo.len(), 1);
    }

    #[tokio::test]
    async fn update_with_keeps_untouched_fields_and_key() {
        let repo = InMemoryRepository::<Tag>::new();
        let saved = repo.save(Tag::new("a")).await.unwrap();

        let same = repo.update_with(saved.id, |_| {}).unwrap();
        assert_eq!(same, saved);

        assert!(matches!(
            repo.update_with(saved.id, |t| t.slug = "b".into()),
            Err(DomainError::InvalidCommand { .. })
        ));
        assert_eq!(repo.find_by_key("a").await.unwrap(), Some(saved));
        assert!(matches!(
            repo.update_with(42, |_| {}),
            Err(DomainError::NotFound { .. })
        ));
    }
}
