//! 实体（Entity）基础抽象
//!
//! 为存储协作方持有的记录提供统一的标识与唯一键能力。
//! 标识由存储在首次保存时分配，`0` 表示尚未持久化。
//!

/// 实体标识（与关系型存储的自增主键对应）
pub type EntityId = u64;

/// 具备唯一标识的实体抽象
pub trait Entity: Clone + Send + Sync + 'static {
    /// 实体类型名（用于错误信息、日志与事件信封中的 subject_type）
    const TYPE: &'static str;

    /// 获取实体标识
    fn id(&self) -> EntityId;

    /// 由存储在首次保存时回填标识
    fn assign_id(&mut self, id: EntityId);

    /// 是否尚未持久化
    fn is_transient(&self) -> bool {
        self.id() == 0
    }

    /// 自然唯一键（如用户名）。返回 `Some` 时存储层负责保证其唯一性。
    fn natural_key(&self) -> Option<&str> {
        None
    }
}
