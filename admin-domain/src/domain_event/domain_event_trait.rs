use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fmt;

use crate::entity::EntityId;

/// 领域事件载荷需要满足的通用能力边界
///
/// 通常以封闭枚举实现，每个变体对应一个事实（如 `UserEvent::Created`），
/// 使 `event_type` 的 `match` 由编译器检查穷尽性。
pub trait DomainEvent:
    Clone + PartialEq + fmt::Debug + Serialize + DeserializeOwned + Send + Sync + 'static
{
    /// 事件主体类型（如 `user`）
    const SUBJECT_TYPE: &'static str;

    /// 事件类型（形如 `UserEvent.Created`），用于处理器订阅与路由
    fn event_type(&self) -> &'static str;

    /// 事件主体标识
    fn subject_id(&self) -> EntityId;

    /// 事件载荷版本
    fn event_version(&self) -> usize {
        1
    }
}
