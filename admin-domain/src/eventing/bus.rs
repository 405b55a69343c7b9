//! 事件总线（EventBus）协议
//!
//! 命令处理器在写入成功后调用 `publish`。发布是 fire-and-forget 的：
//! 处理器的失败不会回传给发布方，也不会影响触发事件的命令结果。
//!
use crate::domain_event::EventEnvelope;
use async_trait::async_trait;
use std::sync::Arc;

/// 事件总线：负责把事件分发给已订阅的处理器
#[async_trait]
pub trait EventBus: Send + Sync {
    async fn publish(&self, event: EventEnvelope);
}

#[async_trait]
impl<T> EventBus for Arc<T>
where
    T: EventBus + ?Sized,
{
    async fn publish(&self, event: EventEnvelope) {
        (**self).publish(event).await
    }
}
