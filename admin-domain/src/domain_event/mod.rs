//! 领域事件（Domain Event）与事件信封
//!
//! 定义事件载荷需要实现的最小接口（`DomainEvent`），以及将事件与主体信息、
//! 业务上下文封装后的 `EventEnvelope`。

mod business_context;
mod domain_event_trait;
mod event_envelope;
mod field_changed;

pub use business_context::BusinessContext;
pub use domain_event_trait::DomainEvent;
pub use event_envelope::EventEnvelope;
pub use field_changed::FieldChanged;
