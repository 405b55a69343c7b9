//! 事件子系统（eventing）
//!
//! 提供事件发布与处理的基础抽象与进程内运行时：
//! - `EventBus`：发布协议（fire-and-forget，发布方永远观察不到处理失败）；
//! - `EventHandler`：对某类/多类/全部事件进行副作用处理（通知、审计等）；
//! - `EventHandlerRegistry`：启动时一次性构建、此后只读的处理器路由表；
//! - `InMemoryEventBus`：按注册表扇出到处理器，隔离单个处理器的失败。
//!
pub mod bus;
pub mod bus_inmemory;
pub mod handler;
pub mod registry;

pub use bus::EventBus;
pub use bus_inmemory::{DeliveryReport, EventBusConfig, InMemoryEventBus};
pub use handler::{EventHandler, HandledEventType};
pub use registry::{EventHandlerRegistry, EventHandlerRegistryBuilder};
