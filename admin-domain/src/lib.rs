//! 管理后台领域层基础库（admin-domain）
//!
//! 提供 CQRS 分发核心所依赖的领域构件：
//! - 实体（`entity`）与值对象（`value_object`）建模
//! - 领域事件（`domain_event`）与事件信封
//! - 事件系统（`eventing`）：发布协议、处理器注册表与进程内事件总线
//! - 存储协作方协议（`persist`）及其内存实现
//!
//! 本 crate 不绑定任何具体存储或传输实现，仅定义领域层接口与最小必要的错误类型，
//! 具体的关系型存储、HTTP 层由上层提供并注入。
//!
//! 典型用法：
//! 1. 定义实体并实现 `Entity`，定义事件枚举并实现 `DomainEvent`；
//! 2. 通过 `persist::Repository` 访问存储协作方；
//! 3. 启动时用 `EventHandlerRegistry::builder()` 注册事件处理器并构建 `InMemoryEventBus`；
//! 4. 命令处理器在写入成功后以 `EventEnvelope` 发布事件。
//!
pub mod domain_event;
pub mod entity;
pub mod error;
#[cfg(feature = "eventing")]
pub mod eventing;
pub mod persist;
pub mod value_object;
