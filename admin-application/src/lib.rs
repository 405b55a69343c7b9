//! 管理后台应用层（admin-application）
//!
//! 提供进程内 CQRS 分发核心：
//! - `Command` / `Query` 及其处理器协议；
//! - `InMemoryCommandBus` / `InMemoryQueryBus`：按具体类型路由到唯一处理器，启动时构建、此后只读；
//! - `AppContext`：随调用流转的业务上下文；
//! - 应用配置、日志初始化与控制器响应映射。
//!
pub mod command;
pub mod command_bus;
pub mod command_handler;
pub mod config;
pub mod context;
pub mod deadline;
pub mod dto;
pub mod error;
pub mod inmemory_command_bus;
pub mod inmemory_query_bus;
pub mod query;
pub mod query_bus;
pub mod query_handler;
pub mod response;
pub mod telemetry;

pub use config::AppConfig;
pub use context::AppContext;
pub use error::AppError;
pub use inmemory_command_bus::{InMemoryCommandBus, InMemoryCommandBusBuilder};
pub use inmemory_query_bus::{InMemoryQueryBus, InMemoryQueryBusBuilder};
pub use response::ApiResponse;
