//! 用户聚合（admin-user）
//!
//! 在应用层的命令/查询总线与领域层的事件总线之上实现用户模块：
//! - 命令：新建用户、修改口令、修改资料、停用用户；
//! - 查询：按标识/用户名点查、分页列表、权限码、凭据校验；
//! - 事件：`UserEvent` 及其处理器（创建日志、审计轨迹）；
//! - `UserController` 与启动装配 `UserModule`。
//!
pub mod commands;
pub mod controller;
pub mod event_handlers;
pub mod events;
pub mod model;
pub mod module;
pub mod password;
pub mod projection;
pub mod queries;
pub mod repository;
pub mod value_objects;

pub use controller::UserController;
pub use events::UserEvent;
pub use model::{Dept, Role, User, UserDto, UserStatus};
pub use module::UserModule;
pub use repository::{InMemoryUserStore, UserReader, UserRepository};
