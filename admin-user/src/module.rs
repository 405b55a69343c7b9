//! 用户模块装配
//!
//! 启动时一次性完成：
//! - 事件处理器注册表与事件总线；
//! - 命令/查询处理器注册（每个类型恰好一个处理器）；
//! - 按 `UserCommandKind` / `UserQueryKind` 校验注册完整性。
//!
//! 构建完成后所有路由表只读，可在任务间通过 `Arc` 共享。

use crate::commands::{
    CreateUser, CreateUserHandler, DeactivateUser, DeactivateUserHandler, UpdateUserPassword,
    UpdateUserPasswordHandler, UpdateUserProfile, UpdateUserProfileHandler, UserCommandKind,
};
use crate::controller::UserController;
use crate::event_handlers::{AuditTrail, UserCreatedLogger};
use crate::password::PasswordHasher;
use crate::projection::RelationResolver;
use crate::queries::{
    GetUserById, GetUserByIdHandler, GetUserByUsername, GetUserByUsernameHandler,
    GetUserPermissions, GetUserPermissionsHandler, GetUsers, GetUsersHandler,
    UserQueryKind, ValidateUserCredentials, ValidateUserCredentialsHandler,
};
use crate::repository::{DeptReader, RoleReader, UserReader, UserRepository};
use admin_application::error::AppError;
use admin_application::{
    InMemoryCommandBus, InMemoryCommandBusBuilder, InMemoryQueryBus, InMemoryQueryBusBuilder,
};
use admin_domain::eventing::{
    EventBus, EventBusConfig, EventHandler, EventHandlerRegistry, InMemoryEventBus,
};
use bon::bon;
use std::sync::Arc;

/// 处理器所需的协作方
#[derive(Clone)]
pub struct UserDeps {
    pub users: Arc<dyn UserRepository>,
    pub readers: Arc<dyn UserReader>,
    pub relations: RelationResolver,
    pub hasher: PasswordHasher,
    pub events: Arc<dyn EventBus>,
}

pub fn register_commands(
    builder: &mut InMemoryCommandBusBuilder,
    deps: &UserDeps,
) -> Result<(), AppError> {
    builder
        .register::<CreateUser, _>(Arc::new(CreateUserHandler::new(
            deps.users.clone(),
            deps.relations.clone(),
            deps.hasher.clone(),
            deps.events.clone(),
        )))?
        .register::<UpdateUserPassword, _>(Arc::new(UpdateUserPasswordHandler::new(
            deps.users.clone(),
            deps.hasher.clone(),
            deps.events.clone(),
        )))?
        .register::<UpdateUserProfile, _>(Arc::new(UpdateUserProfileHandler::new(
            deps.users.clone(),
            deps.relations.clone(),
            deps.events.clone(),
        )))?
        .register::<DeactivateUser, _>(Arc::new(DeactivateUserHandler::new(
            deps.users.clone(),
            deps.events.clone(),
        )))?;
    Ok(())
}

pub fn register_queries(
    builder: &mut InMemoryQueryBusBuilder,
    deps: &UserDeps,
) -> Result<(), AppError> {
    builder
        .register::<GetUserById, _>(Arc::new(GetUserByIdHandler::new(
            deps.readers.clone(),
            deps.relations.clone(),
        )))?
        .register::<GetUserByUsername, _>(Arc::new(GetUserByUsernameHandler::new(
            deps.readers.clone(),
            deps.relations.clone(),
        )))?
        .register::<GetUsers, _>(Arc::new(GetUsersHandler::new(
            deps.readers.clone(),
            deps.relations.clone(),
        )))?
        .register::<GetUserPermissions, _>(Arc::new(GetUserPermissionsHandler::new(
            deps.readers.clone(),
            deps.relations.clone(),
        )))?
        .register::<ValidateUserCredentials, _>(Arc::new(ValidateUserCredentialsHandler::new(
            deps.readers.clone(),
            deps.relations.clone(),
            deps.hasher.clone(),
        )))?;
    Ok(())
}

/// 启动校验：本模块的每个命令与查询都必须已注册
pub fn verify(commands: &InMemoryCommandBus, queries: &InMemoryQueryBus) -> Result<(), AppError> {
    commands.ensure_registered(&UserCommandKind::names())?;
    queries.ensure_registered(&UserQueryKind::names())?;
    Ok(())
}

pub struct UserModule {
    command_bus: Arc<InMemoryCommandBus>,
    query_bus: Arc<InMemoryQueryBus>,
    event_bus: Arc<InMemoryEventBus>,
    audit: Arc<AuditTrail>,
}

#[bon]
impl UserModule {
    /// 装配用户模块；`extra_handlers` 追加在内置事件处理器之后
    #[builder]
    pub fn new<U>(
        users: Arc<U>,
        roles: Arc<RoleReader>,
        depts: Arc<DeptReader>,
        #[builder(default)] event_bus_config: EventBusConfig,
        #[builder(default)] extra_handlers: Vec<Arc<dyn EventHandler>>,
    ) -> Result<Self, AppError>
    where
        U: UserRepository + 'static,
    {
        let audit = Arc::new(AuditTrail::new());
        let registry = EventHandlerRegistry::builder()
            .handler(Arc::new(UserCreatedLogger))
            .handler(audit.clone())
            .handlers(extra_handlers)
            .build()?;
        let event_bus = Arc::new(InMemoryEventBus::new(registry, event_bus_config));

        let deps = UserDeps {
            users: users.clone(),
            readers: users,
            relations: RelationResolver::new(roles, depts),
            hasher: PasswordHasher::new(),
            events: event_bus.clone(),
        };

        let mut commands = InMemoryCommandBus::builder();
        register_commands(&mut commands, &deps)?;
        let mut queries = InMemoryQueryBus::builder();
        register_queries(&mut queries, &deps)?;

        let command_bus = commands.build();
        let query_bus = queries.build();
        verify(&command_bus, &query_bus)?;

        tracing::info!(
            commands = UserCommandKind::ALL.len(),
            queries = UserQueryKind::ALL.len(),
            event_types = ?event_bus.registry().subscribed_event_types(),
            "user module ready"
        );

        Ok(Self {
            command_bus: Arc::new(command_bus),
            query_bus: Arc::new(query_bus),
            event_bus,
            audit,
        })
    }

    pub fn controller(&self) -> UserController {
        UserController::new(self.command_bus.clone(), self.query_bus.clone())
    }

    pub fn command_bus(&self) -> &Arc<InMemoryCommandBus> {
        &self.command_bus
    }

    pub fn query_bus(&self) -> &Arc<InMemoryQueryBus> {
        &self.query_bus
    }

    pub fn event_bus(&self) -> &Arc<InMemoryEventBus> {
        &self.event_bus
    }

    pub fn audit_trail(&self) -> &Arc<AuditTrail> {
        &self.audit
    }

    /// 等待所有在途事件投递完成
    pub async fn drain(&self) {
        self.event_bus.drain().await;
    }
}
