use admin_application::context::AppContext;
use admin_application::{ApiResponse, AppConfig, telemetry};
use admin_domain::domain_event::BusinessContext;
use admin_domain::persist::{InMemoryRepository, Repository};
use admin_user::controller::{
    CreateUserRequest, CredentialsRequest, ListUsersRequest, UpdateProfileRequest,
};
use admin_user::{Dept, InMemoryUserStore, Role, UserModule};
use serde::Serialize;
use std::sync::Arc;

fn show<T: Serialize>(label: &str, res: ApiResponse<T>) -> anyhow::Result<()> {
    println!("{label}: {}", serde_json::to_string(&res)?);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "demo/config.toml".to_string());
    let config = AppConfig::load(&config_path)?;
    telemetry::init(&config.log);
    tracing::info!(path = %config_path, "configuration loaded");

    let roles = Arc::new(InMemoryRepository::<Role>::new());
    roles
        .save(Role::new(
            "Administrator",
            "admin",
            vec!["system:user:create".into(), "system:user:read".into()],
        ))
        .await?;
    roles
        .save(Role::new("Member", "user", vec!["system:user:read".into()]))
        .await?;
    let depts = Arc::new(InMemoryRepository::<Dept>::new());
    depts.save(Dept::new("Engineering")).await?;

    let users = Arc::new(InMemoryUserStore::new().with_deadline(config.storage.timeout()));
    let module = UserModule::builder()
        .users(users)
        .roles(roles)
        .depts(depts)
        .event_bus_config(config.event_bus_config())
        .build()?;
    let controller = module.controller();

    let ctx = AppContext::new(
        BusinessContext::builder()
            .correlation_id("demo-1".to_string())
            .actor_type("admin".to_string())
            .actor_id("1".to_string())
            .build(),
    );

    let alice = CreateUserRequest {
        username: "alice".into(),
        password: "pw1".into(),
        email: Some("alice@example.com".into()),
        role_ids: vec![1, 2],
        dept_id: Some(1),
        ..Default::default()
    };
    let created = controller.create_user(&ctx, alice.clone()).await;
    let id = created.as_ref().map(|u| u.id.to_string()).unwrap_or_default();
    show("create alice", ApiResponse::from_result(created))?;
    show(
        "create alice again",
        ApiResponse::from_result(controller.create_user(&ctx, alice).await),
    )?;
    show(
        "get by id",
        ApiResponse::from_result(controller.get_user_by_id(&ctx, &id).await),
    )?;
    show(
        "get by bad id",
        ApiResponse::from_result(controller.get_user_by_id(&ctx, "abc").await),
    )?;
    show(
        "update profile",
        ApiResponse::from_result(
            controller
                .update_profile(
                    &ctx,
                    &id,
                    UpdateProfileRequest {
                        nickname: Some("Alice".into()),
                        ..Default::default()
                    },
                )
                .await,
        ),
    )?;
    show(
        "permissions",
        ApiResponse::from_result(controller.permissions(&ctx, &id).await),
    )?;
    show(
        "login",
        ApiResponse::from_result(
            controller
                .validate_credentials(
                    &ctx,
                    CredentialsRequest {
                        username: "alice".into(),
                        password: "pw1".into(),
                    },
                )
                .await,
        ),
    )?;
    show(
        "deactivate",
        ApiResponse::from_result(controller.deactivate_user(&ctx, &id).await),
    )?;
    show(
        "list",
        ApiResponse::from_result(controller.list_users(&ctx, ListUsersRequest::default()).await),
    )?;

    module.drain().await;
    for record in module.audit_trail().records().await {
        println!("audit: {}", serde_json::to_string(&record)?);
    }
    Ok(())
}
