use crate::{
    command::Command, command_bus::CommandBus, command_handler::CommandHandler,
    context::AppContext, error::AppError,
};
use async_trait::async_trait;
use std::any::{Any, TypeId, type_name};
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Instant;
use tracing::Instrument;

type BoxAnySend = Box<dyn Any + Send>;

type CmdHandlerFuture<'a> = Pin<Box<dyn Future<Output = Result<BoxAnySend, AppError>> + Send + 'a>>;

type CmdHandlerFn =
    Arc<dyn for<'a> Fn(BoxAnySend, &'a AppContext) -> CmdHandlerFuture<'a> + Send + Sync>;

/// 基于内存的 CommandBus 实现
/// - 通过 TypeId 注册不同 Command 对应的 Handler，每个命令类型恰好一个
/// - 路由表由 [`InMemoryCommandBusBuilder`] 在启动时构建，`build()` 之后只读
/// - 运行时以类型擦除（Any）方式进行调度，并在调用端还原 `C::Output`
pub struct InMemoryCommandBus {
    handlers: Arc<HashMap<TypeId, (&'static str, CmdHandlerFn)>>,
}

impl InMemoryCommandBus {
    pub fn builder() -> InMemoryCommandBusBuilder {
        InMemoryCommandBusBuilder::default()
    }

    /// 获取已注册的命令名列表（有序只读视图）
    pub fn registered_commands(&self) -> Vec<&'static str> {
        let mut names: Vec<&'static str> = self.handlers.values().map(|(name, _)| *name).collect();
        names.sort_unstable();
        names
    }

    /// 启动校验：给定的命令名必须全部已注册
    pub fn ensure_registered(&self, expected: &[&'static str]) -> Result<(), AppError> {
        let registered = self.registered_commands();
        match expected.iter().copied().find(|name| !registered.contains(name)) {
            Some(missing) => Err(AppError::HandlerNotFound(missing)),
            None => Ok(()),
        }
    }
}

#[derive(Default)]
pub struct InMemoryCommandBusBuilder {
    handlers: HashMap<TypeId, (&'static str, CmdHandlerFn)>,
}

impl InMemoryCommandBusBuilder {
    /// 注册命令处理器；同一命令类型重复注册属于配置错误
    pub fn register<C, H>(&mut self, handler: Arc<H>) -> Result<&mut Self, AppError>
    where
        C: Command,
        H: CommandHandler<C> + 'static,
    {
        let key = TypeId::of::<C>();
        if self.handlers.contains_key(&key) {
            return Err(AppError::AlreadyRegisteredCommand { command: C::NAME });
        }

        let f = erase(move |boxed_cmd, ctx| {
            let handler = handler.clone();

            Box::pin(async move {
                // 正常情况下这里的 downcast 永远不会失败（键与闭包同一泛型 C）
                match boxed_cmd.downcast::<C>() {
                    Ok(cmd) => {
                        let out = handler.handle(ctx, *cmd).await?;
                        Ok(Box::new(out) as BoxAnySend)
                    }
                    Err(_) => Err(AppError::TypeMismatch {
                        expected: C::NAME,
                        found: "unknown",
                    }),
                }
            })
        });

        self.handlers.insert(key, (C::NAME, f));
        Ok(self)
    }

    pub fn build(self) -> InMemoryCommandBus {
        let bus = InMemoryCommandBus {
            handlers: Arc::new(self.handlers),
        };
        tracing::info!(commands = ?bus.registered_commands(), "command bus built");
        bus
    }
}

fn erase<F>(f: F) -> CmdHandlerFn
where
    F: for<'a> Fn(BoxAnySend, &'a AppContext) -> CmdHandlerFuture<'a> + Send + Sync + 'static,
{
    Arc::new(f)
}

#[async_trait]
impl CommandBus for InMemoryCommandBus {
    async fn dispatch<C: Command>(&self, ctx: &AppContext, cmd: C) -> Result<C::Output, AppError> {
        let Some(f) = self.handlers.get(&TypeId::of::<C>()).map(|(_, f)| f.clone()) else {
            tracing::warn!(command = C::NAME, "no handler registered for command");
            return Err(AppError::HandlerNotFound(C::NAME));
        };

        let span = tracing::info_span!(
            "command",
            name = C::NAME,
            correlation_id = ctx.correlation_id().unwrap_or_default()
        );
        let started = Instant::now();
        let out = (f)(Box::new(cmd), ctx).instrument(span).await;
        let elapsed_ms = started.elapsed().as_millis() as u64;

        match out {
            Ok(out) => {
                tracing::debug!(command = C::NAME, elapsed_ms, "command handled");
                out.downcast::<C::Output>()
                    .map(|out| *out)
                    .map_err(|_| AppError::TypeMismatch {
                        expected: type_name::<C::Output>(),
                        found: "unknown",
                    })
            }
            Err(err) => {
                tracing::warn!(command = C::NAME, elapsed_ms, error = %err, "command failed");
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::task::JoinSet;

    #[derive(Debug)]
    struct Bump {
        by: usize,
    }

    impl Command for Bump {
        const NAME: &'static str = "Bump";
        type Output = usize;
    }

    #[derive(Debug)]
    struct Reset;

    impl Command for Reset {
        const NAME: &'static str = "Reset";
        type Output = ();
    }

    struct BumpHandler {
        counter: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl CommandHandler<Bump> for BumpHandler {
        async fn handle(&self, _ctx: &AppContext, cmd: Bump) -> Result<usize, AppError> {
            Ok(self.counter.fetch_add(cmd.by, Ordering::SeqCst) + cmd.by)
        }
    }

    fn bus_with_bump(counter: &Arc<AtomicUsize>) -> InMemoryCommandBus {
        let mut builder = InMemoryCommandBus::builder();
        builder
            .register::<Bump, _>(Arc::new(BumpHandler {
                counter: counter.clone(),
            }))
            .unwrap();
        builder.build()
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn register_and_dispatch_returns_typed_output() {
        let counter = Arc::new(AtomicUsize::new(0));
        let bus = bus_with_bump(&counter);

        let ctx = AppContext::default();
        assert_eq!(bus.dispatch(&ctx, Bump { by: 2 }).await.unwrap(), 2);
        assert_eq!(bus.dispatch(&ctx, Bump { by: 3 }).await.unwrap(), 5);
        assert_eq!(bus.registered_commands(), vec!["Bump"]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn not_found_error_when_unregistered_and_no_side_effect() {
        let counter = Arc::new(AtomicUsize::new(0));
        let bus = bus_with_bump(&counter);

        let ctx = AppContext::default();
        let err = bus.dispatch(&ctx, Reset).await.unwrap_err();
        match err {
            AppError::HandlerNotFound(name) => assert_eq!(name, "Reset"),
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(counter.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn registering_twice_is_rejected() {
        let counter = Arc::new(AtomicUsize::new(0));
        let mut builder = InMemoryCommandBus::builder();
        builder
            .register::<Bump, _>(Arc::new(BumpHandler {
                counter: counter.clone(),
            }))
            .unwrap();

        let err = builder
            .register::<Bump, _>(Arc::new(BumpHandler { counter }))
            .err()
            .unwrap();
        assert!(matches!(
            err,
            AppError::AlreadyRegisteredCommand { command: "Bump" }
        ));
    }

    #[test]
    fn ensure_registered_names_the_missing_command() {
        let counter = Arc::new(AtomicUsize::new(0));
        let bus = bus_with_bump(&counter);

        assert!(bus.ensure_registered(&["Bump"]).is_ok());
        assert!(matches!(
            bus.ensure_registered(&["Bump", "Reset"]),
            Err(AppError::HandlerNotFound("Reset"))
        ));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_dispatch_is_safe() {
        let counter = Arc::new(AtomicUsize::new(0));
        let bus = Arc::new(bus_with_bump(&counter));

        let mut set = JoinSet::new();
        let ctx = AppContext::default();
        for _ in 0..100 {
            let bus = bus.clone();
            let ctx = ctx.clone();
            set.spawn(async move { bus.dispatch(&ctx, Bump { by: 1 }).await.unwrap() });
        }
        let mut results = Vec::new();
        while let Some(res) = set.join_next().await {
            results.push(res.unwrap());
        }
        results.sort_unstable();
        assert_eq!(results.len(), 100);
        assert_eq!(results[0], 1);
        assert_eq!(results[99], 100);
        assert_eq!(counter.load(Ordering::SeqCst), 100);
    }
}
