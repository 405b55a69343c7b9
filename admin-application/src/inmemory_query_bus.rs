use crate::{
    context::AppContext, error::AppError, query::Query, query_bus::QueryBus,
    query_handler::QueryHandler,
};
use async_trait::async_trait;
use std::any::{Any, TypeId, type_name, type_name_of_val};
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use tracing::Instrument;

type BoxAnySend = Box<dyn Any + Send>;

type QueryHandlerFuture<'a> =
    Pin<Box<dyn Future<Output = Result<BoxAnySend, AppError>> + Send + 'a>>;

type QueryHandlerFn =
    Arc<dyn for<'a> Fn(BoxAnySend, &'a AppContext) -> QueryHandlerFuture<'a> + Send + Sync>;

/// 基于内存的 QueryBus 实现
/// - 通过 TypeId 注册不同 Query 对应的 Handler，每个查询类型恰好一个
/// - 路由表由 [`InMemoryQueryBusBuilder`] 在启动时构建，`build()` 之后只读
/// - 以类型擦除方式调度，并在调用端进行结果还原
pub struct InMemoryQueryBus {
    handlers: Arc<HashMap<TypeId, (&'static str, QueryHandlerFn)>>,
}

impl InMemoryQueryBus {
    pub fn builder() -> InMemoryQueryBusBuilder {
        InMemoryQueryBusBuilder::default()
    }

    /// 获取已注册的查询类型名列表（有序只读视图）
    pub fn registered_queries(&self) -> Vec<&'static str> {
        let mut names: Vec<&'static str> = self.handlers.values().map(|(name, _)| *name).collect();
        names.sort_unstable();
        names
    }

    /// 启动校验：给定的查询名必须全部已注册
    pub fn ensure_registered(&self, expected: &[&'static str]) -> Result<(), AppError> {
        let registered = self.registered_queries();
        match expected.iter().copied().find(|name| !registered.contains(name)) {
            Some(missing) => Err(AppError::HandlerNotFound(missing)),
            None => Ok(()),
        }
    }
}

#[derive(Default)]
pub struct InMemoryQueryBusBuilder {
    handlers: HashMap<TypeId, (&'static str, QueryHandlerFn)>,
}

impl InMemoryQueryBusBuilder {
    /// 注册查询处理器
    pub fn register<Q, H>(&mut self, handler: Arc<H>) -> Result<&mut Self, AppError>
    where
        Q: Query,
        H: QueryHandler<Q> + 'static,
    {
        let key = TypeId::of::<Q>();
        if self.handlers.contains_key(&key) {
            return Err(AppError::AlreadyRegisteredQuery { query: Q::NAME });
        }

        let f = erase(move |boxed_q, ctx| {
            let handler = handler.clone();

            Box::pin(async move {
                match boxed_q.downcast::<Q>() {
                    Ok(q) => {
                        let dto = handler.handle(ctx, *q).await?;
                        Ok(Box::new(dto) as BoxAnySend)
                    }
                    Err(e) => Err(AppError::TypeMismatch {
                        expected: type_name::<Q>(),
                        found: type_name_of_val(&e),
                    }),
                }
            })
        });

        self.handlers.insert(key, (Q::NAME, f));
        Ok(self)
    }

    pub fn build(self) -> InMemoryQueryBus {
        let bus = InMemoryQueryBus {
            handlers: Arc::new(self.handlers),
        };
        tracing::info!(queries = ?bus.registered_queries(), "query bus built");
        bus
    }
}

fn erase<F>(f: F) -> QueryHandlerFn
where
    F: for<'a> Fn(BoxAnySend, &'a AppContext) -> QueryHandlerFuture<'a> + Send + Sync + 'static,
{
    Arc::new(f)
}

#[async_trait]
impl QueryBus for InMemoryQueryBus {
    async fn dispatch<Q: Query>(&self, ctx: &AppContext, q: Q) -> Result<Q::Dto, AppError> {
        let Some(f) = self.handlers.get(&TypeId::of::<Q>()).map(|(_, f)| f.clone()) else {
            tracing::warn!(query = Q::NAME, "no handler registered for query");
            return Err(AppError::HandlerNotFound(Q::NAME));
        };

        let span = tracing::debug_span!(
            "query",
            name = Q::NAME,
            correlation_id = ctx.correlation_id().unwrap_or_default()
        );
        let out = (f)(Box::new(q), ctx).instrument(span).await?;

        match out.downcast::<Q::Dto>() {
            Ok(dto) => Ok(*dto),
            Err(e) => Err(AppError::TypeMismatch {
                expected: type_name::<Q::Dto>(),
                found: type_name_of_val(&e),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dto::Dto;
    use serde::Serialize;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::task::JoinSet;

    #[derive(Debug)]
    struct Get;

    #[derive(Debug, Serialize)]
    struct NumDto(pub usize);

    impl Dto for NumDto {}

    impl Query for Get {
        const NAME: &'static str = "Get";
        type Dto = NumDto;
    }

    #[derive(Debug)]
    struct Find {
        id: usize,
    }

    impl Query for Find {
        const NAME: &'static str = "Find";
        type Dto = Option<NumDto>;
    }

    struct GetHandler {
        counter: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl QueryHandler<Get> for GetHandler {
        async fn handle(&self, _ctx: &AppContext, _q: Get) -> Result<NumDto, AppError> {
            let v = self.counter.fetch_add(1, Ordering::SeqCst) + 1;
            Ok(NumDto(v))
        }
    }

    struct FindHandler;

    #[async_trait]
    impl QueryHandler<Find> for FindHandler {
        async fn handle(&self, _ctx: &AppContext, q: Find) -> Result<Option<NumDto>, AppError> {
            Ok((q.id == 1).then_some(NumDto(1)))
        }
    }

    fn bus() -> (InMemoryQueryBus, Arc<AtomicUsize>) {
        let counter = Arc::new(AtomicUsize::new(0));
        let mut builder = InMemoryQueryBus::builder();
        builder
            .register::<Get, _>(Arc::new(GetHandler {
                counter: counter.clone(),
            }))
            .unwrap()
            .register::<Find, _>(Arc::new(FindHandler))
            .unwrap();
        (builder.build(), counter)
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn register_and_dispatch_works() {
        let (bus, _) = bus();
        let ctx = AppContext::default();
        let NumDto(n) = bus.dispatch(&ctx, Get).await.unwrap();
        assert_eq!(n, 1);
        assert_eq!(bus.registered_queries(), vec!["Find", "Get"]);
    }

    #[tokio::test]
    async fn absent_result_is_none_not_error() {
        let (bus, _) = bus();
        let ctx = AppContext::default();
        assert!(bus.dispatch(&ctx, Find { id: 1 }).await.unwrap().is_some());
        assert!(bus.dispatch(&ctx, Find { id: 2 }).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn not_found_error_when_unregistered() {
        let bus = InMemoryQueryBus::builder().build();
        let ctx = AppContext::default();
        let err = bus.dispatch(&ctx, Get).await.unwrap_err();
        match err {
            AppError::HandlerNotFound(name) => assert_eq!(name, "Get"),
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(matches!(
            bus.ensure_registered(&["Get"]),
            Err(AppError::HandlerNotFound("Get"))
        ));
    }

    #[test]
    fn registering_twice_is_rejected() {
        let mut builder = InMemoryQueryBus::builder();
        builder.register::<Find, _>(Arc::new(FindHandler)).unwrap();
        let err = builder
            .register::<Find, _>(Arc::new(FindHandler))
            .err()
            .unwrap();
        assert!(matches!(
            err,
            AppError::AlreadyRegisteredQuery { query: "Find" }
        ));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_dispatch_is_safe() {
        let (bus, _) = bus();
        let bus = Arc::new(bus);

        let mut set = JoinSet::new();
        let ctx = AppContext::default();
        for _ in 0..100 {
            let bus = bus.clone();
            let ctx = ctx.clone();
            set.spawn(async move { bus.dispatch(&ctx, Get).await.unwrap() });
        }
        let mut results = Vec::new();
        while let Some(res) = set.join_next().await {
            results.push(res.unwrap().0);
        }
        results.sort_unstable();
        assert_eq!(results.len(), 100);
        assert_eq!(results[0], 1);
        assert_eq!(results[99], 100);
    }
}
