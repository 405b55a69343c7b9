//! 进程内事件总线（InMemoryEventBus）
//!
//! 按 [`EventHandlerRegistry`] 把事件扇出到匹配的处理器：
//! - `publish`：在受 `TaskTracker` 跟踪的后台任务中投递，调用方无需等待处理器完成；
//! - 同一事件的处理器默认按注册顺序串行执行（`handler_concurrency = 1`），
//!   调大并发度后处理器之间不再保证顺序；
//! - 单个处理器返回错误、panic 或超时只记录日志，其余处理器照常执行，
//!   失败不会传播回发布方；
//! - `drain`：等待所有在途投递完成（关闭与测试时使用），并发调用按先后串行。
//!
//! 注意：没有重试与持久化，进程退出前未 `drain` 的投递会丢失。

use super::{EventBus, EventHandler, EventHandlerRegistry};
use crate::domain_event::EventEnvelope;
use async_trait::async_trait;
use bon::Builder;
use futures_util::{FutureExt, StreamExt, stream};
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time;
use tokio_util::task::TaskTracker;

/// 事件总线配置
#[derive(Clone, Copy, Debug, Builder)]
pub struct EventBusConfig {
    /// 单事件的处理并发（同一事件广播给多个 handler）；为 1 时按注册顺序串行
    #[builder(default = 1)]
    pub handler_concurrency: usize,
    /// 单个处理器的执行时限
    #[builder(default = Duration::from_secs(30))]
    pub handler_timeout: Duration,
}

impl Default for EventBusConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// 一次投递的结果统计
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DeliveryReport {
    pub matched: usize,
    pub succeeded: usize,
    pub failed: usize,
}

pub struct InMemoryEventBus {
    registry: Arc<EventHandlerRegistry>,
    config: EventBusConfig,
    tracker: TaskTracker,
    // close/wait/reopen 必须成组执行，否则先完成者的 reopen 会让其他等待者挂起
    draining: Mutex<()>,
}

impl InMemoryEventBus {
    pub fn new(registry: EventHandlerRegistry, config: EventBusConfig) -> Self {
        Self {
            registry: Arc::new(registry),
            config,
            tracker: TaskTracker::new(),
            draining: Mutex::new(()),
        }
    }

    pub fn registry(&self) -> &EventHandlerRegistry {
        &self.registry
    }

    pub fn config(&self) -> EventBusConfig {
        self.config
    }

    /// 在当前任务内完成一次投递并返回统计
    pub async fn deliver(&self, event: &EventEnvelope) -> DeliveryReport {
        let handlers = self.registry.matching(event.event_type());
        deliver_to(handlers, event, self.config).await
    }

    /// 等待所有在途投递完成
    pub async fn drain(&self) {
        let _guard = self.draining.lock().await;
        self.tracker.close();
        self.tracker.wait().await;
        self.tracker.reopen();
    }

    /// 在途投递任务数
    pub fn in_flight(&self) -> usize {
        self.tracker.len()
    }
}

#[async_trait]
impl EventBus for InMemoryEventBus {
    async fn publish(&self, event: EventEnvelope) {
        let handlers = self.registry.matching(event.event_type());
        if handlers.is_empty() {
            tracing::debug!(
                event_type = event.event_type(),
                event_id = %event.event_id(),
                "no event handler subscribed"
            );
            return;
        }

        let config = self.config;
        self.tracker.spawn(async move {
            deliver_to(handlers, &event, config).await;
        });
    }
}

async fn deliver_to(
    handlers: Vec<Arc<dyn EventHandler>>,
    event: &EventEnvelope,
    config: EventBusConfig,
) -> DeliveryReport {
    let matched = handlers.len();
    let concurrency = config.handler_concurrency.max(1);

    let runs: Vec<_> = handlers
        .into_iter()
        .map(|h| run_handler(h, event, config.handler_timeout))
        .collect();
    let succeeded = stream::iter(runs)
        .buffer_unordered(concurrency)
        .fold(0usize, |acc, ok| async move { acc + usize::from(ok) })
        .await;

    let report = DeliveryReport {
        matched,
        succeeded,
        failed: matched - succeeded,
    };
    tracing::debug!(
        event_type = event.event_type(),
        event_id = %event.event_id(),
        matched = report.matched,
        failed = report.failed,
        "event delivered"
    );
    report
}

async fn run_handler(
    handler: Arc<dyn EventHandler>,
    event: &EventEnvelope,
    timeout: Duration,
) -> bool {
    let guarded = AssertUnwindSafe(handler.handle(event)).catch_unwind();

    match time::timeout(timeout, guarded).await {
        Ok(Ok(Ok(()))) => true,
        Ok(Ok(Err(err))) => {
            tracing::error!(
                handler = handler.handler_name(),
                event_type = event.event_type(),
                event_id = %event.event_id(),
                error = %err,
                "event handler failed"
            );
            false
        }
        Ok(Err(panic)) => {
            let reason = panic
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| panic.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic payload".to_string());
            tracing::error!(
                handler = handler.handler_name(),
                event_type = event.event_type(),
                event_id = %event.event_id(),
                reason = %reason,
                "event handler panicked"
            );
            false
        }
        Err(_) => {
            tracing::error!(
                handler = handler.handler_name(),
                event_type = event.event_type(),
                event_id = %event.event_id(),
                timeout_ms = timeout.as_millis() as u64,
                "event handler timed out"
            );
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eventing::HandledEventType;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::Notify;

    #[derive(Clone, Copy)]
    enum Behaviour {
        Ok,
        Fail,
        Panic,
        Sleep(Duration),
    }

    struct SpyHandler {
        name: &'static str,
        types: HandledEventType,
        behaviour: Behaviour,
        log: Arc<Mutex<Vec<&'static str>>>,
    }

    #[async_trait]
    impl EventHandler for SpyHandler {
        fn handler_name(&self) -> &str {
            self.name
        }
        fn handled_event_type(&self) -> HandledEventType {
            self.types.clone()
        }
        async fn handle(&self, _event: &EventEnvelope) -> anyhow::Result<()> {
            match self.behaviour {
                Behaviour::Ok => {}
                Behaviour::Fail => anyhow::bail!("fail requested"),
                Behaviour::Panic => panic!("boom"),
                Behaviour::Sleep(d) => time::sleep(d).await,
            }
            self.log.lock().unwrap().push(self.name);
            Ok(())
        }
    }

    fn spy(
        name: &'static str,
        behaviour: Behaviour,
        log: &Arc<Mutex<Vec<&'static str>>>,
    ) -> Arc<dyn EventHandler> {
        Arc::new(SpyHandler {
            name,
            types: HandledEventType::One("Demo.Happened".into()),
            behaviour,
            log: log.clone(),
        })
    }

    fn mk_event(ty: &str) -> EventEnvelope {
        EventEnvelope::builder()
            .event_type(ty.to_string())
            .subject_type("demo".to_string())
            .subject_id(1)
            .payload(serde_json::json!({"id": 1}))
            .build()
    }

    #[tokio::test]
    async fn handlers_run_in_registration_order_by_default() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let registry = EventHandlerRegistry::builder()
            .handler(spy("first", Behaviour::Sleep(Duration::from_millis(30)), &log))
            .handler(spy("second", Behaviour::Ok, &log))
            .handler(spy("third", Behaviour::Ok, &log))
            .build()
            .unwrap();
        let bus = InMemoryEventBus::new(registry, EventBusConfig::default());

        let report = bus.deliver(&mk_event("Demo.Happened")).await;

        assert_eq!(
            report,
            DeliveryReport {
                matched: 3,
                succeeded: 3,
                failed: 0
            }
        );
        assert_eq!(*log.lock().unwrap(), vec!["first", "second", "third"]);
    }

    #[tokio::test]
    async fn failing_and_panicking_handlers_do_not_stop_siblings() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let registry = EventHandlerRegistry::builder()
            .handler(spy("fails", Behaviour::Fail, &log))
            .handler(spy("panics", Behaviour::Panic, &log))
            .handler(spy("survivor", Behaviour::Ok, &log))
            .build()
            .unwrap();
        let bus = InMemoryEventBus::new(registry, EventBusConfig::default());

        let report = bus.deliver(&mk_event("Demo.Happened")).await;

        assert_eq!(report.matched, 3);
        assert_eq!(report.failed, 2);
        assert_eq!(*log.lock().unwrap(), vec!["survivor"]);
    }

    #[tokio::test]
    async fn slow_handler_is_cut_off_by_timeout() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let registry = EventHandlerRegistry::builder()
            .handler(spy("slow", Behaviour::Sleep(Duration::from_secs(5)), &log))
            .handler(spy("fast", Behaviour::Ok, &log))
            .build()
            .unwrap();
        let config = EventBusConfig::builder()
            .handler_timeout(Duration::from_millis(20))
            .build();
        let bus = InMemoryEventBus::new(registry, config);

        let report = bus.deliver(&mk_event("Demo.Happened")).await;

        assert_eq!(report.failed, 1);
        assert_eq!(*log.lock().unwrap(), vec!["fast"]);
    }

    #[tokio::test]
    async fn unmatched_event_is_a_no_op() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let registry = EventHandlerRegistry::builder()
            .handler(spy("only", Behaviour::Ok, &log))
            .build()
            .unwrap();
        let bus = InMemoryEventBus::new(registry, EventBusConfig::default());

        bus.publish(mk_event("Other.Happened")).await;
        bus.drain().await;

        assert_eq!(bus.deliver(&mk_event("Other.Happened")).await.matched, 0);
        assert!(log.lock().unwrap().is_empty());
    }

    struct Gate {
        open: Arc<Notify>,
        handled: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl EventHandler for Gate {
        fn handler_name(&self) -> &str {
            "gate"
        }
        fn handled_event_type(&self) -> HandledEventType {
            HandledEventType::All
        }
        async fn handle(&self, _event: &EventEnvelope) -> anyhow::Result<()> {
            self.open.notified().await;
            self.handled.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn publish_returns_before_handlers_complete() {
        let open = Arc::new(Notify::new());
        let handled = Arc::new(AtomicUsize::new(0));
        let registry = EventHandlerRegistry::builder()
            .handler(Arc::new(Gate {
                open: open.clone(),
                handled: handled.clone(),
            }))
            .build()
            .unwrap();
        let bus = InMemoryEventBus::new(registry, EventBusConfig::default());

        bus.publish(mk_event("Anything")).await;
        assert_eq!(handled.load(Ordering::SeqCst), 0);
        assert_eq!(bus.in_flight(), 1);

        open.notify_one();
        bus.drain().await;

        assert_eq!(handled.load(Ordering::SeqCst), 1);
        assert_eq!(bus.in_flight(), 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn overlapping_drains_all_return() {
        let open = Arc::new(Notify::new());
        let handled = Arc::new(AtomicUsize::new(0));
        let registry = EventHandlerRegistry::builder()
            .handler(Arc::new(Gate {
                open: open.clone(),
                handled: handled.clone(),
            }))
            .build()
            .unwrap();
        let bus = Arc::new(InMemoryEventBus::new(registry, EventBusConfig::default()));

        bus.publish(mk_event("Anything")).await;
        let drains: Vec<_> = (0..4)
            .map(|_| {
                let bus = bus.clone();
                tokio::spawn(async move { bus.drain().await })
            })
            .collect();
        tokio::task::yield_now().await;
        open.notify_one();

        for drain in drains {
            time::timeout(Duration::from_secs(5), drain)
                .await
                .expect("drain should not hang")
                .unwrap();
        }
        assert_eq!(handled.load(Ordering::SeqCst), 1);

        // 之后的发布仍被跟踪
        bus.publish(mk_event("Anything")).await;
        open.notify_one();
        bus.drain().await;
        assert_eq!(handled.load(Ordering::SeqCst), 2);
    }
}
