use admin_domain::domain_event::BusinessContext;
use bon::Builder;

/// 应用层上下文（Application Context）
///
/// 承载一次应用层调用（命令/查询）所需的横切信息：业务语境（`BusinessContext`）
/// 包含关联追踪 `correlation_id`、因果链 `causation_id` 与执行者类型/ID，
/// 命令处理器会将其复制进发布的事件信封。
///
/// 典型用法：
/// ```rust
/// use admin_application::context::AppContext;
/// use admin_domain::domain_event::BusinessContext;
///
/// let ctx = AppContext {
///     biz: BusinessContext::builder()
///         .maybe_correlation_id(Some("cor-123".into()))
///         .maybe_actor_type(Some("user".into()))
///         .maybe_actor_id(Some("u-1".into()))
///         .build(),
/// };
/// assert_eq!(ctx.correlation_id(), Some("cor-123"));
/// ```
#[derive(Clone, Debug, Default, Builder)]
pub struct AppContext {
    /// 业务语境（链路追踪、审计主体、操作因果）
    #[builder(default)]
    pub biz: BusinessContext,
}

impl AppContext {
    pub fn new(biz: BusinessContext) -> Self {
        Self { biz }
    }

    pub fn correlation_id(&self) -> Option<&str> {
        self.biz.correlation_id()
    }
}
