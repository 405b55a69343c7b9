use admin_domain::error::{DomainError, DomainResult};
use std::future::Future;
use std::time::Duration;

/// 为一次存储调用设置时限；超时视为存储不可用。
///
/// `deadline` 为 `None` 时直接等待调用完成。
pub async fn with_deadline<T, F>(deadline: Option<Duration>, call: F) -> DomainResult<T>
where
    F: Future<Output = DomainResult<T>>,
{
    let Some(limit) = deadline else {
        return call.await;
    };

    match tokio::time::timeout(limit, call).await {
        Ok(res) => res,
        Err(_) => {
            tracing::warn!(timeout_ms = limit.as_millis() as u64, "storage call timed out");
            Err(DomainError::storage_unavailable(format!(
                "storage call exceeded {}ms",
                limit.as_millis()
            )))
        }
    }
}
