//! 日志初始化
//!
//! `RUST_LOG` 存在时优先生效，否则使用配置中的 `log.level`。

use crate::config::LogConfig;
use tracing_subscriber::EnvFilter;

/// 初始化全局 tracing 订阅者。
///
/// 可重复调用：只有第一次会安装订阅者，返回值表示本次是否安装成功。
pub fn init(config: &LogConfig) -> bool {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);

    let installed = if config.json {
        builder.json().try_init().is_ok()
    } else {
        builder.try_init().is_ok()
    };

    if installed {
        tracing::debug!(level = %config.level, json = config.json, "tracing initialised");
    }
    installed
}
