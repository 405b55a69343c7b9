//! 应用配置（AppConfig）
//!
//! 来源优先级（后者覆盖前者）：
//! 1. 各配置段的默认值；
//! 2. TOML 配置文件（可选，文件不存在时沿用默认值）；
//! 3. `ADMIN_*` 环境变量（启动时先由 `dotenvy` 加载 `.env`，若存在）。
//!
//! ```toml
//! [log]
//! level = "debug"
//! json = false
//!
//! [event_bus]
//! handler_concurrency = 1
//! handler_timeout_ms = 30000
//!
//! [storage]
//! timeout_ms = 2000
//! ```

use crate::error::AppError;
use admin_domain::eventing::EventBusConfig;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// 环境变量前缀
pub const ENV_PREFIX: &str = "ADMIN_";

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub log: LogConfig,
    pub event_bus: EventBusSettings,
    pub storage: StorageConfig,
}

/// 日志配置；`RUST_LOG` 存在时优先于 `level`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub level: String,
    pub json: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EventBusSettings {
    pub handler_concurrency: usize,
    pub handler_timeout_ms: u64,
}

impl Default for EventBusSettings {
    fn default() -> Self {
        let defaults = EventBusConfig::default();
        Self {
            handler_concurrency: defaults.handler_concurrency,
            handler_timeout_ms: defaults.handler_timeout.as_millis() as u64,
        }
    }
}

impl From<&EventBusSettings> for EventBusConfig {
    fn from(s: &EventBusSettings) -> Self {
        EventBusConfig::builder()
            .handler_concurrency(s.handler_concurrency.max(1))
            .handler_timeout(Duration::from_millis(s.handler_timeout_ms))
            .build()
    }
}

/// 存储调用时限；未配置时不设上限
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub timeout_ms: Option<u64>,
}

impl StorageConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }
}

impl AppConfig {
    /// 读取配置文件并叠加环境变量
    pub fn load(path: impl AsRef<Path>) -> Result<Self, AppError> {
        let path = path.as_ref();
        if let Err(err) = dotenvy::dotenv() {
            tracing::debug!(error = %err, ".env not loaded");
        }

        let mut config = match std::fs::read_to_string(path) {
            Ok(content) => Self::from_toml_str(&content)?,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "config file absent, using defaults");
                Self::default()
            }
            Err(err) => {
                return Err(AppError::Config(format!(
                    "read {}: {err}",
                    path.display()
                )));
            }
        };

        config.apply_overrides(std::env::vars())?;
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, AppError> {
        toml::from_str(content).map_err(|e| AppError::Config(e.to_string()))
    }

    /// 应用 `ADMIN_*` 覆盖项；其它键忽略
    pub fn apply_overrides<I, K, V>(&mut self, vars: I) -> Result<(), AppError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        for (key, value) in vars {
            let Some(key) = key.as_ref().strip_prefix(ENV_PREFIX) else {
                continue;
            };
            let value = value.as_ref();
            match key {
                "LOG_LEVEL" => self.log.level = value.to_string(),
                "LOG_JSON" => self.log.json = parse(key, value)?,
                "EVENT_BUS_HANDLER_CONCURRENCY" => {
                    self.event_bus.handler_concurrency = parse(key, value)?
                }
                "EVENT_BUS_HANDLER_TIMEOUT_MS" => {
                    self.event_bus.handler_timeout_ms = parse(key, value)?
                }
                "STORAGE_TIMEOUT_MS" => self.storage.timeout_ms = Some(parse(key, value)?),
                _ => {}
            }
        }
        Ok(())
    }

    pub fn event_bus_config(&self) -> EventBusConfig {
        EventBusConfig::from(&self.event_bus)
    }
}

fn parse<T>(key: &str, value: &str) -> Result<T, AppError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e| AppError::Config(format!("{ENV_PREFIX}{key}={value}: {e}")))
}
