//! 事件处理器注册表
//!
//! 进程启动时通过 builder 一次性注册全部处理器，`build()` 之后只读。
//! 匹配顺序：先是订阅了该事件类型的处理器（按注册顺序），再是订阅全部事件的处理器（按注册顺序）。
//!
use super::handler::{EventHandler, HandledEventType};
use crate::error::{DomainError, DomainResult};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

#[derive(Clone, Default)]
pub struct EventHandlerRegistry {
    by_type: HashMap<String, Vec<Arc<dyn EventHandler>>>,
    all: Vec<Arc<dyn EventHandler>>,
}

impl EventHandlerRegistry {
    pub fn builder() -> EventHandlerRegistryBuilder {
        EventHandlerRegistryBuilder::default()
    }

    /// 某事件类型匹配到的处理器（可能为空）
    pub fn matching(&self, event_type: &str) -> Vec<Arc<dyn EventHandler>> {
        let mut merged: Vec<Arc<dyn EventHandler>> = Vec::new();
        if let Some(list) = self.by_type.get(event_type) {
            merged.extend(list.iter().cloned());
        }
        merged.extend(self.all.iter().cloned());
        merged
    }

    pub fn handler_count(&self, event_type: &str) -> usize {
        self.by_type.get(event_type).map_or(0, Vec::len) + self.all.len()
    }

    /// 显式订阅的事件类型（有序，便于启动日志与断言）
    pub fn subscribed_event_types(&self) -> Vec<&str> {
        let mut types: Vec<&str> = self.by_type.keys().map(String::as_str).collect();
        types.sort_unstable();
        types
    }

    pub fn is_empty(&self) -> bool {
        self.by_type.is_empty() && self.all.is_empty()
    }
}

#[derive(Default)]
pub struct EventHandlerRegistryBuilder {
    handlers: Vec<Arc<dyn EventHandler>>,
}

impl EventHandlerRegistryBuilder {
    pub fn handler(mut self, handler: Arc<dyn EventHandler>) -> Self {
        self.handlers.push(handler);
        self
    }

    pub fn handlers(mut self, handlers: impl IntoIterator<Item = Arc<dyn EventHandler>>) -> Self {
        self.handlers.extend(handlers);
        self
    }

    /// 构建只读注册表；处理器名称重复时拒绝构建
    pub fn build(self) -> DomainResult<EventHandlerRegistry> {
        let mut names = HashSet::new();
        let mut by_type: HashMap<String, Vec<Arc<dyn EventHandler>>> = HashMap::new();
        let mut all: Vec<Arc<dyn EventHandler>> = Vec::new();

        for h in self.handlers {
            if !names.insert(h.handler_name().to_string()) {
                return Err(DomainError::EventHandler {
                    handler: h.handler_name().to_string(),
                    reason: "handler name registered twice".to_string(),
                });
            }

            match h.handled_event_type() {
                HandledEventType::All => all.push(h),
                HandledEventType::One(t) => {
                    by_type.entry(t).or_default().push(h);
                }
                HandledEventType::Many(ts) => {
                    for t in ts {
                        by_type.entry(t).or_default().push(h.clone());
                    }
                }
            }
        }

        let summary: BTreeMap<&str, usize> = by_type
            .iter()
            .map(|(t, hs)| (t.as_str(), hs.len()))
            .collect();
        tracing::info!(
            handlers = names.len(),
            catch_all = all.len(),
            per_event_type = ?summary,
            "event handler registry built"
        );

        Ok(EventHandlerRegistry { by_type, all })
    }
}
