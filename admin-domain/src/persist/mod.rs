//! 存储协作方（persist）
//!
//! 处理器只通过窄接口访问存储：
//! - `EntityReader`：按标识、标识集合或自然键读取，不含任何写方法；
//! - `Repository`：在读取之上提供单记录 `save`（新建或更新）；
//! - `InMemoryRepository`：基于并发哈希表的实现，在存储层保证自然键唯一。
//!
//! 所有方法都可能以 `DomainError::StorageUnavailable` 失败，调用方原样向上传播。
//!
mod inmemory;
mod repository;

pub use inmemory::InMemoryRepository;
pub use repository::{EntityReader, Repository};
