//! 值对象（Value Object）
//!
//! 无标识、以值相等为准的对象，用于封装不可变的概念性值与校验逻辑。
//!

use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};

/// 值对象抽象
pub trait ValueObject {
    /// 业务校验失败时的错误类型
    type Error;

    /// 创建值对象时进行验证
    fn validate(&self) -> Result<(), Self::Error>;
}

/// 分页参数
///
/// 页码从 1 开始，每页条数限制在 `1..=Pagination::MAX_LIMIT`。
///
/// # 示例
///
/// ```
/// use admin_domain::value_object::Pagination;
///
/// let p = Pagination::new(2, 20).unwrap();
/// assert_eq!(p.offset(), 20);
/// assert!(Pagination::new(0, 20).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawPagination")]
pub struct Pagination {
    page: u32,
    limit: u32,
}

/// 反序列化的中间形态，缺省字段取默认值，再经 `Pagination::new` 校验
#[derive(Deserialize)]
struct RawPagination {
    #[serde(default = "RawPagination::first_page")]
    page: u32,
    #[serde(default = "RawPagination::default_limit")]
    limit: u32,
}

impl RawPagination {
    const fn first_page() -> u32 {
        1
    }

    const fn default_limit() -> u32 {
        Pagination::DEFAULT_LIMIT
    }
}

impl TryFrom<RawPagination> for Pagination {
    type Error = DomainError;

    fn try_from(raw: RawPagination) -> Result<Self, Self::Error> {
        Pagination::new(raw.page, raw.limit)
    }
}

impl Pagination {
    pub const DEFAULT_LIMIT: u32 = 10;
    pub const MAX_LIMIT: u32 = 100;

    pub fn new(page: u32, limit: u32) -> DomainResult<Self> {
        let p = Self { page, limit };
        p.validate()?;
        Ok(p)
    }

    pub const fn page(&self) -> u32 {
        self.page
    }

    pub const fn limit(&self) -> u32 {
        self.limit
    }

    /// 当前页之前需要跳过的条数
    pub const fn offset(&self) -> usize {
        (self.page as usize).saturating_sub(1) * self.limit as usize
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: 1,
            limit: Self::DEFAULT_LIMIT,
        }
    }
}

impl ValueObject for Pagination {
    type Error = DomainError;

    fn validate(&self) -> Result<(), Self::Error> {
        if self.page == 0 {
            return Err(DomainError::invalid_value("page must start at 1"));
        }
        if self.limit == 0 || self.limit > Self::MAX_LIMIT {
            return Err(DomainError::invalid_value(format!(
                "limit must be within 1..={}",
                Self::MAX_LIMIT
            )));
        }
        Ok(())
    }
}

/// 分页结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: usize,
    pub page: u32,
    pub limit: u32,
}

impl<T> Page<T> {
    /// 从已排序的完整结果集中截取当前页
    pub fn slice(all: Vec<T>, pagination: Pagination) -> Self {
        let total = all.len();
        let items = all
            .into_iter()
            .skip(pagination.offset())
            .take(pagination.limit() as usize)
            .collect();

        Self {
            items,
            total,
            page: pagination.page(),
            limit: pagination.limit(),
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            page: self.page,
            limit: self.limit,
        }
    }

    pub fn total_pages(&self) -> usize {
        self.total.div_ceil(self.limit.max(1) as usize)
    }
}
