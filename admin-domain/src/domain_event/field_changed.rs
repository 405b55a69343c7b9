use serde::{Deserialize, Serialize};

/// 字段变更封装，包含旧值与新值
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldChanged<T> {
    pub old: T,
    pub new: T,
}

impl<T> FieldChanged<T> {
    pub fn new(old: T, new: T) -> Self {
        Self { old, new }
    }

    pub fn new_value(&self) -> &T {
        &self.new
    }

    pub fn old_value(&self) -> &T {
        &self.old
    }
}

impl<T> FieldChanged<T>
where
    T: PartialEq,
{
    pub fn is_changed(&self) -> bool {
        self.old != self.new
    }

    /// 仅当值确实变化时返回变更记录
    pub fn diff(old: T, new: T) -> Option<Self> {
        let changed = Self::new(old, new);
        changed.is_changed().then_some(changed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn diff_skips_unchanged_values() {
        assert!(FieldChanged::diff(Some("a"), Some("a")).is_none());

        let changed = FieldChanged::diff(None, Some("b")).unwrap();
        assert_eq!(changed.old_value(), &None);
        assert_eq!(changed.new_value(), &Some("b"));
    }
}
