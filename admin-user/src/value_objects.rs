use admin_domain::error::DomainError;
use admin_domain::value_object::ValueObject;
use serde::{Deserialize, Serialize};
use std::fmt;

/// 用户名：去除首尾空白后非空、不超过 32 个字符、不含空白与控制字符
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Username(String);

impl Username {
    pub const MAX_LEN: usize = 32;

    pub fn new(raw: impl Into<String>) -> Result<Self, DomainError> {
        let username = Self(raw.into().trim().to_string());
        username.validate()?;
        Ok(username)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl ValueObject for Username {
    type Error = DomainError;

    fn validate(&self) -> Result<(), Self::Error> {
        if self.0.is_empty() {
            return Err(DomainError::invalid_value("username is required"));
        }
        if self.0.chars().count() > Self::MAX_LEN {
            return Err(DomainError::invalid_value(format!(
                "username must be at most {} characters",
                Self::MAX_LEN
            )));
        }
        if self.0.chars().any(|c| c.is_whitespace() || c.is_control()) {
            return Err(DomainError::invalid_value(
                "username must not contain whitespace",
            ));
        }
        Ok(())
    }
}

impl TryFrom<String> for Username {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Username> for String {
    fn from(value: Username) -> Self {
        value.0
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
