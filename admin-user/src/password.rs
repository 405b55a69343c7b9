//! 口令哈希
//!
//! 使用 Argon2id（默认参数），每条记录随机生成盐并嵌入 PHC 字符串，
//! 因此存储侧只需保存一个字段。哈希与校验在阻塞线程池上执行，不占用异步执行器。

use admin_domain::error::{DomainError, DomainResult};
use argon2::{
    Argon2,
    password_hash::{
        PasswordHash, PasswordHasher as _, PasswordVerifier as _, SaltString, rand_core::OsRng,
    },
};

#[derive(Clone, Default)]
pub struct PasswordHasher {
    argon2: Argon2<'static>,
}

impl PasswordHasher {
    pub fn new() -> Self {
        Self::default()
    }

    /// 生成 PHC 格式的哈希串
    pub async fn hash(&self, password: &str) -> DomainResult<String> {
        let argon2 = self.argon2.clone();
        let password = password.to_string();

        tokio::task::spawn_blocking(move || hash_blocking(&argon2, &password))
            .await
            .map_err(|e| DomainError::PasswordHash {
                reason: e.to_string(),
            })?
    }

    /// 校验口令；口令不匹配返回 `Ok(false)`，哈希串本身损坏才返回错误
    pub async fn verify(&self, password: &str, hash: &str) -> DomainResult<bool> {
        let argon2 = self.argon2.clone();
        let password = password.to_string();
        let hash = hash.to_string();

        tokio::task::spawn_blocking(move || verify_blocking(&argon2, &password, &hash))
            .await
            .map_err(|e| DomainError::PasswordHash {
                reason: e.to_string(),
            })?
    }
}

fn hash_blocking(argon2: &Argon2<'_>, password: &str) -> DomainResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| DomainError::PasswordHash {
            reason: e.to_string(),
        })
}

fn verify_blocking(argon2: &Argon2<'_>, password: &str, hash: &str) -> DomainResult<bool> {
    let parsed = PasswordHash::new(hash).map_err(|e| DomainError::PasswordHash {
        reason: e.to_string(),
    })?;
    Ok(argon2.verify_password(password.as_bytes(), &parsed).is_ok())
}
