//! 用户存储接口

use async_trait::async_trait;

use super::model::{NewUser, User};
use crate::core::error::StoreError;

/// 按 id / email 加载用户的能力，会话在每次请求时通过它取回当前用户
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_id(&self, idusuario: &str) -> Result<Option<User>, StoreError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    async fn id_exists(&self, idusuario: &str) -> Result<bool, StoreError>;

    async fn email_exists(&self, email: &str) -> Result<bool, StoreError>;

    /// id 或 email 冲突时返回 `StoreError::Duplicate`，字段名为 `idusuario` 或 `email`
    async fn insert(&self, user: &NewUser) -> Result<User, StoreError>;
}
