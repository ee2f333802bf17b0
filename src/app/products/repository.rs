//! 商品存储接口

use async_trait::async_trait;

use super::model::{Categoria, ProductDraft, ProductFilter, Producto};
use crate::core::error::StoreError;

/// 商品与分类的持久化能力，由 PostgreSQL 或内存实现
#[async_trait]
pub trait ProductStore: Send + Sync {
    /// 按 id 升序列出商品，`filter` 为空时返回全部
    async fn list(&self, filter: Option<&ProductFilter>) -> Result<Vec<Producto>, StoreError>;

    async fn find(&self, id: i32) -> Result<Option<Producto>, StoreError>;

    /// 名称重复时返回 `StoreError::Duplicate("nombre")`
    async fn insert(&self, draft: &ProductDraft) -> Result<Producto, StoreError>;

    /// 商品不存在时返回 `Ok(None)`
    async fn update(&self, id: i32, draft: &ProductDraft) -> Result<Option<Producto>, StoreError>;

    /// 返回是否确实删除了一行
    async fn delete(&self, id: i32) -> Result<bool, StoreError>;

    async fn categories(&self) -> Result<Vec<Categoria>, StoreError>;

    /// 健康检查
    async fn ping(&self) -> Result<(), StoreError>;
}
