//! 内存存储
//!
//! 所有数据放在一个 `RwLock` 后面：读操作可以并发，写操作（包括唯一性检查）
//! 在写锁内完成，因此“检查再插入”是原子的。

use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::app::auth::model::{NewUser, User};
use crate::app::auth::repository::UserStore;
use crate::app::products::model::{Categoria, ProductDraft, ProductFilter, Producto};
use crate::app::products::repository::ProductStore;
use crate::core::error::StoreError;

#[derive(Debug, Clone)]
struct ProductRow {
    nombre: String,
    cantidad: i32,
    precio: f64,
    categoria_id: Option<i32>,
}

#[derive(Default)]
struct Inner {
    products: BTreeMap<i32, ProductRow>,
    categories: BTreeMap<i32, String>,
    users: BTreeMap<String, User>,
    last_product_id: i32,
    last_category_id: i32,
}

impl Inner {
    fn materialize(&self, id: i32, row: &ProductRow) -> Producto {
        Producto {
            id,
            nombre: row.nombre.clone(),
            cantidad: row.cantidad,
            precio: row.precio,
            categoria_id: row.categoria_id,
            categoria: row
                .categoria_id
                .and_then(|cid| self.categories.get(&cid).cloned()),
        }
    }

    fn check_product(&self, draft: &ProductDraft, except: Option<i32>) -> Result<(), StoreError> {
        let taken = self
            .products
            .iter()
            .any(|(id, row)| Some(*id) != except && row.nombre == draft.nombre);
        if taken {
            return Err(StoreError::Duplicate("nombre"));
        }
        if let Some(cid) = draft.categoria_id {
            if !self.categories.contains_key(&cid) {
                return Err(StoreError::UnknownCategory(cid));
            }
        }
        Ok(())
    }
}

fn row_from(draft: &ProductDraft) -> ProductRow {
    ProductRow {
        nombre: draft.nombre.clone(),
        cantidad: draft.cantidad,
        precio: draft.precio,
        categoria_id: draft.categoria_id,
    }
}

#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 预置分类，id 从 1 开始按顺序分配
    pub fn with_categories<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut inner = Inner::default();
        for name in names {
            inner.last_category_id += 1;
            inner.categories.insert(inner.last_category_id, name.into());
        }
        Self {
            inner: RwLock::new(inner),
        }
    }
}

#[async_trait]
impl ProductStore for MemoryStore {
    async fn list(&self, filter: Option<&ProductFilter>) -> Result<Vec<Producto>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner
            .products
            .iter()
            .map(|(id, row)| inner.materialize(*id, row))
            .filter(|p| filter.map_or(true, |f| f.matches(p)))
            .collect())
    }

    async fn find(&self, id: i32) -> Result<Option<Producto>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner.products.get(&id).map(|row| inner.materialize(id, row)))
    }

    async fn insert(&self, draft: &ProductDraft) -> Result<Producto, StoreError> {
        let mut inner = self.inner.write().await;
        inner.check_product(draft, None)?;

        inner.last_product_id += 1;
        let id = inner.last_product_id;
        let row = row_from(draft);
        let producto = inner.materialize(id, &row);
        inner.products.insert(id, row);
        Ok(producto)
    }

    async fn update(&self, id: i32, draft: &ProductDraft) -> Result<Option<Producto>, StoreError> {
        let mut inner = self.inner.write().await;
        if !inner.products.contains_key(&id) {
            return Ok(None);
        }
        inner.check_product(draft, Some(id))?;

        let row = row_from(draft);
        let producto = inner.materialize(id, &row);
        inner.products.insert(id, row);
        Ok(Some(producto))
    }

    async fn delete(&self, id: i32) -> Result<bool, StoreError> {
        Ok(self.inner.write().await.products.remove(&id).is_some())
    }

    async fn categories(&self) -> Result<Vec<Categoria>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner
            .categories
            .iter()
            .map(|(id, nombre)| Categoria {
                id: *id,
                nombre: nombre.clone(),
            })
            .collect())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn find_by_id(&self, idusuario: &str) -> Result<Option<User>, StoreError> {
        Ok(self.inner.read().await.users.get(idusuario).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner.users.values().find(|u| u.email == email).cloned())
    }

    async fn id_exists(&self, idusuario: &str) -> Result<bool, StoreError> {
        Ok(self.inner.read().await.users.contains_key(idusuario))
    }

    async fn email_exists(&self, email: &str) -> Result<bool, StoreError> {
        Ok(self.find_by_email(email).await?.is_some())
    }

    async fn insert(&self, user: &NewUser) -> Result<User, StoreError> {
        let mut inner = self.inner.write().await;
        if inner.users.contains_key(&user.idusuario) {
            return Err(StoreError::Duplicate("idusuario"));
        }
        if inner.users.values().any(|u| u.email == user.email) {
            return Err(StoreError::Duplicate("email"));
        }

        let user = User::from(user.clone());
        inner.users.insert(user.idusuario.clone(), user.clone());
        Ok(user)
    }
}
