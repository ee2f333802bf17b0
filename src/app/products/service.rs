//! 商品业务服务

use std::path::Path;
use std::sync::Arc;

use tracing::{info, warn};

use super::form::ProductoForm;
use super::model::{Categoria, ListQuery, Producto};
use super::repository::ProductStore;
use crate::core::error::{CoreError, StoreError};
use crate::core::form::{FormErrors, SubmitError};

pub const MSG_DUPLICATE_ON_CREATE: &str =
    "No se pudo guardar: ya existe un producto con ese nombre.";
pub const MSG_DUPLICATE_ON_UPDATE: &str =
    "Error al actualizar el producto. Puede que ya exista otro con ese nombre.";
pub const MSG_UNKNOWN_CATEGORY: &str = "La categoría seleccionada no existe.";

#[derive(Clone)]
pub struct ProductService {
    store: Arc<dyn ProductStore>,
}

impl ProductService {
    pub fn new(store: Arc<dyn ProductStore>) -> Self {
        Self { store }
    }

    pub async fn list(&self, query: &ListQuery) -> Result<Vec<Producto>, StoreError> {
        self.store.list(query.filter().as_ref()).await
    }

    pub async fn get(&self, id: i32) -> Result<Producto, CoreError> {
        self.store
            .find(id)
            .await?
            .ok_or_else(|| CoreError::NotFound("Producto no encontrado".to_string()))
    }

    pub async fn categories(&self) -> Result<Vec<Categoria>, StoreError> {
        self.store.categories().await
    }

    pub async fn create(&self, form: &ProductoForm) -> Result<Producto, SubmitError> {
        let draft = form.to_draft()?;
        let producto = self
            .store
            .insert(&draft)
            .await
            .map_err(|err| write_error(err, MSG_DUPLICATE_ON_CREATE))?;

        info!(id = producto.id, nombre = %producto.nombre, "product created");
        Ok(producto)
    }

    /// 先确认商品存在再校验表单
    pub async fn update(&self, id: i32, form: &ProductoForm) -> Result<Producto, SubmitError> {
        if self.store.find(id).await?.is_none() {
            return Err(SubmitError::NotFound);
        }
        let draft = form.to_draft()?;
        // 查询与写入之间被删除时 update 返回 None
        let producto = self
            .store
            .update(id, &draft)
            .await
            .map_err(|err| write_error(err, MSG_DUPLICATE_ON_UPDATE))?
            .ok_or(SubmitError::NotFound)?;

        info!(id, nombre = %producto.nombre, "product updated");
        Ok(producto)
    }

    /// 返回是否删除了商品
    pub async fn delete(&self, id: i32) -> Result<bool, StoreError> {
        let removed = self.store.delete(id).await?;
        if removed {
            info!(id, "product deleted");
        } else {
            warn!(id, "delete requested for missing product");
        }
        Ok(removed)
    }

    /// JSON 导出的全部商品
    pub async fn export(&self) -> Result<Vec<Producto>, StoreError> {
        self.store.list(None).await
    }

    /// 读取导出文件，文件不存在时返回 `Ok(None)`
    pub async fn load_export_file(&self, path: &Path) -> Result<Option<Vec<Producto>>, CoreError> {
        let content = match tokio::fs::read_to_string(path).await {
            Ok(content) => content,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => {
                return Err(CoreError::Internal(format!(
                    "failed to read {}: {err}",
                    path.display()
                )))
            }
        };

        serde_json::from_str(&content).map(Some).map_err(|err| {
            CoreError::Internal(format!("invalid product export {}: {err}", path.display()))
        })
    }

    pub async fn ping(&self) -> Result<(), StoreError> {
        self.store.ping().await
    }
}

/// 把可由用户修正的存储错误转换成表单错误
fn write_error(err: StoreError, duplicate_message: &str) -> SubmitError {
    match err {
        StoreError::Duplicate(field) => {
            SubmitError::Invalid(FormErrors::single(field, duplicate_message))
        }
        StoreError::UnknownCategory(_) => {
            SubmitError::Invalid(FormErrors::single("categoria", MSG_UNKNOWN_CATEGORY))
        }
        #[allow(unreachable_patterns)]
        other => SubmitError::Store(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::products::model::ProductDraft;
    use crate::infrastructure::memory::MemoryStore;

    fn service() -> (Arc<MemoryStore>, ProductService) {
        let store = Arc::new(MemoryStore::with_categories(["Oficina", "Hogar"]));
        (store.clone(), ProductService::new(store))
    }

    fn form(nombre: &str) -> ProductoForm {
        ProductoForm {
            nombre: nombre.into(),
            cantidad: "5".into(),
            precio: "9.90".into(),
            categoria: String::new(),
        }
    }

    #[tokio::test]
    async fn test_duplicate_name_is_reported_on_the_name_field() {
        let (_, service) = service();
        service.create(&form("Lápiz")).await.unwrap();

        match service.create(&form("Lápiz")).await {
            Err(SubmitError::Invalid(errors)) => {
                assert_eq!(errors.field("nombre"), [MSG_DUPLICATE_ON_CREATE]);
            }
            other => panic!("expected duplicate error, got {other:?}"),
        }
        assert_eq!(service.export().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_update_to_existing_name_is_rejected() {
        let (_, service) = service();
        service.create(&form("Lápiz")).await.unwrap();
        let borrador = service.create(&form("Borrador")).await.unwrap();

        match service.update(borrador.id, &form("Lápiz")).await {
            Err(SubmitError::Invalid(errors)) => {
                assert_eq!(errors.field("nombre"), [MSG_DUPLICATE_ON_UPDATE]);
            }
            other => panic!("expected duplicate error, got {other:?}"),
        }
        assert_eq!(service.get(borrador.id).await.unwrap().nombre, "Borrador");
    }

    #[tokio::test]
    async fn test_update_missing_product() {
        let (_, service) = service();
        assert!(matches!(
            service.update(99, &form("Nada")).await,
            Err(SubmitError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_update_missing_product_with_invalid_form_is_not_found() {
        let (_, service) = service();
        let invalid = ProductoForm {
            nombre: String::new(),
            cantidad: "-1".into(),
            precio: "0".into(),
            categoria: String::new(),
        };
        assert!(matches!(
            service.update(99, &invalid).await,
            Err(SubmitError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_unknown_category_is_a_form_error() {
        let (_, service) = service();
        let mut f = form("Silla");
        f.categoria = "42".into();

        match service.create(&f).await {
            Err(SubmitError::Invalid(errors)) => {
                assert_eq!(errors.field("categoria"), [MSG_UNKNOWN_CATEGORY]);
            }
            other => panic!("expected category error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_delete_missing_id_leaves_state_untouched() {
        let (store, service) = service();
        store
            .insert(&ProductDraft {
                nombre: "Cuaderno".into(),
                cantidad: 1,
                precio: 2.0,
                categoria_id: None,
            })
            .await
            .unwrap();

        assert!(!service.delete(1234).await.unwrap());
        assert_eq!(service.export().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_get_missing_is_not_found() {
        let (_, service) = service();
        assert!(matches!(service.get(5).await, Err(CoreError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_load_export_file() {
        let (_, service) = service();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("productos.json");

        assert!(service.load_export_file(&path).await.unwrap().is_none());

        std::fs::write(
            &path,
            r#"[{"id": 1, "nombre": "Regla", "cantidad": 3, "precio": 1.25}]"#,
        )
        .unwrap();
        let productos = service.load_export_file(&path).await.unwrap().unwrap();
        assert_eq!(productos.len(), 1);
        assert_eq!(productos[0].nombre, "Regla");
        assert_eq!(productos[0].categoria, None);

        std::fs::write(&path, "not json").unwrap();
        assert!(matches!(
            service.load_export_file(&path).await,
            Err(CoreError::Internal(_))
        ));
    }
}
