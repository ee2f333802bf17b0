//! PostgreSQL 存储实现

use async_trait::async_trait;
use sqlx::postgres::PgPool;

use crate::app::auth::model::{NewUser, User};
use crate::app::auth::repository::UserStore;
use crate::app::products::model::{
    Categoria, ProductDraft, ProductFilter, Producto, SearchCriterion,
};
use crate::app::products::repository::ProductStore;
use crate::core::error::StoreError;

const SELECT_PRODUCTS: &str = r#"
    SELECT p.ID_Producto AS id,
           p.Nombre AS nombre,
           p.Cantidad AS cantidad,
           p.precio AS precio,
           p.ID_Categoria AS categoria_id,
           c.NombreCategoria AS categoria
    FROM productos p
    LEFT JOIN categorias c ON c.ID_Categoria = p.ID_Categoria
"#;

const SELECT_USERS: &str =
    "SELECT idusuario, nombre, email, password AS password_hash FROM usuarios";

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// 写入错误转换：唯一约束与外键约束转成可展示的错误
fn map_product_write_error(err: sqlx::Error, draft: &ProductDraft) -> StoreError {
    if let Some(db_err) = err.as_database_error() {
        if db_err.is_unique_violation() {
            return StoreError::Duplicate("nombre");
        }
        if db_err.is_foreign_key_violation() {
            if let Some(cid) = draft.categoria_id {
                return StoreError::UnknownCategory(cid);
            }
        }
    }
    StoreError::Database(err)
}

fn map_user_write_error(err: sqlx::Error) -> StoreError {
    if let Some(db_err) = err.as_database_error() {
        if db_err.is_unique_violation() {
            let field = match db_err.constraint() {
                Some(name) if name.contains("email") => "email",
                _ => "idusuario",
            };
            return StoreError::Duplicate(field);
        }
    }
    StoreError::Database(err)
}

#[async_trait]
impl ProductStore for PgStore {
    async fn list(&self, filter: Option<&ProductFilter>) -> Result<Vec<Producto>, StoreError> {
        let rows = match filter {
            None => {
                sqlx::query_as::<_, Producto>(&format!("{SELECT_PRODUCTS} ORDER BY p.ID_Producto"))
                    .fetch_all(&self.pool)
                    .await?
            }
            Some(filter) => match filter.criterion {
                SearchCriterion::Id => {
                    let Some(id) = filter.id() else {
                        return Ok(Vec::new());
                    };
                    sqlx::query_as::<_, Producto>(&format!(
                        "{SELECT_PRODUCTS} WHERE p.ID_Producto = $1 ORDER BY p.ID_Producto"
                    ))
                    .bind(id)
                    .fetch_all(&self.pool)
                    .await?
                }
                SearchCriterion::Nombre | SearchCriterion::Categoria => {
                    let column = if filter.criterion == SearchCriterion::Nombre {
                        "p.Nombre"
                    } else {
                        "c.NombreCategoria"
                    };
                    sqlx::query_as::<_, Producto>(&format!(
                        "{SELECT_PRODUCTS} WHERE {column} ILIKE $1 ESCAPE '\\' ORDER BY p.ID_Producto"
                    ))
                    .bind(filter.like_pattern())
                    .fetch_all(&self.pool)
                    .await?
                }
            },
        };
        Ok(rows)
    }

    async fn find(&self, id: i32) -> Result<Option<Producto>, StoreError> {
        let producto = sqlx::query_as::<_, Producto>(&format!(
            "{SELECT_PRODUCTS} WHERE p.ID_Producto = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(producto)
    }

    async fn insert(&self, draft: &ProductDraft) -> Result<Producto, StoreError> {
        let (id,): (i32,) = sqlx::query_as(
            "INSERT INTO productos (Nombre, Cantidad, precio, ID_Categoria) \
             VALUES ($1, $2, $3, $4) RETURNING ID_Producto",
        )
        .bind(&draft.nombre)
        .bind(draft.cantidad)
        .bind(draft.precio)
        .bind(draft.categoria_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|err| map_product_write_error(err, draft))?;

        self.find(id)
            .await?
            .ok_or(StoreError::Database(sqlx::Error::RowNotFound))
    }

    async fn update(&self, id: i32, draft: &ProductDraft) -> Result<Option<Producto>, StoreError> {
        let result = sqlx::query(
            "UPDATE productos SET Nombre = $1, Cantidad = $2, precio = $3, ID_Categoria = $4 \
             WHERE ID_Producto = $5",
        )
        .bind(&draft.nombre)
        .bind(draft.cantidad)
        .bind(draft.precio)
        .bind(draft.categoria_id)
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|err| map_product_write_error(err, draft))?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.find(id).await
    }

    async fn delete(&self, id: i32) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM productos WHERE ID_Producto = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn categories(&self) -> Result<Vec<Categoria>, StoreError> {
        let categorias = sqlx::query_as::<_, Categoria>(
            "SELECT ID_Categoria AS id, NombreCategoria AS nombre FROM categorias ORDER BY ID_Categoria",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(categorias)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

#[async_trait]
impl UserStore for PgStore {
    async fn find_by_id(&self, idusuario: &str) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(&format!("{SELECT_USERS} WHERE idusuario = $1"))
            .bind(idusuario)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(&format!("{SELECT_USERS} WHERE email = $1"))
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn id_exists(&self, idusuario: &str) -> Result<bool, StoreError> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM usuarios WHERE idusuario = $1")
            .bind(idusuario)
            .fetch_one(&self.pool)
            .await?;
        Ok(count > 0)
    }

    async fn email_exists(&self, email: &str) -> Result<bool, StoreError> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM usuarios WHERE email = $1")
            .bind(email)
            .fetch_one(&self.pool)
            .await?;
        Ok(count > 0)
    }

    async fn insert(&self, user: &NewUser) -> Result<User, StoreError> {
        sqlx::query(
            "INSERT INTO usuarios (idusuario, nombre, email, password) VALUES ($1, $2, $3, $4)",
        )
        .bind(&user.idusuario)
        .bind(&user.nombre)
        .bind(&user.email)
        .bind(&user.password_hash)
        .execute(&self.pool)
        .await
        .map_err(map_user_write_error)?;

        Ok(User::from(user.clone()))
    }
}
