//! 应用层：路由、共享状态与各业务模块

pub mod auth;
pub mod pages;
pub mod products;
pub mod views;

use axum::{
    extract::FromRef,
    middleware,
    routing::{get, post},
    Router,
};
use axum_extra::extract::cookie::Key;
use std::{path::PathBuf, sync::Arc, time::Duration};
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};
use tracing::warn;

use self::auth::{handler as auth_handler, repository::UserStore, service::AuthService};
use self::products::{handler as product_handler, repository::ProductStore, service::ProductService};
use crate::core::middleware::{request_logging_middleware, require_login};

#[derive(Clone)]
pub struct AppState {
    pub products: ProductService,
    pub auth: AuthService,
    pub key: Key,
    pub products_json: Arc<PathBuf>,
}

impl AppState {
    pub fn new(
        products: Arc<dyn ProductStore>,
        users: Arc<dyn UserStore>,
        key: Key,
        bcrypt_cost: u32,
        products_json: PathBuf,
    ) -> Self {
        Self {
            products: ProductService::new(products),
            auth: AuthService::new(users, bcrypt_cost),
            key,
            products_json: Arc::new(products_json),
        }
    }
}

impl FromRef<AppState> for Key {
    fn from_ref(state: &AppState) -> Self {
        state.key.clone()
    }
}

/// 配置的密钥不足 64 字节时生成进程内随机密钥，重启后旧会话失效
pub fn signing_key(secret: Option<&str>) -> Key {
    match secret {
        Some(secret) => match Key::try_from(secret.as_bytes()) {
            Ok(key) => key,
            Err(_) => {
                warn!(
                    length = secret.len(),
                    "secret key shorter than 64 bytes, using a random key"
                );
                Key::generate()
            }
        },
        None => {
            warn!("no secret key configured, sessions will not survive a restart");
            Key::generate()
        }
    }
}

/// 构建完整路由
pub fn create_router(state: AppState, timeout: Duration) -> Router {
    let protected = Router::new()
        .route("/productos", get(product_handler::list_products))
        .route(
            "/productos/nuevo",
            get(product_handler::new_product_form).post(product_handler::create_product),
        )
        .route(
            "/productos/:id/editar",
            get(product_handler::edit_product_form).post(product_handler::update_product),
        )
        .route("/productos/:id/eliminar", post(product_handler::delete_product))
        .route("/productos/exportar-json", get(product_handler::export_json))
        .route("/productos/ver-json", get(product_handler::view_json))
        .route("/api/productos", get(product_handler::api_list_products))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_login));

    Router::new()
        .route("/", get(pages::index))
        .route("/about/", get(pages::about))
        .route("/contacto/", get(pages::contacto))
        .route("/health", get(pages::health))
        .route("/login", get(auth_handler::login_page).post(auth_handler::login))
        .route("/registro", get(auth_handler::register_page).post(auth_handler::register))
        .route("/logout", get(auth_handler::logout))
        .merge(protected)
        .layer(middleware::from_fn(request_logging_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(timeout))
        .with_state(state)
}
