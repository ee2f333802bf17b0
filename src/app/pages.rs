//! 静态页面与健康检查

use axum::{
    extract::State,
    response::{Html, Json},
};
use axum_extra::extract::cookie::SignedCookieJar;
use serde_json::{json, Value};

use crate::app::{views, AppState};
use crate::core::error::CoreError;
use crate::core::flash;
use crate::core::middleware::CurrentUser;

fn render(
    jar: SignedCookieJar,
    user: Option<CurrentUser>,
    title: &str,
    paragraphs: &[&str],
) -> (SignedCookieJar, Html<String>) {
    let (jar, flashes) = flash::take(jar);
    let user = user.map(|CurrentUser(user)| user);
    (jar, Html(views::static_page(title, user.as_ref(), &flashes, paragraphs)))
}

pub async fn index(jar: SignedCookieJar, user: Option<CurrentUser>) -> (SignedCookieJar, Html<String>) {
    render(
        jar,
        user,
        "Inventario",
        &["Bienvenido al sistema de inventario. Inicia sesión para gestionar los productos."],
    )
}

pub async fn about(jar: SignedCookieJar, user: Option<CurrentUser>) -> (SignedCookieJar, Html<String>) {
    render(
        jar,
        user,
        "Acerca de",
        &["Aplicación para registrar productos, cantidades, precios y categorías."],
    )
}

pub async fn contacto(jar: SignedCookieJar, user: Option<CurrentUser>) -> (SignedCookieJar, Html<String>) {
    render(
        jar,
        user,
        "Contacto",
        &["Para soporte escribe al administrador del sistema."],
    )
}

/// 存储可达时返回 200
pub async fn health(State(state): State<AppState>) -> Result<Json<Value>, CoreError> {
    state.products.ping().await?;
    Ok(Json(json!({
        "status": "ok",
        "storage": "reachable",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    })))
}
