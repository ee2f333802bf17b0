//! 通过完整路由驱动的 HTTP 测试，使用内存存储

use axum::{
    body::{to_bytes, Body},
    http::{header, HeaderMap, Method, Request, StatusCode},
    Router,
};
use axum_extra::extract::cookie::Key;
use inventario::{create_router, infrastructure::memory::MemoryStore, AppState};
use serde_json::Value;
use std::{collections::BTreeMap, path::PathBuf, sync::Arc, time::Duration};
use tower::ServiceExt;
use url::form_urlencoded;

fn build_app(products_json: PathBuf) -> Router {
    let store = Arc::new(MemoryStore::with_categories(["Oficina", "Hogar"]));
    let state = AppState::new(store.clone(), store, Key::generate(), 4, products_json);
    create_router(state, Duration::from_secs(10))
}

/// 简单的浏览器替身：记住 Set-Cookie，并在后续请求中带回
struct Browser {
    app: Router,
    cookies: BTreeMap<String, String>,
}

struct Page {
    status: StatusCode,
    headers: HeaderMap,
    body: String,
}

impl Page {
    fn location(&self) -> &str {
        self.headers
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
    }
}

impl Browser {
    fn new() -> Self {
        Self::with_products_json(PathBuf::from("no-existe/productos.json"))
    }

    fn with_products_json(path: PathBuf) -> Self {
        Self {
            app: build_app(path),
            cookies: BTreeMap::new(),
        }
    }

    async fn send(&mut self, method: Method, uri: &str, form: Option<&[(&str, &str)]>) -> Page {
        let mut builder = Request::builder().method(method).uri(uri);
        if !self.cookies.is_empty() {
            let cookie = self
                .cookies
                .iter()
                .map(|(name, value)| format!("{name}={value}"))
                .collect::<Vec<_>>()
                .join("; ");
            builder = builder.header(header::COOKIE, cookie);
        }
        let body = match form {
            Some(pairs) => {
                builder = builder.header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
                let encoded = form_urlencoded::Serializer::new(String::new())
                    .extend_pairs(pairs.iter())
                    .finish();
                Body::from(encoded)
            }
            None => Body::empty(),
        };

        let response = self
            .app
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap();

        for value in response.headers().get_all(header::SET_COOKIE) {
            let raw = value.to_str().unwrap();
            let pair = raw.split(';').next().unwrap();
            let (name, value) = pair.split_once('=').unwrap();
            if value.is_empty() {
                self.cookies.remove(name);
            } else {
                self.cookies.insert(name.to_string(), value.to_string());
            }
        }

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        Page {
            status,
            headers,
            body: String::from_utf8(bytes.to_vec()).unwrap(),
        }
    }

    async fn get(&mut self, uri: &str) -> Page {
        self.send(Method::GET, uri, None).await
    }

    async fn post(&mut self, uri: &str, form: &[(&str, &str)]) -> Page {
        self.send(Method::POST, uri, Some(form)).await
    }

    async fn register(&mut self, idusuario: &str, email: &str, password: &str) -> Page {
        self.post(
            "/registro",
            &[
                ("idusuario", idusuario),
                ("nombre", "Ana"),
                ("email", email),
                ("password", password),
                ("confirm_password", password),
            ],
        )
        .await
    }

    async fn login(&mut self, email: &str, password: &str, next: &str) -> Page {
        self.post("/login", &[("email", email), ("password", password), ("next", next)])
            .await
    }

    /// 注册并登录一个默认用户
    async fn signed_in() -> Self {
        let mut browser = Self::new();
        browser.register("0102030405", "ana@example.com", "secreto1").await;
        let page = browser.login("ana@example.com", "secreto1", "").await;
        assert_eq!(page.status, StatusCode::SEE_OTHER);
        browser
    }

    async fn create_product(&mut self, nombre: &str, cantidad: &str, precio: &str, categoria: &str) -> Page {
        self.post(
            "/productos/nuevo",
            &[
                ("nombre", nombre),
                ("cantidad", cantidad),
                ("precio", precio),
                ("categoria", categoria),
            ],
        )
        .await
    }

    async fn export(&mut self) -> Vec<Value> {
        let page = self.get("/productos/exportar-json").await;
        assert_eq!(page.status, StatusCode::OK);
        serde_json::from_str(&page.body).unwrap()
    }
}

#[tokio::test]
async fn test_anonymous_user_is_sent_to_login_with_next() {
    let mut browser = Browser::new();

    let page = browser.get("/productos?q=lap").await;
    assert_eq!(page.status, StatusCode::SEE_OTHER);
    assert_eq!(page.location(), "/login?next=%2Fproductos%3Fq%3Dlap");

    let page = browser.get("/productos/exportar-json").await;
    assert_eq!(page.status, StatusCode::SEE_OTHER);
    assert!(page.location().starts_with("/login?next="));

    let page = browser.get("/api/productos").await;
    assert_eq!(page.status, StatusCode::SEE_OTHER);
}

#[tokio::test]
async fn test_public_pages_render() {
    let mut browser = Browser::new();
    for path in ["/", "/about/", "/contacto/", "/login", "/registro"] {
        let page = browser.get(path).await;
        assert_eq!(page.status, StatusCode::OK, "{path}");
        assert!(page.body.contains("<html"), "{path}");
    }
}

#[tokio::test]
async fn test_register_and_login() {
    let mut browser = Browser::new();

    let page = browser.register("0102030405", "Ana@Example.com", "secreto1").await;
    assert_eq!(page.status, StatusCode::SEE_OTHER);
    assert_eq!(page.location(), "/login");

    let page = browser.get("/login").await;
    assert!(page.body.contains("Registro exitoso"));

    let page = browser.login("ana@example.com", "equivocada", "").await;
    assert_eq!(page.status, StatusCode::UNAUTHORIZED);
    assert!(page.body.contains("Credenciales inválidas."));
    assert!(!browser.cookies.contains_key("inventario_session"));

    let page = browser.login("ana@example.com", "secreto1", "/productos/nuevo").await;
    assert_eq!(page.status, StatusCode::SEE_OTHER);
    assert_eq!(page.location(), "/productos/nuevo");
    assert!(browser.cookies.contains_key("inventario_session"));

    let page = browser.get("/productos").await;
    assert_eq!(page.status, StatusCode::OK);
    assert!(page.body.contains("Bienvenido, Ana."));
}

#[tokio::test]
async fn test_login_ignores_external_next() {
    let mut browser = Browser::new();
    browser.register("0102030405", "ana@example.com", "secreto1").await;

    let page = browser
        .login("ana@example.com", "secreto1", "https://evil.example/")
        .await;
    assert_eq!(page.status, StatusCode::SEE_OTHER);
    assert_eq!(page.location(), "/productos");
}

#[tokio::test]
async fn test_duplicate_registration_is_rejected() {
    let mut browser = Browser::new();
    browser.register("0102030405", "ana@example.com", "secreto1").await;

    let page = browser.register("9999999999", "ana@example.com", "secreto1").await;
    assert_eq!(page.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(page.body.contains("Este email ya está registrado."));

    let page = browser.register("0102030405", "otra@example.com", "secreto1").await;
    assert_eq!(page.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(page.body.contains("Esta cédula ya está registrada."));
}

#[tokio::test]
async fn test_registration_validation() {
    let mut browser = Browser::new();
    let page = browser
        .post(
            "/registro",
            &[
                ("idusuario", "01"),
                ("nombre", "Ana"),
                ("email", "ana@example.com"),
                ("password", "corta"),
                ("confirm_password", "otra"),
            ],
        )
        .await;
    assert_eq!(page.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(page.body.contains("al menos 6 caracteres"));
    assert!(page.body.contains("Las contraseñas no coinciden."));
}

#[tokio::test]
async fn test_logout_clears_session() {
    let mut browser = Browser::signed_in().await;

    let page = browser.get("/logout").await;
    assert_eq!(page.status, StatusCode::SEE_OTHER);
    assert_eq!(page.location(), "/login");
    assert!(!browser.cookies.contains_key("inventario_session"));

    let page = browser.get("/productos").await;
    assert_eq!(page.status, StatusCode::SEE_OTHER);
}

#[tokio::test]
async fn test_create_list_and_search() {
    let mut browser = Browser::signed_in().await;

    let page = browser.create_product("Laptop", "5", "1200,50", "1").await;
    assert_eq!(page.status, StatusCode::SEE_OTHER);
    assert_eq!(page.location(), "/productos");
    browser.create_product("Silla", "10", "45.90", "2").await;

    let page = browser.get("/productos").await;
    assert!(page.body.contains("Producto agregado correctamente."));
    assert!(page.body.contains("Laptop"));
    assert!(page.body.contains("Silla"));

    let page = browser.get("/productos?q=LAP&criterio=nombre").await;
    assert!(page.body.contains("Laptop"));
    assert!(!page.body.contains("Silla"));

    let page = browser.get("/productos?q=hog&criterio=categoria").await;
    assert!(page.body.contains("Silla"));
    assert!(!page.body.contains("Laptop"));

    let page = browser.get("/productos?q=abc&criterio=id").await;
    assert!(!page.body.contains("Laptop"));
    assert!(!page.body.contains("Silla"));
}

#[tokio::test]
async fn test_duplicate_and_invalid_products_are_rejected() {
    let mut browser = Browser::signed_in().await;
    browser.create_product("Laptop", "5", "1200", "").await;

    let page = browser.create_product("Laptop", "1", "10", "").await;
    assert_eq!(page.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(page.body.contains("ya existe un producto con ese nombre"));

    let page = browser.create_product("Mesa", "-1", "0", "").await;
    assert_eq!(page.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(page.body.contains("value=\"Mesa\""));

    assert_eq!(browser.export().await.len(), 1);
}

#[tokio::test]
async fn test_edit_product() {
    let mut browser = Browser::signed_in().await;
    browser.create_product("Laptop", "5", "1200", "1").await;
    let id = browser.export().await[0]["id"].as_i64().unwrap();

    let page = browser.get(&format!("/productos/{id}/editar")).await;
    assert_eq!(page.status, StatusCode::OK);
    assert!(page.body.contains("value=\"Laptop\""));

    let page = browser
        .post(
            &format!("/productos/{id}/editar"),
            &[("nombre", "Laptop Pro"), ("cantidad", "3"), ("precio", "1500"), ("categoria", "")],
        )
        .await;
    assert_eq!(page.status, StatusCode::SEE_OTHER);

    let exported = browser.export().await;
    assert_eq!(exported[0]["nombre"], "Laptop Pro");
    assert_eq!(exported[0]["cantidad"], 3);
    assert!(exported[0]["categoria"].is_null());

    let page = browser.get("/productos/999/editar").await;
    assert_eq!(page.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_update_missing_product_is_not_found_even_with_invalid_form() {
    let mut browser = Browser::signed_in().await;

    let page = browser
        .post(
            "/productos/999/editar",
            &[("nombre", ""), ("cantidad", "-1"), ("precio", "0"), ("categoria", "")],
        )
        .await;
    assert_eq!(page.status, StatusCode::NOT_FOUND);
    assert!(page.body.contains("Producto no encontrado"));
}

#[tokio::test]
async fn test_non_numeric_product_id_is_not_found() {
    let mut browser = Browser::signed_in().await;

    let page = browser.get("/productos/abc/editar").await;
    assert_eq!(page.status, StatusCode::NOT_FOUND);
    assert!(page.body.contains("<html"));

    let page = browser
        .post(
            "/productos/99999999999/editar",
            &[("nombre", "Mesa"), ("cantidad", "1"), ("precio", "10"), ("categoria", "")],
        )
        .await;
    assert_eq!(page.status, StatusCode::NOT_FOUND);

    let page = browser.post("/productos/abc/eliminar", &[]).await;
    assert_eq!(page.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_product() {
    let mut browser = Browser::signed_in().await;
    browser.create_product("Laptop", "5", "1200", "").await;
    browser.get("/productos").await;

    let page = browser.post("/productos/999/eliminar", &[]).await;
    assert_eq!(page.status, StatusCode::SEE_OTHER);
    let page = browser.get("/productos").await;
    assert!(page.body.contains("Producto no encontrado."));
    assert!(page.body.contains("Laptop"));

    let id = browser.export().await[0]["id"].as_i64().unwrap();
    browser.post(&format!("/productos/{id}/eliminar"), &[]).await;
    let page = browser.get("/productos").await;
    assert!(page.body.contains("Producto eliminado correctamente."));
    assert!(!page.body.contains("Laptop"));
}

#[tokio::test]
async fn test_export_returns_every_product() {
    let mut browser = Browser::signed_in().await;
    browser.create_product("Laptop", "5", "1200", "1").await;
    browser.create_product("Silla", "10", "45.9", "").await;

    let exported = browser.export().await;
    assert_eq!(exported.len(), 2);
    let laptop = exported.iter().find(|p| p["nombre"] == "Laptop").unwrap();
    assert_eq!(laptop["categoria"], "Oficina");
    assert_eq!(laptop["precio"], 1200.0);
    assert!(laptop.get("categoria_id").is_none());
}

#[tokio::test]
async fn test_api_list_envelope() {
    let mut browser = Browser::signed_in().await;
    browser.create_product("Laptop", "5", "1200", "1").await;

    let page = browser.get("/api/productos?q=lap").await;
    assert_eq!(page.status, StatusCode::OK);
    let json: Value = serde_json::from_str(&page.body).unwrap();
    assert_eq!(json["success"], true);
    assert_eq!(json["total"], 1);
    assert_eq!(json["data"][0]["nombre"], "Laptop");
}

#[tokio::test]
async fn test_view_json_missing_file() {
    let mut browser = Browser::signed_in().await;

    let page = browser.get("/productos/ver-json").await;
    assert_eq!(page.status, StatusCode::SEE_OTHER);
    assert_eq!(page.location(), "/productos");

    let page = browser.get("/productos").await;
    assert!(page.body.contains("El archivo productos.json no se encontró."));
}

#[tokio::test]
async fn test_view_json_reads_export_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("productos.json");
    std::fs::write(
        &path,
        r#"[{"id": 7, "nombre": "Lámpara", "cantidad": 2, "precio": 19.5, "categoria": "Hogar"}]"#,
    )
    .unwrap();

    let mut browser = Browser::with_products_json(path);
    browser.register("0102030405", "ana@example.com", "secreto1").await;
    browser.login("ana@example.com", "secreto1", "").await;

    let page = browser.get("/productos/ver-json").await;
    assert_eq!(page.status, StatusCode::OK);
    assert!(page.body.contains("Lámpara"));
}

#[tokio::test]
async fn test_health() {
    let mut browser = Browser::new();
    let page = browser.get("/health").await;
    assert_eq!(page.status, StatusCode::OK);
    let json: Value = serde_json::from_str(&page.body).unwrap();
    assert_eq!(json["status"], "ok");
}
