//! 核心中间件模块

use axum::{
    async_trait,
    extract::{FromRequestParts, Request},
    http::request::Parts,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::SignedCookieJar;
use std::time::Instant;
use tracing::{info, warn};
use url::form_urlencoded;

use super::error::PageError;
use super::session::SessionContext;
use crate::app::auth::model::User;
use crate::app::AppState;

/// 请求日志中间件
pub async fn request_logging_middleware(req: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = req.method().clone();
    let uri = req.uri().clone();
    let user_agent = req
        .headers()
        .get("user-agent")
        .and_then(|h| h.to_str().ok())
        .map(|s| s.to_string());

    let response = next.run(req).await;

    info!(
        %method,
        %uri,
        status = response.status().as_u16(),
        latency_ms = start.elapsed().as_millis() as u64,
        user_agent = ?user_agent,
        "request completed"
    );

    response
}

/// 已登录的用户，每次请求都从 `UserStore` 重新加载
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

/// 跳转到登录页并带上原始地址
pub fn login_redirect(next: &str) -> Response {
    let query = form_urlencoded::Serializer::new(String::new())
        .append_pair("next", next)
        .finish();
    Redirect::to(&format!("/login?{query}")).into_response()
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        if let Some(user) = parts.extensions.get::<CurrentUser>() {
            return Ok(user.clone());
        }

        let next = parts
            .uri
            .path_and_query()
            .map(|pq| pq.as_str().to_string())
            .unwrap_or_else(|| "/".to_string());

        let session = SessionContext::new(SignedCookieJar::from_headers(
            &parts.headers,
            state.key.clone(),
        ));
        let Some(idusuario) = session.user_id() else {
            return Err(login_redirect(&next));
        };

        match state.auth.load_user(&idusuario).await {
            Ok(Some(user)) => {
                let current = CurrentUser(user);
                parts.extensions.insert(current.clone());
                Ok(current)
            }
            Ok(None) => {
                warn!(%idusuario, "session refers to a missing user");
                Err(login_redirect(&next))
            }
            Err(err) => Err(PageError::from(err).into_response()),
        }
    }
}

/// 登录守卫，未登录时跳转到 `/login?next=...`
pub async fn require_login(user: CurrentUser, mut req: Request, next: Next) -> Response {
    req.extensions_mut().insert(user);
    next.run(req).await
}
