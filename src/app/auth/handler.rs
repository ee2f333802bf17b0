//! 认证处理器

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    Form,
};
use axum_extra::extract::cookie::SignedCookieJar;
use serde::Deserialize;
use tracing::error;

use super::form::{LoginForm, RegistroForm};
use super::service::MSG_BAD_CREDENTIALS;
use crate::app::{views, AppState};
use crate::core::flash::{self, FlashLevel};
use crate::core::form::{FormErrors, SubmitError};
use crate::core::session::SessionContext;

const DEFAULT_AFTER_LOGIN: &str = "/productos";

#[derive(Debug, Default, Deserialize)]
pub struct LoginQuery {
    #[serde(default)]
    pub next: Option<String>,
}

/// 只允许站内相对路径，避免开放重定向
pub fn safe_next(next: Option<&str>) -> &str {
    match next {
        Some(path) if path.starts_with('/') && !path.starts_with("//") && !path.starts_with("/\\") => {
            path
        }
        _ => DEFAULT_AFTER_LOGIN,
    }
}

fn internal_errors(err: SubmitError) -> FormErrors {
    match err {
        SubmitError::Invalid(errors) => errors,
        other => {
            error!(error = %other, "authentication request failed");
            FormErrors::single("general", "Error interno, intente nuevamente.")
        }
    }
}

pub async fn login_page(jar: SignedCookieJar, Query(query): Query<LoginQuery>) -> impl IntoResponse {
    let (jar, flashes) = flash::take(jar);
    let page = views::login_form(&flashes, "", query.next.as_deref(), &FormErrors::new());
    (jar, Html(page))
}

pub async fn login(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    Form(form): Form<LoginForm>,
) -> Response {
    let (status, errors) = match state.auth.authenticate(&form).await {
        Ok(Some(user)) => {
            let jar = SessionContext::new(jar).persist_user(&user.idusuario);
            let jar = flash::push(jar, FlashLevel::Success, format!("Bienvenido, {}.", user.nombre));
            let target = safe_next(form.next.as_deref()).to_string();
            return (jar, Redirect::to(&target)).into_response();
        }
        Ok(None) => (
            StatusCode::UNAUTHORIZED,
            FormErrors::single("general", MSG_BAD_CREDENTIALS),
        ),
        Err(err) => {
            let status = match err {
                SubmitError::Invalid(_) => StatusCode::UNPROCESSABLE_ENTITY,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            };
            (status, internal_errors(err))
        }
    };

    let (jar, flashes) = flash::take(jar);
    let page = views::login_form(&flashes, &form.email, form.next.as_deref(), &errors);
    (status, jar, Html(page)).into_response()
}

pub async fn register_page(jar: SignedCookieJar) -> impl IntoResponse {
    let (jar, flashes) = flash::take(jar);
    let page = views::register_form(&flashes, "", "", "", &FormErrors::new());
    (jar, Html(page))
}

pub async fn register(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    Form(form): Form<RegistroForm>,
) -> Response {
    let err = match state.auth.register(&form).await {
        Ok(_) => {
            let jar = flash::push(
                jar,
                FlashLevel::Success,
                "Registro exitoso. Ya puedes iniciar sesión.",
            );
            return (jar, Redirect::to("/login")).into_response();
        }
        Err(err) => err,
    };

    let status = match err {
        SubmitError::Invalid(_) => StatusCode::UNPROCESSABLE_ENTITY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    let errors = internal_errors(err);
    let (jar, flashes) = flash::take(jar);
    let page = views::register_form(&flashes, &form.idusuario, &form.nombre, &form.email, &errors);
    (status, jar, Html(page)).into_response()
}

pub async fn logout(jar: SignedCookieJar) -> (SignedCookieJar, Redirect) {
    let jar = SessionContext::new(jar).clear();
    let jar = flash::push(jar, FlashLevel::Info, "Sesión cerrada.");
    (jar, Redirect::to("/login"))
}
