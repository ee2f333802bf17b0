//! 商品处理器

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Json, Redirect, Response},
    Form,
};
use axum_extra::extract::cookie::SignedCookieJar;
use tracing::error;

use super::form::ProductoForm;
use super::model::{ListQuery, Producto};
use crate::app::{views, AppState};
use crate::core::error::{CoreError, PageError};
use crate::core::flash::{self, FlashLevel};
use crate::core::form::{FormErrors, SubmitError};
use crate::core::middleware::CurrentUser;
use crate::core::response::ApiResponse;

const LIST_PATH: &str = "/productos";

fn not_found() -> PageError {
    CoreError::NotFound("Producto no encontrado".to_string()).into()
}

/// 路径中的 id 不是合法整数时按 404 处理
fn parse_id(raw: &str) -> Result<i32, PageError> {
    raw.parse().map_err(|_| not_found())
}

/// 列表 / 搜索
pub async fn list_products(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    jar: SignedCookieJar,
    Query(query): Query<ListQuery>,
) -> Result<(SignedCookieJar, Html<String>), PageError> {
    let productos = state.products.list(&query).await?;
    let (jar, flashes) = flash::take(jar);
    let page = views::product_list("Productos", Some(&user), &flashes, &productos, Some(&query));
    Ok((jar, Html(page)))
}

/// 表单页面的标题与提交地址
struct FormPage<'a> {
    title: &'a str,
    action: &'a str,
}

const NEW_PAGE: FormPage<'static> = FormPage {
    title: "Nuevo producto",
    action: "/productos/nuevo",
};

async fn render_form(
    state: &AppState,
    user: &CurrentUser,
    jar: SignedCookieJar,
    status: StatusCode,
    target: FormPage<'_>,
    form: &ProductoForm,
    errors: &FormErrors,
) -> Result<Response, PageError> {
    let categorias = state.products.categories().await?;
    let (jar, flashes) = flash::take(jar);
    let page = views::product_form(
        target.title,
        Some(&user.0),
        &flashes,
        form,
        errors,
        &categorias,
        target.action,
    );
    Ok((status, jar, Html(page)).into_response())
}

/// 提交失败时把错误归到表单上，存储故障只显示通用消息
fn submit_errors(err: SubmitError, generic: &str) -> FormErrors {
    match err {
        SubmitError::Invalid(errors) => errors,
        other => {
            error!(error = %other, "product write failed");
            FormErrors::single("nombre", generic)
        }
    }
}

pub async fn new_product_form(
    State(state): State<AppState>,
    user: CurrentUser,
    jar: SignedCookieJar,
) -> Result<Response, PageError> {
    render_form(
        &state,
        &user,
        jar,
        StatusCode::OK,
        NEW_PAGE,
        &ProductoForm::default(),
        &FormErrors::new(),
    )
    .await
}

pub async fn create_product(
    State(state): State<AppState>,
    user: CurrentUser,
    jar: SignedCookieJar,
    Form(form): Form<ProductoForm>,
) -> Result<Response, PageError> {
    match state.products.create(&form).await {
        Ok(_) => {
            let jar = flash::push(jar, FlashLevel::Success, "Producto agregado correctamente.");
            Ok((jar, Redirect::to(LIST_PATH)).into_response())
        }
        Err(err) => {
            let errors = submit_errors(err, "No se pudo guardar el producto.");
            render_form(
                &state,
                &user,
                jar,
                StatusCode::UNPROCESSABLE_ENTITY,
                NEW_PAGE,
                &form,
                &errors,
            )
            .await
        }
    }
}

pub async fn edit_product_form(
    State(state): State<AppState>,
    user: CurrentUser,
    jar: SignedCookieJar,
    Path(id): Path<String>,
) -> Result<Response, PageError> {
    let id = parse_id(&id)?;
    let producto = state.products.get(id).await?;
    render_form(
        &state,
        &user,
        jar,
        StatusCode::OK,
        FormPage {
            title: "Editar producto",
            action: &format!("/productos/{id}/editar"),
        },
        &ProductoForm::from_product(&producto),
        &FormErrors::new(),
    )
    .await
}

pub async fn update_product(
    State(state): State<AppState>,
    user: CurrentUser,
    jar: SignedCookieJar,
    Path(id): Path<String>,
    Form(form): Form<ProductoForm>,
) -> Result<Response, PageError> {
    let id = parse_id(&id)?;
    match state.products.update(id, &form).await {
        Ok(_) => {
            let jar = flash::push(jar, FlashLevel::Success, "Producto actualizado correctamente.");
            Ok((jar, Redirect::to(LIST_PATH)).into_response())
        }
        Err(SubmitError::NotFound) => Err(not_found()),
        Err(err) => {
            let errors = submit_errors(err, "Error al actualizar el producto.");
            render_form(
                &state,
                &user,
                jar,
                StatusCode::UNPROCESSABLE_ENTITY,
                FormPage {
                    title: "Editar producto",
                    action: &format!("/productos/{id}/editar"),
                },
                &form,
                &errors,
            )
            .await
        }
    }
}

pub async fn delete_product(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    Path(id): Path<String>,
) -> Result<(SignedCookieJar, Redirect), PageError> {
    let id = parse_id(&id)?;
    let jar = if state.products.delete(id).await? {
        flash::push(jar, FlashLevel::Success, "Producto eliminado correctamente.")
    } else {
        flash::push(jar, FlashLevel::Warning, "Producto no encontrado.")
    };
    Ok((jar, Redirect::to(LIST_PATH)))
}

/// 导出全部商品为 JSON
pub async fn export_json(State(state): State<AppState>) -> Result<Json<Vec<Producto>>, CoreError> {
    Ok(Json(state.products.export().await?))
}

/// 从导出文件读取商品并显示
pub async fn view_json(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    jar: SignedCookieJar,
) -> Result<Response, PageError> {
    match state.products.load_export_file(&state.products_json).await? {
        Some(productos) => {
            let (jar, flashes) = flash::take(jar);
            let page = views::product_list("Productos (JSON)", Some(&user), &flashes, &productos, None);
            Ok((jar, Html(page)).into_response())
        }
        None => {
            let message = format!(
                "El archivo {} no se encontró.",
                state
                    .products_json
                    .file_name()
                    .map(|name| name.to_string_lossy().into_owned())
                    .unwrap_or_else(|| state.products_json.display().to_string())
            );
            let jar = flash::push(jar, FlashLevel::Danger, message);
            Ok((jar, Redirect::to(LIST_PATH)).into_response())
        }
    }
}

/// JSON 接口的列表 / 搜索
pub async fn api_list_products(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<ApiResponse<Vec<Producto>>>, CoreError> {
    let productos = state.products.list(&query).await?;
    Ok(Json(ApiResponse::collection(productos)))
}
