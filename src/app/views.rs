//! 服务端 HTML 渲染
//!
//! 所有插入页面的用户数据都经过 `escape`。

use axum::http::StatusCode;
use std::fmt::Write;

use super::auth::model::User;
use super::products::form::ProductoForm;
use super::products::model::{Categoria, ListQuery, Producto, SearchCriterion};
use crate::core::flash::Flash;
use crate::core::form::FormErrors;

const STYLE: &str = r#"
    body { font-family: Arial, sans-serif; margin: 0; background: #f5f5f5; color: #333; }
    nav { background: #343a40; padding: 12px 40px; }
    nav a { color: #fff; margin-right: 16px; text-decoration: none; }
    nav .user { float: right; color: #ccc; }
    main { max-width: 960px; margin: 24px auto; background: #fff; padding: 24px 32px; border-radius: 8px; }
    table { width: 100%; border-collapse: collapse; }
    th, td { text-align: left; padding: 8px; border-bottom: 1px solid #ddd; }
    .flash { padding: 10px 14px; margin-bottom: 12px; border-radius: 4px; }
    .flash-success { background: #d4edda; } .flash-info { background: #d1ecf1; }
    .flash-warning { background: #fff3cd; } .flash-danger { background: #f8d7da; }
    .errors { color: #b00020; margin: 4px 0 0; padding-left: 18px; }
    .field { margin-bottom: 14px; } label { display: block; font-weight: bold; }
    footer { text-align: center; color: #888; font-size: 0.9em; margin: 24px 0; }
"#;

/// HTML 转义
pub fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

/// 页面公共布局
pub fn layout(title: &str, user: Option<&User>, flashes: &[Flash], body: &str) -> String {
    let mut nav = String::from(
        r#"<a href="/">Inicio</a><a href="/productos">Productos</a><a href="/about/">Acerca de</a><a href="/contacto/">Contacto</a>"#,
    );
    match user {
        Some(user) => {
            let _ = write!(
                nav,
                r#"<span class="user">{} · <a href="/logout">Salir</a></span>"#,
                escape(&user.nombre)
            );
        }
        None => nav.push_str(
            r#"<span class="user"><a href="/login">Ingresar</a><a href="/registro">Registro</a></span>"#,
        ),
    }

    let mut messages = String::new();
    for flash in flashes {
        let _ = write!(
            messages,
            r#"<div class="flash flash-{}">{}</div>"#,
            flash.level.as_str(),
            escape(&flash.message)
        );
    }

    format!(
        r#"<!DOCTYPE html>
<html lang="es">
<head>
    <meta charset="UTF-8">
    <title>{title} · Inventario</title>
    <style>{style}</style>
</head>
<body>
    <nav>{nav}</nav>
    <main>
        {messages}
        <h1>{title}</h1>
        {body}
    </main>
    <footer>&copy; {year} Inventario</footer>
</body>
</html>"#,
        title = escape(title),
        style = STYLE,
        year = chrono::Utc::now().format("%Y"),
    )
}

fn field_errors(errors: &FormErrors, field: &str) -> String {
    let messages = errors.field(field);
    if messages.is_empty() {
        return String::new();
    }
    let mut out = String::from(r#"<ul class="errors">"#);
    for message in messages {
        let _ = write!(out, "<li>{}</li>", escape(message));
    }
    out.push_str("</ul>");
    out
}

fn input(label: &str, name: &str, kind: &str, value: &str, errors: &FormErrors) -> String {
    format!(
        r#"<div class="field"><label for="{name}">{label}</label><input type="{kind}" id="{name}" name="{name}" value="{value}">{errs}</div>"#,
        label = escape(label),
        value = escape(value),
        errs = field_errors(errors, name),
    )
}

fn product_rows(productos: &[Producto], editable: bool) -> String {
    if productos.is_empty() {
        return r#"<tr><td colspan="6">No hay productos.</td></tr>"#.to_string();
    }
    let mut rows = String::new();
    for p in productos {
        let actions = if editable {
            format!(
                r#"<a href="/productos/{id}/editar">Editar</a>
                <form method="post" action="/productos/{id}/eliminar" style="display:inline"><button type="submit">Eliminar</button></form>"#,
                id = p.id
            )
        } else {
            String::new()
        };
        let _ = write!(
            rows,
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{:.2}</td><td>{}</td><td>{}</td></tr>",
            p.id,
            escape(&p.nombre),
            p.cantidad,
            p.precio,
            escape(p.categoria.as_deref().unwrap_or("-")),
            actions
        );
    }
    rows
}

/// 商品列表；`query` 为空时不显示搜索框（例如 JSON 文件视图）
pub fn product_list(
    title: &str,
    user: Option<&User>,
    flashes: &[Flash],
    productos: &[Producto],
    query: Option<&ListQuery>,
) -> String {
    let mut body = String::new();
    if let Some(query) = query {
        let selected = query.criterion();
        let mut options = String::new();
        for (criterion, label) in [
            (SearchCriterion::Nombre, "Nombre"),
            (SearchCriterion::Categoria, "Categoría"),
            (SearchCriterion::Id, "ID"),
        ] {
            let _ = write!(
                options,
                r#"<option value="{}"{}>{}</option>"#,
                criterion.as_str(),
                if criterion == selected { " selected" } else { "" },
                label
            );
        }
        let _ = write!(
            body,
            r#"<form method="get" action="/productos">
    <input type="text" name="q" value="{q}" placeholder="Buscar">
    <select name="criterio">{options}</select>
    <button type="submit">Buscar</button>
    <a href="/productos/nuevo">Nuevo producto</a> · <a href="/productos/exportar-json">Exportar JSON</a>
</form>"#,
            q = escape(query.term()),
        );
    }
    let _ = write!(
        body,
        r#"<table>
    <thead><tr><th>ID</th><th>Nombre</th><th>Cantidad</th><th>Precio</th><th>Categoría</th><th></th></tr></thead>
    <tbody>{}</tbody>
</table>"#,
        product_rows(productos, query.is_some())
    );
    layout(title, user, flashes, &body)
}

/// 新建 / 编辑商品表单
pub fn product_form(
    title: &str,
    user: Option<&User>,
    flashes: &[Flash],
    form: &ProductoForm,
    errors: &FormErrors,
    categorias: &[Categoria],
    action: &str,
) -> String {
    let mut options = String::from(r#"<option value="">Sin categoría</option>"#);
    for categoria in categorias {
        let id = categoria.id.to_string();
        let _ = write!(
            options,
            r#"<option value="{id}"{}>{}</option>"#,
            if form.categoria.trim() == id { " selected" } else { "" },
            escape(&categoria.nombre)
        );
    }

    let body = format!(
        r#"<form method="post" action="{action}">
    {nombre}
    {cantidad}
    {precio}
    <div class="field"><label for="categoria">Categoría</label><select id="categoria" name="categoria">{options}</select>{categoria_errors}</div>
    <button type="submit">Guardar</button> <a href="/productos">Cancelar</a>
</form>"#,
        action = escape(action),
        nombre = input("Nombre", "nombre", "text", &form.nombre, errors),
        cantidad = input("Cantidad", "cantidad", "text", &form.cantidad, errors),
        precio = input("Precio", "precio", "text", &form.precio, errors),
        categoria_errors = field_errors(errors, "categoria"),
    );
    layout(title, user, flashes, &body)
}

pub fn login_form(
    flashes: &[Flash],
    email: &str,
    next: Option<&str>,
    errors: &FormErrors,
) -> String {
    let hidden = next
        .map(|next| format!(r#"<input type="hidden" name="next" value="{}">"#, escape(next)))
        .unwrap_or_default();
    let body = format!(
        r#"<form method="post" action="/login">
    {hidden}
    {general}
    {email}
    {password}
    <button type="submit">Ingresar</button>
</form>
<p>¿No tienes cuenta? <a href="/registro">Regístrate</a></p>"#,
        general = field_errors(errors, "general"),
        email = input("Email", "email", "email", email, errors),
        password = input("Contraseña", "password", "password", "", errors),
    );
    layout("Iniciar sesión", None, flashes, &body)
}

pub fn register_form(
    flashes: &[Flash],
    idusuario: &str,
    nombre: &str,
    email: &str,
    errors: &FormErrors,
) -> String {
    let body = format!(
        r#"<form method="post" action="/registro">
    {idusuario}
    {nombre}
    {email}
    {password}
    {confirm}
    <button type="submit">Registrar</button>
</form>
<p>¿Ya tienes cuenta? <a href="/login">Ingresa</a></p>"#,
        idusuario = input("Cédula", "idusuario", "text", idusuario, errors),
        nombre = input("Nombre", "nombre", "text", nombre, errors),
        email = input("Email", "email", "email", email, errors),
        password = input("Contraseña", "password", "password", "", errors),
        confirm = input(
            "Confirmar Contraseña",
            "confirm_password",
            "password",
            "",
            errors
        ),
    );
    layout("Registro", None, flashes, &body)
}

/// 静态内容页面
pub fn static_page(title: &str, user: Option<&User>, flashes: &[Flash], paragraphs: &[&str]) -> String {
    let mut body = String::new();
    for paragraph in paragraphs {
        let _ = write!(body, "<p>{}</p>", escape(paragraph));
    }
    layout(title, user, flashes, &body)
}

pub fn error_page(status: StatusCode, message: &str) -> String {
    let title = status.canonical_reason().unwrap_or("Error");
    let body = format!(
        r#"<p>{}</p><p><a href="/productos">Volver a productos</a></p>"#,
        escape(message)
    );
    layout(title, None, &[], &body)
}
