//! 注册与登录表单

use serde::Deserialize;
use validator::Validate;

use crate::core::form::not_blank;

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct RegistroForm {
    #[serde(default)]
    #[validate(
        custom(function = "not_blank"),
        length(max = 10, message = "La cédula no puede superar 10 caracteres.")
    )]
    pub idusuario: String,

    #[serde(default)]
    #[validate(
        custom(function = "not_blank"),
        length(max = 100, message = "El nombre no puede superar 100 caracteres.")
    )]
    pub nombre: String,

    #[serde(default)]
    #[validate(
        email(message = "Email inválido."),
        length(max = 225, message = "El email no puede superar 225 caracteres.")
    )]
    pub email: String,

    #[serde(default)]
    #[validate(length(min = 6, message = "La contraseña debe tener al menos 6 caracteres."))]
    pub password: String,

    #[serde(default)]
    #[validate(must_match(other = "password", message = "Las contraseñas no coinciden."))]
    pub confirm_password: String,
}

impl RegistroForm {
    /// 去除首尾空白，email 统一小写
    pub fn normalized(&self) -> Self {
        Self {
            idusuario: self.idusuario.trim().to_string(),
            nombre: self.nombre.trim().to_string(),
            email: normalize_email(&self.email),
            password: self.password.clone(),
            confirm_password: self.confirm_password.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct LoginForm {
    #[serde(default)]
    #[validate(email(message = "Email inválido."))]
    pub email: String,

    #[serde(default)]
    #[validate(custom(function = "not_blank"))]
    pub password: String,

    /// 登录后跳转的原始地址
    #[serde(default)]
    pub next: Option<String>,
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
