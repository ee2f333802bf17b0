//! 认证业务服务

use std::sync::Arc;

use tracing::{info, warn};
use validator::Validate;

use super::form::{normalize_email, LoginForm, RegistroForm};
use super::model::{NewUser, User};
use super::repository::UserStore;
use crate::core::error::StoreError;
use crate::core::form::{FormErrors, SubmitError};

pub const MSG_DUPLICATE_ID: &str = "Esta cédula ya está registrada.";
pub const MSG_DUPLICATE_EMAIL: &str = "Este email ya está registrado.";
pub const MSG_BAD_CREDENTIALS: &str = "Credenciales inválidas.";

#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserStore>,
    bcrypt_cost: u32,
}

impl AuthService {
    pub fn new(users: Arc<dyn UserStore>, bcrypt_cost: u32) -> Self {
        Self { users, bcrypt_cost }
    }

    /// 注册新用户；id 和 email 先查询是否重复，再插入
    pub async fn register(&self, form: &RegistroForm) -> Result<User, SubmitError> {
        let form = form.normalized();
        let mut errors = match form.validate() {
            Ok(()) => FormErrors::new(),
            Err(err) => err.into(),
        };

        if !form.idusuario.is_empty() && self.users.id_exists(&form.idusuario).await? {
            errors.add("idusuario", MSG_DUPLICATE_ID);
        }
        if !form.email.is_empty() && self.users.email_exists(&form.email).await? {
            errors.add("email", MSG_DUPLICATE_EMAIL);
        }
        if !errors.is_empty() {
            return Err(SubmitError::Invalid(errors));
        }

        let password_hash = self.hash_password(form.password.clone()).await?;
        let new_user = NewUser {
            idusuario: form.idusuario,
            nombre: form.nombre,
            email: form.email,
            password_hash,
        };

        // 预检查与插入之间的并发注册由唯一约束兜底
        let user = self.users.insert(&new_user).await.map_err(|err| match err {
            StoreError::Duplicate(field) => {
                let message = if field == "email" {
                    MSG_DUPLICATE_EMAIL
                } else {
                    MSG_DUPLICATE_ID
                };
                SubmitError::Invalid(FormErrors::single(field, message))
            }
            other => SubmitError::Store(other),
        })?;

        info!(idusuario = %user.idusuario, "user registered");
        Ok(user)
    }

    /// 校验凭据；email 不存在或密码错误都返回 `Ok(None)`
    pub async fn authenticate(&self, form: &LoginForm) -> Result<Option<User>, SubmitError> {
        let email = normalize_email(&form.email);
        let form = LoginForm {
            email: email.clone(),
            ..form.clone()
        };
        form.validate()?;

        let Some(user) = self.users.find_by_email(&email).await? else {
            warn!(%email, "login attempt for unknown email");
            return Ok(None);
        };

        let password = form.password.clone();
        let (user, valid) = tokio::task::spawn_blocking(move || {
            let valid = user.verify_password(&password);
            (user, valid)
        })
        .await
        .map_err(|err| SubmitError::Internal(format!("password check panicked: {err}")))?;

        if valid {
            info!(idusuario = %user.idusuario, "user logged in");
            Ok(Some(user))
        } else {
            warn!(%email, "login attempt with wrong password");
            Ok(None)
        }
    }

    /// 会话加载当前用户
    pub async fn load_user(&self, idusuario: &str) -> Result<Option<User>, StoreError> {
        self.users.find_by_id(idusuario).await
    }

    async fn hash_password(&self, password: String) -> Result<String, SubmitError> {
        let cost = self.bcrypt_cost;
        tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
            .await
            .map_err(|err| SubmitError::Internal(format!("password hashing panicked: {err}")))?
            .map_err(|err| SubmitError::Internal(format!("password hashing failed: {err}")))
    }
}
