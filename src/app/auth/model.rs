//! 用户数据模型

use serde::Serialize;

/// `usuarios` 表中的一行
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "database", derive(sqlx::FromRow))]
pub struct User {
    /// 身份证号，作为自然主键
    pub idusuario: String,
    pub nombre: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
}

impl User {
    /// 校验明文密码，哈希格式错误时视为不匹配
    pub fn verify_password(&self, plain: &str) -> bool {
        bcrypt::verify(plain, &self.password_hash).unwrap_or(false)
    }
}

/// 注册时写入的新用户，密码已哈希
#[derive(Debug, Clone)]
pub struct NewUser {
    pub idusuario: String,
    pub nombre: String,
    pub email: String,
    pub password_hash: String,
}

impl From<NewUser> for User {
    fn from(user: NewUser) -> Self {
        Self {
            idusuario: user.idusuario,
            nombre: user.nombre,
            email: user.email,
            password_hash: user.password_hash,
        }
    }
}
