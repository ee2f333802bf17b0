//! 会话辅助
//!
//! 会话保存在签名 cookie 中，只记录已登录用户的 `idusuario`。
//! 用户本身在每次请求时通过 `UserStore` 重新加载。

use axum_extra::extract::cookie::{Cookie, SameSite, SignedCookieJar};
use url::form_urlencoded;

pub const SESSION_COOKIE: &str = "inventario_session";

const VALUE_KEY: &str = "v";

/// cookie 值只允许可见 ASCII，统一做表单编码
pub fn encode_cookie_value(raw: &str) -> String {
    form_urlencoded::Serializer::new(String::new())
        .append_pair(VALUE_KEY, raw)
        .finish()
}

pub fn decode_cookie_value(encoded: &str) -> Option<String> {
    form_urlencoded::parse(encoded.as_bytes())
        .find(|(key, _)| key == VALUE_KEY)
        .map(|(_, value)| value.into_owned())
}

pub(crate) fn build_cookie(name: &'static str, value: String) -> Cookie<'static> {
    Cookie::build((name, value))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build()
}

pub(crate) fn removal_cookie(name: &'static str) -> Cookie<'static> {
    Cookie::build(name).path("/").build()
}

/// 对签名 cookie jar 的薄封装，处理器只关心用户 id
pub struct SessionContext(SignedCookieJar);

impl SessionContext {
    pub fn new(jar: SignedCookieJar) -> Self {
        Self(jar)
    }

    /// 当前会话中的用户 id
    pub fn user_id(&self) -> Option<String> {
        self.0
            .get(SESSION_COOKIE)
            .and_then(|cookie| decode_cookie_value(cookie.value()))
            .filter(|id| !id.is_empty())
    }

    /// 写入已认证用户的 id
    pub fn persist_user(self, user_id: &str) -> SignedCookieJar {
        self.0
            .add(build_cookie(SESSION_COOKIE, encode_cookie_value(user_id)))
    }

    pub fn clear(self) -> SignedCookieJar {
        self.0.remove(removal_cookie(SESSION_COOKIE))
    }
}
