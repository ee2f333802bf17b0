//! 一次性提示消息
//!
//! 消息以 JSON 数组的形式存放在签名 cookie 中，下一个渲染的页面读取后删除。

use axum_extra::extract::cookie::SignedCookieJar;
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::session::{build_cookie, decode_cookie_value, encode_cookie_value, removal_cookie};

pub const FLASH_COOKIE: &str = "inventario_flash";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashLevel {
    Success,
    Info,
    Warning,
    Danger,
}

impl FlashLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            FlashLevel::Success => "success",
            FlashLevel::Info => "info",
            FlashLevel::Warning => "warning",
            FlashLevel::Danger => "danger",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flash {
    pub level: FlashLevel,
    pub message: String,
}

fn read(jar: &SignedCookieJar) -> Vec<Flash> {
    let Some(cookie) = jar.get(FLASH_COOKIE) else {
        return Vec::new();
    };
    let Some(json) = decode_cookie_value(cookie.value()) else {
        return Vec::new();
    };
    serde_json::from_str(&json).unwrap_or_else(|err| {
        warn!(error = %err, "discarding malformed flash cookie");
        Vec::new()
    })
}

/// 追加一条消息
pub fn push(jar: SignedCookieJar, level: FlashLevel, message: impl Into<String>) -> SignedCookieJar {
    let mut flashes = read(&jar);
    flashes.push(Flash {
        level,
        message: message.into(),
    });
    match serde_json::to_string(&flashes) {
        Ok(json) => jar.add(build_cookie(FLASH_COOKIE, encode_cookie_value(&json))),
        Err(err) => {
            warn!(error = %err, "failed to encode flash messages");
            jar
        }
    }
}

/// 取出全部消息并清除 cookie
pub fn take(jar: SignedCookieJar) -> (SignedCookieJar, Vec<Flash>) {
    let flashes = read(&jar);
    if flashes.is_empty() && jar.get(FLASH_COOKIE).is_none() {
        return (jar, flashes);
    }
    (jar.remove(removal_cookie(FLASH_COOKIE)), flashes)
}
