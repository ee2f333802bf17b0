//! 核心错误处理模块

use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

use crate::app::views;

/// 存储层错误
#[derive(Debug, Error)]
pub enum StoreError {
    /// 唯一约束冲突，携带冲突的表单字段名
    #[error("duplicate value for field `{0}`")]
    Duplicate(&'static str),
    #[error("unknown category {0}")]
    UnknownCategory(i32),
    #[cfg(feature = "database")]
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// HTTP 层错误类型
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Internal(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// 错误响应结构
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub code: u16,
    pub timestamp: String,
}

impl CoreError {
    pub fn status(&self) -> StatusCode {
        match self {
            CoreError::NotFound(_) => StatusCode::NOT_FOUND,
            CoreError::Store(StoreError::Duplicate(_)) => StatusCode::CONFLICT,
            CoreError::Store(StoreError::UnknownCategory(_)) => StatusCode::BAD_REQUEST,
            CoreError::Internal(_) | CoreError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn kind(&self) -> &'static str {
        match self.status() {
            StatusCode::BAD_REQUEST => "BAD_REQUEST",
            StatusCode::NOT_FOUND => "NOT_FOUND",
            StatusCode::CONFLICT => "CONFLICT",
            _ => "INTERNAL_SERVER_ERROR",
        }
    }

    /// 面向用户的消息，内部错误不暴露细节
    pub fn user_message(&self) -> String {
        if self.status().is_server_error() {
            error!(error = %self, "request failed");
            "Error interno del servidor.".to_string()
        } else {
            self.to_string()
        }
    }
}

impl IntoResponse for CoreError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = ErrorResponse {
            error: self.kind().to_string(),
            message: self.user_message(),
            code: status.as_u16(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        };

        (status, Json(body)).into_response()
    }
}

/// 页面路由的错误，渲染为 HTML 而不是 JSON
#[derive(Debug)]
pub struct PageError(pub CoreError);

impl From<CoreError> for PageError {
    fn from(err: CoreError) -> Self {
        PageError(err)
    }
}

impl From<StoreError> for PageError {
    fn from(err: StoreError) -> Self {
        PageError(CoreError::Store(err))
    }
}

impl IntoResponse for PageError {
    fn into_response(self) -> Response {
        let status = self.0.status();
        let page = views::error_page(status, &self.0.user_message());
        (status, Html(page)).into_response()
    }
}
