//! # inventario
//!
//! 商品库存管理 Web 应用：
//! - 商品的增删改查、搜索与 JSON 导出
//! - 用户注册、登录与基于签名 cookie 的会话
//! - PostgreSQL 与内存两种存储后端

pub mod app;
pub mod config;
pub mod core;
pub mod infrastructure;

pub use app::{create_router, AppState};
pub use config::Config;
