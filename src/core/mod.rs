//! 跨模块共享的 HTTP 基础设施

pub mod error;
pub mod flash;
pub mod form;
pub mod middleware;
pub mod response;
pub mod session;
