//! 基础设施：日志、数据库与存储实现

#[cfg(feature = "database")]
pub mod database;
pub mod logger;
pub mod memory;
#[cfg(feature = "database")]
pub mod postgres;
