//! 注册、登录与会话

pub mod form;
pub mod handler;
pub mod model;
pub mod repository;
pub mod service;
