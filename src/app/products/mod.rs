//! 商品目录

pub mod form;
pub mod handler;
pub mod model;
pub mod repository;
pub mod service;
