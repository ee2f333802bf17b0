//! 表单校验结果

use std::borrow::Cow;
use std::collections::BTreeMap;

use thiserror::Error;
use validator::{ValidationError, ValidationErrors};

use super::error::StoreError;

/// 按字段分组的错误消息，字段名与表单 `name` 属性一致
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormErrors(BTreeMap<String, Vec<String>>);

impl FormErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(field: &str, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn field(&self, field: &str) -> &[String] {
        self.0.get(field).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<ValidationErrors> for FormErrors {
    fn from(err: ValidationErrors) -> Self {
        let mut errors = FormErrors::new();
        for (field, field_errors) in err.field_errors() {
            for error in field_errors.iter() {
                let message = error
                    .message
                    .as_ref()
                    .map(|msg| msg.to_string())
                    .unwrap_or_else(|| format!("Valor inválido ({}).", error.code));
                errors.add(&field, message);
            }
        }
        errors
    }
}

/// 表单提交失败的原因
#[derive(Debug, Error)]
pub enum SubmitError {
    /// 用户可修正的错误，重新渲染表单
    #[error("form rejected")]
    Invalid(FormErrors),
    #[error("record not found")]
    NotFound,
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("{0}")]
    Internal(String),
}

impl From<ValidationErrors> for SubmitError {
    fn from(err: ValidationErrors) -> Self {
        SubmitError::Invalid(err.into())
    }
}

/// 构造带提示消息的校验错误
pub fn validation_error(code: &'static str, message: &'static str) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(Cow::Borrowed(message));
    error
}

/// 必填校验：去除空白后不能为空
pub fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(validation_error("required", "Este campo es obligatorio."));
    }
    Ok(())
}
