//! 商品表单
//!
//! 字段都以字符串接收，以便把非法输入显示为表单错误而不是提取失败。

use serde::Deserialize;
use validator::{Validate, ValidationError};

use super::model::{ProductDraft, Producto};
use crate::core::form::{not_blank, validation_error};

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct ProductoForm {
    #[serde(default)]
    #[validate(
        custom(function = "not_blank"),
        length(max = 120, message = "El nombre no puede superar 120 caracteres.")
    )]
    pub nombre: String,

    #[serde(default)]
    #[validate(custom(function = "validate_cantidad"))]
    pub cantidad: String,

    #[serde(default)]
    #[validate(
        length(max = 20, message = "El precio no puede superar 20 caracteres."),
        custom(function = "validate_precio")
    )]
    pub precio: String,

    /// 分类 id，空字符串表示不关联分类
    #[serde(default)]
    #[validate(custom(function = "validate_categoria"))]
    pub categoria: String,
}

fn parse_cantidad(raw: &str) -> Option<i64> {
    raw.trim().parse().ok()
}

fn parse_precio(raw: &str) -> Option<f64> {
    raw.trim()
        .replace(',', ".")
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
}

fn validate_cantidad(value: &str) -> Result<(), ValidationError> {
    not_blank(value)?;
    match parse_cantidad(value) {
        None => Err(validation_error(
            "integer",
            "La cantidad debe ser un número entero.",
        )),
        Some(v) if v < 0 => Err(validation_error(
            "range",
            "La cantidad no puede ser negativa.",
        )),
        Some(v) if v > i64::from(i32::MAX) => {
            Err(validation_error("range", "La cantidad es demasiado grande."))
        }
        Some(_) => Ok(()),
    }
}

fn validate_precio(value: &str) -> Result<(), ValidationError> {
    not_blank(value)?;
    match parse_precio(value) {
        None => Err(validation_error("decimal", "El precio debe ser un número.")),
        Some(v) if v <= 0.0 => Err(validation_error(
            "range",
            "El precio debe ser mayor que cero.",
        )),
        Some(_) => Ok(()),
    }
}

fn validate_categoria(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() || value.trim().parse::<i32>().is_ok() {
        Ok(())
    } else {
        Err(validation_error("category", "Categoría inválida."))
    }
}

impl ProductoForm {
    /// 编辑页面的初始值
    pub fn from_product(producto: &Producto) -> Self {
        Self {
            nombre: producto.nombre.clone(),
            cantidad: producto.cantidad.to_string(),
            precio: producto.precio.to_string(),
            categoria: producto
                .categoria_id
                .map(|id| id.to_string())
                .unwrap_or_default(),
        }
    }

    /// 校验并转换为写入数据
    pub fn to_draft(&self) -> Result<ProductDraft, validator::ValidationErrors> {
        self.validate()?;

        // 校验通过后解析不会失败
        let cantidad = parse_cantidad(&self.cantidad)
            .and_then(|v| i32::try_from(v).ok())
            .unwrap_or_default();
        let precio = parse_precio(&self.precio).unwrap_or_default();
        let categoria_id = self.categoria.trim().parse::<i32>().ok();

        Ok(ProductDraft {
            nombre: self.nombre.trim().to_string(),
            cantidad,
            precio,
            categoria_id,
        })
    }
}
