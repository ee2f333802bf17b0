//! 商品数据模型

use serde::{Deserialize, Serialize};

/// `productos` 表中的一行，附带所属分类的名称
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "database", derive(sqlx::FromRow))]
pub struct Producto {
    pub id: i32,
    pub nombre: String,
    pub cantidad: i32,
    pub precio: f64,
    /// 仅用于编辑表单，导出的 JSON 只带分类名称
    #[serde(default, skip_serializing)]
    pub categoria_id: Option<i32>,
    #[serde(default)]
    pub categoria: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "database", derive(sqlx::FromRow))]
pub struct Categoria {
    pub id: i32,
    pub nombre: String,
}

/// 已校验的写入数据
#[derive(Debug, Clone, PartialEq)]
pub struct ProductDraft {
    pub nombre: String,
    pub cantidad: i32,
    pub precio: f64,
    pub categoria_id: Option<i32>,
}

/// 搜索条件
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SearchCriterion {
    #[default]
    Nombre,
    Categoria,
    Id,
}

impl SearchCriterion {
    /// 未知取值退回按名称搜索
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "categoria" => SearchCriterion::Categoria,
            "id" => SearchCriterion::Id,
            _ => SearchCriterion::Nombre,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SearchCriterion::Nombre => "nombre",
            SearchCriterion::Categoria => "categoria",
            SearchCriterion::Id => "id",
        }
    }
}

/// 列表页的查询参数 `?q=&criterio=`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub q: Option<String>,
    #[serde(default)]
    pub criterio: Option<String>,
}

impl ListQuery {
    pub fn term(&self) -> &str {
        self.q.as_deref().map(str::trim).unwrap_or("")
    }

    pub fn criterion(&self) -> SearchCriterion {
        self.criterio
            .as_deref()
            .map(SearchCriterion::parse)
            .unwrap_or_default()
    }

    /// 空白搜索词等同于不过滤
    pub fn filter(&self) -> Option<ProductFilter> {
        let term = self.term();
        if term.is_empty() {
            return None;
        }
        Some(ProductFilter {
            term: term.to_string(),
            criterion: self.criterion(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductFilter {
    pub term: String,
    pub criterion: SearchCriterion,
}

impl ProductFilter {
    /// 按 id 搜索时的目标 id，非数字返回 `None`
    pub fn id(&self) -> Option<i32> {
        self.term.parse().ok()
    }

    /// `LIKE` 模式，转义通配符后按子串匹配
    pub fn like_pattern(&self) -> String {
        let mut pattern = String::with_capacity(self.term.len() + 2);
        pattern.push('%');
        for c in self.term.chars() {
            if matches!(c, '%' | '_' | '\\') {
                pattern.push('\\');
            }
            pattern.push(c);
        }
        pattern.push('%');
        pattern
    }

    /// 内存存储使用的匹配规则，与 SQL 查询保持一致（不区分大小写）
    pub fn matches(&self, producto: &Producto) -> bool {
        let needle = self.term.to_lowercase();
        match self.criterion {
            SearchCriterion::Nombre => producto.nombre.to_lowercase().contains(&needle),
            SearchCriterion::Categoria => producto
                .categoria
                .as_deref()
                .is_some_and(|c| c.to_lowercase().contains(&needle)),
            SearchCriterion::Id => self.id() == Some(producto.id),
        }
    }
}
