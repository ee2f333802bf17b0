//! 应用配置
//!
//! 配置按以下顺序叠加：内置默认值 → TOML 配置文件 → 环境变量（支持 `.env`）。

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

/// 默认配置文件名
pub const DEFAULT_CONFIG_FILE: &str = "inventario.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("无法读取配置文件 {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("配置文件格式错误: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("配置项 {key} 的值无效: {value}")]
    InvalidValue { key: &'static str, value: String },
    #[error("使用 postgres 存储时必须设置 DATABASE_URL")]
    MissingDatabaseUrl,
}

/// 存储后端
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Postgres,
    Memory,
}

impl FromStr for StorageBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(StorageBackend::Postgres),
            "memory" | "memoria" => Ok(StorageBackend::Memory),
            _ => Err(ConfigError::InvalidValue {
                key: "INVENTARIO_STORAGE",
                value: s.to_string(),
            }),
        }
    }
}

/// 应用配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub http: HttpConfig,
    pub storage: StorageConfig,
    pub auth: AuthConfig,
    pub logging: LoggingConfig,
    /// `ver-json` 页面读取的导出文件
    pub products_json: PathBuf,
}

/// HTTP 服务配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub bind_address: String,
    /// 请求超时时间（秒）
    pub timeout_seconds: u64,
}

/// 存储配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    pub database_url: Option<String>,
    pub max_connections: u32,
}

/// 认证配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// 签名 cookie 的密钥，至少 64 字节
    pub secret_key: Option<String>,
    pub bcrypt_cost: u32,
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// 日志级别 (trace, debug, info, warn, error)
    pub level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            http: HttpConfig::default(),
            storage: StorageConfig::default(),
            auth: AuthConfig::default(),
            logging: LoggingConfig::default(),
            products_json: PathBuf::from("productos.json"),
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:3000".to_string(),
            timeout_seconds: 30,
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::Postgres,
            database_url: None,
            max_connections: 10,
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            secret_key: None,
            bcrypt_cost: bcrypt::DEFAULT_COST,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl Config {
    /// 从配置文件和进程环境加载配置
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let explicit = std::env::var("INVENTARIO_CONFIG").ok();
        let path = PathBuf::from(explicit.as_deref().unwrap_or(DEFAULT_CONFIG_FILE));

        let base = if path.exists() {
            Self::from_file(&path)?
        } else if explicit.is_some() {
            return Err(ConfigError::Io {
                path,
                source: std::io::Error::from(std::io::ErrorKind::NotFound),
            });
        } else {
            Self::default()
        };

        base.with_env(|key| std::env::var(key).ok())
    }

    /// 读取 TOML 配置文件，缺省字段使用默认值
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(toml::from_str(&content)?)
    }

    /// 用环境变量覆盖配置，`lookup` 便于测试时注入
    pub fn with_env<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(bind) = lookup("INVENTARIO_BIND") {
            self.http.bind_address = bind;
        }
        if let Some(raw) = lookup("INVENTARIO_TIMEOUT_SECS") {
            self.http.timeout_seconds = parse_number("INVENTARIO_TIMEOUT_SECS", &raw)?;
        }
        if let Some(url) = lookup("DATABASE_URL") {
            self.storage.database_url = Some(url);
        }
        if let Some(raw) = lookup("INVENTARIO_STORAGE") {
            self.storage.backend = raw.parse()?;
        }
        if let Some(raw) = lookup("INVENTARIO_MAX_CONNECTIONS") {
            self.storage.max_connections = parse_number("INVENTARIO_MAX_CONNECTIONS", &raw)?;
        }
        if let Some(secret) = lookup("INVENTARIO_SECRET_KEY") {
            self.auth.secret_key = Some(secret);
        }
        if let Some(raw) = lookup("INVENTARIO_BCRYPT_COST") {
            self.auth.bcrypt_cost = parse_number("INVENTARIO_BCRYPT_COST", &raw)?;
        }
        if let Some(path) = lookup("INVENTARIO_PRODUCTS_JSON") {
            self.products_json = PathBuf::from(path);
        }
        if let Some(level) = lookup("INVENTARIO_LOG_LEVEL") {
            self.logging.level = level;
        }

        self.validate()?;
        Ok(self)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if !(4..=31).contains(&self.auth.bcrypt_cost) {
            return Err(ConfigError::InvalidValue {
                key: "INVENTARIO_BCRYPT_COST",
                value: self.auth.bcrypt_cost.to_string(),
            });
        }
        if self.storage.backend == StorageBackend::Postgres
            && self.storage.database_url.as_deref().map_or(true, str::is_empty)
        {
            return Err(ConfigError::MissingDatabaseUrl);
        }
        Ok(())
    }
}

fn parse_number<T: FromStr>(key: &'static str, raw: &str) -> Result<T, ConfigError> {
    raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key,
        value: raw.to_string(),
    })
}
