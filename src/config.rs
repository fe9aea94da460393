use std::{env, fs};

use serde::Deserialize;

use crate::error::{Error, Result};

const PLACEHOLDER: &str = "placeholder";

/// 运行配置
///
/// 先读取 `FOLIO_CONFIG` 指向的 TOML 文件（可选），再用环境变量覆盖。
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub listen: String,
    pub site_url: String,
    pub baas: BaasConfig,
}

/// 托管后端（认证、对象存储）配置
#[derive(Debug, Clone, Default)]
pub struct BaasConfig {
    pub url: Option<String>,
    pub anon_key: Option<String>,
    pub service_key: Option<String>,
    pub bucket: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FileConfig {
    database_url: Option<String>,
    listen: Option<String>,
    site_url: Option<String>,
    baas: FileBaasConfig,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FileBaasConfig {
    url: Option<String>,
    anon_key: Option<String>,
    service_key: Option<String>,
    bucket: Option<String>,
}

impl Config {
    /// 从环境变量（及可选的配置文件）加载
    pub fn from_env() -> Result<Self> {
        let file = match env::var("FOLIO_CONFIG") {
            Ok(path) => toml::from_str(&fs::read_to_string(path)?)?,
            Err(_) => FileConfig::default(),
        };
        Self::resolve(file, |key| env::var(key).ok())
    }

    /// 从 TOML 文本加载，环境变量查找由 `lookup` 提供
    pub fn from_toml(content: &str, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        Self::resolve(toml::from_str(content)?, lookup)
    }

    fn resolve(file: FileConfig, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let pick = |key: &str, fallback: Option<String>| lookup(key).or(fallback);

        let database_url = pick("DATABASE_URL", file.database_url)
            .ok_or_else(|| Error::Config("`DATABASE_URL` not set".to_string()))?;

        Ok(Self {
            database_url,
            listen: pick("FOLIO_LISTEN", file.listen).unwrap_or_else(|| "0.0.0.0:3000".to_string()),
            site_url: pick("SITE_URL", file.site_url)
                .unwrap_or_else(|| "http://localhost:3000".to_string())
                .trim_end_matches('/')
                .to_string(),
            baas: BaasConfig {
                url: pick("BAAS_URL", file.baas.url).map(|u| u.trim_end_matches('/').to_string()),
                anon_key: pick("BAAS_ANON_KEY", file.baas.anon_key),
                service_key: pick("BAAS_SERVICE_KEY", file.baas.service_key),
                bucket: pick("FOLIO_BUCKET", file.baas.bucket)
                    .unwrap_or_else(|| "uploads".to_string()),
            },
        })
    }
}

impl BaasConfig {
    /// 认证是否已配置
    ///
    /// 地址与匿名 key 都存在且不含占位符时才算配置完成，
    /// 否则管理端处于开发模式。
    pub fn is_configured(&self) -> bool {
        let real = |v: &Option<String>| v.as_deref().is_some_and(|v| !v.contains(PLACEHOLDER));
        real(&self.url) && real(&self.anon_key)
    }
}
