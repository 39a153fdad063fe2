//! # 配置管理
//!
//! 从 exe 同目录（其次当前目录）的 `config.toml` 加载。
//! 文件不存在时使用默认值；命令行参数不受配置影响。

use log::{info, warn};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::persist::DEFAULT_BATCH_SIZE;
use crate::snapshot::DB_VERSION;

/// 顶层配置
#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub build: BuildConfig,
}

/// 生成配置
#[derive(Debug, Deserialize, Clone)]
pub struct BuildConfig {
    /// 每个事务的最大条目数
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    /// 写入元数据的来源说明，缺省时按输入文件名生成
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default = "default_db_version")]
    pub db_version: String,
}

fn default_batch_size() -> usize { DEFAULT_BATCH_SIZE }
fn default_db_version() -> String { DB_VERSION.into() }

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            description: None,
            db_version: default_db_version(),
        }
    }
}

impl Config {
    /// 加载 config.toml，不存在或解析失败则用默认值
    pub fn load() -> Self {
        let Some(path) = Self::config_path() else {
            info!("[Config] config.toml 不存在, 使用默认配置");
            return Config::default();
        };
        match Self::from_file(&path) {
            Ok(cfg) => {
                info!("[Config] ✅ 已加载 {:?}", path);
                info!("[Config]   batch_size={}, db_version={}", cfg.build.batch_size, cfg.build.db_version);
                cfg
            }
            Err(e) => {
                warn!("[Config] ⚠ {}, 使用默认配置", e);
                Config::default()
            }
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml(&text)
    }

    pub fn from_toml(text: &str) -> Result<Self> {
        let cfg: Config = toml::from_str(text).map_err(|e| Error::Config(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    fn validate(&self) -> Result<()> {
        if self.build.batch_size == 0 {
            return Err(Error::Config("build.batch_size 必须大于 0".into()));
        }
        Ok(())
    }

    fn config_path() -> Option<PathBuf> {
        std::env::current_exe()
            .ok()
            .and_then(|p| p.parent().map(|d| d.join("config.toml")))
            .filter(|p| p.exists())
            .or_else(|| {
                let p = Path::new("config.toml");
                if p.exists() { Some(p.to_path_buf()) } else { None }
            })
    }
}
