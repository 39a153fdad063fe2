//! # 数据库元数据
//!
//! 所有词库批次提交成功后才写入，读取方据此判断数据库是否完整：
//! 元数据不存在 = 生成未完成，不可信。

use log::info;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::store::{Key, KvStore, Value};

pub const DB_VERSION: &str = "pmim_sys_db version 0.1.0";

/// 运行环境
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuntimeInfo {
    pub name: String,
    pub version: String,
    pub os: String,
    pub arch: String,
}

impl RuntimeInfo {
    pub fn current() -> Self {
        Self {
            name: "rust".into(),
            version: env!("CARGO_PKG_VERSION").into(),
            os: std::env::consts::OS.into(),
            arch: std::env::consts::ARCH.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotMetadata {
    /// 生成工具版本
    pub pmim: String,
    pub db_version: String,
    pub runtime: RuntimeInfo,
    /// 数据来源说明
    pub n: String,
    /// RFC 3339 (UTC)
    #[serde(rename = "_last_update")]
    pub last_update: String,
    pub has_frequency_data: bool,
}

impl SnapshotMetadata {
    pub fn new(description: &str, db_version: &str) -> Self {
        Self {
            pmim: format!("pmim version {}", env!("CARGO_PKG_VERSION")),
            db_version: db_version.to_string(),
            runtime: RuntimeInfo::current(),
            n: description.to_string(),
            last_update: chrono::Utc::now().to_rfc3339(),
            has_frequency_data: false,
        }
    }

    pub fn key() -> Key {
        Key::new(&["pmim_db", "v"])
    }

    pub fn no_frequency_key() -> Key {
        Key::new(&["pmim_db", "sys_dict_nc"])
    }
}

/// 元数据与“无词频”标记在同一次提交中写入
pub fn write_snapshot<S: KvStore + ?Sized>(store: &mut S, meta: &SnapshotMetadata) -> Result<()> {
    info!("[Meta] 写入元数据: {} @ {}", meta.db_version, meta.last_update);
    let mut entries = Vec::with_capacity(2);
    if !meta.has_frequency_data {
        entries.push((SnapshotMetadata::no_frequency_key(), Value::Integer(1)));
    }
    entries.push((SnapshotMetadata::key(), Value::Metadata(meta.clone())));
    store.commit(entries)
}

/// 读取元数据，`None` 表示数据库未生成完成
pub fn read_snapshot<S: KvStore + ?Sized>(store: &S) -> Result<Option<SnapshotMetadata>> {
    match store.get(&SnapshotMetadata::key())? {
        Some(Value::Metadata(m)) => Ok(Some(m)),
        _ => Ok(None),
    }
}
