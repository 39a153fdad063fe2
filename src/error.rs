//! # 错误类型
//!
//! 存储 / 编码 / 配置相关的致命错误。
//! 查不到拼音不是错误：只记日志并跳过该词（见 [`crate::index`]）。

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// 文件读写失败（输入词表、数据库文件）
    #[error("I/O 错误: {0}")]
    Io(#[from] std::io::Error),

    /// 存储层拒绝写入（批次提交失败等）
    #[error("存储错误: {0}")]
    Store(String),

    /// 数据库文件编解码失败
    #[error("编码错误: {0}")]
    Encode(#[from] bincode::Error),

    /// 分块 JSON 解析失败
    #[error("JSON 错误: {0}")]
    Json(#[from] serde_json::Error),

    /// 分块数据缺块或类型不符
    #[error("分块数据损坏: {key}: {reason}")]
    CorruptChunk { key: String, reason: String },

    /// 配置值非法
    #[error("配置错误: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, Error>;
