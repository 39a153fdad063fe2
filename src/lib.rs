//! # 系统词库生成
//!
//! 把带行内拼音标注的中文词表转换为两张反向索引，写入键值数据库供输入法查询：
//! - 前缀索引: 词的前 2 个字 → 完整词
//! - 拼音对索引: 前 2 个字的拼音 `a_b` → 前缀

pub mod config;
pub mod error;
pub mod index;
pub mod persist;
pub mod pipeline;
pub mod resolver;
pub mod snapshot;
pub mod store;
pub mod tokenizer;

pub use error::{Error, Result};
