//! # 键值数据库
//!
//! 词库生成过程中唯一的持久化产物。各组件通过 [`KvStore`] 显式传入，
//! 测试时用 [`MemoryStore`] 替换。
//!
//! ## 键空间
//! - `data.preload.pinyin_tgh` → 预加载拼音表（分块 JSON，只读）
//! - `data.pinyin.<汉字>` → 单字拼音（只读）
//! - `data.dict.<前缀或拼音对>` → 词 / 前缀列表（本工具写入）
//! - `pmim_db.v` / `pmim_db.sys_dict_nc` → 元数据

use std::collections::BTreeMap;
use std::fmt;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use log::{debug, info};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

use crate::error::{Error, Result};
use crate::snapshot::SnapshotMetadata;

// ============================================================
// 键 & 值
// ============================================================

/// 分层键: `["data", "dict", "你好"]`
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Key(Vec<String>);

impl Key {
    pub fn new(parts: &[&str]) -> Self {
        Key(parts.iter().map(|p| p.to_string()).collect())
    }

    /// 追加一级，返回新键
    pub fn child(&self, part: &str) -> Self {
        let mut parts = self.0.clone();
        parts.push(part.to_string());
        Key(parts)
    }

    pub fn starts_with(&self, prefix: &Key) -> bool {
        self.0.starts_with(&prefix.0)
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join("."))
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Strings(Vec<String>),
    Integer(i64),
    Bytes(Vec<u8>),
    Metadata(SnapshotMetadata),
}

impl Value {
    pub fn as_strings(&self) -> Option<&[String]> {
        match self {
            Value::Strings(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Value::Integer(n) => Some(*n),
            _ => None,
        }
    }
}

// ============================================================
// 存储接口
// ============================================================

pub trait KvStore {
    fn get(&self, key: &Key) -> Result<Option<Value>>;

    /// 原子提交一批写入：要么全部可见，要么全部不可见
    fn commit(&mut self, entries: Vec<(Key, Value)>) -> Result<()>;

    fn set(&mut self, key: Key, value: Value) -> Result<()> {
        self.commit(vec![(key, value)])
    }
}

/// 内存数据库
#[derive(Default, Debug, Clone)]
pub struct MemoryStore {
    data: BTreeMap<Key, Value>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// 以 `prefix` 开头的全部条目
    pub fn scan<'a>(&'a self, prefix: &'a Key) -> impl Iterator<Item = (&'a Key, &'a Value)> + 'a {
        self.data.iter().filter(move |(k, _)| k.starts_with(prefix))
    }
}

impl KvStore for MemoryStore {
    fn get(&self, key: &Key) -> Result<Option<Value>> {
        Ok(self.data.get(key).cloned())
    }

    fn commit(&mut self, entries: Vec<(Key, Value)>) -> Result<()> {
        self.data.extend(entries);
        Ok(())
    }
}

/// 单文件数据库
///
/// 整个键空间常驻内存，每次提交后把快照（bincode）写入临时文件再原子替换，
/// 进程中途被杀时磁盘上保留最后一次成功提交的状态。
/// 每次提交都重写整个快照，写入量约为 总键数 × 批次数，换取逐批持久化。
pub struct FileStore {
    path: PathBuf,
    inner: MemoryStore,
}

impl FileStore {
    /// 打开数据库，文件不存在时视为空库
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let inner = if path.exists() {
            let bytes = std::fs::read(&path)?;
            let data: BTreeMap<Key, Value> = bincode::deserialize(&bytes)?;
            info!("[Store] 已打开 {:?}, {} 条记录", path, data.len());
            MemoryStore { data }
        } else {
            info!("[Store] {:?} 不存在, 新建空库", path);
            MemoryStore::new()
        };
        Ok(Self { path, inner })
    }

    pub fn snapshot(&self) -> &MemoryStore {
        &self.inner
    }

    fn flush(&self) -> Result<()> {
        let parent = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(parent)?;

        let mut temp_file = NamedTempFile::new_in(parent)?;
        {
            let mut writer = BufWriter::new(temp_file.as_file_mut());
            bincode::serialize_into(&mut writer, &self.inner.data)?;
            writer.flush()?;
        }
        temp_file.persist(&self.path).map_err(|e| e.error)?;
        Ok(())
    }
}

impl KvStore for FileStore {
    fn get(&self, key: &Key) -> Result<Option<Value>> {
        self.inner.get(key)
    }

    fn commit(&mut self, entries: Vec<(Key, Value)>) -> Result<()> {
        // 记录旧值，落盘失败时回滚内存状态
        let mut previous = Vec::with_capacity(entries.len());
        for (key, value) in entries {
            let old = self.inner.data.insert(key.clone(), value);
            previous.push((key, old));
        }

        if let Err(e) = self.flush() {
            for (key, old) in previous.into_iter().rev() {
                match old {
                    Some(v) => self.inner.data.insert(key, v),
                    None => self.inner.data.remove(&key),
                };
            }
            return Err(Error::Store(format!("提交失败 {:?}: {}", self.path, e)));
        }
        Ok(())
    }
}

// ============================================================
// 批量写入
// ============================================================

/// 按 `batch_size` 分批提交，每批独立成功。
///
/// 中途失败时已提交的批次保留，不做回滚。返回提交的批次数。
pub fn batch_set<S: KvStore + ?Sized>(
    store: &mut S,
    entries: Vec<(Key, Value)>,
    batch_size: usize,
) -> Result<usize> {
    if batch_size == 0 {
        return Err(Error::Config("batch_size 必须大于 0".into()));
    }

    let total = entries.len();
    let mut batches = 0;
    let mut iter = entries.into_iter().peekable();
    while iter.peek().is_some() {
        let batch: Vec<(Key, Value)> = iter.by_ref().take(batch_size).collect();
        let n = batch.len();
        store.commit(batch)?;
        batches += 1;
        debug!("[Store] 批次 {} 已提交 ({} 条)", batches, n);
    }
    info!("[Store] 共写入 {} 条, {} 个批次", total, batches);
    Ok(batches)
}

// ============================================================
// 分块 JSON
// ============================================================

/// 读取分块存储的 JSON 值。计数记录不存在时返回 `None`。
///
/// 布局: `key.n` = 块数，`key.0`, `key.1`, ... = 字节块
pub fn chunk_get<S, T>(store: &S, key: &Key) -> Result<Option<T>>
where
    S: KvStore + ?Sized,
    T: DeserializeOwned,
{
    let count = match store.get(&key.child("n"))? {
        None => return Ok(None),
        Some(v) => v.as_integer().ok_or_else(|| Error::CorruptChunk {
            key: key.to_string(),
            reason: "块数不是整数".into(),
        })?,
    };
    if count < 0 {
        return Err(Error::CorruptChunk { key: key.to_string(), reason: format!("块数为负: {}", count) });
    }

    let mut bytes = Vec::new();
    for i in 0..count {
        match store.get(&key.child(&i.to_string()))? {
            Some(Value::Bytes(b)) => bytes.extend_from_slice(&b),
            Some(_) => {
                return Err(Error::CorruptChunk { key: key.to_string(), reason: format!("第 {} 块类型错误", i) })
            }
            None => {
                return Err(Error::CorruptChunk { key: key.to_string(), reason: format!("缺少第 {} 块", i) })
            }
        }
    }
    Ok(Some(serde_json::from_slice(&bytes)?))
}

/// 把值编码为 JSON 后分块写入（一次提交）
pub fn chunk_set<S, T>(store: &mut S, key: &Key, value: &T, chunk_size: usize) -> Result<usize>
where
    S: KvStore + ?Sized,
    T: Serialize,
{
    if chunk_size == 0 {
        return Err(Error::Config("chunk_size 必须大于 0".into()));
    }

    let bytes = serde_json::to_vec(value)?;
    let mut entries: Vec<(Key, Value)> = bytes
        .chunks(chunk_size)
        .enumerate()
        .map(|(i, c)| (key.child(&i.to_string()), Value::Bytes(c.to_vec())))
        .collect();
    let count = entries.len();
    entries.push((key.child("n"), Value::Integer(count as i64)));
    store.commit(entries)?;
    Ok(count)
}

// ============================================================
// 测试
// ============================================================
