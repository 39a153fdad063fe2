//! # 词库写入
//!
//! 两张索引合并到 `data.dict` 下，分批提交，最后写元数据。
//! 每个键整体覆盖（不与旧值合并），重复运行不会产生重复条目。

use log::info;

use crate::error::Result;
use crate::index::{DictIndex, DictKey};
use crate::snapshot::{write_snapshot, SnapshotMetadata};
use crate::store::{batch_set, Key, KvStore, Value};

pub const DEFAULT_BATCH_SIZE: usize = 1000;

/// 索引键 → 数据库键。两类键共用 `data.dict` 命名空间。
pub fn store_key(key: &DictKey) -> Key {
    match key {
        DictKey::Prefix(p) => Key::new(&["data", "dict", p.as_str()]),
        DictKey::PinyinPair(pp) => Key::new(&["data", "dict", pp.as_str()]),
    }
}

/// 写入两张索引，成功后写元数据
pub fn persist<S: KvStore + ?Sized>(
    store: &mut S,
    index: &DictIndex,
    meta: &SnapshotMetadata,
    batch_size: usize,
) -> Result<usize> {
    let entries: Vec<(Key, Value)> = index
        .entries()
        .map(|(k, v)| (store_key(&k), Value::Strings(v.clone())))
        .collect();
    info!("[Persist] {} 个键, 每批 {}", entries.len(), batch_size);

    let batches = batch_set(store, entries, batch_size)?;
    write_snapshot(store, meta)?;
    Ok(batches)
}

// ============================================================
// 读取
// ============================================================

/// 前缀 → 词
pub fn lookup_words<S: KvStore + ?Sized>(store: &S, prefix: &str) -> Result<Vec<String>> {
    lookup(store, &DictKey::Prefix(prefix.to_string()))
}

/// 拼音对 → 前缀
pub fn lookup_prefixes<S: KvStore + ?Sized>(store: &S, first: &str, second: &str) -> Result<Vec<String>> {
    lookup(store, &DictKey::pinyin_pair(first, second))
}

fn lookup<S: KvStore + ?Sized>(store: &S, key: &DictKey) -> Result<Vec<String>> {
    Ok(store
        .get(&store_key(key))?
        .and_then(|v| v.as_strings().map(|s| s.to_vec()))
        .unwrap_or_default())
}
