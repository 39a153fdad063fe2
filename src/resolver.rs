//! # 单字拼音查询
//!
//! 词表里没有标注拼音的字，按以下顺序查找（命中即返回）：
//! 1. 预加载拼音表 `data.preload.pinyin_tgh`（启动时读入内存）
//! 2. 本次运行的缓存
//! 3. 数据库 `data.pinyin.<字>`（命中后写入缓存，不回写数据库）
//!
//! 多音字会返回多个读音，下游不区分（已知的近似处理）。

use std::collections::HashMap;

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::store::{chunk_get, chunk_set, Key, KvStore, Value};

/// 预加载表分块大小（字节）
pub const TABLE_CHUNK_SIZE: usize = 64 * 1024;

/// 预加载拼音表: `{ "cp": { "字": ["读音", ...] } }`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PinyinTable {
    #[serde(default)]
    pub cp: HashMap<String, Vec<String>>,
}

impl PinyinTable {
    pub fn key() -> Key {
        Key::new(&["data", "preload", "pinyin_tgh"])
    }

    /// 写入数据库（分块 JSON），返回块数
    pub fn save<S: KvStore + ?Sized>(&self, store: &mut S, chunk_size: usize) -> Result<usize> {
        chunk_set(store, &Self::key(), self, chunk_size)
    }

    pub fn get(&self, c: char) -> Option<&Vec<String>> {
        let mut buf = [0u8; 4];
        self.cp.get(&*c.encode_utf8(&mut buf))
    }
}

/// 各层命中次数
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolverStats {
    pub preload: usize,
    pub cache: usize,
    pub store: usize,
    pub miss: usize,
}

pub struct PinyinResolver<'s, S: KvStore + ?Sized> {
    store: &'s S,
    table: PinyinTable,
    cache: HashMap<char, Vec<String>>,
    stats: ResolverStats,
}

impl<'s, S: KvStore + ?Sized> PinyinResolver<'s, S> {
    /// 从数据库读取预加载表。表不存在时只警告，其余两层照常工作。
    pub fn load(store: &'s S) -> Result<Self> {
        let table = match chunk_get::<S, PinyinTable>(store, &PinyinTable::key())? {
            Some(t) => {
                info!("[Pinyin] 预加载拼音表: {} 个字", t.cp.len());
                t
            }
            None => {
                warn!("[Pinyin] ⚠ {} 不存在, 仅使用 data.pinyin", PinyinTable::key());
                PinyinTable::default()
            }
        };
        Ok(Self::with_table(store, table))
    }

    pub fn with_table(store: &'s S, table: PinyinTable) -> Self {
        Self { store, table, cache: HashMap::new(), stats: ResolverStats::default() }
    }

    /// 查询一个字的拼音，`None` 表示三层都查不到
    pub fn resolve(&mut self, c: char) -> Result<Option<Vec<String>>> {
        // 空列表视为未命中，与 data.pinyin 一致
        if let Some(p) = self.table.get(c).filter(|p| !p.is_empty()) {
            self.stats.preload += 1;
            return Ok(Some(p.clone()));
        }

        if let Some(p) = self.cache.get(&c) {
            self.stats.cache += 1;
            return Ok(Some(p.clone()));
        }

        let key = Key::new(&["data", "pinyin"]).child(&c.to_string());
        if let Some(Value::Strings(p)) = self.store.get(&key)? {
            if !p.is_empty() {
                debug!("[Pinyin] {} → {:?} (data.pinyin)", c, p);
                self.stats.store += 1;
                self.cache.insert(c, p.clone());
                return Ok(Some(p));
            }
        }

        self.stats.miss += 1;
        Ok(None)
    }

    pub fn stats(&self) -> ResolverStats {
        self.stats
    }
}

// ============================================================
// 测试
// ============================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn table(pairs: &[(&str, &[&str])]) -> PinyinTable {
        let mut cp = HashMap::new();
        for (c, p) in pairs {
            cp.insert(c.to_string(), p.iter().map(|s| s.to_string()).collect());
        }
        PinyinTable { cp }
    }

    fn strings(v: &[&str]) -> Value {
        Value::Strings(v.iter().map(|s| s.to_string()).collect())
    }

    #[test]
    fn test_preload_first() {
        let mut store = MemoryStore::new();
        store.set(Key::new(&["data", "pinyin", "你"]), strings(&["nii"])).unwrap();
        let mut r = PinyinResolver::with_table(&store, table(&[("你", &["ni"])]));
        assert_eq!(r.resolve('你').unwrap(), Some(vec!["ni".to_string()]));
        assert_eq!(r.stats().preload, 1);
    }

    #[test]
    fn test_store_then_cache() {
        let mut store = MemoryStore::new();
        store.set(Key::new(&["data", "pinyin", "行"]), strings(&["xing", "hang"])).unwrap();
        let mut r = PinyinResolver::with_table(&store, PinyinTable::default());

        let first = r.resolve('行').unwrap().unwrap();
        assert_eq!(first, vec!["xing", "hang"]);
        let second = r.resolve('行').unwrap().unwrap();
        assert_eq!(first, second);

        let s = r.stats();
        assert_eq!((s.store, s.cache, s.miss), (1, 1, 0));
    }

    #[test]
    fn test_miss() {
        let mut store = MemoryStore::new();
        store.set(Key::new(&["data", "pinyin", "空"]), strings(&[])).unwrap();
        store.set(Key::new(&["data", "pinyin", "数"]), Value::Integer(3)).unwrap();
        let mut r = PinyinResolver::with_table(&store, PinyinTable::default());
        assert_eq!(r.resolve('空').unwrap(), None);
        assert_eq!(r.resolve('数').unwrap(), None);
        assert_eq!(r.resolve('无').unwrap(), None);
        assert_eq!(r.stats().miss, 3);
    }

    #[test]
    fn test_empty_preload_falls_through() {
        let mut store = MemoryStore::new();
        store.set(Key::new(&["data", "pinyin", "你"]), strings(&["ni"])).unwrap();
        let mut r = PinyinResolver::with_table(&store, table(&[("你", &[]), ("好", &[])]));
        assert_eq!(r.resolve('你').unwrap(), Some(vec!["ni".to_string()]));
        assert_eq!(r.resolve('好').unwrap(), None);

        let s = r.stats();
        assert_eq!((s.preload, s.store, s.miss), (0, 1, 1));
    }

    #[test]
    fn test_load_from_chunks() {
        let mut store = MemoryStore::new();
        let t = table(&[("好", &["hao"]), ("𠮷", &["ji"])]);
        assert!(t.save(&mut store, 8).unwrap() > 1);

        let mut r = PinyinResolver::load(&store).unwrap();
        assert_eq!(r.resolve('\u{20BB7}').unwrap(), Some(vec!["ji".to_string()]));
        assert_eq!(r.resolve('好').unwrap(), Some(vec!["hao".to_string()]));
    }

    #[test]
    fn test_load_without_table() {
        let store = MemoryStore::new();
        let mut r = PinyinResolver::load(&store).unwrap();
        assert_eq!(r.resolve('你').unwrap(), None);
    }
}
