//! # 词库索引构建
//!
//! 两张反向索引：
//! - 前缀索引: `"你好"` → [你好, 你好吗, ...]（前缀 = 词的前 2 个字）
//! - 拼音对索引: `"ni_hao"` → [你好, 拟好, ...]（前 2 个字的拼音）
//!
//! ## 规则
//! - 少于 2 个字的词不收录
//! - 前 2 个字任一查不到拼音，整个词跳过（不做部分收录）
//! - 列表按输入行顺序追加，不去重
//! - 多音字：两个位置的候选读音做笛卡尔积，全部收录，不加权

use std::collections::BTreeMap;
use std::fmt;

use log::{info, warn};

use crate::error::Result;
use crate::resolver::PinyinResolver;
use crate::store::KvStore;
use crate::tokenizer::WordRecord;

// ============================================================
// 键
// ============================================================

/// `data.dict` 下的两类键。数据库里不带类型标记，读取时用 [`DictKey::classify`] 还原。
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum DictKey {
    Prefix(String),
    PinyinPair(String),
}

impl DictKey {
    pub fn pinyin_pair(first: &str, second: &str) -> Self {
        DictKey::PinyinPair(format!("{}_{}", first, second))
    }

    pub fn as_str(&self) -> &str {
        match self {
            DictKey::Prefix(s) | DictKey::PinyinPair(s) => s,
        }
    }

    /// `^[a-z]+_[a-z]+$` 为拼音对，其余为前缀
    pub fn classify(raw: &str) -> Self {
        let is_pair = match raw.split_once('_') {
            Some((a, b)) => {
                let lower = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_lowercase());
                lower(a) && lower(b)
            }
            None => false,
        };
        if is_pair {
            DictKey::PinyinPair(raw.to_string())
        } else {
            DictKey::Prefix(raw.to_string())
        }
    }
}

impl fmt::Display for DictKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================
// 构建
// ============================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildStats {
    /// 输入记录数
    pub records: usize,
    /// 收录的词数
    pub words: usize,
    /// 不足 2 字
    pub ignored_short: usize,
    /// 查不到拼音
    pub ignored_unresolved: usize,
}

/// 键按字典序排列，分批写入时每批包含哪些键与运行次数无关
#[derive(Debug, Default)]
pub struct DictIndex {
    /// 前缀 → 词
    pub prefixes: BTreeMap<String, Vec<String>>,
    /// 拼音对 → 前缀
    pub pinyin_pairs: BTreeMap<String, Vec<String>>,
    pub stats: BuildStats,
}

impl DictIndex {
    /// 两张表的全部条目，带类型标记。先全部前缀，再全部拼音对。
    pub fn entries(&self) -> impl Iterator<Item = (DictKey, &Vec<String>)> {
        let p = self.prefixes.iter().map(|(k, v)| (DictKey::Prefix(k.clone()), v));
        let pp = self.pinyin_pairs.iter().map(|(k, v)| (DictKey::PinyinPair(k.clone()), v));
        p.chain(pp)
    }

    pub fn words(&self, prefix: &str) -> &[String] {
        self.prefixes.get(prefix).map(|v| v.as_slice()).unwrap_or(&[])
    }

    pub fn prefixes_for(&self, first: &str, second: &str) -> &[String] {
        let key = DictKey::pinyin_pair(first, second);
        self.pinyin_pairs.get(key.as_str()).map(|v| v.as_slice()).unwrap_or(&[])
    }
}

/// 第 `pos` 个字的候选读音：有标注用标注，否则查拼音表
fn candidates<S: KvStore + ?Sized>(
    record: &WordRecord,
    pos: usize,
    resolver: &mut PinyinResolver<'_, S>,
) -> Result<Option<Vec<String>>> {
    match record.pinyin.get(pos) {
        Some(p) if !p.is_empty() => Ok(Some(vec![p.clone()])),
        _ => resolver.resolve(record.characters[pos]),
    }
}

pub fn build<S: KvStore + ?Sized>(
    records: &[WordRecord],
    resolver: &mut PinyinResolver<'_, S>,
) -> Result<DictIndex> {
    info!("[Dict] 处理 {} 条记录", records.len());
    let mut index = DictIndex::default();
    index.stats.records = records.len();

    for record in records {
        if record.len() < 2 {
            index.stats.ignored_short += 1;
            continue;
        }
        let prefix: String = record.characters[..2].iter().collect();

        let p0 = candidates(record, 0, resolver)?;
        let p1 = candidates(record, 1, resolver)?;
        let (p0, p1) = match (p0, p1) {
            (Some(a), Some(b)) => (a, b),
            _ => {
                warn!("[Dict] 忽略词 (无拼音): {}", record.word());
                index.stats.ignored_unresolved += 1;
                continue;
            }
        };

        index.stats.words += 1;
        index.prefixes.entry(prefix.clone()).or_default().push(record.word());

        // TODO 多音字按词上下文选读音，目前全部组合都收录
        for a in &p0 {
            for b in &p1 {
                let key = DictKey::pinyin_pair(a, b);
                index.pinyin_pairs.entry(key.as_str().to_string()).or_default().push(prefix.clone());
            }
        }
    }

    info!("[Dict]   词数: {}", index.stats.words);
    info!("[Dict]   前缀 {}", index.prefixes.len());
    info!("[Dict]   拼音 -> 前缀 {}", index.pinyin_pairs.len());
    Ok(index)
}

// ============================================================
// 测试
// ============================================================
