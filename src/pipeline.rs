//! # 词库生成流程
//!
//! 读取词表 → 切分 → 补拼音 + 建索引 → 分批写入 → 元数据。
//! 单线程顺序执行；任一批次失败即中止，已提交的批次保留。

use std::path::Path;

use log::info;

use crate::config::BuildConfig;
use crate::error::Result;
use crate::index::{build, BuildStats};
use crate::persist::persist;
use crate::resolver::{PinyinResolver, ResolverStats};
use crate::snapshot::SnapshotMetadata;
use crate::store::KvStore;
use crate::tokenizer::{parse_text, WordRecord};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub build: BuildStats,
    pub resolver: ResolverStats,
    pub batches: usize,
}

/// 读取并解析词表。读取失败直接返回错误，此时尚未写入任何数据。
pub fn load_source(path: &Path) -> Result<Vec<WordRecord>> {
    info!("[Source] 读取 {:?}", path);
    let text = std::fs::read_to_string(path)?;
    let records = parse_text(&text);
    info!("[Source] {} 条有效记录", records.len());
    Ok(records)
}

/// 缺省的来源说明
pub fn default_description(source: &Path) -> String {
    let name = source
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| source.display().to_string());
    format!("胖喵拼音内置数据库 ({})", name)
}

pub fn run<S: KvStore + ?Sized>(
    store: &mut S,
    records: &[WordRecord],
    config: &BuildConfig,
    description: &str,
) -> Result<RunSummary> {
    let (index, resolver_stats) = {
        let mut resolver = PinyinResolver::load(&*store)?;
        let index = build(records, &mut resolver)?;
        (index, resolver.stats())
    };
    info!(
        "[Pinyin] 命中: 预加载 {}, 缓存 {}, 数据库 {}, 未找到 {}",
        resolver_stats.preload, resolver_stats.cache, resolver_stats.store, resolver_stats.miss
    );

    // 词表没有词频数据
    let meta = SnapshotMetadata::new(description, &config.db_version);
    let batches = persist(store, &index, &meta, config.batch_size)?;

    Ok(RunSummary { build: index.stats, resolver: resolver_stats, batches })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persist::{lookup_prefixes, lookup_words};
    use crate::resolver::PinyinTable;
    use crate::snapshot::read_snapshot;
    use crate::store::{FileStore, Key, MemoryStore, Value};
    use std::collections::HashMap;
    use std::io::Write;

    const WORDLIST: &str = "\
你ni好hao
你好hao吗ma
世界jie
行长
单
未知词

中zhong国guo
";

    fn seeded_store() -> MemoryStore {
        let mut store = MemoryStore::new();
        let mut cp = HashMap::new();
        cp.insert("行".to_string(), vec!["xing".to_string(), "hang".to_string()]);
        cp.insert("长".to_string(), vec!["chang".to_string(), "zhang".to_string()]);
        cp.insert("你".to_string(), vec!["ni".to_string()]);
        PinyinTable { cp }.save(&mut store, 16).unwrap();
        store
            .set(Key::new(&["data", "pinyin", "世"]), Value::Strings(vec!["shi".into()]))
            .unwrap();
        store
    }

    /// 只比较 data.dict，元数据带时间戳
    fn dict_contents(store: &MemoryStore) -> Vec<(Key, Value)> {
        let dict = Key::new(&["data", "dict"]);
        store.scan(&dict).map(|(k, v)| (k.clone(), v.clone())).collect()
    }

    #[test]
    fn test_end_to_end() {
        let mut store = seeded_store();
        let records = parse_text(WORDLIST);
        let summary = run(&mut store, &records, &BuildConfig::default(), "测试").unwrap();

        assert_eq!(summary.build.words, 5);
        assert_eq!(summary.build.ignored_short, 1);
        assert_eq!(summary.build.ignored_unresolved, 1);
        assert_eq!(summary.batches, 1);

        assert_eq!(lookup_words(&store, "你好").unwrap(), vec!["你好", "你好吗"]);
        assert_eq!(lookup_prefixes(&store, "ni", "hao").unwrap(), vec!["你好", "你好"]);
        assert_eq!(lookup_prefixes(&store, "shi", "jie").unwrap(), vec!["世界"]);
        assert_eq!(lookup_prefixes(&store, "hang", "zhang").unwrap(), vec!["行长"]);
        assert!(lookup_words(&store, "未知").unwrap().is_empty());

        let meta = read_snapshot(&store).unwrap().unwrap();
        assert_eq!(meta.n, "测试");
        assert!(!meta.has_frequency_data);
    }

    #[test]
    fn test_clean_runs_identical() {
        let records = parse_text(WORDLIST);
        let mut a = seeded_store();
        let mut b = seeded_store();
        run(&mut a, &records, &BuildConfig::default(), "x").unwrap();
        run(&mut b, &records, &BuildConfig::default(), "x").unwrap();
        assert_eq!(dict_contents(&a), dict_contents(&b));
    }

    #[test]
    fn test_rerun_does_not_duplicate() {
        let records = parse_text(WORDLIST);
        let mut store = seeded_store();
        run(&mut store, &records, &BuildConfig::default(), "x").unwrap();
        let first = dict_contents(&store);
        run(&mut store, &records, &BuildConfig::default(), "x").unwrap();
        assert_eq!(dict_contents(&store), first);
    }

    #[test]
    fn test_missing_source() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_source(&dir.path().join("none.txt")).is_err());
    }

    #[test]
    fn test_source_with_bom() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("bom.txt");
        std::fs::write(&src, "\u{feff}你ni好hao\n").unwrap();

        let records = load_source(&src).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].word(), "你好");
        assert_eq!(records[0].pinyin, vec!["ni", "hao"]);
    }

    #[test]
    fn test_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("words.txt");
        std::fs::File::create(&src).unwrap().write_all(WORDLIST.as_bytes()).unwrap();

        let db = dir.path().join("sys.db");
        let records = load_source(&src).unwrap();
        {
            let mut store = FileStore::open(&db).unwrap();
            let cfg = BuildConfig { batch_size: 2, ..BuildConfig::default() };
            let summary = run(&mut store, &records, &cfg, &default_description(&src)).unwrap();
            assert!(summary.batches > 1);
        }

        let store = FileStore::open(&db).unwrap();
        assert_eq!(lookup_words(&store, "中国").unwrap(), vec!["中国"]);
        let meta = read_snapshot(&store).unwrap().unwrap();
        assert!(meta.n.contains("words.txt"));
    }
}
