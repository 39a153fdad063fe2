//! # gen_sys_dict — 系统词库生成工具
//!
//! ```text
//! gen_sys_dict <输出数据库> <词表文件>
//! ```

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use log::info;

use sysdict::config::Config;
use sysdict::pipeline;
use sysdict::store::FileStore;

fn main() -> Result<()> {
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("info")
    ).init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 3 {
        bail!("用法: {} <输出数据库> <词表文件>", args.first().map(String::as_str).unwrap_or("gen_sys_dict"));
    }
    let output = PathBuf::from(&args[1]);
    let source = PathBuf::from(&args[2]);
    info!("[Main] {:?}", output);

    let config = Config::load();

    // 先读词表，失败时不触碰数据库
    let records = pipeline::load_source(&source)
        .with_context(|| format!("读取词表失败: {:?}", source))?;

    let mut store = FileStore::open(&output)
        .with_context(|| format!("打开数据库失败: {:?}", output))?;

    let description = config.build.description.clone()
        .unwrap_or_else(|| pipeline::default_description(&source));
    let summary = pipeline::run(&mut store, &records, &config.build, &description)
        .context("写入词库失败")?;

    info!(
        "[Main] ✅ 完成: {} 个词, 忽略 {} (不足 2 字) + {} (无拼音), {} 个批次",
        summary.build.words,
        summary.build.ignored_short,
        summary.build.ignored_unresolved,
        summary.batches
    );
    Ok(())
}
