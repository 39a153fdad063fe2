//! # 词表行切分
//!
//! 输入格式：每行一个词，汉字后面可以紧跟该字的小写拼音，无分隔符。
//!
//! ```text
//! 你ni好hao
//! 世界jie
//! ```
//!
//! 拼音标注在汉字的**后面**：`pinyin[i]` 是紧跟 `characters[i]` 的字母串，
//! 空串表示该字没有标注，需要查拼音表。

/// 一行解析结果，`pinyin.len() == characters.len()`
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct WordRecord {
    pub characters: Vec<char>,
    pub pinyin: Vec<String>,
}

impl WordRecord {
    pub fn len(&self) -> usize {
        self.characters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.characters.is_empty()
    }

    /// 完整的词
    pub fn word(&self) -> String {
        self.characters.iter().collect()
    }
}

/// 切分一行。空行返回 `None`；没有汉字的行返回空记录。
pub fn split_line(line: &str) -> Option<WordRecord> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }

    let mut characters = Vec::new();
    let mut flushed: Vec<String> = Vec::new();
    let mut pending = String::new();

    // char 按 Unicode code point 迭代，不会拆开扩展区汉字
    for c in line.chars() {
        if c.is_ascii_lowercase() {
            pending.push(c);
        } else {
            characters.push(c);
            flushed.push(std::mem::take(&mut pending));
        }
    }
    flushed.push(pending);

    // 第一段是首字之前的字母，丢弃；其余整体前移一位
    let pinyin = flushed.into_iter().skip(1).collect();
    Some(WordRecord { characters, pinyin })
}

/// 解析整个词表，过滤空行和没有汉字的行。开头的 BOM 会被去掉。
pub fn parse_text(text: &str) -> Vec<WordRecord> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    text.lines()
        .filter_map(split_line)
        .filter(|r| !r.is_empty())
        .collect()
}

// ============================================================
// 测试
// ============================================================
