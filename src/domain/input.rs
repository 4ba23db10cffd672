//! 入力ファイル読み込み – ドメイン層
//!
//! 1 行 1 語のテキストから処理対象の語リストを作ります。
//! 空行とコメントを捨て、重複を除き、出現順を保ちます。

use crate::error::{AnkiVocabError, Result};
use std::collections::{BTreeSet, HashSet};
use std::path::Path;

/// テキストを語リストへ変換する
pub fn parse_words(text: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    text.lines()
        .filter_map(clean_line)
        .filter(|w| seen.insert(w.clone()))
        .collect()
}

/// 1 行を正規化。捨てる行は None。
fn clean_line(line: &str) -> Option<String> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return None;
    }
    // `hause  # typo` のような行末コメント
    let word = match line.find(" #").or_else(|| line.find("\t#")) {
        Some(idx) => line[..idx].trim_end(),
        None => line,
    };
    if word.is_empty() {
        None
    } else {
        Some(word.to_string())
    }
}

/// 入力ファイルを読み込む。存在しなければ FileNotFound。
pub fn read_words(path: &Path) -> Result<Vec<String>> {
    let text = std::fs::read_to_string(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => AnkiVocabError::FileNotFound(path.to_path_buf()),
        _ => AnkiVocabError::InputReadFailed {
            path: path.to_path_buf(),
            source: e,
        },
    })?;
    Ok(parse_words(&text))
}

/// 処理済みログに無い語だけを順序を保って返す
pub fn pending_words(words: &[String], processed: &BTreeSet<String>) -> Vec<String> {
    words
        .iter()
        .filter(|w| !processed.contains(w.as_str()))
        .cloned()
        .collect()
}
