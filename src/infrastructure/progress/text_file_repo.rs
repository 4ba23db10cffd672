//! テキストファイル版 ProgressRepository 実装
//!
//! 1 行 1 語。`#` で始まる行はバッチ見出しのコメントとして無視する。
use crate::domain::progress::{ProgressRepository, new_entries};
use std::collections::BTreeSet;
use std::fs::{self, OpenOptions};
use std::io::{self, Result, Write};
use std::path::{Path, PathBuf};

pub const DEFAULT_PROGRESS_FILE: &str = "added_words.txt";

pub struct TextFileProgressRepo {
    path: PathBuf,
}

impl TextFileProgressRepo {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ProgressRepository for TextFileProgressRepo {
    fn load(&self) -> Result<BTreeSet<String>> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(BTreeSet::new()),
            Err(e) => return Err(e),
        };
        Ok(text
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty() && !l.starts_with('#'))
            .map(str::to_string)
            .collect())
    }

    fn append(&self, batch_label: Option<&str>, words: &[String]) -> Result<Vec<String>> {
        let existing = self.load()?;
        let added = new_entries(&existing, words);
        if added.is_empty() {
            return Ok(added);
        }

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        // 既存ファイルが改行で終わっていない場合に備える
        let needs_newline = fs::read(&self.path)
            .map(|bytes| bytes.last().is_some_and(|b| *b != b'\n'))
            .unwrap_or(false);

        let mut buf = String::new();
        if needs_newline {
            buf.push('\n');
        }
        if let Some(label) = batch_label {
            buf.push_str(&format!("# {}\n", label));
        }
        for word in &added {
            buf.push_str(word);
            buf.push('\n');
        }

        let mut f = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        f.write_all(buf.as_bytes())?;
        f.flush()?;
        Ok(added)
    }

    fn location(&self) -> PathBuf {
        self.path.clone()
    }
}
