//! 処理済み単語ログの抽象 – ドメイン層

use std::collections::BTreeSet;
use std::io;
use std::path::PathBuf;

/// 処理済み単語ログ永続化 I/F
///
/// 追記専用。1 語は高々 1 回しか記録されない。
pub trait ProgressRepository: Send + Sync {
    /// 記録済みの語を読み込む。ファイルが無ければ空集合。
    fn load(&self) -> io::Result<BTreeSet<String>>;

    /// 語を追記する。`batch_label` はバッチ見出しのコメントとして書かれる。
    /// 戻り値は実際に追記された語。
    fn append(&self, batch_label: Option<&str>, words: &[String]) -> io::Result<Vec<String>>;

    /// エラーメッセージ用の保存先
    fn location(&self) -> PathBuf {
        PathBuf::from("<progress log>")
    }
}

/// 既存ログと重複しない語だけを、入力順かつ一意に選ぶ
pub fn new_entries(existing: &BTreeSet<String>, words: &[String]) -> Vec<String> {
    let mut seen = existing.clone();
    words
        .iter()
        .map(|w| w.trim())
        .filter(|w| !w.is_empty())
        .filter(|w| seen.insert(w.to_string()))
        .map(str::to_string)
        .collect()
}
