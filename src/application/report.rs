//! 1 回の実行結果の集計
use std::fmt;
use std::path::PathBuf;

/// カードになった語
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedCard {
    pub raw_input: String,
    pub headword: String,
    pub translation: String,
    pub part_of_speech: String,
    pub audio_clips: usize,
}

/// スキップ / 劣化した語と理由
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordIssue {
    pub word: String,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    /// 入力ファイル中の有効な語数
    pub total_words: usize,
    /// 処理済みログにより除外された語数
    pub already_processed: usize,
    pub created: Vec<CreatedCard>,
    /// 解決できずデッキに入らなかった語
    pub skipped: Vec<WordIssue>,
    /// 音声なしでデッキに入った語
    pub degraded: Vec<WordIssue>,
    /// 先行する語と同じ見出し語になり、カードを作らなかった語
    pub duplicates: Vec<WordIssue>,
    pub deck_path: Option<PathBuf>,
    /// 処理済みログに追記された語
    pub logged: Vec<String>,
}

impl RunReport {
    /// 何も書き出さなかったか
    pub fn is_noop(&self) -> bool {
        self.deck_path.is_none()
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Summary:")?;
        writeln!(f, "  Words in input: {}", self.total_words)?;
        writeln!(f, "  Already processed: {}", self.already_processed)?;
        writeln!(f, "  Successfully created: {} cards", self.created.len())?;
        if !self.skipped.is_empty() {
            writeln!(f, "  Skipped words:")?;
            for issue in &self.skipped {
                writeln!(f, "    - {}: {}", issue.word, issue.reason)?;
            }
        }
        if !self.degraded.is_empty() {
            writeln!(f, "  Added without (some) audio:")?;
            for issue in &self.degraded {
                writeln!(f, "    - {}: {}", issue.word, issue.reason)?;
            }
        }
        if !self.duplicates.is_empty() {
            writeln!(f, "  Duplicate headwords (no extra card):")?;
            for issue in &self.duplicates {
                writeln!(f, "    - {}: {}", issue.word, issue.reason)?;
            }
        }
        match &self.deck_path {
            Some(path) => writeln!(f, "  Deck saved as: {}", path.display())?,
            None => writeln!(f, "  No deck written")?,
        }
        if self.logged.is_empty() {
            write!(f, "  No new words added")
        } else {
            write!(f, "  New words added: {}", self.logged.len())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_lists_skipped_words() {
        let report = RunReport {
            total_words: 3,
            already_processed: 1,
            skipped: vec![WordIssue {
                word: "xyzzy".into(),
                reason: "invalid JSON".into(),
            }],
            ..Default::default()
        };
        let text = report.to_string();
        assert!(text.contains("- xyzzy: invalid JSON"));
        assert!(text.contains("No deck written"));
        assert!(report.is_noop());
        assert!(!text.contains("Duplicate headwords"));
    }
}
