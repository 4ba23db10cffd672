//! 統一エラーハンドリング
//!
//! パイプライン全体で使用するエラー型を定義します。
//! 致命的エラー (入出力) と単語単位のエラー (スキップ / 劣化して続行) を
//! 同じ列挙型で表し、呼び出し側が `is_fatal()` で扱いを決めます。

use std::path::PathBuf;
use thiserror::Error;

/// anki_vocab 全体で使用する統一エラー型
#[derive(Debug, Error)]
pub enum AnkiVocabError {
    // ========================================
    // 入力関連エラー (致命的)
    // ========================================
    #[error("Input file not found: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("Failed to read input file {}: {source}", path.display())]
    InputReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ========================================
    // 出力関連エラー (致命的)
    // ========================================
    #[error("Failed to write {}: {message}", path.display())]
    WriteError { path: PathBuf, message: String },

    // ========================================
    // 単語単位のエラー
    // ========================================
    #[error("Could not parse service response: {0}")]
    ParseError(String),

    #[error("Generation service error: {0}")]
    ServiceError(String),

    #[error("Audio synthesis failed: {0}")]
    AudioError(String),

    // ========================================
    // 設定関連エラー
    // ========================================
    #[error("Configuration initialization error: {0}")]
    ConfigInitError(String),

    #[error("System error: {0}")]
    SystemError(String),
}

/// 統一Result型エイリアス
pub type Result<T> = std::result::Result<T, AnkiVocabError>;

impl AnkiVocabError {
    /// 書き込み失敗を作成するヘルパー
    pub fn write(path: impl Into<PathBuf>, err: impl std::fmt::Display) -> Self {
        AnkiVocabError::WriteError {
            path: path.into(),
            message: err.to_string(),
        }
    }

    /// エラーが再試行可能かどうかを判定
    pub fn is_retryable(&self) -> bool {
        matches!(self, AnkiVocabError::ServiceError(_))
    }

    /// 実行全体を中断すべきエラーかどうか
    pub fn is_fatal(&self) -> bool {
        !matches!(
            self,
            AnkiVocabError::ParseError(_)
                | AnkiVocabError::ServiceError(_)
                | AnkiVocabError::AudioError(_)
        )
    }

    /// エラーの重要度レベルを取得
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            AnkiVocabError::AudioError(_) => ErrorSeverity::Warning,
            AnkiVocabError::ParseError(_) | AnkiVocabError::ServiceError(_) => {
                ErrorSeverity::Error
            }
            _ => ErrorSeverity::Fatal,
        }
    }
}

/// String からの変換
impl From<String> for AnkiVocabError {
    fn from(message: String) -> Self {
        AnkiVocabError::SystemError(message)
    }
}

impl From<&str> for AnkiVocabError {
    fn from(message: &str) -> Self {
        AnkiVocabError::SystemError(message.to_string())
    }
}

/// エラーの重要度レベル
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Warning,
    Error,
    Fatal,
}
