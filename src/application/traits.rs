//! Application層の抽象化トレイト定義
//! 外部サービスを抽象化し、テスト可能な構造を提供します

use crate::domain::WordEntry;
use crate::error::Result;
use async_trait::async_trait;

/// 単語の訂正・翻訳・例文生成の抽象化
#[async_trait]
pub trait WordResolver: Send + Sync {
    /// 入力語 1 つを解決する。音声は付かない状態で返す。
    async fn resolve(&self, raw_input: &str, max_sentences: usize) -> Result<WordEntry>;
}

/// 読み上げ音声合成の抽象化
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// テキストを MP3 バイト列に変換
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>>;
}
