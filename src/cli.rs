use crate::application::{DEFAULT_OUTPUT_FILE, DeckOptions, RetryPolicy};
use crate::infrastructure::config::AppConfig;
use crate::infrastructure::progress::DEFAULT_PROGRESS_FILE;
use clap::Parser;
use std::path::PathBuf;

pub const DEFAULT_INPUT_FILE: &str = "new_words.txt";

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Generate German vocabulary Anki decks from a word list",
    after_help = "Input file format:\n  One word or phrase per line, German or English, typos allowed.\n  Lines starting with # are comments.\n\nWords already listed in the progress file are skipped."
)]
pub struct Cli {
    /// 1 行 1 語の入力ファイル
    #[arg(default_value = DEFAULT_INPUT_FILE)]
    pub input: PathBuf,

    /// 出力する Anki パッケージ
    #[arg(short, long, default_value = DEFAULT_OUTPUT_FILE)]
    pub output: PathBuf,

    /// 処理済み単語ログ
    #[arg(long, default_value = DEFAULT_PROGRESS_FILE)]
    pub progress: PathBuf,

    /// 音声ファイルをこのディレクトリにも保存
    #[arg(long)]
    pub audio_dir: Option<PathBuf>,

    /// 音声合成を行わない
    #[arg(long)]
    pub no_audio: bool,

    /// 1 語あたりの例文数
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..=10))]
    pub sentences: Option<u32>,

    /// Anki 上のデッキ名
    #[arg(long)]
    pub deck_name: Option<String>,

    /// 設定ファイル (JSON)
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl Cli {
    /// 設定ファイルの値に CLI 指定を上書きして実行オプションを作る
    pub fn deck_options(&self, config: &AppConfig) -> DeckOptions {
        DeckOptions {
            output_path: self.output.clone(),
            deck_name: self
                .deck_name
                .clone()
                .unwrap_or_else(|| config.deck_name.clone()),
            max_sentences: self
                .sentences
                .map(|n| n as usize)
                .unwrap_or(config.max_sentences)
                .max(1),
            retry: RetryPolicy {
                max_attempts: config.max_attempts,
                initial_backoff: config.initial_backoff(),
                multiplier: 2,
            },
            audio_dir: self.audio_dir.clone(),
        }
    }
}
