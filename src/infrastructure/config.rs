//! 設定ファイル (JSON)
//!
//! `~/.config/anki_vocab/config.json` (プラットフォーム依存) または
//! `--config` で指定したファイルから読み込む。無い / 壊れている場合は既定値。
use crate::utils::config::EnvConfig;
use directories::ProjectDirs;
use serde::Deserialize;
use std::{fs, path::Path, path::PathBuf, time::Duration};

pub const DEFAULT_MODEL: &str = "claude-sonnet-4-20250514";
pub const DEFAULT_TTS_URL: &str = "https://translate.google.com/translate_tts";

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    /// Anki 上のデッキ名
    pub deck_name: String,
    /// 生成に使うモデル
    pub model: String,
    /// 1 語あたりの例文数
    pub max_sentences: usize,
    /// 生成サービスへの最大試行回数
    pub max_attempts: u32,
    /// 初回リトライまでの待ち時間 (ms)。以降は倍々。
    pub initial_backoff_ms: u64,
    /// 読み上げ言語
    pub tts_lang: String,
    /// 読み上げエンドポイント
    pub tts_url: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            deck_name: "German Vocabulary".to_string(),
            model: DEFAULT_MODEL.to_string(),
            max_sentences: 3,
            max_attempts: 3,
            initial_backoff_ms: 1000,
            tts_lang: "de".to_string(),
            tts_url: DEFAULT_TTS_URL.to_string(),
        }
    }
}

fn config_dir() -> Option<PathBuf> {
    let env = EnvConfig::get();
    if let Some(xdg_config_home) = &env.xdg_config_home {
        return Some(PathBuf::from(xdg_config_home).join("anki_vocab"));
    }
    ProjectDirs::from("com", "user", "anki_vocab").map(|p| p.config_dir().to_path_buf())
}

/// 既定の設定ファイルパス
pub fn default_config_path() -> Option<PathBuf> {
    config_dir().map(|d| d.join("config.json"))
}

impl AppConfig {
    /// 既定パスから読み込む
    pub fn load() -> Self {
        match default_config_path() {
            Some(path) => Self::load_from(&path),
            None => AppConfig::default(),
        }
    }

    /// 指定パスから読み込む。失敗時は警告を出して既定値。
    pub fn load_from(path: &Path) -> Self {
        let f = match fs::File::open(path) {
            Ok(f) => f,
            Err(_) => return AppConfig::default(),
        };
        match serde_json::from_reader(f) {
            Ok(cfg) => cfg,
            Err(e) => {
                log::warn!("ignoring invalid config {}: {}", path.display(), e);
                AppConfig::default()
            }
        }
    }

    /// 環境変数のモデル指定を優先する
    pub fn effective_model(&self, env: &EnvConfig) -> String {
        env.anthropic_model
            .clone()
            .unwrap_or_else(|| self.model.clone())
    }

    pub fn initial_backoff(&self) -> Duration {
        Duration::from_millis(self.initial_backoff_ms)
    }
}
