//! グローバル環境変数設定
//!
//! 外部サービスの認証情報と接続先を一元管理。
//! プロセス起動時に一度だけ初期化し、以降はどこからでもアクセス可能。

use crate::error::{AnkiVocabError, Result};
use once_cell::sync::OnceCell;
use std::sync::Arc;

/// グローバル環境変数設定
static ENV_CONFIG: OnceCell<Arc<EnvConfig>> = OnceCell::new();

/// 既定の Anthropic API エンドポイント
pub const DEFAULT_ANTHROPIC_BASE_URL: &str = "https://api.anthropic.com";

/// 環境変数設定
#[derive(Debug, Clone, Default)]
pub struct EnvConfig {
    /// Anthropic APIキー
    pub anthropic_api_key: Option<String>,
    /// 使用するモデル名 (未指定なら AppConfig の値)
    pub anthropic_model: Option<String>,
    /// API のベース URL
    pub anthropic_base_url: Option<String>,
    /// XDG Config Home ディレクトリ
    pub xdg_config_home: Option<String>,
}

impl EnvConfig {
    /// 現在のプロセス環境から設定を読み取る
    pub fn from_env() -> Self {
        EnvConfig {
            anthropic_api_key: non_empty_var("ANTHROPIC_API_KEY"),
            anthropic_model: non_empty_var("ANTHROPIC_MODEL"),
            anthropic_base_url: non_empty_var("ANTHROPIC_BASE_URL"),
            xdg_config_home: non_empty_var("XDG_CONFIG_HOME"),
        }
    }

    /// 環境変数から設定を初期化
    ///
    /// 既に初期化済みの場合は何もせず既存の設定を返す。
    pub fn init() -> Arc<EnvConfig> {
        ENV_CONFIG
            .get_or_init(|| Arc::new(EnvConfig::from_env()))
            .clone()
    }

    /// 設定を取得。未初期化なら環境から初期化する。
    pub fn get() -> Arc<EnvConfig> {
        Self::init()
    }

    /// APIキーを取得。未設定なら設定エラー。
    pub fn require_api_key(&self) -> Result<&str> {
        self.anthropic_api_key.as_deref().ok_or_else(|| {
            AnkiVocabError::ConfigInitError(
                "ANTHROPIC_API_KEY not found in environment variables. \
                 Create a .env file with: ANTHROPIC_API_KEY=your-api-key"
                    .to_string(),
            )
        })
    }

    pub fn base_url(&self) -> &str {
        self.anthropic_base_url
            .as_deref()
            .unwrap_or(DEFAULT_ANTHROPIC_BASE_URL)
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
