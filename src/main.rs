//! anki_vocab CLI: 単語リストから Anki デッキを生成する。
//! 入力読み込み → 単語解決 → 音声合成 → デッキ書き出し → 処理済みログ追記
use anki_vocab::application::{DeckGenerationService, RunReport, SpeechSynthesizer};
use anki_vocab::cli::Cli;
use anki_vocab::domain::input::read_words;
use anki_vocab::error::Result;
use anki_vocab::infrastructure::config::AppConfig;
use anki_vocab::infrastructure::external::{AnthropicWordResolver, GoogleTtsClient};
use anki_vocab::infrastructure::progress::TextFileProgressRepo;
use anki_vocab::utils::config::EnvConfig;
use anki_vocab::utils::env::load_env;
use clap::Parser;
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    // .env 読み込み (RUST_LOG もここで拾えるようにロガーより先)
    let env_loaded = load_env();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    if let Err(e) = env_loaded {
        log::warn!("{}", e);
    }

    let cli = Cli::parse();

    match run(cli).await {
        Ok(report) => {
            println!("\n{}", report);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<RunReport> {
    let env = EnvConfig::init();
    let config = match &cli.config {
        Some(path) => AppConfig::load_from(path),
        None => AppConfig::load(),
    };

    println!("Reading words from {}...", cli.input.display());
    let words = read_words(&cli.input)?;
    println!("Found {} words in input.", words.len());

    let resolver = AnthropicWordResolver::from_env(&env, config.effective_model(&env))?;
    log::info!("using model {}", resolver.model());

    let synthesizer: Option<Box<dyn SpeechSynthesizer>> = if cli.no_audio {
        None
    } else {
        Some(Box::new(GoogleTtsClient::new(
            config.tts_url.as_str(),
            config.tts_lang.as_str(),
        )?))
    };

    let service = DeckGenerationService::new(
        Box::new(resolver),
        synthesizer,
        Box::new(TextFileProgressRepo::new(cli.progress.clone())),
    );
    service.run(&words, &cli.deck_options(&config)).await
}
