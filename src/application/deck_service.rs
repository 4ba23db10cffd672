//! 単語リストからデッキを生成するサービス
//!
//! # 責任
//! - 処理済みログにある語の除外
//! - 語ごとの解決 (再試行付き) と音声合成
//! - デッキの書き出しと、成功時のみの処理済みログ更新
//!
//! 語ごとの失敗は `RunReport` に集めて処理を続け、
//! デッキやログの書き込み失敗だけが実行全体を中断する。

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::application::report::{CreatedCard, RunReport, WordIssue};
use crate::application::retry::RetryPolicy;
use crate::application::traits::{SpeechSynthesizer, WordResolver};
use crate::domain::input::pending_words;
use crate::domain::{AudioClip, ProgressRepository, WordEntry};
use crate::error::{AnkiVocabError, Result};
use crate::infrastructure::anki::AnkiDeckBuilder;
use crate::utils::profiling;

pub const DEFAULT_OUTPUT_FILE: &str = "generated_deck.apkg";

/// 1 回の実行オプション
#[derive(Clone, Debug)]
pub struct DeckOptions {
    pub output_path: PathBuf,
    pub deck_name: String,
    /// 1 語あたりの例文数
    pub max_sentences: usize,
    pub retry: RetryPolicy,
    /// 指定時は音声ファイルをここにも保存する
    pub audio_dir: Option<PathBuf>,
}

impl Default for DeckOptions {
    fn default() -> Self {
        Self {
            output_path: PathBuf::from(DEFAULT_OUTPUT_FILE),
            deck_name: "German Vocabulary".to_string(),
            max_sentences: 3,
            retry: RetryPolicy::default(),
            audio_dir: None,
        }
    }
}

/// デッキ生成サービス
pub struct DeckGenerationService {
    resolver: Box<dyn WordResolver>,
    /// None なら音声なしでデッキを作る
    synthesizer: Option<Box<dyn SpeechSynthesizer>>,
    progress: Box<dyn ProgressRepository>,
}

impl DeckGenerationService {
    pub fn new(
        resolver: Box<dyn WordResolver>,
        synthesizer: Option<Box<dyn SpeechSynthesizer>>,
        progress: Box<dyn ProgressRepository>,
    ) -> Self {
        Self {
            resolver,
            synthesizer,
            progress,
        }
    }

    /// 入力語リストを処理してデッキを書き出す
    pub async fn run(&self, words: &[String], options: &DeckOptions) -> Result<RunReport> {
        let overall_timer = profiling::Timer::start("run.total");
        let result = self.run_batch(words, options).await;
        let created = result.as_ref().map_or(0, |r| r.created.len());
        overall_timer.log_with(&format!("created={}", created));
        profiling::print_summary();
        result
    }

    async fn run_batch(&self, words: &[String], options: &DeckOptions) -> Result<RunReport> {
        let processed = self.progress.load().map_err(|e| {
            AnkiVocabError::SystemError(format!(
                "Failed to load progress log {}: {}",
                self.progress.location().display(),
                e
            ))
        })?;
        let pending = pending_words(words, &processed);

        let mut report = RunReport {
            total_words: words.len(),
            already_processed: words.len() - pending.len(),
            ..RunReport::default()
        };

        if pending.is_empty() {
            println!("All words are already processed. Nothing to do.");
            return Ok(report);
        }
        println!(
            "Found {} words to process ({} already added).",
            pending.len(),
            report.already_processed
        );

        let mut deck = AnkiDeckBuilder::new(&options.deck_name);
        // 同じ見出し語は 1 枚だけ (GUID が同じになるため)
        let mut headwords = HashSet::new();
        for (i, word) in pending.iter().enumerate() {
            println!("\nProcessing {}/{}: {}", i + 1, pending.len(), word);

            let mut entry = match self.resolve(word, options).await {
                Ok(entry) => entry,
                Err(e) => {
                    eprintln!("  ✗ Failed: {}", e);
                    report.skipped.push(WordIssue {
                        word: word.clone(),
                        reason: e.to_string(),
                    });
                    continue;
                }
            };

            if !headwords.insert(entry.headword.clone()) {
                println!("  = Duplicate of {}, already in this deck", entry.headword);
                report.duplicates.push(WordIssue {
                    word: word.clone(),
                    reason: format!("same headword as an earlier word: {}", entry.headword),
                });
                continue;
            }

            let mut warnings = self.attach_audio(&mut entry).await;
            if let Some(dir) = &options.audio_dir {
                if let Err(e) = save_clips(dir, &entry) {
                    log::warn!("could not save audio to {}: {}", dir.display(), e);
                    warnings.push(format!("saving audio to {}: {}", dir.display(), e));
                }
            }
            if !warnings.is_empty() {
                for w in &warnings {
                    eprintln!("  ! {}", w);
                }
                report.degraded.push(WordIssue {
                    word: word.clone(),
                    reason: warnings.join("; "),
                });
            }

            println!(
                "  ✓ Created: {} → {} ({})",
                entry.headword, entry.translation, entry.part_of_speech
            );
            deck.add(&entry);
            report.created.push(CreatedCard {
                raw_input: word.clone(),
                headword: entry.headword.clone(),
                translation: entry.translation.clone(),
                part_of_speech: entry.part_of_speech.to_string(),
                audio_clips: entry.audio_count(),
            });
        }

        if deck.is_empty() {
            println!("\nNo cards were created. Nothing to export.");
            return Ok(report);
        }

        println!("\nExporting deck...");
        let write_timer = profiling::Timer::start("deck.write");
        deck.write_to(&options.output_path)?;
        write_timer.log_with(&format!(
            "notes={} media={}",
            deck.len(),
            deck.media_count()
        ));
        println!("Deck exported as {}", options.output_path.display());
        report.deck_path = Some(options.output_path.clone());

        // デッキに入った語と、そのカードに重複した語を記録する
        let raw_words: Vec<String> = report
            .created
            .iter()
            .map(|c| c.raw_input.clone())
            .chain(report.duplicates.iter().map(|d| d.word.clone()))
            .collect();
        let label = options
            .output_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned());
        report.logged = self
            .progress
            .append(label.as_deref(), &raw_words)
            .map_err(|e| AnkiVocabError::write(self.progress.location(), e))?;

        Ok(report)
    }

    /// 再試行付きで 1 語を解決する
    async fn resolve(&self, word: &str, options: &DeckOptions) -> Result<WordEntry> {
        let timer = profiling::Timer::start("word.resolve");
        let resolver = self.resolver.as_ref();
        let max_sentences = options.max_sentences;
        let result = options
            .retry
            .run(word, move || resolver.resolve(word, max_sentences))
            .await;
        timer.log_with(&format!("word={:?}", word));

        let mut entry = result?;
        entry.raw_input = word.to_string();
        Ok(entry)
    }

    /// 見出し語と例文の音声を付ける。失敗は警告として返し、処理は続ける。
    async fn attach_audio(&self, entry: &mut WordEntry) -> Vec<String> {
        let Some(synth) = self.synthesizer.as_deref() else {
            return Vec::new();
        };
        let timer = profiling::Timer::start("word.audio");
        let stem = entry.media_stem();
        let mut warnings = Vec::new();

        match synth.synthesize(&entry.spoken_headword()).await {
            Ok(bytes) => {
                entry.headword_audio = Some(AudioClip {
                    file_name: format!("{}.mp3", stem),
                    bytes,
                })
            }
            Err(e) => warnings.push(format!("headword audio: {}", e)),
        }
        for (i, example) in entry.examples.iter_mut().enumerate() {
            match synth.synthesize(&example.text).await {
                Ok(bytes) => {
                    example.audio = Some(AudioClip {
                        file_name: format!("{}_ex{}.mp3", stem, i + 1),
                        bytes,
                    })
                }
                Err(e) => warnings.push(format!("example {} audio: {}", i + 1, e)),
            }
        }

        timer.log_with(&format!("clips={}", entry.audio_count()));
        warnings
    }
}

/// 音声クリップをディレクトリに保存する
fn save_clips(dir: &Path, entry: &WordEntry) -> std::io::Result<()> {
    let clips = entry
        .headword_audio
        .iter()
        .chain(entry.examples.iter().filter_map(|e| e.audio.as_ref()));
    std::fs::create_dir_all(dir)?;
    for clip in clips {
        std::fs::write(dir.join(&clip.file_name), &clip.bytes)?;
    }
    Ok(())
}
