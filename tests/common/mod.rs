#![allow(dead_code)]

use anki_vocab::application::{SpeechSynthesizer, WordResolver};
use anki_vocab::domain::{ExampleSentence, Grammar, PartOfSpeech, WordEntry};
use anki_vocab::error::{AnkiVocabError, Result};
use async_trait::async_trait;
use std::collections::HashSet;
use std::io::Read;
use std::path::Path;
use std::sync::{Arc, Mutex};

/// 呼び出しを記録するモック解決クライアント
///
/// `hund` → `Hund` のように先頭を大文字化して見出し語にする。
/// `fail_on` の語はパースエラー、`unavailable_on` の語はサービスエラーにする。
#[derive(Clone, Default)]
pub struct RecordingResolver {
    pub calls: Arc<Mutex<Vec<String>>>,
    pub fail_on: HashSet<String>,
    pub unavailable_on: HashSet<String>,
}

impl RecordingResolver {
    pub fn failing_on(words: &[&str]) -> Self {
        Self {
            fail_on: words.iter().map(|w| w.to_string()).collect(),
            ..Self::default()
        }
    }

    pub fn unavailable_on(words: &[&str]) -> Self {
        Self {
            unavailable_on: words.iter().map(|w| w.to_string()).collect(),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[async_trait]
impl WordResolver for RecordingResolver {
    async fn resolve(&self, raw_input: &str, max_sentences: usize) -> Result<WordEntry> {
        self.calls.lock().unwrap().push(raw_input.to_string());
        if self.fail_on.contains(raw_input) {
            return Err(AnkiVocabError::ParseError("invalid JSON".into()));
        }
        if self.unavailable_on.contains(raw_input) {
            return Err(AnkiVocabError::ServiceError("529 overloaded".into()));
        }
        let headword = capitalize(raw_input);
        Ok(WordEntry {
            raw_input: raw_input.to_string(),
            headword: headword.clone(),
            source_language: Some("de".into()),
            part_of_speech: PartOfSpeech::Noun,
            translation: format!("english for {}", headword),
            grammar: Grammar {
                article: Some("der".into()),
                ..Grammar::default()
            },
            examples: (1..=max_sentences)
                .map(|i| ExampleSentence {
                    text: format!("Satz {} mit {}.", i, headword),
                    translation: format!("Sentence {} with {}.", i, headword),
                    audio: None,
                })
                .collect(),
            headword_audio: None,
        })
    }
}

/// テキストをそのままバイト列にするモック音声合成
pub struct EchoSynth;

#[async_trait]
impl SpeechSynthesizer for EchoSynth {
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>> {
        Ok(text.as_bytes().to_vec())
    }
}

/// `.apkg` 内のノート
#[derive(Debug)]
pub struct StoredNote {
    pub guid: String,
    pub fields: Vec<String>,
    pub cards: i64,
}

/// `.apkg` を開いてノートとメディア一覧を読み出す
pub fn read_package(path: &Path) -> (Vec<StoredNote>, serde_json::Value) {
    let file = std::fs::File::open(path).expect("open apkg");
    let mut archive = zip::ZipArchive::new(file).expect("zip archive");

    let mut collection = Vec::new();
    archive
        .by_name("collection.anki2")
        .expect("collection entry")
        .read_to_end(&mut collection)
        .unwrap();
    let mut media = String::new();
    archive
        .by_name("media")
        .expect("media entry")
        .read_to_string(&mut media)
        .unwrap();

    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("collection.anki2");
    std::fs::write(&db_path, collection).unwrap();
    let conn = rusqlite::Connection::open(&db_path).unwrap();
    let mut stmt = conn
        .prepare(
            "SELECT n.guid, n.flds, (SELECT COUNT(*) FROM cards c WHERE c.nid = n.id) FROM notes n ORDER BY n.id",
        )
        .unwrap();
    let notes = stmt
        .query_map([], |row| {
            let flds: String = row.get(1)?;
            Ok(StoredNote {
                guid: row.get(0)?,
                fields: flds.split('\x1f').map(str::to_string).collect(),
                cards: row.get(2)?,
            })
        })
        .unwrap()
        .collect::<rusqlite::Result<Vec<_>>>()
        .unwrap();

    (notes, serde_json::from_str(&media).unwrap())
}
