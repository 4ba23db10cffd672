//! 単語エントリ – ドメイン層
//!
//! 生成サービスが返した情報を型付きで保持します。Word Resolver が作成し、
//! Audio Synthesizer が音声を付け、Deck Builder が消費します。

use std::fmt;

/// 1 単語エントリ
#[derive(Debug, Clone, PartialEq)]
pub struct WordEntry {
    pub raw_input: String,               // 入力ファイルの行
    pub headword: String,                // 訂正済みドイツ語見出し語
    pub source_language: Option<String>, // 入力の言語 (de / en)
    pub part_of_speech: PartOfSpeech,
    pub translation: String, // 英訳
    pub grammar: Grammar,
    pub examples: Vec<ExampleSentence>,
    pub headword_audio: Option<AudioClip>,
}

impl WordEntry {
    /// 最初の例文
    pub fn example_sentence(&self) -> Option<&str> {
        self.examples.first().map(|e| e.text.as_str())
    }

    /// 発音用テキスト。名詞は冠詞付きで読み上げる。
    pub fn spoken_headword(&self) -> String {
        match (&self.part_of_speech, &self.grammar.article) {
            (PartOfSpeech::Noun, Some(article))
                if !self.headword.starts_with(&format!("{} ", article)) =>
            {
                format!("{} {}", article, self.headword)
            }
            _ => self.headword.clone(),
        }
    }

    /// 音声ファイル名に使うスラッグ
    pub fn media_stem(&self) -> String {
        let stem: String = self
            .headword
            .to_lowercase()
            .chars()
            .map(|c| if c.is_alphanumeric() { c } else { '_' })
            .collect();
        let stem = stem.trim_matches('_');
        if stem.is_empty() {
            "word".to_string()
        } else {
            stem.to_string()
        }
    }

    /// 音声付きクリップの数
    pub fn audio_count(&self) -> usize {
        let examples = self.examples.iter().filter(|e| e.audio.is_some()).count();
        examples + usize::from(self.headword_audio.is_some())
    }
}

/// 例文とその英訳
#[derive(Debug, Clone, PartialEq)]
pub struct ExampleSentence {
    pub text: String,
    pub translation: String,
    pub audio: Option<AudioClip>,
}

/// 合成済み音声 (MP3)
#[derive(Clone, PartialEq, Eq)]
pub struct AudioClip {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl fmt::Debug for AudioClip {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AudioClip")
            .field("file_name", &self.file_name)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// 品詞
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PartOfSpeech {
    Noun,
    Verb,
    Adjective,
    Other(String),
}

impl PartOfSpeech {
    pub fn parse(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "noun" | "substantiv" | "nomen" => PartOfSpeech::Noun,
            "verb" => PartOfSpeech::Verb,
            "adjective" | "adjektiv" => PartOfSpeech::Adjective,
            other => PartOfSpeech::Other(other.to_string()),
        }
    }
}

impl fmt::Display for PartOfSpeech {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PartOfSpeech::Noun => write!(f, "noun"),
            PartOfSpeech::Verb => write!(f, "verb"),
            PartOfSpeech::Adjective => write!(f, "adjective"),
            PartOfSpeech::Other(s) if s.is_empty() => write!(f, "unknown"),
            PartOfSpeech::Other(s) => write!(f, "{}", s),
        }
    }
}

/// 文法情報。品詞ごとに該当する項目のみ埋まる。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Grammar {
    pub article: Option<String>,
    pub plural: Option<String>,
    pub present: Option<String>,
    pub past: Option<String>,
    pub perfect: Option<String>,
    pub adjective_forms: Option<String>,
}

impl Grammar {
    /// カード裏面に表示する文法メモ
    pub fn notes(&self, pos: &PartOfSpeech, headword: &str) -> Vec<String> {
        let mut notes = Vec::new();
        match pos {
            PartOfSpeech::Noun => {
                if let Some(article) = &self.article {
                    notes.push(format!("{} {}", article, headword));
                    if let Some(plural) = &self.plural {
                        notes.push(format!("Plural: {}", plural));
                    }
                }
            }
            PartOfSpeech::Verb => {
                if let Some(present) = &self.present {
                    notes.push(format!("Present: {}", present));
                }
                if let Some(past) = &self.past {
                    notes.push(format!("Past: {}", past));
                }
                if let Some(perfect) = &self.perfect {
                    notes.push(format!("Perfect: {}", perfect));
                }
            }
            PartOfSpeech::Adjective => {
                if let Some(forms) = &self.adjective_forms {
                    notes.push(format!("Forms: {}", forms));
                }
            }
            PartOfSpeech::Other(_) => {}
        }
        notes
    }
}
