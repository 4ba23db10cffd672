//! 単語解析プロンプトと応答のデコード
//!
//! 生成サービスには JSON のみを返すよう指示し、返ってきたテキストから
//! 最初の JSON オブジェクトを取り出して `WordEntry` に変換します。

use crate::domain::{ExampleSentence, Grammar, PartOfSpeech, WordEntry};
use crate::error::{AnkiVocabError, Result};
use serde::Deserialize;
use serde_json::Value;

pub const SYSTEM_PROMPT: &str = "You are a helpful German language assistant. You respond only in valid JSON without any additional formatting. Provide accurate grammatical information and natural example sentences.";

/// 入力語に対するユーザープロンプト
pub fn build_prompt(word: &str, max_sentences: usize) -> String {
    format!(
        r#"Analyze the input '{word}' and provide:
1. Detect if this is German or English (even if misspelled)
2. Correct any spelling mistakes and provide the proper German word/phrase
3. English translation
4. Word type (noun, verb, adjective, etc.)
5. Grammar information:
   - If noun: definite article (der/die/das) and plural form
   - If verb: present tense (ich/du/er forms), past tense (ich form), and perfect tense (ich form)
   - If adjective: basic forms and any irregular declensions
6. {max_sentences} B1-level example sentences in German with English translations. Illustrate the various forms, meanings and usage as best you can in simple examples.

IMPORTANT: Always output a valid, commonly used German word/phrase. If the input is unclear, make your best guess at what the user intended.

Return as JSON with this structure:
{{
  "source_language": "de|en",
  "german": "corrected German word/phrase",
  "english": "English translation",
  "word_type": "noun|verb|adjective|etc",
  "grammar": {{
    "article": "der|die|das (for nouns only)",
    "plural": "plural form (for nouns only)",
    "present": "ich forme, du formst, er formt (for verbs only)",
    "past": "ich formte (for verbs only)",
    "perfect": "ich habe geformt (for verbs only)",
    "adjective_forms": "basic forms like 'schön, schöner, am schönsten' (for adjectives only)"
  }},
  "sentences": [{{"example": "German text", "translation": "English text"}}]
}}"#
    )
}

#[derive(Debug, Deserialize)]
struct WordInfo {
    #[serde(default)]
    source_language: Option<String>,
    #[serde(default)]
    german: String,
    #[serde(default)]
    english: String,
    #[serde(default)]
    word_type: String,
    #[serde(default)]
    grammar: Option<Value>,
    #[serde(default)]
    sentences: Vec<SentenceInfo>,
}

/// 文法欄は形が揺れるので値のまま受け取る (文字列 / 配列 / null)
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct GrammarInfo {
    article: Option<Value>,
    plural: Option<Value>,
    present: Option<Value>,
    past: Option<Value>,
    perfect: Option<Value>,
    adjective_forms: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct SentenceInfo {
    #[serde(default)]
    example: String,
    #[serde(default)]
    translation: String,
}

/// コードフェンスや前後の文章を除いて JSON オブジェクト部分を取り出す
fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty() && !v.eq_ignore_ascii_case("null"))
}

/// 文法欄の値を表示用テキストにする。配列は `, ` で連結、それ以外は無視。
fn grammar_text(value: Option<Value>) -> Option<String> {
    match value? {
        Value::String(s) => non_empty(Some(s)),
        Value::Array(items) => {
            let parts: Vec<String> = items
                .into_iter()
                .filter_map(|item| match item {
                    Value::String(s) => non_empty(Some(s)),
                    _ => None,
                })
                .collect();
            (!parts.is_empty()).then(|| parts.join(", "))
        }
        _ => None,
    }
}

/// 生成サービスの応答テキストを `WordEntry` に変換する
pub fn parse_word_info(raw_input: &str, text: &str) -> Result<WordEntry> {
    let json = extract_json_object(text)
        .ok_or_else(|| AnkiVocabError::ParseError("no JSON object in response".into()))?;
    let info: WordInfo = serde_json::from_str(json)
        .map_err(|e| AnkiVocabError::ParseError(format!("invalid JSON: {}", e)))?;

    let headword = info.german.trim().to_string();
    if headword.is_empty() {
        return Err(AnkiVocabError::ParseError("missing field `german`".into()));
    }
    let translation = info.english.trim().to_string();
    if translation.is_empty() {
        return Err(AnkiVocabError::ParseError("missing field `english`".into()));
    }

    let examples: Vec<ExampleSentence> = info
        .sentences
        .into_iter()
        .filter(|s| !s.example.trim().is_empty())
        .map(|s| ExampleSentence {
            text: s.example.trim().to_string(),
            translation: s.translation.trim().to_string(),
            audio: None,
        })
        .collect();
    if examples.is_empty() {
        return Err(AnkiVocabError::ParseError(
            "missing example sentences".into(),
        ));
    }

    // オブジェクト以外 (null / 文字列など) は文法情報なしとして扱う
    let g: GrammarInfo = match info.grammar {
        Some(v @ Value::Object(_)) => serde_json::from_value(v).unwrap_or_default(),
        _ => GrammarInfo::default(),
    };
    Ok(WordEntry {
        raw_input: raw_input.to_string(),
        headword,
        source_language: non_empty(info.source_language),
        part_of_speech: PartOfSpeech::parse(&info.word_type),
        translation,
        grammar: Grammar {
            article: grammar_text(g.article),
            plural: grammar_text(g.plural),
            present: grammar_text(g.present),
            past: grammar_text(g.past),
            perfect: grammar_text(g.perfect),
            adjective_forms: grammar_text(g.adjective_forms),
        },
        examples,
        headword_audio: None,
    })
}
