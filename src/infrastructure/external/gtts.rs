//! Google 翻訳の読み上げエンドポイントを使った音声合成
//!
//! 1 リクエストあたりのテキスト長に上限があるため、長文は空白で分割し、
//! 返ってきた MP3 を順に連結する。
use crate::application::traits::SpeechSynthesizer;
use crate::error::{AnkiVocabError, Result};
use async_trait::async_trait;
use std::time::Duration;

/// 1 リクエストに載せる最大文字数
pub const MAX_CHUNK_CHARS: usize = 100;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0 Safari/537.36";

pub struct GoogleTtsClient {
    client: reqwest::Client,
    endpoint: String,
    lang: String,
}

impl GoogleTtsClient {
    pub fn new(endpoint: impl Into<String>, lang: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| AnkiVocabError::ConfigInitError(format!("HTTP client: {}", e)))?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
            lang: lang.into(),
        })
    }

    async fn fetch_chunk(&self, chunk: &str, idx: usize, total: usize) -> Result<Vec<u8>> {
        let idx = idx.to_string();
        let total = total.to_string();
        let textlen = chunk.chars().count().to_string();
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("ie", "UTF-8"),
                ("client", "tw-ob"),
                ("tl", self.lang.as_str()),
                ("q", chunk),
                ("idx", idx.as_str()),
                ("total", total.as_str()),
                ("textlen", textlen.as_str()),
            ])
            .send()
            .await
            .map_err(|e| AnkiVocabError::AudioError(format!("request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AnkiVocabError::AudioError(format!(
                "TTS request failed with status {}",
                status
            )));
        }
        let bytes = response
            .bytes()
            .await
            .map_err(|e| AnkiVocabError::AudioError(format!("reading audio: {}", e)))?;
        if bytes.is_empty() {
            return Err(AnkiVocabError::AudioError("empty audio response".into()));
        }
        Ok(bytes.to_vec())
    }
}

#[async_trait]
impl SpeechSynthesizer for GoogleTtsClient {
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>> {
        let chunks = split_text(text, MAX_CHUNK_CHARS);
        if chunks.is_empty() {
            return Err(AnkiVocabError::AudioError("nothing to synthesize".into()));
        }
        let mut audio = Vec::new();
        for (i, chunk) in chunks.iter().enumerate() {
            audio.extend(self.fetch_chunk(chunk, i, chunks.len()).await?);
        }
        Ok(audio)
    }
}

/// 空白区切りで `max_chars` 以下のチャンクに分ける。
/// 1 語が上限を超える場合はその語を文字単位で切る。
pub fn split_text(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let mut chunks = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let word_len = word.chars().count();
        let current_len = current.chars().count();

        if current_len > 0 && current_len + 1 + word_len <= max_chars {
            current.push(' ');
            current.push_str(word);
            continue;
        }
        if current_len > 0 {
            chunks.push(std::mem::take(&mut current));
        }
        if word_len <= max_chars {
            current.push_str(word);
        } else {
            let chars: Vec<char> = word.chars().collect();
            for piece in chars.chunks(max_chars) {
                chunks.push(piece.iter().collect());
            }
        }
    }
    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_text_is_one_chunk() {
        assert_eq!(split_text("  der Hund  ", 100), vec!["der Hund"]);
    }

    #[test]
    fn long_text_splits_on_whitespace() {
        let chunks = split_text("eins zwei drei vier", 9);
        assert_eq!(chunks, vec!["eins zwei", "drei vier"]);
        assert!(chunks.iter().all(|c| c.chars().count() <= 9));
    }

    #[test]
    fn oversized_word_is_cut() {
        let chunks = split_text("Donaudampfschiff ja", 6);
        assert_eq!(chunks, vec!["Donaud", "ampfsc", "hiff", "ja"]);
    }

    #[test]
    fn blank_text_has_no_chunks() {
        assert!(split_text("   ", 100).is_empty());
    }

    #[tokio::test]
    async fn blank_text_is_audio_error() {
        let client = GoogleTtsClient::new("http://127.0.0.1:9/translate_tts", "de").unwrap();
        let err = client.synthesize(" ").await.unwrap_err();
        assert!(matches!(err, AnkiVocabError::AudioError(_)));
    }
}
