//! Anki パッケージ (.apkg) 書き出し
//!
//! `.apkg` は zip アーカイブで、以下を含む:
//! - `collection.anki2`: ノート・カード・ノートタイプ・デッキを持つ SQLite
//! - `media`: `{"0": "hund.mp3", ...}` 形式の JSON
//! - `0`, `1`, ...: 音声ファイル本体

use super::model::{self, TEMPLATES};
use super::schema::{self, SCHEMA_VERSION};
use crate::domain::{AudioClip, WordEntry};
use crate::error::{AnkiVocabError, Result};
use chrono::Utc;
use rusqlite::{Connection, params};
use sha1::Sha1;
use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::io::{Seek, Write};
use std::path::Path;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

pub const COLLECTION_FILE: &str = "collection.anki2";
pub const MEDIA_INDEX_FILE: &str = "media";
const FIELD_SEPARATOR: &str = "\x1f";
const GUID_ALPHABET: &[u8] =
    b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789!#$%&()*+,-./:;<=>?@[]^_`{|}~";

type BoxError = Box<dyn std::error::Error>;

struct PendingNote {
    guid: String,
    sort_field: String,
    fields: Vec<String>,
}

/// 解決済みエントリを蓄積し、最後に 1 度だけ `.apkg` を書き出す
pub struct AnkiDeckBuilder {
    deck_name: String,
    deck_id: i64,
    model_id: i64,
    notes: Vec<PendingNote>,
    media: Vec<AudioClip>,
    media_index: HashMap<String, usize>,
}

impl AnkiDeckBuilder {
    pub fn new(deck_name: impl Into<String>) -> Self {
        let deck_name = deck_name.into();
        Self {
            deck_id: stable_id(&format!("deck:{}", deck_name)),
            model_id: stable_id(&format!("model:{}", model::MODEL_NAME)),
            deck_name,
            notes: Vec::new(),
            media: Vec::new(),
            media_index: HashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    pub fn media_count(&self) -> usize {
        self.media.len()
    }

    /// エントリをノートとして追加する
    pub fn add(&mut self, entry: &WordEntry) {
        let mut names = Vec::with_capacity(entry.examples.len() + 1);
        names.push(entry.headword_audio.as_ref().map(|c| self.register_media(c)));
        for ex in &entry.examples {
            names.push(ex.audio.as_ref().map(|c| self.register_media(c)));
        }

        self.notes.push(PendingNote {
            guid: note_guid(&entry.headword),
            sort_field: entry.headword.clone(),
            fields: model::note_fields(entry, &names),
        });
    }

    /// メディアを登録し、パッケージ内で一意なファイル名を返す
    fn register_media(&mut self, clip: &AudioClip) -> String {
        let mut name = clip.file_name.clone();
        let mut n = 1;
        while let Some(&idx) = self.media_index.get(&name) {
            if self.media[idx].bytes == clip.bytes {
                return name;
            }
            n += 1;
            name = with_suffix(&clip.file_name, n);
        }
        self.media_index.insert(name.clone(), self.media.len());
        self.media.push(AudioClip {
            file_name: name.clone(),
            bytes: clip.bytes.clone(),
        });
        name
    }

    /// `.apkg` を書き出す。一時ファイルに書いてから置き換える。
    pub fn write_to(&self, path: &Path) -> Result<()> {
        let collection = self
            .build_collection()
            .map_err(|e| AnkiVocabError::write(path, e))?;

        let parent = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let mut tmp = tempfile::Builder::new()
            .prefix(".anki_vocab")
            .suffix(".apkg.tmp")
            .tempfile_in(parent)
            .map_err(|e| AnkiVocabError::write(path, e))?;

        self.write_archive(tmp.as_file_mut(), &collection)
            .map_err(|e| AnkiVocabError::write(path, e))?;
        tmp.persist(path)
            .map_err(|e| AnkiVocabError::write(path, e.error))?;
        Ok(())
    }

    fn write_archive<W: Write + Seek>(
        &self,
        out: W,
        collection: &[u8],
    ) -> std::result::Result<(), BoxError> {
        let mut zip = ZipWriter::new(out);
        let options =
            SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

        zip.start_file(COLLECTION_FILE, options)?;
        zip.write_all(collection)?;

        let index: BTreeMap<String, &str> = self
            .media
            .iter()
            .enumerate()
            .map(|(i, clip)| (i.to_string(), clip.file_name.as_str()))
            .collect();
        zip.start_file(MEDIA_INDEX_FILE, options)?;
        zip.write_all(serde_json::to_string(&index)?.as_bytes())?;

        for (i, clip) in self.media.iter().enumerate() {
            zip.start_file(i.to_string(), options)?;
            zip.write_all(&clip.bytes)?;
        }

        zip.finish()?;
        Ok(())
    }

    /// SQLite コレクションを作り、そのバイト列を返す
    fn build_collection(&self) -> std::result::Result<Vec<u8>, BoxError> {
        let dir = tempfile::tempdir()?;
        let db_path = dir.path().join(COLLECTION_FILE);

        let now = Utc::now();
        let now_s = now.timestamp();
        let now_ms = now.timestamp_millis();

        {
            let mut conn = Connection::open(&db_path)?;
            conn.execute_batch(schema::CREATE_TABLES)?;
            let tx = conn.transaction()?;

            let mut models = serde_json::Map::new();
            models.insert(
                self.model_id.to_string(),
                model::model_json(self.model_id, self.deck_id, now_s),
            );
            tx.execute(
                "INSERT INTO col VALUES (1, ?1, ?2, ?3, ?4, 0, 0, 0, ?5, ?6, ?7, ?8, '{}')",
                params![
                    now_s,
                    now_ms,
                    now_ms,
                    SCHEMA_VERSION,
                    schema::collection_conf(self.deck_id, self.model_id).to_string(),
                    serde_json::Value::Object(models).to_string(),
                    schema::decks_json(self.deck_id, &self.deck_name, now_s).to_string(),
                    schema::deck_conf_json().to_string(),
                ],
            )?;

            let mut card_id = now_ms;
            for (i, note) in self.notes.iter().enumerate() {
                let note_id = now_ms + i as i64;
                tx.execute(
                    "INSERT INTO notes VALUES (?1, ?2, ?3, ?4, -1, '', ?5, ?6, ?7, 0, '')",
                    params![
                        note_id,
                        note.guid,
                        self.model_id,
                        now_s,
                        note.fields.join(FIELD_SEPARATOR),
                        note.sort_field,
                        field_checksum(&note.sort_field),
                    ],
                )?;

                for (ord, template) in TEMPLATES.iter().enumerate() {
                    let required = note
                        .fields
                        .get(template.required_field)
                        .is_some_and(|f| !f.trim().is_empty());
                    if !required {
                        continue;
                    }
                    tx.execute(
                        "INSERT INTO cards VALUES (?1, ?2, ?3, ?4, ?5, -1, 0, 0, ?6, 0, 0, 0, 0, 0, 0, 0, 0, '')",
                        params![card_id, note_id, self.deck_id, ord as i64, now_s, i as i64],
                    )?;
                    card_id += 1;
                }
            }
            tx.commit()?;
        }

        Ok(fs::read(&db_path)?)
    }
}

/// 名前から [2^30, 2^31) の安定した ID を作る
pub fn stable_id(name: &str) -> i64 {
    let digest = Sha256::digest(name.as_bytes());
    let n = u32::from_be_bytes([digest[0], digest[1], digest[2], digest[3]]);
    (1i64 << 30) + i64::from(n) % (1i64 << 30)
}

/// 見出し語から決まるノート GUID (base91)
pub fn note_guid(headword: &str) -> String {
    let digest = Sha256::digest(headword.as_bytes());
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&digest[..8]);
    let mut n = u64::from_be_bytes(bytes);

    let base = GUID_ALPHABET.len() as u64;
    let mut out = Vec::new();
    loop {
        out.push(GUID_ALPHABET[(n % base) as usize]);
        n /= base;
        if n == 0 {
            break;
        }
    }
    out.reverse();
    String::from_utf8_lossy(&out).into_owned()
}

/// ソートフィールドの SHA-1 先頭 32bit (重複検出用)
pub fn field_checksum(text: &str) -> i64 {
    let digest = Sha1::digest(text.as_bytes());
    i64::from(u32::from_be_bytes([digest[0], digest[1], digest[2], digest[3]]))
}

fn with_suffix(file_name: &str, n: usize) -> String {
    match file_name.rsplit_once('.') {
        Some((stem, ext)) => format!("{}_{}.{}", stem, n, ext),
        None => format!("{}_{}", file_name, n),
    }
}
