//! Anki デッキ (.apkg) 生成
pub mod model;
pub mod package;
pub mod schema;

pub use package::{AnkiDeckBuilder, COLLECTION_FILE, MEDIA_INDEX_FILE};
