use crate::error::{AnkiVocabError, Result};

/// Environment loading helpers.
///
/// Loads environment variables from `.env` if present, or from the file
/// specified by the `ANKI_VOCAB_ENV_PATH` environment variable. A missing
/// default `.env` is not an error; an unreadable explicit path is returned
/// so the caller can report it once logging is up.
pub fn load_env() -> Result<()> {
    match std::env::var(ENV_PATH_VAR) {
        Ok(path) => dotenvy::from_path(&path).map(|_| ()).map_err(|e| {
            AnkiVocabError::ConfigInitError(format!("could not load env file {}: {}", path, e))
        }),
        Err(_) => {
            dotenvy::dotenv().ok();
            Ok(())
        }
    }
}

/// `.env` の場所を上書きする環境変数名
pub const ENV_PATH_VAR: &str = "ANKI_VOCAB_ENV_PATH";

