pub mod text_file_repo;

pub use text_file_repo::{DEFAULT_PROGRESS_FILE, TextFileProgressRepo};
