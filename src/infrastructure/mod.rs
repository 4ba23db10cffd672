pub mod anki;
pub mod config;
pub mod external;
pub mod progress;
