pub mod deck_service;
pub mod report;
pub mod retry;
pub mod traits;

pub use deck_service::{DEFAULT_OUTPUT_FILE, DeckGenerationService, DeckOptions};
pub use report::{CreatedCard, RunReport, WordIssue};
pub use retry::RetryPolicy;
pub use traits::{SpeechSynthesizer, WordResolver};
