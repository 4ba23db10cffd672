pub mod input;
pub mod progress;
pub mod word;

pub use progress::ProgressRepository;
pub use word::{AudioClip, ExampleSentence, Grammar, PartOfSpeech, WordEntry};
