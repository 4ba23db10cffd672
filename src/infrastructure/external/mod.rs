pub mod anthropic;
pub mod anthropic_adapter;
pub mod gtts;
pub mod word_prompt;

pub use anthropic_adapter::AnthropicWordResolver;
pub use gtts::GoogleTtsClient;
