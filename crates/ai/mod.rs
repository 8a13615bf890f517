pub mod anthropic_client;
pub mod prompts;
