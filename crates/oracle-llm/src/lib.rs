//! # Oracle LLM
//!
//! Decision backends and the consultation engine.
//!
//! - Local servers: Ollama (`/api/generate`) and LM Studio
//!   (`/v1/chat/completions`)
//! - Cloud APIs: OpenAI chat completions and Anthropic messages
//! - Offline: a dice-rolling oracle that never touches the network
//!
//! [`ConsultationEngine`] wraps one backend in a timeout and falls back to a
//! fail-closed offline oracle when the backend cannot be reached.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod consultation;
pub mod factory;
pub mod prompt;
pub mod providers;
pub mod verdict;

pub use consultation::ConsultationEngine;
pub use factory::{create_engine, create_provider, FactoryError, FactoryResult};
pub use providers::{
    AnthropicProvider, LmStudioProvider, OfflineMode, OfflineProvider, OllamaProvider,
    OpenAIProvider,
};
pub use verdict::{KeywordParser, ReplyParser};
