mod adapter;
mod model_map;
mod provider_impl_conversation;
mod provider_impl_stream;
mod sse;

pub use adapter::{DEFAULT_RUN_INSTRUCTIONS, OpenAiAssistantAdapter, OpenAiAssistantAdapterBuilder};
pub mod api_v1;
mod client;
pub mod error;

pub use client::OpenAiClient;
