//! # `tourchat` – The umbrella crate
//!
//! One dependency line for the whole streaming chat stack:
//!
//! | Crate                  | What it provides                                                              |
//! |------------------------|-------------------------------------------------------------------------------|
//! | **`tourchat-core`**    | Session state, delta decoder, turn driver, provider traits, errors            |
//! | **`tourchat-openai`**  | OpenAI *Assistants v2* backend (threads + streamed runs) *(optional)*         |
//!
//! The core is re-exported at the root so downstream code can stay provider
//! agnostic. Enabling the `openai` Cargo feature (on by default) additionally
//! re-exports the backend as [`openai`]:
//!
//! ```toml
//! [dependencies]
//! tourchat = { version = "0.1", features = ["openai"] }
//! ```
//!
//! [`terminal`] holds a line-oriented renderer that prints each reply as it
//! grows.
//!
//! ## Quick example
//!
//! ```rust,no_run
//! use tourchat::{TurnDriver, openai::OpenAiAssistantAdapterBuilder, terminal::TerminalRenderer};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let backend = OpenAiAssistantAdapterBuilder::new_from_env().build()?;
//!     let mut driver = TurnDriver::new(backend, TerminalRenderer::stdout());
//!
//!     let mut session = driver.start_session().await?;
//!     driver
//!         .submit(&mut session, "What is the weather in Reykjavik in July?")
//!         .await?;
//!     Ok(())
//! }
//! ```
pub use tourchat_core::*;

#[cfg(feature = "openai")]
pub use tourchat_openai as openai;

pub mod terminal;
