//! Model identifiers a hosting caller may use to override the model
//! configured on the remote assistant.
//!
//! Provider crates map the variants onto their own naming scheme, so
//! application code never types literal strings such as `"gpt-4-turbo"`.
//!
//! ```rust
//! use tourchat_core::model::{Model, OpenAiModel};
//! assert_eq!(Model::from(OpenAiModel::Gpt4Turbo),
//!            Model::OpenAi(OpenAiModel::Gpt4Turbo));
//! ```

/// Universal identifier for an LLM model.
///
/// * `OpenAi` – Enumerated list of officially supported OpenAI models.
/// * `Custom` – Any model name not yet covered by a dedicated enum.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Model {
    OpenAi(OpenAiModel),
    Custom(&'static str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpenAiModel {
    Gpt35Turbo,
    Gpt4Turbo,
    Gpt4o,
    Gpt4oMini,
}

impl From<OpenAiModel> for Model {
    fn from(val: OpenAiModel) -> Self {
        Model::OpenAi(val)
    }
}
