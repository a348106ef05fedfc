use std::{env, sync::Arc, time::Duration};

use tourchat_core::{
    error::{ChatError, Result},
    model::Model,
};

use crate::{
    api_v1::CreateRunRequest,
    client::{OpenAiClient, default_http_client},
    model_map::map_model,
};

/// Run instructions applied when the caller does not supply any.
pub const DEFAULT_RUN_INSTRUCTIONS: &str = "If the user asks for images or itinerary, please fetch the accurate and precise images from the attached documents.";

/// Wires the HTTP client [`OpenAiClient`] to one pre-provisioned assistant.
///
/// The adapter implements both
/// [`ConversationProvider`](tourchat_core::provider::ConversationProvider)
/// (one thread per session) and
/// [`CompletionStreamProvider`](tourchat_core::provider::CompletionStreamProvider)
/// (post the user message, then stream a run), so it plugs straight into a
/// [`TurnDriver`](tourchat_core::TurnDriver).
pub struct OpenAiAssistantAdapter {
    pub(crate) client: Arc<OpenAiClient>,
    pub(crate) assistant_id: String,
    pub(crate) instructions: Option<String>,
    pub(crate) model: Option<String>,
}

impl OpenAiAssistantAdapter {
    pub fn assistant_id(&self) -> &str {
        &self.assistant_id
    }

    pub(crate) fn run_request(&self) -> CreateRunRequest {
        let request = CreateRunRequest::new(self.assistant_id.clone());
        let request = match &self.instructions {
            Some(instructions) => request.instructions(instructions.clone()),
            None => request,
        };
        match &self.model {
            Some(model) => request.model(model.clone()),
            None => request,
        }
    }
}

/// Builder for [`OpenAiAssistantAdapter`].
///
/// # Typical usage
///
/// ```rust,no_run
/// use tourchat_openai::OpenAiAssistantAdapterBuilder;
///
/// let backend = OpenAiAssistantAdapterBuilder::new_from_env()
///     .build()
///     .expect("OPENAI_API_KEY and OPENAI_ASSISTANT_ID must be set");
/// ```
pub struct OpenAiAssistantAdapterBuilder {
    pub(crate) api_key: Option<String>,
    pub(crate) assistant_id: Option<String>,
    pub(crate) base_url: Option<String>,
    pub(crate) instructions: Option<String>,
    pub(crate) model: Option<Model>,
    pub(crate) request_timeout: Option<Duration>,
    pub(crate) http: Option<reqwest::Client>,
}

impl Default for OpenAiAssistantAdapterBuilder {
    fn default() -> Self {
        Self {
            api_key: None,
            assistant_id: None,
            base_url: None,
            instructions: Some(DEFAULT_RUN_INSTRUCTIONS.to_owned()),
            model: None,
            request_timeout: None,
            http: None,
        }
    }
}

impl OpenAiAssistantAdapterBuilder {
    /// Create an *empty* builder. Remember to supply the API key and the
    /// assistant id manually.
    pub fn new() -> Self {
        Self::default()
    }

    /// Convenience constructor reading `OPENAI_API_KEY`,
    /// `OPENAI_ASSISTANT_ID` and, optionally, `OPENAI_BASE_URL`.
    ///
    /// Never panics. Missing values only surface during [`Self::build`].
    pub fn new_from_env() -> Self {
        Self {
            api_key: env::var("OPENAI_API_KEY").ok(),
            assistant_id: env::var("OPENAI_ASSISTANT_ID").ok(),
            base_url: env::var("OPENAI_BASE_URL").ok(),
            ..Self::default()
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_assistant_id(mut self, assistant_id: impl Into<String>) -> Self {
        self.assistant_id = Some(assistant_id.into());
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn with_instructions(mut self, instructions: impl Into<String>) -> Self {
        self.instructions = Some(instructions.into());
        self
    }

    /// Run with the assistant's own instructions only.
    pub fn without_instructions(mut self) -> Self {
        self.instructions = None;
        self
    }

    /// Override the model configured on the assistant for every run.
    pub fn with_model(mut self, model: impl Into<Model>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Timeout for the non-streaming calls (thread and message creation).
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    /// Use a preconfigured `reqwest::Client` (proxies, custom TLS, ...).
    pub fn with_http_client(mut self, http: reqwest::Client) -> Self {
        self.http = Some(http);
        self
    }

    /// Finalise the builder and return a ready-to-use adapter.
    ///
    /// # Errors
    ///
    /// * [`ChatError::Invalid`] – if the API key or assistant id is missing.
    /// * [`ChatError::Backend`] – if the HTTP client cannot be constructed.
    pub fn build(self) -> Result<OpenAiAssistantAdapter> {
        let api_key = self.api_key.ok_or(ChatError::Invalid(
            "missing env variable: `OPENAI_API_KEY`".into(),
        ))?;
        let assistant_id = self.assistant_id.ok_or(ChatError::Invalid(
            "missing env variable: `OPENAI_ASSISTANT_ID`".into(),
        ))?;

        let http = match self.http {
            Some(http) => http,
            None => default_http_client()?,
        };
        let client = OpenAiClient::with_http(api_key, http, self.base_url);
        let client = match self.request_timeout {
            Some(timeout) => client.with_request_timeout(timeout),
            None => client,
        };

        tracing::debug!(
            base_url = client.base_url(),
            %assistant_id,
            "configured OpenAI assistant backend"
        );

        Ok(OpenAiAssistantAdapter {
            client: Arc::new(client),
            assistant_id,
            instructions: self.instructions,
            model: self.model.as_ref().map(|model| map_model(model).into_owned()),
        })
    }
}
