use async_stream::try_stream;

use futures_core::Stream;
use futures_util::StreamExt;
use reqwest::{
    Client as HttpClient, RequestBuilder,
    header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue},
};
use serde::{Serialize, de::DeserializeOwned};
use std::time::Duration;

use crate::{
    api_v1::{
        AssistantStreamEvent, CreateMessageRequest, CreateRunRequest, CreateThreadRequest,
        MessageObject, ThreadObject,
    },
    error::OpenAiError,
    sse::SseDecoder,
};

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

pub(crate) fn default_http_client() -> Result<HttpClient, OpenAiError> {
    Ok(HttpClient::builder()
        .connect_timeout(Duration::from_secs(10))
        .build()?)
}

/// Minimal HTTP client for OpenAI's *Assistants v2* endpoints.
///
/// * Threads and messages are plain JSON round-trips bounded by a request
///   timeout.
/// * Runs are streamed over SSE with no overall timeout; callers bound the
///   wait between events instead.
/// * Shares a single `reqwest::Client`, so cloning `OpenAiClient` is cheap.
#[derive(Clone)]
pub struct OpenAiClient {
    api_key: String,
    http: HttpClient,
    base: String,
    request_timeout: Duration,
}

impl OpenAiClient {
    /// Convenience constructor building a default `reqwest` client with
    /// Rustls TLS and a 10 s connect timeout.
    pub fn new(api_key: impl Into<String>) -> Result<Self, OpenAiError> {
        Ok(Self::with_http(api_key, default_http_client()?, None))
    }

    /// Build with a custom `reqwest::Client` in case the caller needs proxy
    /// settings, custom TLS, etc.
    pub fn with_http(
        api_key: impl Into<String>,
        http: HttpClient,
        base_url: Option<String>,
    ) -> Self {
        Self {
            api_key: api_key.into(),
            http,
            base: base_url
                .map(|url| url.trim_end_matches('/').to_owned())
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_owned()),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base
    }

    /// `POST /threads`
    pub async fn create_thread(&self) -> Result<ThreadObject, OpenAiError> {
        self.post_json("threads", &CreateThreadRequest::default())
            .await
    }

    /// `POST /threads/{thread_id}/messages`
    pub async fn create_message(
        &self,
        thread_id: &str,
        request: &CreateMessageRequest,
    ) -> Result<MessageObject, OpenAiError> {
        self.post_json(&format!("threads/{thread_id}/messages"), request)
            .await
    }

    /// `POST /threads/{thread_id}/runs` with `stream = true`.
    ///
    /// Resolves once the server accepted the run; a non-success status is
    /// reported here rather than on the returned stream.
    pub async fn create_run_stream(
        &self,
        thread_id: &str,
        request: CreateRunRequest,
    ) -> Result<impl Stream<Item = Result<AssistantStreamEvent, OpenAiError>> + Send + 'static, OpenAiError>
    {
        let request = request.stream(true);

        let mut headers = self.headers()?;
        headers.insert(ACCEPT, HeaderValue::from_static("text/event-stream"));

        let url = format!("{}/threads/{thread_id}/runs", self.base);
        tracing::debug!(%url, assistant_id = %request.assistant_id, "starting streamed run");

        let resp = self
            .http
            .post(url)
            .headers(headers)
            .json(&request)
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(OpenAiError::Api { status, body });
        }

        let mut bytes_stream = resp.bytes_stream();

        Ok(try_stream! {
            let mut decoder = SseDecoder::new();

            while let Some(chunk) = bytes_stream.next().await {
                let chunk = chunk?;
                decoder.push(&chunk);

                while let Some(frame) = decoder.next_frame()? {
                    let event = AssistantStreamEvent::parse(&frame.event, &frame.data)?;
                    let done = matches!(event, AssistantStreamEvent::Done);
                    yield event;
                    if done {
                        return;
                    }
                }
            }

            if let Some(frame) = decoder.finish()? {
                yield AssistantStreamEvent::parse(&frame.event, &frame.data)?;
            }
        })
    }

    async fn post_json<Req, Resp>(&self, path: &str, body: &Req) -> Result<Resp, OpenAiError>
    where
        Req: Serialize + ?Sized,
        Resp: DeserializeOwned,
    {
        let url = format!("{}/{path}", self.base);
        tracing::debug!(%url, "POST");

        let request = self
            .http
            .post(url)
            .headers(self.headers()?)
            .timeout(self.request_timeout)
            .json(body);

        Self::send_json(request).await
    }

    async fn send_json<Resp: DeserializeOwned>(request: RequestBuilder) -> Result<Resp, OpenAiError> {
        let resp = request.send().await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(OpenAiError::Api { status, body });
        }

        let bytes = resp.bytes().await?;
        let parsed: Resp = serde_json::from_slice(&bytes)?;
        Ok(parsed)
    }

    fn headers(&self) -> Result<HeaderMap, OpenAiError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", self.api_key))
                .map_err(|_| OpenAiError::Format("API key is not a valid header value".into()))?,
        );
        headers.insert("openai-beta", HeaderValue::from_static("assistants=v2"));
        Ok(headers)
    }
}
