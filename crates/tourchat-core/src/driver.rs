//! Turn driver: runs one request/response cycle against a session.
//!
//! ```text
//!            submit(text)                 stream opened
//!   ┌──────┐ ─────────────► ┌──────────────┐ ──────────► ┌───────────┐
//!   │ Idle │                │AwaitingStream│             │ Streaming │
//!   └──────┘ ◄───────┐      └──────────────┘             └───────────┘
//!       ▲            │             │ open failed            │    │
//!       │            │             ▼                        │    │ end of sequence
//!       │            └──────── ┌─────────┐ ◄── fault ───────┘    │
//!       │                      │ Errored │                       │
//!       │                      └─────────┘                       │
//!       └────────────────────────────────────────────────────────┘
//! ```
//!
//! `Errored` only exists for the duration of writing the failure into the
//! assistant turn; callers see it as [`TurnOutcome::Failed`]. Every exit,
//! including cancellation and a dropped submit future, leaves the session
//! idle so the next submission starts a fresh cycle. There is no retry.
use std::{future::Future, sync::Arc, time::Duration};

use futures_util::StreamExt;
use tokio_util::sync::CancellationToken;

use crate::{
    decoder::{DecodedFragment, DeltaDecoder},
    error::{ChatError, Result},
    provider::{CompletionStreamProvider, ConversationProvider},
    render::Renderer,
    session::{ChatSession, StreamCursor},
};

const DEFAULT_ERROR_PREFIX: &str = "error: ";

/// Where the driver is inside a cycle. A failure is not a resting state:
/// it is reported as [`TurnOutcome::Failed`] and the driver is back at
/// [`DriverState::Idle`] by the time `submit` returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverState {
    Idle,
    AwaitingStream,
    Streaming,
}

/// How a submitted turn ended.
#[derive(Debug)]
pub enum TurnOutcome {
    /// The stream reached its end; the reply is complete.
    Completed,
    /// Opening or consuming the stream failed. The description is already
    /// visible in the transcript.
    Failed(ChatError),
    /// The caller cancelled; partial content is kept.
    Cancelled,
}

impl TurnOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, TurnOutcome::Completed)
    }
}

/// Per-driver knobs.
#[derive(Debug, Clone)]
pub struct TurnOptions {
    /// Longest wait for the stream to open or for the next event. Expiry is
    /// handled like any other stream failure.
    pub idle_timeout: Option<Duration>,
    /// Prepended to error descriptions written into the transcript.
    pub error_prefix: String,
}

impl Default for TurnOptions {
    fn default() -> Self {
        Self {
            idle_timeout: None,
            error_prefix: DEFAULT_ERROR_PREFIX.to_owned(),
        }
    }
}

impl TurnOptions {
    pub fn with_idle_timeout(mut self, timeout: Duration) -> Self {
        self.idle_timeout = Some(timeout);
        self
    }

    pub fn with_error_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.error_prefix = prefix.into();
        self
    }

    fn visible_error(&self, err: &ChatError, after_partial: bool) -> String {
        let separator = if after_partial { "\n\n" } else { "" };
        format!("{separator}{}{err}", self.error_prefix)
    }
}

/// Drives turn cycles for sessions using a single provider and renderer.
pub struct TurnDriver<P, R> {
    provider: Arc<P>,
    renderer: R,
    options: TurnOptions,
    state: DriverState,
}

enum Step {
    Fragment(DecodedFragment),
    Finished,
    TimedOut,
    Cancelled,
}

impl<P, R> TurnDriver<P, R>
where
    P: CompletionStreamProvider,
    R: Renderer,
{
    pub fn new(provider: P, renderer: R) -> Self {
        Self {
            provider: Arc::new(provider),
            renderer,
            options: TurnOptions::default(),
            state: DriverState::Idle,
        }
    }

    pub fn with_options(mut self, options: TurnOptions) -> Self {
        self.options = options;
        self
    }

    pub fn state(&self) -> DriverState {
        self.state
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    /// Run one full cycle for `text`.
    ///
    /// # Errors
    ///
    /// Only [`ChatError::InvalidInput`] is returned as `Err`: the submission
    /// was rejected and the session is unchanged. Stream failures come back
    /// as [`TurnOutcome::Failed`].
    pub async fn submit(
        &mut self,
        session: &mut ChatSession,
        text: impl Into<String>,
    ) -> Result<TurnOutcome> {
        self.submit_with_cancel(session, text, &CancellationToken::new())
            .await
    }

    /// Like [`Self::submit`], stopping early once `cancel` fires.
    ///
    /// Dropping the returned future before it resolves, for instance under
    /// `tokio::time::timeout`, settles the turn the same way: streaming
    /// ends, partial content stays and the driver is idle again.
    pub async fn submit_with_cancel(
        &mut self,
        session: &mut ChatSession,
        text: impl Into<String>,
        cancel: &CancellationToken,
    ) -> Result<TurnOutcome> {
        let prompt = text.into();
        session.append_user_turn(prompt.clone())?;
        self.renderer.render(session);
        session.begin_assistant_turn()?;
        self.renderer.render(session);

        let provider = Arc::clone(&self.provider);
        let conversation = session.conversation_id().clone();
        let idle_timeout = self.options.idle_timeout;

        let mut turn = ActiveTurn {
            session,
            renderer: &mut self.renderer,
            state: &mut self.state,
            options: &self.options,
            settled: false,
        };
        turn.enter(DriverState::AwaitingStream);
        tracing::info!(%conversation, "opening completion stream");

        let opened = tokio::select! {
            biased;
            _ = cancel.cancelled() => None,
            opened = within(idle_timeout, provider.open_stream(&conversation, prompt)) => Some(opened),
        };

        let events = match opened {
            None => return Ok(turn.cancel()),
            Some(None) => {
                let err = ChatError::stream_open(format!(
                    "no response within {:?}",
                    idle_timeout.unwrap_or_default()
                ));
                return turn.fail(err);
            }
            Some(Some(Err(err))) => return turn.fail(into_open_error(err)),
            Some(Some(Ok(events))) => events,
        };

        turn.enter(DriverState::Streaming);
        let mut decoder = DeltaDecoder::new(Box::pin(events));

        loop {
            let step = tokio::select! {
                biased;
                _ = cancel.cancelled() => Step::Cancelled,
                next = within(idle_timeout, decoder.next()) => match next {
                    None => Step::TimedOut,
                    Some(None) => Step::Finished,
                    Some(Some(fragment)) => Step::Fragment(fragment),
                },
            };

            match step {
                Step::Fragment(DecodedFragment::Text(text)) => {
                    turn.push(&text, decoder.cursor())?;
                }
                Step::Fragment(DecodedFragment::Fault(description)) => {
                    return turn.fail(ChatError::StreamFault(description));
                }
                Step::TimedOut => {
                    let err = ChatError::StreamFault(format!(
                        "no data within {:?}",
                        idle_timeout.unwrap_or_default()
                    ));
                    return turn.fail(err);
                }
                Step::Cancelled => return Ok(turn.cancel()),
                Step::Finished => break,
            }
        }

        Ok(turn.complete(decoder.cursor()))
    }
}

impl<P, R> TurnDriver<P, R>
where
    P: CompletionStreamProvider + ConversationProvider,
    R: Renderer,
{
    /// Allocate a fresh conversation and wrap it in an empty session.
    pub async fn start_session(&self) -> Result<ChatSession> {
        let conversation = self.provider.create_conversation().await?;
        tracing::debug!(%conversation, "started conversation");
        Ok(ChatSession::new(conversation))
    }
}

/// One cycle in flight. Settles the session and the driver on every exit,
/// including when the submit future is dropped before it finishes.
struct ActiveTurn<'a, R: Renderer> {
    session: &'a mut ChatSession,
    renderer: &'a mut R,
    state: &'a mut DriverState,
    options: &'a TurnOptions,
    settled: bool,
}

impl<R: Renderer> ActiveTurn<'_, R> {
    fn enter(&mut self, next: DriverState) {
        tracing::debug!(from = ?*self.state, to = ?next, "turn driver state");
        *self.state = next;
    }

    fn push(&mut self, text: &str, cursor: StreamCursor) -> Result<()> {
        self.session.append_delta(text)?;
        self.session.set_cursor(cursor);
        self.renderer.render(self.session);
        Ok(())
    }

    fn complete(mut self, cursor: StreamCursor) -> TurnOutcome {
        self.settle();
        tracing::info!(
            events = cursor.events,
            fragments = cursor.fragments,
            "completion stream finished"
        );
        TurnOutcome::Completed
    }

    /// Write `err` into the reply after whatever already arrived.
    fn fail(mut self, err: ChatError) -> Result<TurnOutcome> {
        tracing::warn!(error = %err, state = ?*self.state, "turn failed");

        let after_partial = self
            .session
            .last_turn()
            .is_some_and(|turn| !turn.content().is_empty());
        let visible = self.options.visible_error(&err, after_partial);
        self.session.append_delta(&visible)?;
        self.settle();

        Ok(TurnOutcome::Failed(err))
    }

    fn cancel(mut self) -> TurnOutcome {
        tracing::info!("turn cancelled");
        self.settle();
        TurnOutcome::Cancelled
    }

    fn settle(&mut self) {
        self.session.end_streaming();
        self.renderer.render(self.session);
        self.enter(DriverState::Idle);
        self.settled = true;
    }
}

impl<R: Renderer> Drop for ActiveTurn<'_, R> {
    fn drop(&mut self) {
        if !self.settled {
            tracing::info!("turn abandoned before the stream finished");
            self.settle();
        }
    }
}

fn into_open_error(err: ChatError) -> ChatError {
    match err {
        ChatError::StreamOpen(_) => err,
        other => ChatError::StreamOpen(Box::new(other)),
    }
}

/// `None` once `timeout` elapses.
async fn within<F: Future>(timeout: Option<Duration>, fut: F) -> Option<F::Output> {
    match timeout {
        Some(limit) => tokio::time::timeout(limit, fut).await.ok(),
        None => Some(fut.await),
    }
}

#[cfg(test)]
mod tests {
    use std::{collections::VecDeque, pin::Pin, sync::Mutex};

    use futures_core::Stream;
    use futures_util::stream;

    use super::*;
    use crate::generic::{ConversationId, Role, StreamEvent, StreamMarker};

    type Events = Vec<Result<StreamEvent>>;

    enum Script {
        FailOpen(&'static str),
        Stream(Events),
    }

    #[derive(Default)]
    struct Scripted {
        scripts: Mutex<VecDeque<Script>>,
        prompts: Mutex<Vec<String>>,
    }

    impl Scripted {
        fn new(scripts: impl IntoIterator<Item = Script>) -> Self {
            Self {
                scripts: Mutex::new(scripts.into_iter().collect()),
                prompts: Mutex::default(),
            }
        }
    }

    impl CompletionStreamProvider for Scripted {
        type EventStream<'s> = Pin<Box<dyn Stream<Item = Result<StreamEvent>> + Send + 's>>;

        fn open_stream<'s>(
            &'s self,
            _conversation: &'s ConversationId,
            prompt: String,
        ) -> Pin<Box<dyn Future<Output = Result<Self::EventStream<'s>>> + Send + 's>> {
            Box::pin(async move {
                self.prompts.lock().unwrap().push(prompt);
                let next = self.scripts.lock().unwrap().pop_front();
                match next {
                    Some(Script::FailOpen(reason)) => Err(ChatError::stream_open(reason)),
                    Some(Script::Stream(events)) => {
                        Ok(Box::pin(stream::iter(events)) as Self::EventStream<'s>)
                    }
                    None => Err(ChatError::Invalid("script exhausted".into())),
                }
            })
        }
    }

    #[derive(Default)]
    struct Frames(Vec<(Vec<(Role, String)>, bool)>);

    impl Renderer for Frames {
        fn render(&mut self, session: &ChatSession) {
            let turns = session
                .transcript()
                .iter()
                .map(|t| (t.role(), t.content().to_owned()))
                .collect();
            self.0.push((turns, session.is_streaming()));
        }
    }

    fn text(s: &str) -> Result<StreamEvent> {
        Ok(StreamEvent::TextDelta(s.into()))
    }

    fn session() -> ChatSession {
        ChatSession::new(ConversationId::new("thread_unit"))
    }

    #[tokio::test]
    async fn completed_cycle_renders_growing_content() {
        let provider = Scripted::new([Script::Stream(vec![
            Ok(StreamEvent::Marker(StreamMarker::RunCreated)),
            text("Ice"),
            text("land"),
            Ok(StreamEvent::End),
        ])]);
        let mut driver = TurnDriver::new(provider, Frames::default());
        let mut s = session();

        let outcome = driver.submit(&mut s, "Where?").await.unwrap();

        assert!(outcome.is_completed());
        assert_eq!(driver.state(), DriverState::Idle);
        assert_eq!(s.last_turn().unwrap().content(), "Iceland");

        let assistant_contents: Vec<&str> = driver
            .renderer()
            .0
            .iter()
            .filter_map(|(turns, _)| turns.get(1).map(|(_, c)| c.as_str()))
            .collect();
        assert_eq!(assistant_contents, vec!["", "Ice", "Iceland", "Iceland"]);
        assert!(!driver.renderer().0.last().unwrap().1);
    }

    #[tokio::test]
    async fn prompt_is_most_recent_user_text() {
        let provider = Scripted::new([
            Script::Stream(vec![text("a"), Ok(StreamEvent::End)]),
            Script::Stream(vec![text("b"), Ok(StreamEvent::End)]),
        ]);
        let mut driver = TurnDriver::new(provider, |_: &ChatSession| {});
        let mut s = session();

        driver.submit(&mut s, "first").await.unwrap();
        driver.submit(&mut s, "second").await.unwrap();

        assert_eq!(
            *driver.provider().prompts.lock().unwrap(),
            vec!["first".to_string(), "second".to_string()]
        );
        assert_eq!(s.transcript().len(), 4);
    }

    #[tokio::test]
    async fn rejected_input_does_not_render() {
        let mut driver = TurnDriver::new(Scripted::default(), Frames::default());
        let mut s = session();

        let err = driver.submit(&mut s, "").await.unwrap_err();

        assert!(err.is_invalid_input());
        assert!(driver.renderer().0.is_empty());
        assert!(s.transcript().is_empty());
        assert_eq!(driver.state(), DriverState::Idle);
    }

    #[tokio::test]
    async fn open_failure_is_written_into_the_reply() {
        let provider = Scripted::new([Script::FailOpen("401 unauthorized")]);
        let mut driver = TurnDriver::new(provider, Frames::default());
        let mut s = session();

        let outcome = driver.submit(&mut s, "Plan a 5-day trip").await.unwrap();

        assert!(matches!(outcome, TurnOutcome::Failed(ChatError::StreamOpen(_))));
        assert_eq!(
            s.last_turn().unwrap().content(),
            "error: could not open completion stream: 401 unauthorized"
        );
        assert!(!s.is_streaming());
        assert_eq!(driver.state(), DriverState::Idle);
    }

    #[tokio::test]
    async fn non_open_errors_from_open_are_wrapped() {
        let mut driver = TurnDriver::new(Scripted::default(), |_: &ChatSession| {});
        let mut s = session();

        let outcome = driver.submit(&mut s, "anything").await.unwrap();

        let TurnOutcome::Failed(err) = outcome else {
            panic!("expected failure");
        };
        assert!(matches!(err, ChatError::StreamOpen(_)));
        assert!(s.last_turn().unwrap().content().contains("script exhausted"));
    }

    #[tokio::test]
    async fn custom_error_prefix() {
        let provider = Scripted::new([Script::Stream(vec![
            text("partial"),
            Ok(StreamEvent::Error("boom".into())),
        ])]);
        let mut driver = TurnDriver::new(provider, |_: &ChatSession| {})
            .with_options(TurnOptions::default().with_error_prefix("⚠ "));
        let mut s = session();

        driver.submit(&mut s, "go").await.unwrap();

        assert_eq!(
            s.last_turn().unwrap().content(),
            "partial\n\n⚠ completion stream failed: boom"
        );
    }
}
