//! Chat session state: the single source of truth a renderer projects.
//!
//! A [`ChatSession`] owns one transcript and one streaming flag. All
//! mutation goes through four operations whose preconditions keep the
//! transcript strictly alternating `user`/`assistant`:
//!
//! ```rust
//! use tourchat_core::{generic::{ConversationId, Role}, session::ChatSession};
//!
//! let mut session = ChatSession::new(ConversationId::new("thread_abc"));
//! session.append_user_turn("Best time for the northern lights?")?;
//! session.begin_assistant_turn()?;
//! session.append_delta("Late September ")?;
//! session.append_delta("to March.")?;
//! session.end_streaming();
//!
//! let last = session.last_turn().unwrap();
//! assert_eq!(last.role(), Role::Assistant);
//! assert_eq!(last.content(), "Late September to March.");
//! assert!(!session.is_streaming());
//! # Ok::<(), tourchat_core::error::ChatError>(())
//! ```
use serde::Serialize;

use crate::{
    error::{ChatError, Result},
    generic::{ConversationId, Role, Turn},
};

/// Whether an assistant reply is currently being assembled.
#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StreamingState {
    #[default]
    Idle,
    Streaming,
}

/// Position of the active decoder in the open stream.
#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
pub struct StreamCursor {
    /// Raw events pulled from the source, markers included.
    pub events: usize,
    /// Content fragments handed out by the decoder.
    pub fragments: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatSession {
    conversation_id: ConversationId,
    transcript: Vec<Turn>,
    streaming: StreamingState,
    generation: u64,
    #[serde(skip)]
    cursor: Option<StreamCursor>,
}

impl ChatSession {
    pub fn new(conversation_id: ConversationId) -> Self {
        Self {
            conversation_id,
            transcript: Vec::new(),
            streaming: StreamingState::Idle,
            generation: 0,
            cursor: None,
        }
    }

    pub fn conversation_id(&self) -> &ConversationId {
        &self.conversation_id
    }

    /// Bumped by every [`Self::reset`], so a view can tell a fresh transcript
    /// from the one it already drew.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Turns in chronological order.
    pub fn transcript(&self) -> &[Turn] {
        &self.transcript
    }

    pub fn last_turn(&self) -> Option<&Turn> {
        self.transcript.last()
    }

    pub fn streaming_state(&self) -> StreamingState {
        self.streaming
    }

    pub fn is_streaming(&self) -> bool {
        self.streaming == StreamingState::Streaming
    }

    /// Decoder position while streaming, `None` when idle.
    pub fn cursor(&self) -> Option<StreamCursor> {
        self.cursor
    }

    /// Append a `user` turn.
    ///
    /// # Errors
    ///
    /// [`ChatError::InvalidInput`] if `text` is empty, a reply is still
    /// streaming, or the previous user turn never received a reply. The
    /// transcript is left untouched in every case.
    pub fn append_user_turn(&mut self, text: impl Into<String>) -> Result<()> {
        let text = text.into();

        if self.is_streaming() {
            return Err(ChatError::InvalidInput(
                "an assistant reply is still streaming".into(),
            ));
        }
        if text.is_empty() {
            return Err(ChatError::InvalidInput("message text is empty".into()));
        }
        if self.last_role() == Some(Role::User) {
            return Err(ChatError::InvalidInput(
                "previous user turn has not been answered".into(),
            ));
        }

        self.transcript.push(Turn::user(text));
        Ok(())
    }

    /// Append the empty `assistant` placeholder and enter the streaming state.
    pub fn begin_assistant_turn(&mut self) -> Result<()> {
        if self.is_streaming() {
            return Err(ChatError::InvalidInput(
                "an assistant reply is already streaming".into(),
            ));
        }
        if self.last_role() != Some(Role::User) {
            return Err(ChatError::InvalidInput(
                "an assistant turn must follow a user turn".into(),
            ));
        }

        self.transcript.push(Turn::assistant_placeholder());
        self.streaming = StreamingState::Streaming;
        self.cursor = Some(StreamCursor::default());
        Ok(())
    }

    /// Concatenate `text` onto the streaming assistant turn.
    ///
    /// An empty `text` is accepted and changes nothing.
    pub fn append_delta(&mut self, text: &str) -> Result<()> {
        if !self.is_streaming() {
            return Err(ChatError::InvalidInput(
                "no assistant reply is streaming".into(),
            ));
        }
        if text.is_empty() {
            return Ok(());
        }

        match self.transcript.last_mut() {
            Some(turn) if turn.role() == Role::Assistant => {
                turn.push_str(text);
                Ok(())
            }
            _ => Err(ChatError::InvalidInput(
                "streaming without an assistant placeholder".into(),
            )),
        }
    }

    /// Leave the streaming state, freezing the last assistant turn.
    /// Idempotent.
    pub fn end_streaming(&mut self) {
        self.streaming = StreamingState::Idle;
        self.cursor = None;
    }

    /// Drop every turn while keeping the conversation id.
    pub fn reset(&mut self) -> Result<()> {
        if self.is_streaming() {
            return Err(ChatError::InvalidInput(
                "cannot reset while a reply is streaming".into(),
            ));
        }
        self.transcript.clear();
        self.generation += 1;
        Ok(())
    }

    pub(crate) fn set_cursor(&mut self, cursor: StreamCursor) {
        if self.is_streaming() {
            self.cursor = Some(cursor);
        }
    }

    fn last_role(&self) -> Option<Role> {
        self.transcript.last().map(Turn::role)
    }
}
