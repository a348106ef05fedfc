//! Generic turn, role and stream event types used by the *tourchat-core*
//! crate.
//!
//! They stay provider-agnostic so that:
//!
//! * provider crates can map their wire events onto [`StreamEvent`] with a
//!   plain `match`,
//! * renderers can serialize a transcript without knowing the backend, and
//! * unit tests can script a whole conversation without a transport layer.
use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// Chat roles a transcript can contain.
///
/// The `Display` implementation renders the canonical lowercase name, which
/// is also what providers expect on the wire.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Messages originating from the human user.
    User,
    /// Messages produced by the assistant.
    Assistant,
}

impl Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::User => write!(f, "user"),
            Role::Assistant => write!(f, "assistant"),
        }
    }
}

/// One role-tagged message unit in a conversation.
///
/// Fields are private: user turns are frozen at creation and assistant turns
/// only grow through [`ChatSession::append_delta`](crate::session::ChatSession::append_delta).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Turn {
    role: Role,
    content: String,
}

impl Turn {
    pub(crate) fn user(content: String) -> Self {
        Self {
            role: Role::User,
            content,
        }
    }

    pub(crate) fn assistant_placeholder() -> Self {
        Self {
            role: Role::Assistant,
            content: String::new(),
        }
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub(crate) fn push_str(&mut self, text: &str) {
        self.content.push_str(text);
    }
}

/// Opaque handle correlating a session with the server-side conversation
/// (an OpenAI thread id, for example).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct ConversationId(String);

impl ConversationId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for ConversationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Control signals a completion source may report that carry no content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamMarker {
    /// The remote run was accepted.
    RunCreated,
    /// The assistant started a new message.
    MessageCreated,
    /// The assistant invoked a tool (file search, code interpreter, ...).
    ToolCallCreated { kind: String },
    /// The model finished generating.
    Stop,
}

/// Raw event emitted by a completion stream source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent {
    /// Plain text delta emitted by the assistant.
    TextDelta(String),

    /// Control signal; dropped by the decoder.
    Marker(StreamMarker),

    /// The source finished the reply.
    End,

    /// The source reported a failure; the description is user-presentable.
    Error(String),
}
