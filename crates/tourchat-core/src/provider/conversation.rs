use std::{future::Future, pin::Pin};

use crate::{error::Result, generic::ConversationId};

/// A **conversation provider** allocates the server-side history a session
/// is correlated with (an assistant thread, a chat log, ...).
///
/// Called exactly once per [`ChatSession`](crate::session::ChatSession); the
/// returned id is never mutated and never shared with another session.
///
/// The method returns a [`Pin<Box<dyn Future>>`] so we stay object-safe
/// without pulling in `async_trait`.
pub trait ConversationProvider: Send + Sync {
    fn create_conversation<'a>(
        &'a self,
    ) -> Pin<Box<dyn Future<Output = Result<ConversationId>> + Send + 'a>>;
}
