use std::{future::Future, pin::Pin};

use crate::{
    error::Result,
    generic::{ConversationId, StreamEvent},
};
use futures_core::stream::Stream;

/// A **completion stream source** turns a prompt into an incremental reply
/// from a concrete provider (OpenAI assistants, a local model, a test
/// script, ...).
///
/// Opening is split from consuming so the two failure modes stay apart:
///
/// * the returned future resolving to `Err` means the stream never opened,
/// * an `Err` item (or [`StreamEvent::Error`]) on the open stream means the
///   reply failed part-way through.
///
/// At most one stream per conversation is expected to be open at a time; the
/// [`TurnDriver`](crate::driver::TurnDriver) never opens a second one while a
/// session is streaming.
pub trait CompletionStreamProvider: Send + Sync {
    /// Stream of raw events returned once the request has been accepted.
    type EventStream<'s>: Stream<Item = Result<StreamEvent>> + Send + 's
    where
        Self: 's;

    /// Submit `prompt` to `conversation` and start streaming the reply.
    fn open_stream<'s>(
        &'s self,
        conversation: &'s ConversationId,
        prompt: String,
    ) -> Pin<Box<dyn Future<Output = Result<Self::EventStream<'s>>> + Send + 's>>;
}
