use std::{future::Future, pin::Pin};

use futures_core::stream::Stream;
use futures_util::{StreamExt, future};
use tourchat_core::{
    error::{ChatError, Result},
    generic::{ConversationId, StreamEvent, StreamMarker},
    provider::CompletionStreamProvider,
};

use crate::{
    OpenAiAssistantAdapter,
    api_v1::{AssistantStreamEvent, CreateMessageRequest, StepDetails},
};

impl CompletionStreamProvider for OpenAiAssistantAdapter {
    type EventStream<'s>
        = Pin<Box<dyn Stream<Item = Result<StreamEvent>> + Send + 's>>
    where
        Self: 's;

    fn open_stream<'s>(
        &'s self,
        conversation: &'s ConversationId,
        prompt: String,
    ) -> Pin<Box<dyn Future<Output = Result<Self::EventStream<'s>>> + Send + 's>> {
        Box::pin(async move {
            let thread_id = conversation.as_str();

            self.client
                .create_message(thread_id, &CreateMessageRequest::user(prompt))
                .await
                .map_err(ChatError::stream_open)?;

            let events = self
                .client
                .create_run_stream(thread_id, self.run_request())
                .await
                .map_err(ChatError::stream_open)?;

            let events = events.filter_map(|item| {
                future::ready(match item {
                    Ok(event) => into_stream_event(event).map(Ok),
                    Err(err) => Some(Err(ChatError::from(err))),
                })
            });

            Ok(Box::pin(events) as Self::EventStream<'s>)
        })
    }
}

/// Map one assistant SSE event onto the provider-agnostic event set.
/// `None` for events that carry nothing the chat core uses.
pub(crate) fn into_stream_event(event: AssistantStreamEvent) -> Option<StreamEvent> {
    match event {
        AssistantStreamEvent::RunCreated(_) => Some(StreamEvent::Marker(StreamMarker::RunCreated)),
        AssistantStreamEvent::MessageCreated(_) => {
            Some(StreamEvent::Marker(StreamMarker::MessageCreated))
        }
        AssistantStreamEvent::MessageDelta(delta) => Some(StreamEvent::TextDelta(delta.text())),
        AssistantStreamEvent::MessageCompleted(_) => Some(StreamEvent::Marker(StreamMarker::Stop)),
        AssistantStreamEvent::RunStepCreated(step) => match step.step_details {
            StepDetails::ToolCalls { tool_calls } => {
                let kind = tool_calls
                    .into_iter()
                    .next()
                    .map(|call| call.kind)
                    .unwrap_or_else(|| "tool_calls".to_owned());
                Some(StreamEvent::Marker(StreamMarker::ToolCallCreated { kind }))
            }
            _ => None,
        },
        AssistantStreamEvent::RunCompleted(_) => Some(StreamEvent::End),
        AssistantStreamEvent::RunEnded(run) => {
            Some(StreamEvent::Error(run.failure_description()))
        }
        AssistantStreamEvent::RunRequiresAction(_) => Some(StreamEvent::Error(
            "run requires client-side tool outputs, which this chat does not submit".into(),
        )),
        AssistantStreamEvent::Error(err) => Some(StreamEvent::Error(err.to_string())),
        AssistantStreamEvent::RunProgress(_) | AssistantStreamEvent::Done => None,
        AssistantStreamEvent::Other(name) => {
            tracing::trace!(event = %name, "ignoring assistant stream event");
            None
        }
    }
}
