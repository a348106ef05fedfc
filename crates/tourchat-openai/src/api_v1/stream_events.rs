use serde::Deserialize;

use super::{
    common::ApiErrorObject,
    runs::{RunObject, RunStepObject},
    threads::{MessageContent, MessageObject},
};

/// Payload of `thread.message.delta`.
#[allow(dead_code)]
#[derive(Debug, Deserialize, Clone)]
pub struct MessageDeltaObject {
    pub id: String,
    pub delta: MessageDelta,
}

#[derive(Debug, Deserialize, Clone)]
pub struct MessageDelta {
    #[serde(default)]
    pub content: Vec<MessageContent>,
}

impl MessageDeltaObject {
    /// Text carried by this delta, all text parts joined in order.
    pub fn text(&self) -> String {
        self.delta
            .content
            .iter()
            .filter_map(|part| match part {
                MessageContent::Text { text, .. } => text.value.as_deref(),
                _ => None,
            })
            .collect()
    }
}

/// `error` events carry the error object either bare or wrapped.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ErrorPayload {
    Wrapped { error: ApiErrorObject },
    Bare(ApiErrorObject),
}

/// One server-sent event of a streamed assistant run.
///
/// The SSE `event:` line names the event; `data:` holds the JSON object.
#[derive(Debug, Clone)]
pub enum AssistantStreamEvent {
    RunCreated(RunObject),
    /// `queued`, `in_progress`, `cancelling`, ... transitions.
    RunProgress(RunObject),
    RunRequiresAction(RunObject),
    RunCompleted(RunObject),
    /// `failed`, `cancelled`, `expired` and `incomplete`.
    RunEnded(RunObject),
    RunStepCreated(RunStepObject),
    MessageCreated(MessageObject),
    MessageDelta(MessageDeltaObject),
    MessageCompleted(MessageObject),
    Error(ApiErrorObject),
    Done,
    /// Anything this crate does not interpret.
    Other(String),
}

impl AssistantStreamEvent {
    pub fn parse(event: &str, data: &str) -> Result<Self, serde_json::Error> {
        if data.trim() == "[DONE]" || event == "done" {
            return Ok(Self::Done);
        }

        let parsed = match event {
            "thread.run.created" => Self::RunCreated(serde_json::from_str(data)?),
            "thread.run.queued" | "thread.run.in_progress" | "thread.run.cancelling" => {
                Self::RunProgress(serde_json::from_str(data)?)
            }
            "thread.run.requires_action" => Self::RunRequiresAction(serde_json::from_str(data)?),
            "thread.run.completed" => Self::RunCompleted(serde_json::from_str(data)?),
            "thread.run.failed"
            | "thread.run.cancelled"
            | "thread.run.expired"
            | "thread.run.incomplete" => Self::RunEnded(serde_json::from_str(data)?),
            "thread.run.step.created" => Self::RunStepCreated(serde_json::from_str(data)?),
            "thread.message.created" => Self::MessageCreated(serde_json::from_str(data)?),
            "thread.message.delta" => Self::MessageDelta(serde_json::from_str(data)?),
            "thread.message.completed" => Self::MessageCompleted(serde_json::from_str(data)?),
            "error" => match serde_json::from_str::<ErrorPayload>(data)? {
                ErrorPayload::Wrapped { error } | ErrorPayload::Bare(error) => Self::Error(error),
            },
            other => Self::Other(other.to_owned()),
        };

        Ok(parsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api_v1::RunStatus;

    #[test]
    fn parses_text_delta() {
        let data = r#"{"id":"msg_1","object":"thread.message.delta","delta":{"content":[{"index":0,"type":"text","text":{"value":"Hello","annotations":[]}}]}}"#;

        let AssistantStreamEvent::MessageDelta(delta) =
            AssistantStreamEvent::parse("thread.message.delta", data).unwrap()
        else {
            panic!("expected a message delta");
        };
        assert_eq!(delta.text(), "Hello");
    }

    #[test]
    fn delta_without_text_parts_is_empty() {
        let data = r#"{"id":"msg_1","delta":{"content":[{"index":0,"type":"image_file","image_file":{"file_id":"file_1"}}]}}"#;

        let AssistantStreamEvent::MessageDelta(delta) =
            AssistantStreamEvent::parse("thread.message.delta", data).unwrap()
        else {
            panic!("expected a message delta");
        };
        assert_eq!(delta.text(), "");
    }

    #[test]
    fn parses_failed_run() {
        let data = r#"{"id":"run_1","thread_id":"thread_1","status":"failed","last_error":{"code":"rate_limit_exceeded","message":"Slow down"}}"#;

        let AssistantStreamEvent::RunEnded(run) =
            AssistantStreamEvent::parse("thread.run.failed", data).unwrap()
        else {
            panic!("expected run end");
        };
        assert_eq!(run.status, RunStatus::Failed);
        assert_eq!(run.failure_description(), "rate_limit_exceeded: Slow down");
    }

    #[test]
    fn expired_run_without_error_names_status() {
        let data = r#"{"id":"run_1","thread_id":"thread_1","status":"expired"}"#;

        let AssistantStreamEvent::RunEnded(run) =
            AssistantStreamEvent::parse("thread.run.expired", data).unwrap()
        else {
            panic!("expected run end");
        };
        assert_eq!(run.failure_description(), "run ended with status Expired");
    }

    #[test]
    fn parses_tool_call_step() {
        let data = r#"{"id":"step_1","run_id":"run_1","step_details":{"type":"tool_calls","tool_calls":[{"id":"call_1","type":"file_search","file_search":{}}]}}"#;

        let AssistantStreamEvent::RunStepCreated(step) =
            AssistantStreamEvent::parse("thread.run.step.created", data).unwrap()
        else {
            panic!("expected run step");
        };
        let crate::api_v1::StepDetails::ToolCalls { tool_calls } = step.step_details else {
            panic!("expected tool calls");
        };
        assert_eq!(tool_calls[0].kind, "file_search");
    }

    #[test]
    fn parses_error_payload_shapes() {
        for data in [
            r#"{"error":{"code":"server_error","message":"boom"}}"#,
            r#"{"code":"server_error","message":"boom"}"#,
        ] {
            let AssistantStreamEvent::Error(err) =
                AssistantStreamEvent::parse("error", data).unwrap()
            else {
                panic!("expected error");
            };
            assert_eq!(err.to_string(), "server_error: boom");
        }
    }

    #[test]
    fn done_and_unknown_events() {
        assert!(matches!(
            AssistantStreamEvent::parse("done", "[DONE]").unwrap(),
            AssistantStreamEvent::Done
        ));
        assert!(matches!(
            AssistantStreamEvent::parse("thread.run.step.delta", "{}").unwrap(),
            AssistantStreamEvent::Other(name) if name == "thread.run.step.delta"
        ));
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(AssistantStreamEvent::parse("thread.message.delta", "{not json").is_err());
    }
}
