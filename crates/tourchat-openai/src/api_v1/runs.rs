use serde::{Deserialize, Serialize};

use crate::impl_builder_methods;

use super::common::ApiErrorObject;

/// Body for `POST /threads/{thread_id}/runs`.
#[derive(Debug, Serialize, Clone)]
pub struct CreateRunRequest {
    pub assistant_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stream: Option<bool>,
}

impl CreateRunRequest {
    pub fn new(assistant_id: impl Into<String>) -> Self {
        Self {
            assistant_id: assistant_id.into(),
            model: None,
            instructions: None,
            stream: None,
        }
    }
}

impl_builder_methods!(
    CreateRunRequest,
    model: String,
    instructions: String,
    stream: bool
);

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Queued,
    InProgress,
    RequiresAction,
    Cancelling,
    Cancelled,
    Failed,
    Completed,
    Incomplete,
    Expired,
    #[serde(other)]
    Unknown,
}

#[allow(dead_code)]
#[derive(Debug, Deserialize, Clone)]
pub struct RunObject {
    pub id: String,
    pub thread_id: String,
    pub status: RunStatus,
    #[serde(default)]
    pub last_error: Option<ApiErrorObject>,
    #[serde(default)]
    pub incomplete_details: Option<IncompleteDetails>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct IncompleteDetails {
    #[serde(default)]
    pub reason: Option<String>,
}

impl RunObject {
    /// Human-readable reason for a run that did not complete.
    pub fn failure_description(&self) -> String {
        if let Some(error) = &self.last_error {
            return error.to_string();
        }
        if let Some(reason) = self
            .incomplete_details
            .as_ref()
            .and_then(|details| details.reason.as_deref())
        {
            return format!("run incomplete: {reason}");
        }
        format!("run ended with status {:?}", self.status)
    }
}

#[allow(dead_code)]
#[derive(Debug, Deserialize, Clone)]
pub struct RunStepObject {
    pub id: String,
    pub run_id: String,
    pub step_details: StepDetails,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StepDetails {
    MessageCreation {},
    ToolCalls {
        #[serde(default)]
        tool_calls: Vec<ToolCallSummary>,
    },
    #[serde(other)]
    Unsupported,
}

/// Only the tool kind is surfaced; arguments and outputs stay server-side.
#[derive(Debug, Deserialize, Clone)]
pub struct ToolCallSummary {
    #[serde(rename = "type")]
    pub kind: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unset_options_stay_off_the_wire() {
        let json = serde_json::to_value(CreateRunRequest::new("asst_1").stream(true)).unwrap();

        assert_eq!(
            json,
            serde_json::json!({ "assistant_id": "asst_1", "stream": true })
        );
    }

    #[test]
    fn builder_methods_set_options() {
        let request = CreateRunRequest::new("asst_1")
            .model("gpt-4o".to_owned())
            .instructions("Answer briefly.".to_owned());

        assert_eq!(request.model.as_deref(), Some("gpt-4o"));
        assert_eq!(request.instructions.as_deref(), Some("Answer briefly."));
        assert_eq!(request.stream, None);
    }
}
