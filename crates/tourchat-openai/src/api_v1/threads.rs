use serde::{Deserialize, Serialize};

use super::common::MessageRole;

/// Body for `POST /threads`. Empty: threads start without messages.
#[derive(Debug, Serialize, Clone, Default)]
pub struct CreateThreadRequest {}

#[allow(dead_code)]
#[derive(Debug, Deserialize, Clone)]
pub struct ThreadObject {
    pub id: String,
    pub object: String,
    pub created_at: i64,
}

/// Body for `POST /threads/{thread_id}/messages`.
#[derive(Debug, Serialize, Clone)]
pub struct CreateMessageRequest {
    pub role: MessageRole,
    pub content: String,
}

impl CreateMessageRequest {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }
}

#[allow(dead_code)]
#[derive(Debug, Deserialize, Clone)]
pub struct MessageObject {
    pub id: String,
    pub thread_id: String,
    pub role: MessageRole,
    #[serde(default)]
    pub content: Vec<MessageContent>,
}

/// One content part of a message or message delta.
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MessageContent {
    Text {
        #[serde(default)]
        index: Option<usize>,
        text: TextContent,
    },
    ImageFile {
        #[serde(default)]
        index: Option<usize>,
        image_file: serde_json::Value,
    },
    #[serde(other)]
    Unsupported,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct TextContent {
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default)]
    pub annotations: Vec<serde_json::Value>,
}
