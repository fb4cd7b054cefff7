//! Outgoing chat payloads.
//!
//! Every reply is one of three shapes: a plain [`TextMessage`], a Block Kit
//! [`BlockMessage`], or a [`FileUpload`]. The first two serialize straight to
//! the JSON the chat platform expects; uploads are sent as multipart forms.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ResponseType {
    /// Only visible to the user who invoked the command.
    #[default]
    Ephemeral,
    /// Visible to everyone in the channel.
    InChannel,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextMessage {
    pub response_type: ResponseType,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockMessage {
    pub response_type: ResponseType,
    pub blocks: Vec<Block>,
    /// Notification fallback for clients that cannot render blocks.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ChatMessage {
    Text(TextMessage),
    Blocks(BlockMessage),
}

impl ChatMessage {
    pub fn ephemeral(text: impl Into<String>) -> Self {
        ChatMessage::Text(TextMessage {
            response_type: ResponseType::Ephemeral,
            text: text.into(),
        })
    }

    pub fn in_channel_blocks(blocks: Vec<Block>) -> Self {
        ChatMessage::Blocks(BlockMessage {
            response_type: ResponseType::InChannel,
            blocks,
            text: None,
        })
    }

    pub fn with_fallback_text(self, fallback: impl Into<String>) -> Self {
        match self {
            ChatMessage::Blocks(mut message) => {
                message.text = Some(fallback.into());
                ChatMessage::Blocks(message)
            }
            other => other,
        }
    }
}

/// Raw text shipped as a file instead of an inline message.
#[derive(Debug, Clone, PartialEq)]
pub struct FileUpload {
    pub channel_id: String,
    pub content: String,
    pub filename: String,
    pub filetype: String,
    pub title: String,
}

impl FileUpload {
    pub fn into_form(self) -> reqwest::multipart::Form {
        reqwest::multipart::Form::new()
            .text("channels", self.channel_id)
            .text("content", self.content)
            .text("filename", self.filename)
            .text("filetype", self.filetype)
            .text("title", self.title)
    }
}

/// Block Kit blocks used by the responder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Block {
    Section { text: TextObject },
    Divider {},
    Context { elements: Vec<TextObject> },
    Actions { elements: Vec<ButtonElement> },
}

impl Block {
    pub fn section(mrkdwn: impl Into<String>) -> Self {
        Block::Section {
            text: TextObject::mrkdwn(mrkdwn),
        }
    }

    pub fn context(mrkdwn: impl Into<String>) -> Self {
        Block::Context {
            elements: vec![TextObject::mrkdwn(mrkdwn)],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextObject {
    #[serde(rename = "type")]
    pub text_type: String,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emoji: Option<bool>,
}

impl TextObject {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text_type: "plain_text".to_string(),
            text: text.into(),
            emoji: Some(false),
        }
    }

    pub fn mrkdwn(text: impl Into<String>) -> Self {
        Self {
            text_type: "mrkdwn".to_string(),
            text: text.into(),
            emoji: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ButtonElement {
    #[serde(rename = "type")]
    pub element_type: String,
    pub text: TextObject,
    pub action_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

impl ButtonElement {
    pub fn new(label: impl Into<String>, action_id: impl Into<String>) -> Self {
        Self {
            element_type: "button".to_string(),
            text: TextObject::plain(label),
            action_id: action_id.into(),
            value: None,
        }
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }
}
