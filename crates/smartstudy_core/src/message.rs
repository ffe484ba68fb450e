//! Transient user-facing messages (snackbar/toast text).

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageDuration {
    Short,
    Long,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserMessage {
    pub text: String,
    pub duration: MessageDuration,
}

impl UserMessage {
    pub fn short(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            duration: MessageDuration::Short,
        }
    }

    pub fn long(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            duration: MessageDuration::Long,
        }
    }

    /// "Couldn't <action>. <error>" shown after a failed persistence call.
    pub fn failure(action: &str, err: &dyn std::error::Error) -> Self {
        Self::long(format!("Couldn't {action}. {err}"))
    }
}

/// Implemented by service errors so hosts can show them without matching.
pub trait ToUserMessage {
    fn to_user_message(&self) -> UserMessage;
}
