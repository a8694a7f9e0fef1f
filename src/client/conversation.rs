use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatRole {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

/// Transcript state for one chat pane. Streamed deltas fold into a single
/// assistant message, so the caller always renders at most one open reply
/// per exchange.
#[derive(Debug, Default, Clone)]
pub struct Conversation {
    messages: Vec<ChatMessage>,
    assistant_open: bool,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn push_user(&mut self, content: impl Into<String>) {
        self.assistant_open = false;
        self.messages.push(ChatMessage {
            role: ChatRole::User,
            content: content.into(),
        });
    }

    /// Append a streamed fragment, opening the assistant message on the
    /// first delta and growing it in place afterwards.
    pub fn apply_delta(&mut self, delta: &str) {
        if self.assistant_open {
            if let Some(last) = self.messages.last_mut() {
                if last.role == ChatRole::Assistant {
                    last.content.push_str(delta);
                    return;
                }
            }
        }

        self.messages.push(ChatMessage {
            role: ChatRole::Assistant,
            content: delta.to_string(),
        });
        self.assistant_open = true;
    }

    /// Close the open assistant message; the next delta starts a new one.
    pub fn finish(&mut self) {
        self.assistant_open = false;
    }

    /// Drop the most recent message, whichever side it came from. Used to
    /// back out an exchange the server refused or cut short.
    pub fn pop_last(&mut self) -> Option<ChatMessage> {
        self.assistant_open = false;
        self.messages.pop()
    }

    pub fn last_assistant_text(&self) -> Option<&str> {
        self.messages
            .iter()
            .rev()
            .find(|m| m.role == ChatRole::Assistant)
            .map(|m| m.content.as_str())
    }

    pub fn clear(&mut self) {
        self.messages.clear();
        self.assistant_open = false;
    }
}
