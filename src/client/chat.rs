use uuid::Uuid;

use crate::client::api::{ApiClient, ClientError};
use crate::client::conversation::Conversation;
use crate::client::sse::{SseEvent, SseParser};
use crate::database::models::{ChatInput, SaveChatHistoryInput};

/// One chat pane bound to a church: owns the transcript, drives the SSE
/// stream and persists finished exchanges in the background.
pub struct ChatSession {
    api: ApiClient,
    church_id: Uuid,
    conversation: Conversation,
    streaming: bool,
}

impl ChatSession {
    pub fn new(api: ApiClient, church_id: Uuid) -> Self {
        ChatSession {
            api,
            church_id,
            conversation: Conversation::new(),
            streaming: false,
        }
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    pub fn is_streaming(&self) -> bool {
        self.streaming
    }

    pub fn clear(&mut self) {
        self.conversation.clear();
    }

    /// Send one user message and stream the reply into the transcript.
    /// Refusals and transport failures back the newest message out again,
    /// so a failed exchange leaves no half-finished reply behind.
    pub async fn send(&mut self, input: &str) -> Result<(), ClientError> {
        if self.streaming {
            return Err(ClientError::Busy);
        }

        let message = input.trim().to_string();
        if message.is_empty() {
            return Ok(());
        }

        self.conversation.push_user(message.clone());
        self.streaming = true;

        let result = self.stream_exchange(&message).await;
        self.streaming = false;

        match result {
            Ok(reply) => {
                self.conversation.finish();
                if !reply.is_empty() {
                    self.persist_history(message, reply);
                }
                Ok(())
            }
            Err(err) => {
                self.conversation.pop_last();
                Err(err)
            }
        }
    }

    async fn stream_exchange(&mut self, message: &str) -> Result<String, ClientError> {
        let request = ChatInput {
            message: message.to_string(),
            church_id: self.church_id,
            context: None,
        };

        let mut response = self.api.start_chat(&request).await?;

        let mut parser = SseParser::new();
        let mut reply = String::new();

        while let Some(chunk) = response.chunk().await? {
            for event in parser.push(&chunk) {
                match event {
                    SseEvent::Delta(delta) => {
                        reply.push_str(&delta);
                        self.conversation.apply_delta(&delta);
                    }
                    SseEvent::Done => return Ok(reply),
                }
            }
        }

        Ok(reply)
    }

    /// History writes never block or fail the exchange; a lost row is only
    /// logged.
    fn persist_history(&self, message: String, response: String) {
        let api = self.api.clone();
        let input = SaveChatHistoryInput {
            church_id: self.church_id,
            message,
            response,
        };

        tokio::spawn(async move {
            if let Err(err) = api.save_ai_history(&input).await {
                log::warn!("Failed to persist chat history: {}", err);
            }
        });
    }
}
