use std::sync::OnceLock;
use std::time::Duration;

use reqwest::StatusCode;
use thiserror::Error;

use crate::config::{Config, config};

const SYSTEM_PROMPT: &str = "You are a pastoral assistant for church leaders. \
You help with Christian leadership, discipleship, pastoral care, cell group \
growth and practical ministry strategy. Answer concisely, with empathy, and \
ground your advice in scripture where it applies.";

const RETRY_DELAY: Duration = Duration::from_millis(500);

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("AI gateway throttled the request")]
    RateLimited,

    #[error("AI gateway refused the request for billing reasons")]
    PaymentRequired,

    #[error("AI gateway returned status {status}: {body}")]
    Upstream { status: u16, body: String },

    #[error("AI gateway request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

impl GatewayError {
    /// Server-side failures are worth one more attempt; quota and billing
    /// refusals are not.
    fn is_retryable(&self) -> bool {
        match self {
            GatewayError::Transport(_) => true,
            GatewayError::Upstream { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// Upstream HTTP status for the failure ledger, when one was seen.
    pub fn provider_status(&self) -> Option<i32> {
        match self {
            GatewayError::RateLimited => Some(429),
            GatewayError::PaymentRequired => Some(402),
            GatewayError::Upstream { status, .. } => Some(i32::from(*status)),
            GatewayError::Transport(_) => None,
        }
    }
}

/// Thin client for the OpenAI-compatible chat completions gateway.
pub struct AiGatewayClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

static GATEWAY: OnceLock<AiGatewayClient> = OnceLock::new();

pub fn gateway() -> &'static AiGatewayClient {
    GATEWAY.get_or_init(|| AiGatewayClient::from_config(config()))
}

impl AiGatewayClient {
    pub fn from_config(config: &Config) -> Self {
        AiGatewayClient {
            client: reqwest::Client::new(),
            base_url: config.ai_gateway_url.trim_end_matches('/').to_string(),
            api_key: config.ai_gateway_key.clone(),
            model: config.ai_model.clone(),
        }
    }

    /// Start a streaming completion for one user message. The returned
    /// response body is the gateway's SSE stream, ready to forward as-is.
    pub async fn stream_chat(
        &self,
        message: &str,
        context: Option<&str>,
    ) -> Result<reqwest::Response, GatewayError> {
        let user_content = match context {
            Some(context) if !context.trim().is_empty() => {
                format!("{}\n\n{}", context, message)
            }
            _ => message.to_string(),
        };

        let payload = serde_json::json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": SYSTEM_PROMPT },
                { "role": "user", "content": user_content },
            ],
            "stream": true,
        });

        match self.send_chat(&payload).await {
            Err(err) if err.is_retryable() => {
                log::warn!("AI gateway request failed, retrying once: {}", err);
                tokio::time::sleep(RETRY_DELAY).await;
                self.send_chat(&payload).await
            }
            result => result,
        }
    }

    async fn send_chat(
        &self,
        payload: &serde_json::Value,
    ) -> Result<reqwest::Response, GatewayError> {
        let response = self
            .client
            .post(format!("{}/v1/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(payload)
            .send()
            .await?;

        match response.status() {
            StatusCode::TOO_MANY_REQUESTS => Err(GatewayError::RateLimited),
            StatusCode::PAYMENT_REQUIRED => Err(GatewayError::PaymentRequired),
            status if status.is_success() => Ok(response),
            status => {
                let body = response.text().await.unwrap_or_default();
                Err(GatewayError::Upstream {
                    status: status.as_u16(),
                    body,
                })
            }
        }
    }
}
