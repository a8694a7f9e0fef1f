use chrono::Utc;
use reqwest::StatusCode;
use serde::{Deserialize, de::DeserializeOwned};
use thiserror::Error;
use uuid::Uuid;

use crate::database::models::{
    AcceptInvitationInput, AcceptOutcome, AiFeatureFlags, AuthResponse, ChatHistoryEntry,
    ChatInput, CreateInvitationInput, CreateInvitationResponse, CreateUserInput, Invitation,
    LoginInput, MeResponse, SaveChatHistoryInput, ValidateInvitationResponse,
};
use crate::handlers::shared::ApiResponse;
use crate::services::ai_access::{AiAccess, resolve_access};

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("server returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("AI assistant requires the premium plan")]
    PremiumRequired,

    #[error("daily AI limit reached")]
    LimitReached,

    #[error("too many AI requests, try again shortly")]
    RateLimited,

    #[error("AI credits exhausted")]
    CreditsExhausted,

    #[error("a chat exchange is already streaming")]
    Busy,

    #[error("not signed in")]
    NotAuthenticated,

    #[error("could not decode server response: {0}")]
    Decode(String),
}

/// Typed client for the HTTP API. Cheap to clone; clones share the
/// underlying connection pool.
#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
    http: reqwest::Client,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        ApiClient {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http: reqwest::Client::new(),
            token: None,
        }
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn set_token(&mut self, token: Option<String>) {
        self.token = token;
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    pub async fn register(&mut self, input: &CreateUserInput) -> Result<AuthResponse, ClientError> {
        let response = self
            .http
            .post(self.url("/auth/register"))
            .json(input)
            .send()
            .await?;

        let auth: AuthResponse = Self::unwrap_envelope(response).await?;
        self.token = Some(auth.token.clone());
        Ok(auth)
    }

    pub async fn login(&mut self, email: &str, password: &str) -> Result<AuthResponse, ClientError> {
        let input = LoginInput {
            email: email.to_string(),
            password: password.to_string(),
        };

        let response = self
            .http
            .post(self.url("/auth/login"))
            .json(&input)
            .send()
            .await?;

        let auth: AuthResponse = Self::unwrap_envelope(response).await?;
        self.token = Some(auth.token.clone());
        Ok(auth)
    }

    pub async fn me(&self) -> Result<MeResponse, ClientError> {
        let response = self.authed(self.http.get(self.url("/auth/me")))?.send().await?;
        Self::unwrap_envelope(response).await
    }

    /// Preview a pending invitation. No authentication required; unknown,
    /// consumed and expired tokens all come back as a 404.
    pub async fn validate_invitation(
        &self,
        token: &str,
    ) -> Result<ValidateInvitationResponse, ClientError> {
        let response = self
            .http
            .get(self.url(&format!("/invitations/validate/{}", token)))
            .send()
            .await?;

        Self::unwrap_envelope(response).await
    }

    pub async fn create_invitation(
        &self,
        input: &CreateInvitationInput,
    ) -> Result<CreateInvitationResponse, ClientError> {
        let response = self
            .authed(self.http.post(self.url("/invitations")))?
            .json(input)
            .send()
            .await?;

        Self::unwrap_envelope(response).await
    }

    pub async fn list_invitations(&self) -> Result<Vec<Invitation>, ClientError> {
        let response = self
            .authed(self.http.get(self.url("/invitations")))?
            .send()
            .await?;

        Self::unwrap_envelope(response).await
    }

    pub async fn revoke_invitation(&self, invitation_id: Uuid) -> Result<(), ClientError> {
        let response = self
            .authed(
                self.http
                    .delete(self.url(&format!("/invitations/{}", invitation_id))),
            )?
            .send()
            .await?;

        let _: String = Self::unwrap_envelope(response).await?;
        Ok(())
    }

    /// Consume an invitation. The outcome is a plain body, not the standard
    /// envelope: business refusals ride an HTTP 200 with `success: false`.
    pub async fn accept_invitation(&self, token: &str) -> Result<AcceptOutcome, ClientError> {
        let input = AcceptInvitationInput {
            token: token.to_string(),
        };

        let response = self
            .authed(self.http.post(self.url("/invitations/accept")))?
            .json(&input)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(Self::error_from_body(status, &body));
        }

        serde_json::from_str(&body).map_err(|e| ClientError::Decode(e.to_string()))
    }

    /// Fetch the caller's raw feature flags and run the access resolver
    /// against the local clock. Advisory: the server re-resolves on every
    /// chat call.
    pub async fn ai_access(&self, church_id: Uuid) -> Result<AiAccess, ClientError> {
        let response = self
            .authed(
                self.http
                    .get(self.url(&format!("/ai/access?churchId={}", church_id))),
            )?
            .send()
            .await?;

        let flags: AiFeatureFlags = Self::unwrap_envelope(response).await?;
        Ok(resolve_access(&flags, Utc::now()))
    }

    pub async fn ai_history(&self, church_id: Uuid) -> Result<Vec<ChatHistoryEntry>, ClientError> {
        let response = self
            .authed(
                self.http
                    .get(self.url(&format!("/ai/history?churchId={}", church_id))),
            )?
            .send()
            .await?;

        Self::unwrap_envelope(response).await
    }

    pub async fn save_ai_history(
        &self,
        input: &SaveChatHistoryInput,
    ) -> Result<ChatHistoryEntry, ClientError> {
        let response = self
            .authed(self.http.post(self.url("/ai/history")))?
            .json(input)
            .send()
            .await?;

        Self::unwrap_envelope(response).await
    }

    /// Start a streaming completion. On success the returned response body
    /// is the raw SSE stream; refusals are mapped to their typed errors
    /// before any stream handling starts.
    pub async fn start_chat(&self, input: &ChatInput) -> Result<reqwest::Response, ClientError> {
        let response = self
            .authed(self.http.post(self.url("/ai/chat")))?
            .json(input)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Self::error_from_body(status, &body));
        }

        Ok(response)
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api/v1{}", self.base_url, path)
    }

    fn authed(
        &self,
        builder: reqwest::RequestBuilder,
    ) -> Result<reqwest::RequestBuilder, ClientError> {
        match &self.token {
            Some(token) => Ok(builder.bearer_auth(token)),
            None => Err(ClientError::NotAuthenticated),
        }
    }

    async fn unwrap_envelope<T: DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, ClientError> {
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(Self::error_from_body(status, &body));
        }

        let envelope: ApiResponse<T> =
            serde_json::from_str(&body).map_err(|e| ClientError::Decode(e.to_string()))?;

        match envelope.data {
            Some(data) if envelope.success => Ok(data),
            _ => Err(ClientError::Api {
                status: status.as_u16(),
                message: envelope
                    .message
                    .unwrap_or_else(|| "missing response data".to_string()),
            }),
        }
    }

    /// Map failure bodies to typed errors. The AI endpoints carry a
    /// machine-readable code in `error`; everything else falls back to the
    /// envelope message or the raw body.
    fn error_from_body(status: StatusCode, body: &str) -> ClientError {
        #[derive(Default, Deserialize)]
        struct WireError {
            #[serde(default)]
            error: Option<String>,
            #[serde(default)]
            message: Option<String>,
        }

        let wire: WireError = serde_json::from_str(body).unwrap_or_default();

        match wire.error.as_deref() {
            Some("premium_required") => return ClientError::PremiumRequired,
            Some("limit_reached") => return ClientError::LimitReached,
            Some("rate_limit") => return ClientError::RateLimited,
            Some("payment_required") => return ClientError::CreditsExhausted,
            _ => {}
        }

        ClientError::Api {
            status: status.as_u16(),
            message: wire.message.unwrap_or_else(|| body.to_string()),
        }
    }
}
