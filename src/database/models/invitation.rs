use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::database::models::ChurchRole;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Invitation {
    pub id: Uuid,
    pub church_id: Uuid,
    pub email: String,
    pub role: ChurchRole,
    pub token: String,
    pub invited_by: Uuid,
    pub full_name: Option<String>,
    pub congregation_id: Option<Uuid>,
    pub member_id: Option<Uuid>,
    pub expires_at: DateTime<Utc>,
    pub used_at: Option<DateTime<Utc>>,
    pub used_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl Invitation {
    /// A consumable invitation is unused and not past its expiry.
    pub fn is_pending(&self, now: DateTime<Utc>) -> bool {
        self.used_at.is_none() && now <= self.expires_at
    }

    /// Decide what accepting this invitation means for the acting account.
    /// Consumption is checked before expiry, so a stale invitation that was
    /// consumed still reports who holds it; expiry is checked before the
    /// email comparison.
    pub fn classify_acceptance(
        &self,
        user_id: Uuid,
        user_email: &str,
        now: DateTime<Utc>,
    ) -> AcceptDecision {
        if self.used_at.is_some() {
            if self.used_by == Some(user_id) {
                return AcceptDecision::AlreadyAccepted;
            }
            return AcceptDecision::Rejected(AcceptFailure::AlreadyUsed);
        }

        if now > self.expires_at {
            return AcceptDecision::Rejected(AcceptFailure::Expired);
        }

        if !self.email.eq_ignore_ascii_case(user_email) {
            return AcceptDecision::Rejected(AcceptFailure::EmailMismatch);
        }

        AcceptDecision::Consume
    }
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateInvitationInput {
    pub email: String,
    pub role: ChurchRole,
    pub full_name: Option<String>,
    pub congregation_id: Option<Uuid>,
    pub member_id: Option<Uuid>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateInvitationResponse {
    pub id: Uuid,
    pub invite_link: String,
    pub expires_at: DateTime<Utc>,
}

/// What the public validation endpoint reveals about a pending invitation.
/// Expired, consumed and unknown tokens all collapse to a not-found before
/// this is ever built.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateInvitationResponse {
    pub email: String,
    pub role: ChurchRole,
    pub church_id: Uuid,
    pub church_name: String,
    pub church_logo_url: Option<String>,
    pub inviter_name: String,
    pub full_name: Option<String>,
    pub congregation_id: Option<Uuid>,
    pub member_id: Option<Uuid>,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AcceptInvitationInput {
    pub token: String,
}

/// Failure classes of invitation acceptance. Kept distinct on the wire so
/// callers (and tests) can tell an expired invitation from one consumed by
/// another account.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcceptFailure {
    NotFound,
    Expired,
    AlreadyUsed,
    EmailMismatch,
}

impl AcceptFailure {
    pub fn code(&self) -> &'static str {
        match self {
            AcceptFailure::NotFound => "not_found",
            AcceptFailure::Expired => "expired",
            AcceptFailure::AlreadyUsed => "already_used",
            AcceptFailure::EmailMismatch => "email_mismatch",
        }
    }
}

/// Where an acceptance attempt stands before any row is touched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcceptDecision {
    /// The acting account consumed this invitation earlier; accepting again
    /// is a no-op success.
    AlreadyAccepted,
    /// Pending and addressed to the acting account; consume it.
    Consume,
    Rejected(AcceptFailure),
}

/// Body of `POST /invitations/accept`. Business outcomes ride an HTTP 200;
/// `success: false` carries the failure class in `error`.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AcceptOutcome {
    pub success: bool,
    pub error: Option<String>,
    pub roles: Vec<ChurchRole>,
}

impl AcceptOutcome {
    pub fn accepted(roles: Vec<ChurchRole>) -> Self {
        Self {
            success: true,
            error: None,
            roles,
        }
    }

    pub fn rejected(failure: AcceptFailure) -> Self {
        Self {
            success: false,
            error: Some(failure.code().to_string()),
            roles: Vec::new(),
        }
    }
}
