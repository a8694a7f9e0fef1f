use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ChurchFeatures {
    pub id: Uuid,
    pub church_id: Uuid,
    pub ai_enabled: bool,
    pub ai_trial_enabled: bool,
    pub ai_trial_start: Option<DateTime<Utc>>,
    pub ai_trial_end: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Per-user override granting AI access inside one church.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct UserFeatures {
    pub id: Uuid,
    pub user_id: Uuid,
    pub church_id: Uuid,
    pub ai_enabled: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Everything the access resolver looks at, flattened from `church_features`
/// and `user_features`. Fetched fresh on every check; never cached.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiFeatureFlags {
    pub church_enabled: bool,
    pub trial_enabled: bool,
    pub trial_start: Option<DateTime<Utc>>,
    pub trial_end: Option<DateTime<Utc>>,
    pub user_enabled: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateChurchFeaturesInput {
    pub ai_enabled: Option<bool>,
    pub ai_trial_enabled: Option<bool>,
    pub ai_trial_end: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnableTrialInput {
    pub days: Option<i64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetUserFeaturesInput {
    pub ai_enabled: bool,
}
