use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::database::models::AiFeatureFlags;
use crate::database::repositories::features as features_repo;
use crate::error::AppError;

/// Outcome of an access check, with enough metadata for clients to render
/// trial banners.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AiAccess {
    pub allowed: bool,
    pub is_trial: bool,
    pub trial_end: Option<DateTime<Utc>>,
}

impl AiAccess {
    fn denied() -> Self {
        AiAccess {
            allowed: false,
            is_trial: false,
            trial_end: None,
        }
    }

    fn permanent() -> Self {
        AiAccess {
            allowed: true,
            is_trial: false,
            trial_end: None,
        }
    }

    fn trial(trial_end: DateTime<Utc>) -> Self {
        AiAccess {
            allowed: true,
            is_trial: true,
            trial_end: Some(trial_end),
        }
    }
}

/// Decide whether the assistant is available, in priority order: a paid
/// church plan wins over a running trial, which wins over a per-user grant.
/// The trial window is inclusive of its end instant.
pub fn resolve_access(flags: &AiFeatureFlags, now: DateTime<Utc>) -> AiAccess {
    if flags.church_enabled {
        return AiAccess::permanent();
    }

    if flags.trial_enabled {
        if let Some(end) = flags.trial_end {
            if now <= end {
                return AiAccess::trial(end);
            }
        }
    }

    if flags.user_enabled {
        return AiAccess::permanent();
    }

    AiAccess::denied()
}

/// Fetch the flags fresh and resolve them. A trial found past its end date is
/// switched off in storage here, so expiry needs no scheduler; the flip is
/// best effort and never fails the request.
pub async fn evaluate(church_id: Uuid, user_id: Uuid) -> Result<AiAccess, AppError> {
    let flags = features_repo::flags_for(church_id, user_id).await?;
    let now = Utc::now();
    let access = resolve_access(&flags, now);

    let trial_expired = !flags.church_enabled
        && flags.trial_enabled
        && flags.trial_end.is_some_and(|end| now > end);

    if trial_expired {
        if let Err(err) = features_repo::disable_trial(church_id).await {
            log::warn!(
                "Failed to disable expired AI trial for church {}: {}",
                church_id,
                err
            );
        } else {
            log::info!("AI trial expired for church {}, disabled", church_id);
        }
    }

    Ok(access)
}
