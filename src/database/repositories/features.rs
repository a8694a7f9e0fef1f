use anyhow::Result;
use chrono::{Duration, Utc};
use uuid::Uuid;

use crate::database::{
    get_pool,
    models::{AiFeatureFlags, ChurchFeatures, UpdateChurchFeaturesInput, UserFeatures},
    utils::sql,
};

const CHURCH_FEATURE_COLUMNS: &str = r#"
    id,
    church_id,
    ai_enabled,
    ai_trial_enabled,
    ai_trial_start,
    ai_trial_end,
    created_at,
    updated_at
"#;

pub async fn get_church_features(church_id: Uuid) -> Result<Option<ChurchFeatures>> {
    let features = sqlx::query_as::<_, ChurchFeatures>(&sql(&format!(
        r#"
        SELECT
            {CHURCH_FEATURE_COLUMNS}
        FROM
            church_features
        WHERE
            church_id = ?
        "#
    )))
    .bind(church_id)
    .fetch_optional(get_pool())
    .await?;

    Ok(features)
}

/// Fetch the church's flag row, creating an all-off default if none exists.
pub async fn ensure_church_features(church_id: Uuid) -> Result<ChurchFeatures> {
    let now = Utc::now();
    let features = sqlx::query_as::<_, ChurchFeatures>(&sql(&format!(
        r#"
        INSERT INTO
            church_features (id, church_id, ai_enabled, ai_trial_enabled, created_at, updated_at)
        VALUES
            (?, ?, FALSE, FALSE, ?, ?)
        ON CONFLICT (church_id) DO UPDATE
        SET
            church_id = EXCLUDED.church_id
        RETURNING
            {CHURCH_FEATURE_COLUMNS}
        "#
    )))
    .bind(Uuid::new_v4())
    .bind(church_id)
    .bind(now)
    .bind(now)
    .fetch_one(get_pool())
    .await?;

    Ok(features)
}

pub async fn update_church_features(
    church_id: Uuid,
    input: &UpdateChurchFeaturesInput,
) -> Result<ChurchFeatures> {
    // Make sure the row exists so a partial update has something to land on.
    ensure_church_features(church_id).await?;

    let features = sqlx::query_as::<_, ChurchFeatures>(&sql(&format!(
        r#"
        UPDATE church_features
        SET
            ai_enabled = COALESCE(?, ai_enabled),
            ai_trial_enabled = COALESCE(?, ai_trial_enabled),
            ai_trial_end = COALESCE(?, ai_trial_end),
            updated_at = ?
        WHERE
            church_id = ?
        RETURNING
            {CHURCH_FEATURE_COLUMNS}
        "#
    )))
    .bind(input.ai_enabled)
    .bind(input.ai_trial_enabled)
    .bind(input.ai_trial_end)
    .bind(Utc::now())
    .bind(church_id)
    .fetch_one(get_pool())
    .await?;

    Ok(features)
}

/// Open a trial window [now, now + days] for the church.
pub async fn enable_trial(church_id: Uuid, days: i64) -> Result<ChurchFeatures> {
    let now = Utc::now();
    let trial_end = now + Duration::days(days);

    let features = sqlx::query_as::<_, ChurchFeatures>(&sql(&format!(
        r#"
        INSERT INTO
            church_features (
                id,
                church_id,
                ai_enabled,
                ai_trial_enabled,
                ai_trial_start,
                ai_trial_end,
                created_at,
                updated_at
            )
        VALUES
            (?, ?, FALSE, TRUE, ?, ?, ?, ?)
        ON CONFLICT (church_id) DO UPDATE
        SET
            ai_trial_enabled = TRUE,
            ai_trial_start = EXCLUDED.ai_trial_start,
            ai_trial_end = EXCLUDED.ai_trial_end,
            updated_at = EXCLUDED.updated_at
        RETURNING
            {CHURCH_FEATURE_COLUMNS}
        "#
    )))
    .bind(Uuid::new_v4())
    .bind(church_id)
    .bind(now)
    .bind(trial_end)
    .bind(now)
    .bind(now)
    .fetch_one(get_pool())
    .await?;

    Ok(features)
}

/// Lazy-expiry flip: the trial flag is cleared the first time a check runs
/// past the window, not by a scheduler.
pub async fn disable_trial(church_id: Uuid) -> Result<()> {
    sqlx::query(&sql(r#"
        UPDATE church_features
        SET
            ai_trial_enabled = FALSE,
            updated_at = ?
        WHERE
            church_id = ?
    "#))
    .bind(Utc::now())
    .bind(church_id)
    .execute(get_pool())
    .await?;

    Ok(())
}

pub async fn set_user_override(
    user_id: Uuid,
    church_id: Uuid,
    ai_enabled: bool,
) -> Result<UserFeatures> {
    let now = Utc::now();
    let features = sqlx::query_as::<_, UserFeatures>(&sql(r#"
        INSERT INTO
            user_features (id, user_id, church_id, ai_enabled, created_at, updated_at)
        VALUES
            (?, ?, ?, ?, ?, ?)
        ON CONFLICT (user_id, church_id) DO UPDATE
        SET
            ai_enabled = EXCLUDED.ai_enabled,
            updated_at = EXCLUDED.updated_at
        RETURNING
            id,
            user_id,
            church_id,
            ai_enabled,
            created_at,
            updated_at
    "#))
    .bind(Uuid::new_v4())
    .bind(user_id)
    .bind(church_id)
    .bind(ai_enabled)
    .bind(now)
    .bind(now)
    .fetch_one(get_pool())
    .await?;

    Ok(features)
}

/// Everything the access resolver needs, in one round trip per table.
/// Missing rows read as all-off.
pub async fn flags_for(church_id: Uuid, user_id: Uuid) -> Result<AiFeatureFlags> {
    let church = get_church_features(church_id).await?;

    let user_enabled: Option<bool> = sqlx::query_scalar(&sql(r#"
        SELECT
            ai_enabled
        FROM
            user_features
        WHERE
            user_id = ?
            AND church_id = ?
    "#))
    .bind(user_id)
    .bind(church_id)
    .fetch_optional(get_pool())
    .await?;

    let mut flags = AiFeatureFlags {
        user_enabled: user_enabled.unwrap_or(false),
        ..AiFeatureFlags::default()
    };

    if let Some(church) = church {
        flags.church_enabled = church.ai_enabled;
        flags.trial_enabled = church.ai_trial_enabled;
        flags.trial_start = church.ai_trial_start;
        flags.trial_end = church.ai_trial_end;
    }

    Ok(flags)
}
