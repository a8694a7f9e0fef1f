use anyhow::Result;
use chrono::Utc;
use uuid::Uuid;

use crate::database::{get_pool, models::ChatHistoryEntry, utils::sql};

/// Reserve one AI execution for today, atomically.
///
/// A single conditional upsert either starts the day at 1 (new row or day
/// rollover) or increments while under the limit. No row comes back when the
/// counter is already at the limit for today, so two concurrent calls can
/// never both pass at the boundary.
pub async fn reserve_execution(
    church_id: Uuid,
    user_id: Uuid,
    daily_limit: i64,
) -> Result<Option<i64>> {
    let today = Utc::now().date_naive();

    let executions = sqlx::query_scalar::<_, i64>(&sql(r#"
        INSERT INTO
            ai_usage_control (id, church_id, user_id, executions_today, last_reset_date, created_at, updated_at)
        VALUES
            (?, ?, ?, 1, ?, now(), now())
        ON CONFLICT (church_id, user_id) DO UPDATE
        SET
            executions_today = CASE
                WHEN ai_usage_control.last_reset_date <> EXCLUDED.last_reset_date THEN 1
                ELSE ai_usage_control.executions_today + 1
            END,
            last_reset_date = EXCLUDED.last_reset_date,
            updated_at = now()
        WHERE
            ai_usage_control.last_reset_date <> EXCLUDED.last_reset_date
            OR ai_usage_control.executions_today < ?
        RETURNING
            executions_today
    "#))
    .bind(Uuid::new_v4())
    .bind(church_id)
    .bind(user_id)
    .bind(today)
    .bind(daily_limit)
    .fetch_optional(get_pool())
    .await?;

    Ok(executions)
}

pub async fn insert_chat_history(
    church_id: Uuid,
    user_id: Uuid,
    message: &str,
    response: &str,
) -> Result<ChatHistoryEntry> {
    let entry = sqlx::query_as::<_, ChatHistoryEntry>(&sql(r#"
        INSERT INTO
            ai_chat_history (id, church_id, user_id, message, response, created_at)
        VALUES
            (?, ?, ?, ?, ?, ?)
        RETURNING
            id,
            church_id,
            user_id,
            message,
            response,
            created_at
    "#))
    .bind(Uuid::new_v4())
    .bind(church_id)
    .bind(user_id)
    .bind(message)
    .bind(response)
    .bind(Utc::now())
    .fetch_one(get_pool())
    .await?;

    Ok(entry)
}

pub async fn list_chat_history(
    church_id: Uuid,
    user_id: Uuid,
    limit: i64,
) -> Result<Vec<ChatHistoryEntry>> {
    let entries = sqlx::query_as::<_, ChatHistoryEntry>(&sql(r#"
        SELECT
            id,
            church_id,
            user_id,
            message,
            response,
            created_at
        FROM
            ai_chat_history
        WHERE
            church_id = ?
            AND user_id = ?
        ORDER BY
            created_at DESC
        LIMIT
            ?
    "#))
    .bind(church_id)
    .bind(user_id)
    .bind(limit)
    .fetch_all(get_pool())
    .await?;

    Ok(entries)
}

/// Failure ledger for the AI endpoints. Best-effort at every call site; a
/// failed write is logged and swallowed.
pub async fn log_ai_failure(
    church_id: Option<Uuid>,
    user_id: Option<Uuid>,
    feature: &str,
    error_message: &str,
    provider_status: Option<i32>,
) {
    let result = sqlx::query(&sql(r#"
        INSERT INTO
            ai_error_logs (id, church_id, user_id, feature, error_message, provider_status, created_at)
        VALUES
            (?, ?, ?, ?, ?, ?, ?)
    "#))
    .bind(Uuid::new_v4())
    .bind(church_id)
    .bind(user_id)
    .bind(feature)
    .bind(error_message)
    .bind(provider_status)
    .bind(Utc::now())
    .execute(get_pool())
    .await;

    if let Err(e) = result {
        log::warn!("Failed to record AI failure ({}): {}", feature, e);
    }
}
