use anyhow::Result;
use chrono::{DateTime, Utc};
use sqlx::{Postgres, Transaction};
use uuid::Uuid;

use crate::database::{
    get_pool,
    models::{CreateInvitationInput, Invitation},
    utils::sql,
};

const INVITATION_COLUMNS: &str = r#"
    id,
    church_id,
    email,
    role,
    token,
    invited_by,
    full_name,
    congregation_id,
    member_id,
    expires_at,
    used_at,
    used_by,
    created_at
"#;

/// Look up by token regardless of state. Callers decide (and log) whether
/// the row is expired or consumed.
pub async fn find_by_token(token: &str) -> Result<Option<Invitation>> {
    let invitation = sqlx::query_as::<_, Invitation>(&sql(&format!(
        r#"
        SELECT
            {INVITATION_COLUMNS}
        FROM
            invitations
        WHERE
            token = ?
        "#
    )))
    .bind(token)
    .fetch_optional(get_pool())
    .await?;

    Ok(invitation)
}

pub async fn list_for_church(church_id: Uuid) -> Result<Vec<Invitation>> {
    let invitations = sqlx::query_as::<_, Invitation>(&sql(&format!(
        r#"
        SELECT
            {INVITATION_COLUMNS}
        FROM
            invitations
        WHERE
            church_id = ?
        ORDER BY
            created_at DESC
        "#
    )))
    .bind(church_id)
    .fetch_all(get_pool())
    .await?;

    Ok(invitations)
}

/// Issue or reissue: a pending invitation for the same (church, email) is
/// refreshed in place with a new token and expiry; otherwise a new row is
/// inserted. Consumed invitations are never resurrected.
pub async fn reissue(
    tx: &mut Transaction<'_, Postgres>,
    church_id: Uuid,
    input: &CreateInvitationInput,
    invited_by: Uuid,
    expires_at: DateTime<Utc>,
) -> Result<Invitation, sqlx::Error> {
    let token = Uuid::new_v4().to_string();

    let refreshed = sqlx::query_as::<_, Invitation>(&sql(&format!(
        r#"
        UPDATE invitations
        SET
            token = ?,
            role = ?,
            full_name = ?,
            congregation_id = ?,
            member_id = ?,
            invited_by = ?,
            expires_at = ?
        WHERE
            church_id = ?
            AND lower(email) = lower(?)
            AND used_at IS NULL
        RETURNING
            {INVITATION_COLUMNS}
        "#
    )))
    .bind(&token)
    .bind(input.role)
    .bind(&input.full_name)
    .bind(input.congregation_id)
    .bind(input.member_id)
    .bind(invited_by)
    .bind(expires_at)
    .bind(church_id)
    .bind(&input.email)
    .fetch_optional(&mut **tx)
    .await?;

    if let Some(invitation) = refreshed {
        return Ok(invitation);
    }

    let invitation = sqlx::query_as::<_, Invitation>(&sql(&format!(
        r#"
        INSERT INTO
            invitations (
                id,
                church_id,
                email,
                role,
                token,
                invited_by,
                full_name,
                congregation_id,
                member_id,
                expires_at,
                created_at
            )
        VALUES
            (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        RETURNING
            {INVITATION_COLUMNS}
        "#
    )))
    .bind(Uuid::new_v4())
    .bind(church_id)
    .bind(&input.email)
    .bind(input.role)
    .bind(&token)
    .bind(invited_by)
    .bind(&input.full_name)
    .bind(input.congregation_id)
    .bind(input.member_id)
    .bind(expires_at)
    .bind(Utc::now())
    .fetch_one(&mut **tx)
    .await?;

    Ok(invitation)
}

/// Consume the invitation. Guarded on `used_at IS NULL` so a concurrent
/// acceptance loses cleanly; returns whether this call did the consuming.
pub async fn mark_used(
    tx: &mut Transaction<'_, Postgres>,
    invitation_id: Uuid,
    user_id: Uuid,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(&sql(r#"
        UPDATE invitations
        SET
            used_at = ?,
            used_by = ?
        WHERE
            id = ?
            AND used_at IS NULL
    "#))
    .bind(Utc::now())
    .bind(user_id)
    .bind(invitation_id)
    .execute(&mut **tx)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Cancel a pending invitation. Consumed ones are history and stay.
pub async fn revoke(church_id: Uuid, invitation_id: Uuid) -> Result<bool> {
    let result = sqlx::query(&sql(r#"
        DELETE FROM invitations
        WHERE
            id = ?
            AND church_id = ?
            AND used_at IS NULL
    "#))
    .bind(invitation_id)
    .bind(church_id)
    .execute(get_pool())
    .await?;

    Ok(result.rows_affected() > 0)
}
