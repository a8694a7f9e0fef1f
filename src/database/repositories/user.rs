use anyhow::Result;
use chrono::Utc;
use sqlx::{Postgres, Transaction};
use uuid::Uuid;

use crate::database::{
    get_pool,
    models::{ChurchRole, Invitation, Profile, User},
    utils::sql,
};

pub async fn create_user(user: &User) -> Result<User> {
    let user = sqlx::query_as::<_, User>(&sql(r#"
        INSERT INTO
            users (
                id,
                email,
                password_hash,
                full_name,
                created_at,
                updated_at
            )
        VALUES
            (?, ?, ?, ?, ?, ?)
        RETURNING
            id,
            email,
            password_hash,
            full_name,
            created_at,
            updated_at
    "#))
    .bind(user.id)
    .bind(&user.email)
    .bind(&user.password_hash)
    .bind(&user.full_name)
    .bind(user.created_at)
    .bind(user.updated_at)
    .fetch_one(get_pool())
    .await?;

    Ok(user)
}

pub async fn find_by_email(email: &str) -> Result<Option<User>> {
    let user = sqlx::query_as::<_, User>(&sql(r#"
        SELECT
            id,
            email,
            password_hash,
            full_name,
            created_at,
            updated_at
        FROM
            users
        WHERE
            email = ?
    "#))
    .bind(email)
    .fetch_optional(get_pool())
    .await?;

    Ok(user)
}

pub async fn find_by_id(id: Uuid) -> Result<Option<User>> {
    let user = sqlx::query_as::<_, User>(&sql(r#"
        SELECT
            id,
            email,
            password_hash,
            full_name,
            created_at,
            updated_at
        FROM
            users
        WHERE
            id = ?
    "#))
    .bind(id)
    .fetch_optional(get_pool())
    .await?;

    Ok(user)
}

pub async fn email_exists(email: &str) -> Result<bool> {
    let count: i64 = sqlx::query_scalar(&sql(r#"
        SELECT
            COUNT(*)
        FROM
            users
        WHERE
            email = ?
    "#))
    .bind(email)
    .fetch_one(get_pool())
    .await?;

    Ok(count > 0)
}

pub async fn get_profile(user_id: Uuid) -> Result<Option<Profile>> {
    let profile = sqlx::query_as::<_, Profile>(&sql(r#"
        SELECT
            id,
            user_id,
            church_id,
            full_name,
            email,
            congregation_id,
            member_id,
            created_at,
            updated_at
        FROM
            profiles
        WHERE
            user_id = ?
    "#))
    .bind(user_id)
    .fetch_optional(get_pool())
    .await?;

    Ok(profile)
}

/// Roles the user holds in one church, newest first.
pub async fn get_roles(user_id: Uuid, church_id: Uuid) -> Result<Vec<ChurchRole>> {
    let roles = sqlx::query_scalar::<_, ChurchRole>(&sql(r#"
        SELECT
            role
        FROM
            user_roles
        WHERE
            user_id = ?
            AND church_id = ?
        ORDER BY
            created_at DESC
    "#))
    .bind(user_id)
    .bind(church_id)
    .fetch_all(get_pool())
    .await?;

    Ok(roles)
}

pub async fn is_platform_admin(user_id: Uuid) -> Result<bool> {
    let count: i64 = sqlx::query_scalar(&sql(r#"
        SELECT
            COUNT(*)
        FROM
            platform_admins
        WHERE
            user_id = ?
            AND active = TRUE
    "#))
    .bind(user_id)
    .fetch_one(get_pool())
    .await?;

    Ok(count > 0)
}

/// Attach the user to the invitation's church, carrying over the prefill
/// fields. Runs inside the acceptance transaction.
pub async fn upsert_profile_from_invitation(
    tx: &mut Transaction<'_, Postgres>,
    user: &User,
    invitation: &Invitation,
) -> Result<Profile, sqlx::Error> {
    let now = Utc::now();
    let full_name = invitation
        .full_name
        .clone()
        .unwrap_or_else(|| user.full_name.clone());

    let profile = sqlx::query_as::<_, Profile>(&sql(r#"
        INSERT INTO
            profiles (
                id,
                user_id,
                church_id,
                full_name,
                email,
                congregation_id,
                member_id,
                created_at,
                updated_at
            )
        VALUES
            (?, ?, ?, ?, ?, ?, ?, ?, ?)
        ON CONFLICT (user_id) DO UPDATE
        SET
            church_id = EXCLUDED.church_id,
            full_name = EXCLUDED.full_name,
            congregation_id = EXCLUDED.congregation_id,
            member_id = EXCLUDED.member_id,
            updated_at = EXCLUDED.updated_at
        RETURNING
            id,
            user_id,
            church_id,
            full_name,
            email,
            congregation_id,
            member_id,
            created_at,
            updated_at
    "#))
    .bind(Uuid::new_v4())
    .bind(user.id)
    .bind(invitation.church_id)
    .bind(full_name)
    .bind(&user.email)
    .bind(invitation.congregation_id)
    .bind(invitation.member_id)
    .bind(now)
    .bind(now)
    .fetch_one(&mut **tx)
    .await?;

    Ok(profile)
}

/// One role row per (user, church); re-accepting with a different role
/// replaces the old assignment.
pub async fn upsert_role(
    tx: &mut Transaction<'_, Postgres>,
    user_id: Uuid,
    church_id: Uuid,
    role: ChurchRole,
) -> Result<(), sqlx::Error> {
    sqlx::query(&sql(r#"
        INSERT INTO
            user_roles (id, user_id, church_id, role, created_at)
        VALUES
            (?, ?, ?, ?, ?)
        ON CONFLICT (user_id, church_id) DO UPDATE
        SET
            role = EXCLUDED.role
    "#))
    .bind(Uuid::new_v4())
    .bind(user_id)
    .bind(church_id)
    .bind(role)
    .bind(Utc::now())
    .execute(&mut **tx)
    .await?;

    Ok(())
}
