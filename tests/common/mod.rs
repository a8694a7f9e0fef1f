use chrono::{DateTime, Duration, Utc};
use fake::Fake;
use fake::faker::internet::en::SafeEmail;
use fake::faker::name::en::Name;
use uuid::Uuid;

use koinonia::database::models::{AiFeatureFlags, ChurchRole, Invitation, User};
use koinonia::database::repositories::user as user_repo;
use koinonia::database::{get_pool, utils::sql};

#[allow(dead_code)]
pub fn email() -> String {
    SafeEmail().fake()
}

#[allow(dead_code)]
pub fn full_name() -> String {
    Name().fake()
}

/// Pending invitation addressed to `email`, expiring a week out.
#[allow(dead_code)]
pub fn invitation(email: &str, role: ChurchRole) -> Invitation {
    Invitation {
        id: Uuid::new_v4(),
        church_id: Uuid::new_v4(),
        email: email.to_string(),
        role,
        token: Uuid::new_v4().to_string(),
        invited_by: Uuid::new_v4(),
        full_name: Some(full_name()),
        congregation_id: None,
        member_id: None,
        expires_at: Utc::now() + Duration::days(7),
        used_at: None,
        used_by: None,
        created_at: Utc::now(),
    }
}

/// Insert a church row directly; provisioning is out of band for these tests.
#[allow(dead_code)]
pub async fn seed_church(name: &str) -> anyhow::Result<Uuid> {
    let id = Uuid::new_v4();
    sqlx::query(&sql("INSERT INTO churches (id, name) VALUES (?, ?)"))
        .bind(id)
        .bind(name)
        .execute(get_pool())
        .await?;
    Ok(id)
}

#[allow(dead_code)]
pub async fn seed_user() -> anyhow::Result<User> {
    let user = User::new(email(), "not-a-real-hash".to_string(), full_name());
    user_repo::create_user(&user).await
}

/// Flag set with a trial running at `now` and ending `days` later.
#[allow(dead_code)]
pub fn trial_flags(now: DateTime<Utc>, days: i64) -> AiFeatureFlags {
    AiFeatureFlags {
        trial_enabled: true,
        trial_start: Some(now - Duration::days(1)),
        trial_end: Some(now + Duration::days(days)),
        ..Default::default()
    }
}
