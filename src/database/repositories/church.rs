use std::sync::OnceLock;
use std::time::Duration;

use anyhow::Result;
use moka::future::Cache;
use uuid::Uuid;

use crate::database::{
    get_pool,
    models::{Church, ChurchSummary},
    utils::sql,
};

// Display info is immutable enough for a short TTL; access decisions and
// feature flags are never cached.
static SUMMARY_CACHE: OnceLock<Cache<Uuid, ChurchSummary>> = OnceLock::new();

fn summary_cache() -> &'static Cache<Uuid, ChurchSummary> {
    SUMMARY_CACHE.get_or_init(|| {
        Cache::builder()
            .max_capacity(1_000)
            .time_to_live(Duration::from_secs(300))
            .build()
    })
}

pub async fn find_by_id(id: Uuid) -> Result<Option<Church>> {
    let church = sqlx::query_as::<_, Church>(&sql(r#"
        SELECT
            id,
            name,
            logo_url,
            created_at,
            updated_at
        FROM
            churches
        WHERE
            id = ?
    "#))
    .bind(id)
    .fetch_optional(get_pool())
    .await?;

    Ok(church)
}

pub async fn get_summary(church_id: Uuid) -> Result<Option<ChurchSummary>> {
    let summary = sqlx::query_as::<_, ChurchSummary>(&sql(r#"
        SELECT
            id,
            name,
            logo_url
        FROM
            churches
        WHERE
            id = ?
    "#))
    .bind(church_id)
    .fetch_optional(get_pool())
    .await?;

    Ok(summary)
}

/// Cached variant for the public invitation-validation path.
pub async fn get_summary_cached(church_id: Uuid) -> Result<Option<ChurchSummary>> {
    if let Some(hit) = summary_cache().get(&church_id).await {
        return Ok(Some(hit));
    }

    let summary = get_summary(church_id).await?;
    if let Some(ref found) = summary {
        summary_cache().insert(church_id, found.clone()).await;
    }

    Ok(summary)
}
