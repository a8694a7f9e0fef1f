use actix_web::{
    HttpResponse, Result,
    web::{Json, Path},
};
use uuid::Uuid;

use crate::config::config;
use crate::database::{
    models::{EnableTrialInput, SetUserFeaturesInput, UpdateChurchFeaturesInput},
    repositories::{church as church_repo, features as features_repo},
};
use crate::error::AppError;
use crate::handlers::shared::ApiResponse;
use crate::services::user_context::UserContext;

/// Platform endpoints take church ids from outside any membership scope;
/// unknown ids 404 before any flag row is written.
async fn require_church(church_id: Uuid) -> Result<(), AppError> {
    match church_repo::find_by_id(church_id).await {
        Ok(Some(_)) => Ok(()),
        Ok(None) => Err(AppError::NotFound("Church not found".to_string())),
        Err(e) => {
            log::error!("Failed to look up church {}: {}", church_id, e);
            Err(AppError::from(e))
        }
    }
}

pub async fn get_features(path: Path<Uuid>, ctx: UserContext) -> Result<HttpResponse> {
    ctx.require_platform_admin().await?;

    let church_id = path.into_inner();
    require_church(church_id).await?;

    let features = features_repo::ensure_church_features(church_id)
        .await
        .map_err(|e| {
            log::error!("Failed to load features for church {}: {}", church_id, e);
            AppError::from(e)
        })?;

    Ok(ApiResponse::success(features))
}

pub async fn update_features(
    path: Path<Uuid>,
    request: Json<UpdateChurchFeaturesInput>,
    ctx: UserContext,
) -> Result<HttpResponse> {
    ctx.require_platform_admin().await?;

    let church_id = path.into_inner();
    require_church(church_id).await?;

    let features = features_repo::update_church_features(church_id, &request)
        .await
        .map_err(|e| {
            log::error!("Failed to update features for church {}: {}", church_id, e);
            AppError::from(e)
        })?;

    log::info!(
        "Platform admin {} updated features for church {}",
        ctx.user_id(),
        church_id
    );

    Ok(ApiResponse::success(features))
}

pub async fn enable_trial(
    path: Path<Uuid>,
    request: Json<EnableTrialInput>,
    ctx: UserContext,
) -> Result<HttpResponse> {
    ctx.require_platform_admin().await?;

    let church_id = path.into_inner();
    require_church(church_id).await?;

    let days = request.days.unwrap_or(config().ai_trial_days);

    if days <= 0 {
        return Err(AppError::BadRequest("Trial length must be positive".to_string()).into());
    }

    let features = features_repo::enable_trial(church_id, days).await.map_err(|e| {
        log::error!("Failed to enable trial for church {}: {}", church_id, e);
        AppError::from(e)
    })?;

    log::info!(
        "Platform admin {} opened a {}-day AI trial for church {}",
        ctx.user_id(),
        days,
        church_id
    );

    Ok(ApiResponse::success(features))
}

pub async fn set_user_features(
    path: Path<(Uuid, Uuid)>,
    request: Json<SetUserFeaturesInput>,
    ctx: UserContext,
) -> Result<HttpResponse> {
    ctx.require_platform_admin().await?;

    let (church_id, user_id) = path.into_inner();
    require_church(church_id).await?;

    let features = features_repo::set_user_override(user_id, church_id, request.ai_enabled)
        .await
        .map_err(|e| {
            log::error!(
                "Failed to set AI override for user {} in church {}: {}",
                user_id,
                church_id,
                e
            );
            AppError::from(e)
        })?;

    Ok(ApiResponse::success(features))
}
