use actix_web::{HttpResponse, Result, web};

use crate::database::models::{CreateUserInput, LoginInput, MeResponse, UserInfo};
use crate::database::repositories::{church as church_repo, user as user_repo};
use crate::error::AppError;
use crate::handlers::shared::ApiResponse;
use crate::services::{auth, user_context::UserContext};

pub async fn register(request: web::Json<CreateUserInput>) -> Result<HttpResponse> {
    let register_request = request.into_inner();

    let response = auth::register(register_request).await.map_err(|e| {
        log::error!("Failed to register user: {}", e);
        AppError::BadRequest(e.to_string())
    })?;

    Ok(ApiResponse::created(response))
}

pub async fn login(request: web::Json<LoginInput>) -> Result<HttpResponse> {
    let login_request = request.into_inner();

    let response = auth::login(login_request).await.map_err(|e| {
        log::warn!("Failed login attempt: {}", e);
        AppError::Unauthorized
    })?;

    Ok(ApiResponse::success(response))
}

pub async fn me(ctx: UserContext) -> Result<HttpResponse> {
    let mut church = None;
    let mut roles = Vec::new();

    if let Some(church_id) = ctx.church_id() {
        church = church_repo::get_summary_cached(church_id)
            .await
            .map_err(|e| {
                log::error!("Failed to load church {} for profile: {}", church_id, e);
                AppError::from(e)
            })?;
        roles = ctx.roles_in(church_id).await?;
    }

    let response = MeResponse {
        user: UserInfo::from(ctx.user),
        profile: ctx.profile,
        church,
        roles,
    };

    Ok(ApiResponse::success(response))
}
