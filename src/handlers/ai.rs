use actix_web::{
    HttpResponse, Result,
    web::{Json, Query},
};
use serde::Deserialize;
use uuid::Uuid;

use crate::config::config;
use crate::database::{
    models::{ChatInput, SaveChatHistoryInput},
    repositories::{ai as ai_repo, features as features_repo},
};
use crate::error::AppError;
use crate::handlers::shared::ApiResponse;
use crate::services::{
    ai_access,
    ai_gateway::{GatewayError, gateway},
    user_context::UserContext,
};

const CHAT_FEATURE: &str = "ai-chat";

/// Stream a completion to the caller. The gateway's SSE body is forwarded
/// untouched; refusals surface as JSON errors with a machine-readable code
/// before any stream bytes are written.
pub async fn chat(request: Json<ChatInput>, ctx: UserContext) -> Result<HttpResponse> {
    let input = request.into_inner();
    let user_id = ctx.user_id();

    ctx.require_member(input.church_id).await?;

    let access = ai_access::evaluate(input.church_id, user_id).await?;
    if !access.allowed {
        log::info!(
            "AI chat denied for user {} in church {}",
            user_id,
            input.church_id
        );
        return Err(AppError::PremiumRequired.into());
    }

    let daily_limit = config().ai_daily_limit;
    let executions = ai_repo::reserve_execution(input.church_id, user_id, daily_limit)
        .await
        .map_err(|e| {
            log::error!("Failed to reserve AI execution for user {}: {}", user_id, e);
            AppError::from(e)
        })?;

    let executions = match executions {
        Some(n) => n,
        None => {
            log::info!(
                "AI daily limit reached for user {} in church {}",
                user_id,
                input.church_id
            );
            return Err(AppError::LimitReached.into());
        }
    };

    log::debug!(
        "AI execution {}/{} for user {} in church {}",
        executions,
        daily_limit,
        user_id,
        input.church_id
    );

    let upstream = match gateway()
        .stream_chat(&input.message, input.context.as_deref())
        .await
    {
        Ok(response) => response,
        Err(err) => {
            ai_repo::log_ai_failure(
                Some(input.church_id),
                Some(user_id),
                CHAT_FEATURE,
                &err.to_string(),
                err.provider_status(),
            )
            .await;

            return Err(match err {
                GatewayError::RateLimited => AppError::UpstreamRateLimited,
                GatewayError::PaymentRequired => AppError::UpstreamPaymentRequired,
                other => {
                    log::error!("AI gateway failure: {}", other);
                    AppError::internal_server_error_message("AI gateway request failed")
                }
            }
            .into());
        }
    };

    Ok(HttpResponse::Ok()
        .content_type("text/event-stream")
        .insert_header(("Cache-Control", "no-cache"))
        .streaming(upstream.bytes_stream()))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessQuery {
    pub church_id: Uuid,
}

/// Availability probe: returns the caller's raw feature flags so clients
/// can run the access resolver locally before showing the assistant.
/// Advisory only; `chat` re-resolves on every call.
pub async fn access(query: Query<AccessQuery>, ctx: UserContext) -> Result<HttpResponse> {
    ctx.require_member(query.church_id).await?;

    let flags = features_repo::flags_for(query.church_id, ctx.user_id())
        .await
        .map_err(|e| {
            log::error!("Failed to load AI feature flags: {}", e);
            AppError::from(e)
        })?;

    Ok(ApiResponse::success(flags))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryQuery {
    pub church_id: Uuid,
    pub limit: Option<i64>,
}

pub async fn history_list(query: Query<HistoryQuery>, ctx: UserContext) -> Result<HttpResponse> {
    let user_id = ctx.user_id();

    ctx.require_member(query.church_id).await?;

    let limit = query.limit.unwrap_or(50).clamp(1, 200);
    let entries = ai_repo::list_chat_history(query.church_id, user_id, limit)
        .await
        .map_err(|e| {
            log::error!("Failed to list AI history for user {}: {}", user_id, e);
            AppError::from(e)
        })?;

    Ok(ApiResponse::success(entries))
}

pub async fn history_save(
    request: Json<SaveChatHistoryInput>,
    ctx: UserContext,
) -> Result<HttpResponse> {
    let input = request.into_inner();
    let user_id = ctx.user_id();

    ctx.require_member(input.church_id).await?;

    let entry = ai_repo::insert_chat_history(input.church_id, user_id, &input.message, &input.response)
        .await
        .map_err(|e| {
            log::error!("Failed to save AI history for user {}: {}", user_id, e);
            AppError::from(e)
        })?;

    Ok(ApiResponse::created(entry))
}
