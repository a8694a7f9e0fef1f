use actix_web::{
    HttpResponse, Result,
    web::{Json, Path},
};
use chrono::{Duration, Utc};
use uuid::Uuid;

use crate::config::config;
use crate::database::{
    models::{
        AcceptDecision, AcceptFailure, AcceptInvitationInput, AcceptOutcome,
        CreateInvitationInput, CreateInvitationResponse, ValidateInvitationResponse,
    },
    repositories::{church as church_repo, invitation as invitation_repo, user as user_repo},
    transaction::DatabaseTransaction,
};
use crate::error::AppError;
use crate::handlers::shared::ApiResponse;
use crate::services::user_context::UserContext;

pub async fn create(request: Json<CreateInvitationInput>, ctx: UserContext) -> Result<HttpResponse> {
    let user_id = ctx.user_id();

    let church_id = ctx.church_id().ok_or_else(|| {
        log::error!("User {} has no church attached to their profile", user_id);
        AppError::BadRequest("Your profile is not attached to a church".to_string())
    })?;

    ctx.require_invitation_manager(church_id).await?;

    let input = request.into_inner();
    let expires_at = Utc::now() + Duration::days(config().invite_expiry_days);

    let invitation = DatabaseTransaction::run(|tx| {
        Box::pin(async move {
            let invitation =
                invitation_repo::reissue(tx, church_id, &input, user_id, expires_at).await?;
            Ok(invitation)
        })
    })
    .await?;

    let response = CreateInvitationResponse {
        id: invitation.id,
        invite_link: config().invite_link(&invitation.token),
        expires_at: invitation.expires_at,
    };

    Ok(ApiResponse::created(response))
}

pub async fn list(ctx: UserContext) -> Result<HttpResponse> {
    let user_id = ctx.user_id();

    let church_id = ctx.church_id().ok_or_else(|| {
        log::error!("User {} has no church attached to their profile", user_id);
        AppError::BadRequest("Your profile is not attached to a church".to_string())
    })?;

    ctx.require_invitation_manager(church_id).await?;

    let invitations = invitation_repo::list_for_church(church_id).await.map_err(|e| {
        log::error!("Failed to list invitations for church {}: {}", church_id, e);
        AppError::from(e)
    })?;

    Ok(ApiResponse::success(invitations))
}

pub async fn revoke(path: Path<Uuid>, ctx: UserContext) -> Result<HttpResponse> {
    let invitation_id = path.into_inner();
    let user_id = ctx.user_id();

    let church_id = ctx.church_id().ok_or_else(|| {
        log::error!("User {} has no church attached to their profile", user_id);
        AppError::BadRequest("Your profile is not attached to a church".to_string())
    })?;

    ctx.require_invitation_manager(church_id).await?;

    let removed = invitation_repo::revoke(church_id, invitation_id)
        .await
        .map_err(|e| {
            log::error!("Failed to revoke invitation {}: {}", invitation_id, e);
            AppError::from(e)
        })?;

    if !removed {
        return Err(AppError::NotFound(
            "Invitation not found or already used".to_string(),
        )
        .into());
    }

    Ok(ApiResponse::success("Invitation revoked"))
}

/// Public preview of a pending invitation. Unknown, consumed and expired
/// tokens are indistinguishable to the caller.
pub async fn validate(path: Path<String>) -> Result<HttpResponse> {
    let token = path.into_inner();

    // Tokens are UUIDs; anything else skips the lookup entirely
    if Uuid::parse_str(&token).is_err() {
        log::debug!("Rejected malformed invitation token");
        return Err(not_found().into());
    }

    let invitation = invitation_repo::find_by_token(&token)
        .await
        .map_err(|e| {
            log::error!("Failed to look up invitation token: {}", e);
            AppError::from(e)
        })?
        .ok_or_else(|| {
            log::warn!("Unknown invitation token presented for validation");
            not_found()
        })?;

    if invitation.used_at.is_some() {
        log::info!("Validation hit consumed invitation {}", invitation.id);
        return Err(not_found().into());
    }

    if Utc::now() > invitation.expires_at {
        log::info!("Validation hit expired invitation {}", invitation.id);
        return Err(not_found().into());
    }

    let (church_name, church_logo_url) =
        match church_repo::get_summary_cached(invitation.church_id).await {
            Ok(Some(church)) => (church.name, church.logo_url),
            _ => ("Unknown".to_string(), None),
        };

    let inviter_name = match user_repo::find_by_id(invitation.invited_by).await {
        Ok(Some(user)) => user.full_name,
        _ => "Unknown".to_string(),
    };

    let response = ValidateInvitationResponse {
        email: invitation.email,
        role: invitation.role,
        church_id: invitation.church_id,
        church_name,
        church_logo_url,
        inviter_name,
        full_name: invitation.full_name,
        congregation_id: invitation.congregation_id,
        member_id: invitation.member_id,
        expires_at: invitation.expires_at,
    };

    Ok(ApiResponse::success(response))
}

/// Consume an invitation for the signed-in account. Business failures ride
/// an HTTP 200 with `success: false`, so the response is always the bare
/// outcome rather than the standard envelope.
pub async fn accept(request: Json<AcceptInvitationInput>, ctx: UserContext) -> Result<HttpResponse> {
    let token = request.into_inner().token;
    let user = ctx.user.clone();

    if Uuid::parse_str(&token).is_err() {
        log::debug!("Rejected malformed invitation token");
        return Ok(rejected(AcceptFailure::NotFound));
    }

    let invitation = match invitation_repo::find_by_token(&token).await.map_err(|e| {
        log::error!("Failed to look up invitation token: {}", e);
        AppError::from(e)
    })? {
        Some(invitation) => invitation,
        None => return Ok(rejected(AcceptFailure::NotFound)),
    };

    match invitation.classify_acceptance(user.id, &user.email, Utc::now()) {
        AcceptDecision::AlreadyAccepted => {
            // Re-submitting from the account that consumed it is a no-op success
            let roles = ctx.roles_in(invitation.church_id).await?;
            return Ok(HttpResponse::Ok().json(AcceptOutcome::accepted(roles)));
        }
        AcceptDecision::Rejected(failure) => {
            match failure {
                AcceptFailure::Expired => log::info!(
                    "Invitation {} expired at {}",
                    invitation.id,
                    invitation.expires_at
                ),
                AcceptFailure::EmailMismatch => log::warn!(
                    "Invitation {} presented by an account with a different email",
                    invitation.id
                ),
                _ => log::warn!(
                    "Invitation {} already consumed by another account",
                    invitation.id
                ),
            }
            return Ok(rejected(failure));
        }
        AcceptDecision::Consume => {}
    }

    let church_id = invitation.church_id;
    let tx_user = user.clone();
    let consumed = DatabaseTransaction::run(|tx| {
        Box::pin(async move {
            if !invitation_repo::mark_used(tx, invitation.id, tx_user.id).await? {
                return Ok(false);
            }

            user_repo::upsert_profile_from_invitation(tx, &tx_user, &invitation).await?;
            user_repo::upsert_role(tx, tx_user.id, invitation.church_id, invitation.role).await?;

            Ok(true)
        })
    })
    .await?;

    if !consumed {
        // Raced another acceptance. Reclassify from the committed row: a
        // double submit from the account that won is still a success.
        let decision = invitation_repo::find_by_token(&token)
            .await
            .map_err(|e| {
                log::error!("Failed to reload invitation after a consume race: {}", e);
                AppError::from(e)
            })?
            .map(|current| current.classify_acceptance(user.id, &user.email, Utc::now()));

        if !matches!(decision, Some(AcceptDecision::AlreadyAccepted)) {
            log::warn!("Invitation for church {} was consumed concurrently", church_id);
            return Ok(rejected(AcceptFailure::AlreadyUsed));
        }
    }

    let roles = user_repo::get_roles(user.id, church_id).await.map_err(|e| {
        log::error!("Failed to load roles after acceptance: {}", e);
        AppError::from(e)
    })?;

    Ok(HttpResponse::Ok().json(AcceptOutcome::accepted(roles)))
}

fn not_found() -> AppError {
    AppError::NotFound("Invitation not found or expired".to_string())
}

fn rejected(failure: AcceptFailure) -> HttpResponse {
    HttpResponse::Ok().json(AcceptOutcome::rejected(failure))
}
