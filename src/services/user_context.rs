use actix_web::{Error as ActixError, FromRequest, HttpRequest, dev::Payload};
use futures_util::future::LocalBoxFuture;
use uuid::Uuid;

use crate::database::models::{ChurchRole, Profile, User};
use crate::database::repositories::user as user_repo;
use crate::error::AppError;
use crate::services::auth::Claims;

/// The authenticated principal plus their profile, loaded once per request.
/// Role sets are fetched on demand because acceptance can change them while
/// a token is still live.
#[derive(Debug, Clone)]
pub struct UserContext {
    pub user: User,
    pub profile: Option<Profile>,
}

impl UserContext {
    pub fn user_id(&self) -> Uuid {
        self.user.id
    }

    pub fn user_email(&self) -> &str {
        &self.user.email
    }

    /// The church the user's profile is attached to, if any.
    pub fn church_id(&self) -> Option<Uuid> {
        self.profile.as_ref().and_then(|p| p.church_id)
    }

    pub async fn roles_in(&self, church_id: Uuid) -> Result<Vec<ChurchRole>, AppError> {
        let roles = user_repo::get_roles(self.user_id(), church_id).await?;
        Ok(roles)
    }

    /// Membership gate: at least one role row in the church.
    pub async fn require_member(&self, church_id: Uuid) -> Result<Vec<ChurchRole>, AppError> {
        let roles = self.roles_in(church_id).await?;
        if roles.is_empty() {
            return Err(AppError::Forbidden(
                "You are not a member of this church".to_string(),
            ));
        }
        Ok(roles)
    }

    /// Invitation-management gate: admin, pastor or secretary.
    pub async fn require_invitation_manager(&self, church_id: Uuid) -> Result<(), AppError> {
        let roles = self.roles_in(church_id).await?;
        if roles.iter().any(ChurchRole::can_manage_invitations) {
            return Ok(());
        }
        Err(AppError::PermissionDenied(
            "Managing invitations requires an admin, pastor or secretary role".to_string(),
        ))
    }

    pub async fn require_platform_admin(&self) -> Result<(), AppError> {
        if user_repo::is_platform_admin(self.user_id()).await? {
            return Ok(());
        }
        Err(AppError::PermissionDenied(
            "Platform administrator access required".to_string(),
        ))
    }
}

impl FromRequest for UserContext {
    type Error = ActixError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let claims_future = Claims::from_request(req, payload);

        Box::pin(async move {
            let claims = claims_future.await?;

            let user = user_repo::find_by_id(claims.sub)
                .await
                .map_err(AppError::from)?
                .ok_or(AppError::Unauthorized)?;

            let profile = user_repo::get_profile(user.id)
                .await
                .map_err(AppError::from)?;

            Ok(UserContext { user, profile })
        })
    }
}
