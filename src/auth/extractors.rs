use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use tracing::warn;

use super::jwt::JwtKeys;
use crate::{error::ApiError, state::AppState, users::repo_types::User};

/// The authenticated, active user behind a `Bearer` access token.
pub struct CurrentUser(pub User);

/// A [`CurrentUser`] that is also a superuser.
pub struct SuperUser(pub User);

fn bearer_token(parts: &Parts) -> Result<&str, ApiError> {
    let header = parts
        .headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ApiError::unauthorized("Missing Authorization header"))?;

    header
        .strip_prefix("Bearer ")
        .or_else(|| header.strip_prefix("bearer "))
        .ok_or_else(|| ApiError::unauthorized("Invalid Authorization header"))
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)?;
        let keys = JwtKeys::from_ref(state);
        let claims = keys.verify_access(token).map_err(|e| {
            warn!(error = %e, "invalid or expired token");
            ApiError::unauthorized("Could not validate credentials")
        })?;

        let mut uow = state.store.begin().await?;
        let user = uow
            .user_by_id(claims.sub)
            .await?
            .ok_or_else(|| {
                warn!(user_id = %claims.sub, "token for unknown user");
                ApiError::unauthorized("User not found")
            })?;
        uow.rollback().await?;

        if !user.is_active {
            warn!(user_id = %user.id, "inactive user rejected");
            return Err(ApiError::bad_request("Inactive user"));
        }
        Ok(CurrentUser(user))
    }
}

#[async_trait]
impl FromRequestParts<AppState> for SuperUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let CurrentUser(user) = CurrentUser::from_request_parts(parts, state).await?;
        if !user.is_superuser {
            warn!(user_id = %user.id, "superuser required");
            return Err(ApiError::forbidden("The user doesn't have enough privileges"));
        }
        Ok(SuperUser(user))
    }
}
