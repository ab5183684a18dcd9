use axum::{
    extract::{FromRef, State},
    routing::post,
    Router,
};
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        dto::{LoginRequest, RefreshRequest, TokenResponse},
        jwt::JwtKeys,
        password::verify_password,
    },
    error::{ApiError, ApiResult},
    extract::Json,
    state::AppState,
    validate,
};

pub fn login_routes() -> Router<AppState> {
    Router::new()
        .route("/login/access-token", post(login))
        .route("/login/refresh", post(refresh))
}

fn issue(keys: &JwtKeys, user_id: uuid::Uuid) -> ApiResult<TokenResponse> {
    let access_token = keys.sign_access(user_id)?;
    let refresh_token = keys.sign_refresh(user_id)?;
    Ok(TokenResponse::bearer(access_token, refresh_token))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> ApiResult<Json<TokenResponse>> {
    let email = validate::normalize_email(&payload.email);

    let mut uow = state.store.begin().await?;
    let user = uow.user_by_email(&email).await?;
    uow.rollback().await?;

    let Some(user) = user else {
        warn!(email = %email, "login unknown email");
        return Err(ApiError::bad_request("Incorrect email or password"));
    };

    if !verify_password(&payload.password, &user.hashed_password)? {
        warn!(user_id = %user.id, "login invalid password");
        return Err(ApiError::bad_request("Incorrect email or password"));
    }
    if !user.is_active {
        warn!(user_id = %user.id, "login by inactive user");
        return Err(ApiError::bad_request("Inactive user"));
    }

    let tokens = issue(&JwtKeys::from_ref(&state), user.id)?;
    info!(user_id = %user.id, "user logged in");
    Ok(Json(tokens))
}

#[instrument(skip(state, payload))]
pub async fn refresh(
    State(state): State<AppState>,
    Json(payload): Json<RefreshRequest>,
) -> ApiResult<Json<TokenResponse>> {
    let keys = JwtKeys::from_ref(&state);
    let claims = keys.verify_refresh(&payload.refresh_token).map_err(|e| {
        warn!(error = %e, "refresh rejected");
        ApiError::unauthorized("Could not validate credentials")
    })?;

    let mut uow = state.store.begin().await?;
    let user = uow.user_by_id(claims.sub).await?;
    uow.rollback().await?;

    match user {
        Some(user) if user.is_active => Ok(Json(issue(&keys, user.id)?)),
        Some(_) => Err(ApiError::bad_request("Inactive user")),
        None => Err(ApiError::unauthorized("User not found")),
    }
}
