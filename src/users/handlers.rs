use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, patch, post},
    Router,
};
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use super::{
    dto::{UpdatePassword, UserCreate, UserPublic, UserRegister, UserUpdate, UserUpdateMe},
    repo_types::User,
    services,
};
use crate::{
    auth::{
        extractors::{CurrentUser, SuperUser},
        password::verify_password,
    },
    dto::{ListResponse, Message, Pagination},
    error::{ApiError, ApiResult},
    extract::{Json, Path, Query},
    mail,
    state::AppState,
    store::UnitOfWork,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users).post(create_user))
        .route(
            "/users/me",
            get(read_me).patch(update_me).delete(delete_me),
        )
        .route("/users/me/password", patch(update_password_me))
        .route("/users/signup", post(register_user))
        .route(
            "/users/:id",
            get(read_user).patch(update_user).delete(delete_user),
        )
}

fn not_found() -> ApiError {
    ApiError::not_found("User not found")
}

fn email_taken() -> ApiError {
    ApiError::conflict("User with this email already exists")
}

/// The caller's row as of this unit of work; the extractor's copy may be stale.
async fn reload_self(uow: &mut dyn UnitOfWork, id: Uuid) -> ApiResult<User> {
    let user = services::get_by_id(uow, id).await?.ok_or_else(not_found)?;
    if !user.is_active {
        warn!(user_id = %id, "user deactivated mid-request");
        return Err(ApiError::bad_request("Inactive user"));
    }
    Ok(user)
}

/// Conflict unless `email` is free or already belongs to `owner`.
async fn ensure_email_free(
    uow: &mut dyn UnitOfWork,
    email: &str,
    owner: Option<Uuid>,
) -> ApiResult<()> {
    match services::get_by_email(uow, email).await? {
        Some(other) if Some(other.id) != owner => {
            warn!(%email, "email already registered");
            Err(email_taken())
        }
        _ => Ok(()),
    }
}

#[instrument(skip_all, fields(offset = page.skip, limit = page.limit))]
pub async fn list_users(
    State(state): State<AppState>,
    _admin: SuperUser,
    Query(page): Query<Pagination>,
) -> ApiResult<Json<ListResponse<UserPublic>>> {
    let mut uow = state.store.begin().await?;
    let (items, count) = services::list(&mut *uow, page).await?;
    uow.rollback().await?;
    Ok(Json(ListResponse {
        data: items.into_iter().map(Into::into).collect(),
        count,
    }))
}

#[instrument(skip_all, fields(admin_id = %admin.id))]
pub async fn create_user(
    State(state): State<AppState>,
    SuperUser(admin): SuperUser,
    Json(mut payload): Json<UserCreate>,
) -> ApiResult<(StatusCode, Json<UserPublic>)> {
    payload.normalize();
    payload.validate()?;

    let mut uow = state.store.begin().await?;
    ensure_email_free(&mut *uow, &payload.email, None).await?;
    let user = services::create(&mut *uow, payload, Some(admin.id)).await?;
    uow.commit().await?;
    info!(user_id = %user.id, "user created");

    if state.config.emails.is_some() {
        let message = mail::new_account_email(&state.config.project_name, &user.email);
        if let Err(e) = state.mailer.send(message).await {
            error!(error = ?e, user_id = %user.id, "new account email failed");
        }
    }

    Ok((StatusCode::CREATED, Json(user.into())))
}

#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn read_me(CurrentUser(user): CurrentUser) -> Json<UserPublic> {
    Json(user.into())
}

#[instrument(skip_all, fields(user_id = %current.id))]
pub async fn update_me(
    State(state): State<AppState>,
    CurrentUser(current): CurrentUser,
    Json(payload): Json<UserUpdateMe>,
) -> ApiResult<Json<UserPublic>> {
    let mut patch = UserUpdate::from(payload);
    patch.normalize();
    patch.validate()?;

    let mut uow = state.store.begin().await?;
    let user = reload_self(&mut *uow, current.id).await?;
    if let Some(email) = patch.email.as_deref() {
        ensure_email_free(&mut *uow, email, Some(user.id)).await?;
    }
    let user = services::update(&mut *uow, user, patch, Some(current.id)).await?;
    uow.commit().await?;

    info!("profile updated");
    Ok(Json(user.into()))
}

#[instrument(skip_all, fields(user_id = %current.id))]
pub async fn update_password_me(
    State(state): State<AppState>,
    CurrentUser(current): CurrentUser,
    Json(payload): Json<UpdatePassword>,
) -> ApiResult<Json<Message>> {
    let mut uow = state.store.begin().await?;
    let user = reload_self(&mut *uow, current.id).await?;
    if !verify_password(&payload.current_password, &user.hashed_password)? {
        warn!("password change with wrong current password");
        return Err(ApiError::bad_request("Incorrect password"));
    }
    if payload.current_password == payload.new_password {
        return Err(ApiError::bad_request(
            "New password cannot be the same as the current one",
        ));
    }
    payload.validate()?;

    let patch = UserUpdate {
        password: Some(payload.new_password),
        ..Default::default()
    };
    services::update(&mut *uow, user, patch, Some(current.id)).await?;
    uow.commit().await?;

    info!("password updated");
    Ok(Json(Message::new("Password updated successfully")))
}

#[instrument(skip_all, fields(user_id = %current.id))]
pub async fn delete_me(
    State(state): State<AppState>,
    CurrentUser(current): CurrentUser,
) -> ApiResult<Json<Message>> {
    let mut uow = state.store.begin().await?;
    let user = reload_self(&mut *uow, current.id).await?;
    if user.is_superuser {
        warn!("superuser tried to delete own account");
        return Err(ApiError::forbidden(
            "Super users are not allowed to delete themselves",
        ));
    }
    if !services::delete(&mut *uow, user.id).await? {
        return Err(not_found());
    }
    uow.commit().await?;

    info!("user deleted own account");
    Ok(Json(Message::new("User deleted successfully")))
}

#[instrument(skip_all)]
pub async fn register_user(
    State(state): State<AppState>,
    Json(payload): Json<UserRegister>,
) -> ApiResult<(StatusCode, Json<UserPublic>)> {
    let mut payload = UserCreate::from(payload);
    payload.normalize();
    payload.validate()?;

    let mut uow = state.store.begin().await?;
    ensure_email_free(&mut *uow, &payload.email, None).await?;
    let user = services::create(&mut *uow, payload, None).await?;
    uow.commit().await?;

    info!(user_id = %user.id, "user signed up");
    Ok((StatusCode::CREATED, Json(user.into())))
}

#[instrument(skip_all, fields(%id, requester_id = %requester.id))]
pub async fn read_user(
    State(state): State<AppState>,
    CurrentUser(requester): CurrentUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<UserPublic>> {
    if requester.id == id {
        return Ok(Json(requester.into()));
    }
    if !requester.is_superuser {
        warn!("non-superuser read of another user");
        return Err(ApiError::forbidden("The user doesn't have enough privileges"));
    }

    let mut uow = state.store.begin().await?;
    let user = services::get_by_id(&mut *uow, id).await?.ok_or_else(not_found)?;
    uow.rollback().await?;
    Ok(Json(user.into()))
}

#[instrument(skip_all, fields(%id, admin_id = %admin.id))]
pub async fn update_user(
    State(state): State<AppState>,
    SuperUser(admin): SuperUser,
    Path(id): Path<Uuid>,
    Json(mut patch): Json<UserUpdate>,
) -> ApiResult<Json<UserPublic>> {
    patch.normalize();
    patch.validate()?;

    let mut uow = state.store.begin().await?;
    let existing = services::get_by_id(&mut *uow, id).await?.ok_or_else(not_found)?;
    if let Some(email) = patch.email.as_deref() {
        ensure_email_free(&mut *uow, email, Some(existing.id)).await?;
    }
    let user = services::update(&mut *uow, existing, patch, Some(admin.id)).await?;
    uow.commit().await?;

    info!(user_id = %user.id, "user updated");
    Ok(Json(user.into()))
}

#[instrument(skip_all, fields(%id, admin_id = %admin.id))]
pub async fn delete_user(
    State(state): State<AppState>,
    SuperUser(admin): SuperUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Message>> {
    if id == admin.id {
        warn!("superuser tried to delete own account by id");
        return Err(ApiError::forbidden(
            "Super users are not allowed to delete themselves",
        ));
    }

    let mut uow = state.store.begin().await?;
    if !services::delete(&mut *uow, id).await? {
        return Err(not_found());
    }
    uow.commit().await?;

    info!(user_id = %id, "user deleted");
    Ok(Json(Message::new("User deleted successfully")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(email: &str, is_superuser: bool) -> UserCreate {
        UserCreate {
            email: email.into(),
            password: "longenough1".into(),
            full_name: None,
            is_active: true,
            is_superuser,
        }
    }

    /// Returns the state, an admin, and a regular user as the auth extractor
    /// would have loaded them.
    async fn seeded() -> (AppState, User, User) {
        let state = AppState::fake();
        let mut uow = state.store.begin().await.unwrap();
        let admin = services::create(&mut *uow, input("admin@x.com", true), None)
            .await
            .unwrap();
        let alice = services::create(&mut *uow, input("alice@x.com", false), Some(admin.id))
            .await
            .unwrap();
        uow.commit().await.unwrap();
        (state, admin, alice)
    }

    async fn admin_patch(state: &AppState, admin: &User, id: Uuid, patch: UserUpdate) {
        let mut uow = state.store.begin().await.unwrap();
        let user = services::get_by_id(&mut *uow, id).await.unwrap().unwrap();
        services::update(&mut *uow, user, patch, Some(admin.id)).await.unwrap();
        uow.commit().await.unwrap();
    }

    async fn stored(state: &AppState, id: Uuid) -> Option<User> {
        let mut uow = state.store.begin().await.unwrap();
        let user = services::get_by_id(&mut *uow, id).await.unwrap();
        uow.rollback().await.unwrap();
        user
    }

    #[tokio::test]
    async fn update_me_keeps_concurrent_admin_changes() {
        let (state, admin, alice) = seeded().await;
        let promote = UserUpdate {
            is_superuser: Some(true),
            ..Default::default()
        };
        admin_patch(&state, &admin, alice.id, promote).await;

        let body = UserUpdateMe {
            full_name: Some(Some("Alice".into())),
            ..Default::default()
        };
        let Json(public) = update_me(State(state.clone()), CurrentUser(alice.clone()), Json(body))
            .await
            .unwrap();
        assert!(public.is_superuser);
        assert_eq!(public.full_name.as_deref(), Some("Alice"));

        let row = stored(&state, alice.id).await.unwrap();
        assert!(row.is_superuser);
        assert_eq!(row.full_name.as_deref(), Some("Alice"));
        assert_eq!(row.audit.updated_by, Some(alice.id));
    }

    #[tokio::test]
    async fn update_me_does_not_reactivate_a_deactivated_user() {
        let (state, admin, alice) = seeded().await;
        let deactivate = UserUpdate {
            is_active: Some(false),
            ..Default::default()
        };
        admin_patch(&state, &admin, alice.id, deactivate).await;

        let body = UserUpdateMe {
            full_name: Some(Some("Alice".into())),
            ..Default::default()
        };
        let err = update_me(State(state.clone()), CurrentUser(alice.clone()), Json(body))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(_)));

        let row = stored(&state, alice.id).await.unwrap();
        assert!(!row.is_active);
        assert_eq!(row.full_name, None);
    }

    #[tokio::test]
    async fn password_change_checks_the_current_hash() {
        let (state, admin, alice) = seeded().await;
        let reset = UserUpdate {
            password: Some("resetbyadmin1".into()),
            ..Default::default()
        };
        admin_patch(&state, &admin, alice.id, reset).await;

        let body = UpdatePassword {
            current_password: "longenough1".into(),
            new_password: "newpassword1".into(),
        };
        let err = update_password_me(State(state.clone()), CurrentUser(alice.clone()), Json(body))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(ref m) if m == "Incorrect password"));
    }

    #[tokio::test]
    async fn delete_me_of_missing_user_is_not_found() {
        let (state, _admin, alice) = seeded().await;
        let mut uow = state.store.begin().await.unwrap();
        assert!(services::delete(&mut *uow, alice.id).await.unwrap());
        uow.commit().await.unwrap();

        let err = delete_me(State(state.clone()), CurrentUser(alice))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
    }

    #[tokio::test]
    async fn delete_me_sees_a_fresh_promotion() {
        let (state, admin, alice) = seeded().await;
        let promote = UserUpdate {
            is_superuser: Some(true),
            ..Default::default()
        };
        admin_patch(&state, &admin, alice.id, promote).await;

        let err = delete_me(State(state.clone()), CurrentUser(alice.clone()))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Forbidden(_)));
        assert!(stored(&state, alice.id).await.is_some());
    }
}
