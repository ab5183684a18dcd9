use axum::{extract::State, http::StatusCode, routing::get, Router};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::{
    dto::{PostCreate, PostPublic, PostUpdate},
    services,
};
use crate::{
    auth::extractors::SuperUser,
    categories::services as categories,
    dto::{ListResponse, Message, Pagination},
    error::{ApiError, ApiResult},
    extract::{Json, Path, Query},
    state::AppState,
    store::UnitOfWork,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/posts", get(list_posts).post(create_post))
        .route(
            "/posts/:id",
            get(get_post).patch(update_post).delete(delete_post),
        )
}

fn not_found() -> ApiError {
    ApiError::not_found("Post not found")
}

async fn ensure_slug_free(uow: &mut dyn UnitOfWork, slug: &str) -> ApiResult<()> {
    if services::get_by_slug(uow, slug).await?.is_some() {
        warn!(%slug, "post slug already exists");
        return Err(ApiError::conflict("Post slug already exists"));
    }
    Ok(())
}

async fn ensure_category_exists(uow: &mut dyn UnitOfWork, category_id: Uuid) -> ApiResult<()> {
    if categories::get_by_id(uow, category_id).await?.is_none() {
        warn!(%category_id, "post references unknown category");
        return Err(ApiError::not_found("Category not found"));
    }
    Ok(())
}

#[instrument(skip_all, fields(offset = page.skip, limit = page.limit))]
pub async fn list_posts(
    State(state): State<AppState>,
    _admin: SuperUser,
    Query(page): Query<Pagination>,
) -> ApiResult<Json<ListResponse<PostPublic>>> {
    let mut uow = state.store.begin().await?;
    let (items, count) = services::list(&mut *uow, page).await?;
    uow.rollback().await?;
    Ok(Json(ListResponse {
        data: items.into_iter().map(Into::into).collect(),
        count,
    }))
}

#[instrument(skip_all, fields(admin_id = %admin.id))]
pub async fn create_post(
    State(state): State<AppState>,
    SuperUser(admin): SuperUser,
    Json(payload): Json<PostCreate>,
) -> ApiResult<(StatusCode, Json<PostPublic>)> {
    payload.validate()?;

    let mut uow = state.store.begin().await?;
    ensure_slug_free(&mut *uow, &payload.slug).await?;
    if let Some(category_id) = payload.category_id {
        ensure_category_exists(&mut *uow, category_id).await?;
    }
    let post = services::create(&mut *uow, payload, Some(admin.id)).await?;
    uow.commit().await?;

    info!(post_id = %post.id, slug = %post.slug, "post created");
    Ok((StatusCode::CREATED, Json(post.into())))
}

#[instrument(skip_all, fields(%id))]
pub async fn get_post(
    State(state): State<AppState>,
    _admin: SuperUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<PostPublic>> {
    let mut uow = state.store.begin().await?;
    let post = services::get_by_id(&mut *uow, id).await?.ok_or_else(not_found)?;
    uow.rollback().await?;
    Ok(Json(post.into()))
}

#[instrument(skip_all, fields(%id, admin_id = %admin.id))]
pub async fn update_post(
    State(state): State<AppState>,
    SuperUser(admin): SuperUser,
    Path(id): Path<Uuid>,
    Json(patch): Json<PostUpdate>,
) -> ApiResult<Json<PostPublic>> {
    patch.validate()?;

    let mut uow = state.store.begin().await?;
    let existing = services::get_by_id(&mut *uow, id).await?.ok_or_else(not_found)?;
    if let Some(slug) = patch.slug.as_deref() {
        if slug != existing.slug {
            ensure_slug_free(&mut *uow, slug).await?;
        }
    }
    if let Some(Some(category_id)) = patch.category_id {
        if existing.category_id != Some(category_id) {
            ensure_category_exists(&mut *uow, category_id).await?;
        }
    }
    let post = services::update(&mut *uow, existing, patch, Some(admin.id)).await?;
    uow.commit().await?;

    info!(post_id = %post.id, "post updated");
    Ok(Json(post.into()))
}

#[instrument(skip_all, fields(%id))]
pub async fn delete_post(
    State(state): State<AppState>,
    _admin: SuperUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Message>> {
    let mut uow = state.store.begin().await?;
    if !services::delete(&mut *uow, id).await? {
        return Err(not_found());
    }
    uow.commit().await?;

    info!(post_id = %id, "post deleted");
    Ok(Json(Message::new("Post deleted successfully")))
}
