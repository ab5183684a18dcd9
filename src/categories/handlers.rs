use axum::{extract::State, http::StatusCode, routing::get, Router};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::{
    dto::{CategoryCreate, CategoryPublic, CategoryUpdate},
    services,
};
use crate::{
    auth::extractors::SuperUser,
    dto::{ListResponse, Message, Pagination},
    error::{ApiError, ApiResult},
    extract::{Json, Path, Query},
    state::AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/categories", get(list_categories).post(create_category))
        .route(
            "/categories/:id",
            get(get_category)
                .patch(update_category)
                .delete(delete_category),
        )
}

fn not_found() -> ApiError {
    ApiError::not_found("Category not found")
}

#[instrument(skip_all, fields(offset = page.skip, limit = page.limit))]
pub async fn list_categories(
    State(state): State<AppState>,
    _admin: SuperUser,
    Query(page): Query<Pagination>,
) -> ApiResult<Json<ListResponse<CategoryPublic>>> {
    let mut uow = state.store.begin().await?;
    let (items, count) = services::list(&mut *uow, page).await?;
    uow.rollback().await?;
    Ok(Json(ListResponse {
        data: items.into_iter().map(Into::into).collect(),
        count,
    }))
}

#[instrument(skip_all, fields(admin_id = %admin.id))]
pub async fn create_category(
    State(state): State<AppState>,
    SuperUser(admin): SuperUser,
    Json(payload): Json<CategoryCreate>,
) -> ApiResult<(StatusCode, Json<CategoryPublic>)> {
    payload.validate()?;

    let mut uow = state.store.begin().await?;
    if services::get_by_slug(&mut *uow, &payload.slug).await?.is_some() {
        warn!(slug = %payload.slug, "category slug already exists");
        return Err(ApiError::conflict("Category slug already exists"));
    }
    let category = services::create(&mut *uow, payload, Some(admin.id)).await?;
    uow.commit().await?;

    info!(category_id = %category.id, slug = %category.slug, "category created");
    Ok((StatusCode::CREATED, Json(category.into())))
}

#[instrument(skip_all, fields(%id))]
pub async fn get_category(
    State(state): State<AppState>,
    _admin: SuperUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<CategoryPublic>> {
    let mut uow = state.store.begin().await?;
    let category = services::get_by_id(&mut *uow, id).await?.ok_or_else(not_found)?;
    uow.rollback().await?;
    Ok(Json(category.into()))
}

#[instrument(skip_all, fields(%id, admin_id = %admin.id))]
pub async fn update_category(
    State(state): State<AppState>,
    SuperUser(admin): SuperUser,
    Path(id): Path<Uuid>,
    Json(patch): Json<CategoryUpdate>,
) -> ApiResult<Json<CategoryPublic>> {
    patch.validate()?;

    let mut uow = state.store.begin().await?;
    let existing = services::get_by_id(&mut *uow, id).await?.ok_or_else(not_found)?;
    if let Some(slug) = patch.slug.as_deref() {
        if slug != existing.slug && services::get_by_slug(&mut *uow, slug).await?.is_some() {
            warn!(%slug, "category slug already exists");
            return Err(ApiError::conflict("Category slug already exists"));
        }
    }
    let category = services::update(&mut *uow, existing, patch, Some(admin.id)).await?;
    uow.commit().await?;

    info!(category_id = %category.id, "category updated");
    Ok(Json(category.into()))
}

#[instrument(skip_all, fields(%id))]
pub async fn delete_category(
    State(state): State<AppState>,
    _admin: SuperUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Message>> {
    let mut uow = state.store.begin().await?;
    if !services::delete(&mut *uow, id).await? {
        return Err(not_found());
    }
    uow.commit().await?;

    info!(category_id = %id, "category deleted");
    Ok(Json(Message::new("Category deleted successfully")))
}
