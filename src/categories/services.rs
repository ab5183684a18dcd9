use uuid::Uuid;

use crate::audit::{self, Audit};
use crate::categories::{
    dto::{CategoryCreate, CategoryUpdate},
    repo_types::Category,
};
use crate::dto::Pagination;
use crate::store::{StoreResult, UnitOfWork};

pub async fn get_by_id(uow: &mut dyn UnitOfWork, id: Uuid) -> StoreResult<Option<Category>> {
    uow.category_by_id(id).await
}

pub async fn get_by_slug(uow: &mut dyn UnitOfWork, slug: &str) -> StoreResult<Option<Category>> {
    uow.category_by_slug(slug).await
}

/// One page plus the total number of categories.
pub async fn list(uow: &mut dyn UnitOfWork, page: Pagination) -> StoreResult<(Vec<Category>, i64)> {
    let items = uow.list_categories(page).await?;
    let count = uow.count_categories().await?;
    Ok((items, count))
}

pub async fn create(
    uow: &mut dyn UnitOfWork,
    input: CategoryCreate,
    actor: Option<Uuid>,
) -> StoreResult<Category> {
    let category = Category {
        id: Uuid::new_v4(),
        name: input.name,
        slug: input.slug,
        description: input.description,
        image: input.image,
        audit: Audit::created(actor, audit::now()),
    };
    uow.insert_category(&category).await?;
    Ok(category)
}

pub async fn update(
    uow: &mut dyn UnitOfWork,
    mut category: Category,
    patch: CategoryUpdate,
    actor: Option<Uuid>,
) -> StoreResult<Category> {
    patch.apply(&mut category);
    category.audit = category.audit.touched(actor, audit::now());
    uow.update_category(&category).await?;
    Ok(category)
}

pub async fn delete(uow: &mut dyn UnitOfWork, id: Uuid) -> StoreResult<bool> {
    uow.delete_category(id).await
}
