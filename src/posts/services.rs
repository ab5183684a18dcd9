use uuid::Uuid;

use crate::audit::{self, Audit};
use crate::dto::Pagination;
use crate::posts::{
    dto::{PostCreate, PostUpdate},
    repo_types::Post,
};
use crate::store::{StoreResult, UnitOfWork};

pub async fn get_by_id(uow: &mut dyn UnitOfWork, id: Uuid) -> StoreResult<Option<Post>> {
    uow.post_by_id(id).await
}

pub async fn get_by_slug(uow: &mut dyn UnitOfWork, slug: &str) -> StoreResult<Option<Post>> {
    uow.post_by_slug(slug).await
}

pub async fn list(uow: &mut dyn UnitOfWork, page: Pagination) -> StoreResult<(Vec<Post>, i64)> {
    let items = uow.list_posts(page).await?;
    let count = uow.count_posts().await?;
    Ok((items, count))
}

pub async fn create(
    uow: &mut dyn UnitOfWork,
    input: PostCreate,
    actor: Option<Uuid>,
) -> StoreResult<Post> {
    let post = Post {
        id: Uuid::new_v4(),
        title: input.title,
        slug: input.slug,
        content: input.content,
        image: input.image,
        thumbnail_url: input.thumbnail_url,
        is_published: input.is_published,
        is_featured: input.is_featured,
        category_id: input.category_id,
        published_at: input.published_at.map(audit::truncate_micros),
        tags: input.tags,
        audit: Audit::created(actor, audit::now()),
    };
    uow.insert_post(&post).await?;
    Ok(post)
}

pub async fn update(
    uow: &mut dyn UnitOfWork,
    mut post: Post,
    patch: PostUpdate,
    actor: Option<Uuid>,
) -> StoreResult<Post> {
    patch.apply(&mut post);
    post.published_at = post.published_at.map(audit::truncate_micros);
    post.audit = post.audit.touched(actor, audit::now());
    uow.update_post(&post).await?;
    Ok(post)
}

pub async fn delete(uow: &mut dyn UnitOfWork, id: Uuid) -> StoreResult<bool> {
    uow.delete_post(id).await
}
