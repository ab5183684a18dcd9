//! Persistence boundary.
//!
//! Handlers open one [`UnitOfWork`] per request with [`Store::begin`], pass it
//! into the service functions, and call [`UnitOfWork::commit`] once the
//! mutation is done. Dropping an uncommitted unit of work rolls it back, so an
//! early `?` return never leaves a half-applied write behind.
//!
//! Unique keys (user email, post/category slug) and references (post category,
//! audit actors) are enforced here, by both backends. Services pre-check them to
//! produce friendly errors, but only the store decides.
use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::categories::repo_types::Category;
use crate::dto::Pagination;
use crate::posts::repo_types::Post;
use crate::users::repo_types::User;

pub mod memory;
pub mod postgres;

#[derive(Debug, Error)]
pub enum StoreError {
    /// A unique constraint rejected the write; carries the constraint name.
    #[error("conflict: {0}")]
    Conflict(String),
    /// A foreign key points at a row that does not exist.
    #[error("missing reference: {0}")]
    MissingReference(String),
    #[error(transparent)]
    Unexpected(#[from] anyhow::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

#[async_trait]
pub trait Store: Send + Sync {
    async fn begin(&self) -> StoreResult<Box<dyn UnitOfWork>>;
    async fn health_check(&self) -> StoreResult<()>;
    fn backend_name(&self) -> &'static str;
}

#[async_trait]
pub trait UnitOfWork: UserRepo + PostRepo + CategoryRepo + Send {
    async fn commit(self: Box<Self>) -> StoreResult<()>;
    async fn rollback(self: Box<Self>) -> StoreResult<()>;
}

#[async_trait]
pub trait UserRepo {
    async fn user_by_id(&mut self, id: Uuid) -> StoreResult<Option<User>>;
    async fn user_by_email(&mut self, email: &str) -> StoreResult<Option<User>>;
    async fn list_users(&mut self, page: Pagination) -> StoreResult<Vec<User>>;
    async fn count_users(&mut self) -> StoreResult<i64>;
    async fn insert_user(&mut self, user: &User) -> StoreResult<()>;
    async fn update_user(&mut self, user: &User) -> StoreResult<()>;
    async fn delete_user(&mut self, id: Uuid) -> StoreResult<bool>;
}

#[async_trait]
pub trait PostRepo {
    async fn post_by_id(&mut self, id: Uuid) -> StoreResult<Option<Post>>;
    async fn post_by_slug(&mut self, slug: &str) -> StoreResult<Option<Post>>;
    async fn list_posts(&mut self, page: Pagination) -> StoreResult<Vec<Post>>;
    async fn count_posts(&mut self) -> StoreResult<i64>;
    async fn insert_post(&mut self, post: &Post) -> StoreResult<()>;
    async fn update_post(&mut self, post: &Post) -> StoreResult<()>;
    async fn delete_post(&mut self, id: Uuid) -> StoreResult<bool>;
}

#[async_trait]
pub trait CategoryRepo {
    async fn category_by_id(&mut self, id: Uuid) -> StoreResult<Option<Category>>;
    async fn category_by_slug(&mut self, slug: &str) -> StoreResult<Option<Category>>;
    async fn list_categories(&mut self, page: Pagination) -> StoreResult<Vec<Category>>;
    async fn count_categories(&mut self) -> StoreResult<i64>;
    async fn insert_category(&mut self, category: &Category) -> StoreResult<()>;
    async fn update_category(&mut self, category: &Category) -> StoreResult<()>;
    /// Posts that referenced the category keep existing with `category_id = NULL`.
    async fn delete_category(&mut self, id: Uuid) -> StoreResult<bool>;
}
