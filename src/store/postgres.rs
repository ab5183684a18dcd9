//! PostgreSQL store. One unit of work is one transaction; sqlx rolls the
//! transaction back when it is dropped without `commit`.
use anyhow::Context;
use async_trait::async_trait;
use sqlx::{postgres::PgPoolOptions, PgPool, Postgres, Transaction};
use tracing::{info, warn};
use uuid::Uuid;

use super::{CategoryRepo, PostRepo, Store, StoreError, StoreResult, UnitOfWork, UserRepo};
use crate::categories::{self, repo_types::Category};
use crate::dto::Pagination;
use crate::posts::{self, repo_types::Post};
use crate::users::{self, repo_types::User};

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db) = &e {
            let constraint = db.constraint().unwrap_or("unknown").to_string();
            if db.is_unique_violation() {
                return StoreError::Conflict(constraint);
            }
            if db.is_foreign_key_violation() {
                return StoreError::MissingReference(constraint);
            }
        }
        StoreError::Unexpected(anyhow::Error::new(e))
    }
}

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Connects and applies the embedded migrations.
    pub async fn connect(database_url: &str) -> anyhow::Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await
            .context("connect to database")?;
        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .context("run migrations")?;
        info!("database migrations applied");
        Ok(Self { pool })
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Store for PgStore {
    async fn begin(&self) -> StoreResult<Box<dyn UnitOfWork>> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(PgUnitOfWork { tx }))
    }

    async fn health_check(&self) -> StoreResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await.map_err(|e| {
            warn!(error = %e, "postgres health check failed");
            StoreError::from(e)
        })?;
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "postgres"
    }
}

pub struct PgUnitOfWork {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl UnitOfWork for PgUnitOfWork {
    async fn commit(self: Box<Self>) -> StoreResult<()> {
        self.tx.commit().await?;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> StoreResult<()> {
        self.tx.rollback().await?;
        Ok(())
    }
}

#[async_trait]
impl UserRepo for PgUnitOfWork {
    async fn user_by_id(&mut self, id: Uuid) -> StoreResult<Option<User>> {
        Ok(users::repo::find_by_id(&mut self.tx, id).await?)
    }

    async fn user_by_email(&mut self, email: &str) -> StoreResult<Option<User>> {
        Ok(users::repo::find_by_email(&mut self.tx, email).await?)
    }

    async fn list_users(&mut self, page: Pagination) -> StoreResult<Vec<User>> {
        let page = page.normalize();
        Ok(users::repo::list(&mut self.tx, page.limit, page.skip).await?)
    }

    async fn count_users(&mut self) -> StoreResult<i64> {
        Ok(users::repo::count(&mut self.tx).await?)
    }

    async fn insert_user(&mut self, user: &User) -> StoreResult<()> {
        Ok(users::repo::insert(&mut self.tx, user).await?)
    }

    async fn update_user(&mut self, user: &User) -> StoreResult<()> {
        Ok(users::repo::update(&mut self.tx, user).await?)
    }

    async fn delete_user(&mut self, id: Uuid) -> StoreResult<bool> {
        Ok(users::repo::delete(&mut self.tx, id).await?)
    }
}

#[async_trait]
impl PostRepo for PgUnitOfWork {
    async fn post_by_id(&mut self, id: Uuid) -> StoreResult<Option<Post>> {
        Ok(posts::repo::find_by_id(&mut self.tx, id).await?)
    }

    async fn post_by_slug(&mut self, slug: &str) -> StoreResult<Option<Post>> {
        Ok(posts::repo::find_by_slug(&mut self.tx, slug).await?)
    }

    async fn list_posts(&mut self, page: Pagination) -> StoreResult<Vec<Post>> {
        let page = page.normalize();
        Ok(posts::repo::list(&mut self.tx, page.limit, page.skip).await?)
    }

    async fn count_posts(&mut self) -> StoreResult<i64> {
        Ok(posts::repo::count(&mut self.tx).await?)
    }

    async fn insert_post(&mut self, post: &Post) -> StoreResult<()> {
        Ok(posts::repo::insert(&mut self.tx, post).await?)
    }

    async fn update_post(&mut self, post: &Post) -> StoreResult<()> {
        Ok(posts::repo::update(&mut self.tx, post).await?)
    }

    async fn delete_post(&mut self, id: Uuid) -> StoreResult<bool> {
        Ok(posts::repo::delete(&mut self.tx, id).await?)
    }
}

#[async_trait]
impl CategoryRepo for PgUnitOfWork {
    async fn category_by_id(&mut self, id: Uuid) -> StoreResult<Option<Category>> {
        Ok(categories::repo::find_by_id(&mut self.tx, id).await?)
    }

    async fn category_by_slug(&mut self, slug: &str) -> StoreResult<Option<Category>> {
        Ok(categories::repo::find_by_slug(&mut self.tx, slug).await?)
    }

    async fn list_categories(&mut self, page: Pagination) -> StoreResult<Vec<Category>> {
        let page = page.normalize();
        Ok(categories::repo::list(&mut self.tx, page.limit, page.skip).await?)
    }

    async fn count_categories(&mut self) -> StoreResult<i64> {
        Ok(categories::repo::count(&mut self.tx).await?)
    }

    async fn insert_category(&mut self, category: &Category) -> StoreResult<()> {
        Ok(categories::repo::insert(&mut self.tx, category).await?)
    }

    async fn update_category(&mut self, category: &Category) -> StoreResult<()> {
        Ok(categories::repo::update(&mut self.tx, category).await?)
    }

    async fn delete_category(&mut self, id: Uuid) -> StoreResult<bool> {
        Ok(categories::repo::delete(&mut self.tx, id).await?)
    }
}
