//! In-memory store for local development and tests.
//!
//! Units of work are serialized: `begin` takes the table lock for the whole
//! unit, works on a copy, and `commit` swaps the copy in. Rolling back (or
//! dropping) simply discards the copy. Nothing survives a restart.
//!
//! Constraints mirror the postgres schema in `migrations/`: unique email/slug,
//! `posts.category_id` and the audit actor columns must point at existing rows,
//! and deletes null out references to the removed row.
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

use super::{CategoryRepo, PostRepo, Store, StoreError, StoreResult, UnitOfWork, UserRepo};
use crate::audit::Audit;
use crate::categories::repo_types::Category;
use crate::dto::Pagination;
use crate::posts::repo_types::Post;
use crate::users::repo_types::User;

#[derive(Debug, Clone, Default)]
struct Tables {
    // insertion order
    users: Vec<User>,
    posts: Vec<Post>,
    categories: Vec<Category>,
}

#[derive(Clone, Default)]
pub struct InMemoryStore {
    tables: Arc<Mutex<Tables>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for InMemoryStore {
    async fn begin(&self) -> StoreResult<Box<dyn UnitOfWork>> {
        let guard = self.tables.clone().lock_owned().await;
        let work = guard.clone();
        Ok(Box::new(MemoryUnitOfWork { guard, work }))
    }

    async fn health_check(&self) -> StoreResult<()> {
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}

struct MemoryUnitOfWork {
    guard: OwnedMutexGuard<Tables>,
    work: Tables,
}

impl MemoryUnitOfWork {
    fn check_actors(&self, audit: &Audit) -> StoreResult<()> {
        for (column, actor) in [("created_by", audit.created_by), ("updated_by", audit.updated_by)] {
            if let Some(id) = actor {
                if !self.work.users.iter().any(|u| u.id == id) {
                    return Err(StoreError::MissingReference(format!("{column} -> users.id")));
                }
            }
        }
        Ok(())
    }

    fn check_category(&self, category_id: Option<Uuid>) -> StoreResult<()> {
        match category_id {
            Some(id) if !self.work.categories.iter().any(|c| c.id == id) => Err(
                StoreError::MissingReference("posts_category_id_fkey".into()),
            ),
            _ => Ok(()),
        }
    }
}

fn page<T: Clone>(rows: &[T], page: Pagination) -> Vec<T> {
    let page = page.normalize();
    rows.iter()
        .skip(page.skip as usize)
        .take(page.limit as usize)
        .cloned()
        .collect()
}

fn replace<T>(rows: &mut [T], id: Uuid, row: T, id_of: impl Fn(&T) -> Uuid) -> StoreResult<()> {
    match rows.iter_mut().find(|r| id_of(r) == id) {
        Some(slot) => {
            *slot = row;
            Ok(())
        }
        None => Err(StoreError::Unexpected(anyhow::anyhow!(
            "update of missing row {id}"
        ))),
    }
}

fn remove<T>(rows: &mut Vec<T>, id: Uuid, id_of: impl Fn(&T) -> Uuid) -> bool {
    let before = rows.len();
    rows.retain(|r| id_of(r) != id);
    rows.len() != before
}

fn null_actor(audit: &mut Audit, id: Uuid) {
    if audit.created_by == Some(id) {
        audit.created_by = None;
    }
    if audit.updated_by == Some(id) {
        audit.updated_by = None;
    }
}

#[async_trait]
impl UnitOfWork for MemoryUnitOfWork {
    async fn commit(self: Box<Self>) -> StoreResult<()> {
        let MemoryUnitOfWork { mut guard, work } = *self;
        *guard = work;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> StoreResult<()> {
        Ok(())
    }
}

#[async_trait]
impl UserRepo for MemoryUnitOfWork {
    async fn user_by_id(&mut self, id: Uuid) -> StoreResult<Option<User>> {
        Ok(self.work.users.iter().find(|u| u.id == id).cloned())
    }

    async fn user_by_email(&mut self, email: &str) -> StoreResult<Option<User>> {
        Ok(self.work.users.iter().find(|u| u.email == email).cloned())
    }

    async fn list_users(&mut self, p: Pagination) -> StoreResult<Vec<User>> {
        Ok(page(&self.work.users, p))
    }

    async fn count_users(&mut self) -> StoreResult<i64> {
        Ok(self.work.users.len() as i64)
    }

    async fn insert_user(&mut self, user: &User) -> StoreResult<()> {
        if self
            .work
            .users
            .iter()
            .any(|u| u.id == user.id || u.email == user.email)
        {
            return Err(StoreError::Conflict("users_email_key".into()));
        }
        self.check_actors(&user.audit)?;
        self.work.users.push(user.clone());
        Ok(())
    }

    async fn update_user(&mut self, user: &User) -> StoreResult<()> {
        if self
            .work
            .users
            .iter()
            .any(|u| u.id != user.id && u.email == user.email)
        {
            return Err(StoreError::Conflict("users_email_key".into()));
        }
        self.check_actors(&user.audit)?;
        replace(&mut self.work.users, user.id, user.clone(), |u| u.id)
    }

    async fn delete_user(&mut self, id: Uuid) -> StoreResult<bool> {
        let existed = remove(&mut self.work.users, id, |u| u.id);
        if existed {
            for user in &mut self.work.users {
                null_actor(&mut user.audit, id);
            }
            for post in &mut self.work.posts {
                null_actor(&mut post.audit, id);
            }
            for category in &mut self.work.categories {
                null_actor(&mut category.audit, id);
            }
        }
        Ok(existed)
    }
}

#[async_trait]
impl PostRepo for MemoryUnitOfWork {
    async fn post_by_id(&mut self, id: Uuid) -> StoreResult<Option<Post>> {
        Ok(self.work.posts.iter().find(|p| p.id == id).cloned())
    }

    async fn post_by_slug(&mut self, slug: &str) -> StoreResult<Option<Post>> {
        Ok(self.work.posts.iter().find(|p| p.slug == slug).cloned())
    }

    async fn list_posts(&mut self, p: Pagination) -> StoreResult<Vec<Post>> {
        Ok(page(&self.work.posts, p))
    }

    async fn count_posts(&mut self) -> StoreResult<i64> {
        Ok(self.work.posts.len() as i64)
    }

    async fn insert_post(&mut self, post: &Post) -> StoreResult<()> {
        if self
            .work
            .posts
            .iter()
            .any(|p| p.id == post.id || p.slug == post.slug)
        {
            return Err(StoreError::Conflict("posts_slug_key".into()));
        }
        self.check_category(post.category_id)?;
        self.check_actors(&post.audit)?;
        self.work.posts.push(post.clone());
        Ok(())
    }

    async fn update_post(&mut self, post: &Post) -> StoreResult<()> {
        if self
            .work
            .posts
            .iter()
            .any(|p| p.id != post.id && p.slug == post.slug)
        {
            return Err(StoreError::Conflict("posts_slug_key".into()));
        }
        self.check_category(post.category_id)?;
        self.check_actors(&post.audit)?;
        replace(&mut self.work.posts, post.id, post.clone(), |p| p.id)
    }

    async fn delete_post(&mut self, id: Uuid) -> StoreResult<bool> {
        Ok(remove(&mut self.work.posts, id, |p| p.id))
    }
}

#[async_trait]
impl CategoryRepo for MemoryUnitOfWork {
    async fn category_by_id(&mut self, id: Uuid) -> StoreResult<Option<Category>> {
        Ok(self.work.categories.iter().find(|c| c.id == id).cloned())
    }

    async fn category_by_slug(&mut self, slug: &str) -> StoreResult<Option<Category>> {
        Ok(self.work.categories.iter().find(|c| c.slug == slug).cloned())
    }

    async fn list_categories(&mut self, p: Pagination) -> StoreResult<Vec<Category>> {
        Ok(page(&self.work.categories, p))
    }

    async fn count_categories(&mut self) -> StoreResult<i64> {
        Ok(self.work.categories.len() as i64)
    }

    async fn insert_category(&mut self, category: &Category) -> StoreResult<()> {
        if self
            .work
            .categories
            .iter()
            .any(|c| c.id == category.id || c.slug == category.slug)
        {
            return Err(StoreError::Conflict("categories_slug_key".into()));
        }
        self.check_actors(&category.audit)?;
        self.work.categories.push(category.clone());
        Ok(())
    }

    async fn update_category(&mut self, category: &Category) -> StoreResult<()> {
        if self
            .work
            .categories
            .iter()
            .any(|c| c.id != category.id && c.slug == category.slug)
        {
            return Err(StoreError::Conflict("categories_slug_key".into()));
        }
        self.check_actors(&category.audit)?;
        replace(
            &mut self.work.categories,
            category.id,
            category.clone(),
            |c| c.id,
        )
    }

    async fn delete_category(&mut self, id: Uuid) -> StoreResult<bool> {
        let existed = remove(&mut self.work.categories, id, |c| c.id);
        if existed {
            for post in self
                .work
                .posts
                .iter_mut()
                .filter(|p| p.category_id == Some(id))
            {
                post.category_id = None;
            }
        }
        Ok(existed)
    }
}
