use tracing::info;
use uuid::Uuid;

use crate::audit::{self, Audit};
use crate::auth::password::hash_password;
use crate::config::AppConfig;
use crate::dto::Pagination;
use crate::store::{Store, StoreResult, UnitOfWork};
use crate::users::{
    dto::{UserCreate, UserUpdate},
    repo_types::User,
};

pub async fn get_by_id(uow: &mut dyn UnitOfWork, id: Uuid) -> StoreResult<Option<User>> {
    uow.user_by_id(id).await
}

pub async fn get_by_email(uow: &mut dyn UnitOfWork, email: &str) -> StoreResult<Option<User>> {
    uow.user_by_email(email).await
}

pub async fn list(uow: &mut dyn UnitOfWork, page: Pagination) -> StoreResult<(Vec<User>, i64)> {
    let items = uow.list_users(page).await?;
    let count = uow.count_users().await?;
    Ok((items, count))
}

/// Hashes the plaintext password; only the PHC string is stored.
pub async fn create(
    uow: &mut dyn UnitOfWork,
    input: UserCreate,
    actor: Option<Uuid>,
) -> StoreResult<User> {
    let user = User {
        id: Uuid::new_v4(),
        email: input.email,
        hashed_password: hash_password(&input.password)?,
        is_active: input.is_active,
        is_superuser: input.is_superuser,
        full_name: input.full_name,
        audit: Audit::created(actor, audit::now()),
    };
    uow.insert_user(&user).await?;
    Ok(user)
}

pub async fn update(
    uow: &mut dyn UnitOfWork,
    mut user: User,
    mut patch: UserUpdate,
    actor: Option<Uuid>,
) -> StoreResult<User> {
    if let Some(password) = patch.password.take() {
        user.hashed_password = hash_password(&password)?;
    }
    patch.apply(&mut user);
    user.audit = user.audit.touched(actor, audit::now());
    uow.update_user(&user).await?;
    Ok(user)
}

pub async fn delete(uow: &mut dyn UnitOfWork, id: Uuid) -> StoreResult<bool> {
    uow.delete_user(id).await
}

/// Creates the configured first superuser unless that email is already taken.
pub async fn ensure_first_superuser(store: &dyn Store, config: &AppConfig) -> StoreResult<()> {
    let Some(seed) = &config.first_superuser else {
        return Ok(());
    };
    let email = crate::validate::normalize_email(&seed.email);

    let mut uow = store.begin().await?;
    if get_by_email(&mut *uow, &email).await?.is_some() {
        uow.rollback().await?;
        return Ok(());
    }
    let input = UserCreate {
        email,
        password: seed.password.clone(),
        full_name: None,
        is_active: true,
        is_superuser: true,
    };
    let user = create(&mut *uow, input, None).await?;
    uow.commit().await?;

    info!(user_id = %user.id, email = %user.email, "first superuser created");
    Ok(())
}
