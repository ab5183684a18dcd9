use sqlx::PgConnection;
use uuid::Uuid;

use crate::users::repo_types::User;

const COLUMNS: &str = "id, email, hashed_password, is_active, is_superuser, full_name, \
                       created_at, updated_at, created_by, updated_by";

/// Find a user by id.
pub async fn find_by_id(conn: &mut PgConnection, id: Uuid) -> sqlx::Result<Option<User>> {
    sqlx::query_as::<_, User>(&format!("SELECT {COLUMNS} FROM users WHERE id = $1"))
        .bind(id)
        .fetch_optional(conn)
        .await
}

/// Find a user by (normalized) email.
pub async fn find_by_email(conn: &mut PgConnection, email: &str) -> sqlx::Result<Option<User>> {
    sqlx::query_as::<_, User>(&format!("SELECT {COLUMNS} FROM users WHERE email = $1"))
        .bind(email)
        .fetch_optional(conn)
        .await
}

pub async fn list(conn: &mut PgConnection, limit: i64, offset: i64) -> sqlx::Result<Vec<User>> {
    sqlx::query_as::<_, User>(&format!(
        r#"
        SELECT {COLUMNS}
        FROM users
        ORDER BY created_at ASC, id ASC
        LIMIT $1 OFFSET $2
        "#
    ))
    .bind(limit)
    .bind(offset)
    .fetch_all(conn)
    .await
}

pub async fn count(conn: &mut PgConnection) -> sqlx::Result<i64> {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users")
        .fetch_one(conn)
        .await
}

pub async fn insert(conn: &mut PgConnection, user: &User) -> sqlx::Result<()> {
    sqlx::query(
        r#"
        INSERT INTO users (id, email, hashed_password, is_active, is_superuser, full_name,
                           created_at, updated_at, created_by, updated_by)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
        "#,
    )
    .bind(user.id)
    .bind(&user.email)
    .bind(&user.hashed_password)
    .bind(user.is_active)
    .bind(user.is_superuser)
    .bind(&user.full_name)
    .bind(user.audit.created_at)
    .bind(user.audit.updated_at)
    .bind(user.audit.created_by)
    .bind(user.audit.updated_by)
    .execute(conn)
    .await?;
    Ok(())
}

/// Rewrites every mutable column; `id`, `created_at` and `created_by` never change.
pub async fn update(conn: &mut PgConnection, user: &User) -> sqlx::Result<()> {
    sqlx::query(
        r#"
        UPDATE users
           SET email = $2, hashed_password = $3, is_active = $4, is_superuser = $5,
               full_name = $6, updated_at = $7, updated_by = $8
         WHERE id = $1
        "#,
    )
    .bind(user.id)
    .bind(&user.email)
    .bind(&user.hashed_password)
    .bind(user.is_active)
    .bind(user.is_superuser)
    .bind(&user.full_name)
    .bind(user.audit.updated_at)
    .bind(user.audit.updated_by)
    .execute(conn)
    .await?;
    Ok(())
}

pub async fn delete(conn: &mut PgConnection, id: Uuid) -> sqlx::Result<bool> {
    let res = sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(id)
        .execute(conn)
        .await?;
    Ok(res.rows_affected() > 0)
}
