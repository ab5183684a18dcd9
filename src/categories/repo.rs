use sqlx::PgConnection;
use uuid::Uuid;

use crate::categories::repo_types::Category;

const COLUMNS: &str =
    "id, name, slug, description, image, created_at, updated_at, created_by, updated_by";

pub async fn find_by_id(conn: &mut PgConnection, id: Uuid) -> sqlx::Result<Option<Category>> {
    sqlx::query_as::<_, Category>(&format!("SELECT {COLUMNS} FROM categories WHERE id = $1"))
        .bind(id)
        .fetch_optional(conn)
        .await
}

pub async fn find_by_slug(conn: &mut PgConnection, slug: &str) -> sqlx::Result<Option<Category>> {
    sqlx::query_as::<_, Category>(&format!("SELECT {COLUMNS} FROM categories WHERE slug = $1"))
        .bind(slug)
        .fetch_optional(conn)
        .await
}

pub async fn list(conn: &mut PgConnection, limit: i64, offset: i64) -> sqlx::Result<Vec<Category>> {
    sqlx::query_as::<_, Category>(&format!(
        r#"
        SELECT {COLUMNS}
        FROM categories
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
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM categories")
        .fetch_one(conn)
        .await
}

pub async fn insert(conn: &mut PgConnection, category: &Category) -> sqlx::Result<()> {
    sqlx::query(
        r#"
        INSERT INTO categories (id, name, slug, description, image,
                                created_at, updated_at, created_by, updated_by)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        "#,
    )
    .bind(category.id)
    .bind(&category.name)
    .bind(&category.slug)
    .bind(&category.description)
    .bind(&category.image)
    .bind(category.audit.created_at)
    .bind(category.audit.updated_at)
    .bind(category.audit.created_by)
    .bind(category.audit.updated_by)
    .execute(conn)
    .await?;
    Ok(())
}

pub async fn update(conn: &mut PgConnection, category: &Category) -> sqlx::Result<()> {
    sqlx::query(
        r#"
        UPDATE categories
           SET name = $2, slug = $3, description = $4, image = $5,
               updated_at = $6, updated_by = $7
         WHERE id = $1
        "#,
    )
    .bind(category.id)
    .bind(&category.name)
    .bind(&category.slug)
    .bind(&category.description)
    .bind(&category.image)
    .bind(category.audit.updated_at)
    .bind(category.audit.updated_by)
    .execute(conn)
    .await?;
    Ok(())
}

/// `posts.category_id` is `ON DELETE SET NULL`, so dependents survive.
pub async fn delete(conn: &mut PgConnection, id: Uuid) -> sqlx::Result<bool> {
    let res = sqlx::query("DELETE FROM categories WHERE id = $1")
        .bind(id)
        .execute(conn)
        .await?;
    Ok(res.rows_affected() > 0)
}
