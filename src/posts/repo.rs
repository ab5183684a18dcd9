use sqlx::PgConnection;
use uuid::Uuid;

use crate::posts::repo_types::Post;

const COLUMNS: &str = "id, title, slug, content, image, thumbnail_url, is_published, is_featured, \
                       category_id, published_at, tags, \
                       created_at, updated_at, created_by, updated_by";

pub async fn find_by_id(conn: &mut PgConnection, id: Uuid) -> sqlx::Result<Option<Post>> {
    sqlx::query_as::<_, Post>(&format!("SELECT {COLUMNS} FROM posts WHERE id = $1"))
        .bind(id)
        .fetch_optional(conn)
        .await
}

pub async fn find_by_slug(conn: &mut PgConnection, slug: &str) -> sqlx::Result<Option<Post>> {
    sqlx::query_as::<_, Post>(&format!("SELECT {COLUMNS} FROM posts WHERE slug = $1"))
        .bind(slug)
        .fetch_optional(conn)
        .await
}

pub async fn list(conn: &mut PgConnection, limit: i64, offset: i64) -> sqlx::Result<Vec<Post>> {
    sqlx::query_as::<_, Post>(&format!(
        r#"
        SELECT {COLUMNS}
        FROM posts
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
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM posts")
        .fetch_one(conn)
        .await
}

pub async fn insert(conn: &mut PgConnection, post: &Post) -> sqlx::Result<()> {
    sqlx::query(
        r#"
        INSERT INTO posts (id, title, slug, content, image, thumbnail_url, is_published,
                           is_featured, category_id, published_at, tags,
                           created_at, updated_at, created_by, updated_by)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
        "#,
    )
    .bind(post.id)
    .bind(&post.title)
    .bind(&post.slug)
    .bind(&post.content)
    .bind(&post.image)
    .bind(&post.thumbnail_url)
    .bind(post.is_published)
    .bind(post.is_featured)
    .bind(post.category_id)
    .bind(post.published_at)
    .bind(&post.tags)
    .bind(post.audit.created_at)
    .bind(post.audit.updated_at)
    .bind(post.audit.created_by)
    .bind(post.audit.updated_by)
    .execute(conn)
    .await?;
    Ok(())
}

pub async fn update(conn: &mut PgConnection, post: &Post) -> sqlx::Result<()> {
    sqlx::query(
        r#"
        UPDATE posts
           SET title = $2, slug = $3, content = $4, image = $5, thumbnail_url = $6,
               is_published = $7, is_featured = $8, category_id = $9, published_at = $10,
               tags = $11, updated_at = $12, updated_by = $13
         WHERE id = $1
        "#,
    )
    .bind(post.id)
    .bind(&post.title)
    .bind(&post.slug)
    .bind(&post.content)
    .bind(&post.image)
    .bind(&post.thumbnail_url)
    .bind(post.is_published)
    .bind(post.is_featured)
    .bind(post.category_id)
    .bind(post.published_at)
    .bind(&post.tags)
    .bind(post.audit.updated_at)
    .bind(post.audit.updated_by)
    .execute(conn)
    .await?;
    Ok(())
}

pub async fn delete(conn: &mut PgConnection, id: Uuid) -> sqlx::Result<bool> {
    let res = sqlx::query("DELETE FROM posts WHERE id = $1")
        .bind(id)
        .execute(conn)
        .await?;
    Ok(res.rows_affected() > 0)
}
