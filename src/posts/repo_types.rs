use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::audit::Audit;

#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct Post {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub content: String,
    pub image: Option<String>,
    pub thumbnail_url: Option<String>,
    pub is_published: bool,
    pub is_featured: bool,
    pub category_id: Option<Uuid>, // set to NULL when the category is deleted
    pub published_at: Option<OffsetDateTime>,
    pub tags: Option<Vec<String>>,
    #[sqlx(flatten)]
    pub audit: Audit,
}
