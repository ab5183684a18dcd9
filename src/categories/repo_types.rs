use sqlx::FromRow;
use uuid::Uuid;

use crate::audit::Audit;

#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub image: Option<String>,
    #[sqlx(flatten)]
    pub audit: Audit,
}
