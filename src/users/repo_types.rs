use sqlx::FromRow;
use uuid::Uuid;

use crate::audit::Audit;

/// User record in the database.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,           // trimmed, lowercased
    pub hashed_password: String, // argon2 PHC string, never serialized
    pub is_active: bool,
    pub is_superuser: bool,
    pub full_name: Option<String>,
    #[sqlx(flatten)]
    pub audit: Audit,
}
