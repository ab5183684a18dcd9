use serde::{Deserialize, Deserializer, Serialize};
use time::OffsetDateTime;

/// `?skip=&limit=` query parameters shared by every list endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct Pagination {
    #[serde(default)]
    pub skip: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_limit() -> i64 {
    100
}

impl Pagination {
    pub const MAX_LIMIT: i64 = 1000;

    pub fn new(skip: i64, limit: i64) -> Self {
        Self { skip, limit }
    }

    /// Negative offsets become 0; `limit` is clamped to `0..=MAX_LIMIT`.
    pub fn normalize(self) -> Self {
        Self {
            skip: self.skip.max(0),
            limit: self.limit.clamp(0, Self::MAX_LIMIT),
        }
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            skip: 0,
            limit: default_limit(),
        }
    }
}

/// One page of records plus the unpaged total.
#[derive(Debug, Serialize)]
pub struct ListResponse<T> {
    pub data: Vec<T>,
    pub count: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Message {
    pub message: String,
}

impl Message {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Distinguishes an absent field (`None`) from an explicit `null` (`Some(None)`).
/// Use together with `#[serde(default)]`.
pub fn nullable<'de, D, T>(de: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(de).map(Some)
}

/// [`nullable`] for RFC 3339 timestamps.
pub fn nullable_datetime<'de, D>(de: D) -> Result<Option<Option<OffsetDateTime>>, D::Error>
where
    D: Deserializer<'de>,
{
    time::serde::rfc3339::option::deserialize(de).map(Some)
}
