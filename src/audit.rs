use serde::Serialize;
use sqlx::FromRow;
use time::{Duration, OffsetDateTime};
use uuid::Uuid;

/// Creation/modification metadata carried by every stored record.
///
/// Values are only ever produced by [`Audit::created`] and [`Audit::touched`];
/// request payloads have no way to set them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, FromRow)]
pub struct Audit {
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
    pub created_by: Option<Uuid>,
    pub updated_by: Option<Uuid>,
}

impl Audit {
    /// Stamp for a record about to be inserted.
    pub fn created(actor: Option<Uuid>, now: OffsetDateTime) -> Self {
        Self {
            created_at: now,
            updated_at: now,
            created_by: actor,
            updated_by: actor,
        }
    }

    /// Stamp for a record about to be re-persisted.
    ///
    /// `updated_at` always moves forward, even if the clock did not tick (or
    /// went backwards) since the previous write. Without an actor the previous
    /// `updated_by` is kept.
    pub fn touched(self, actor: Option<Uuid>, now: OffsetDateTime) -> Self {
        let floor = self.updated_at + Duration::microseconds(1);
        Self {
            updated_at: now.max(floor),
            updated_by: actor.or(self.updated_by),
            ..self
        }
    }
}

/// Current UTC time at the precision postgres keeps for `timestamptz`.
pub fn now() -> OffsetDateTime {
    truncate_micros(OffsetDateTime::now_utc())
}

/// Drops sub-microsecond digits so stored and returned values compare equal.
pub fn truncate_micros(at: OffsetDateTime) -> OffsetDateTime {
    at.replace_nanosecond(at.microsecond() * 1_000).unwrap_or(at)
}
