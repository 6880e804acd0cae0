//! Registered member model.

use chrono::NaiveDateTime;

use beanhouse_core::{ApiKey, Email, MemberId, PostalCode};

/// A registered member.
///
/// The password is stored as given; credential hardening is handled by an
/// external auth concern, not this backend.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Member {
    pub id: MemberId,
    pub email: Email,
    pub password: String,
    pub nickname: String,
    pub address: String,
    pub postal_code: PostalCode,
    pub api_key: ApiKey,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}
