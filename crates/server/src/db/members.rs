//! Member repository.

use chrono::NaiveDateTime;
use sqlx::SqlitePool;

use beanhouse_core::{ApiKey, Email, MemberId, PostalCode};

use super::{RepositoryError, conflict_on_unique};
use crate::models::Member;

const MEMBER_COLUMNS: &str =
    "id, email, password, nickname, address, postal_code, api_key, created_at, updated_at";

/// Fields for a new member registration.
#[derive(Debug)]
pub struct NewMember<'a> {
    pub email: &'a Email,
    pub password: &'a str,
    pub nickname: &'a str,
    pub address: &'a str,
    pub postal_code: &'a PostalCode,
}

/// Partial profile update; `None` fields are left untouched.
#[derive(Debug, Default)]
pub struct MemberChanges {
    pub password: Option<String>,
    pub nickname: Option<String>,
    pub address: Option<String>,
    pub postal_code: Option<PostalCode>,
}

/// Repository for member database operations.
pub struct MemberRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> MemberRepository<'a> {
    /// Create a new member repository.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Look up a member by email.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn find_by_email(&self, email: &Email) -> Result<Option<Member>, RepositoryError> {
        let sql = format!("SELECT {MEMBER_COLUMNS} FROM member WHERE email = ?1");
        let member = sqlx::query_as::<_, Member>(&sql)
            .bind(email.as_str())
            .fetch_optional(self.pool)
            .await?;
        Ok(member)
    }

    /// Look up a member by API key.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn find_by_api_key(&self, key: &ApiKey) -> Result<Option<Member>, RepositoryError> {
        let sql = format!("SELECT {MEMBER_COLUMNS} FROM member WHERE api_key = ?1");
        let member = sqlx::query_as::<_, Member>(&sql)
            .bind(key.as_str())
            .fetch_optional(self.pool)
            .await?;
        Ok(member)
    }

    /// Register a new member with a freshly issued API key.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email is already
    /// registered, `RepositoryError::Database` for other failures.
    pub async fn create(
        &self,
        new_member: &NewMember<'_>,
        api_key: &ApiKey,
        now: NaiveDateTime,
    ) -> Result<Member, RepositoryError> {
        let sql = format!(
            "INSERT INTO member (email, password, nickname, address, postal_code, api_key, created_at, updated_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7) \
             RETURNING {MEMBER_COLUMNS}"
        );
        sqlx::query_as::<_, Member>(&sql)
            .bind(new_member.email.as_str())
            .bind(new_member.password)
            .bind(new_member.nickname)
            .bind(new_member.address)
            .bind(new_member.postal_code.as_str())
            .bind(api_key.as_str())
            .bind(now)
            .fetch_one(self.pool)
            .await
            .map_err(|e| conflict_on_unique(e, "email already registered"))
    }

    /// Apply a partial profile update and return the updated member.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the member does not exist,
    /// `RepositoryError::Database` for other failures.
    pub async fn update(
        &self,
        id: MemberId,
        changes: &MemberChanges,
        now: NaiveDateTime,
    ) -> Result<Member, RepositoryError> {
        let sql = format!(
            "UPDATE member SET \
                password = COALESCE(?1, password), \
                nickname = COALESCE(?2, nickname), \
                address = COALESCE(?3, address), \
                postal_code = COALESCE(?4, postal_code), \
                updated_at = ?5 \
             WHERE id = ?6 \
             RETURNING {MEMBER_COLUMNS}"
        );
        sqlx::query_as::<_, Member>(&sql)
            .bind(changes.password.as_deref())
            .bind(changes.nickname.as_deref())
            .bind(changes.address.as_deref())
            .bind(changes.postal_code.as_ref().map(PostalCode::as_str))
            .bind(now)
            .bind(id)
            .fetch_optional(self.pool)
            .await?
            .ok_or(RepositoryError::NotFound)
    }

    /// Number of registered members.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count(&self) -> Result<i64, RepositoryError> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM member")
            .fetch_one(self.pool)
            .await?;
        Ok(count)
    }
}
