//! Member management: registration, login, profile edits.

use chrono::NaiveDateTime;
use sqlx::SqlitePool;
use thiserror::Error;

use beanhouse_core::{ApiKey, Email};

use crate::db::members::{MemberChanges, NewMember};
use crate::db::{MemberRepository, RepositoryError};
use crate::models::Member;

/// Errors from member workflows.
#[derive(Debug, Error)]
pub enum MemberError {
    /// The email is already registered.
    #[error("email already registered")]
    EmailTaken,

    /// Unknown email or wrong password.
    #[error("invalid email or password")]
    InvalidCredentials,

    /// The API key resolves to no member.
    #[error("invalid API key")]
    InvalidApiKey,

    /// Repository failure.
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Member management service.
pub struct MemberService<'a> {
    members: MemberRepository<'a>,
}

impl<'a> MemberService<'a> {
    /// Create a new member service.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self {
            members: MemberRepository::new(pool),
        }
    }

    /// Register a new member and issue an API key.
    ///
    /// # Errors
    ///
    /// Returns [`MemberError::EmailTaken`] if the email is registered.
    pub async fn join(
        &self,
        new_member: &NewMember<'_>,
        now: NaiveDateTime,
    ) -> Result<Member, MemberError> {
        let api_key = ApiKey::generate();
        self.members
            .create(new_member, &api_key, now)
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => MemberError::EmailTaken,
                other => MemberError::Repository(other),
            })
    }

    /// Log a member in with email and password.
    ///
    /// Passwords are compared as stored; credential hashing is an
    /// external auth concern.
    ///
    /// # Errors
    ///
    /// Returns [`MemberError::InvalidCredentials`] on unknown email or
    /// password mismatch.
    pub async fn login(&self, email: &Email, password: &str) -> Result<Member, MemberError> {
        let member = self
            .members
            .find_by_email(email)
            .await?
            .ok_or(MemberError::InvalidCredentials)?;

        if member.password != password {
            return Err(MemberError::InvalidCredentials);
        }
        Ok(member)
    }

    /// Resolve the member behind an API key.
    ///
    /// # Errors
    ///
    /// Returns [`MemberError::InvalidApiKey`] if the key is unknown.
    pub async fn resolve(&self, api_key: &ApiKey) -> Result<Member, MemberError> {
        self.members
            .find_by_api_key(api_key)
            .await?
            .ok_or(MemberError::InvalidApiKey)
    }

    /// Apply a partial profile update for the member behind `api_key`.
    ///
    /// # Errors
    ///
    /// Returns [`MemberError::InvalidApiKey`] if the key is unknown.
    pub async fn update_profile(
        &self,
        api_key: &ApiKey,
        changes: &MemberChanges,
        now: NaiveDateTime,
    ) -> Result<Member, MemberError> {
        let member = self.resolve(api_key).await?;
        Ok(self.members.update(member.id, changes, now).await?)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::db::test_pool;
    use beanhouse_core::PostalCode;
    use chrono::NaiveDate;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 3, 10)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap()
    }

    async fn join(service: &MemberService<'_>, email: &str) -> Member {
        let email = Email::parse(email).unwrap();
        let postal = PostalCode::parse("04524").unwrap();
        service
            .join(
                &NewMember {
                    email: &email,
                    password: "1234",
                    nickname: "tester",
                    address: "Seoul",
                    postal_code: &postal,
                },
                now(),
            )
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn join_then_login_and_resolve() {
        let pool = test_pool().await;
        let service = MemberService::new(&pool);
        let member = join(&service, "a@b.com").await;

        let logged_in = service
            .login(&Email::parse("a@b.com").unwrap(), "1234")
            .await
            .unwrap();
        assert_eq!(logged_in.id, member.id);

        let resolved = service.resolve(&member.api_key).await.unwrap();
        assert_eq!(resolved.id, member.id);
    }

    #[tokio::test]
    async fn duplicate_join_is_email_taken() {
        let pool = test_pool().await;
        let service = MemberService::new(&pool);
        join(&service, "a@b.com").await;

        let email = Email::parse("a@b.com").unwrap();
        let postal = PostalCode::parse("04524").unwrap();
        let err = service
            .join(
                &NewMember {
                    email: &email,
                    password: "xx",
                    nickname: "again",
                    address: "Busan",
                    postal_code: &postal,
                },
                now(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, MemberError::EmailTaken));
    }

    #[tokio::test]
    async fn wrong_password_is_invalid_credentials() {
        let pool = test_pool().await;
        let service = MemberService::new(&pool);
        join(&service, "a@b.com").await;

        let err = service
            .login(&Email::parse("a@b.com").unwrap(), "nope")
            .await
            .unwrap_err();
        assert!(matches!(err, MemberError::InvalidCredentials));
    }

    #[tokio::test]
    async fn update_profile_via_key() {
        let pool = test_pool().await;
        let service = MemberService::new(&pool);
        let member = join(&service, "a@b.com").await;

        let changes = MemberChanges {
            address: Some("Busan".to_owned()),
            ..MemberChanges::default()
        };
        let updated = service
            .update_profile(&member.api_key, &changes, now())
            .await
            .unwrap();
        assert_eq!(updated.address, "Busan");
        assert_eq!(updated.nickname, "tester");
    }
}
