//! Postal code type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`PostalCode`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PostalCodeError {
    /// The input is not exactly five characters.
    #[error("postal code must be exactly 5 digits")]
    WrongLength,
    /// The input contains a non-digit character.
    #[error("postal code must contain only digits")]
    NonDigit,
}

/// A Korean-style five-digit postal code.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct PostalCode(String);

impl PostalCode {
    /// Parse a `PostalCode` from a string.
    ///
    /// # Errors
    ///
    /// Returns [`PostalCodeError`] unless the input is exactly five ASCII
    /// digits.
    pub fn parse(s: &str) -> Result<Self, PostalCodeError> {
        if s.len() != 5 {
            return Err(PostalCodeError::WrongLength);
        }
        if !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(PostalCodeError::NonDigit);
        }
        Ok(Self(s.to_owned()))
    }

    /// Returns the postal code as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PostalCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for PostalCode {
    type Err = PostalCodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for PostalCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// SQLx support (with sqlite feature)
#[cfg(feature = "sqlite")]
impl sqlx::Type<sqlx::Sqlite> for PostalCode {
    fn type_info() -> sqlx::sqlite::SqliteTypeInfo {
        <String as sqlx::Type<sqlx::Sqlite>>::type_info()
    }

    fn compatible(ty: &sqlx::sqlite::SqliteTypeInfo) -> bool {
        <String as sqlx::Type<sqlx::Sqlite>>::compatible(ty)
    }
}

#[cfg(feature = "sqlite")]
impl<'r> sqlx::Decode<'r, sqlx::Sqlite> for PostalCode {
    fn decode(value: sqlx::sqlite::SqliteValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <String as sqlx::Decode<'r, sqlx::Sqlite>>::decode(value)?;
        Ok(Self(s))
    }
}

#[cfg(feature = "sqlite")]
impl<'q> sqlx::Encode<'q, sqlx::Sqlite> for PostalCode {
    fn encode_by_ref(
        &self,
        buf: &mut Vec<sqlx::sqlite::SqliteArgumentValue<'q>>,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <String as sqlx::Encode<'q, sqlx::Sqlite>>::encode_by_ref(&self.0, buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_five_digits() {
        assert!(PostalCode::parse("04524").is_ok());
        assert!(PostalCode::parse("00000").is_ok());
    }

    #[test]
    fn rejects_wrong_length() {
        assert_eq!(PostalCode::parse("1234"), Err(PostalCodeError::WrongLength));
        assert_eq!(
            PostalCode::parse("123456"),
            Err(PostalCodeError::WrongLength)
        );
        assert_eq!(PostalCode::parse(""), Err(PostalCodeError::WrongLength));
    }

    #[test]
    fn rejects_non_digits() {
        assert_eq!(PostalCode::parse("12a45"), Err(PostalCodeError::NonDigit));
        assert_eq!(PostalCode::parse("1234 "), Err(PostalCodeError::NonDigit));
    }
}
