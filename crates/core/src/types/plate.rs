//! Vehicle plate number type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`PlateNumber`].
#[derive(thiserror::Error, Debug, Clone)]
pub enum PlateError {
    /// The input string is empty.
    #[error("plate cannot be empty")]
    Empty,
    /// The input string is too short or too long.
    #[error("plate must be between {min} and {max} characters")]
    BadLength {
        /// Minimum allowed length.
        min: usize,
        /// Maximum allowed length.
        max: usize,
    },
    /// The input contains characters outside A-Z, 0-9 and dashes.
    #[error("plate may only contain letters, digits and dashes")]
    InvalidCharacter,
}

/// A vehicle plate number.
///
/// Plates are stored uppercase with surrounding whitespace removed, so two
/// spellings of the same plate compare equal. Format rules are deliberately
/// loose: registration formats vary by jurisdiction, so only the character
/// set and length are checked.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct PlateNumber(String);

impl PlateNumber {
    /// Minimum plate length.
    pub const MIN_LENGTH: usize = 2;
    /// Maximum plate length.
    pub const MAX_LENGTH: usize = 12;

    /// Parse a `PlateNumber` from a string, normalizing to uppercase.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is empty, outside the length bounds,
    /// or contains characters other than ASCII letters, digits and dashes.
    pub fn parse(s: &str) -> Result<Self, PlateError> {
        let normalized = s.trim().to_ascii_uppercase();

        if normalized.is_empty() {
            return Err(PlateError::Empty);
        }

        if normalized.len() < Self::MIN_LENGTH || normalized.len() > Self::MAX_LENGTH {
            return Err(PlateError::BadLength {
                min: Self::MIN_LENGTH,
                max: Self::MAX_LENGTH,
            });
        }

        if !normalized
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-')
        {
            return Err(PlateError::InvalidCharacter);
        }

        Ok(Self(normalized))
    }

    /// Returns the plate as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the `PlateNumber` and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for PlateNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for PlateNumber {
    type Err = PlateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for PlateNumber {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// SQLx support (with postgres feature)
#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for PlateNumber {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <String as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for PlateNumber {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <String as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        Ok(Self(s))
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for PlateNumber {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <String as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_uppercases() {
        let plate = PlateNumber::parse("abc-123").unwrap();
        assert_eq!(plate.as_str(), "ABC-123");
    }

    #[test]
    fn test_parse_trims() {
        let plate = PlateNumber::parse("  xyz-987 ").unwrap();
        assert_eq!(plate.as_str(), "XYZ-987");
    }

    #[test]
    fn test_parse_empty() {
        assert!(matches!(PlateNumber::parse(""), Err(PlateError::Empty)));
        assert!(matches!(PlateNumber::parse("  "), Err(PlateError::Empty)));
    }

    #[test]
    fn test_parse_length_bounds() {
        assert!(matches!(
            PlateNumber::parse("A"),
            Err(PlateError::BadLength { .. })
        ));
        assert!(matches!(
            PlateNumber::parse("ABCDEFGHIJKLM"),
            Err(PlateError::BadLength { .. })
        ));
    }

    #[test]
    fn test_parse_invalid_characters() {
        assert!(matches!(
            PlateNumber::parse("AB 123"),
            Err(PlateError::InvalidCharacter)
        ));
        assert!(matches!(
            PlateNumber::parse("AB#123"),
            Err(PlateError::InvalidCharacter)
        ));
    }

    #[test]
    fn test_equal_after_normalization() {
        let a = PlateNumber::parse("abc-123").unwrap();
        let b = PlateNumber::parse("ABC-123").unwrap();
        assert_eq!(a, b);
    }
}
