//! Currency codes and fixed-precision amounts.
//!
//! Amounts are `rust_decimal::Decimal` everywhere; they are stored as their
//! canonical text form so no precision is lost in `SQLite`.

use std::fmt;
use std::str::FromStr;

use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// An ISO-4217 currency code (three ASCII letters, stored upper-case).
///
/// # Examples
///
/// ```
/// use allot::Currency;
///
/// let eur = Currency::try_from("eur").unwrap();
/// assert_eq!(eur.as_str(), "EUR");
/// assert!(Currency::try_from("EURO").is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Currency([u8; 3]);

/// Error returned when a currency code is malformed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidCurrencyError {
    /// The rejected input.
    pub value: String,
}

impl fmt::Display for InvalidCurrencyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "'{}' is not a three-letter ISO-4217 currency code",
            self.value
        )
    }
}

impl std::error::Error for InvalidCurrencyError {}

impl Currency {
    /// Returns the code as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        // Only ASCII letters are ever stored.
        std::str::from_utf8(&self.0).unwrap_or("???")
    }
}

impl TryFrom<&str> for Currency {
    type Error = InvalidCurrencyError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let trimmed = value.trim();
        let bytes = trimmed.as_bytes();
        if bytes.len() != 3 || !bytes.iter().all(u8::is_ascii_alphabetic) {
            return Err(InvalidCurrencyError {
                value: value.to_string(),
            });
        }
        let mut code = [0u8; 3];
        for (slot, byte) in code.iter_mut().zip(bytes) {
            *slot = byte.to_ascii_uppercase();
        }
        Ok(Self(code))
    }
}

impl TryFrom<String> for Currency {
    type Error = InvalidCurrencyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::try_from(value.as_str())
    }
}

impl FromStr for Currency {
    type Err = InvalidCurrencyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::try_from(s)
    }
}

impl From<Currency> for String {
    fn from(value: Currency) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ToSql for Currency {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for Currency {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let text = value.as_str()?;
        Self::try_from(text).map_err(|e| FromSqlError::Other(Box::new(e)))
    }
}

/// Reads a decimal stored as canonical text.
pub(crate) fn decimal_from_sql(value: ValueRef<'_>) -> FromSqlResult<Decimal> {
    match value {
        ValueRef::Text(_) => {
            let text = value.as_str()?;
            Decimal::from_str(text).map_err(|e| FromSqlError::Other(Box::new(e)))
        }
        ValueRef::Integer(i) => Ok(Decimal::from(i)),
        _ => Err(FromSqlError::InvalidType),
    }
}

/// Reads a decimal column from a row.
pub(crate) fn row_decimal(row: &rusqlite::Row<'_>, idx: usize) -> rusqlite::Result<Decimal> {
    let value = row.get_ref(idx)?;
    decimal_from_sql(value).map_err(|e| match e {
        FromSqlError::InvalidType => {
            rusqlite::Error::InvalidColumnType(idx, "decimal".into(), value.data_type())
        }
        other => rusqlite::Error::FromSqlConversionFailure(idx, value.data_type(), Box::new(other)),
    })
}
