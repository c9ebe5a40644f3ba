//! Typed domain entities and their delimited wire form.

use std::{fmt, ops::Deref, str::FromStr};

use crate::error::{RentalError, RentalResult};

mod car;
mod customer;
mod status;
mod user;

pub use car::Car;
pub use customer::Customer;
pub use status::CarStatus;
pub use user::User;

/// Separator between fields of a stored record line.
pub const DELIMITER: char = '#';

/// Ordered string fields of a single record; the storage format of every entity.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Properties(Vec<String>);

impl Properties {
    /// Wrap an ordered list of fields.
    pub fn new(fields: Vec<String>) -> Self {
        Self(fields)
    }

    /// Split a stored line on [`DELIMITER`].
    pub fn parse_line(line: &str) -> Self {
        Self(line.split(DELIMITER).map(str::to_string).collect())
    }

    /// Join the fields back into a stored line (without the trailing newline).
    pub fn to_line(&self) -> String {
        let mut line = String::new();
        for (index, field) in self.0.iter().enumerate() {
            if index > 0 {
                line.push(DELIMITER);
            }
            line.push_str(field);
        }
        line
    }

    /// True when any field equals `token` exactly.
    pub fn contains_token(&self, token: &str) -> bool {
        self.0.iter().any(|field| field == token)
    }

    /// Return the first field that cannot be stored on a single delimited line.
    pub fn unstorable_field(&self) -> Option<&str> {
        self.0
            .iter()
            .find(|field| field.contains(DELIMITER) || field.contains(['\n', '\r']))
            .map(String::as_str)
    }

    /// Consume the wrapper and return the raw fields.
    pub fn into_inner(self) -> Vec<String> {
        self.0
    }
}

impl Deref for Properties {
    type Target = [String];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<Vec<String>> for Properties {
    fn from(fields: Vec<String>) -> Self {
        Self(fields)
    }
}

impl<const N: usize> From<[&str; N]> for Properties {
    fn from(fields: [&str; N]) -> Self {
        Self(fields.iter().map(|field| field.to_string()).collect())
    }
}

impl FromIterator<String> for Properties {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl fmt::Display for Properties {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_line())
    }
}

/// Conversion between a typed entity and its [`Properties`].
pub trait Record: Sized {
    /// Lowercase entity name used in error messages.
    const KIND: &'static str;
    /// Exact number of fields a stored record carries.
    const ARITY: usize;
    /// Position of the lookup key among the fields.
    const KEY_INDEX: usize;

    /// Build the entity, failing with `InvalidRecord` on a shape mismatch.
    fn from_properties(props: &Properties) -> RentalResult<Self>;

    /// Inverse of [`Record::from_properties`].
    fn to_properties(&self) -> Properties;

    /// Field used to look the record up.
    fn key(&self) -> &str;
}

pub(crate) fn check_arity<R: Record>(props: &Properties) -> RentalResult<()> {
    if props.len() != R::ARITY {
        return Err(RentalError::invalid(
            R::KIND,
            format!("expected {} fields, found {}", R::ARITY, props.len()),
        ));
    }
    Ok(())
}

/// Parse an integer field written in canonical decimal form, so that it
/// encodes back to the same text.
pub(crate) fn parse_number<R: Record, T: FromStr + ToString>(
    field: &str,
    value: &str,
) -> RentalResult<T> {
    value
        .parse::<T>()
        .ok()
        .filter(|number| number.to_string() == value)
        .ok_or_else(|| {
            RentalError::invalid(
                R::KIND,
                format!("{field} '{value}' is not a plain decimal number"),
            )
        })
}
