//! Contract file names double as structured keys:
//! `surname_licensePlate_YYYY_MM_DD_HH_MM`.

use std::{fmt, str::FromStr};

use chrono::{NaiveDate, NaiveDateTime, Timelike};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{RentalError, RentalResult};

/// File extension of contract documents.
pub const CONTRACT_EXTENSION: &str = "txt";

const SEPARATOR: char = '_';

static NAME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([^_]+)_([^_]+)_(\d{4})_(\d{1,2})_(\d{1,2})_(\d{1,2})_(\d{1,2})$")
        .expect("invalid contract name regex")
});

/// Decoded form of a contract file stem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractName {
    surname: String,
    license_plate: String,
    due: NaiveDateTime,
}

impl ContractName {
    /// Build a name, rejecting components that would make the stem ambiguous.
    pub fn new(
        surname: impl Into<String>,
        license_plate: impl Into<String>,
        due: NaiveDateTime,
    ) -> RentalResult<Self> {
        let surname = surname.into();
        let license_plate = license_plate.into();
        for (label, value) in [("surname", &surname), ("license plate", &license_plate)] {
            if value.is_empty() || value.contains(SEPARATOR) || value.contains(['/', '\\']) {
                return Err(RentalError::invalid(
                    "contract",
                    format!("{label} '{value}' cannot be used in a contract name"),
                ));
            }
        }
        // Minutes are the finest unit the name keeps.
        let due = due
            .with_second(0)
            .and_then(|value| value.with_nanosecond(0))
            .unwrap_or(due);
        Ok(Self {
            surname,
            license_plate,
            due,
        })
    }

    /// Customer surname.
    pub fn surname(&self) -> &str {
        &self.surname
    }

    /// License plate of the rented car.
    pub fn license_plate(&self) -> &str {
        &self.license_plate
    }

    /// Local due date and time.
    pub fn due(&self) -> NaiveDateTime {
        self.due
    }

    /// Stem plus extension.
    pub fn file_name(&self) -> String {
        format!("{self}.{CONTRACT_EXTENSION}")
    }

    /// Whether the contract is past due at `now`.
    pub fn is_overdue_at(&self, now: NaiveDateTime) -> bool {
        self.due < now
    }
}

impl fmt::Display for ContractName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{SEPARATOR}{}{SEPARATOR}{}",
            self.surname,
            self.license_plate,
            self.due.format("%Y_%m_%d_%H_%M")
        )
    }
}

impl FromStr for ContractName {
    type Err = RentalError;

    fn from_str(stem: &str) -> Result<Self, Self::Err> {
        let invalid = || RentalError::InvalidContractName(stem.to_string());
        let caps = NAME_RE.captures(stem).ok_or_else(invalid)?;
        let number = |index: usize| -> Result<u32, RentalError> {
            caps.get(index)
                .and_then(|m| m.as_str().parse::<u32>().ok())
                .ok_or_else(invalid)
        };
        let year = number(3)? as i32;
        let due = NaiveDate::from_ymd_opt(year, number(4)?, number(5)?)
            .and_then(|date| date.and_hms_opt(number(6).ok()?, number(7).ok()?, 0))
            .ok_or_else(invalid)?;
        Ok(Self {
            surname: caps[1].to_string(),
            license_plate: caps[2].to_string(),
            due,
        })
    }
}

/// Extract the license plate (second segment) from a contract stem.
pub fn license_plate_of(stem: &str) -> RentalResult<String> {
    stem.parse::<ContractName>().map(|name| name.license_plate)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn due(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, mo, d)
            .and_then(|date| date.and_hms_opt(h, mi, 0))
            .expect("valid test date")
    }

    #[test]
    fn encodes_with_zero_padding() -> anyhow::Result<()> {
        let name = ContractName::new("Smith", "AB123CD", due(2025, 1, 1, 9, 5))?;
        assert_eq!(name.to_string(), "Smith_AB123CD_2025_01_01_09_05");
        assert_eq!(name.file_name(), "Smith_AB123CD_2025_01_01_09_05.txt");
        Ok(())
    }

    #[test]
    fn decodes_what_it_encodes() -> anyhow::Result<()> {
        let name = ContractName::new("Novak", "1A23456", due(2026, 12, 31, 23, 59))?;
        let parsed: ContractName = name.to_string().parse()?;
        assert_eq!(parsed, name);
        assert_eq!(parsed.license_plate(), "1A23456");
        assert_eq!(parsed.surname(), "Novak");
        Ok(())
    }

    #[test]
    fn drops_seconds() -> anyhow::Result<()> {
        let with_seconds = due(2025, 3, 4, 5, 6) + chrono::Duration::seconds(42);
        let name = ContractName::new("Smith", "AB123CD", with_seconds)?;
        assert_eq!(name.due(), due(2025, 3, 4, 5, 6));
        Ok(())
    }

    #[test]
    fn rejects_malformed_stems() {
        for stem in [
            "Smith_AB123CD",
            "Smith_AB123CD_2025_01_01_10",
            "Smith_AB_123CD_2025_01_01_10_00",
            "Smith_AB123CD_2025_13_01_10_00",
            "Smith_AB123CD_2025_02_30_10_00",
            "Smith_AB123CD_2025_01_01_24_00",
            "",
        ] {
            assert!(
                matches!(stem.parse::<ContractName>(), Err(RentalError::InvalidContractName(_))),
                "{stem} should be rejected"
            );
        }
    }

    #[test]
    fn rejects_ambiguous_components() {
        let when = due(2025, 1, 1, 10, 0);
        assert!(ContractName::new("Van_Dyke", "AB123CD", when).is_err());
        assert!(ContractName::new("Smith", "AB_123", when).is_err());
        assert!(ContractName::new("", "AB123CD", when).is_err());
        assert!(ContractName::new("Smith", "../x", when).is_err());
    }

    #[test]
    fn plate_is_second_segment() -> anyhow::Result<()> {
        assert_eq!(license_plate_of("Smith_AB123CD_2025_01_01_10_00")?, "AB123CD");
        Ok(())
    }

    #[test]
    fn overdue_is_strict() -> anyhow::Result<()> {
        let name = ContractName::new("Smith", "AB123CD", due(2025, 1, 1, 10, 0))?;
        assert!(!name.is_overdue_at(due(2025, 1, 1, 10, 0)));
        assert!(name.is_overdue_at(due(2025, 1, 1, 10, 1)));
        Ok(())
    }
}
