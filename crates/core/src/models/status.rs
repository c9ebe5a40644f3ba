use std::fmt;

/// Category file a car currently lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CarStatus {
    /// Ready to be rented.
    Available,
    /// Attached to an active contract.
    Rented,
    /// In the repair shop.
    Serviced,
    /// Retired from the fleet.
    PermanentlyUnavailable,
}

struct StatusEntry {
    file_name: &'static str,
    label: &'static str,
}

// Indexed by discriminant.
const STATUS_TABLE: [StatusEntry; 4] = [
    StatusEntry {
        file_name: "available.txt",
        label: "Available cars",
    },
    StatusEntry {
        file_name: "rented.txt",
        label: "Rented cars",
    },
    StatusEntry {
        file_name: "repair_shop.txt",
        label: "Cars in service",
    },
    StatusEntry {
        file_name: "permanently_unavailable.txt",
        label: "Permanently unavailable cars",
    },
];

impl CarStatus {
    /// Every category in menu order.
    pub const ALL: [CarStatus; 4] = [
        CarStatus::Available,
        CarStatus::Rented,
        CarStatus::Serviced,
        CarStatus::PermanentlyUnavailable,
    ];

    fn entry(self) -> &'static StatusEntry {
        &STATUS_TABLE[self as usize]
    }

    /// File name inside the `Cars` directory.
    pub fn file_name(self) -> &'static str {
        self.entry().file_name
    }

    /// Menu label.
    pub fn label(self) -> &'static str {
        self.entry().label
    }

    /// Map a 1-based menu choice to a category.
    pub fn from_choice(choice: usize) -> Option<Self> {
        choice
            .checked_sub(1)
            .and_then(|index| Self::ALL.get(index).copied())
    }
}

impl fmt::Display for CarStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_matches_storage_layout() {
        assert_eq!(CarStatus::Available.file_name(), "available.txt");
        assert_eq!(CarStatus::Rented.file_name(), "rented.txt");
        assert_eq!(CarStatus::Serviced.file_name(), "repair_shop.txt");
        assert_eq!(
            CarStatus::PermanentlyUnavailable.file_name(),
            "permanently_unavailable.txt"
        );
    }

    #[test]
    fn menu_choices_are_one_based() {
        assert_eq!(CarStatus::from_choice(0), None);
        assert_eq!(CarStatus::from_choice(1), Some(CarStatus::Available));
        assert_eq!(CarStatus::from_choice(4), Some(CarStatus::PermanentlyUnavailable));
        assert_eq!(CarStatus::from_choice(5), None);
    }
}
