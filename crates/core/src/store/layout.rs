//! Mapping from logical record files to paths under the storage root.

use std::{
    fs::{self, OpenOptions},
    path::{Path, PathBuf},
};

use tracing::info;

use crate::{
    error::{RentalError, RentalResult},
    models::CarStatus,
};

const CARS_DIR: &str = "Cars";
const CUSTOMERS_FILE: &str = "Customers/customers.txt";
const USERS_FILE: &str = "Users/users.txt";
const ACTIVE_CONTRACTS_DIR: &str = "Customers/Contracts/Active";
const ARCHIVED_CONTRACTS_DIR: &str = "Customers/Contracts/Archived";

/// A delimited record file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordFile {
    /// One of the four car category files.
    Cars(CarStatus),
    /// The customer list.
    Customers,
    /// Operator accounts.
    Users,
}

impl RecordFile {
    /// Every record file the application expects to exist.
    pub fn all() -> impl Iterator<Item = RecordFile> {
        CarStatus::ALL
            .into_iter()
            .map(RecordFile::Cars)
            .chain([RecordFile::Customers, RecordFile::Users])
    }

    /// Path relative to the storage root.
    pub fn relative_path(self) -> PathBuf {
        match self {
            RecordFile::Cars(status) => Path::new(CARS_DIR).join(status.file_name()),
            RecordFile::Customers => PathBuf::from(CUSTOMERS_FILE),
            RecordFile::Users => PathBuf::from(USERS_FILE),
        }
    }

    /// Kind of entity stored in the file.
    pub fn record_kind(self) -> &'static str {
        match self {
            RecordFile::Cars(_) => "car",
            RecordFile::Customers => "customer",
            RecordFile::Users => "user",
        }
    }
}

/// Directory holding contract files.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContractDir {
    /// Contracts whose car is still rented.
    Active,
    /// Closed contracts.
    Archived,
}

impl ContractDir {
    /// Path relative to the storage root.
    pub fn relative_path(self) -> &'static Path {
        match self {
            ContractDir::Active => Path::new(ACTIVE_CONTRACTS_DIR),
            ContractDir::Archived => Path::new(ARCHIVED_CONTRACTS_DIR),
        }
    }
}

/// Root directory of the flat-file store.
#[derive(Debug, Clone)]
pub struct StorageLayout {
    root: PathBuf,
}

impl StorageLayout {
    /// Create a layout rooted at `root`. Nothing is touched on disk.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Storage root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Absolute path of a record file.
    pub fn record_path(&self, file: RecordFile) -> PathBuf {
        self.root.join(file.relative_path())
    }

    /// Absolute path of a contract directory.
    pub fn contract_dir(&self, dir: ContractDir) -> PathBuf {
        self.root.join(dir.relative_path())
    }

    /// Create missing directories and empty record files.
    pub fn ensure(&self) -> RentalResult<()> {
        for dir in [ContractDir::Active, ContractDir::Archived] {
            let path = self.contract_dir(dir);
            fs::create_dir_all(&path).map_err(|err| RentalError::unavailable(&path, err))?;
        }

        for file in RecordFile::all() {
            let path = self.record_path(file);
            if path.is_file() {
                continue;
            }
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).map_err(|err| RentalError::unavailable(parent, err))?;
            }
            OpenOptions::new()
                .create(true)
                .append(true)
                .open(&path)
                .map_err(|err| RentalError::unavailable(&path, err))?;
            info!(path = %path.display(), "created empty record file");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn ensure_creates_full_tree() -> anyhow::Result<()> {
        let dir = tempdir()?;
        let layout = StorageLayout::new(dir.path());
        layout.ensure()?;

        for name in [
            "Cars/available.txt",
            "Cars/rented.txt",
            "Cars/repair_shop.txt",
            "Cars/permanently_unavailable.txt",
            "Customers/customers.txt",
            "Users/users.txt",
        ] {
            assert!(dir.path().join(name).is_file(), "{name} missing");
        }
        assert!(dir.path().join("Customers/Contracts/Active").is_dir());
        assert!(dir.path().join("Customers/Contracts/Archived").is_dir());
        Ok(())
    }

    #[test]
    fn ensure_keeps_existing_content() -> anyhow::Result<()> {
        let dir = tempdir()?;
        let layout = StorageLayout::new(dir.path());
        layout.ensure()?;
        let users = layout.record_path(RecordFile::Users);
        fs::write(&users, "root#pw#1\n")?;

        layout.ensure()?;
        assert_eq!(fs::read_to_string(users)?, "root#pw#1\n");
        Ok(())
    }
}
