//! Rental contract lifecycle: creation, overdue checks and archiving.
//!
//! A contract is a text document in the active directory whose stem is a
//! [`ContractName`]. The document body is written once and never parsed again;
//! everything the application needs later is recovered from the stem.

mod name;

use std::{
    fs::{self, OpenOptions},
    io::{ErrorKind, Write},
};

use chrono::{Local, NaiveDateTime};
use tracing::{error, info, warn};

use crate::{
    error::{RentalError, RentalResult},
    inventory::Inventory,
    models::{Car, CarStatus, Customer},
    store::{ContractDir, RecordStore},
};

pub use name::{license_plate_of, ContractName, CONTRACT_EXTENSION};

/// Result of archiving a contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveReceipt {
    /// The archived contract.
    pub name: ContractName,
    /// Whether the car was found among rented cars and returned to available.
    pub car_returned: bool,
}

/// Pricing derived from the rental window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RentalQuote {
    /// Whole hours between signing and the due date, never negative.
    pub hours: i64,
    /// `hours × cost_per_hour`, saturating at `i64::MAX`.
    pub total_price: i64,
}

impl RentalQuote {
    /// Quote renting `car` from `now` until `due`.
    pub fn compute(car: &Car, due: NaiveDateTime, now: NaiveDateTime) -> Self {
        let hours = (due - now).num_hours().max(0);
        Self {
            hours,
            total_price: hours.saturating_mul(i64::from(car.cost_per_hour)),
        }
    }
}

/// Creates, inspects and archives contracts stored under a [`RecordStore`] root.
#[derive(Debug, Clone)]
pub struct ContractManager {
    store: RecordStore,
    inventory: Inventory,
}

impl ContractManager {
    /// Build a manager sharing the given store.
    pub fn new(store: RecordStore) -> Self {
        Self {
            inventory: Inventory::new(store.clone()),
            store,
        }
    }

    /// Stems of active contracts, sorted.
    pub fn active_contracts(&self) -> Vec<String> {
        self.store.list_file_names(ContractDir::Active)
    }

    /// Stems of archived contracts, sorted.
    pub fn archived_contracts(&self) -> Vec<String> {
        self.store.list_file_names(ContractDir::Archived)
    }

    /// Read the body of a contract for display.
    pub fn read_contract(&self, dir: ContractDir, stem: &str) -> RentalResult<String> {
        let file_name = self
            .store
            .file_name_of(dir, stem)
            .ok_or_else(|| RentalError::not_found("contract", stem))?;
        let path = self.store.layout().contract_dir(dir).join(file_name);
        fs::read_to_string(&path).map_err(|err| match err.kind() {
            ErrorKind::NotFound => RentalError::not_found("contract", stem),
            _ => RentalError::unavailable(&path, err),
        })
    }

    /// Write a contract document for `customer` renting `car` until `due`.
    ///
    /// Only the document is written; moving the car is left to the caller.
    pub fn create_contract(
        &self,
        customer: &Customer,
        car: &Car,
        due: NaiveDateTime,
    ) -> RentalResult<ContractName> {
        self.create_contract_at(customer, car, due, Local::now().naive_local())
    }

    /// [`ContractManager::create_contract`] with an explicit signing time.
    pub fn create_contract_at(
        &self,
        customer: &Customer,
        car: &Car,
        due: NaiveDateTime,
        now: NaiveDateTime,
    ) -> RentalResult<ContractName> {
        let name = ContractName::new(&customer.surname, &car.license_plate, due)?;
        let dir = self.store.layout().contract_dir(ContractDir::Active);
        fs::create_dir_all(&dir).map_err(|err| RentalError::unavailable(&dir, err))?;

        let path = dir.join(name.file_name());
        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .map_err(|err| match err.kind() {
                ErrorKind::AlreadyExists => RentalError::ContractExists(name.to_string()),
                _ => RentalError::unavailable(&path, err),
            })?;

        let quote = RentalQuote::compute(car, name.due(), now);
        let body = render_contract(customer, car, &name, quote, now);
        if let Err(err) = file.write_all(body.as_bytes()).and_then(|_| file.sync_all()) {
            drop(file);
            if let Err(cleanup) = fs::remove_file(&path) {
                warn!(path = %path.display(), "failed to remove partial contract: {cleanup}");
            }
            return Err(RentalError::unavailable(&path, err));
        }

        info!(contract = %name, hours = quote.hours, price = quote.total_price, "created contract");
        Ok(name)
    }

    /// Rent an available car: write the contract, then move the car to rented.
    ///
    /// If the contract cannot be written the car stays available.
    pub fn open_rental(
        &self,
        customer: &Customer,
        plate: &str,
        due: NaiveDateTime,
    ) -> RentalResult<ContractName> {
        self.open_rental_at(customer, plate, due, Local::now().naive_local())
    }

    /// [`ContractManager::open_rental`] with an explicit signing time.
    pub fn open_rental_at(
        &self,
        customer: &Customer,
        plate: &str,
        due: NaiveDateTime,
        now: NaiveDateTime,
    ) -> RentalResult<ContractName> {
        let car = self.inventory.find_car(CarStatus::Available, plate)?;
        let name = self.create_contract_at(customer, &car, due, now)?;
        if !self
            .inventory
            .move_car(CarStatus::Available, CarStatus::Rented, plate)?
        {
            warn!(plate, contract = %name, "car vanished from available before it could be rented");
        }
        Ok(name)
    }

    /// Number of active contracts due strictly before now.
    pub fn check_overdue(&self) -> usize {
        self.check_overdue_at(Local::now().naive_local())
    }

    /// Number of active contracts due strictly before `now`.
    pub fn check_overdue_at(&self, now: NaiveDateTime) -> usize {
        self.overdue_contracts_at(now).len()
    }

    /// Active contracts due strictly before `now`; unparseable names are skipped.
    pub fn overdue_contracts_at(&self, now: NaiveDateTime) -> Vec<ContractName> {
        self.active_contracts()
            .iter()
            .filter_map(|stem| match stem.parse::<ContractName>() {
                Ok(name) => Some(name),
                Err(err) => {
                    warn!("ignoring active contract: {err}");
                    None
                }
            })
            .filter(|name| name.is_overdue_at(now))
            .collect()
    }

    /// Active contract whose stem is exactly `stem`.
    pub fn find_active(&self, stem: &str) -> RentalResult<ContractName> {
        self.resolve_active(stem).map(|(name, _)| name)
    }

    // Decoded name plus the file name actually on disk, which may be unpadded
    // or carry another extension.
    fn resolve_active(&self, stem: &str) -> RentalResult<(ContractName, String)> {
        let file_name = self
            .store
            .file_name_of(ContractDir::Active, stem)
            .ok_or_else(|| RentalError::not_found("contract", stem))?;
        Ok((stem.parse()?, file_name))
    }

    /// Close an active contract: return its car to available and archive the document.
    ///
    /// Nothing is changed when `stem` is not an active contract.
    pub fn archive_contract(&self, stem: &str) -> RentalResult<ArchiveReceipt> {
        let (name, file_name) = self.resolve_active(stem)?;
        let plate = name.license_plate();

        let car_returned = self
            .inventory
            .move_car(CarStatus::Rented, CarStatus::Available, plate)?;
        if !car_returned {
            warn!(plate, contract = %name, "archived contract's car was not among rented cars");
        }

        if let Err(err) = self
            .store
            .move_file(ContractDir::Active, ContractDir::Archived, &file_name)
        {
            if car_returned {
                if let Err(restore_err) =
                    self.inventory
                        .move_car(CarStatus::Available, CarStatus::Rented, plate)
                {
                    error!(plate, contract = %name, "failed to put car back among rented: {restore_err}");
                }
            }
            return Err(err);
        }
        info!(contract = %name, "archived contract");
        Ok(ArchiveReceipt { name, car_returned })
    }
}

fn render_contract(
    customer: &Customer,
    car: &Car,
    name: &ContractName,
    quote: RentalQuote,
    now: NaiveDateTime,
) -> String {
    let due = name.due();
    let mut body = String::new();
    body.push_str("Contract Details:\n");
    body.push_str(&format!("Customer: {}\n", customer.full_name()));
    body.push_str(&format!("Phone: {}\n", customer.phone));
    body.push_str(&format!(
        "Car: {}, License Plate: {}\n",
        car.display_name(),
        car.license_plate
    ));
    body.push_str(&format!("Due Date: {}\n", due.format("%d. %m. %Y")));
    body.push_str(&format!("Due Hours: {}\n", due.format("%H:%M")));
    body.push_str(&format!("Hours of rent: {}\n", quote.hours));
    body.push_str(&format!("Total price: {} Kc\n", quote.total_price));
    body.push('\n');
    body.push_str(&format!("Signed on: {}\n", now.format("%d. %m. %Y")));
    body.push('\n');
    body.push_str("Customer's signature: .......\n");
    body.push_str("Representative's signature: .......\n");
    body
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        models::Record,
        store::{RecordFile, StorageLayout},
    };
    use anyhow::Result;
    use chrono::{Duration, NaiveDate};
    use tempfile::{tempdir, TempDir};

    struct Fixture {
        _dir: TempDir,
        store: RecordStore,
        manager: ContractManager,
        inventory: Inventory,
    }

    fn fixture() -> Result<Fixture> {
        let dir = tempdir()?;
        let layout = StorageLayout::new(dir.path());
        layout.ensure()?;
        let store = RecordStore::new(layout);
        Ok(Fixture {
            _dir: dir,
            manager: ContractManager::new(store.clone()),
            inventory: Inventory::new(store.clone()),
            store,
        })
    }

    fn at(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, mo, d)
            .and_then(|date| date.and_hms_opt(h, mi, 0))
            .expect("valid test date")
    }

    fn smith() -> Customer {
        Customer {
            name: "John".to_string(),
            surname: "Smith".to_string(),
            email: "john@example.com".to_string(),
            phone: "+420777000111".to_string(),
            address: "High Street 5".to_string(),
        }
    }

    fn octavia(plate: &str) -> Car {
        Car {
            make: "Skoda".to_string(),
            model: "Octavia".to_string(),
            year: 2019,
            color: "Blue".to_string(),
            license_plate: plate.to_string(),
            motorization: "Diesel".to_string(),
            gearbox: "Manual".to_string(),
            seats: 5,
            cost_per_hour: 250,
        }
    }

    #[test]
    fn contract_document_carries_price() -> Result<()> {
        let f = fixture()?;
        let now = at(2025, 1, 1, 8, 30);
        let name = f
            .manager
            .create_contract_at(&smith(), &octavia("AB123CD"), at(2025, 1, 1, 13, 0), now)?;

        assert_eq!(name.to_string(), "Smith_AB123CD_2025_01_01_13_00");
        let body = f.manager.read_contract(ContractDir::Active, &name.to_string())?;
        assert!(body.contains("Customer: John Smith"));
        assert!(body.contains("Due Date: 01. 01. 2025"));
        assert!(body.contains("Due Hours: 13:00"));
        assert!(body.contains("Hours of rent: 4"));
        assert!(body.contains("Total price: 1000 Kc"));
        Ok(())
    }

    #[test]
    fn quote_truncates_and_clamps() {
        let car = octavia("AB123CD");
        let now = at(2025, 1, 1, 10, 0);
        let quote = RentalQuote::compute(&car, now + Duration::minutes(119), now);
        assert_eq!(quote.hours, 1);
        assert_eq!(quote.total_price, 250);
        let past = RentalQuote::compute(&car, now - Duration::hours(3), now);
        assert_eq!(past.hours, 0);
        assert_eq!(past.total_price, 0);
    }

    #[test]
    fn quote_saturates_for_distant_due_dates() {
        let mut car = octavia("AB123CD");
        car.cost_per_hour = u32::MAX;
        let quote = RentalQuote::compute(&car, at(200_000, 1, 1, 0, 0), at(-200_000, 1, 1, 0, 0));
        assert!(quote.hours > 0);
        assert_eq!(quote.total_price, i64::MAX);
    }

    #[test]
    fn duplicate_contract_is_refused() -> Result<()> {
        let f = fixture()?;
        let now = at(2025, 1, 1, 8, 0);
        let due = at(2025, 1, 2, 8, 0);
        f.manager.create_contract_at(&smith(), &octavia("AB123CD"), due, now)?;
        let again = f
            .manager
            .create_contract_at(&smith(), &octavia("AB123CD"), due, now);
        assert!(matches!(again, Err(RentalError::ContractExists(_))));
        Ok(())
    }

    #[test]
    fn past_due_contract_counts_as_overdue() -> Result<()> {
        let f = fixture()?;
        let now = Local::now().naive_local();
        f.manager
            .create_contract_at(&smith(), &octavia("FUT001"), now + Duration::days(2), now)?;
        let before = f.manager.check_overdue();

        f.manager
            .create_contract_at(&smith(), &octavia("OLD001"), now - Duration::hours(1), now)?;
        assert_eq!(f.manager.check_overdue(), before + 1);
        Ok(())
    }

    #[test]
    fn malformed_active_names_are_skipped() -> Result<()> {
        let f = fixture()?;
        let active = f.store.layout().contract_dir(ContractDir::Active);
        fs::write(active.join("notes.txt"), "scratch")?;
        fs::write(active.join("Smith_AB123CD_2020_01_01_10_00.txt"), "")?;

        assert_eq!(f.manager.check_overdue_at(at(2025, 1, 1, 0, 0)), 1);
        Ok(())
    }

    #[test]
    fn open_rental_moves_car_after_writing() -> Result<()> {
        let f = fixture()?;
        f.inventory.add_car(&octavia("AB123CD"), CarStatus::Available)?;

        let name = f.manager.open_rental_at(
            &smith(),
            "AB123CD",
            at(2025, 2, 1, 12, 0),
            at(2025, 1, 31, 12, 0),
        )?;
        assert_eq!(f.manager.active_contracts(), vec![name.to_string()]);
        assert_eq!(f.inventory.locate("AB123CD"), Some(CarStatus::Rented));
        Ok(())
    }

    #[test]
    fn failed_contract_leaves_car_available() -> Result<()> {
        let f = fixture()?;
        let car = octavia("AB123CD");
        f.inventory.add_car(&car, CarStatus::Available)?;
        let due = at(2025, 2, 1, 12, 0);
        let now = at(2025, 1, 31, 12, 0);
        f.manager.create_contract_at(&smith(), &car, due, now)?;

        let result = f.manager.open_rental_at(&smith(), "AB123CD", due, now);
        assert!(matches!(result, Err(RentalError::ContractExists(_))));
        assert_eq!(f.inventory.locate("AB123CD"), Some(CarStatus::Available));

        let missing = f.manager.open_rental_at(&smith(), "NOPE000", due, now);
        assert!(matches!(missing, Err(RentalError::NotFound { what: "car", .. })));
        Ok(())
    }

    #[test]
    fn archiving_returns_car_and_moves_document() -> Result<()> {
        let f = fixture()?;
        let stem = "Smith_AB123CD_2025_01_01_10_00";
        let active = f.store.layout().contract_dir(ContractDir::Active);
        fs::write(active.join(format!("{stem}.txt")), "Contract Details:\n")?;
        f.store.append(
            RecordFile::Cars(CarStatus::Rented),
            &octavia("AB123CD").to_properties(),
        )?;

        let receipt = f.manager.archive_contract(stem)?;
        assert!(receipt.car_returned);
        assert_eq!(receipt.name.license_plate(), "AB123CD");

        assert!(f.inventory.find_car(CarStatus::Available, "AB123CD").is_ok());
        assert!(f.inventory.find_car(CarStatus::Rented, "AB123CD").is_err());
        assert!(f.manager.active_contracts().is_empty());
        assert_eq!(f.manager.archived_contracts(), vec![stem.to_string()]);
        assert_eq!(
            f.manager.read_contract(ContractDir::Archived, stem)?,
            "Contract Details:\n"
        );
        Ok(())
    }

    #[test]
    fn unpadded_contract_file_is_archived_as_found() -> Result<()> {
        let f = fixture()?;
        let stem = "Smith_AB123CD_2025_1_1_10_0";
        let active = f.store.layout().contract_dir(ContractDir::Active);
        fs::write(active.join(format!("{stem}.txt")), "legacy")?;
        f.store.append(
            RecordFile::Cars(CarStatus::Rented),
            &octavia("AB123CD").to_properties(),
        )?;

        let receipt = f.manager.archive_contract(stem)?;
        assert!(receipt.car_returned);
        assert_eq!(receipt.name.due(), at(2025, 1, 1, 10, 0));
        assert!(f.manager.active_contracts().is_empty());
        assert_eq!(f.manager.archived_contracts(), vec![stem.to_string()]);
        assert_eq!(f.manager.read_contract(ContractDir::Archived, stem)?, "legacy");
        assert_eq!(f.inventory.locate("AB123CD"), Some(CarStatus::Available));
        Ok(())
    }

    #[test]
    fn unparseable_active_file_is_left_alone() -> Result<()> {
        let f = fixture()?;
        let active = f.store.layout().contract_dir(ContractDir::Active);
        fs::write(active.join("notes.txt"), "")?;

        let result = f.manager.archive_contract("notes");
        assert!(matches!(result, Err(RentalError::InvalidContractName(_))));
        assert_eq!(f.manager.active_contracts(), vec!["notes".to_string()]);
        Ok(())
    }

    #[test]
    fn unknown_contract_is_not_archived() -> Result<()> {
        let f = fixture()?;
        f.store.append(
            RecordFile::Cars(CarStatus::Rented),
            &octavia("AB123CD").to_properties(),
        )?;

        let result = f.manager.archive_contract("Smith_AB123CD_2025_01_01_10_00");
        assert!(matches!(result, Err(RentalError::NotFound { what: "contract", .. })));
        assert_eq!(f.inventory.locate("AB123CD"), Some(CarStatus::Rented));
        Ok(())
    }

    #[test]
    fn archive_without_rented_car_still_closes_contract() -> Result<()> {
        let f = fixture()?;
        let stem = "Smith_XY999ZZ_2025_01_01_10_00";
        let active = f.store.layout().contract_dir(ContractDir::Active);
        fs::write(active.join(format!("{stem}.txt")), "")?;

        let receipt = f.manager.archive_contract(stem)?;
        assert!(!receipt.car_returned);
        assert_eq!(f.manager.archived_contracts(), vec![stem.to_string()]);
        Ok(())
    }
}
