//! Fleet categories and moves between them.

use tracing::{debug, error, info};

use crate::{
    error::{RentalError, RentalResult},
    models::{Car, CarStatus, Record},
    store::{RecordFile, RecordStore},
};

/// Reads and relocates cars across the four category files.
#[derive(Debug, Clone)]
pub struct Inventory {
    store: RecordStore,
}

impl Inventory {
    /// Wrap a record store.
    pub fn new(store: RecordStore) -> Self {
        Self { store }
    }

    /// Every valid car in `status`, in file order.
    pub fn cars(&self, status: CarStatus) -> Vec<Car> {
        self.store.read_records(RecordFile::Cars(status))
    }

    /// Look up a car by license plate within one category.
    pub fn find_car(&self, status: CarStatus, plate: &str) -> RentalResult<Car> {
        let props = self
            .store
            .find_by_key::<Car>(RecordFile::Cars(status), plate)?;
        Car::from_properties(&props)
    }

    /// Category currently holding `plate`, if any.
    pub fn locate(&self, plate: &str) -> Option<CarStatus> {
        CarStatus::ALL.into_iter().find(|status| {
            self.store
                .find_by_key::<Car>(RecordFile::Cars(*status), plate)
                .is_ok()
        })
    }

    /// Append a new car to `status`.
    pub fn add_car(&self, car: &Car, status: CarStatus) -> RentalResult<()> {
        self.store
            .append(RecordFile::Cars(status), &car.to_properties())?;
        info!(plate = %car.license_plate, status = %status, "added car");
        Ok(())
    }

    /// Move the record for `plate` from one category to another, unchanged.
    ///
    /// Returns `false` without touching either file when `plate` is not in `from`.
    pub fn move_car(&self, from: CarStatus, to: CarStatus, plate: &str) -> RentalResult<bool> {
        let source = RecordFile::Cars(from);
        let destination = RecordFile::Cars(to);

        let props = match self.store.find_by_key::<Car>(source, plate) {
            Ok(props) => props,
            Err(RentalError::NotFound { .. }) => {
                debug!(plate, from = %from, "car not in source category");
                return Ok(false);
            }
            Err(err) => return Err(err),
        };

        if !self.store.delete_by_key::<Car>(source, plate)? {
            return Ok(false);
        }

        if let Err(err) = self.store.append(destination, &props) {
            error!(plate, to = %to, "failed to append moved car, restoring source: {err}");
            if let Err(restore_err) = self.store.append(source, &props) {
                error!(plate, from = %from, "failed to restore car: {restore_err}");
            }
            return Err(err);
        }

        info!(plate, from = %from, to = %to, "moved car");
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{models::Properties, store::StorageLayout};
    use anyhow::Result;
    use tempfile::{tempdir, TempDir};

    fn inventory() -> Result<(TempDir, RecordStore, Inventory)> {
        let dir = tempdir()?;
        let layout = StorageLayout::new(dir.path());
        layout.ensure()?;
        let store = RecordStore::new(layout);
        Ok((dir, store.clone(), Inventory::new(store)))
    }

    fn car(plate: &str) -> Car {
        Car {
            make: "Toyota".to_string(),
            model: "Yaris".to_string(),
            year: 2021,
            color: "White".to_string(),
            license_plate: plate.to_string(),
            motorization: "Hybrid".to_string(),
            gearbox: "Automatic".to_string(),
            seats: 5,
            cost_per_hour: 180,
        }
    }

    #[test]
    fn move_relocates_record_unchanged() -> Result<()> {
        let (_dir, store, inventory) = inventory()?;
        inventory.add_car(&car("AAA111"), CarStatus::Available)?;
        inventory.add_car(&car("BBB222"), CarStatus::Available)?;
        store.append(
            RecordFile::Cars(CarStatus::Rented),
            &car("CCC333").to_properties(),
        )?;

        assert!(inventory.move_car(CarStatus::Available, CarStatus::Rented, "AAA111")?);

        let available = store.read_all(RecordFile::Cars(CarStatus::Available));
        let rented = store.read_all(RecordFile::Cars(CarStatus::Rented));
        assert_eq!(available, vec![car("BBB222").to_properties()]);
        assert_eq!(rented.last(), Some(&car("AAA111").to_properties()));
        assert_eq!(inventory.locate("AAA111"), Some(CarStatus::Rented));
        Ok(())
    }

    #[test]
    fn repeated_move_is_noop() -> Result<()> {
        let (_dir, store, inventory) = inventory()?;
        inventory.add_car(&car("AAA111"), CarStatus::Available)?;
        assert!(inventory.move_car(CarStatus::Available, CarStatus::Rented, "AAA111")?);

        let available = store.read_all(RecordFile::Cars(CarStatus::Available));
        let rented = store.read_all(RecordFile::Cars(CarStatus::Rented));
        assert!(!inventory.move_car(CarStatus::Available, CarStatus::Rented, "AAA111")?);
        assert_eq!(store.read_all(RecordFile::Cars(CarStatus::Available)), available);
        assert_eq!(store.read_all(RecordFile::Cars(CarStatus::Rented)), rented);
        Ok(())
    }

    #[test]
    fn move_keeps_raw_fields() -> Result<()> {
        let (_dir, store, inventory) = inventory()?;
        // Leading zero would not survive a decode/encode cycle.
        let raw = Properties::from([
            "Fiat", "Panda", "2010", "Green", "PLATE1", "Petrol", "Manual", "04", "90",
        ]);
        store.append(RecordFile::Cars(CarStatus::Serviced), &raw)?;

        assert!(inventory.move_car(CarStatus::Serviced, CarStatus::Available, "PLATE1")?);
        assert_eq!(
            store.read_all(RecordFile::Cars(CarStatus::Available)),
            vec![raw]
        );
        Ok(())
    }

    #[test]
    fn finds_and_lists_cars() -> Result<()> {
        let (_dir, _store, inventory) = inventory()?;
        inventory.add_car(&car("AAA111"), CarStatus::PermanentlyUnavailable)?;

        assert_eq!(
            inventory.find_car(CarStatus::PermanentlyUnavailable, "AAA111")?,
            car("AAA111")
        );
        assert!(inventory
            .find_car(CarStatus::Available, "AAA111")
            .map_err(|err| err.is_not_found())
            .unwrap_err());
        assert_eq!(inventory.cars(CarStatus::PermanentlyUnavailable).len(), 1);
        assert_eq!(inventory.locate("ZZZ999"), None);
        Ok(())
    }
}
