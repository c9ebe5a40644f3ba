use super::{check_arity, parse_number, Properties, Record};
use crate::error::RentalResult;

/// A fleet vehicle as stored in one of the category files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Car {
    /// Manufacturer.
    pub make: String,
    /// Model name.
    pub model: String,
    /// Year of manufacture.
    pub year: i32,
    /// Body colour.
    pub color: String,
    /// License plate, the unique key of a car.
    pub license_plate: String,
    /// Engine type.
    pub motorization: String,
    /// Gearbox type.
    pub gearbox: String,
    /// Number of seats.
    pub seats: u32,
    /// Rental price per started hour.
    pub cost_per_hour: u32,
}

impl Car {
    /// Returns `make model`.
    pub fn display_name(&self) -> String {
        format!("{} {}", self.make, self.model)
    }
}

impl Record for Car {
    const KIND: &'static str = "car";
    const KEY_INDEX: usize = 4;
    const ARITY: usize = 9;

    fn from_properties(props: &Properties) -> RentalResult<Self> {
        check_arity::<Self>(props)?;
        Ok(Self {
            make: props[0].clone(),
            model: props[1].clone(),
            year: parse_number::<Self, _>("year", &props[2])?,
            color: props[3].clone(),
            license_plate: props[4].clone(),
            motorization: props[5].clone(),
            gearbox: props[6].clone(),
            seats: parse_number::<Self, _>("seats", &props[7])?,
            cost_per_hour: parse_number::<Self, _>("cost per hour", &props[8])?,
        })
    }

    fn to_properties(&self) -> Properties {
        Properties::new(vec![
            self.make.clone(),
            self.model.clone(),
            self.year.to_string(),
            self.color.clone(),
            self.license_plate.clone(),
            self.motorization.clone(),
            self.gearbox.clone(),
            self.seats.to_string(),
            self.cost_per_hour.to_string(),
        ])
    }

    fn key(&self) -> &str {
        &self.license_plate
    }
}
