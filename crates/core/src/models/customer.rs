use super::{check_arity, Properties, Record};
use crate::error::RentalResult;

/// A renting customer, looked up by phone number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Customer {
    /// Given name.
    pub name: String,
    /// Family name, also the first segment of contract names.
    pub surname: String,
    /// Contact e-mail.
    pub email: String,
    /// Kept as text so a leading `+` country prefix survives.
    pub phone: String,
    /// Postal address.
    pub address: String,
}

impl Customer {
    /// Returns `name surname`.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.name, self.surname)
    }
}

impl Record for Customer {
    const KIND: &'static str = "customer";
    const KEY_INDEX: usize = 3;
    const ARITY: usize = 5;

    fn from_properties(props: &Properties) -> RentalResult<Self> {
        check_arity::<Self>(props)?;
        Ok(Self {
            name: props[0].clone(),
            surname: props[1].clone(),
            email: props[2].clone(),
            phone: props[3].clone(),
            address: props[4].clone(),
        })
    }

    fn to_properties(&self) -> Properties {
        Properties::new(vec![
            self.name.clone(),
            self.surname.clone(),
            self.email.clone(),
            self.phone.clone(),
            self.address.clone(),
        ])
    }

    fn key(&self) -> &str {
        &self.phone
    }
}
