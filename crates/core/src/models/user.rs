use super::{check_arity, Properties, Record};
use crate::error::RentalResult;

/// An operator account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    /// Login name.
    pub username: String,
    /// Stored in plain text.
    pub password: String,
    /// Grants fleet and account management.
    pub admin: bool,
}

impl Record for User {
    const KIND: &'static str = "user";
    const KEY_INDEX: usize = 0;
    const ARITY: usize = 3;

    fn from_properties(props: &Properties) -> RentalResult<Self> {
        check_arity::<Self>(props)?;
        Ok(Self {
            username: props[0].clone(),
            password: props[1].clone(),
            admin: props[2] == "1",
        })
    }

    fn to_properties(&self) -> Properties {
        Properties::new(vec![
            self.username.clone(),
            self.password.clone(),
            if self.admin { "1" } else { "0" }.to_string(),
        ])
    }

    fn key(&self) -> &str {
        &self.username
    }
}
