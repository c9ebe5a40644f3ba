//! Customers and operator accounts.

use tracing::{info, warn};

use crate::{
    error::{RentalError, RentalResult},
    models::{Customer, Record, User},
    store::{RecordFile, RecordStore},
};

/// Access to the customer list and the users file.
#[derive(Debug, Clone)]
pub struct Accounts {
    store: RecordStore,
}

impl Accounts {
    /// Wrap a record store.
    pub fn new(store: RecordStore) -> Self {
        Self { store }
    }

    /// All valid customers in file order.
    pub fn customers(&self) -> Vec<Customer> {
        self.store.read_records(RecordFile::Customers)
    }

    /// Customer registered under `phone`.
    pub fn find_customer(&self, phone: &str) -> RentalResult<Customer> {
        let props = self
            .store
            .find_by_key::<Customer>(RecordFile::Customers, phone)?;
        Customer::from_properties(&props)
    }

    /// Append a customer.
    pub fn add_customer(&self, customer: &Customer) -> RentalResult<()> {
        self.store
            .append(RecordFile::Customers, &customer.to_properties())?;
        info!(phone = %customer.phone, "added customer");
        Ok(())
    }

    /// All valid users in file order.
    pub fn users(&self) -> Vec<User> {
        self.store.read_records(RecordFile::Users)
    }

    /// First user named `username`.
    pub fn find_user(&self, username: &str) -> RentalResult<User> {
        let props = self
            .store
            .find_by_key::<User>(RecordFile::Users, username)?;
        User::from_properties(&props)
    }

    /// Append a user. Duplicate usernames are accepted; lookups return the first.
    pub fn add_user(&self, user: &User) -> RentalResult<()> {
        if self.find_user(&user.username).is_ok() {
            warn!(username = %user.username, "adding a user whose name is already taken");
        }
        self.store.append(RecordFile::Users, &user.to_properties())?;
        info!(username = %user.username, admin = user.admin, "added user");
        Ok(())
    }

    /// Check a username and password against the users file.
    pub fn authenticate(&self, username: &str, password: &str) -> RentalResult<User> {
        let user = self.find_user(username)?;
        if user.password != password {
            warn!(username, "rejected login");
            return Err(RentalError::InvalidCredentials(username.to_string()));
        }
        info!(username, admin = user.admin, "user logged in");
        Ok(user)
    }

    /// Create an administrator when no user exists yet. Returns whether one was added.
    pub fn ensure_admin(&self, username: &str, password: &str) -> RentalResult<bool> {
        if !self.users().is_empty() {
            return Ok(false);
        }
        let admin = User {
            username: username.to_string(),
            password: password.to_string(),
            admin: true,
        };
        self.store.append(RecordFile::Users, &admin.to_properties())?;
        warn!(username, "no users found, created bootstrap administrator");
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::StorageLayout;
    use anyhow::Result;
    use tempfile::{tempdir, TempDir};

    fn accounts() -> Result<(TempDir, Accounts)> {
        let dir = tempdir()?;
        let layout = StorageLayout::new(dir.path());
        layout.ensure()?;
        Ok((dir, Accounts::new(RecordStore::new(layout))))
    }

    fn clerk(name: &str, password: &str) -> User {
        User {
            username: name.to_string(),
            password: password.to_string(),
            admin: false,
        }
    }

    #[test]
    fn customers_are_found_by_phone() -> Result<()> {
        let (_dir, accounts) = accounts()?;
        let customer = Customer {
            name: "Eva".to_string(),
            surname: "Novak".to_string(),
            email: "eva@example.com".to_string(),
            phone: "+420600100200".to_string(),
            address: "Brno".to_string(),
        };
        accounts.add_customer(&customer)?;

        assert_eq!(accounts.find_customer("+420600100200")?, customer);
        assert!(accounts.find_customer("Novak").is_err());
        assert_eq!(accounts.customers().len(), 1);
        Ok(())
    }

    #[test]
    fn authentication_distinguishes_failures() -> Result<()> {
        let (_dir, accounts) = accounts()?;
        accounts.add_user(&clerk("anna", "pw1"))?;

        assert_eq!(accounts.authenticate("anna", "pw1")?.username, "anna");
        assert!(matches!(
            accounts.authenticate("anna", "wrong"),
            Err(RentalError::InvalidCredentials(_))
        ));
        assert!(matches!(
            accounts.authenticate("bob", "pw1"),
            Err(RentalError::NotFound { what: "user", .. })
        ));
        Ok(())
    }

    #[test]
    fn first_user_wins_on_duplicates() -> Result<()> {
        let (_dir, accounts) = accounts()?;
        accounts.add_user(&clerk("anna", "first"))?;
        accounts.add_user(&clerk("anna", "second"))?;

        assert_eq!(accounts.users().len(), 2);
        assert!(accounts.authenticate("anna", "first").is_ok());
        assert!(accounts.authenticate("anna", "second").is_err());
        Ok(())
    }

    #[test]
    fn bootstrap_admin_only_when_empty() -> Result<()> {
        let (_dir, accounts) = accounts()?;
        assert!(accounts.ensure_admin("admin", "admin")?);
        assert!(accounts.find_user("admin")?.admin);
        assert!(!accounts.ensure_admin("other", "pw")?);
        assert_eq!(accounts.users().len(), 1);
        Ok(())
    }
}
