#![warn(clippy::all, missing_docs)]

//! Core domain logic for the car rental records system.
//!
//! This crate hosts the record models, the `#`-delimited flat-file store,
//! the fleet and contract lifecycle, operator accounts and configuration
//! used by the terminal UI and any future frontends.

pub mod accounts;
pub mod config;
pub mod contract;
pub mod error;
pub mod form;
pub mod inventory;
pub mod models;
pub mod store;

pub use accounts::Accounts;
pub use config::AppConfig;
pub use contract::{ArchiveReceipt, ContractManager, ContractName, RentalQuote};
pub use error::{RentalError, RentalResult};
pub use form::{DueDateBounds, Form, FormStep};
pub use inventory::Inventory;
pub use models::{Car, CarStatus, Customer, Properties, Record, User};
pub use store::{ContractDir, RecordFile, RecordStore, StorageLayout};
