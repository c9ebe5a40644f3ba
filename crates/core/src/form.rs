//! Multi-field data entry shared by every frontend.
//!
//! Entering the cancel token at any prompt abandons the whole form. That is
//! reported as [`FormStep::Cancelled`], never as an error.

use std::mem;

use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike};

use crate::{
    error::{RentalError, RentalResult},
    models::Properties,
};

/// Default cancel sentinel.
pub const CANCEL_TOKEN: &str = "CANCEL";

/// Field labels of a car record, in storage order.
pub const CAR_FIELDS: [&str; 9] = [
    "Make",
    "Model",
    "Year",
    "Color",
    "License plate",
    "Motorization",
    "Gearbox",
    "Seats",
    "Cost per hour",
];

/// Field labels of a customer record, in storage order.
pub const CUSTOMER_FIELDS: [&str; 5] = ["Name", "Surname", "Email", "Phone", "Address"];

/// Field labels of a user record, in storage order.
pub const USER_FIELDS: [&str; 3] = ["Username", "Password", "Admin (1/0)"];

/// Components of a contract due date.
pub const DUE_DATE_FIELDS: [&str; 5] = ["Year", "Month", "Day", "Hour", "Minute"];

/// How many years ahead a due date may lie.
pub const MAX_YEARS_OF_RENT: i32 = 2;

/// Outcome of submitting one field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormStep {
    /// More fields are expected.
    Next,
    /// Every field has been entered.
    Complete(Properties),
    /// The cancel token was entered; all input was discarded.
    Cancelled,
}

/// Sequential prompt over a fixed list of labels.
#[derive(Debug, Clone)]
pub struct Form {
    labels: Vec<String>,
    values: Vec<String>,
    cancel_token: String,
}

impl Form {
    /// Create a form asking for `labels` in order.
    pub fn new<I, S>(labels: I, cancel_token: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            labels: labels.into_iter().map(Into::into).collect(),
            values: Vec::new(),
            cancel_token: cancel_token.into(),
        }
    }

    /// Label of the field awaiting input.
    pub fn current_label(&self) -> Option<&str> {
        self.labels.get(self.values.len()).map(String::as_str)
    }

    /// Zero-based index of the field awaiting input.
    pub fn position(&self) -> usize {
        self.values.len()
    }

    /// Total number of fields.
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// True for a form without fields.
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Values entered so far.
    pub fn values(&self) -> &[String] {
        &self.values
    }

    /// Whether `input` is the cancel sentinel.
    pub fn is_cancel(&self, input: &str) -> bool {
        input.trim() == self.cancel_token
    }

    /// Record `input` for the current field.
    pub fn submit(&mut self, input: &str) -> FormStep {
        if self.is_cancel(input) {
            self.values.clear();
            return FormStep::Cancelled;
        }
        if self.values.len() >= self.labels.len() {
            return FormStep::Complete(Properties::new(self.values.clone()));
        }
        self.values.push(input.trim().to_string());
        if self.values.len() == self.labels.len() {
            FormStep::Complete(Properties::new(mem::take(&mut self.values)))
        } else {
            FormStep::Next
        }
    }
}

/// Parse a menu or numeric choice within `min..=max`.
pub fn parse_bounded(input: &str, min: i64, max: i64) -> Option<i64> {
    input
        .trim()
        .parse::<i64>()
        .ok()
        .filter(|value| (min..=max).contains(value))
}

/// Accepted ranges for each due-date component.
///
/// A component may not lie before the current moment while every component
/// entered ahead of it still matches the current date, so a due date in the
/// past cannot be entered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DueDateBounds {
    now: NaiveDateTime,
}

impl DueDateBounds {
    /// Bounds for a contract signed at `now`.
    pub fn from_now(now: NaiveDateTime) -> Self {
        Self { now }
    }

    /// Earliest accepted year.
    pub fn min_year(&self) -> i32 {
        self.now.year()
    }

    /// Latest accepted year.
    pub fn max_year(&self) -> i32 {
        self.now.year() + MAX_YEARS_OF_RENT
    }

    fn now_parts(&self) -> [i64; 5] {
        [
            i64::from(self.now.year()),
            i64::from(self.now.month()),
            i64::from(self.now.day()),
            i64::from(self.now.hour()),
            i64::from(self.now.minute()),
        ]
    }

    /// Inclusive range for the component at `index` (see [`DUE_DATE_FIELDS`]),
    /// given the components already entered before it.
    pub fn range(&self, index: usize, entered: &[i64]) -> Option<(i64, i64)> {
        let now = self.now_parts();
        let max = [i64::from(self.max_year()), 12, 31, 23, 59];
        let floor = [now[0], 1, 1, 0, 0];
        let max = *max.get(index)?;
        let min = if entered.len() >= index && entered[..index] == now[..index] {
            now[index]
        } else {
            floor[index]
        };
        Some((min, max))
    }

    /// Validate a single component as it is typed; `entered` holds the
    /// components before it.
    pub fn check_field(&self, index: usize, input: &str, entered: &[String]) -> RentalResult<i64> {
        let previous: Vec<i64> = entered
            .iter()
            .take(index)
            .map(|value| value.trim().parse::<i64>().unwrap_or(-1))
            .collect();
        let (min, max) = self
            .range(index, &previous)
            .ok_or_else(|| RentalError::invalid("due date", format!("no field at {index}")))?;
        parse_bounded(input, min, max).ok_or_else(|| {
            RentalError::invalid(
                "due date",
                format!(
                    "{} must be a number between {min} and {max}",
                    DUE_DATE_FIELDS[index]
                ),
            )
        })
    }

    /// Build a calendar date-time from the five entered components.
    pub fn assemble(&self, props: &Properties) -> RentalResult<NaiveDateTime> {
        if props.len() != DUE_DATE_FIELDS.len() {
            return Err(RentalError::invalid(
                "due date",
                format!("expected {} fields, found {}", DUE_DATE_FIELDS.len(), props.len()),
            ));
        }
        let mut parts = [0i64; 5];
        for (index, value) in props.iter().enumerate() {
            parts[index] = self.check_field(index, value, &props[..index])?;
        }
        let [year, month, day, hour, minute] = parts;
        NaiveDate::from_ymd_opt(year as i32, month as u32, day as u32)
            .and_then(|date| date.and_hms_opt(hour as u32, minute as u32, 0))
            .ok_or_else(|| {
                RentalError::invalid(
                    "due date",
                    format!("{year:04}-{month:02}-{day:02} is not a calendar date"),
                )
            })
    }
}
