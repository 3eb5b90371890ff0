//! Typed record shapes exchanged with the FareFlow API.
//!
//! Everything the backend returns is deserialized into these structs at the
//! API boundary; a body that does not fit is a `FareflowError::Decode`.

mod auth;
mod category;
mod charge;
mod driver;
mod expense;
mod page;
mod report;

pub use auth::{LoginRequest, LoginResponse};
pub use category::{Category, CategoryInput};
pub use charge::{AccountCharge, CabRef, ChargeUpdate, CustomerRef, DriverRef};
pub use driver::{Driver, DriverInput, DriverStatus};
pub use expense::{
    deletion_refused, CategoryRef, EntityType, ExpenseKind, Frequency, OneTimeExpense,
    OneTimeExpenseInput, RecurringExpense, RecurringExpenseInput,
};
pub use page::Page;
pub use report::{AggregateLine, AggregateReport, DriverSummary, DriverSummaryPage, SummaryTotals};

use regex::Regex;
use std::sync::OnceLock;

use crate::error::{FareflowError, Result};

fn email_regex() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("static pattern"))
}

/// Check an email address against the same loose pattern the web forms use
pub(crate) fn validate_email(field: &str, value: &str) -> Result<()> {
    if email_regex().is_match(value.trim()) {
        Ok(())
    } else {
        Err(FareflowError::Validation(format!(
            "{field} '{value}' is not a valid email address"
        )))
    }
}

pub(crate) fn require(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        Err(FareflowError::Validation(format!("{field} is required")))
    } else {
        Ok(())
    }
}

pub(crate) fn require_min_len(field: &str, value: &str, min: usize) -> Result<()> {
    if value.trim().chars().count() < min {
        Err(FareflowError::Validation(format!(
            "{field} must be at least {min} characters"
        )))
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_pattern() {
        assert!(validate_email("email", "dispatch@yellowcab.com").is_ok());
        assert!(validate_email("email", "  spaced@host.io ").is_ok());
        assert!(validate_email("email", "no-at-sign.com").is_err());
        assert!(validate_email("email", "two@@host.com").is_err());
        assert!(validate_email("email", "nodot@host").is_err());
    }

    #[test]
    fn required_and_min_len() {
        assert!(require("name", "  ").is_err());
        assert!(require("name", "Ann").is_ok());
        let err = require_min_len("password", "abc", 6).unwrap_err();
        assert!(err.to_string().contains("at least 6"));
    }
}
