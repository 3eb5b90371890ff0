use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{FareflowError, Result};

/// What kind of object an expense or revenue record is attached to
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntityType {
    Cab,
    Shift,
    Driver,
    Owner,
    Company,
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            EntityType::Cab => "CAB",
            EntityType::Shift => "SHIFT",
            EntityType::Driver => "DRIVER",
            EntityType::Owner => "OWNER",
            EntityType::Company => "COMPANY",
        };
        f.write_str(label)
    }
}

impl FromStr for EntityType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "CAB" => Ok(EntityType::Cab),
            "SHIFT" => Ok(EntityType::Shift),
            "DRIVER" => Ok(EntityType::Driver),
            "OWNER" => Ok(EntityType::Owner),
            "COMPANY" => Ok(EntityType::Company),
            other => Err(format!(
                "unknown entity type '{other}' (expected cab, shift, driver, owner or company)"
            )),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Frequency {
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Frequency::Daily => "DAILY",
            Frequency::Weekly => "WEEKLY",
            Frequency::Monthly => "MONTHLY",
            Frequency::Yearly => "YEARLY",
        };
        f.write_str(label)
    }
}

impl FromStr for Frequency {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "DAILY" => Ok(Frequency::Daily),
            "WEEKLY" => Ok(Frequency::Weekly),
            "MONTHLY" => Ok(Frequency::Monthly),
            "YEARLY" => Ok(Frequency::Yearly),
            other => Err(format!(
                "unknown frequency '{other}' (expected daily, weekly, monthly or yearly)"
            )),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CategoryRef {
    pub id: i64,
    #[serde(default)]
    pub name: Option<String>,
}

/// A fixed-cadence expense in effect between two dates
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RecurringExpense {
    pub id: i64,
    #[serde(default)]
    pub category: Option<CategoryRef>,
    pub entity_type: EntityType,
    #[serde(default)]
    pub entity_id: Option<i64>,
    pub amount: Decimal,
    pub frequency: Frequency,
    pub effective_from: NaiveDate,
    #[serde(default)]
    pub effective_to: Option<NaiveDate>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default = "default_active")]
    pub active: bool,
}

impl RecurringExpense {
    /// Whether the expense applies on `date`
    pub fn in_effect_on(&self, date: NaiveDate) -> bool {
        self.active && self.effective_from <= date && self.effective_to.map_or(true, |to| date <= to)
    }
}

fn default_active() -> bool {
    true
}

#[derive(Debug, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct RecurringExpenseInput {
    pub expense_category_id: i64,
    pub entity_type: EntityType,
    pub entity_id: Option<i64>,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    pub frequency: Frequency,
    pub effective_from: NaiveDate,
    pub effective_to: Option<NaiveDate>,
    pub description: Option<String>,
}

impl RecurringExpenseInput {
    pub fn validate(&self) -> Result<()> {
        if self.amount <= Decimal::ZERO {
            return Err(FareflowError::Validation(
                "amount must be greater than zero".to_string(),
            ));
        }
        if let Some(to) = self.effective_to {
            if to < self.effective_from {
                return Err(FareflowError::Validation(format!(
                    "effective-to {to} is before effective-from {}",
                    self.effective_from
                )));
            }
        }
        Ok(())
    }
}

/// A single dated variable expense
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OneTimeExpense {
    pub id: i64,
    #[serde(default)]
    pub category: Option<CategoryRef>,
    pub entity_type: EntityType,
    #[serde(default)]
    pub entity_id: Option<i64>,
    pub amount: Decimal,
    pub expense_date: NaiveDate,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub vendor: Option<String>,
    /// Set on offsetting entries; points at the expense being corrected
    #[serde(default)]
    pub reverses_expense_id: Option<i64>,
}

#[derive(Debug, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct OneTimeExpenseInput {
    pub expense_category_id: i64,
    pub entity_type: EntityType,
    pub entity_id: Option<i64>,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    pub expense_date: NaiveDate,
    pub description: Option<String>,
    pub vendor: Option<String>,
    pub reverses_expense_id: Option<i64>,
}

impl OneTimeExpenseInput {
    pub fn validate(&self) -> Result<()> {
        if self.reverses_expense_id.is_none() && self.amount <= Decimal::ZERO {
            return Err(FareflowError::Validation(
                "amount must be greater than zero; use a reversal to correct an entry".to_string(),
            ));
        }
        if self.amount.is_zero() {
            return Err(FareflowError::Validation("amount cannot be zero".to_string()));
        }
        Ok(())
    }

    /// Offsetting entry that cancels `original` without deleting it
    pub fn reversal_of(original: &OneTimeExpense, date: NaiveDate) -> Result<Self> {
        if original.reverses_expense_id.is_some() {
            return Err(FareflowError::Validation(format!(
                "expense #{} is itself a reversal and cannot be reversed",
                original.id
            )));
        }
        let category_id = original
            .category
            .as_ref()
            .map(|c| c.id)
            .ok_or_else(|| {
                FareflowError::Validation(format!("expense #{} has no category", original.id))
            })?;

        Ok(OneTimeExpenseInput {
            expense_category_id: category_id,
            entity_type: original.entity_type,
            entity_id: original.entity_id,
            amount: -original.amount,
            expense_date: date,
            description: Some(format!("Reversal of expense #{}", original.id)),
            vendor: original.vendor.clone(),
            reverses_expense_id: Some(original.id),
        })
    }
}

/// Expenses are never deleted; this is the refusal shown instead.
pub fn deletion_refused(kind: ExpenseKind) -> FareflowError {
    let (label, hint) = match kind {
        ExpenseKind::Recurring => (
            "Recurring expense",
            "Deactivate it instead: fareflow expenses recurring deactivate <id>",
        ),
        ExpenseKind::OneTime => (
            "One-time expense",
            "Record an offsetting entry instead: fareflow expenses one-time reverse <id>",
        ),
    };
    FareflowError::DeletionNotAllowed {
        kind: label.to_string(),
        hint: hint.to_string(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpenseKind {
    Recurring,
    OneTime,
}
