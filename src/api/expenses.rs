use chrono::NaiveDate;
use tracing::info;

use super::ApiClient;
use crate::error::Result;
use crate::models::{
    OneTimeExpense, OneTimeExpenseInput, RecurringExpense, RecurringExpenseInput,
};

impl ApiClient {
    pub fn list_recurring_expenses(&self) -> Result<Vec<RecurringExpense>> {
        self.get("/recurring-expenses", &[])
    }

    pub fn create_recurring_expense(&self, input: &RecurringExpenseInput) -> Result<RecurringExpense> {
        input.validate()?;
        self.post("/recurring-expenses", input)
    }

    pub fn update_recurring_expense(
        &self,
        id: i64,
        input: &RecurringExpenseInput,
    ) -> Result<RecurringExpense> {
        input.validate()?;
        self.put(&format!("/recurring-expenses/{id}"), input)
    }

    pub fn deactivate_recurring_expense(&self, id: i64) -> Result<()> {
        self.put_empty(&format!("/recurring-expenses/{id}/deactivate"))?;
        info!(expense_id = id, "recurring expense deactivated");
        Ok(())
    }

    pub fn reactivate_recurring_expense(&self, id: i64) -> Result<()> {
        self.put_empty(&format!("/recurring-expenses/{id}/reactivate"))?;
        info!(expense_id = id, "recurring expense reactivated");
        Ok(())
    }

    pub fn list_one_time_expenses(&self) -> Result<Vec<OneTimeExpense>> {
        self.get("/one-time-expenses", &[])
    }

    pub fn one_time_expenses_between(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<OneTimeExpense>> {
        self.get(
            "/one-time-expenses/between",
            &[("startDate", start.to_string()), ("endDate", end.to_string())],
        )
    }

    pub fn get_one_time_expense(&self, id: i64) -> Result<OneTimeExpense> {
        self.get(&format!("/one-time-expenses/{id}"), &[])
    }

    pub fn create_one_time_expense(&self, input: &OneTimeExpenseInput) -> Result<OneTimeExpense> {
        input.validate()?;
        self.post("/one-time-expenses", input)
    }

    pub fn update_one_time_expense(
        &self,
        id: i64,
        input: &OneTimeExpenseInput,
    ) -> Result<OneTimeExpense> {
        input.validate()?;
        self.put(&format!("/one-time-expenses/{id}"), input)
    }

    /// Cancel an expense by posting an offsetting entry dated `date`
    pub fn reverse_one_time_expense(&self, id: i64, date: NaiveDate) -> Result<OneTimeExpense> {
        let original = self.get_one_time_expense(id)?;
        let reversal = OneTimeExpenseInput::reversal_of(&original, date)?;
        let created = self.create_one_time_expense(&reversal)?;
        info!(expense_id = id, reversal_id = created.id, "one-time expense reversed");
        Ok(created)
    }
}
