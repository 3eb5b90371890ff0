use super::ApiClient;
use crate::charges::{ChargeQuery, ChargeStore};
use crate::error::Result;
use crate::models::{AccountCharge, ChargeUpdate, Page};

impl ChargeStore for ApiClient {
    fn list_charges(&self, query: &ChargeQuery) -> Result<Page<AccountCharge>> {
        self.get("/account-charges", &query.to_params())
    }

    fn update_charge(&self, update: &ChargeUpdate) -> Result<AccountCharge> {
        self.put(&format!("/account-charges/{}", update.id), update)
    }
}
