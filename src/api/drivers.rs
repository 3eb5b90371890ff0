use tracing::info;

use super::ApiClient;
use crate::error::Result;
use crate::models::{Driver, DriverInput};

impl ApiClient {
    pub fn list_drivers(&self) -> Result<Vec<Driver>> {
        self.get("/drivers", &[])
    }

    pub fn get_driver(&self, id: i64) -> Result<Driver> {
        self.get(&format!("/drivers/{id}"), &[])
    }

    pub fn create_driver(&self, input: &DriverInput) -> Result<Driver> {
        input.validate()?;
        let driver: Driver = self.post("/drivers", input)?;
        info!(driver_id = driver.id, "driver created");
        Ok(driver)
    }

    pub fn update_driver(&self, id: i64, input: &DriverInput) -> Result<Driver> {
        input.validate()?;
        self.put(&format!("/drivers/{id}"), input)
    }

    pub fn suspend_driver(&self, id: i64) -> Result<()> {
        self.put_empty(&format!("/drivers/{id}/suspend"))?;
        info!(driver_id = id, "driver suspended");
        Ok(())
    }

    pub fn activate_driver(&self, id: i64) -> Result<()> {
        self.put_empty(&format!("/drivers/{id}/activate"))?;
        info!(driver_id = id, "driver activated");
        Ok(())
    }
}
