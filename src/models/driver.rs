use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::{require, require_min_len, validate_email};
use crate::error::Result;

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DriverStatus {
    Active,
    Suspended,
    Inactive,
}

impl fmt::Display for DriverStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            DriverStatus::Active => "ACTIVE",
            DriverStatus::Suspended => "SUSPENDED",
            DriverStatus::Inactive => "INACTIVE",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Driver {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub license_number: Option<String>,
    #[serde(default)]
    pub license_expiry: Option<NaiveDate>,
    #[serde(default)]
    pub is_owner: bool,
    pub status: DriverStatus,
}

impl Driver {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Body of `POST /drivers` and `PUT /drivers/{id}`
#[derive(Debug, Serialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct DriverInput {
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub license_number: Option<String>,
    pub license_expiry: Option<NaiveDate>,
    pub is_owner: bool,
}

impl DriverInput {
    pub fn validate(&self) -> Result<()> {
        require("first name", &self.first_name)?;
        require("last name", &self.last_name)?;
        if let Some(email) = &self.email {
            validate_email("email", email)?;
        }
        if let Some(license) = &self.license_number {
            require_min_len("license number", license, 5)?;
        }
        Ok(())
    }
}

impl From<&Driver> for DriverInput {
    fn from(driver: &Driver) -> Self {
        DriverInput {
            first_name: driver.first_name.clone(),
            last_name: driver.last_name.clone(),
            email: driver.email.clone(),
            phone: driver.phone.clone(),
            license_number: driver.license_number.clone(),
            license_expiry: driver.license_expiry,
            is_owner: driver.is_owner,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input() -> DriverInput {
        DriverInput {
            first_name: "Lena".to_string(),
            last_name: "Park".to_string(),
            email: Some("lena@fleet.io".to_string()),
            license_number: Some("D1234567".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn valid_driver_passes() {
        assert!(input().validate().is_ok());
    }

    #[test]
    fn rejects_missing_name_bad_email_short_license() {
        let mut d = input();
        d.first_name = " ".to_string();
        assert!(d.validate().is_err());

        let mut d = input();
        d.email = Some("lena.fleet.io".to_string());
        assert!(d.validate().is_err());

        let mut d = input();
        d.license_number = Some("D1".to_string());
        assert!(d.validate().is_err());
    }

    #[test]
    fn status_parses_from_wire() {
        let d: Driver = serde_json::from_str(
            r#"{"id":1,"firstName":"A","lastName":"B","status":"SUSPENDED"}"#,
        )
        .unwrap();
        assert_eq!(d.status, DriverStatus::Suspended);
        assert_eq!(d.full_name(), "A B");
    }
}
