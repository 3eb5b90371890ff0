use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CustomerRef {
    pub id: i64,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CabRef {
    pub id: i64,
    #[serde(default)]
    pub cab_number: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DriverRef {
    pub id: i64,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
}

impl DriverRef {
    pub fn display_name(&self) -> String {
        match (&self.first_name, &self.last_name) {
            (Some(f), Some(l)) => format!("{f} {l}"),
            (Some(n), None) | (None, Some(n)) => n.clone(),
            (None, None) => format!("#{}", self.id),
        }
    }
}

/// A charge billed to a customer account for a trip
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AccountCharge {
    pub id: i64,
    #[serde(default)]
    pub job_code: Option<String>,
    #[serde(default)]
    pub trip_date: Option<NaiveDate>,
    #[serde(default)]
    pub passenger_name: Option<String>,
    #[serde(default)]
    pub pickup_address: Option<String>,
    #[serde(default)]
    pub dropoff_address: Option<String>,
    pub fare_amount: Decimal,
    #[serde(default)]
    pub tip_amount: Decimal,
    #[serde(default)]
    pub paid: bool,
    #[serde(default)]
    pub invoice_number: Option<String>,
    #[serde(default)]
    pub customer: Option<CustomerRef>,
    #[serde(default)]
    pub cab: Option<CabRef>,
    #[serde(default)]
    pub driver: Option<DriverRef>,
}

impl AccountCharge {
    pub fn total(&self) -> Decimal {
        self.fare_amount + self.tip_amount
    }
}

/// Body of `PUT /account-charges/{id}`.
///
/// Related records are sent by id only, never as nested objects.
#[derive(Debug, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ChargeUpdate {
    pub id: i64,
    pub job_code: Option<String>,
    pub passenger_name: Option<String>,
    pub pickup_address: Option<String>,
    pub dropoff_address: Option<String>,
    #[serde(with = "rust_decimal::serde::float")]
    pub fare_amount: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub tip_amount: Decimal,
    pub paid: bool,
    pub invoice_number: Option<String>,
    pub customer_id: Option<i64>,
    pub cab_id: Option<i64>,
    pub driver_id: Option<i64>,
}

impl From<&AccountCharge> for ChargeUpdate {
    fn from(charge: &AccountCharge) -> Self {
        ChargeUpdate {
            id: charge.id,
            job_code: charge.job_code.clone(),
            passenger_name: charge.passenger_name.clone(),
            pickup_address: charge.pickup_address.clone(),
            dropoff_address: charge.dropoff_address.clone(),
            fare_amount: charge.fare_amount,
            tip_amount: charge.tip_amount,
            paid: charge.paid,
            invoice_number: charge.invoice_number.clone(),
            customer_id: charge.customer.as_ref().map(|c| c.id),
            cab_id: charge.cab.as_ref().map(|c| c.id),
            driver_id: charge.driver.as_ref().map(|d| d.id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn deserializes_nested_refs_and_defaults() {
        let body = json!({
            "id": 41,
            "jobCode": "J-100",
            "tripDate": "2025-03-14",
            "fareAmount": 42.25,
            "customer": {"id": 5, "name": "Acme Corp"},
            "cab": {"id": 12, "cabNumber": "C12"},
            "driver": {"id": 77, "firstName": "Sam", "lastName": "Ortiz"}
        });
        let charge: AccountCharge = serde_json::from_value(body).unwrap();
        assert_eq!(charge.tip_amount, Decimal::ZERO);
        assert!(!charge.paid);
        assert_eq!(charge.driver.as_ref().unwrap().display_name(), "Sam Ortiz");
        assert_eq!(charge.total(), Decimal::new(4225, 2));
    }

    #[test]
    fn missing_fare_is_a_decode_error() {
        let body = json!({"id": 1, "jobCode": "J"});
        assert!(serde_json::from_value::<AccountCharge>(body).is_err());
    }

    #[test]
    fn update_payload_carries_ids_not_objects() {
        let charge: AccountCharge = serde_json::from_value(json!({
            "id": 3,
            "fareAmount": "10.00",
            "customer": {"id": 5},
            "cab": null,
            "driver": {"id": 8}
        }))
        .unwrap();
        let payload = serde_json::to_value(ChargeUpdate::from(&charge)).unwrap();
        assert_eq!(payload["customerId"], json!(5));
        assert_eq!(payload["cabId"], json!(null));
        assert_eq!(payload["driverId"], json!(8));
        assert_eq!(payload["fareAmount"], json!(10.0));
        assert!(payload.get("customer").is_none());
    }
}
