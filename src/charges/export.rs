use std::io::Write;

use crate::error::Result;
use crate::models::AccountCharge;

pub const CSV_HEADER: [&str; 13] = [
    "Job Code",
    "Date",
    "Customer",
    "Passenger",
    "Pickup",
    "Dropoff",
    "Cab",
    "Driver",
    "Fare",
    "Tip",
    "Total",
    "Paid",
    "Invoice",
];

/// Write charges as CSV with the fixed export header
pub fn export_csv<W: Write>(charges: &[AccountCharge], writer: W) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(CSV_HEADER)?;

    for charge in charges {
        let customer = charge
            .customer
            .as_ref()
            .and_then(|c| c.name.clone())
            .unwrap_or_default();
        let cab = charge
            .cab
            .as_ref()
            .map(|c| c.cab_number.clone().unwrap_or_else(|| c.id.to_string()))
            .unwrap_or_default();
        let driver = charge
            .driver
            .as_ref()
            .map(|d| d.display_name())
            .unwrap_or_default();

        wtr.write_record([
            charge.job_code.clone().unwrap_or_default(),
            charge.trip_date.map(|d| d.to_string()).unwrap_or_default(),
            customer,
            charge.passenger_name.clone().unwrap_or_default(),
            charge.pickup_address.clone().unwrap_or_default(),
            charge.dropoff_address.clone().unwrap_or_default(),
            cab,
            driver,
            format!("{:.2}", charge.fare_amount),
            format!("{:.2}", charge.tip_amount),
            format!("{:.2}", charge.total()),
            if charge.paid { "Yes" } else { "No" }.to_string(),
            charge.invoice_number.clone().unwrap_or_default(),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CustomerRef, DriverRef};
    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    #[test]
    fn writes_header_and_quoted_rows() {
        let charge = AccountCharge {
            id: 1,
            job_code: Some("J-1".to_string()),
            trip_date: NaiveDate::from_ymd_opt(2025, 4, 2),
            passenger_name: Some("Kim, Lee".to_string()),
            pickup_address: Some("5 Elm".to_string()),
            dropoff_address: None,
            fare_amount: Decimal::new(755, 1),
            tip_amount: Decimal::new(5, 0),
            paid: true,
            invoice_number: None,
            customer: Some(CustomerRef {
                id: 3,
                name: Some("Acme".to_string()),
            }),
            cab: None,
            driver: Some(DriverRef {
                id: 9,
                first_name: Some("Ray".to_string()),
                last_name: None,
            }),
        };

        let mut out = Vec::new();
        export_csv(&[charge], &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let mut lines = text.lines();

        assert_eq!(
            lines.next().unwrap(),
            "Job Code,Date,Customer,Passenger,Pickup,Dropoff,Cab,Driver,Fare,Tip,Total,Paid,Invoice"
        );
        assert_eq!(
            lines.next().unwrap(),
            "J-1,2025-04-02,Acme,\"Kim, Lee\",5 Elm,,,Ray,75.50,5.00,80.50,Yes,"
        );
        assert!(lines.next().is_none());
    }
}
