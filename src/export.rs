//! Bookings export as CSV

use chrono::NaiveDate;
use std::path::Path;
use tracing::info;

use crate::error::Result;
use crate::format::{format_currency, format_date, format_day};
use crate::models::Booking;

const HEADER: [&str; 8] = [
    "ID", "Customer", "Service", "Date", "Time", "Status", "Amount", "Created",
];

/// `bookings-YYYY-MM-DD.csv`
pub fn default_file_name(today: NaiveDate) -> String {
    format!("bookings-{}.csv", today.format("%Y-%m-%d"))
}

fn escape(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/// Render bookings as CSV text, header first
pub fn bookings_csv(bookings: &[Booking]) -> String {
    let mut lines = Vec::with_capacity(bookings.len() + 1);
    lines.push(HEADER.join(","));

    for booking in bookings {
        let customer = booking
            .users
            .as_ref()
            .and_then(|u| u.full_name.as_deref())
            .unwrap_or("N/A");
        let fields = [
            booking.id.clone(),
            customer.to_string(),
            booking.service_name.clone(),
            format_day(&booking.date),
            booking.time.clone(),
            booking.status.to_string(),
            format_currency(booking.total_amount),
            format_date(booking.created_at.date_naive()),
        ];
        let row: Vec<String> = fields.iter().map(|f| escape(f)).collect();
        lines.push(row.join(","));
    }

    lines.join("\n")
}

/// Write the CSV to `path`
pub fn write_bookings_csv(path: &Path, bookings: &[Booking]) -> Result<()> {
    std::fs::write(path, bookings_csv(bookings))?;
    info!(path = %path.display(), rows = bookings.len(), "Exported bookings");
    Ok(())
}
