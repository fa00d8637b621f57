//! Display formatting for amounts and dates

use chrono::NaiveDate;

use crate::models::calendar_day;

/// Naira amount with thousands separators and two decimals, e.g. `₦1,234.50`
pub fn format_currency(amount: f64) -> String {
    let cents = (amount.abs() * 100.0).round() as u64;
    let whole = (cents / 100).to_string();
    let fraction = cents % 100;

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if amount < 0.0 && cents > 0 { "-" } else { "" };
    format!("{}₦{}.{:02}", sign, grouped, fraction)
}

/// `Jan 5, 2024`
pub fn format_date(date: NaiveDate) -> String {
    date.format("%b %-d, %Y").to_string()
}

/// Format a date or timestamp column; unparsable input is returned as is
pub fn format_day(value: &str) -> String {
    calendar_day(value)
        .map(format_date)
        .unwrap_or_else(|| value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_currency() {
        assert_eq!(format_currency(0.0), "₦0.00");
        assert_eq!(format_currency(5.5), "₦5.50");
        assert_eq!(format_currency(1234.5), "₦1,234.50");
        assert_eq!(format_currency(1_000_000.0), "₦1,000,000.00");
        assert_eq!(format_currency(999.999), "₦1,000.00");
        assert_eq!(format_currency(-25000.0), "-₦25,000.00");
    }

    #[test]
    fn test_dates() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 5).unwrap();
        assert_eq!(format_date(date), "Jan 5, 2024");
        assert_eq!(format_day("2023-12-25T18:00:00+00:00"), "Dec 25, 2023");
        assert_eq!(format_day("soon"), "soon");
    }
}
