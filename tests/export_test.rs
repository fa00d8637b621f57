use chrono::NaiveDate;
use laundry_admin::export::{default_file_name, write_bookings_csv};
use laundry_admin::models::Booking;
use serde_json::json;

#[test]
fn test_export_writes_file() {
    let booking: Booking = serde_json::from_value(json!({
        "id": "b1",
        "user_id": "u1",
        "service_type": "deep_clean",
        "service_name": "Deep Cleaning",
        "date": "2024-06-10",
        "time": "10:00",
        "address": "12 Marina Rd",
        "phone": "08030000000",
        "status": "confirmed",
        "total_amount": 25000,
        "created_at": "2024-06-01T09:30:00Z",
        "updated_at": "2024-06-01T09:30:00Z",
        "users": { "full_name": "Ada Obi", "email": "ada@example.com" }
    }))
    .unwrap();

    let dir = tempfile::tempdir().unwrap();
    let today = NaiveDate::from_ymd_opt(2024, 6, 10).unwrap();
    let path = dir.path().join(default_file_name(today));

    write_bookings_csv(&path, &[booking]).unwrap();

    let written = std::fs::read_to_string(&path).unwrap();
    assert!(path.ends_with("bookings-2024-06-10.csv"));
    assert_eq!(
        written,
        "ID,Customer,Service,Date,Time,Status,Amount,Created\n\
         b1,Ada Obi,Deep Cleaning,\"Jun 10, 2024\",10:00,confirmed,\"₦25,000.00\",\"Jun 1, 2024\""
    );
}

#[test]
fn test_export_to_missing_directory_fails() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing").join("bookings.csv");
    assert!(write_bookings_csv(&path, &[]).is_err());
}
