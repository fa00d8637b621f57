//! Row builders shared by the unit tests

use chrono::{DateTime, TimeZone, Utc};

use crate::models::*;
use crate::store::AuthUser;

pub(crate) fn ts(value: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(value)
        .map(|t| t.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap())
}

pub(crate) fn auth_user(id: &str) -> AuthUser {
    AuthUser {
        id: id.to_string(),
        email: Some(format!("{}@example.com", id)),
        phone: None,
        app_metadata: serde_json::json!({}),
        user_metadata: serde_json::json!({}),
        created_at: "2024-01-01T00:00:00Z".to_string(),
        updated_at: None,
    }
}

pub(crate) fn user(id: &str, name: &str) -> User {
    User {
        id: id.to_string(),
        email: format!("{}@example.com", id),
        full_name: name.to_string(),
        phone: None,
        created_at: ts("2024-01-01T00:00:00Z"),
        updated_at: ts("2024-01-01T00:00:00Z"),
    }
}

pub(crate) fn booking(id: &str, status: BookingStatus, date: &str, amount: f64) -> Booking {
    Booking {
        id: id.to_string(),
        user_id: "u1".to_string(),
        service_type: "regular".to_string(),
        service_name: "Regular Cleaning".to_string(),
        date: date.to_string(),
        time: "09:00".to_string(),
        address: "1 Allen Avenue".to_string(),
        phone: "08030000000".to_string(),
        special_instructions: None,
        status,
        total_amount: amount,
        created_at: ts(&format!("{}T08:00:00Z", date)),
        updated_at: ts(&format!("{}T08:00:00Z", date)),
        users: None,
    }
}

pub(crate) fn contact_message(id: &str, created_at: &str) -> ContactMessage {
    ContactMessage {
        id: id.to_string(),
        name: "Visitor".to_string(),
        email: "visitor@example.com".to_string(),
        phone: None,
        message: "Do you clean rugs?".to_string(),
        status: ContactStatus::New,
        created_at: ts(created_at),
        updated_at: ts(created_at),
    }
}

pub(crate) fn review(id: &str, rating: u8, status: ReviewStatus) -> Review {
    Review {
        id: id.to_string(),
        user_id: "u1".to_string(),
        booking_id: "b1".to_string(),
        rating,
        title: None,
        comment: None,
        service_quality_rating: rating,
        staff_rating: rating,
        timeliness_rating: rating,
        value_rating: rating,
        would_recommend: rating >= 4,
        status,
        admin_response: None,
        created_at: ts("2024-01-01T00:00:00Z"),
        updated_at: ts("2024-01-01T00:00:00Z"),
        users: None,
        bookings: None,
    }
}

pub(crate) fn laundry_order(id: &str, status: LaundryOrderStatus) -> LaundryOrder {
    LaundryOrder {
        id: id.to_string(),
        user_id: "u1".to_string(),
        booking_id: None,
        order_number: format!("LO-{}", id),
        order_type: LaundryServiceType::WashFold,
        service_type: LaundryServiceType::WashFold,
        items: vec![LaundryItem {
            item_type: "shirt".to_string(),
            quantity: 3,
            special_instructions: None,
            price_per_item: 500.0,
        }],
        item_count: 3,
        pickup_date: "2024-06-01".to_string(),
        delivery_date: "2024-06-03".to_string(),
        status,
        total_amount: 1500.0,
        special_instructions: None,
        quality_notes: None,
        created_at: ts("2024-06-01T08:00:00Z"),
        updated_at: ts("2024-06-01T08:00:00Z"),
        users: None,
    }
}

pub(crate) fn delivery(id: &str, kind: DeliveryType, status: DeliveryStatus, scheduled: &str) -> PickupDelivery {
    PickupDelivery {
        id: id.to_string(),
        booking_id: "b1".to_string(),
        user_id: "u1".to_string(),
        kind,
        status,
        pickup_address: None,
        delivery_address: None,
        scheduled_date: scheduled.to_string(),
        scheduled_time: "10:00".to_string(),
        actual_date: None,
        actual_time: None,
        driver_name: None,
        driver_phone: None,
        tracking_notes: None,
        created_at: ts("2024-06-01T08:00:00Z"),
        updated_at: ts("2024-06-01T08:00:00Z"),
        users: None,
        bookings: None,
    }
}

pub(crate) fn complaint(id: &str, status: ComplaintStatus, created_at: &str) -> UserComplaint {
    UserComplaint {
        id: id.to_string(),
        user_id: "u1".to_string(),
        booking_id: None,
        complaint_type: ComplaintType::ServiceQuality,
        subject: "Stain left on sofa".to_string(),
        description: "The stain is still there".to_string(),
        priority: Priority::Medium,
        status,
        resolution_notes: None,
        assigned_to: None,
        created_at: ts(created_at),
        updated_at: ts(created_at),
        resolved_at: None,
        users: None,
    }
}

pub(crate) fn subscription(id: &str, status: SubscriptionStatus, next_billing: &str, amount: f64) -> Subscription {
    Subscription {
        id: id.to_string(),
        user_id: "u1".to_string(),
        plan_name: "Weekly Fresh".to_string(),
        plan_type: BillingCycle::Weekly,
        billing_cycle: BillingCycle::Weekly,
        status,
        start_date: "2024-01-01".to_string(),
        end_date: None,
        next_billing_date: next_billing.to_string(),
        amount,
        services_included: vec!["wash_fold".to_string()],
        max_services_per_period: 4,
        used_services_current_period: 1,
        auto_renewal: true,
        created_at: ts("2024-01-01T00:00:00Z"),
        updated_at: ts("2024-01-01T00:00:00Z"),
        users: None,
    }
}

pub(crate) fn notification(id: &str, status: NotificationStatus, created_at: &str) -> AdminNotification {
    AdminNotification {
        id: id.to_string(),
        kind: NotificationType::Booking,
        title: "New booking".to_string(),
        message: "A booking was placed".to_string(),
        priority: Priority::Low,
        status,
        related_id: None,
        action_required: false,
        created_at: ts(created_at),
        read_at: None,
    }
}
