//! Row types mirrored from the backend tables
//!
//! Timestamps are decoded into `DateTime<Utc>`. Calendar-day columns
//! (booking date, scheduled dates, billing dates) stay textual since the
//! backend may store them either as `date` or as `timestamptz`; use
//! [`calendar_day`] to compare them.

use chrono::{DateTime, NaiveDate, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// A row type with a string primary key
pub trait Record: Clone + std::fmt::Debug + DeserializeOwned + Send + Sync + 'static {
    /// Backend table the rows live in
    const TABLE: &'static str;

    fn id(&self) -> &str;

    /// Called when `self` replaces `previous` in the local mirror.
    /// Rows coming back from writes or change feeds carry no embedded
    /// relations, so the mirrored ones are kept.
    fn inherit_relations(&mut self, _previous: &Self) {}
}

/// Leading `YYYY-MM-DD` of a date or timestamp column
pub fn calendar_day(value: &str) -> Option<NaiveDate> {
    let day = value.get(..10)?;
    NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
}

macro_rules! status_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $wire:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(
                #[serde(rename = $wire)]
                $variant,
            )+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $wire,)+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = crate::error::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($wire => Ok($name::$variant),)+
                    other => Err(crate::error::Error::InvalidArgument(format!(
                        "unknown {} '{}', expected one of: {}",
                        stringify!($name),
                        other,
                        [$($wire),+].join(", ")
                    ))),
                }
            }
        }
    };
}

status_enum!(BookingStatus {
    Pending => "pending",
    Confirmed => "confirmed",
    InProgress => "in_progress",
    Completed => "completed",
    Cancelled => "cancelled",
});

status_enum!(ContactStatus {
    New => "new",
    Read => "read",
    Responded => "responded",
});

status_enum!(DeliveryType {
    Pickup => "pickup",
    Delivery => "delivery",
});

status_enum!(DeliveryStatus {
    Scheduled => "scheduled",
    InTransit => "in_transit",
    Completed => "completed",
    Cancelled => "cancelled",
});

status_enum!(ComplaintType {
    ServiceQuality => "service_quality",
    Billing => "billing",
    StaffBehavior => "staff_behavior",
    Scheduling => "scheduling",
    Other => "other",
});

status_enum!(
    /// Shared by complaints and admin notifications
    Priority {
        Low => "low",
        Medium => "medium",
        High => "high",
        Urgent => "urgent",
    }
);

status_enum!(ComplaintStatus {
    New => "new",
    Investigating => "investigating",
    Resolved => "resolved",
    Closed => "closed",
});

status_enum!(PaymentMethod {
    Card => "card",
    Cash => "cash",
    BankTransfer => "bank_transfer",
    DigitalWallet => "digital_wallet",
});

status_enum!(PaymentStatus {
    Pending => "pending",
    Processing => "processing",
    Completed => "completed",
    Failed => "failed",
    Refunded => "refunded",
});

status_enum!(BillingCycle {
    Weekly => "weekly",
    BiWeekly => "bi_weekly",
    Monthly => "monthly",
    Quarterly => "quarterly",
});

status_enum!(SubscriptionStatus {
    Active => "active",
    Paused => "paused",
    Cancelled => "cancelled",
    Expired => "expired",
});

status_enum!(LaundryServiceType {
    WashFold => "wash_fold",
    DryCleaning => "dry_cleaning",
    Ironing => "ironing",
    SpecialCare => "special_care",
});

status_enum!(LaundryOrderStatus {
    Received => "received",
    Washing => "washing",
    Drying => "drying",
    Folding => "folding",
    Ready => "ready",
    OutForDelivery => "out_for_delivery",
    Delivered => "delivered",
    Completed => "completed",
    InProgress => "in_progress",
    ReadyForPickup => "ready_for_pickup",
});

status_enum!(NotificationType {
    Booking => "booking",
    Payment => "payment",
    Complaint => "complaint",
    System => "system",
    UserMessage => "user_message",
});

status_enum!(NotificationStatus {
    Unread => "unread",
    Read => "read",
    Archived => "archived",
});

status_enum!(ReviewStatus {
    Pending => "pending",
    Approved => "approved",
    Rejected => "rejected",
});

impl LaundryOrderStatus {
    /// Orders still being processed in the shop
    pub fn is_pending(&self) -> bool {
        matches!(
            self,
            Self::Received | Self::Washing | Self::Drying | Self::Folding
        )
    }
}

/// Embedded `users` relation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserSummary {
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

/// Embedded `bookings` relation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BookingSummary {
    #[serde(default)]
    pub service_name: Option<String>,
}

fn customer_name(users: &Option<UserSummary>) -> &str {
    users
        .as_ref()
        .and_then(|u| u.full_name.as_deref())
        .unwrap_or("Unknown")
}

fn customer_email(users: &Option<UserSummary>) -> &str {
    users
        .as_ref()
        .and_then(|u| u.email.as_deref())
        .unwrap_or("")
}

fn customer_phone(users: &Option<UserSummary>) -> &str {
    users
        .as_ref()
        .and_then(|u| u.phone.as_deref())
        .unwrap_or("")
}

fn service_name(bookings: &Option<BookingSummary>) -> &str {
    bookings
        .as_ref()
        .and_then(|b| b.service_name.as_deref())
        .unwrap_or("Unknown Service")
}

/// Customer profile row (`users` table)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
    pub full_name: String,
    #[serde(default)]
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Record for User {
    const TABLE: &'static str = "users";

    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Booking {
    pub id: String,
    pub user_id: String,
    pub service_type: String,
    pub service_name: String,
    /// `YYYY-MM-DD`
    pub date: String,
    pub time: String,
    pub address: String,
    pub phone: String,
    #[serde(default)]
    pub special_instructions: Option<String>,
    pub status: BookingStatus,
    pub total_amount: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing)]
    pub users: Option<UserSummary>,
}

impl Booking {
    pub fn customer_name(&self) -> &str {
        customer_name(&self.users)
    }

    pub fn customer_email(&self) -> &str {
        customer_email(&self.users)
    }
}

impl Record for Booking {
    const TABLE: &'static str = "bookings";

    fn id(&self) -> &str {
        &self.id
    }

    fn inherit_relations(&mut self, previous: &Self) {
        if self.users.is_none() {
            self.users = previous.users.clone();
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Service {
    pub id: String,
    pub name: String,
    pub description: String,
    pub base_price: f64,
    pub category: String,
    pub duration_hours: f64,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Record for Service {
    const TABLE: &'static str = "services";

    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContactMessage {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    pub message: String,
    pub status: ContactStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Record for ContactMessage {
    const TABLE: &'static str = "contact_messages";

    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PickupDelivery {
    pub id: String,
    pub booking_id: String,
    pub user_id: String,
    #[serde(rename = "type")]
    pub kind: DeliveryType,
    pub status: DeliveryStatus,
    #[serde(default)]
    pub pickup_address: Option<String>,
    #[serde(default)]
    pub delivery_address: Option<String>,
    pub scheduled_date: String,
    pub scheduled_time: String,
    #[serde(default)]
    pub actual_date: Option<String>,
    #[serde(default)]
    pub actual_time: Option<String>,
    #[serde(default)]
    pub driver_name: Option<String>,
    #[serde(default)]
    pub driver_phone: Option<String>,
    #[serde(default)]
    pub tracking_notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing)]
    pub users: Option<UserSummary>,
    #[serde(default, skip_serializing)]
    pub bookings: Option<BookingSummary>,
}

impl PickupDelivery {
    pub fn customer_name(&self) -> &str {
        customer_name(&self.users)
    }

    pub fn customer_phone(&self) -> &str {
        customer_phone(&self.users)
    }

    pub fn service_name(&self) -> &str {
        service_name(&self.bookings)
    }
}

impl Record for PickupDelivery {
    const TABLE: &'static str = "pickup_deliveries";

    fn id(&self) -> &str {
        &self.id
    }

    fn inherit_relations(&mut self, previous: &Self) {
        if self.users.is_none() {
            self.users = previous.users.clone();
        }
        if self.bookings.is_none() {
            self.bookings = previous.bookings.clone();
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserComplaint {
    pub id: String,
    pub user_id: String,
    #[serde(default)]
    pub booking_id: Option<String>,
    pub complaint_type: ComplaintType,
    pub subject: String,
    pub description: String,
    pub priority: Priority,
    pub status: ComplaintStatus,
    #[serde(default)]
    pub resolution_notes: Option<String>,
    #[serde(default)]
    pub assigned_to: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub resolved_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing)]
    pub users: Option<UserSummary>,
}

impl UserComplaint {
    pub fn customer_name(&self) -> &str {
        customer_name(&self.users)
    }

    pub fn customer_email(&self) -> &str {
        customer_email(&self.users)
    }
}

impl Record for UserComplaint {
    const TABLE: &'static str = "user_complaints";

    fn id(&self) -> &str {
        &self.id
    }

    fn inherit_relations(&mut self, previous: &Self) {
        if self.users.is_none() {
            self.users = previous.users.clone();
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    pub id: String,
    pub booking_id: String,
    pub user_id: String,
    pub amount: f64,
    pub currency: String,
    pub payment_method: PaymentMethod,
    pub payment_status: PaymentStatus,
    #[serde(default)]
    pub transaction_id: Option<String>,
    pub payment_date: String,
    #[serde(default)]
    pub refund_amount: Option<f64>,
    #[serde(default)]
    pub refund_date: Option<String>,
    #[serde(default)]
    pub refund_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing)]
    pub users: Option<UserSummary>,
    #[serde(default, skip_serializing)]
    pub bookings: Option<BookingSummary>,
}

impl Payment {
    pub fn customer_name(&self) -> &str {
        customer_name(&self.users)
    }

    pub fn service_name(&self) -> &str {
        service_name(&self.bookings)
    }
}

impl Record for Payment {
    const TABLE: &'static str = "payments";

    fn id(&self) -> &str {
        &self.id
    }

    fn inherit_relations(&mut self, previous: &Self) {
        if self.users.is_none() {
            self.users = previous.users.clone();
        }
        if self.bookings.is_none() {
            self.bookings = previous.bookings.clone();
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subscription {
    pub id: String,
    pub user_id: String,
    pub plan_name: String,
    pub plan_type: BillingCycle,
    pub billing_cycle: BillingCycle,
    pub status: SubscriptionStatus,
    pub start_date: String,
    #[serde(default)]
    pub end_date: Option<String>,
    pub next_billing_date: String,
    pub amount: f64,
    #[serde(default)]
    pub services_included: Vec<String>,
    pub max_services_per_period: i32,
    pub used_services_current_period: i32,
    pub auto_renewal: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing)]
    pub users: Option<UserSummary>,
}

impl Subscription {
    pub fn customer_name(&self) -> &str {
        customer_name(&self.users)
    }

    pub fn customer_email(&self) -> &str {
        customer_email(&self.users)
    }
}

impl Record for Subscription {
    const TABLE: &'static str = "subscriptions";

    fn id(&self) -> &str {
        &self.id
    }

    fn inherit_relations(&mut self, previous: &Self) {
        if self.users.is_none() {
            self.users = previous.users.clone();
        }
    }
}

/// One line of a laundry order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LaundryItem {
    pub item_type: String,
    pub quantity: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub special_instructions: Option<String>,
    pub price_per_item: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LaundryOrder {
    pub id: String,
    pub user_id: String,
    #[serde(default)]
    pub booking_id: Option<String>,
    pub order_number: String,
    pub order_type: LaundryServiceType,
    pub service_type: LaundryServiceType,
    #[serde(default)]
    pub items: Vec<LaundryItem>,
    pub item_count: u32,
    pub pickup_date: String,
    pub delivery_date: String,
    pub status: LaundryOrderStatus,
    pub total_amount: f64,
    #[serde(default)]
    pub special_instructions: Option<String>,
    #[serde(default)]
    pub quality_notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing)]
    pub users: Option<UserSummary>,
}

impl LaundryOrder {
    pub fn customer_name(&self) -> &str {
        customer_name(&self.users)
    }

    pub fn customer_phone(&self) -> &str {
        customer_phone(&self.users)
    }
}

impl Record for LaundryOrder {
    const TABLE: &'static str = "laundry_orders";

    fn id(&self) -> &str {
        &self.id
    }

    fn inherit_relations(&mut self, previous: &Self) {
        if self.users.is_none() {
            self.users = previous.users.clone();
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdminNotification {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: NotificationType,
    pub title: String,
    pub message: String,
    pub priority: Priority,
    pub status: NotificationStatus,
    /// Booking, payment etc. the alert is about
    #[serde(default)]
    pub related_id: Option<String>,
    pub action_required: bool,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub read_at: Option<DateTime<Utc>>,
}

impl Record for AdminNotification {
    const TABLE: &'static str = "admin_notifications";

    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    pub id: String,
    pub user_id: String,
    pub booking_id: String,
    /// 1 to 5 stars
    pub rating: u8,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub comment: Option<String>,
    pub service_quality_rating: u8,
    pub staff_rating: u8,
    pub timeliness_rating: u8,
    pub value_rating: u8,
    pub would_recommend: bool,
    pub status: ReviewStatus,
    #[serde(default)]
    pub admin_response: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing)]
    pub users: Option<UserSummary>,
    #[serde(default, skip_serializing)]
    pub bookings: Option<BookingSummary>,
}

impl Review {
    pub fn customer_name(&self) -> &str {
        customer_name(&self.users)
    }

    pub fn service_name(&self) -> &str {
        service_name(&self.bookings)
    }
}

impl Record for Review {
    const TABLE: &'static str = "reviews";

    fn id(&self) -> &str {
        &self.id
    }

    fn inherit_relations(&mut self, previous: &Self) {
        if self.users.is_none() {
            self.users = previous.users.clone();
        }
        if self.bookings.is_none() {
            self.bookings = previous.bookings.clone();
        }
    }
}

// Insert payloads. The backend assigns ids and timestamps.

/// New booking; `user_id` is filled in from the signed-in user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewBooking {
    pub service_type: String,
    pub service_name: String,
    pub date: String,
    pub time: String,
    pub address: String,
    pub phone: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub special_instructions: Option<String>,
    pub status: BookingStatus,
    pub total_amount: f64,
}

/// New contact message; stored with status `new`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewContactMessage {
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewPickupDelivery {
    pub booking_id: String,
    pub user_id: String,
    #[serde(rename = "type")]
    pub kind: DeliveryType,
    pub status: DeliveryStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pickup_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delivery_address: Option<String>,
    pub scheduled_date: String,
    pub scheduled_time: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub driver_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub driver_phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tracking_notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewComplaint {
    pub user_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub booking_id: Option<String>,
    pub complaint_type: ComplaintType,
    pub subject: String,
    pub description: String,
    pub priority: Priority,
    pub status: ComplaintStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewPayment {
    pub booking_id: String,
    pub user_id: String,
    pub amount: f64,
    pub currency: String,
    pub payment_method: PaymentMethod,
    pub payment_status: PaymentStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<String>,
    pub payment_date: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewSubscription {
    pub user_id: String,
    pub plan_name: String,
    pub plan_type: BillingCycle,
    pub billing_cycle: BillingCycle,
    pub status: SubscriptionStatus,
    pub start_date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    pub next_billing_date: String,
    pub amount: f64,
    #[serde(default)]
    pub services_included: Vec<String>,
    pub max_services_per_period: i32,
    pub used_services_current_period: i32,
    pub auto_renewal: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewLaundryOrder {
    pub user_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub booking_id: Option<String>,
    pub order_number: String,
    pub order_type: LaundryServiceType,
    pub service_type: LaundryServiceType,
    #[serde(default)]
    pub items: Vec<LaundryItem>,
    pub item_count: u32,
    pub pickup_date: String,
    pub delivery_date: String,
    pub status: LaundryOrderStatus,
    pub total_amount: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub special_instructions: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewNotification {
    #[serde(rename = "type")]
    pub kind: NotificationType,
    pub title: String,
    pub message: String,
    pub priority: Priority,
    pub status: NotificationStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub related_id: Option<String>,
    pub action_required: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn booking_json() -> serde_json::Value {
        json!({
            "id": "b1",
            "user_id": "u1",
            "service_type": "deep_clean",
            "service_name": "Deep Cleaning",
            "date": "2024-03-09",
            "time": "10:00",
            "address": "12 Marina Rd",
            "phone": "+2348000000000",
            "status": "in_progress",
            "total_amount": 25000.0,
            "created_at": "2024-03-01T09:30:00.123456+00:00",
            "updated_at": "2024-03-01T09:30:00+00:00",
            "users": { "full_name": "Ada Obi", "email": "ada@example.com", "phone": null }
        })
    }

    #[test]
    fn test_booking_with_embedded_user() {
        let booking: Booking = serde_json::from_value(booking_json()).unwrap();
        assert_eq!(booking.status, BookingStatus::InProgress);
        assert_eq!(booking.customer_name(), "Ada Obi");
        assert_eq!(booking.customer_email(), "ada@example.com");

        let written = serde_json::to_value(&booking).unwrap();
        assert!(written.get("users").is_none());
    }

    #[test]
    fn test_missing_relations_fall_back() {
        let mut value = booking_json();
        value.as_object_mut().unwrap().remove("users");
        let booking: Booking = serde_json::from_value(value).unwrap();
        assert_eq!(booking.customer_name(), "Unknown");
        assert_eq!(booking.customer_email(), "");

        let review: Review = serde_json::from_value(json!({
            "id": "r1", "user_id": "u1", "booking_id": "b1", "rating": 4,
            "service_quality_rating": 4, "staff_rating": 5, "timeliness_rating": 3,
            "value_rating": 4, "would_recommend": true, "status": "pending",
            "created_at": "2024-03-01T09:30:00Z", "updated_at": "2024-03-01T09:30:00Z"
        }))
        .unwrap();
        assert_eq!(review.service_name(), "Unknown Service");
    }

    #[test]
    fn test_inherit_relations_keeps_embedded_user() {
        let previous: Booking = serde_json::from_value(booking_json()).unwrap();
        let mut incoming = previous.clone();
        incoming.users = None;
        incoming.status = BookingStatus::Completed;

        incoming.inherit_relations(&previous);
        assert_eq!(incoming.customer_name(), "Ada Obi");
        assert_eq!(incoming.status, BookingStatus::Completed);
    }

    #[test]
    fn test_status_parse_and_display() {
        assert_eq!("bi_weekly".parse::<BillingCycle>().unwrap(), BillingCycle::BiWeekly);
        assert_eq!(LaundryOrderStatus::OutForDelivery.to_string(), "out_for_delivery");
        assert!("shipped".parse::<BookingStatus>().is_err());
        assert!(LaundryOrderStatus::Drying.is_pending());
        assert!(!LaundryOrderStatus::Ready.is_pending());
    }

    #[test]
    fn test_calendar_day() {
        let day = NaiveDate::from_ymd_opt(2024, 1, 5).unwrap();
        assert_eq!(calendar_day("2024-01-05"), Some(day));
        assert_eq!(calendar_day("2024-01-05T23:10:00+00:00"), Some(day));
        assert_eq!(calendar_day("Jan 5"), None);
    }
}
