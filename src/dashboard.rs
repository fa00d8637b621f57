//! Dashboard tabs: derived figures and text rendering
//!
//! Every function here is a pure view over an [`AppState`] and the
//! current calendar day.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use std::fmt::Write as _;
use std::str::FromStr;

use crate::error::Error;
use crate::format::{format_currency, format_date, format_day};
use crate::models::{
    calendar_day, Booking, BookingStatus, ComplaintStatus, DeliveryStatus, DeliveryType,
    LaundryOrderStatus, NotificationStatus, SubscriptionStatus, User,
};
use crate::store::AppState;

/// Rows shown per list on the busier tabs
const LIST_LIMIT: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Overview,
    Bookings,
    Users,
    Contacts,
    Payments,
    Subscriptions,
    Laundry,
    Delivery,
    Notifications,
    Reviews,
    Complaints,
    Settings,
}

impl Tab {
    pub const ALL: [Tab; 12] = [
        Tab::Overview,
        Tab::Bookings,
        Tab::Users,
        Tab::Contacts,
        Tab::Payments,
        Tab::Subscriptions,
        Tab::Laundry,
        Tab::Delivery,
        Tab::Notifications,
        Tab::Reviews,
        Tab::Complaints,
        Tab::Settings,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            Tab::Overview => "overview",
            Tab::Bookings => "bookings",
            Tab::Users => "users",
            Tab::Contacts => "contacts",
            Tab::Payments => "payments",
            Tab::Subscriptions => "subscriptions",
            Tab::Laundry => "laundry",
            Tab::Delivery => "delivery",
            Tab::Notifications => "notifications",
            Tab::Reviews => "reviews",
            Tab::Complaints => "complaints",
            Tab::Settings => "settings",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Tab::Overview => "Overview",
            Tab::Bookings => "Bookings",
            Tab::Users => "Users",
            Tab::Contacts => "Contact Messages",
            Tab::Payments => "Payments",
            Tab::Subscriptions => "Subscriptions",
            Tab::Laundry => "Laundry Orders",
            Tab::Delivery => "Pickup & Delivery",
            Tab::Notifications => "Notifications",
            Tab::Reviews => "Reviews & Feedback",
            Tab::Complaints => "User Complaints",
            Tab::Settings => "Admin Settings",
        }
    }
}

impl FromStr for Tab {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Tab::ALL
            .into_iter()
            .find(|tab| tab.id() == wanted)
            .ok_or_else(|| {
                let ids: Vec<&str> = Tab::ALL.iter().map(Tab::id).collect();
                Error::InvalidArgument(format!(
                    "unknown tab '{}', expected one of: {}",
                    s,
                    ids.join(", ")
                ))
            })
    }
}

/// Status filter for the bookings list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    All,
    Only(BookingStatus),
}

impl FromStr for StatusFilter {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(StatusFilter::All),
            other => other.parse().map(StatusFilter::Only),
        }
    }
}

/// Bookings whose service name, phone or address contains `search`
/// (case-insensitive) and whose status passes `status`
pub fn filter_bookings<'a>(
    bookings: &'a [Booking],
    search: &str,
    status: StatusFilter,
) -> Vec<&'a Booking> {
    let needle = search.to_lowercase();
    bookings
        .iter()
        .filter(|b| {
            b.service_name.to_lowercase().contains(&needle)
                || b.phone.to_lowercase().contains(&needle)
                || b.address.to_lowercase().contains(&needle)
        })
        .filter(|b| match status {
            StatusFilter::All => true,
            StatusFilter::Only(wanted) => b.status == wanted,
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivityKind {
    Booking,
    Contact,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Activity {
    pub id: String,
    pub kind: ActivityKind,
    pub message: String,
    pub time: DateTime<Utc>,
    pub status: String,
}

/// The five most recently mirrored bookings and three most recently
/// mirrored contact messages, newest first, at most eight entries
pub fn recent_activity(state: &AppState) -> Vec<Activity> {
    let bookings = state.bookings.iter().rev().take(5).rev().map(|b| Activity {
        id: b.id.clone(),
        kind: ActivityKind::Booking,
        message: format!("New booking for {}", b.service_name),
        time: b.created_at,
        status: b.status.to_string(),
    });
    let messages = state
        .contact_messages
        .iter()
        .rev()
        .take(3)
        .rev()
        .map(|m| Activity {
            id: m.id.clone(),
            kind: ActivityKind::Contact,
            message: format!("New contact message from {}", m.name),
            time: m.created_at,
            status: m.status.to_string(),
        });

    let mut activity: Vec<Activity> = bookings.chain(messages).collect();
    activity.sort_by(|a, b| b.time.cmp(&a.time));
    activity.truncate(8);
    activity
}

#[derive(Debug, Clone, PartialEq)]
pub struct UserWithStats<'a> {
    pub user: &'a User,
    /// Sum of the user's completed bookings
    pub total_spent: f64,
    pub total_bookings: usize,
    /// Has booked at least once
    pub active: bool,
}

pub fn users_with_stats(state: &AppState) -> Vec<UserWithStats<'_>> {
    state
        .users
        .iter()
        .map(|user| {
            let bookings: Vec<&Booking> = state
                .bookings
                .iter()
                .filter(|b| b.user_id == user.id)
                .collect();
            UserWithStats {
                user,
                total_spent: bookings
                    .iter()
                    .filter(|b| b.status == BookingStatus::Completed)
                    .map(|b| b.total_amount)
                    .sum(),
                total_bookings: bookings.len(),
                active: !bookings.is_empty(),
            }
        })
        .collect()
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeliveryCounts {
    pub scheduled_pickups: usize,
    pub in_transit: usize,
    pub completed_today: usize,
    pub scheduled: usize,
}

pub fn delivery_counts(state: &AppState, today: NaiveDate) -> DeliveryCounts {
    let d = &state.pickup_deliveries;
    DeliveryCounts {
        scheduled_pickups: d
            .iter()
            .filter(|x| x.kind == DeliveryType::Pickup && x.status == DeliveryStatus::Scheduled)
            .count(),
        in_transit: d
            .iter()
            .filter(|x| x.status == DeliveryStatus::InTransit)
            .count(),
        completed_today: d
            .iter()
            .filter(|x| x.status == DeliveryStatus::Completed)
            .filter(|x| {
                let day = x.actual_date.as_deref().unwrap_or(&x.scheduled_date);
                calendar_day(day) == Some(today)
            })
            .count(),
        scheduled: d
            .iter()
            .filter(|x| x.status == DeliveryStatus::Scheduled)
            .count(),
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComplaintCounts {
    pub new: usize,
    pub investigating: usize,
    pub resolved: usize,
    pub this_month: usize,
}

pub fn complaint_counts(state: &AppState, today: NaiveDate) -> ComplaintCounts {
    let c = &state.user_complaints;
    let with = |status: ComplaintStatus| c.iter().filter(|x| x.status == status).count();
    ComplaintCounts {
        new: with(ComplaintStatus::New),
        investigating: with(ComplaintStatus::Investigating),
        resolved: with(ComplaintStatus::Resolved),
        this_month: c
            .iter()
            .filter(|x| {
                let created = x.created_at.date_naive();
                created.year() == today.year() && created.month() == today.month()
            })
            .count(),
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SubscriptionFigures {
    /// Sum of active plan amounts
    pub active_revenue: f64,
    /// Next billing date 1 to 7 days away
    pub expiring_soon: usize,
    pub cancelled: usize,
}

pub fn subscription_figures(state: &AppState, today: NaiveDate) -> SubscriptionFigures {
    let s = &state.subscriptions;
    SubscriptionFigures {
        active_revenue: s
            .iter()
            .filter(|x| x.status == SubscriptionStatus::Active)
            .map(|x| x.amount)
            .sum(),
        expiring_soon: s
            .iter()
            .filter_map(|x| calendar_day(&x.next_billing_date))
            .filter(|day| (1..=7).contains(&(*day - today).num_days()))
            .count(),
        cancelled: s
            .iter()
            .filter(|x| x.status == SubscriptionStatus::Cancelled)
            .count(),
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LaundryFigures {
    pub delivered_today: usize,
    pub revenue_today: f64,
}

pub fn laundry_figures(state: &AppState, today: NaiveDate) -> LaundryFigures {
    let delivered: Vec<f64> = state
        .laundry_orders
        .iter()
        .filter(|o| o.status == LaundryOrderStatus::Delivered)
        .filter(|o| o.updated_at.date_naive() == today)
        .map(|o| o.total_amount)
        .collect();
    LaundryFigures {
        delivered_today: delivered.len(),
        revenue_today: delivered.iter().sum(),
    }
}

/// Alerts created today
pub fn todays_alerts(state: &AppState, today: NaiveDate) -> usize {
    state
        .admin_notifications
        .iter()
        .filter(|n| n.created_at.date_naive() == today)
        .count()
}

/// Reviews rated four stars or more
pub fn positive_reviews(state: &AppState) -> usize {
    state.reviews.iter().filter(|r| r.rating >= 4).count()
}

/// Plain-text table with columns padded to the widest cell
fn text_table(headers: &[&str], rows: Vec<Vec<String>>) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in &rows {
        for (i, cell) in row.iter().enumerate() {
            if let Some(width) = widths.get_mut(i) {
                *width = (*width).max(cell.chars().count());
            }
        }
    }

    let render_line = |cells: Vec<String>| -> String {
        let padded: Vec<String> = cells
            .iter()
            .zip(&widths)
            .map(|(cell, width)| {
                let pad = width.saturating_sub(cell.chars().count());
                format!("{}{}", cell, " ".repeat(pad))
            })
            .collect();
        padded.join("  ").trim_end().to_string()
    };

    let mut out = render_line(headers.iter().map(|h| h.to_string()).collect());
    out.push('\n');
    out.push_str(&render_line(widths.iter().map(|w| "-".repeat(*w)).collect()));
    if rows.is_empty() {
        out.push_str("\n(none)");
    }
    for row in rows {
        out.push('\n');
        out.push_str(&render_line(row));
    }
    out
}

fn figure(out: &mut String, label: &str, value: impl std::fmt::Display) {
    let _ = writeln!(out, "{:<24}{}", format!("{}:", label), value);
}

/// Render one tab as text
pub fn render(tab: Tab, state: &AppState, today: NaiveDate) -> String {
    let mut out = format!("== {} ==\n", tab.label());

    match tab {
        Tab::Overview => {
            let s = &state.stats;
            figure(&mut out, "Total bookings", s.total_bookings);
            figure(&mut out, "Total revenue", format_currency(s.total_revenue));
            figure(&mut out, "Active users", s.active_users);
            figure(&mut out, "Pending bookings", s.pending_bookings);
            figure(&mut out, "Completed bookings", s.completed_bookings);
            figure(&mut out, "Today's bookings", s.today_bookings);
            figure(&mut out, "Payments", format!("{} ({} pending)", s.total_payments, s.pending_payments));
            figure(&mut out, "Active subscriptions", s.active_subscriptions);
            figure(&mut out, "Pending laundry orders", s.pending_orders);
            figure(&mut out, "Unread notifications", s.unread_notifications);
            figure(&mut out, "Average rating", format!("{:.1}", s.average_rating));
            figure(&mut out, "Pending reviews", s.pending_reviews);
            out.push_str("\nRecent activity\n");
            let rows = recent_activity(state)
                .into_iter()
                .map(|a| vec![format_date(a.time.date_naive()), a.message, a.status])
                .collect();
            out.push_str(&text_table(&["When", "Activity", "Status"], rows));
        }
        Tab::Bookings => {
            out.push_str(&render_bookings(&filter_bookings(&state.bookings, "", StatusFilter::All)));
        }
        Tab::Users => {
            let rows = users_with_stats(state)
                .into_iter()
                .map(|u| {
                    vec![
                        u.user.full_name.clone(),
                        u.user.email.clone(),
                        u.user.phone.clone().unwrap_or_default(),
                        u.total_bookings.to_string(),
                        format_currency(u.total_spent),
                        if u.active { "active" } else { "inactive" }.to_string(),
                        format_date(u.user.created_at.date_naive()),
                    ]
                })
                .collect();
            out.push_str(&text_table(
                &["Name", "Email", "Phone", "Bookings", "Spent", "Status", "Joined"],
                rows,
            ));
        }
        Tab::Contacts => {
            let rows = state
                .contact_messages
                .iter()
                .map(|m| {
                    vec![
                        m.name.clone(),
                        m.email.clone(),
                        m.message.clone(),
                        m.status.to_string(),
                        format_date(m.created_at.date_naive()),
                    ]
                })
                .collect();
            out.push_str(&text_table(&["From", "Email", "Message", "Status", "Received"], rows));
        }
        Tab::Payments => {
            let rows = state
                .payments
                .iter()
                .map(|p| {
                    vec![
                        p.customer_name().to_string(),
                        p.service_name().to_string(),
                        format_currency(p.amount),
                        p.payment_method.to_string(),
                        p.payment_status.to_string(),
                        format_day(&p.payment_date),
                    ]
                })
                .collect();
            out.push_str(&text_table(
                &["Customer", "Service", "Amount", "Method", "Status", "Date"],
                rows,
            ));
        }
        Tab::Subscriptions => {
            let f = subscription_figures(state, today);
            figure(&mut out, "Active subscriptions", state.stats.active_subscriptions);
            figure(&mut out, "Monthly revenue", format_currency(f.active_revenue));
            figure(&mut out, "Expiring soon", f.expiring_soon);
            figure(&mut out, "Cancelled", f.cancelled);
            let rows = state
                .subscriptions
                .iter()
                .take(LIST_LIMIT)
                .map(|s| {
                    vec![
                        s.customer_name().to_string(),
                        s.plan_name.clone(),
                        s.billing_cycle.to_string(),
                        format_currency(s.amount),
                        s.status.to_string(),
                        format_day(&s.next_billing_date),
                    ]
                })
                .collect();
            out.push_str(&text_table(
                &["Customer", "Plan", "Cycle", "Amount", "Status", "Next billing"],
                rows,
            ));
        }
        Tab::Laundry => {
            let f = laundry_figures(state, today);
            figure(&mut out, "Pending orders", state.stats.pending_orders);
            figure(&mut out, "Completed today", f.delivered_today);
            figure(&mut out, "Revenue today", format_currency(f.revenue_today));
            let rows = state
                .laundry_orders
                .iter()
                .take(LIST_LIMIT)
                .map(|o| {
                    vec![
                        o.order_number.clone(),
                        o.customer_name().to_string(),
                        o.service_type.to_string(),
                        o.item_count.to_string(),
                        o.status.to_string(),
                        format_currency(o.total_amount),
                        format_day(&o.delivery_date),
                    ]
                })
                .collect();
            out.push_str(&text_table(
                &["Order", "Customer", "Service", "Items", "Status", "Amount", "Delivery"],
                rows,
            ));
        }
        Tab::Delivery => {
            let c = delivery_counts(state, today);
            figure(&mut out, "Scheduled pickups", c.scheduled_pickups);
            figure(&mut out, "In transit", c.in_transit);
            figure(&mut out, "Completed today", c.completed_today);
            figure(&mut out, "Scheduled", c.scheduled);
            let rows = state
                .pickup_deliveries
                .iter()
                .map(|d| {
                    vec![
                        d.kind.to_string(),
                        d.customer_name().to_string(),
                        d.service_name().to_string(),
                        format!("{} {}", format_day(&d.scheduled_date), d.scheduled_time),
                        d.status.to_string(),
                        d.driver_name.clone().unwrap_or_default(),
                    ]
                })
                .collect();
            out.push_str(&text_table(
                &["Type", "Customer", "Service", "Scheduled", "Status", "Driver"],
                rows,
            ));
        }
        Tab::Notifications => {
            figure(&mut out, "Unread", state.stats.unread_notifications);
            figure(&mut out, "Today's alerts", todays_alerts(state, today));
            let rows = state
                .admin_notifications
                .iter()
                .filter(|n| n.status != NotificationStatus::Archived)
                .take(LIST_LIMIT)
                .map(|n| {
                    vec![
                        n.id.clone(),
                        n.kind.to_string(),
                        n.priority.to_string(),
                        n.title.clone(),
                        n.status.to_string(),
                        format_date(n.created_at.date_naive()),
                    ]
                })
                .collect();
            out.push_str(&text_table(
                &["ID", "Type", "Priority", "Title", "Status", "Created"],
                rows,
            ));
        }
        Tab::Reviews => {
            figure(&mut out, "Average rating", format!("{:.1}", state.stats.average_rating));
            figure(&mut out, "Total reviews", state.reviews.len());
            figure(&mut out, "Pending reviews", state.stats.pending_reviews);
            figure(&mut out, "Positive reviews", positive_reviews(state));
            let rows = state
                .reviews
                .iter()
                .take(LIST_LIMIT)
                .map(|r| {
                    vec![
                        r.id.clone(),
                        r.customer_name().to_string(),
                        r.service_name().to_string(),
                        format!("{}/5", r.rating),
                        r.title.clone().unwrap_or_default(),
                        r.status.to_string(),
                    ]
                })
                .collect();
            out.push_str(&text_table(
                &["ID", "Customer", "Service", "Rating", "Title", "Status"],
                rows,
            ));
        }
        Tab::Complaints => {
            let c = complaint_counts(state, today);
            figure(&mut out, "New", c.new);
            figure(&mut out, "Investigating", c.investigating);
            figure(&mut out, "Resolved", c.resolved);
            figure(&mut out, "This month", c.this_month);
            let rows = state
                .user_complaints
                .iter()
                .map(|c| {
                    vec![
                        c.customer_name().to_string(),
                        c.subject.clone(),
                        c.complaint_type.to_string(),
                        c.priority.to_string(),
                        c.status.to_string(),
                        format_date(c.created_at.date_naive()),
                    ]
                })
                .collect();
            out.push_str(&text_table(
                &["Customer", "Subject", "Type", "Priority", "Status", "Created"],
                rows,
            ));
        }
        Tab::Settings => {
            let signed_in = state
                .auth_user
                .as_ref()
                .and_then(|u| u.email.clone())
                .unwrap_or_else(|| "admin".to_string());
            figure(&mut out, "Signed in as", signed_in);
            figure(
                &mut out,
                "Realtime",
                if state.realtime_connected { "connected" } else { "disconnected" },
            );
            figure(&mut out, "Services offered", state.services.len());
        }
    }

    if let Some(error) = &state.error {
        let _ = write!(out, "\nLast error: {}", error);
    }
    out
}

/// Bookings list as a text table
pub fn render_bookings(bookings: &[&Booking]) -> String {
    let rows = bookings
        .iter()
        .map(|b| {
            vec![
                b.id.clone(),
                b.customer_name().to_string(),
                b.service_name.clone(),
                format!("{} {}", format_day(&b.date), b.time),
                b.status.to_string(),
                format_currency(b.total_amount),
            ]
        })
        .collect();
    text_table(
        &["ID", "Customer", "Service", "When", "Status", "Amount"],
        rows,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ReviewStatus;
    use crate::testing::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 10).unwrap()
    }

    #[test]
    fn test_tab_parse() {
        assert_eq!("Laundry".parse::<Tab>().unwrap(), Tab::Laundry);
        assert!("inbox".parse::<Tab>().is_err());
        for tab in Tab::ALL {
            assert_eq!(tab.id().parse::<Tab>().unwrap(), tab);
        }
    }

    #[test]
    fn test_filter_bookings() {
        let mut a = booking("b1", BookingStatus::Pending, "2024-06-10", 10.0);
        a.address = "5 Lekki Phase 1".to_string();
        let mut b = booking("b2", BookingStatus::Completed, "2024-06-10", 10.0);
        b.service_name = "Carpet Shampoo".to_string();
        let bookings = vec![a, b];

        let hits = filter_bookings(&bookings, "LEKKI", StatusFilter::All);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, "b1");

        let hits = filter_bookings(&bookings, "", "completed".parse().unwrap());
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, "b2");

        assert!(filter_bookings(&bookings, "carpet", StatusFilter::Only(BookingStatus::Pending)).is_empty());
        assert!("in-progress".parse::<StatusFilter>().is_err());
    }

    #[test]
    fn test_recent_activity_mixes_and_caps() {
        let mut state = AppState::default();
        state.bookings = (1..=7)
            .map(|d| booking(&format!("b{}", d), BookingStatus::Pending, &format!("2024-06-0{}", d), 1.0))
            .collect();
        state.contact_messages = vec![
            contact_message("m1", "2024-06-01T12:00:00Z"),
            contact_message("m2", "2024-06-05T12:00:00Z"),
            contact_message("m3", "2024-06-09T12:00:00Z"),
            contact_message("m4", "2024-06-04T12:00:00Z"),
        ];

        let activity = recent_activity(&state);
        let ids: Vec<&str> = activity.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["m3", "b7", "b6", "m2", "b5", "m4", "b4", "b3"]);
        assert_eq!(activity[0].kind, ActivityKind::Contact);
        assert_eq!(activity[1].message, "New booking for Regular Cleaning");
    }

    #[test]
    fn test_users_with_stats() {
        let mut state = AppState::default();
        state.users = vec![user("u1", "Ada"), user("u2", "Bo")];
        state.bookings = vec![
            booking("b1", BookingStatus::Completed, "2024-06-01", 100.0),
            booking("b2", BookingStatus::Pending, "2024-06-02", 40.0),
        ];

        let users = users_with_stats(&state);
        assert_eq!(users[0].total_bookings, 2);
        assert_eq!(users[0].total_spent, 100.0);
        assert!(users[0].active);
        assert_eq!(users[1].total_bookings, 0);
        assert!(!users[1].active);
    }

    #[test]
    fn test_delivery_and_complaint_counts() {
        let mut state = AppState::default();
        let mut done = delivery("d3", DeliveryType::Delivery, DeliveryStatus::Completed, "2024-06-08");
        done.actual_date = Some("2024-06-10".to_string());
        state.pickup_deliveries = vec![
            delivery("d1", DeliveryType::Pickup, DeliveryStatus::Scheduled, "2024-06-11"),
            delivery("d2", DeliveryType::Delivery, DeliveryStatus::InTransit, "2024-06-10"),
            done,
            delivery("d4", DeliveryType::Delivery, DeliveryStatus::Completed, "2024-06-09"),
        ];
        state.user_complaints = vec![
            complaint("c1", ComplaintStatus::New, "2024-06-02T10:00:00Z"),
            complaint("c2", ComplaintStatus::Resolved, "2024-05-30T10:00:00Z"),
            complaint("c3", ComplaintStatus::New, "2023-06-15T10:00:00Z"),
        ];

        assert_eq!(
            delivery_counts(&state, today()),
            DeliveryCounts {
                scheduled_pickups: 1,
                in_transit: 1,
                completed_today: 1,
                scheduled: 1,
            }
        );
        assert_eq!(
            complaint_counts(&state, today()),
            ComplaintCounts {
                new: 2,
                investigating: 0,
                resolved: 1,
                this_month: 1,
            }
        );
    }

    #[test]
    fn test_subscription_and_laundry_figures() {
        let mut state = AppState::default();
        state.subscriptions = vec![
            subscription("s1", SubscriptionStatus::Active, "2024-06-11", 5000.0),
            subscription("s2", SubscriptionStatus::Active, "2024-06-17", 7000.0),
            subscription("s3", SubscriptionStatus::Cancelled, "2024-06-10", 3000.0),
            subscription("s4", SubscriptionStatus::Paused, "2024-06-18", 3000.0),
        ];
        let mut delivered = laundry_order("o1", LaundryOrderStatus::Delivered);
        delivered.updated_at = ts("2024-06-10T15:00:00Z");
        let mut old = laundry_order("o2", LaundryOrderStatus::Delivered);
        old.updated_at = ts("2024-06-09T15:00:00Z");
        state.laundry_orders = vec![delivered, old, laundry_order("o3", LaundryOrderStatus::Washing)];

        let s = subscription_figures(&state, today());
        assert_eq!(s.active_revenue, 12000.0);
        assert_eq!(s.expiring_soon, 2);
        assert_eq!(s.cancelled, 1);

        let l = laundry_figures(&state, today());
        assert_eq!(l.delivered_today, 1);
        assert_eq!(l.revenue_today, 1500.0);
    }

    #[test]
    fn test_notifications_and_reviews() {
        let mut state = AppState::default();
        state.admin_notifications = vec![
            notification("n1", NotificationStatus::Unread, "2024-06-10T07:00:00Z"),
            notification("n2", NotificationStatus::Archived, "2024-06-10T08:00:00Z"),
            notification("n3", NotificationStatus::Read, "2024-06-01T08:00:00Z"),
        ];
        state.reviews = vec![
            review("r1", 5, ReviewStatus::Approved),
            review("r2", 3, ReviewStatus::Pending),
            review("r3", 4, ReviewStatus::Rejected),
        ];

        assert_eq!(todays_alerts(&state, today()), 2);
        assert_eq!(positive_reviews(&state), 2);

        let text = render(Tab::Notifications, &state, today());
        assert!(text.contains("n1"));
        assert!(!text.contains("n2"));
    }

    #[test]
    fn test_render_every_tab() {
        let mut state = AppState::default();
        state.bookings = vec![booking("b1", BookingStatus::Completed, "2024-06-10", 2500.0)];
        state.error = Some("Failed to fetch".to_string());
        for tab in Tab::ALL {
            let text = render(tab, &state, today());
            assert!(text.starts_with(&format!("== {} ==", tab.label())));
            assert!(text.ends_with("Last error: Failed to fetch"));
        }

        let bookings = render(Tab::Bookings, &state, today());
        assert!(bookings.contains("₦2,500.00"));
        assert!(bookings.contains("Jun 10, 2024 09:00"));
    }
}
