//! Headline figures derived from the mirrored tables

use chrono::NaiveDate;
use serde::Serialize;

use crate::models::{
    calendar_day, BookingStatus, NotificationStatus, PaymentStatus, ReviewStatus,
    SubscriptionStatus,
};
use crate::store::AppState;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DashboardStats {
    pub total_bookings: usize,
    /// Sum of completed booking amounts
    pub total_revenue: f64,
    /// Number of user profiles
    pub active_users: usize,
    pub pending_bookings: usize,
    pub completed_bookings: usize,
    /// Bookings whose service date is today
    pub today_bookings: usize,
    pub total_payments: usize,
    pub pending_payments: usize,
    pub active_subscriptions: usize,
    /// Laundry orders not yet out of processing
    pub pending_orders: usize,
    pub unread_notifications: usize,
    /// Mean review rating to one decimal place, 0 without reviews
    pub average_rating: f64,
    pub pending_reviews: usize,
}

/// Recompute every figure from scratch
pub fn compute(state: &AppState, today: NaiveDate) -> DashboardStats {
    let bookings_with = |status: BookingStatus| {
        state
            .bookings
            .iter()
            .filter(|b| b.status == status)
            .count()
    };

    let average_rating = if state.reviews.is_empty() {
        0.0
    } else {
        let total: u32 = state.reviews.iter().map(|r| u32::from(r.rating)).sum();
        let mean = f64::from(total) / state.reviews.len() as f64;
        (mean * 10.0).round() / 10.0
    };

    DashboardStats {
        total_bookings: state.bookings.len(),
        total_revenue: state
            .bookings
            .iter()
            .filter(|b| b.status == BookingStatus::Completed)
            .map(|b| b.total_amount)
            .sum(),
        active_users: state.users.len(),
        pending_bookings: bookings_with(BookingStatus::Pending),
        completed_bookings: bookings_with(BookingStatus::Completed),
        today_bookings: state
            .bookings
            .iter()
            .filter(|b| calendar_day(&b.date) == Some(today))
            .count(),
        total_payments: state.payments.len(),
        pending_payments: state
            .payments
            .iter()
            .filter(|p| p.payment_status == PaymentStatus::Pending)
            .count(),
        active_subscriptions: state
            .subscriptions
            .iter()
            .filter(|s| s.status == SubscriptionStatus::Active)
            .count(),
        pending_orders: state
            .laundry_orders
            .iter()
            .filter(|o| o.status.is_pending())
            .count(),
        unread_notifications: state
            .admin_notifications
            .iter()
            .filter(|n| n.status == NotificationStatus::Unread)
            .count(),
        average_rating,
        pending_reviews: state
            .reviews
            .iter()
            .filter(|r| r.status == ReviewStatus::Pending)
            .count(),
    }
}
