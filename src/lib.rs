//! Laundry Admin
//!
//! Back-office client for a cleaning and laundry service. It mirrors the
//! service's tables (bookings, customers, pickups, payments, subscriptions,
//! laundry orders, reviews and more) into a local [`store::Store`], keeps
//! the mirror current through realtime change feeds and derives the
//! figures shown on each dashboard tab.
//!
//! ```no_run
//! use laundry_admin::prelude::*;
//!
//! # async fn run() -> laundry_admin::Result<()> {
//! let client = DashboardClient::from_env()?;
//! client.fetch_admin_data().await?;
//! let sync = RealtimeSync::start(&client).await?;
//!
//! let stats = client.store().with_state(|state| state.stats.clone());
//! println!("{} bookings", stats.total_bookings);
//!
//! sync.stop().await?;
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod export;
pub mod format;
pub mod login;
pub mod models;
pub mod stats;
pub mod store;
pub mod sync;

#[cfg(test)]
pub(crate) mod testing;

pub use client::DashboardClient;
pub use config::{ClientOptions, DashboardConfig};
pub use error::{Error, Result};
pub use store::{reduce, Action, AppState, Store};
pub use sync::RealtimeSync;

pub use laundry_admin_auth as auth;
pub use laundry_admin_postgrest as postgrest;
pub use laundry_admin_realtime as realtime;

/// A convenience module for common imports
pub mod prelude {
    pub use crate::client::DashboardClient;
    pub use crate::config::{ClientOptions, DashboardConfig};
    pub use crate::dashboard::{StatusFilter, Tab};
    pub use crate::error::Error;
    pub use crate::models::*;
    pub use crate::store::{Action, AppState, Store, Table};
    pub use crate::sync::RealtimeSync;
}
