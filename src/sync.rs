//! Live merge of row changes into the store
//!
//! One realtime channel per table feeds inserts, updates and deletes into
//! the [`Store`]. A monitor task keeps `realtime_connected` equal to
//! "every channel is joined".

use laundry_admin_realtime::{
    ChangeKind, ChannelState, DatabaseChanges, PostgresChange, RealtimeClient, Subscription,
};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant};
use tracing::{debug, info, trace, warn};

use crate::client::DashboardClient;
use crate::config::MIN_PERIOD;
use crate::error::{Error, Result};
use crate::store::{Action, Row, Store, Table};

/// Tables followed live. Services only change through deploys.
pub const SYNCED_TABLES: [Table; 10] = [
    Table::Bookings,
    Table::ContactMessages,
    Table::Users,
    Table::PickupDeliveries,
    Table::UserComplaints,
    Table::Payments,
    Table::Subscriptions,
    Table::LaundryOrders,
    Table::AdminNotifications,
    Table::Reviews,
];

/// Channel name for a table's change feed
pub fn channel_name(table: Table) -> String {
    format!("{}_changes", table.name())
}

/// Running change-feed subscriptions
pub struct RealtimeSync {
    realtime: RealtimeClient,
    store: Store,
    _subscriptions: Vec<Subscription>,
    monitor: JoinHandle<()>,
}

impl RealtimeSync {
    /// Subscribe every synced table for `client`'s store
    pub async fn start(client: &DashboardClient) -> Result<Self> {
        let options = client.options();
        Self::start_with(
            client.realtime().await,
            client.store().clone(),
            options.realtime_initial_check,
            options.realtime_check_interval,
        )
        .await
    }

    /// Subscribe on an existing realtime client. The first connectivity
    /// check runs after `initial_check`, then every `check_interval`.
    pub async fn start_with(
        realtime: RealtimeClient,
        store: Store,
        initial_check: Duration,
        check_interval: Duration,
    ) -> Result<Self> {
        let mut subscriptions = Vec::with_capacity(SYNCED_TABLES.len());
        for table in SYNCED_TABLES {
            let feed = store.clone();
            let subscribed = realtime
                .channel(&channel_name(table))
                .on(DatabaseChanges::new(table.name()), move |change: PostgresChange| {
                    apply_change(&feed, table, change)
                })
                .subscribe()
                .await?;
            subscriptions.extend(subscribed);
        }
        info!(channels = SYNCED_TABLES.len(), "Realtime sync started");

        let monitor = tokio::spawn(watch_channels(
            realtime.clone(),
            store.clone(),
            initial_check,
            check_interval,
        ));

        Ok(Self {
            realtime,
            store,
            _subscriptions: subscriptions,
            monitor,
        })
    }

    pub fn realtime(&self) -> &RealtimeClient {
        &self.realtime
    }

    /// Stop monitoring and close the socket
    pub async fn stop(&self) -> Result<()> {
        self.monitor.abort();
        self.realtime.disconnect().await?;
        self.store.dispatch(Action::SetRealtimeConnected(false));
        info!("Realtime sync stopped");
        Ok(())
    }
}

impl Drop for RealtimeSync {
    fn drop(&mut self) {
        self.monitor.abort();
    }
}

async fn watch_channels(
    realtime: RealtimeClient,
    store: Store,
    initial_check: Duration,
    check_interval: Duration,
) {
    let mut ticks = interval_at(Instant::now() + initial_check, check_interval.max(MIN_PERIOD));
    loop {
        ticks.tick().await;

        let states = realtime.channel_states().await;
        let connected =
            !states.is_empty() && states.iter().all(|(_, state)| *state == ChannelState::Joined);

        if store.with_state(|s| s.realtime_connected) != connected {
            debug!(connected, "Realtime connectivity changed");
            store.dispatch(Action::SetRealtimeConnected(connected));
        }
    }
}

fn apply_change(store: &Store, table: Table, change: PostgresChange) {
    let kind = change.kind;
    match change_action(table, change) {
        Ok(action) => {
            trace!(table = table.name(), %kind, "Applying change");
            store.dispatch(action);
        }
        Err(e) => warn!(table = table.name(), %kind, error = %e, "Dropping undecodable change"),
    }
}

/// Store action for a change on `table`
pub fn change_action(table: Table, change: PostgresChange) -> Result<Action> {
    match change.kind {
        ChangeKind::Insert => Ok(Action::Add(changed_row(table, change)?)),
        ChangeKind::Update => Ok(Action::Update(changed_row(table, change)?)),
        ChangeKind::Delete => {
            let id = change
                .old_record
                .as_ref()
                .and_then(|r| r.get("id"))
                .and_then(|id| id.as_str())
                .ok_or_else(|| {
                    Error::InvalidArgument(format!("{} delete without old_record.id", table.name()))
                })?;
            Ok(Action::Delete {
                table,
                id: id.to_string(),
            })
        }
    }
}

fn changed_row(table: Table, change: PostgresChange) -> Result<Row> {
    let record = change.record.ok_or_else(|| {
        Error::InvalidArgument(format!("{} {} without a record", table.name(), change.kind))
    })?;
    Ok(Row::from_value(table, record)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn change(kind: ChangeKind, record: Option<Value>, old_record: Option<Value>) -> PostgresChange {
        PostgresChange {
            schema: "public".to_string(),
            table: "bookings".to_string(),
            commit_timestamp: None,
            kind,
            record,
            old_record,
        }
    }

    fn booking_record() -> Value {
        json!({
            "id": "b9", "user_id": "u1", "service_type": "regular",
            "service_name": "Regular Cleaning", "date": "2024-06-10", "time": "09:00",
            "address": "1 Allen Avenue", "phone": "0803", "status": "confirmed",
            "total_amount": 15000, "created_at": "2024-06-01T08:00:00Z",
            "updated_at": "2024-06-01T08:00:00Z"
        })
    }

    #[test]
    fn test_insert_and_update_decode_rows() {
        let action = change_action(
            Table::Bookings,
            change(ChangeKind::Insert, Some(booking_record()), None),
        )
        .unwrap();
        assert!(matches!(action, Action::Add(Row::Booking(ref b)) if b.id == "b9"));

        let action = change_action(
            Table::Bookings,
            change(ChangeKind::Update, Some(booking_record()), None),
        )
        .unwrap();
        assert!(matches!(action, Action::Update(Row::Booking(_))));
    }

    #[test]
    fn test_delete_uses_old_record_id() {
        let action = change_action(
            Table::Reviews,
            change(ChangeKind::Delete, Some(json!({})), Some(json!({ "id": "r3" }))),
        )
        .unwrap();
        assert_eq!(
            action,
            Action::Delete {
                table: Table::Reviews,
                id: "r3".to_string()
            }
        );
    }

    #[test]
    fn test_undecodable_changes_are_errors() {
        assert!(change_action(Table::Bookings, change(ChangeKind::Insert, None, None)).is_err());
        assert!(change_action(
            Table::Bookings,
            change(ChangeKind::Update, Some(json!({ "id": "b1" })), None)
        )
        .is_err());
        assert!(change_action(Table::Bookings, change(ChangeKind::Delete, None, None)).is_err());
    }

    #[test]
    fn test_bad_change_leaves_store_untouched() {
        let store = Store::new();
        apply_change(
            &store,
            Table::Bookings,
            change(ChangeKind::Insert, Some(json!({ "id": "b1" })), None),
        );
        assert_eq!(store.version(), 0);

        apply_change(
            &store,
            Table::Bookings,
            change(ChangeKind::Insert, Some(booking_record()), None),
        );
        assert_eq!(store.snapshot().bookings.len(), 1);
    }

    #[test]
    fn test_channel_names() {
        assert_eq!(channel_name(Table::PickupDeliveries), "pickup_deliveries_changes");
        assert!(!SYNCED_TABLES.contains(&Table::Services));
    }

    #[tokio::test]
    async fn test_monitor_survives_zero_interval() {
        let realtime = RealtimeClient::new("http://localhost:54321", "anon-key");
        let monitor = tokio::spawn(watch_channels(
            realtime,
            Store::new(),
            Duration::ZERO,
            Duration::ZERO,
        ));

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!monitor.is_finished());
        monitor.abort();
    }
}
