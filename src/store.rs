//! Local mirror of the backend tables
//!
//! [`reduce`] is a pure function from `(state, action, today)` to the next
//! state. [`Store`] wraps the state for sharing between the data client,
//! the realtime callbacks and the front end.

use chrono::{NaiveDate, Utc};
use std::sync::{Arc, PoisonError, RwLock};
use tokio::sync::broadcast;
use tracing::trace;

use crate::models::{
    AdminNotification, Booking, ContactMessage, LaundryOrder, Payment, PickupDelivery, Record,
    Review, Service, Subscription, User, UserComplaint,
};
use crate::stats::{self, DashboardStats};

/// Account behind the current session
pub type AuthUser = laundry_admin_auth::User;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppState {
    pub users: Vec<User>,
    pub bookings: Vec<Booking>,
    pub services: Vec<Service>,
    pub contact_messages: Vec<ContactMessage>,
    pub pickup_deliveries: Vec<PickupDelivery>,
    pub user_complaints: Vec<UserComplaint>,
    pub payments: Vec<Payment>,
    pub subscriptions: Vec<Subscription>,
    pub laundry_orders: Vec<LaundryOrder>,
    pub admin_notifications: Vec<AdminNotification>,
    pub reviews: Vec<Review>,
    pub current_user: Option<User>,
    pub auth_user: Option<AuthUser>,
    pub is_authenticated: bool,
    pub loading: bool,
    pub error: Option<String>,
    pub realtime_connected: bool,
    pub stats: DashboardStats,
}

/// The mirrored tables
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    Users,
    Bookings,
    Services,
    ContactMessages,
    PickupDeliveries,
    UserComplaints,
    Payments,
    Subscriptions,
    LaundryOrders,
    AdminNotifications,
    Reviews,
}

impl Table {
    pub const ALL: [Table; 11] = [
        Table::Users,
        Table::Bookings,
        Table::Services,
        Table::ContactMessages,
        Table::PickupDeliveries,
        Table::UserComplaints,
        Table::Payments,
        Table::Subscriptions,
        Table::LaundryOrders,
        Table::AdminNotifications,
        Table::Reviews,
    ];

    /// Backend table name
    pub fn name(&self) -> &'static str {
        match self {
            Table::Users => User::TABLE,
            Table::Bookings => Booking::TABLE,
            Table::Services => Service::TABLE,
            Table::ContactMessages => ContactMessage::TABLE,
            Table::PickupDeliveries => PickupDelivery::TABLE,
            Table::UserComplaints => UserComplaint::TABLE,
            Table::Payments => Payment::TABLE,
            Table::Subscriptions => Subscription::TABLE,
            Table::LaundryOrders => LaundryOrder::TABLE,
            Table::AdminNotifications => AdminNotification::TABLE,
            Table::Reviews => Review::TABLE,
        }
    }

    pub fn from_name(name: &str) -> Option<Table> {
        Table::ALL.into_iter().find(|t| t.name() == name)
    }
}

/// A whole collection, for `Action::Set`
#[derive(Debug, Clone, PartialEq)]
pub enum Rows {
    Users(Vec<User>),
    Bookings(Vec<Booking>),
    Services(Vec<Service>),
    ContactMessages(Vec<ContactMessage>),
    PickupDeliveries(Vec<PickupDelivery>),
    UserComplaints(Vec<UserComplaint>),
    Payments(Vec<Payment>),
    Subscriptions(Vec<Subscription>),
    LaundryOrders(Vec<LaundryOrder>),
    AdminNotifications(Vec<AdminNotification>),
    Reviews(Vec<Review>),
}

/// A single row, for `Action::Add` and `Action::Update`
#[derive(Debug, Clone, PartialEq)]
pub enum Row {
    User(User),
    Booking(Booking),
    Service(Service),
    ContactMessage(ContactMessage),
    PickupDelivery(PickupDelivery),
    UserComplaint(UserComplaint),
    Payment(Payment),
    Subscription(Subscription),
    LaundryOrder(LaundryOrder),
    AdminNotification(AdminNotification),
    Review(Review),
}

impl Row {
    /// Decode a JSON row image of `table`
    pub fn from_value(table: Table, value: serde_json::Value) -> serde_json::Result<Row> {
        Ok(match table {
            Table::Users => Row::User(serde_json::from_value(value)?),
            Table::Bookings => Row::Booking(serde_json::from_value(value)?),
            Table::Services => Row::Service(serde_json::from_value(value)?),
            Table::ContactMessages => Row::ContactMessage(serde_json::from_value(value)?),
            Table::PickupDeliveries => Row::PickupDelivery(serde_json::from_value(value)?),
            Table::UserComplaints => Row::UserComplaint(serde_json::from_value(value)?),
            Table::Payments => Row::Payment(serde_json::from_value(value)?),
            Table::Subscriptions => Row::Subscription(serde_json::from_value(value)?),
            Table::LaundryOrders => Row::LaundryOrder(serde_json::from_value(value)?),
            Table::AdminNotifications => Row::AdminNotification(serde_json::from_value(value)?),
            Table::Reviews => Row::Review(serde_json::from_value(value)?),
        })
    }
}

macro_rules! impl_from_row {
    ($($ty:ident => $row:ident, $rows:ident);+ $(;)?) => {
        $(
            impl From<$ty> for Row {
                fn from(row: $ty) -> Self {
                    Row::$row(row)
                }
            }

            impl From<Vec<$ty>> for Rows {
                fn from(rows: Vec<$ty>) -> Self {
                    Rows::$rows(rows)
                }
            }
        )+
    };
}

impl_from_row!(
    User => User, Users;
    Booking => Booking, Bookings;
    Service => Service, Services;
    ContactMessage => ContactMessage, ContactMessages;
    PickupDelivery => PickupDelivery, PickupDeliveries;
    UserComplaint => UserComplaint, UserComplaints;
    Payment => Payment, Payments;
    Subscription => Subscription, Subscriptions;
    LaundryOrder => LaundryOrder, LaundryOrders;
    AdminNotification => AdminNotification, AdminNotifications;
    Review => Review, Reviews;
);

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    SetLoading(bool),
    SetError(Option<String>),
    SetAuthUser(Option<AuthUser>),
    SetCurrentUser(Option<User>),
    Login { auth_user: AuthUser, user: User },
    Logout,
    SetRealtimeConnected(bool),
    UpdateStats,
    /// Replace a whole collection
    Set(Rows),
    /// Insert a row; replaces the mirrored copy when the id is already present
    Add(Row),
    /// Replace the row with the same id; no-op when absent
    Update(Row),
    /// Remove the row with this id; no-op when absent
    Delete { table: Table, id: String },
}

impl Action {
    fn mutates_rows(&self) -> bool {
        matches!(
            self,
            Action::Set(_)
                | Action::Add(_)
                | Action::Update(_)
                | Action::Delete { .. }
                | Action::UpdateStats
        )
    }
}

fn insert<T: Record>(rows: &mut Vec<T>, row: T) {
    if !replace(rows, row.clone()) {
        rows.push(row);
    }
}

fn replace<T: Record>(rows: &mut [T], mut row: T) -> bool {
    match rows.iter_mut().find(|existing| existing.id() == row.id()) {
        Some(existing) => {
            row.inherit_relations(existing);
            *existing = row;
            true
        }
        None => false,
    }
}

fn remove<T: Record>(rows: &mut Vec<T>, id: &str) {
    rows.retain(|row| row.id() != id);
}

fn set_rows(state: &mut AppState, rows: Rows) {
    match rows {
        Rows::Users(rows) => state.users = rows,
        Rows::Bookings(rows) => state.bookings = rows,
        Rows::Services(rows) => state.services = rows,
        Rows::ContactMessages(rows) => state.contact_messages = rows,
        Rows::PickupDeliveries(rows) => state.pickup_deliveries = rows,
        Rows::UserComplaints(rows) => state.user_complaints = rows,
        Rows::Payments(rows) => state.payments = rows,
        Rows::Subscriptions(rows) => state.subscriptions = rows,
        Rows::LaundryOrders(rows) => state.laundry_orders = rows,
        Rows::AdminNotifications(rows) => state.admin_notifications = rows,
        Rows::Reviews(rows) => state.reviews = rows,
    }
}

fn add_row(state: &mut AppState, row: Row) {
    match row {
        Row::User(row) => insert(&mut state.users, row),
        Row::Booking(row) => insert(&mut state.bookings, row),
        Row::Service(row) => insert(&mut state.services, row),
        Row::ContactMessage(row) => insert(&mut state.contact_messages, row),
        Row::PickupDelivery(row) => insert(&mut state.pickup_deliveries, row),
        Row::UserComplaint(row) => insert(&mut state.user_complaints, row),
        Row::Payment(row) => insert(&mut state.payments, row),
        Row::Subscription(row) => insert(&mut state.subscriptions, row),
        Row::LaundryOrder(row) => insert(&mut state.laundry_orders, row),
        Row::AdminNotification(row) => insert(&mut state.admin_notifications, row),
        Row::Review(row) => insert(&mut state.reviews, row),
    }
}

fn update_row(state: &mut AppState, row: Row) {
    let found = match row {
        Row::User(row) => {
            if state.current_user.as_ref().map(|u| u.id.as_str()) == Some(row.id.as_str()) {
                state.current_user = Some(row.clone());
            }
            replace(&mut state.users, row)
        }
        Row::Booking(row) => replace(&mut state.bookings, row),
        Row::Service(row) => replace(&mut state.services, row),
        Row::ContactMessage(row) => replace(&mut state.contact_messages, row),
        Row::PickupDelivery(row) => replace(&mut state.pickup_deliveries, row),
        Row::UserComplaint(row) => replace(&mut state.user_complaints, row),
        Row::Payment(row) => replace(&mut state.payments, row),
        Row::Subscription(row) => replace(&mut state.subscriptions, row),
        Row::LaundryOrder(row) => replace(&mut state.laundry_orders, row),
        Row::AdminNotification(row) => replace(&mut state.admin_notifications, row),
        Row::Review(row) => replace(&mut state.reviews, row),
    };
    if !found {
        trace!("update for a row that is not mirrored, ignoring");
    }
}

fn delete_row(state: &mut AppState, table: Table, id: &str) {
    match table {
        Table::Users => remove(&mut state.users, id),
        Table::Bookings => remove(&mut state.bookings, id),
        Table::Services => remove(&mut state.services, id),
        Table::ContactMessages => remove(&mut state.contact_messages, id),
        Table::PickupDeliveries => remove(&mut state.pickup_deliveries, id),
        Table::UserComplaints => remove(&mut state.user_complaints, id),
        Table::Payments => remove(&mut state.payments, id),
        Table::Subscriptions => remove(&mut state.subscriptions, id),
        Table::LaundryOrders => remove(&mut state.laundry_orders, id),
        Table::AdminNotifications => remove(&mut state.admin_notifications, id),
        Table::Reviews => remove(&mut state.reviews, id),
    }
}

/// Apply `action` to `state`. Statistics are recomputed after every
/// change to a collection, using `today` for the date-based figures.
pub fn reduce(mut state: AppState, action: Action, today: NaiveDate) -> AppState {
    let recompute = action.mutates_rows();

    match action {
        Action::SetLoading(loading) => state.loading = loading,
        Action::SetError(error) => state.error = error,
        Action::SetAuthUser(auth_user) => {
            state.is_authenticated = auth_user.is_some();
            state.auth_user = auth_user;
        }
        Action::SetCurrentUser(user) => state.current_user = user,
        Action::Login { auth_user, user } => {
            state.auth_user = Some(auth_user);
            state.current_user = Some(user);
            state.is_authenticated = true;
        }
        Action::Logout => {
            state.auth_user = None;
            state.current_user = None;
            state.is_authenticated = false;
        }
        Action::SetRealtimeConnected(connected) => state.realtime_connected = connected,
        Action::UpdateStats => {}
        Action::Set(rows) => set_rows(&mut state, rows),
        Action::Add(row) => add_row(&mut state, row),
        Action::Update(row) => update_row(&mut state, row),
        Action::Delete { table, id } => delete_row(&mut state, table, &id),
    }

    if recompute {
        state.stats = stats::compute(&state, today);
    }
    state
}

struct Versioned {
    state: AppState,
    version: u64,
}

/// Shared, observable application state
#[derive(Clone)]
pub struct Store {
    inner: Arc<RwLock<Versioned>>,
    changes: broadcast::Sender<u64>,
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}

impl Store {
    pub fn new() -> Self {
        let (changes, _) = broadcast::channel(64);
        Self {
            inner: Arc::new(RwLock::new(Versioned {
                state: AppState::default(),
                version: 0,
            })),
            changes,
        }
    }

    /// Reduce `action` into the state and notify subscribers
    pub fn dispatch(&self, action: Action) {
        let today = Utc::now().date_naive();
        let version = {
            let mut guard = self.inner.write().unwrap_or_else(PoisonError::into_inner);
            let state = std::mem::take(&mut guard.state);
            guard.state = reduce(state, action, today);
            guard.version += 1;
            guard.version
        };
        // No receivers is fine
        let _ = self.changes.send(version);
    }

    /// Clone of the current state
    pub fn snapshot(&self) -> AppState {
        self.with_state(AppState::clone)
    }

    /// Read the state without cloning it
    pub fn with_state<R>(&self, f: impl FnOnce(&AppState) -> R) -> R {
        let guard = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        f(&guard.state)
    }

    /// Number of actions applied so far
    pub fn version(&self) -> u64 {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .version
    }

    /// Receive the new version after each dispatch
    pub fn subscribe(&self) -> broadcast::Receiver<u64> {
        self.changes.subscribe()
    }
}
