//! Data client for the dashboard
//!
//! [`DashboardClient`] talks to the auth and REST services and keeps the
//! [`Store`] in step with every successful call. Mutating calls raise the
//! loading flag and clear the last error first; any failure is recorded in
//! the store before it is returned.

use chrono::Utc;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};
use std::future::Future;
use tracing::{debug, error, info, warn};

use laundry_admin_auth::{Auth, AuthOptions};
use laundry_admin_postgrest::{PostgrestClient, SortOrder};
use laundry_admin_realtime::{RealtimeClient, RealtimeClientOptions};

use crate::config::{ClientOptions, DashboardConfig};
use crate::error::{Error, Result};
use crate::models::*;
use crate::store::{Action, AuthUser, Row, Rows, Store, Table};

/// Client for the dashboard's backend
#[derive(Clone)]
pub struct DashboardClient {
    config: DashboardConfig,
    options: ClientOptions,
    http_client: Client,
    auth: Auth,
    store: Store,
}

impl DashboardClient {
    pub fn new(config: DashboardConfig, options: ClientOptions) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = options.request_timeout {
            builder = builder.timeout(timeout);
        }
        let http_client = builder.build()?;

        let auth = Auth::new(
            &config.url,
            &config.anon_key,
            http_client.clone(),
            AuthOptions {
                persist_session: options.persist_session,
            },
        );

        Ok(Self {
            config,
            options,
            http_client,
            auth,
            store: Store::new(),
        })
    }

    /// Build a client from the environment with default options
    pub fn from_env() -> Result<Self> {
        Self::new(DashboardConfig::from_env()?, ClientOptions::default())
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    pub fn options(&self) -> &ClientOptions {
        &self.options
    }

    pub fn auth(&self) -> &Auth {
        &self.auth
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    /// Query builder for `table`, authorised with the session token when
    /// signed in and with the anon key otherwise
    pub fn from(&self, table: &str) -> Result<PostgrestClient> {
        let mut query = PostgrestClient::new(
            &self.config.url,
            &self.config.anon_key,
            table,
            self.http_client.clone(),
        )
        .schema(&self.options.db_schema)?;

        if let Some(session) = self.auth.get_session() {
            query = query.with_auth(&session.access_token)?;
        }
        Ok(query)
    }

    /// Realtime client for this project, carrying the session token
    pub async fn realtime(&self) -> RealtimeClient {
        let client = RealtimeClient::new_with_options(
            &self.config.url,
            &self.config.anon_key,
            RealtimeClientOptions {
                heartbeat_interval: self.options.heartbeat_interval.as_millis() as u64,
                ..Default::default()
            },
        );
        client
            .set_auth(self.auth.get_session().map(|s| s.access_token))
            .await;
        client
    }

    async fn mutate<T>(&self, what: &str, work: impl Future<Output = Result<T>>) -> Result<T> {
        self.store.dispatch(Action::SetLoading(true));
        self.store.dispatch(Action::SetError(None));

        let result = work.await;
        if let Err(e) = &result {
            error!(error = %e, "{} failed", what);
            self.store.dispatch(Action::SetError(Some(e.to_string())));
        }

        self.store.dispatch(Action::SetLoading(false));
        result
    }

    async fn fetch<T>(&self, what: &str, work: impl Future<Output = Result<T>>) -> Result<T> {
        let result = work.await;
        if let Err(e) = &result {
            error!(error = %e, "{} failed", what);
            self.store.dispatch(Action::SetError(Some(e.to_string())));
        }
        result
    }

    /// Run `query` and replace the mirrored collection with the result
    async fn load<T>(&self, query: PostgrestClient) -> Result<Vec<T>>
    where
        T: Record,
        Vec<T>: Into<Rows>,
    {
        let rows: Vec<T> = query.execute().await?;
        debug!(table = T::TABLE, rows = rows.len(), "Fetched rows");
        self.store.dispatch(Action::Set(rows.clone().into()));
        Ok(rows)
    }

    async fn insert_row<T, V>(&self, values: &V) -> Result<T>
    where
        T: Record + Into<Row>,
        V: Serialize,
    {
        let written = self.from(T::TABLE)?.insert(values).await?;
        let row: T = single_row(written, T::TABLE)?;
        info!(table = T::TABLE, id = row.id(), "Inserted row");
        self.store.dispatch(Action::Add(row.clone().into()));
        Ok(row)
    }

    async fn update_row<T, V>(&self, id: &str, updates: &V) -> Result<T>
    where
        T: Record + Into<Row>,
        V: Serialize,
    {
        let written = self.from(T::TABLE)?.eq("id", id).update(updates).await?;
        let row: T = single_row(written, T::TABLE)?;
        info!(table = T::TABLE, id, "Updated row");
        self.store.dispatch(Action::Update(row.clone().into()));
        Ok(row)
    }

    async fn delete_row(&self, table: Table, id: &str) -> Result<()> {
        self.from(table.name())?.eq("id", id).delete().await?;
        info!(table = table.name(), id, "Deleted row");
        self.store.dispatch(Action::Delete {
            table,
            id: id.to_string(),
        });
        Ok(())
    }

    // Auth

    /// Register an account; `full_name` is stored in the user metadata
    pub async fn sign_up(&self, email: &str, password: &str, full_name: &str) -> Result<AuthUser> {
        self.mutate("sign up", async {
            let response = self
                .auth
                .sign_up(email, password, Some(json!({ "full_name": full_name })))
                .await?;
            let user = response.user().clone();
            self.store.dispatch(Action::SetAuthUser(Some(user.clone())));
            Ok(user)
        })
        .await
    }

    /// Sign in with a password and load the profile row
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<AuthUser> {
        self.mutate("sign in", async {
            let session = self.auth.sign_in_with_password(email, password).await?;
            self.adopt(session.user).await
        })
        .await
    }

    pub async fn sign_out(&self) -> Result<()> {
        self.mutate("sign out", async {
            self.auth.sign_out().await?;
            self.store.dispatch(Action::Logout);
            Ok(())
        })
        .await
    }

    /// Send a reset link pointing at `<site_url>/reset-password`
    pub async fn reset_password(&self, email: &str) -> Result<()> {
        let redirect = format!("{}/reset-password", self.config.site_url);
        self.mutate("reset password", async {
            self.auth
                .reset_password_for_email(email, Some(&redirect))
                .await?;
            Ok(())
        })
        .await
    }

    /// Pick up an existing session. Returns the account when one is active.
    pub async fn initialize(&self) -> Result<Option<AuthUser>> {
        if self.auth.get_session().is_none() {
            debug!("No session to restore");
            return Ok(None);
        }

        self.mutate("restore session", async {
            match self.auth.get_user().await {
                Ok(user) => self.adopt(user).await.map(Some),
                Err(e) => {
                    warn!(error = %e, "Stored session rejected, signing out locally");
                    self.auth.set_session(None);
                    self.store.dispatch(Action::Logout);
                    Err(e.into())
                }
            }
        })
        .await
    }

    /// Record `auth_user` as signed in and load its profile
    async fn adopt(&self, auth_user: AuthUser) -> Result<AuthUser> {
        let profile = self
            .from(User::TABLE)?
            .select("*")
            .eq("id", &auth_user.id)
            .execute_one::<User>()
            .await;

        match profile {
            Ok(user) => {
                info!(id = %auth_user.id, "Signed in");
                self.store.dispatch(Action::Login {
                    auth_user: auth_user.clone(),
                    user,
                });
            }
            Err(e) => {
                warn!(id = %auth_user.id, error = %e, "Signed in without a profile row");
                self.store
                    .dispatch(Action::SetAuthUser(Some(auth_user.clone())));
                self.store.dispatch(Action::SetCurrentUser(None));
            }
        }
        Ok(auth_user)
    }

    // Bookings

    /// Book a service for the signed-in user. Fails with
    /// [`Error::NotAuthenticated`] before touching the store when signed out.
    pub async fn create_booking(&self, booking: &NewBooking) -> Result<Booking> {
        let user_id = self
            .store
            .with_state(|s| s.auth_user.as_ref().map(|u| u.id.clone()))
            .ok_or(Error::NotAuthenticated)?;

        self.mutate("create booking", async {
            let values = with_fields(booking, json!({ "user_id": user_id }))?;
            self.insert_row(&values).await
        })
        .await
    }

    pub async fn update_booking<V: Serialize>(&self, id: &str, updates: &V) -> Result<Booking> {
        self.mutate("update booking", self.update_row(id, updates))
            .await
    }

    pub async fn delete_booking(&self, id: &str) -> Result<()> {
        self.mutate("delete booking", self.delete_row(Table::Bookings, id))
            .await
    }

    /// The signed-in user's bookings, newest first. Empty when signed out.
    pub async fn fetch_user_bookings(&self) -> Result<Vec<Booking>> {
        let Some(user_id) = self
            .store
            .with_state(|s| s.auth_user.as_ref().map(|u| u.id.clone()))
        else {
            return Ok(Vec::new());
        };

        self.fetch("fetch user bookings", async {
            let query = self
                .from(Booking::TABLE)?
                .select("*")
                .eq("user_id", &user_id)
                .order("created_at", SortOrder::Descending);
            self.load(query).await
        })
        .await
    }

    pub async fn fetch_all_bookings(&self) -> Result<Vec<Booking>> {
        self.fetch("fetch bookings", async {
            let query = self
                .from(Booking::TABLE)?
                .select("*")
                .inner_join("users", "full_name,email,phone")
                .order("created_at", SortOrder::Descending);
            self.load(query).await
        })
        .await
    }

    /// Active services by name
    pub async fn fetch_services(&self) -> Result<Vec<Service>> {
        self.fetch("fetch services", async {
            let query = self
                .from(Service::TABLE)?
                .select("*")
                .eq("is_active", "true")
                .order("name", SortOrder::Ascending);
            self.load(query).await
        })
        .await
    }

    // Contact messages

    pub async fn create_contact_message(&self, message: &NewContactMessage) -> Result<ContactMessage> {
        self.mutate("send contact message", async {
            let values = with_fields(message, json!({ "status": ContactStatus::New }))?;
            self.insert_row(&values).await
        })
        .await
    }

    pub async fn fetch_contact_messages(&self) -> Result<Vec<ContactMessage>> {
        self.fetch("fetch contact messages", async {
            let query = self
                .from(ContactMessage::TABLE)?
                .select("*")
                .order("created_at", SortOrder::Descending);
            self.load(query).await
        })
        .await
    }

    pub async fn update_contact_message<V: Serialize>(
        &self,
        id: &str,
        updates: &V,
    ) -> Result<ContactMessage> {
        self.mutate("update contact message", self.update_row(id, updates))
            .await
    }

    // Users

    pub async fn fetch_all_users(&self) -> Result<Vec<User>> {
        self.fetch("fetch users", async {
            let query = self
                .from(User::TABLE)?
                .select("*")
                .order("created_at", SortOrder::Descending);
            self.load(query).await
        })
        .await
    }

    pub async fn update_user<V: Serialize>(&self, id: &str, updates: &V) -> Result<User> {
        self.mutate("update user", self.update_row(id, updates))
            .await
    }

    pub async fn delete_user(&self, id: &str) -> Result<()> {
        self.mutate("delete user", self.delete_row(Table::Users, id))
            .await
    }

    // Pickup and delivery

    pub async fn fetch_pickup_deliveries(&self) -> Result<Vec<PickupDelivery>> {
        self.fetch("fetch pickup deliveries", async {
            let query = self
                .from(PickupDelivery::TABLE)?
                .select("*")
                .inner_join("users", "full_name,email,phone")
                .inner_join("bookings", "service_name")
                .order("created_at", SortOrder::Descending);
            self.load(query).await
        })
        .await
    }

    pub async fn create_pickup_delivery(&self, delivery: &NewPickupDelivery) -> Result<PickupDelivery> {
        self.mutate("create pickup delivery", self.insert_row(delivery))
            .await
    }

    pub async fn update_pickup_delivery<V: Serialize>(
        &self,
        id: &str,
        updates: &V,
    ) -> Result<PickupDelivery> {
        self.mutate("update pickup delivery", self.update_row(id, updates))
            .await
    }

    // Complaints

    pub async fn fetch_user_complaints(&self) -> Result<Vec<UserComplaint>> {
        self.fetch("fetch complaints", async {
            let query = self
                .from(UserComplaint::TABLE)?
                .select("*")
                .inner_join("users", "full_name,email,phone")
                .order("created_at", SortOrder::Descending);
            self.load(query).await
        })
        .await
    }

    pub async fn create_user_complaint(&self, complaint: &NewComplaint) -> Result<UserComplaint> {
        self.mutate("create complaint", self.insert_row(complaint))
            .await
    }

    pub async fn update_user_complaint<V: Serialize>(
        &self,
        id: &str,
        updates: &V,
    ) -> Result<UserComplaint> {
        self.mutate("update complaint", self.update_row(id, updates))
            .await
    }

    // Payments

    pub async fn fetch_payments(&self) -> Result<Vec<Payment>> {
        self.fetch("fetch payments", async {
            let query = self
                .from(Payment::TABLE)?
                .select("*")
                .inner_join("users", "full_name,email")
                .inner_join("bookings", "service_name")
                .order("created_at", SortOrder::Descending);
            self.load(query).await
        })
        .await
    }

    pub async fn create_payment(&self, payment: &NewPayment) -> Result<Payment> {
        self.mutate("create payment", self.insert_row(payment))
            .await
    }

    pub async fn update_payment<V: Serialize>(&self, id: &str, updates: &V) -> Result<Payment> {
        self.mutate("update payment", self.update_row(id, updates))
            .await
    }

    // Subscriptions

    pub async fn fetch_subscriptions(&self) -> Result<Vec<Subscription>> {
        self.fetch("fetch subscriptions", async {
            let query = self
                .from(Subscription::TABLE)?
                .select("*")
                .inner_join("users", "full_name,email,phone")
                .order("created_at", SortOrder::Descending);
            self.load(query).await
        })
        .await
    }

    pub async fn create_subscription(&self, subscription: &NewSubscription) -> Result<Subscription> {
        self.mutate("create subscription", self.insert_row(subscription))
            .await
    }

    pub async fn update_subscription<V: Serialize>(
        &self,
        id: &str,
        updates: &V,
    ) -> Result<Subscription> {
        self.mutate("update subscription", self.update_row(id, updates))
            .await
    }

    // Laundry orders

    pub async fn fetch_laundry_orders(&self) -> Result<Vec<LaundryOrder>> {
        self.fetch("fetch laundry orders", async {
            let query = self
                .from(LaundryOrder::TABLE)?
                .select("*")
                .inner_join("users", "full_name,email,phone")
                .order("created_at", SortOrder::Descending);
            self.load(query).await
        })
        .await
    }

    pub async fn create_laundry_order(&self, order: &NewLaundryOrder) -> Result<LaundryOrder> {
        self.mutate("create laundry order", self.insert_row(order))
            .await
    }

    pub async fn update_laundry_order<V: Serialize>(
        &self,
        id: &str,
        updates: &V,
    ) -> Result<LaundryOrder> {
        self.mutate("update laundry order", self.update_row(id, updates))
            .await
    }

    // Admin notifications

    pub async fn fetch_admin_notifications(&self) -> Result<Vec<AdminNotification>> {
        self.fetch("fetch notifications", async {
            let query = self
                .from(AdminNotification::TABLE)?
                .select("*")
                .order("created_at", SortOrder::Descending);
            self.load(query).await
        })
        .await
    }

    pub async fn create_admin_notification(
        &self,
        notification: &NewNotification,
    ) -> Result<AdminNotification> {
        self.mutate("create notification", self.insert_row(notification))
            .await
    }

    pub async fn update_admin_notification<V: Serialize>(
        &self,
        id: &str,
        updates: &V,
    ) -> Result<AdminNotification> {
        self.mutate("update notification", self.update_row(id, updates))
            .await
    }

    pub async fn mark_notification_as_read(&self, id: &str) -> Result<AdminNotification> {
        let updates = json!({
            "status": NotificationStatus::Read,
            "read_at": Utc::now().to_rfc3339(),
        });
        self.update_admin_notification(id, &updates).await
    }

    pub async fn archive_notification(&self, id: &str) -> Result<AdminNotification> {
        self.update_admin_notification(id, &json!({ "status": NotificationStatus::Archived }))
            .await
    }

    // Reviews

    pub async fn fetch_reviews(&self) -> Result<Vec<Review>> {
        self.fetch("fetch reviews", async {
            let query = self
                .from(Review::TABLE)?
                .select("*")
                .inner_join("users", "full_name,email")
                .inner_join("bookings", "service_name")
                .order("created_at", SortOrder::Descending);
            self.load(query).await
        })
        .await
    }

    pub async fn update_review<V: Serialize>(&self, id: &str, updates: &V) -> Result<Review> {
        self.mutate("update review", self.update_row(id, updates))
            .await
    }

    /// Publish a review, optionally with a reply
    pub async fn approve_review(&self, id: &str, response: Option<&str>) -> Result<Review> {
        self.update_review(id, &moderation(ReviewStatus::Approved, response))
            .await
    }

    pub async fn reject_review(&self, id: &str, response: Option<&str>) -> Result<Review> {
        self.update_review(id, &moderation(ReviewStatus::Rejected, response))
            .await
    }

    /// Load every table the dashboard shows. Each table is fetched even
    /// when an earlier one fails; the first failure is returned.
    pub async fn fetch_admin_data(&self) -> Result<()> {
        self.store.dispatch(Action::SetLoading(true));

        let results = [
            self.fetch_contact_messages().await.map(drop),
            self.fetch_all_users().await.map(drop),
            self.fetch_all_bookings().await.map(drop),
            self.fetch_pickup_deliveries().await.map(drop),
            self.fetch_user_complaints().await.map(drop),
            self.fetch_admin_notifications().await.map(drop),
            self.fetch_services().await.map(drop),
            self.fetch_payments().await.map(drop),
            self.fetch_subscriptions().await.map(drop),
            self.fetch_laundry_orders().await.map(drop),
            self.fetch_reviews().await.map(drop),
        ];

        self.store.dispatch(Action::SetLoading(false));
        results.into_iter().collect()
    }
}

fn moderation(status: ReviewStatus, response: Option<&str>) -> Value {
    let mut updates = json!({ "status": status });
    if let Some(response) = response {
        updates["admin_response"] = json!(response);
    }
    updates
}

/// Serialize `row` and merge the fields of `extra` into it
fn with_fields<T: Serialize>(row: &T, extra: Value) -> Result<Value> {
    let mut value = serde_json::to_value(row)?;
    if let (Some(target), Value::Object(fields)) = (value.as_object_mut(), extra) {
        target.extend(fields);
    }
    Ok(value)
}

/// Decode the row a write returned. PostgREST answers writes with an
/// array of the affected rows.
fn single_row<T: DeserializeOwned>(written: Value, table: &str) -> Result<T> {
    let row = match written {
        Value::Array(rows) => rows.into_iter().next(),
        Value::Null => None,
        other => Some(other),
    };
    let row = row.ok_or_else(|| Error::NotFound(format!("no {} row was returned", table)))?;
    Ok(serde_json::from_value(row)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_fields_merges() {
        let message = NewContactMessage {
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            phone: None,
            message: "Hello".to_string(),
        };
        let value = with_fields(&message, json!({ "status": ContactStatus::New })).unwrap();
        assert_eq!(
            value,
            json!({ "name": "Ada", "email": "ada@example.com", "message": "Hello", "status": "new" })
        );
    }

    #[test]
    fn test_single_row() {
        let row: Value = single_row(json!([{ "id": "a" }, { "id": "b" }]), "bookings").unwrap();
        assert_eq!(row["id"], "a");

        let row: Value = single_row(json!({ "id": "c" }), "bookings").unwrap();
        assert_eq!(row["id"], "c");

        let empty = single_row::<Value>(json!([]), "bookings");
        assert!(matches!(empty, Err(Error::NotFound(_))));
        assert!(single_row::<Value>(Value::Null, "bookings").is_err());
    }

    #[test]
    fn test_moderation_omits_missing_response() {
        assert_eq!(
            moderation(ReviewStatus::Approved, None),
            json!({ "status": "approved" })
        );
        assert_eq!(
            moderation(ReviewStatus::Rejected, Some("Not about us")),
            json!({ "status": "rejected", "admin_response": "Not about us" })
        );
    }

    #[test]
    fn test_client_rejects_bad_schema_header() {
        let config = DashboardConfig::new("http://localhost:54321", "anon").unwrap();
        let options = ClientOptions::default().with_db_schema("bad\nschema");
        let client = DashboardClient::new(config, options).unwrap();
        assert!(client.from("bookings").is_err());
    }
}
