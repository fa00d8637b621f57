use crate::client::{ConnectionState, RealtimeClient};
use crate::error::RealtimeError;
use crate::message::{ChangeKind, ChannelEvent, PostgresChange, RealtimeMessage};
use log::{debug, error, trace, warn};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Row-change listener configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseChanges {
    schema: String,
    table: String,
    event: Option<ChangeKind>,
    filter: Option<String>,
}

impl DatabaseChanges {
    /// Listen to every change on `public.<table>`
    pub fn new(table: &str) -> Self {
        Self {
            schema: "public".to_string(),
            table: table.to_string(),
            event: None,
            filter: None,
        }
    }

    pub fn schema(mut self, schema: &str) -> Self {
        self.schema = schema.to_string();
        self
    }

    /// Only deliver one kind of change
    pub fn event(mut self, event: ChangeKind) -> Self {
        self.event = Some(event);
        self
    }

    /// Server-side row filter such as `user_id=eq.42`
    pub fn filter(mut self, filter: &str) -> Self {
        self.filter = Some(filter.to_string());
        self
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub(crate) fn to_join_config(&self) -> Value {
        let mut config = json!({
            "event": self.event.map(|e| e.to_string()).unwrap_or_else(|| "*".to_string()),
            "schema": self.schema,
            "table": self.table,
        });
        if let Some(filter) = &self.filter {
            config["filter"] = json!(filter);
        }
        config
    }

    pub(crate) fn matches(&self, change: &PostgresChange) -> bool {
        self.schema == change.schema
            && self.table == change.table
            && self.event.map_or(true, |kind| kind == change.kind)
    }
}

/// Join lifecycle of a channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelState {
    Closed,
    Joining,
    Joined,
    Errored,
    Leaving,
}

type CallbackFn = Box<dyn Fn(PostgresChange) + Send + Sync>;

pub(crate) struct Channel {
    topic: String,
    callbacks: RwLock<HashMap<String, (DatabaseChanges, CallbackFn)>>,
    state: RwLock<ChannelState>,
    join_ref: RwLock<Option<String>>,
}

impl Channel {
    fn new(topic: &str) -> Self {
        Self {
            topic: topic.to_string(),
            callbacks: RwLock::new(HashMap::new()),
            state: RwLock::new(ChannelState::Closed),
            join_ref: RwLock::new(None),
        }
    }

    pub(crate) fn topic(&self) -> &str {
        &self.topic
    }

    pub(crate) async fn state(&self) -> ChannelState {
        *self.state.read().await
    }

    pub(crate) async fn set_state(&self, state: ChannelState) {
        let mut current = self.state.write().await;
        if *current != state {
            debug!("Channel {} {:?} -> {:?}", self.topic, *current, state);
            *current = state;
        }
    }

    async fn begin_join(&self, join_ref: &str) {
        *self.join_ref.write().await = Some(join_ref.to_string());
        self.set_state(ChannelState::Joining).await;
    }

    async fn unsubscribe(&self, id: &str) {
        if self.callbacks.write().await.remove(id).is_some() {
            debug!("Removed listener {} from {}", id, self.topic);
        }
    }

    pub(crate) async fn handle_message(&self, message: RealtimeMessage) {
        match message.event {
            ChannelEvent::PostgresChanges => {
                let change = match PostgresChange::from_payload(&message.payload) {
                    Ok(change) => change,
                    Err(e) => {
                        error!("Bad postgres_changes payload on {}: {}", self.topic, e);
                        return;
                    }
                };
                let callbacks = self.callbacks.read().await;
                for (changes, callback) in callbacks.values() {
                    if changes.matches(&change) {
                        callback(change.clone());
                    }
                }
            }
            ChannelEvent::PhoenixReply => {
                let is_join_reply = {
                    let join_ref = self.join_ref.read().await;
                    join_ref.is_some() && join_ref.as_deref() == message.ref_str()
                };
                if !is_join_reply {
                    trace!("Reply on {} for ref {:?}", self.topic, message.message_ref);
                    return;
                }
                match message.payload.get("status").and_then(Value::as_str) {
                    Some("ok") => self.set_state(ChannelState::Joined).await,
                    status => {
                        warn!(
                            "Join of {} rejected ({:?}): {}",
                            self.topic, status, message.payload
                        );
                        self.set_state(ChannelState::Errored).await;
                    }
                }
            }
            ChannelEvent::System => {
                if message.payload.get("status").and_then(Value::as_str) == Some("error") {
                    warn!("System error on {}: {}", self.topic, message.payload);
                    self.set_state(ChannelState::Errored).await;
                } else {
                    debug!("System message on {}: {}", self.topic, message.payload);
                }
            }
            ChannelEvent::PhoenixError => {
                warn!("Channel {} errored: {}", self.topic, message.payload);
                self.set_state(ChannelState::Errored).await;
            }
            ChannelEvent::PhoenixClose => {
                self.set_state(ChannelState::Closed).await;
            }
            other => trace!("Unhandled event {} on {}", other, self.topic),
        }
    }
}

/// Handle for one registered listener. Dropping it removes the listener.
pub struct Subscription {
    id: String,
    channel: Arc<Channel>,
}

impl Subscription {
    pub fn topic(&self) -> &str {
        self.channel.topic()
    }

    pub async fn state(&self) -> ChannelState {
        self.channel.state().await
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            return;
        };
        let id = self.id.clone();
        let channel = self.channel.clone();
        handle.spawn(async move {
            channel.unsubscribe(&id).await;
        });
    }
}

/// Builder for channel listeners
pub struct ChannelBuilder<'a> {
    client: &'a RealtimeClient,
    topic: String,
    db_callbacks: Vec<(String, DatabaseChanges, CallbackFn)>,
}

impl<'a> ChannelBuilder<'a> {
    pub(crate) fn new(client: &'a RealtimeClient, topic: &str) -> Self {
        Self {
            client,
            topic: topic.to_string(),
            db_callbacks: Vec::new(),
        }
    }

    /// Register a row-change callback
    pub fn on<F>(mut self, changes: DatabaseChanges, callback: F) -> Self
    where
        F: Fn(PostgresChange) + Send + Sync + 'static,
    {
        let id = uuid::Uuid::new_v4().to_string();
        self.db_callbacks.push((id, changes, Box::new(callback)));
        self
    }

    /// Connect if needed, register the callbacks and send the join.
    ///
    /// Returns once the join is sent; the channel reports `Joined` after
    /// the server acknowledges it.
    pub async fn subscribe(self) -> Result<Vec<Subscription>, RealtimeError> {
        if self.client.get_connection_state().await != ConnectionState::Connected {
            self.client.connect().await?;
        }

        let channel = self
            .client
            .channels
            .write()
            .await
            .entry(self.topic.clone())
            .or_insert_with(|| Arc::new(Channel::new(&self.topic)))
            .clone();

        let mut subscriptions = Vec::with_capacity(self.db_callbacks.len());
        {
            let mut callbacks = channel.callbacks.write().await;
            for (id, changes, callback) in self.db_callbacks {
                callbacks.insert(id.clone(), (changes, callback));
                subscriptions.push(Subscription {
                    id,
                    channel: channel.clone(),
                });
            }
        }

        let postgres_changes: Vec<Value> = channel
            .callbacks
            .read()
            .await
            .values()
            .map(|(changes, _)| changes.to_join_config())
            .collect();
        let mut payload = json!({
            "config": {
                "broadcast": { "ack": false, "self": false },
                "presence": { "key": "" },
                "postgres_changes": postgres_changes,
            }
        });
        if let Some(token) = self.client.access_token.read().await.clone() {
            payload["access_token"] = json!(token);
        }

        let join_ref = self.client.next_ref();
        channel.begin_join(&join_ref).await;
        let sent = self
            .client
            .send_message(json!({
                "topic": self.topic,
                "event": ChannelEvent::PhoenixJoin,
                "payload": payload,
                "ref": join_ref,
                "join_ref": join_ref,
            }))
            .await;
        if let Err(e) = sent {
            channel.set_state(ChannelState::Errored).await;
            return Err(e);
        }

        debug!("Join sent for {}", self.topic);
        Ok(subscriptions)
    }
}
