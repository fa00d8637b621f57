//! Realtime client for the laundry admin dashboard
//!
//! Subscribes to row changes pushed by the hosted database over the
//! Phoenix websocket protocol and tracks whether each channel is joined.

mod channel;
mod client;
mod error;
mod message;

pub use channel::{ChannelBuilder, ChannelState, DatabaseChanges, Subscription};
pub use client::{ConnectionState, RealtimeClient, RealtimeClientOptions};
pub use error::RealtimeError;
pub use message::{ChangeKind, ChannelEvent, PostgresChange, RealtimeMessage};
