use futures_util::{SinkExt, StreamExt};
use laundry_admin_realtime::{
    ChangeKind, ChannelEvent, ChannelState, ConnectionState, DatabaseChanges, PostgresChange,
    RealtimeClient, RealtimeClientOptions, RealtimeMessage,
};
use serde_json::json;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;

/// How the mock server answers a join
#[derive(Clone, Copy)]
enum JoinBehaviour {
    /// Reply ok, then push one booking insert
    AcceptAndPush,
    /// Reply with an error status
    Reject,
    /// Reply ok, then drop the socket
    AcceptAndHangUp,
}

async fn start_mock_server(behaviour: JoinBehaviour) -> (String, tokio::task::JoinHandle<()>) {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let handle = tokio::spawn(async move {
        let Ok((stream, _)) = listener.accept().await else {
            return;
        };
        let Ok(mut ws) = tokio_tungstenite::accept_async(stream).await else {
            return;
        };

        while let Some(Ok(msg)) = ws.next().await {
            if !msg.is_text() {
                continue;
            }
            let Ok(parsed) = serde_json::from_str::<RealtimeMessage>(msg.to_text().unwrap()) else {
                continue;
            };
            if parsed.event != ChannelEvent::PhoenixJoin {
                continue;
            }

            let status = match behaviour {
                JoinBehaviour::Reject => "error",
                _ => "ok",
            };
            let reply = json!({
                "topic": parsed.topic,
                "event": "phx_reply",
                "payload": { "status": status, "response": {} },
                "ref": parsed.message_ref,
            });
            if ws.send(Message::Text(reply.to_string())).await.is_err() {
                break;
            }

            match behaviour {
                JoinBehaviour::AcceptAndPush => {
                    let change = json!({
                        "topic": parsed.topic,
                        "event": "postgres_changes",
                        "payload": {
                            "ids": [1],
                            "data": {
                                "schema": "public",
                                "table": "bookings",
                                "commit_timestamp": "2024-01-01T00:00:00Z",
                                "type": "INSERT",
                                "record": { "id": "b1", "status": "pending" },
                                "old_record": null
                            }
                        },
                        "ref": null
                    });
                    let _ = ws.send(Message::Text(change.to_string())).await;
                }
                JoinBehaviour::AcceptAndHangUp => {
                    tokio::time::sleep(Duration::from_millis(50)).await;
                    let _ = ws.close(None).await;
                    break;
                }
                JoinBehaviour::Reject => {}
            }
        }
    });

    (format!("ws://{}/socket/websocket", addr), handle)
}

async fn wait_for_state(client: &RealtimeClient, name: &str, expected: ChannelState) {
    let waited = tokio::time::timeout(Duration::from_secs(2), async {
        loop {
            if client.channel_state(name).await == Some(expected) {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await;
    assert!(
        waited.is_ok(),
        "channel {} never reached {:?}, last state {:?}",
        name,
        expected,
        client.channel_state(name).await
    );
}

#[tokio::test]
async fn test_join_and_receive_change() {
    let (url, server) = start_mock_server(JoinBehaviour::AcceptAndPush).await;
    let client = RealtimeClient::new(&url, "anon-key");

    let (tx, mut rx) = mpsc::unbounded_channel::<PostgresChange>();
    let _subs = client
        .channel("bookings_changes")
        .on(DatabaseChanges::new("bookings"), move |change| {
            let _ = tx.send(change);
        })
        .subscribe()
        .await
        .unwrap();

    assert_eq!(client.get_connection_state().await, ConnectionState::Connected);
    wait_for_state(&client, "bookings_changes", ChannelState::Joined).await;

    let change = tokio::time::timeout(Duration::from_secs(2), rx.recv())
        .await
        .expect("timed out waiting for change")
        .expect("listener dropped");
    assert_eq!(change.kind, ChangeKind::Insert);
    assert_eq!(change.table, "bookings");
    assert_eq!(change.row_id(), Some("b1"));

    client.disconnect().await.unwrap();
    assert_eq!(client.get_connection_state().await, ConnectionState::Disconnected);
    assert_eq!(
        client.channel_state("bookings_changes").await,
        Some(ChannelState::Closed)
    );
    let _ = tokio::time::timeout(Duration::from_secs(1), server).await;
}

#[tokio::test]
async fn test_zero_heartbeat_interval_keeps_reading() {
    let (url, _server) = start_mock_server(JoinBehaviour::AcceptAndPush).await;
    let options = RealtimeClientOptions {
        heartbeat_interval: 0,
        ..Default::default()
    };
    let client = RealtimeClient::new_with_options(&url, "anon-key", options);

    let (tx, mut rx) = mpsc::unbounded_channel::<PostgresChange>();
    let _subs = client
        .channel("laundry_orders_changes")
        .on(DatabaseChanges::new("laundry_orders"), move |change| {
            let _ = tx.send(change);
        })
        .subscribe()
        .await
        .unwrap();

    wait_for_state(&client, "laundry_orders_changes", ChannelState::Joined).await;
    let change = tokio::time::timeout(Duration::from_secs(2), rx.recv())
        .await
        .expect("timed out waiting for change");
    assert!(change.is_some());

    client.disconnect().await.unwrap();
}

#[tokio::test]
async fn test_rejected_join_marks_channel_errored() {
    let (url, _server) = start_mock_server(JoinBehaviour::Reject).await;
    let client = RealtimeClient::new(&url, "anon-key");

    let _subs = client
        .channel("payments_changes")
        .on(DatabaseChanges::new("payments"), |_| {})
        .subscribe()
        .await
        .unwrap();

    wait_for_state(&client, "payments_changes", ChannelState::Errored).await;
    client.disconnect().await.unwrap();
}

#[tokio::test]
async fn test_server_hang_up_closes_channels() {
    let (url, _server) = start_mock_server(JoinBehaviour::AcceptAndHangUp).await;
    let client = RealtimeClient::new(&url, "anon-key");
    let mut states = client.on_state_change();

    let _subs = client
        .channel("users_changes")
        .on(DatabaseChanges::new("users"), |_| {})
        .subscribe()
        .await
        .unwrap();

    wait_for_state(&client, "users_changes", ChannelState::Closed).await;

    let disconnected = tokio::time::timeout(Duration::from_secs(2), async {
        while let Ok(state) = states.recv().await {
            if state == ConnectionState::Disconnected {
                return true;
            }
        }
        false
    })
    .await;
    assert_eq!(disconnected, Ok(true));
}

#[tokio::test]
async fn test_connect_failure_reports_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = RealtimeClient::new(&format!("http://{}", addr), "anon-key");
    let result = client
        .channel("reviews_changes")
        .on(DatabaseChanges::new("reviews"), |_| {})
        .subscribe()
        .await;

    assert!(result.is_err());
    assert_eq!(client.get_connection_state().await, ConnectionState::Disconnected);
}
