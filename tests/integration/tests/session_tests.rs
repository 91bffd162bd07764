//! End-to-end chat session tests
//!
//! Each test wires the real client stack (REST client, STOMP transport,
//! session manager) against in-process mocks over loopback.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use serde_json::Value;
use tokio::net::TcpListener;
use tokio::sync::mpsc;

use integration_tests::{
    fast_reconnect, message_json, mint_token, page_json, realtime_config, rest_config, room_json,
    BrokerEvent, MockBroker, MockRestServer,
};
use matchpoint_common::{AppError, StaticCredentials};
use matchpoint_realtime::StompTransport;
use matchpoint_rest::ChatApi;
use matchpoint_session::ChatSession;

const TEST_USER: i64 = 42;
const ROOM: i64 = 7;

async fn session_against(rest: &MockRestServer, ws_url: &str) -> Result<ChatSession> {
    let credentials = Arc::new(StaticCredentials::with_token(&mint_token(TEST_USER)));
    let backend = Arc::new(ChatApi::new(
        &rest_config(&rest.base_url()),
        credentials.clone(),
    )?);
    let transport = Arc::new(StompTransport::new(realtime_config(ws_url), credentials));
    Ok(ChatSession::with_parts(
        transport,
        backend,
        fast_reconnect(),
        20,
    ))
}

// ============================================================
// Handshake
// ============================================================

#[tokio::test]
async fn test_connect_handshake_carries_bearer_token() -> Result<()> {
    let rest = MockRestServer::start().await?;
    let broker = MockBroker::start().await?;
    let session = session_against(&rest, broker.url()).await?;

    session.transport().connect().await?;

    match broker.next_event().await? {
        BrokerEvent::Connected { authorization } => {
            let header = authorization.expect("handshake must carry a credential");
            assert!(header.starts_with("Bearer "));
        }
        other => panic!("expected a CONNECT, got {other:?}"),
    }
    assert!(session.transport().is_connected());

    session.shutdown();
    Ok(())
}

// ============================================================
// History merged with live delivery
// ============================================================

#[tokio::test]
async fn test_open_room_merges_history_with_live_push() -> Result<()> {
    let rest = MockRestServer::start().await?;
    let broker = MockBroker::start().await?;

    // Backend serves history newest-first; the timeline normalizes to ascending
    rest.set_history_page(
        None,
        page_json(
            vec![
                message_json(3, ROOM, 9, 30),
                message_json(2, ROOM, TEST_USER, 20),
                message_json(1, ROOM, 9, 10),
            ],
            None,
            false,
        ),
    );

    let session = session_against(&rest, broker.url()).await?;
    session.transport().connect().await?;

    let mut handle = session.open_room(ROOM).await?;
    assert!(handle.has_live_feed());
    let (sub_id, destination) = broker.await_subscribed().await?;
    assert!(sub_id.starts_with("sub-"));
    assert_eq!(destination, format!("/topic/chat/room/{ROOM}"));

    // Opening the room marks it read exactly once
    assert_eq!(rest.mark_read_calls(), 1);

    broker.push_message(ROOM, &message_json(4, ROOM, 9, 40));
    assert!(handle.wait_live().await);

    let ids: Vec<i64> = handle.timeline().messages().iter().map(|m| m.id).collect();
    assert_eq!(ids, vec![1, 2, 3, 4]);

    session.shutdown();
    Ok(())
}

#[tokio::test]
async fn test_close_unsubscribes_room_topic() -> Result<()> {
    let rest = MockRestServer::start().await?;
    let broker = MockBroker::start().await?;
    rest.set_history_page(None, page_json(vec![], None, false));

    let session = session_against(&rest, broker.url()).await?;
    session.transport().connect().await?;

    let mut handle = session.open_room(ROOM).await?;
    let (sub_id, _) = broker.await_subscribed().await?;

    handle.close();
    match broker.next_event().await? {
        BrokerEvent::Unsubscribed { id } => assert_eq!(id, sub_id),
        other => panic!("expected an UNSUBSCRIBE, got {other:?}"),
    }

    session.shutdown();
    Ok(())
}

// ============================================================
// Publishing
// ============================================================

#[tokio::test]
async fn test_send_publishes_sender_from_token() -> Result<()> {
    let rest = MockRestServer::start().await?;
    let broker = MockBroker::start().await?;
    let session = session_against(&rest, broker.url()).await?;
    session.transport().connect().await?;

    session.send(ROOM, "court 3 at six?")?;

    let (destination, body) = broker.await_sent().await?;
    assert_eq!(destination, "/app/chat/message");
    let body: Value = serde_json::from_str(&body)?;
    assert_eq!(body["roomId"], ROOM);
    assert_eq!(body["senderId"], TEST_USER);
    assert_eq!(body["message"], "court 3 at six?");

    session.shutdown();
    Ok(())
}

// ============================================================
// Protocol errors
// ============================================================

#[tokio::test]
async fn test_broker_error_keeps_live_session() -> Result<()> {
    let rest = MockRestServer::start().await?;
    let broker = MockBroker::start().await?;
    rest.set_history_page(None, page_json(vec![], None, false));

    let session = session_against(&rest, broker.url()).await?;
    session.transport().connect().await?;

    let (error_tx, mut error_rx) = mpsc::unbounded_channel();
    session.transport().on_error(move |err| {
        let _ = error_tx.send(err.error_code());
    });

    let mut handle = session.open_room(ROOM).await?;
    broker.await_subscribed().await?;

    broker.push_error("no subscription for destination");
    let code = tokio::time::timeout(Duration::from_secs(5), error_rx.recv())
        .await?
        .expect("error callback must fire");
    assert_eq!(code, "TRANSPORT_PROTOCOL");
    assert!(session.transport().is_connected());

    // The subscription still delivers after the error
    broker.push_message(ROOM, &message_json(1, ROOM, 9, 10));
    assert!(handle.wait_live().await);
    assert_eq!(handle.timeline().messages().len(), 1);

    session.shutdown();
    Ok(())
}

// ============================================================
// Degraded mode
// ============================================================

#[tokio::test]
async fn test_retry_exhaustion_degrades_but_rest_survives() -> Result<()> {
    let rest = MockRestServer::start().await?;
    rest.set_history_page(
        None,
        page_json(vec![message_json(1, ROOM, 9, 10)], None, false),
    );

    // A port that was bound and released: connections are refused
    let dead_port = {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        listener.local_addr()?.port()
    };
    let dead_url = format!("ws://127.0.0.1:{dead_port}");

    let session = session_against(&rest, &dead_url).await?;
    let mut state = session.watch_session_state();

    session.connect_with_retry();
    tokio::time::timeout(
        Duration::from_secs(10),
        state.wait_for(|s| s.is_degraded()),
    )
    .await??;

    // Realtime operations fail fast, REST-backed flows keep working
    assert!(matches!(
        session.send(ROOM, "anyone there?"),
        Err(AppError::NotConnected)
    ));
    let handle = session.open_room(ROOM).await?;
    assert!(!handle.has_live_feed());
    assert_eq!(handle.timeline().messages().len(), 1);

    session.shutdown();
    Ok(())
}

// ============================================================
// Room list and room creation
// ============================================================

#[tokio::test]
async fn test_room_list_pagination_over_http() -> Result<()> {
    let rest = MockRestServer::start().await?;
    let broker = MockBroker::start().await?;

    let first: Vec<Value> = (1..=20).map(|i| room_json(i, i * 10, i + 100, 0)).collect();
    rest.push_room_page(page_json(first, Some("c1"), true));
    let second: Vec<Value> = (21..=25).map(|i| room_json(i, i * 10, i + 100, 0)).collect();
    rest.push_room_page(page_json(second, None, false));

    let session = session_against(&rest, broker.url()).await?;
    let mut rooms = session.room_list();

    rooms.load_initial().await?;
    assert_eq!(rooms.rooms().len(), 20);
    assert!(rooms.has_next());

    rooms.load_more().await?;
    assert_eq!(rooms.rooms().len(), 25);
    assert!(!rooms.has_next());
    assert_eq!(rooms.rooms()[20].id, 21);

    Ok(())
}

#[tokio::test]
async fn test_create_room_round_trip() -> Result<()> {
    let rest = MockRestServer::start().await?;
    let broker = MockBroker::start().await?;
    let session = session_against(&rest, broker.url()).await?;

    let room = session.create_room(55, 9).await?;
    assert_eq!(room.id, 900);
    assert_eq!(room.match_id, 55);
    assert_eq!(room.partner_id, 9);

    Ok(())
}
