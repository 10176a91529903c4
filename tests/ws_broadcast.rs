//! End-to-end broadcast tests over real WebSocket connections.
#![allow(clippy::panic)]

use std::net::SocketAddr;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::tungstenite::{self, Message};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

use lending_realtime::api::build_app;
use lending_realtime::app_state::AppState;
use lending_realtime::config::BrokerConfig;
use lending_realtime::domain::RoomId;
use lending_realtime::hub::{Hub, HubHandle};

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

async fn start_server() -> (SocketAddr, HubHandle) {
    let config = BrokerConfig::default();
    let (hub, _task) = Hub::spawn(config.hub_intake_capacity);
    let app = build_app(AppState::new(hub.clone(), &config));

    let listener = tokio_test::assert_ok!(TcpListener::bind("127.0.0.1:0").await);
    let addr = tokio_test::assert_ok!(listener.local_addr());
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    (addr, hub)
}

fn room(key: &str) -> RoomId {
    let Ok(room) = RoomId::new(key) else {
        panic!("invalid test room {key}");
    };
    room
}

async fn connect(addr: SocketAddr, room_key: &str) -> Socket {
    let url = format!("ws://{addr}/api/v1/ws/{room_key}");
    let (socket, _response) = tokio_test::assert_ok!(connect_async(url).await);
    socket
}

async fn wait_for_subscribers(hub: &HubHandle, room_key: &str, expected: usize) {
    for _ in 0..400 {
        if hub.room_subscribers(&room(room_key)).await.ok() == Some(expected) {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("room {room_key} never reached {expected} subscribers");
}

async fn publish(addr: SocketAddr, room_key: &str, body: impl Into<reqwest::Body>) {
    let url = format!("http://{addr}/api/v1/rooms/{room_key}/events");
    let response = tokio_test::assert_ok!(reqwest::Client::new().post(url).body(body).send().await);
    assert_eq!(response.status(), reqwest::StatusCode::ACCEPTED);
}

/// Next data frame, skipping keepalive traffic.
async fn next_data(socket: &mut Socket) -> Message {
    loop {
        let Ok(Some(Ok(frame))) = tokio::time::timeout(Duration::from_secs(5), socket.next()).await
        else {
            panic!("no frame received");
        };
        if !matches!(frame, Message::Ping(_) | Message::Pong(_)) {
            return frame;
        }
    }
}

async fn assert_silent(socket: &mut Socket) {
    if let Ok(frame) = tokio::time::timeout(Duration::from_millis(200), socket.next()).await {
        panic!("unexpected frame: {frame:?}");
    }
}

#[tokio::test]
async fn members_of_a_room_each_receive_one_copy() {
    let (addr, hub) = start_server().await;
    let mut a = connect(addr, "r1").await;
    let mut b = connect(addr, "r1").await;
    let mut other = connect(addr, "r2").await;
    wait_for_subscribers(&hub, "r1", 2).await;
    wait_for_subscribers(&hub, "r2", 1).await;

    publish(addr, "r1", "hello").await;

    assert_eq!(next_data(&mut a).await, Message::text("hello"));
    assert_eq!(next_data(&mut b).await, Message::text("hello"));
    assert_silent(&mut a).await;
    assert_silent(&mut b).await;
    assert_silent(&mut other).await;
}

#[tokio::test]
async fn departed_client_leaves_no_room_behind() {
    let (addr, hub) = start_server().await;
    let mut a = connect(addr, "r1").await;
    wait_for_subscribers(&hub, "r1", 1).await;

    tokio_test::assert_ok!(a.close(None).await);
    wait_for_subscribers(&hub, "r1", 0).await;

    publish(addr, "r1", "hello").await;
    let listing: serde_json::Value = tokio_test::assert_ok!(
        tokio_test::assert_ok!(reqwest::get(format!("http://{addr}/api/v1/rooms")).await)
            .json()
            .await
    );
    assert_eq!(listing["total_rooms"], 0);
}

#[tokio::test]
async fn concurrent_rooms_never_cross() {
    let (addr, hub) = start_server().await;
    let (a, b) = tokio::join!(connect(addr, "r1"), connect(addr, "r2"));
    let (mut a, mut b) = (a, b);
    wait_for_subscribers(&hub, "r1", 1).await;
    wait_for_subscribers(&hub, "r2", 1).await;

    tokio::join!(publish(addr, "r1", "msg-r1"), publish(addr, "r2", "msg-r2"));

    assert_eq!(next_data(&mut a).await, Message::text("msg-r1"));
    assert_eq!(next_data(&mut b).await, Message::text("msg-r2"));
    assert_silent(&mut a).await;
    assert_silent(&mut b).await;
}

#[tokio::test]
async fn payloads_arrive_in_publish_order() {
    let (addr, hub) = start_server().await;
    let mut feed = connect(addr, "offers").await;
    wait_for_subscribers(&hub, "offers", 1).await;

    for n in 0..20_u32 {
        hub.publish(RoomId::offers_feed(), format!(r#"{{"offer":{n}}}"#))
            .await;
    }
    for n in 0..20_u32 {
        assert_eq!(
            next_data(&mut feed).await,
            Message::text(format!(r#"{{"offer":{n}}}"#))
        );
    }
}

#[tokio::test]
async fn binary_payload_is_delivered_verbatim() {
    let (addr, hub) = start_server().await;
    let mut a = connect(addr, "blob").await;
    wait_for_subscribers(&hub, "blob", 1).await;

    publish(addr, "blob", vec![0xff_u8, 0x00, 0xfe]).await;
    assert_eq!(
        next_data(&mut a).await,
        Message::binary(vec![0xff_u8, 0x00, 0xfe])
    );
}

#[tokio::test]
async fn subscriber_messages_are_ignored() {
    let (addr, hub) = start_server().await;
    let mut a = connect(addr, "r1").await;
    wait_for_subscribers(&hub, "r1", 1).await;

    tokio_test::assert_ok!(a.send(Message::text("anyone there?")).await);
    assert_silent(&mut a).await;
    assert_eq!(hub.room_subscribers(&room("r1")).await.ok(), Some(1));
}

#[tokio::test]
async fn invalid_room_is_refused_before_upgrade() {
    let (addr, _hub) = start_server().await;
    let url = format!("ws://{addr}/api/v1/ws/bad%2Froom");
    match connect_async(url).await {
        Err(tungstenite::Error::Http(response)) => {
            assert_eq!(response.status(), tungstenite::http::StatusCode::BAD_REQUEST);
        }
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("upgrade should have been refused"),
    }
}
