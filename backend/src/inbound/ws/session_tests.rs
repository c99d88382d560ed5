//! WebSocket session handler tests.

use super::*;
use crate::domain::ports::TicketEventFeed;
use crate::inbound::ws;
use crate::inbound::ws::state::{AllowedOrigins, WsState};
use actix_web::{App, HttpServer, dev::Server, dev::ServerHandle, http::header};
use awc::{BoxedSocket, ws::Codec, ws::Frame};
use futures_util::{SinkExt, StreamExt};
use rstest::{fixture, rstest};
use serde_json::Value;
use std::sync::Arc;

type Socket = actix_codec::Framed<BoxedSocket, Codec>;

struct ChannelFeed(broadcast::Sender<TicketEventFrame>);

impl TicketEventFeed for ChannelFeed {
    fn subscribe(&self) -> broadcast::Receiver<TicketEventFrame> {
        self.0.subscribe()
    }
}

#[fixture]
async fn start_ws_server() -> (String, Server, broadcast::Sender<TicketEventFrame>) {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind test listener");
    let addr = listener.local_addr().expect("listener addr");
    let (sender, _) = broadcast::channel(16);
    let ws_state = WsState::new(
        Arc::new(ChannelFeed(sender.clone())),
        AllowedOrigins::parse(["http://localhost:3000"]).expect("origins parse"),
    );
    let server = HttpServer::new(move || {
        App::new()
            .app_data(actix_web::web::Data::new(ws_state.clone()))
            .service(ws::ws_entry)
    })
    .listen(listener)
    .expect("bind test server")
    .disable_signals()
    .run();
    let url = format!("http://{addr}");
    (url, server, sender)
}

#[fixture]
async fn ws_client(
    #[future] start_ws_server: (String, Server, broadcast::Sender<TicketEventFrame>),
) -> (Socket, ServerHandle, broadcast::Sender<TicketEventFrame>) {
    let (url, server, sender) = start_ws_server.await;
    let handle = server.handle();
    actix_web::rt::spawn(server);

    let (_resp, socket) = awc::Client::default()
        .ws(format!("{url}/ws"))
        .set_header(header::ORIGIN, "http://localhost:3000")
        .connect()
        .await
        .expect("websocket connect");

    (socket, handle, sender)
}

async fn next_text_frame(socket: &mut Socket) -> Vec<u8> {
    loop {
        let frame = socket.next().await.expect("response frame").expect("frame");
        match frame {
            Frame::Text(bytes) => return bytes.to_vec(),
            Frame::Ping(_) | Frame::Pong(_) => continue,
            other => panic!("expected text frame, got {other:?}"),
        }
    }
}

#[rstest]
#[actix_rt::test]
async fn forwards_published_frames_verbatim(
    #[future] ws_client: (Socket, ServerHandle, broadcast::Sender<TicketEventFrame>),
) {
    let (mut socket, _server, sender) = ws_client.await;
    let frame: TicketEventFrame =
        Arc::from(r#"{"event":"ticketDeleted","ticketId":"abc","title":"Printer on fire"}"#);

    let receivers = sender.send(frame).expect("subscriber attached");
    let text = next_text_frame(&mut socket).await;
    let value: Value = serde_json::from_slice(&text).expect("json");

    assert_eq!(receivers, 1);
    assert_eq!(value["event"], "ticketDeleted");
    assert_eq!(value["title"], "Printer on fire");
}

#[rstest]
#[actix_rt::test]
async fn client_text_keeps_connection_open(
    #[future] ws_client: (Socket, ServerHandle, broadcast::Sender<TicketEventFrame>),
) {
    let (mut socket, _server, sender) = ws_client.await;
    socket
        .send(awc::ws::Message::Text("hello".into()))
        .await
        .expect("send text");

    sender
        .send(Arc::from(r#"{"event":"ticketCreated"}"#))
        .expect("subscriber attached");
    let text = next_text_frame(&mut socket).await;

    assert_eq!(text, br#"{"event":"ticketCreated"}"#.to_vec());
}

#[rstest]
#[actix_rt::test]
async fn closes_after_timeout_without_client_messages(
    #[future] ws_client: (Socket, ServerHandle, broadcast::Sender<TicketEventFrame>),
) {
    let (mut socket, _server, _sender) = ws_client.await;
    tokio::time::sleep(CLIENT_TIMEOUT + HEARTBEAT_INTERVAL * 3).await;

    let observed_close = tokio::time::timeout(Duration::from_secs(2), async {
        let mut observed = None;
        while let Some(frame) = socket.next().await {
            let frame = frame.expect("frame");
            match frame {
                Frame::Ping(_) | Frame::Pong(_) => continue,
                Frame::Close(reason) => {
                    observed = reason;
                    break;
                }
                other => panic!("unexpected frame before close: {other:?}"),
            }
        }
        observed
    })
    .await
    .expect("close frame missing within timeout")
    .expect("close frame missing after timeout");

    assert_eq!(observed_close.code, CloseCode::Normal);
    assert_eq!(observed_close.description.as_deref(), Some("heartbeat timeout"));
}

#[rstest]
#[actix_rt::test]
async fn rejects_upgrade_without_origin(
    #[future] start_ws_server: (String, Server, broadcast::Sender<TicketEventFrame>),
) {
    let (url, server, _sender) = start_ws_server.await;
    actix_web::rt::spawn(server);

    let result = awc::Client::default().ws(format!("{url}/ws")).connect().await;

    match result {
        Err(awc::error::WsClientError::InvalidResponseStatus(status)) => {
            assert_eq!(status, actix_web::http::StatusCode::BAD_REQUEST);
        }
        Err(other) => panic!("unexpected error: {other:?}"),
        Ok(_) => panic!("upgrade should be refused"),
    }
}

#[rstest]
#[actix_rt::test]
async fn rejects_upgrade_from_foreign_origin(
    #[future] start_ws_server: (String, Server, broadcast::Sender<TicketEventFrame>),
) {
    let (url, server, _sender) = start_ws_server.await;
    actix_web::rt::spawn(server);

    let result = awc::Client::default()
        .ws(format!("{url}/ws"))
        .set_header(header::ORIGIN, "https://evil.example")
        .connect()
        .await;

    match result {
        Err(awc::error::WsClientError::InvalidResponseStatus(status)) => {
            assert_eq!(status, actix_web::http::StatusCode::FORBIDDEN);
        }
        Err(other) => panic!("unexpected error: {other:?}"),
        Ok(_) => panic!("upgrade should be refused"),
    }
}
