// HTTP Server Task - Serviert HTML und WebSocket
use core::future::pending;
use cct_core::mireds_to_kelvin;
use defmt::{info, warn};
use embassy_futures::select::{Either, select};
use embassy_net::Stack;
use embassy_time::{Duration, Instant};
use picoserve::{io::embedded_io_async, response::IntoResponse, response::ws, routing::get};

use crate::config::*;
use crate::web::{
    INDEX_HTML,
    protocol::{WsClientMessage, WsServerMessage},
};
use crate::{LightEvent, LightEventSender, LightStatus, LightStatusChannel, LightStatusSubscriber};

/// Response-Enum für WebSocket-Endpoint
/// Ermöglicht Rückgabe von entweder WebSocket-Upgrade oder HTTP-Fehler
enum WebSocketResponse {
    Upgrade(
        ws::UpgradedWebSocket<ws::UnspecifiedProtocol, ws::CallbackNotUsingState<WebSocketHandler>>,
    ),
    ServiceUnavailable,
}

impl IntoResponse for WebSocketResponse {
    async fn write_to<
        R: embedded_io_async::Read,
        W: picoserve::response::ResponseWriter<Error = R::Error>,
    >(
        self,
        connection: picoserve::response::Connection<'_, R>,
        response_writer: W,
    ) -> Result<picoserve::ResponseSent, W::Error> {
        match self {
            WebSocketResponse::Upgrade(ws) => ws.write_to(connection, response_writer).await,
            WebSocketResponse::ServiceUnavailable => {
                picoserve::response::Response::new(
                    picoserve::response::StatusCode::new(503),
                    "Service Unavailable: Too many WebSocket connections",
                )
                .with_header("Retry-After", "5")
                .write_to(connection, response_writer)
                .await
            }
        }
    }
}

/// HTTP Server Task
///
/// - Serviert index.html auf GET /
/// - WebSocket-Endpoint auf /ws: Kommandos rein, Status-Snapshots raus
///
/// Wird `HTTP_TASK_POOL_SIZE`-mal gespawnt, damit HTML und mehrere
/// WebSocket-Verbindungen sich nicht gegenseitig blockieren.
#[embassy_executor::task(pool_size = HTTP_TASK_POOL_SIZE)]
pub async fn http_server_task(
    task_id: usize,
    stack: &'static Stack<'static>,
    status_channel: &'static LightStatusChannel,
    event_sender: LightEventSender,
) {
    info!("HTTP: Server task {} starting on port 80...", task_id);

    let app = picoserve::Router::new().route("/", get(serve_html)).route(
        "/ws",
        get(
            move |upgrade: picoserve::response::WebSocketUpgrade| async move {
                // Ohne freien Subscriber-Slot gibt es 503 statt Panic
                match status_channel.subscriber() {
                    Ok(status_subscriber) => {
                        info!("HTTP: WebSocket upgrade accepted");
                        WebSocketResponse::Upgrade(upgrade.on_upgrade(WebSocketHandler {
                            event_sender,
                            status_subscriber,
                        }))
                    }
                    Err(_) => {
                        warn!("HTTP: No status subscriber slot free, sending HTTP 503");
                        WebSocketResponse::ServiceUnavailable
                    }
                }
            },
        ),
    );

    let config = picoserve::Config::new(picoserve::Timeouts {
        start_read_request: Some(Duration::from_secs(5)),
        read_request: Some(Duration::from_secs(1)),
        write: Some(Duration::from_secs(1)),
        persistent_start_read_request: Some(Duration::from_secs(5)),
    })
    .keep_connection_alive();

    let mut http_buffer = [0u8; HTTP_BUFFER_SIZE];
    let mut rx_buffer = [0u8; TCP_RX_BUFFER_SIZE];
    let mut tx_buffer = [0u8; TCP_TX_BUFFER_SIZE];

    let server = picoserve::Server::new(&app, &config, &mut http_buffer);
    let _ = server
        .listen_and_serve(task_id, *stack, 80, &mut rx_buffer, &mut tx_buffer)
        .await;

    info!("HTTP: Server task {} ended", task_id);
}

/// Serviert die HTML-Hauptseite
async fn serve_html() -> impl IntoResponse {
    picoserve::response::Response::new(picoserve::response::StatusCode::OK, INDEX_HTML)
        .with_header("Content-Type", "text/html; charset=utf-8")
}

/// WebSocket-Handler: Event-Sender Richtung Light Task, Status-Subscriber zurück
struct WebSocketHandler {
    event_sender: LightEventSender,
    status_subscriber: LightStatusSubscriber,
}

impl ws::WebSocketCallback for WebSocketHandler {
    async fn run<R: embedded_io_async::Read, W: embedded_io_async::Write<Error = R::Error>>(
        mut self,
        mut rx: ws::SocketRx<R>,
        mut tx: ws::SocketTx<W>,
    ) -> Result<(), W::Error> {
        info!("HTTP: WebSocket connection established");

        let mut buffer = [0u8; WEBSOCKET_BUFFER_SIZE];

        // Resync publiziert einen frischen Snapshot, den dieser Client dann empfängt
        self.event_sender.send(LightEvent::Resync).await;

        let close_reason = loop {
            match select(
                rx.next_message(&mut buffer, pending()),
                self.status_subscriber.next_message_pure(),
            )
            .await
            {
                Either::First(ws_result) => match ws_result?.ignore_never_b() {
                    Ok(ws::Message::Text(data)) => {
                        if let Err(message) = self.handle_command(data).await {
                            send_json(&mut tx, &WsServerMessage::Error { message }).await?;
                        }
                    }
                    Ok(ws::Message::Binary(data)) => {
                        info!("HTTP: Ignoring binary message ({} bytes)", data.len());
                    }
                    Ok(ws::Message::Ping(data)) => tx.send_pong(data).await?,
                    Ok(ws::Message::Pong(_)) => {}
                    Ok(ws::Message::Close(_)) => {
                        info!("HTTP: WebSocket close received");
                        break None;
                    }
                    Err(error) => {
                        warn!("HTTP: WebSocket error");
                        break Some((error.code(), "WebSocket Error"));
                    }
                },
                Either::Second(status) => {
                    send_json(&mut tx, &status_message(&status)).await?;
                }
            }
        };

        info!("HTTP: WebSocket connection closed");
        tx.close(close_reason).await
    }
}

impl WebSocketHandler {
    /// Parst ein JSON-Kommando und reicht es an den Light Task weiter
    ///
    /// Der Browser bekommt das Ergebnis über den Status-Broadcast.
    async fn handle_command(&self, data: &str) -> Result<(), &'static str> {
        let (msg, _) = serde_json_core::from_slice::<WsClientMessage>(data.as_bytes()).map_err(
            |_| {
                warn!("HTTP: JSON parse error ({} bytes)", data.len());
                "JSON parse error"
            },
        )?;

        let event = msg.to_event().map_err(|e| {
            warn!("HTTP: Incomplete {} command: {}", msg.msg_type, e);
            e.message()
        })?;

        info!("HTTP: Forwarding {}", event);
        self.event_sender.send(event).await;
        Ok(())
    }
}

fn status_message(status: &LightStatus) -> WsServerMessage {
    WsServerMessage::Status {
        status: *status,
        kelvin: mireds_to_kelvin(status.mireds),
        timestamp_ms: Instant::now().as_millis(),
    }
}

/// Serialisiert eine Server-Nachricht und sendet sie als Text-Frame
async fn send_json<W: embedded_io_async::Write>(
    tx: &mut ws::SocketTx<W>,
    message: &WsServerMessage,
) -> Result<(), W::Error> {
    let mut json_buffer = [0u8; JSON_STATUS_BUFFER_SIZE];
    match serde_json_core::to_slice(message, &mut json_buffer) {
        Ok(n) => match core::str::from_utf8(&json_buffer[..n]) {
            Ok(json) => tx.send_text(json).await,
            Err(_) => Ok(()),
        },
        Err(_) => {
            warn!("HTTP: JSON buffer too small, message dropped");
            Ok(())
        }
    }
}
