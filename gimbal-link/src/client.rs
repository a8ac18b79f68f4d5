// Persistent WebSocket link to the gimbal controller. One outbound
// connection, fire-and-forget dispatch, passive receive loop, and the
// mode-select side effects the firmware expects around connect/disconnect.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures_util::stream::SplitSink;
use futures_util::{SinkExt, StreamExt};
use log::{debug, info, warn};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use uuid::Uuid;

use common::{Command, CommandSink, ConnectionState};
use publisher::{Publisher, PublisherError};

use crate::constants::{DISCONNECT_GRACE_MILLIS, MANUAL_MODE_DELAY_MILLIS};
use crate::helpers;
use crate::models::errors::LinkError;

type WsSocket = WebSocketStream<MaybeTlsStream<TcpStream>>;
type WsSink = SplitSink<WsSocket, Message>;

/// Connection state plus the epoch identifying the live connection attempt.
///
/// Every `connect` bumps the epoch; socket tasks carry the epoch they were
/// spawned under and may only mutate shared state while it is still current.
/// That is what lets `disconnect` win the race against a connect whose
/// socket has not opened yet.
struct LinkState {
    state: ConnectionState,
    epoch: u64,
}

struct LinkShared {
    link_state: Mutex<LinkState>,
    last_error: Mutex<Option<String>>,
    outbound: Mutex<Option<mpsc::UnboundedSender<Message>>>,
    state_events: Publisher<ConnectionState>,
    error_events: Publisher<String>,
}

impl LinkShared {
    fn state(&self) -> ConnectionState {
        self.link_state.lock().unwrap().state
    }

    /// Caller-initiated transition, applied regardless of epoch.
    fn force_state(&self, new_state: ConnectionState) {
        let changed = {
            let mut link_state = self.link_state.lock().unwrap();
            if link_state.state != new_state {
                link_state.state = new_state;
                true
            } else {
                false
            }
        };
        if changed {
            self.state_events.notify(Arc::new(new_state));
        }
    }

    /// Socket-task transition, applied only while `epoch` identifies the
    /// live connection attempt. Returns false when the attempt is stale.
    fn transition_for(&self, epoch: u64, new_state: ConnectionState) -> bool {
        let changed = {
            let mut link_state = self.link_state.lock().unwrap();
            if link_state.epoch != epoch {
                return false;
            }
            if link_state.state != new_state {
                link_state.state = new_state;
                true
            } else {
                false
            }
        };
        if changed {
            self.state_events.notify(Arc::new(new_state));
        }
        true
    }

    fn install_outbound(&self, epoch: u64, sender: mpsc::UnboundedSender<Message>) -> bool {
        let link_state = self.link_state.lock().unwrap();
        if link_state.epoch != epoch {
            return false;
        }
        *self.outbound.lock().unwrap() = Some(sender);
        true
    }

    /// Drops the outbound sender, ending the socket task's write half.
    /// With `epoch` set, the drop only applies to that connection attempt.
    fn drop_outbound(&self, epoch: Option<u64>) {
        let link_state = self.link_state.lock().unwrap();
        if let Some(epoch) = epoch {
            if link_state.epoch != epoch {
                return;
            }
        }
        self.outbound.lock().unwrap().take();
    }

    fn invalidate_epoch(&self) {
        self.link_state.lock().unwrap().epoch += 1;
    }

    fn record_error(&self, error: LinkError) {
        let text = error.to_string();
        warn!("{}", text);
        *self.last_error.lock().unwrap() = Some(text.clone());
        self.error_events.notify(Arc::new(text));
    }

    fn clear_error(&self) {
        *self.last_error.lock().unwrap() = None;
    }
}

/// Client side of the gimbal control socket.
///
/// Owns one outbound connection to `ws://<host>/ws`. Cheap to clone; clones
/// share the same connection and observables. All operations assume a
/// running tokio runtime.
#[derive(Clone)]
pub struct GimbalLink {
    shared: Arc<LinkShared>,
}

impl Default for GimbalLink {
    fn default() -> Self {
        Self::new()
    }
}

impl GimbalLink {
    pub fn new() -> Self {
        Self {
            shared: Arc::new(LinkShared {
                link_state: Mutex::new(LinkState {
                    state: ConnectionState::Disconnected,
                    epoch: 0,
                }),
                last_error: Mutex::new(None),
                outbound: Mutex::new(None),
                state_events: Publisher::new(),
                error_events: Publisher::new(),
            }),
        }
    }

    /// Opens the link to the gimbal at `host`.
    ///
    /// The host is validated first: anything empty after trimming is
    /// rejected as `LinkError::InvalidHost` before a connection attempt is
    /// made. A no-op while the link is already connecting or connected.
    ///
    /// On success the state moves to `Connecting`, then to `Connected` once
    /// the socket opens. Roughly half a second after the call one
    /// manual-mode command is dispatched so the gimbal starts following the
    /// phone; the frame is fire-and-forget and is dropped if the socket is
    /// not open yet.
    pub fn connect(&self, host: &str) -> Result<(), LinkError> {
        let endpoint = match helpers::endpoint_url(host) {
            Ok(endpoint) => endpoint,
            Err(error) => {
                self.shared.record_error(error.clone());
                return Err(error);
            }
        };

        let epoch = {
            let mut link_state = self.shared.link_state.lock().unwrap();
            if link_state.state != ConnectionState::Disconnected {
                debug!("connect ignored while {}", link_state.state);
                return Ok(());
            }
            link_state.state = ConnectionState::Connecting;
            link_state.epoch += 1;
            link_state.epoch
        };
        self.shared.clear_error();
        self.shared
            .state_events
            .notify(Arc::new(ConnectionState::Connecting));

        let shared = Arc::clone(&self.shared);
        tokio::spawn(async move {
            run_connection(shared, epoch, endpoint).await;
        });

        let link = self.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(MANUAL_MODE_DELAY_MILLIS)).await;
            link.send_command(&Command::manual_mode());
        });

        Ok(())
    }

    /// Hands the gimbal back to its own control loop and tears the link
    /// down.
    ///
    /// One auto-mode command is dispatched immediately; after a short grace
    /// delay the socket is closed and the state is forced to `Disconnected`
    /// regardless of what it was. Best-effort: neither the command nor the
    /// close is confirmed.
    pub fn disconnect(&self) {
        self.send_command(&Command::auto_mode());

        let shared = Arc::clone(&self.shared);
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(DISCONNECT_GRACE_MILLIS)).await;
            shared.invalidate_epoch();
            shared.drop_outbound(None);
            shared.force_state(ConnectionState::Disconnected);
            info!("gimbal link closed");
        });
    }

    /// Dispatches one text frame, fire-and-forget.
    ///
    /// Silently dropped while the socket is not open. A transport-level
    /// failure is recorded in the last-error observable without touching the
    /// connection state; nothing is retried.
    pub fn send_message(&self, text: &str) {
        let outbound = self.shared.outbound.lock().unwrap();
        match outbound.as_ref() {
            Some(sender) => {
                let failed = sender.send(Message::text(text.to_string())).is_err();
                drop(outbound);
                if failed {
                    self.shared
                        .record_error(LinkError::Send("connection task is gone".to_string()));
                }
            }
            None => debug!("link not open, dropping frame: {}", text),
        }
    }

    /// Encodes `command` and dispatches it like `send_message`.
    pub fn send_command(&self, command: &Command) {
        match command.to_json() {
            Ok(text) => self.send_message(&text),
            Err(e) => self
                .shared
                .record_error(LinkError::Send(format!("failed to encode command: {e}"))),
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.shared.state()
    }

    pub fn last_error(&self) -> Option<String> {
        self.shared.last_error.lock().unwrap().clone()
    }

    /// Registers a listener notified on every connection-state transition.
    pub fn register_state_listener<F>(&self, listener: F) -> Uuid
    where
        F: Fn(Arc<ConnectionState>) + Send + Sync + 'static,
    {
        self.shared.state_events.register(listener)
    }

    pub fn unregister_state_listener(&self, id: Uuid) -> Result<(), PublisherError> {
        self.shared.state_events.unregister(id)
    }

    /// Registers a listener notified with every recorded error text.
    pub fn register_error_listener<F>(&self, listener: F) -> Uuid
    where
        F: Fn(Arc<String>) + Send + Sync + 'static,
    {
        self.shared.error_events.register(listener)
    }

    pub fn unregister_error_listener(&self, id: Uuid) -> Result<(), PublisherError> {
        self.shared.error_events.unregister(id)
    }
}

impl CommandSink for GimbalLink {
    fn send_message(&self, text: &str) {
        GimbalLink::send_message(self, text);
    }
}

/// Opens the socket for one connection attempt and runs its event loop.
async fn run_connection(shared: Arc<LinkShared>, epoch: u64, endpoint: String) {
    info!("opening gimbal link to {}", endpoint);
    let (socket, _) = match connect_async(endpoint.as_str()).await {
        Ok(connection) => connection,
        Err(e) => {
            shared.record_error(LinkError::Connect(e.to_string()));
            shared.transition_for(epoch, ConnectionState::Disconnected);
            return;
        }
    };

    let (sender, receiver) = mpsc::unbounded_channel();
    if !shared.install_outbound(epoch, sender) {
        debug!("link torn down before the socket opened");
        return;
    }
    shared.transition_for(epoch, ConnectionState::Connected);
    info!("gimbal link established");

    event_loop(&shared, socket, receiver).await;

    shared.drop_outbound(Some(epoch));
    shared.transition_for(epoch, ConnectionState::Disconnected);
}

/// Serializes all socket traffic for one connection.
///
/// Outgoing frames arrive over `receiver`; the inbound half is drained
/// passively, one receive re-armed after another. Exits when the remote end
/// closes or when every outbound sender is dropped (local disconnect).
async fn event_loop(
    shared: &LinkShared,
    socket: WsSocket,
    mut receiver: mpsc::UnboundedReceiver<Message>,
) {
    let (mut sink, mut stream) = socket.split();
    // flips to false after a receive failure; the listener is not re-armed
    let mut receive_armed = true;

    loop {
        tokio::select! {
            outgoing = receiver.recv() => {
                if !forward_frame(shared, &mut sink, outgoing).await {
                    break;
                }
            }
            incoming = stream.next(), if receive_armed => {
                match incoming {
                    Some(Ok(Message::Close(_))) | None => {
                        debug!("remote end closed the link");
                        break;
                    }
                    Some(Ok(_)) => {
                        // inbound frames are not interpreted; re-arm the receive
                    }
                    Some(Err(e)) => {
                        shared.record_error(LinkError::Receive(e.to_string()));
                        receive_armed = false;
                    }
                }
            }
        }
    }
}

/// Writes one outgoing frame; returns false once the channel is closed and
/// the socket should shut down.
async fn forward_frame(
    shared: &LinkShared,
    sink: &mut WsSink,
    outgoing: Option<Message>,
) -> bool {
    match outgoing {
        Some(message) => {
            if let Err(e) = sink.send(message).await {
                // a failed send leaves the connection state untouched
                shared.record_error(LinkError::Send(e.to_string()));
            }
            true
        }
        None => {
            let _ = sink.close().await;
            false
        }
    }
}
