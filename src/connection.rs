//! WebSocket link to the game server.
//!
//! The socket lives on a background tokio runtime. The game loop talks to it through a
//! [`ConnectionHandle`] and reads [`LinkEvent`]s from a crossbeam channel, so it never blocks on
//! the network.

use crate::{ClientError, MoveRequest};
use async_tungstenite::{
    tokio::{connect_async, ConnectStream},
    tungstenite::{self, Message},
    WebSocketStream,
};
use crossbeam::channel::{unbounded, Receiver, Sender};
use futures::{future::pending, SinkExt, StreamExt};
use log::{debug, error, info, warn};
use std::{future::Future, pin::Pin};
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};

type Socket = WebSocketStream<ConnectStream>;
type Handshake = Pin<Box<dyn Future<Output = Result<Socket, tungstenite::Error>> + Send>>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkEvent {
    /// Which `connect` call the event belongs to.
    pub generation: u64,
    pub kind: LinkEventKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkEventKind {
    Opened,
    Message(String),
    Error(String),
    Closed,
}

#[derive(Debug)]
enum LinkCommand {
    Connect { generation: u64 },
    Send(String),
    Close,
}

#[derive(Debug, Clone)]
pub struct ConnectionHandle {
    commands: UnboundedSender<LinkCommand>,
}

impl ConnectionHandle {
    /// Drops any current socket and opens a new one.
    pub fn connect(&self, generation: u64) -> Result<(), ClientError> {
        self.command(LinkCommand::Connect { generation })
    }

    pub fn send(&self, request: &MoveRequest) -> Result<(), ClientError> {
        let text = serde_json::to_string(request).map_err(ClientError::Encode)?;
        self.command(LinkCommand::Send(text))
    }

    pub fn close(&self) -> Result<(), ClientError> {
        self.command(LinkCommand::Close)
    }

    fn command(&self, command: LinkCommand) -> Result<(), ClientError> {
        self.commands
            .send(command)
            .map_err(|_| ClientError::Transport("connection manager has stopped".to_string()))
    }
}

pub struct ConnectionManager {
    endpoint: String,
    commands: UnboundedReceiver<LinkCommand>,
    events: Sender<LinkEvent>,
    socket: Option<Socket>,
    /// Handshake in progress. Dropped by `Close` or a newer `Connect`.
    handshake: Option<Handshake>,
    generation: u64,
}

impl ConnectionManager {
    pub fn new(endpoint: impl Into<String>) -> (Self, ConnectionHandle, Receiver<LinkEvent>) {
        let (commands_tx, commands_rx) = unbounded_channel();
        let (events_tx, events_rx) = unbounded();

        (
            Self {
                endpoint: endpoint.into(),
                commands: commands_rx,
                events: events_tx,
                socket: None,
                handshake: None,
                generation: 0,
            },
            ConnectionHandle {
                commands: commands_tx,
            },
            events_rx,
        )
    }

    /// Runs the manager on its own thread with a dedicated runtime.
    pub fn spawn(
        endpoint: impl Into<String>,
    ) -> Result<(ConnectionHandle, Receiver<LinkEvent>), ClientError> {
        let (manager, handle, events) = Self::new(endpoint);
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;

        std::thread::Builder::new()
            .name("game-connection".to_string())
            .spawn(move || runtime.block_on(manager.run()))?;

        Ok((handle, events))
    }

    pub async fn run(mut self) {
        loop {
            tokio::select! {
                command = self.commands.recv() => {
                    let Some(command) = command else {
                        debug!("all connection handles dropped");
                        break;
                    };
                    self.handle_command(command).await;
                }
                message = next_message(&mut self.socket) => {
                    self.handle_message(message);
                }
                result = finish_handshake(&mut self.handshake) => {
                    self.handshake = None;
                    self.handle_handshake(result);
                }
            }
        }

        if let Some(mut socket) = self.socket.take() {
            let _ = socket.close(None).await;
        }
    }

    async fn handle_command(&mut self, command: LinkCommand) {
        match command {
            LinkCommand::Connect { generation } => {
                if let Some(mut old) = self.socket.take() {
                    debug!("replacing connection {}", self.generation);
                    let _ = old.close(None).await;
                }
                if self.handshake.take().is_some() {
                    debug!("abandoning handshake {}", self.generation);
                }
                self.generation = generation;

                let endpoint = self.endpoint.clone();
                self.handshake = Some(Box::pin(async move {
                    connect_async(endpoint).await.map(|(socket, _)| socket)
                }));
            }

            LinkCommand::Send(text) => {
                let Some(socket) = self.socket.as_mut() else {
                    warn!("{}", ClientError::TransportUnavailable);
                    return;
                };

                debug!("out: {}", text);
                if let Err(e) = socket.send(Message::Text(text.into())).await {
                    error!("ws error sending: {}", e);
                    self.socket = None;
                    self.emit(LinkEventKind::Error(e.to_string()));
                }
            }

            LinkCommand::Close => {
                if self.handshake.take().is_some() {
                    info!("ws connect to {} abandoned", self.endpoint);
                    self.emit(LinkEventKind::Closed);
                }
                if let Some(mut socket) = self.socket.take() {
                    if let Err(e) = socket.close(None).await {
                        debug!("error while closing: {}", e);
                    }
                    info!("ws closed");
                    self.emit(LinkEventKind::Closed);
                }
            }
        }
    }

    fn handle_handshake(&mut self, result: Result<Socket, tungstenite::Error>) {
        match result {
            Ok(socket) => {
                info!("ws connected to {}", self.endpoint);
                self.socket = Some(socket);
                self.emit(LinkEventKind::Opened);
            }
            Err(e) => {
                error!("ws error connecting to {}: {}", self.endpoint, e);
                self.emit(LinkEventKind::Error(e.to_string()));
            }
        }
    }

    fn handle_message(&mut self, message: Option<Result<Message, tungstenite::Error>>) {
        match message {
            Some(Ok(Message::Text(text))) => {
                debug!("in: {}", text.as_str());
                self.emit(LinkEventKind::Message(text.as_str().to_owned()));
            }

            Some(Ok(Message::Binary(_))) => {
                warn!("ignoring binary frame from server");
            }

            // pongs are queued by tungstenite itself
            Some(Ok(Message::Ping(_) | Message::Pong(_) | Message::Frame(_))) => {}

            Some(Ok(Message::Close(frame))) => {
                info!("ws closed by server: {:?}", frame);
                self.socket = None;
                self.emit(LinkEventKind::Closed);
            }

            Some(Err(e)) => {
                error!("ws error: {}", e);
                self.socket = None;
                self.emit(LinkEventKind::Error(e.to_string()));
            }

            None => {
                info!("ws closed");
                self.socket = None;
                self.emit(LinkEventKind::Closed);
            }
        }
    }

    fn emit(&self, kind: LinkEventKind) {
        let event = LinkEvent {
            generation: self.generation,
            kind,
        };
        if self.events.send(event).is_err() {
            debug!("no one is listening for link events");
        }
    }
}

/// Next frame of the open socket, or never when there is none.
async fn next_message(socket: &mut Option<Socket>) -> Option<Result<Message, tungstenite::Error>> {
    match socket {
        Some(socket) => socket.next().await,
        None => pending().await,
    }
}

async fn finish_handshake(handshake: &mut Option<Handshake>) -> Result<Socket, tungstenite::Error> {
    match handshake {
        Some(handshake) => handshake.as_mut().await,
        None => pending().await,
    }
}
