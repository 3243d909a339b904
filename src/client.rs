use crate::{
    connection::{ConnectionHandle, ConnectionManager, LinkEvent},
    input::Key,
    render::Frame,
    session::{Effect, Session},
    settings::ClientSettings,
    ClientError,
};
use crossbeam::channel::{Receiver, RecvTimeoutError};
use log::{error, warn};
use std::time::{Duration, Instant};

/// Ties a [`Session`] to a live connection and carries out its effects.
pub struct Client {
    session: Session,
    connection: ConnectionHandle,
    events: Receiver<LinkEvent>,
    resync_on_release: bool,
    dirty: bool,
}

impl Client {
    pub fn new(
        settings: &ClientSettings,
        connection: ConnectionHandle,
        events: Receiver<LinkEvent>,
    ) -> Self {
        Self {
            session: Session::new(settings),
            connection,
            events,
            resync_on_release: settings.resync_on_release,
            dirty: true,
        }
    }

    /// Spawns the connection manager and starts connecting right away.
    pub fn start(settings: &ClientSettings) -> Result<Self, ClientError> {
        let (connection, events) = ConnectionManager::spawn(settings.endpoint.clone())?;
        let mut client = Self::new(settings, connection, events);
        client.connect();
        Ok(client)
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn connect(&mut self) {
        let effects = self.session.connect();
        self.perform(effects);
    }

    /// Non-directional keys are ignored.
    pub fn key_down(&mut self, key: Key, now: Instant) -> Result<(), ClientError> {
        let Some(direction) = key.direction() else {
            return Ok(());
        };
        let effects = self.session.press(direction, now)?;
        self.perform(effects);
        Ok(())
    }

    pub fn key_up(&mut self, now: Instant) -> Result<(), ClientError> {
        if !self.resync_on_release {
            return Ok(());
        }
        let effects = self.session.resync(now)?;
        self.perform(effects);
        Ok(())
    }

    pub fn restart(&mut self) {
        let effects = self.session.restart();
        self.perform(effects);
    }

    /// Applies every link event that has arrived, then checks the response deadline.
    pub fn pump(&mut self, now: Instant) {
        while let Ok(event) = self.events.try_recv() {
            self.apply(event, now);
        }
        let effects = self.session.poll(now);
        self.perform(effects);
    }

    /// Blocks for up to `timeout` waiting for one link event. Returns whether one arrived.
    pub fn wait(&mut self, timeout: Duration) -> bool {
        let arrived = match self.events.recv_timeout(timeout) {
            Ok(event) => {
                self.apply(event, Instant::now());
                true
            }
            Err(RecvTimeoutError::Timeout) => false,
            Err(RecvTimeoutError::Disconnected) => {
                error!("connection manager is gone");
                false
            }
        };
        self.pump(Instant::now());
        arrived
    }

    /// The frame to draw, if anything changed since the last call.
    pub fn take_frame(&mut self) -> Option<Frame> {
        if !self.dirty {
            return None;
        }
        self.dirty = false;
        Some(self.session.frame())
    }

    fn apply(&mut self, event: LinkEvent, now: Instant) {
        match self.session.on_link_event(event, now) {
            Ok(effects) => self.perform(effects),
            Err(e) => warn!("{}", e),
        }
    }

    fn perform(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            let result = match effect {
                Effect::Connect { generation } => self.connection.connect(generation),
                Effect::Send(request) => self.connection.send(&request),
                Effect::Close => self.connection.close(),
                Effect::Render => {
                    self.dirty = true;
                    Ok(())
                }
            };
            if let Err(e) = result {
                error!("{}", e);
            }
        }
    }
}
