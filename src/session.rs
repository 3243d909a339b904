//! Client side of the move/update exchange.
//!
//! A [`Session`] owns the last authoritative board and decides when requests go out. It does no
//! I/O itself: every call returns the [`Effect`]s the caller has to carry out, and link events
//! are fed back in through [`Session::on_link_event`]. Moves are handled strictly one at a time,
//! so a reply always belongs to the single outstanding request.

use crate::{
    board::{Board, Direction},
    connection::{LinkEvent, LinkEventKind},
    render::{Banner, Frame},
    settings::ClientSettings,
    ClientError, GameStatus, MoveRequest, ServerUpdate,
};
use log::{debug, error, info, warn};
use std::{
    collections::VecDeque,
    time::{Duration, Instant},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Open a new channel. Events from it carry `generation`.
    Connect { generation: u64 },
    Send(MoveRequest),
    Close,
    Render,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Link {
    Closed,
    Connecting,
    Open,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Playing,
    /// A request went unanswered or the channel dropped under it.
    Disconnected,
    Won,
    Lost,
}

/// A request is sent at most this many times before the session gives up on it.
const MAX_ATTEMPTS: u32 = 2;

#[derive(Debug, Clone)]
struct InFlight {
    request: MoveRequest,
    sent_at: Instant,
    attempts: u32,
}

#[derive(Debug)]
pub struct Session {
    board: Board,
    top_value: u32,
    score: u64,
    seed_pending: bool,
    phase: Phase,
    link: Link,
    generation: u64,
    connecting_since: Option<Instant>,
    in_flight: Option<InFlight>,
    /// Request whose channel closed under it, resent once the link is back.
    retry: Option<(MoveRequest, u32)>,
    queue: VecDeque<Direction>,
    max_queued: usize,
    response_timeout: Duration,
}

impl Session {
    pub fn new(settings: &ClientSettings) -> Self {
        Self {
            board: Board::empty(),
            top_value: 0,
            score: 0,
            seed_pending: true,
            phase: Phase::Playing,
            link: Link::Closed,
            generation: 0,
            connecting_since: None,
            in_flight: None,
            retry: None,
            queue: VecDeque::new(),
            max_queued: settings.max_queued_moves.max(1),
            response_timeout: settings.response_timeout,
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn top_value(&self) -> u32 {
        self.top_value
    }

    pub fn score(&self) -> u64 {
        self.score
    }

    pub fn seed_pending(&self) -> bool {
        self.seed_pending
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn link(&self) -> Link {
        self.link
    }

    pub fn is_ended(&self) -> bool {
        matches!(self.phase, Phase::Won | Phase::Lost)
    }

    pub fn awaiting_response(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn queued(&self) -> usize {
        self.queue.len()
    }

    pub fn banner(&self) -> Option<Banner> {
        match self.phase {
            Phase::Won => Some(Banner::Won),
            Phase::Lost => Some(Banner::Lost),
            Phase::Disconnected => Some(Banner::Disconnected),
            Phase::Playing if self.link == Link::Connecting => Some(Banner::Connecting),
            Phase::Playing => None,
        }
    }

    pub fn frame(&self) -> Frame {
        Frame::compose(&self.board, self.top_value, self.banner(), self.score)
    }

    /// Opens the channel ahead of the first move.
    pub fn connect(&mut self) -> Vec<Effect> {
        if self.is_ended() || self.link != Link::Closed {
            return Vec::new();
        }
        self.open_link()
    }

    /// Queues a directional move and sends it as soon as nothing else is outstanding.
    pub fn press(
        &mut self,
        direction: Direction,
        now: Instant,
    ) -> Result<Vec<Effect>, ClientError> {
        if self.is_ended() {
            return Err(ClientError::SessionEnded);
        }
        if !direction.is_move() {
            return self.resync(now);
        }

        let mut effects = Vec::new();
        if self.phase == Phase::Disconnected {
            info!("retrying after lost connection");
            self.phase = Phase::Playing;
            effects.push(Effect::Render);
        }

        if self.queue.len() >= self.max_queued {
            debug!("input queue full, dropping {:?}", direction);
            return Ok(effects);
        }

        self.queue.push_back(direction);
        effects.extend(self.pump(now));
        Ok(effects)
    }

    /// Asks the server to echo the current state. Skipped while anything is outstanding.
    pub fn resync(&mut self, now: Instant) -> Result<Vec<Effect>, ClientError> {
        if self.is_ended() {
            return Err(ClientError::SessionEnded);
        }
        if self.phase == Phase::Disconnected || self.busy() {
            debug!("skipping resync");
            return Ok(Vec::new());
        }

        self.queue.push_back(Direction::Resync);
        Ok(self.pump(now))
    }

    /// Starts a fresh game after a terminal state.
    pub fn restart(&mut self) -> Vec<Effect> {
        info!("starting a new game");
        self.board = Board::empty();
        self.top_value = 0;
        self.score = 0;
        self.seed_pending = true;
        self.phase = Phase::Playing;
        self.connecting_since = None;
        self.in_flight = None;
        self.retry = None;
        self.queue.clear();
        vec![Effect::Render]
    }

    pub fn on_link_event(
        &mut self,
        event: LinkEvent,
        now: Instant,
    ) -> Result<Vec<Effect>, ClientError> {
        if event.generation != self.generation {
            debug!("ignoring event from stale connection {}", event.generation);
            return Ok(Vec::new());
        }

        match event.kind {
            LinkEventKind::Opened => Ok(self.on_open(now)),
            LinkEventKind::Message(text) => self.on_message(&text, now),
            LinkEventKind::Error(reason) => {
                error!("connection error: {}", reason);
                Ok(self.on_closed())
            }
            LinkEventKind::Closed => Ok(self.on_closed()),
        }
    }

    /// Expires the outstanding request, or a stalled connect with work waiting on it, once the
    /// response timeout has passed.
    pub fn poll(&mut self, now: Instant) -> Vec<Effect> {
        let started = match (&self.in_flight, self.link) {
            (Some(in_flight), _) => in_flight.sent_at,
            (None, Link::Connecting) if self.busy() => *self.connecting_since.get_or_insert(now),
            _ => return Vec::new(),
        };
        if now.saturating_duration_since(started) < self.response_timeout {
            return Vec::new();
        }

        warn!(
            "no reply from {} within {:?}; dropping connection",
            if self.in_flight.is_some() { "server" } else { "connect" },
            self.response_timeout
        );
        self.drop_pending();
        self.link = Link::Closed;
        vec![Effect::Close, Effect::Render]
    }

    fn on_open(&mut self, now: Instant) -> Vec<Effect> {
        info!("connected");
        self.link = Link::Open;
        let mut effects = vec![Effect::Render];
        effects.extend(self.pump(now));
        effects
    }

    fn on_closed(&mut self) -> Vec<Effect> {
        let was = std::mem::replace(&mut self.link, Link::Closed);
        if was == Link::Closed {
            return Vec::new();
        }
        info!("connection closed");

        if let Some(lost) = self.in_flight.take() {
            if lost.attempts < MAX_ATTEMPTS {
                warn!(
                    "connection closed before {:?} was answered, resending",
                    lost.request.direction
                );
                self.retry = Some((lost.request, lost.attempts));
                return self.open_link();
            }
            warn!("giving up on {:?}", lost.request.direction);
            self.drop_pending();
        } else if self.busy() {
            warn!("could not reach the game server");
            self.drop_pending();
        }
        vec![Effect::Render]
    }

    fn busy(&self) -> bool {
        self.in_flight.is_some() || self.retry.is_some() || !self.queue.is_empty()
    }

    fn drop_pending(&mut self) {
        self.in_flight = None;
        self.retry = None;
        self.queue.clear();
        if !self.is_ended() {
            self.phase = Phase::Disconnected;
        }
    }

    fn on_message(&mut self, text: &str, now: Instant) -> Result<Vec<Effect>, ClientError> {
        let update: ServerUpdate = serde_json::from_str(text).map_err(|e| {
            error!("could not parse server message {:?}: {}", text, e);
            ClientError::MalformedServerMessage(e)
        })?;

        let Some(in_flight) = self.in_flight.take() else {
            warn!("discarding update that answers no request");
            return Ok(Vec::new());
        };
        debug!("update for {:?}: {:?}", in_flight.request.direction, update);

        self.board = update.board;
        self.top_value = update.top_value;
        self.score = update.score;

        let status = update.status().unwrap_or_else(|| {
            warn!("reserved status code {}, treating as ongoing", update.status_code);
            GameStatus::Ongoing
        });

        let mut effects = Vec::new();
        match status {
            GameStatus::Ongoing => {
                self.phase = Phase::Playing;
                effects.push(Effect::Render);
                effects.extend(self.pump(now));
            }
            GameStatus::Won | GameStatus::Lost => {
                info!("game over: {:?} with score {}", status, self.score);
                self.phase = if status == GameStatus::Won {
                    Phase::Won
                } else {
                    Phase::Lost
                };
                self.queue.clear();
                self.link = Link::Closed;
                effects.push(Effect::Close);
                effects.push(Effect::Render);
            }
        }
        Ok(effects)
    }

    /// Sends the next queued entry if the link allows it, opening the link when needed.
    fn pump(&mut self, now: Instant) -> Vec<Effect> {
        if self.in_flight.is_some() || !self.busy() {
            return Vec::new();
        }

        match self.link {
            Link::Connecting => Vec::new(),
            Link::Closed => self.open_link(),
            Link::Open => {
                let (request, attempts) = match self.retry.take() {
                    Some(retry) => retry,
                    None => {
                        let Some(direction) = self.queue.pop_front() else {
                            return Vec::new();
                        };
                        (self.build_request(direction), 0)
                    }
                };
                self.in_flight = Some(InFlight {
                    request: request.clone(),
                    sent_at: now,
                    attempts: attempts + 1,
                });
                vec![Effect::Send(request)]
            }
        }
    }

    fn open_link(&mut self) -> Vec<Effect> {
        self.generation += 1;
        self.link = Link::Connecting;
        self.connecting_since = None;
        vec![
            Effect::Connect {
                generation: self.generation,
            },
            Effect::Render,
        ]
    }

    fn build_request(&mut self, direction: Direction) -> MoveRequest {
        // the seed rides on the first real move and is then gone for good
        let seed = direction.is_move() && std::mem::take(&mut self.seed_pending);
        MoveRequest {
            board: self.board,
            direction,
            seed,
            points: self.score,
        }
    }
}
