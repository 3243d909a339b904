use bevy_2048::{
    board::{Board, Direction},
    connection::{LinkEvent, LinkEventKind},
    render::Banner,
    session::{Effect, Link, Phase, Session},
    settings::ClientSettings,
    theme::{self, Rgb},
    ClientError, MoveRequest,
};
use std::time::Instant;

/// Drives a session against a scripted server on generation-tagged events.
struct Harness {
    session: Session,
    generation: u64,
    sent: Vec<MoveRequest>,
    closes: usize,
    renders: usize,
    now: Instant,
}

impl Harness {
    fn new() -> Self {
        let mut harness = Self {
            session: Session::new(&ClientSettings::default()),
            generation: 0,
            sent: Vec::new(),
            closes: 0,
            renders: 0,
            now: Instant::now(),
        };
        let effects = harness.session.connect();
        harness.absorb(effects);
        harness.event(LinkEventKind::Opened);
        harness
    }

    fn absorb(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::Connect { generation } => self.generation = generation,
                Effect::Send(request) => self.sent.push(request),
                Effect::Close => self.closes += 1,
                Effect::Render => self.renders += 1,
            }
        }
    }

    fn event(&mut self, kind: LinkEventKind) {
        let event = LinkEvent {
            generation: self.generation,
            kind,
        };
        let effects = self.session.on_link_event(event, self.now).unwrap();
        self.absorb(effects);
    }

    fn press(&mut self, direction: Direction) -> Result<(), ClientError> {
        let effects = self.session.press(direction, self.now)?;
        self.absorb(effects);
        Ok(())
    }

    fn release(&mut self) -> Result<(), ClientError> {
        let effects = self.session.resync(self.now)?;
        self.absorb(effects);
        Ok(())
    }

    fn reply(&mut self, board: Board, status_code: u8, top_value: u32) {
        let json = serde_json::json!({
            "board": board,
            "statusCode": status_code,
            "topValue": top_value,
        });
        self.event(LinkEventKind::Message(json.to_string()));
    }
}

fn first_board() -> Board {
    Board::from_rows([[0, 0, 0, 2], [0, 0, 0, 0], [0, 2, 0, 0], [0, 0, 0, 0]])
}

#[test]
fn first_move_seeds_and_renders_reply() {
    let mut harness = Harness::new();
    harness.press(Direction::Up).unwrap();

    assert_eq!(harness.sent.len(), 1);
    let request = serde_json::to_value(&harness.sent[0]).unwrap();
    assert_eq!(request["direction"], "w");
    assert_eq!(request["seed"], true);
    assert_eq!(
        request["board"],
        serde_json::json!([[0, 0, 0, 0], [0, 0, 0, 0], [0, 0, 0, 0], [0, 0, 0, 0]])
    );

    harness.reply(first_board(), 0, 2);

    let frame = harness.session.frame();
    assert_eq!(*harness.session.board(), first_board());
    assert_eq!(frame.cells[0][3].text, "2");
    assert_eq!(frame.cells[0][0].text, "");
    assert_eq!(frame.background, theme::TIERS[0].theme);
    assert_eq!(frame.banner, None);
    assert!(!harness.session.seed_pending());
}

#[test]
fn seed_is_sent_exactly_once_even_across_reconnects() {
    let mut harness = Harness::new();
    for direction in [Direction::Up, Direction::Left, Direction::Down] {
        harness.press(direction).unwrap();
        if harness.session.link() == Link::Connecting {
            harness.event(LinkEventKind::Opened);
        }
        harness.reply(first_board(), 0, 2);
        // servers that answer once per connection hang up here
        harness.event(LinkEventKind::Closed);
        assert_eq!(harness.session.link(), Link::Closed);
        assert_eq!(harness.session.phase(), Phase::Playing);
    }

    let seeds: Vec<bool> = harness.sent.iter().map(|r| r.seed).collect();
    assert_eq!(seeds, vec![true, false, false]);
    assert_eq!(harness.generation, 3);
}

#[test]
fn resync_echoes_the_current_board() {
    let mut harness = Harness::new();
    harness.press(Direction::Up).unwrap();
    harness.reply(first_board(), 0, 2);

    harness.release().unwrap();
    let request = harness.sent.last().unwrap();
    assert_eq!(request.direction, Direction::Resync);
    assert_eq!(request.board, first_board());
    assert!(!request.seed);
    assert_eq!(*harness.session.board(), first_board());
}

#[test]
fn resync_reply_rerenders_without_touching_the_seed() {
    let mut harness = Harness::new();
    harness.release().unwrap();
    assert_eq!(harness.sent.len(), 1);
    assert_eq!(harness.sent[0].direction, Direction::Resync);
    assert!(!harness.sent[0].seed);
    assert!(harness.session.seed_pending());

    // a move pressed while the resync is outstanding waits its turn
    harness.press(Direction::Left).unwrap();
    assert_eq!(harness.sent.len(), 1);
    assert_eq!(harness.session.queued(), 1);

    let renders = harness.renders;
    harness.reply(Board::empty(), 0, 0);

    assert_eq!(*harness.session.board(), Board::empty());
    assert!(harness.renders > renders);
    assert_eq!(harness.sent.len(), 2);
    let next = &harness.sent[1];
    assert_eq!(next.direction, Direction::Left);
    assert_eq!(next.board, Board::empty());
    assert!(next.seed);
    assert!(!harness.session.seed_pending());

    harness.reply(first_board(), 0, 2);
    harness.release().unwrap();
    harness.reply(first_board(), 0, 2);
    assert_eq!(harness.sent[2].board, first_board());
    assert_eq!(*harness.session.board(), first_board());
    assert!(!harness.session.awaiting_response());
}

#[test]
fn win_ends_the_session() {
    let mut harness = Harness::new();
    harness.press(Direction::Right).unwrap();
    let won = Board::from_rows([[2048, 4, 0, 0], [0, 0, 0, 0], [0, 0, 0, 0], [0, 0, 0, 0]]);
    harness.reply(won, 1, 2048);

    assert_eq!(harness.session.phase(), Phase::Won);
    assert_eq!(harness.closes, 1);
    let frame = harness.session.frame();
    assert_eq!(frame.banner, Some(Banner::Won));
    assert_eq!(frame.banner.map(Banner::text), Some("YOU WON! CONGRATS!"));

    let sent = harness.sent.len();
    assert!(matches!(harness.press(Direction::Up), Err(ClientError::SessionEnded)));
    assert!(matches!(harness.release(), Err(ClientError::SessionEnded)));
    assert_eq!(harness.sent.len(), sent);
}

#[test]
fn loss_shows_red_banner_and_blocks_input() {
    let mut harness = Harness::new();
    harness.press(Direction::Down).unwrap();
    let lost = Board::from_rows([[2, 4, 2, 4], [4, 2, 4, 2], [2, 4, 2, 4], [4, 2, 4, 512]]);
    harness.reply(lost, 255, 512);

    let frame = harness.session.frame();
    assert_eq!(frame.banner, Some(Banner::Lost));
    assert_eq!(Banner::Lost.text(), "YOU LOST! UNLUCKY!");
    assert_eq!(Banner::Lost.color(), Rgb(0xFF, 0x00, 0x00));
    assert_eq!(frame.background, "img/september_pixel.png");
    assert_eq!(harness.closes, 1);

    let sent = harness.sent.len();
    assert!(harness.press(Direction::Left).is_err());
    assert_eq!(harness.sent.len(), sent);
}

#[test]
fn queued_moves_drain_in_order() {
    let mut harness = Harness::new();
    harness.press(Direction::Up).unwrap();
    harness.press(Direction::Left).unwrap();
    harness.press(Direction::Down).unwrap();
    assert_eq!(harness.sent.len(), 1);

    harness.reply(first_board(), 0, 2);
    harness.reply(first_board(), 0, 2);
    harness.reply(first_board(), 0, 2);

    let directions: Vec<Direction> = harness.sent.iter().map(|r| r.direction).collect();
    assert_eq!(directions, vec![Direction::Up, Direction::Left, Direction::Down]);
    assert!(!harness.session.awaiting_response());
}
