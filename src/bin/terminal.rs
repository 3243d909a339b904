use bevy_2048::{
    board::BOARD_SIZE,
    client::Client,
    input::Key,
    render::{RenderTarget, TileStyle},
    session::Link,
    settings::ClientSettings,
    theme::Rgb,
    ClientError,
};
use colored::Colorize;
use log::{error, warn};
use std::{
    io::BufRead,
    time::{Duration, Instant},
};

const HELP: &str = "moves: w a s d (several per line are fine), r: resync, n: new game, q: quit";

fn main() {
    colog::init();

    let mut settings = ClientSettings::from_env();
    if let Some(endpoint) = std::env::args().nth(1) {
        settings.endpoint = endpoint;
    }

    let mut client = match Client::start(&settings) {
        Ok(client) => client,
        Err(e) => {
            error!("could not start game client: {}", e);
            std::process::exit(1);
        }
    };

    let mut screen = Screen::default();
    settle(&mut client, settings.response_timeout);
    draw(&mut client, &mut screen);
    println!("{}", HELP);

    for line in std::io::stdin().lock().lines() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                error!("{}", e);
                break;
            }
        };

        for c in line.trim().chars() {
            match c {
                'q' => return,
                'n' => client.restart(),
                'r' => report(client.key_up(Instant::now())),
                c => report(client.key_down(Key::Char(c), Instant::now())),
            }
            settle(&mut client, settings.response_timeout);
        }

        draw(&mut client, &mut screen);
    }
}

fn report(result: Result<(), ClientError>) {
    match result {
        Ok(()) => {}
        Err(ClientError::SessionEnded) => println!("game over, press n for a new game"),
        Err(e) => warn!("{}", e),
    }
}

/// Waits until the outstanding request is answered or has timed out.
fn settle(client: &mut Client, response_timeout: Duration) {
    let deadline = Instant::now() + response_timeout + Duration::from_millis(200);
    while busy(client) && Instant::now() < deadline {
        client.wait(Duration::from_millis(50));
    }
}

fn busy(client: &Client) -> bool {
    let session = client.session();
    session.awaiting_response() || session.queued() > 0 || session.link() == Link::Connecting
}

fn draw(client: &mut Client, screen: &mut Screen) {
    if let Some(frame) = client.take_frame() {
        frame.apply(screen);
        screen.print();
    }
}

#[derive(Default)]
struct Screen {
    cells: [[Option<TileStyle>; BOARD_SIZE]; BOARD_SIZE],
    message: Option<(String, Rgb)>,
    background: String,
    score: u64,
}

impl RenderTarget for Screen {
    fn set_cell(&mut self, row: usize, col: usize, style: &TileStyle) {
        self.cells[row][col] = Some(style.clone());
    }

    fn set_message(&mut self, text: &str, color: Rgb) {
        self.message = Some((text.to_string(), color));
    }

    fn clear_message(&mut self) {
        self.message = None;
    }

    fn set_background(&mut self, asset: &str) {
        self.background = asset.to_string();
    }

    fn set_score(&mut self, score: u64) {
        self.score = score;
    }
}

impl Screen {
    fn print(&self) {
        println!();
        println!("score {}  ({})", self.score, self.background.dimmed());
        for row in self.cells.iter() {
            let line: Vec<String> = row
                .iter()
                .map(|cell| match cell {
                    Some(style) => {
                        let Rgb(r, g, b) = style.background;
                        let Rgb(fr, fg, fb) = style.text_color;
                        format!("{:^6}", style.text)
                            .truecolor(fr, fg, fb)
                            .on_truecolor(r, g, b)
                            .to_string()
                    }
                    None => format!("{:^6}", ""),
                })
                .collect();
            println!("{}", line.join(" "));
        }
        if let Some((text, Rgb(r, g, b))) = &self.message {
            println!("{}", text.truecolor(*r, *g, *b).bold());
        }
    }
}
