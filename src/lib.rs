use board::{Board, Direction};
use serde::{Deserialize, Serialize};

pub mod board;
pub mod client;
pub mod connection;
pub mod error;
pub mod input;
pub mod render;
pub mod session;
pub mod settings;
pub mod theme;

pub use error::ClientError;

/// Outbound message: the board the client believes in plus the move to apply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveRequest {
    pub board: Board,
    pub direction: Direction,
    /// Asks the server to place the opening tiles. Set on the first move only.
    pub seed: bool,
    /// Score carried over from the last update.
    pub points: u64,
}

/// Inbound message: the authoritative state after the server resolved a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerUpdate {
    pub board: Board,
    pub status_code: u8,
    pub top_value: u32,
    #[serde(default)]
    pub score: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameStatus {
    Ongoing,
    Won,
    Lost,
}

impl GameStatus {
    pub const ONGOING: u8 = 0;
    pub const WON: u8 = 1;
    pub const LOST: u8 = 255;

    /// Reserved codes come back as `None`.
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            Self::ONGOING => Some(GameStatus::Ongoing),
            Self::WON => Some(GameStatus::Won),
            Self::LOST => Some(GameStatus::Lost),
            _ => None,
        }
    }

    pub fn is_terminal(self) -> bool {
        !matches!(self, GameStatus::Ongoing)
    }
}

impl ServerUpdate {
    pub fn status(&self) -> Option<GameStatus> {
        GameStatus::from_code(self.status_code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_serializes_with_server_field_names() {
        let request = MoveRequest {
            board: Board::empty(),
            direction: Direction::Up,
            seed: true,
            points: 0,
        };
        let value: serde_json::Value = serde_json::to_value(&request).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "board": [[0, 0, 0, 0], [0, 0, 0, 0], [0, 0, 0, 0], [0, 0, 0, 0]],
                "direction": "w",
                "seed": true,
                "points": 0,
            })
        );
    }

    #[test]
    fn update_parses_without_score() {
        let update: ServerUpdate = serde_json::from_str(
            r#"{"board":[[2,0,0,0],[0,0,0,0],[0,0,0,0],[0,0,0,2]],"statusCode":0,"topValue":2}"#,
        )
        .unwrap();
        assert_eq!(update.status(), Some(GameStatus::Ongoing));
        assert_eq!(update.top_value, 2);
        assert_eq!(update.score, 0);
    }

    #[test]
    fn update_without_board_is_rejected() {
        assert!(serde_json::from_str::<ServerUpdate>(r#"{"statusCode":0,"topValue":2}"#).is_err());
    }

    #[test]
    fn status_codes() {
        assert_eq!(GameStatus::from_code(1), Some(GameStatus::Won));
        assert_eq!(GameStatus::from_code(255), Some(GameStatus::Lost));
        assert_eq!(GameStatus::from_code(7), None);
        assert!(GameStatus::Won.is_terminal());
        assert!(!GameStatus::Ongoing.is_terminal());
    }
}
