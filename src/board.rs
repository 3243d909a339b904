use serde::{Deserialize, Serialize};
use std::fmt;

pub const BOARD_SIZE: usize = 4;

/// Authoritative 4x4 grid as last reported by the server. `0` is an empty cell.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Board([[u32; BOARD_SIZE]; BOARD_SIZE]);

impl Board {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_rows(rows: [[u32; BOARD_SIZE]; BOARD_SIZE]) -> Self {
        Self(rows)
    }

    pub fn get(&self, row: usize, col: usize) -> Option<u32> {
        self.0.get(row)?.get(col).copied()
    }

    pub fn rows(&self) -> &[[u32; BOARD_SIZE]; BOARD_SIZE] {
        &self.0
    }

    /// Every cell in row-major order as `((row, col), value)`.
    pub fn cells(&self) -> impl Iterator<Item = ((usize, usize), u32)> + '_ {
        self.0.iter().enumerate().flat_map(|(row, cells)| {
            cells
                .iter()
                .enumerate()
                .map(move |(col, &value)| ((row, col), value))
        })
    }

    pub fn top_value(&self) -> u32 {
        self.cells().map(|(_, value)| value).max().unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.cells().all(|(_, value)| value == 0)
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.0.iter() {
            for (col, value) in row.iter().enumerate() {
                if col > 0 {
                    write!(f, " ")?;
                }
                if *value == 0 {
                    write!(f, "{:>5}", ".")?;
                } else {
                    write!(f, "{:>5}", value)?;
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Direction of a move request. `Resync` asks the server to echo the current state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    #[serde(rename = "a")]
    Left,
    #[serde(rename = "w")]
    Up,
    #[serde(rename = "d")]
    Right,
    #[serde(rename = "s")]
    Down,
    #[serde(rename = "e")]
    Resync,
}

impl Direction {
    pub fn is_move(self) -> bool {
        !matches!(self, Direction::Resync)
    }
}

/// `log2(value)` for powers of two from 2 upwards, `None` for anything else.
pub fn exponent(value: u32) -> Option<u32> {
    if value >= 2 && value.is_power_of_two() {
        Some(value.trailing_zeros())
    } else {
        None
    }
}
