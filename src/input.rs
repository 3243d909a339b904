use crate::board::Direction;

/// Keyboard keys the client cares about, independent of the windowing layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    ArrowLeft,
    ArrowUp,
    ArrowRight,
    ArrowDown,
    Char(char),
    Other,
}

impl Key {
    /// Parses DOM-style key names such as `"ArrowLeft"` or `"w"`.
    pub fn from_name(name: &str) -> Self {
        match name {
            "ArrowLeft" => Key::ArrowLeft,
            "ArrowUp" => Key::ArrowUp,
            "ArrowRight" => Key::ArrowRight,
            "ArrowDown" => Key::ArrowDown,
            _ => {
                let mut chars = name.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Key::Char(c),
                    _ => Key::Other,
                }
            }
        }
    }

    pub fn direction(self) -> Option<Direction> {
        match self {
            Key::ArrowLeft => Some(Direction::Left),
            Key::ArrowUp => Some(Direction::Up),
            Key::ArrowRight => Some(Direction::Right),
            Key::ArrowDown => Some(Direction::Down),
            Key::Char(c) => match c.to_ascii_lowercase() {
                'a' => Some(Direction::Left),
                'w' => Some(Direction::Up),
                'd' => Some(Direction::Right),
                's' => Some(Direction::Down),
                _ => None,
            },
            Key::Other => None,
        }
    }
}
