use crate::{
    board::{Board, BOARD_SIZE},
    theme::{self, Rgb},
};

/// Complete style of one cell. Applying it overwrites everything a previous frame set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileStyle {
    pub background: Rgb,
    pub text: String,
    pub text_color: Rgb,
    pub font_px: u32,
}

impl TileStyle {
    pub fn for_value(value: u32) -> Self {
        match theme::tier_for(value) {
            Some(tier) => TileStyle {
                background: tier.background,
                text: value.to_string(),
                text_color: tier.text,
                font_px: tier.font_px,
            },
            None => TileStyle {
                background: theme::EMPTY_BACKGROUND,
                // values off the table still show their number, just unstyled
                text: if value == 0 {
                    String::new()
                } else {
                    value.to_string()
                },
                text_color: theme::EMPTY_TEXT,
                font_px: theme::BASE_FONT_PX,
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Banner {
    Won,
    Lost,
    Connecting,
    Disconnected,
}

impl Banner {
    pub fn text(self) -> &'static str {
        match self {
            Banner::Won => theme::WON_TEXT,
            Banner::Lost => theme::LOST_TEXT,
            Banner::Connecting => theme::CONNECTING_TEXT,
            Banner::Disconnected => theme::DISCONNECTED_TEXT,
        }
    }

    pub fn color(self) -> Rgb {
        match self {
            Banner::Won => theme::WON_COLOR,
            Banner::Lost => theme::LOST_COLOR,
            Banner::Connecting | Banner::Disconnected => theme::NOTICE_COLOR,
        }
    }
}

/// What a front end can do to show the game.
pub trait RenderTarget {
    /// `row` and `col` are zero based.
    fn set_cell(&mut self, row: usize, col: usize, style: &TileStyle);
    fn set_message(&mut self, text: &str, color: Rgb);
    fn clear_message(&mut self);
    fn set_background(&mut self, asset: &str);
    fn set_score(&mut self, score: u64);
}

/// Full visual state derived from one authoritative update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub cells: [[TileStyle; BOARD_SIZE]; BOARD_SIZE],
    pub background: &'static str,
    pub banner: Option<Banner>,
    pub score: u64,
}

impl Frame {
    pub fn compose(board: &Board, top_value: u32, banner: Option<Banner>, score: u64) -> Self {
        let rows = board.rows();
        Frame {
            cells: std::array::from_fn(|row| {
                std::array::from_fn(|col| TileStyle::for_value(rows[row][col]))
            }),
            background: theme::theme_for(top_value),
            banner,
            score,
        }
    }

    /// Pushes every cell, the banner and the background, so repeated calls converge.
    pub fn apply(&self, target: &mut impl RenderTarget) {
        for (row, cells) in self.cells.iter().enumerate() {
            for (col, style) in cells.iter().enumerate() {
                target.set_cell(row, col, style);
            }
        }

        match self.banner {
            Some(banner) => target.set_message(banner.text(), banner.color()),
            None => target.clear_message(),
        }

        target.set_background(self.background);
        target.set_score(self.score);
    }
}
