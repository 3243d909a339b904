use crate::board::exponent;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const WHITE: Rgb = Rgb::from_hex(0xFFFFFF);
    pub const BLACK: Rgb = Rgb::from_hex(0x000000);

    pub const fn from_hex(hex: u32) -> Self {
        Rgb((hex >> 16) as u8, (hex >> 8) as u8, hex as u8)
    }
}

/// Presentation of one tile value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tier {
    pub value: u32,
    pub background: Rgb,
    pub text: Rgb,
    pub font_px: u32,
    pub theme: &'static str,
}

const fn tier(exponent: u32, background: u32, font_px: u32, theme: &'static str) -> Tier {
    let value = 1 << exponent;
    Tier {
        value,
        background: Rgb::from_hex(background),
        // large tiles switch to white text
        text: if value >= 1024 { Rgb::WHITE } else { Rgb::BLACK },
        font_px,
        theme,
    }
}

/// Index `i` holds the tier for `2^(i + 1)`.
pub const TIERS: [Tier; 11] = [
    tier(1, 0x368EAD, 17, "img/january_pixel.png"),
    tier(2, 0xC0ECFC, 20, "img/february_pixel.png"),
    tier(3, 0x87FFD3, 22, "img/march_pixel.png"),
    tier(4, 0x00FF7F, 25, "img/april_pixel.png"),
    tier(5, 0x00753A, 28, "img/may_pixel.png"),
    tier(6, 0xE5FF3B, 31, "img/june_pixel.png"),
    tier(7, 0xF7BA02, 33, "img/july_pixel.png"),
    tier(8, 0xB57602, 36, "img/august_pixel.png"),
    tier(9, 0xFA7A02, 39, "img/september_pixel.png"),
    tier(10, 0xFA2B02, 41, "img/october_pixel.png"),
    tier(11, 0x4D0D00, 44, "img/november_pixel.png"),
];

pub const EMPTY_BACKGROUND: Rgb = Rgb::WHITE;
pub const EMPTY_TEXT: Rgb = Rgb::BLACK;
pub const BASE_FONT_PX: u32 = 17;
pub const DEFAULT_THEME: &str = TIERS[0].theme;

pub const WON_TEXT: &str = "YOU WON! CONGRATS!";
pub const WON_COLOR: Rgb = Rgb::from_hex(0x332701);
pub const LOST_TEXT: &str = "YOU LOST! UNLUCKY!";
pub const LOST_COLOR: Rgb = Rgb::from_hex(0xFF0000);
pub const CONNECTING_TEXT: &str = "CONNECTING...";
pub const DISCONNECTED_TEXT: &str = "CONNECTION LOST - PRESS AN ARROW KEY TO RETRY";
pub const NOTICE_COLOR: Rgb = Rgb::from_hex(0x555555);

pub fn tier_for(value: u32) -> Option<&'static Tier> {
    let exponent = exponent(value)?;
    TIERS.get(exponent as usize - 1)
}

/// Background asset for the largest tile on the board.
pub fn theme_for(top_value: u32) -> &'static str {
    tier_for(top_value).map_or(DEFAULT_THEME, |tier| tier.theme)
}
