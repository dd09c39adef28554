//! Pen and background palettes.

use serde::{Deserialize, Serialize};

/// An 8-bit straight-alpha RGBA color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgba {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha channel (255 = opaque).
    pub a: u8,
}

impl Rgba {
    /// Opaque black.
    pub const BLACK: Self = Self::opaque(0, 0, 0);
    /// Opaque white.
    pub const WHITE: Self = Self::opaque(255, 255, 255);

    /// Create an opaque color.
    #[must_use]
    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Channels as an `[r, g, b, a]` array.
    #[must_use]
    pub const fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }

    /// Hex string in `#rrggbb` form (alpha omitted).
    #[must_use]
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Pen colors offered by the pen picker.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PenColor {
    /// Black ink.
    #[default]
    Black,
    /// Red ink.
    Red,
    /// Blue ink.
    Blue,
    /// Green ink.
    Green,
    /// Purple ink.
    Purple,
}

impl PenColor {
    /// Every pen color, in picker order.
    pub const ALL: [Self; 5] = [Self::Black, Self::Red, Self::Blue, Self::Green, Self::Purple];

    /// The RGBA value painted for this pen.
    #[must_use]
    pub const fn rgba(self) -> Rgba {
        match self {
            Self::Black => Rgba::BLACK,
            Self::Red => Rgba::opaque(255, 0, 0),
            Self::Blue => Rgba::opaque(0, 0, 255),
            Self::Green => Rgba::opaque(0, 255, 0),
            Self::Purple => Rgba::opaque(128, 0, 128),
        }
    }
}

/// Canvas background colors offered by the background picker.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackgroundColor {
    /// Plain white paper.
    #[default]
    White,
    /// Warm off-white.
    Cream,
    /// Light gray.
    LightGray,
    /// Blackboard.
    Black,
}

impl BackgroundColor {
    /// Every background color, in picker order.
    pub const ALL: [Self; 4] = [Self::White, Self::Cream, Self::LightGray, Self::Black];

    /// The RGBA value used to fill the canvas.
    #[must_use]
    pub const fn rgba(self) -> Rgba {
        match self {
            Self::White => Rgba::WHITE,
            Self::Cream => Rgba::opaque(255, 247, 224),
            Self::LightGray => Rgba::opaque(170, 170, 170),
            Self::Black => Rgba::BLACK,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_palettes_are_opaque() {
        for pen in PenColor::ALL {
            assert_eq!(pen.rgba().a, 255);
        }
        for bg in BackgroundColor::ALL {
            assert_eq!(bg.rgba().a, 255);
        }
    }

    #[test]
    fn test_hex_formatting() {
        assert_eq!(PenColor::Purple.rgba().to_hex(), "#800080");
        assert_eq!(BackgroundColor::Cream.rgba().to_hex(), "#fff7e0");
    }

    #[test]
    fn test_serde_names() {
        let json = serde_json::to_string(&BackgroundColor::LightGray).expect("serialize");
        assert_eq!(json, "\"light_gray\"");
        let pen: PenColor = serde_json::from_str("\"green\"").expect("deserialize");
        assert_eq!(pen, PenColor::Green);
    }
}
