use std::{fmt, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::shape::PieceKind;

/// RGBA color with 8 bits per channel.
///
/// Serialized as a `"#rrggbb"` or `"#rrggbbaa"` hex string.
///
/// # Example
///
/// ```
/// use stacker_engine::Color;
///
/// let color: Color = "#ff8000".parse().unwrap();
/// assert_eq!(color, Color::rgb(0xff, 0x80, 0x00));
/// assert_eq!(color.to_string(), "#ff8000ff");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Default for Color {
    fn default() -> Self {
        Self::WHITE
    }
}

impl Color {
    pub const WHITE: Self = Self::rgb(0xff, 0xff, 0xff);
    pub const GRAY: Self = Self::rgb(0x80, 0x80, 0x80);

    #[must_use]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 0xff }
    }

    #[must_use]
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Self { r, g, b, a } = self;
        write!(f, "#{r:02x}{g:02x}{b:02x}{a:02x}")
    }
}

#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("invalid color '{input}': expected #rrggbb or #rrggbbaa")]
pub struct ParseColorError {
    #[error(not(source))]
    input: String,
}

impl FromStr for Color {
    type Err = ParseColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseColorError {
            input: s.to_owned(),
        };
        let hex = s.strip_prefix('#').ok_or_else(err)?;
        if !(hex.len() == 6 || hex.len() == 8) || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(err());
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| err());
        let a = if hex.len() == 8 { channel(6)? } else { 0xff };
        Ok(Self::rgba(channel(0)?, channel(2)?, channel(4)?, a))
    }
}

impl Serialize for Color {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Landing colors for typed pieces, plus the fill used by plain pieces.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct Palette {
    pub i: Color,
    pub o: Color,
    pub s: Color,
    pub z: Color,
    pub j: Color,
    pub l: Color,
    pub t: Color,
    pub plain: Color,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            i: Color::rgb(0x00, 0xf0, 0xf0),
            o: Color::rgb(0xf0, 0xf0, 0x00),
            s: Color::rgb(0x00, 0xf0, 0x00),
            z: Color::rgb(0xf0, 0x00, 0x00),
            j: Color::rgb(0x00, 0x00, 0xf0),
            l: Color::rgb(0xf0, 0xa0, 0x00),
            t: Color::rgb(0xa0, 0x00, 0xf0),
            plain: Color::GRAY,
        }
    }
}

impl Palette {
    #[must_use]
    pub const fn color_for(&self, kind: PieceKind) -> Color {
        match kind {
            PieceKind::I => self.i,
            PieceKind::O => self.o,
            PieceKind::S => self.s,
            PieceKind::Z => self.z,
            PieceKind::J => self.j,
            PieceKind::L => self.l,
            PieceKind::T => self.t,
        }
    }
}
