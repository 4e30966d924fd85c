use anyhow::{anyhow, Result};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// An RGB colour with components in `0.0..=1.0`
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Colour {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Colour {
    pub const fn new_rgb(r: f32, g: f32, b: f32) -> Colour {
        Colour { r, g, b }
    }

    pub const fn new_grey(v: f32) -> Colour {
        Colour { r: v, g: v, b: v }
    }

    pub fn new_rgb_bytes(r: u8, g: u8, b: u8) -> Colour {
        Colour {
            r: r as f32 / 255.0,
            g: g as f32 / 255.0,
            b: b as f32 / 255.0,
        }
    }

    /// Parses `#rrggbb` or `rrggbb`
    pub fn from_hex(hex: &str) -> Result<Colour> {
        let digits = hex.trim().trim_start_matches('#');
        if digits.len() != 6 || !digits.is_ascii() {
            return Err(anyhow!("Invalid colour '{hex}', expected #rrggbb"));
        }
        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&digits[range], 16)
                .map_err(|_| anyhow!("Invalid colour '{hex}', expected #rrggbb"))
        };
        Ok(Colour::new_rgb_bytes(
            channel(0..2)?,
            channel(2..4)?,
            channel(4..6)?,
        ))
    }

    pub fn is_grey(&self) -> bool {
        self.r == self.g && self.g == self.b
    }
}

impl Default for Colour {
    fn default() -> Self {
        colours::BLACK
    }
}

impl fmt::Display for Colour {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let byte = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        write!(f, "#{:02x}{:02x}{:02x}", byte(self.r), byte(self.g), byte(self.b))
    }
}

impl Serialize for Colour {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Colour {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Colour::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

pub mod colours {
    use super::Colour;

    pub const BLACK: Colour = Colour::new_grey(0.0);
    pub const WHITE: Colour = Colour::new_grey(1.0);
    pub const RED: Colour = Colour::new_rgb(1.0, 0.0, 0.0);
    pub const GREEN: Colour = Colour::new_rgb(0.0, 0.5, 0.0);
    pub const BLUE: Colour = Colour::new_rgb(0.0, 0.0, 1.0);
    pub const LIGHT_GREY: Colour = Colour::new_grey(0.8);
    pub const MAROON: Colour = Colour::new_rgb(0.4, 0.0, 0.0);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn can_parse_hex_colours() {
        let c = Colour::from_hex("#ff0080").expect("can parse colour");
        assert_eq!(c.r, 1.0);
        assert_eq!(c.g, 0.0);
        assert!((c.b - 128.0 / 255.0).abs() < 1e-6);
        assert_eq!(c.to_string(), "#ff0080");
        assert!(Colour::from_hex("#ff00").is_err());
        assert!(Colour::from_hex("zzzzzz").is_err());
    }

    #[test]
    fn can_detect_greys() {
        assert!(colours::LIGHT_GREY.is_grey());
        assert!(!colours::MAROON.is_grey());
    }
}
