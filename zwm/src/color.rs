//! A struct that allows good and more correct (de)serialisation for colors.
//! We parse and show them in hex (`#RRGGBB` or `#RRGGBBAA`) and turn them into pixels when needed

use std::{
    convert::TryFrom,
    fmt::{self, Display},
    str::FromStr,
};

use serde::{Deserialize, Serialize};

use common::ParseColorError;

const OPAQUE: u8 = 255;

#[derive(Debug, Serialize, Deserialize, Copy, Clone, PartialEq, Eq)]
#[serde(try_from = "String", into = "String")]
pub(crate) struct Color {
    red: u8,
    green: u8,
    blue: u8,
    alpha: u8,
}

impl Color {
    pub(crate) const fn rgb(red: u8, green: u8, blue: u8) -> Self {
        Self {
            red,
            green,
            blue,
            alpha: OPAQUE,
        }
    }

    pub(crate) const fn with_alpha(self, alpha: u8) -> Self {
        Self { alpha, ..self }
    }

    pub(crate) fn alpha(&self) -> u8 {
        self.alpha
    }

    fn premultiplied(&self) -> (u8, u8, u8) {
        let mul = |c: u8| (c as u16 * self.alpha as u16 / 255) as u8;
        (mul(self.red), mul(self.green), mul(self.blue))
    }

    /// The pixel value for a window with the given depth.
    ///
    /// Only a 32 bit visual has an alpha channel, and it expects premultiplied colors
    pub(crate) fn pixel(&self, depth: u8) -> u32 {
        if depth == 32 {
            let (r, g, b) = self.premultiplied();
            u32::from_be_bytes([self.alpha, r, g, b])
        } else {
            u32::from_be_bytes([0, self.red, self.green, self.blue])
        }
    }

    /// Bytes in the order a little endian ZPixmap of depth 24/32 stores them
    pub(crate) fn bgra(&self) -> [u8; 4] {
        let (r, g, b) = self.premultiplied();
        [b, g, r, self.alpha]
    }
}

impl FromStr for Color {
    type Err = ParseColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // We assume that we are parsing hex. If it's not valid we error
        let s = s
            .trim_start_matches(|c: char| !c.is_ascii_hexdigit())
            .trim_end();
        if s.len() != 6 && s.len() != 8 {
            return Err(ParseColorError {
                color: s.to_string(),
            });
        }
        let (r, s) = s.split_at(2);
        let red = u8::from_str_radix(r, 16)?;

        let (g, s) = s.split_at(2);
        let green = u8::from_str_radix(g, 16)?;

        let (b, a) = s.split_at(2);
        let blue = u8::from_str_radix(b, 16)?;

        let alpha = if a.is_empty() {
            OPAQUE
        } else {
            u8::from_str_radix(a, 16)?
        };

        Ok(Self {
            red,
            green,
            blue,
            alpha,
        })
    }
}

impl TryFrom<String> for Color {
    type Error = ParseColorError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", String::from(*self))
    }
}

impl From<Color> for String {
    fn from(c: Color) -> Self {
        if c.alpha == OPAQUE {
            format!("#{:02X}{:02X}{:02X}", c.red, c.green, c.blue)
        } else {
            format!(
                "#{:02X}{:02X}{:02X}{:02X}",
                c.red, c.green, c.blue, c.alpha
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse() {
        assert_eq!("#2D4F67".parse::<Color>().unwrap(), Color::rgb(0x2d, 0x4f, 0x67));
        assert_eq!(
            "727169cc".parse::<Color>().unwrap(),
            Color::rgb(0x72, 0x71, 0x69).with_alpha(0xcc)
        );
        assert!("#12345".parse::<Color>().is_err());
        assert!("#GG0000".parse::<Color>().is_err());
    }

    #[test]
    fn display_round_trips_alpha() {
        let c = Color::rgb(1, 2, 3).with_alpha(4);
        assert_eq!(c.to_string(), "#01020304");
        assert_eq!(Color::rgb(1, 2, 3).to_string(), "#010203");
    }

    #[test]
    fn pixels() {
        let c = Color::rgb(200, 100, 50).with_alpha(0);
        // no alpha channel, color is used as is
        assert_eq!(c.pixel(24), 0x00c8_6432);
        assert_eq!(c.pixel(32), 0);

        let c = Color::rgb(255, 0, 255).with_alpha(204);
        assert_eq!(c.pixel(32), 0xcccc_00cc);
    }
}
