//! A thin abstraction over xproto::ModMask so it can be (de)serialized easily

use std::{
    convert::TryFrom,
    fmt::{self, Display},
    str::FromStr,
};

use {
    serde::{Deserialize, Serialize},
    x11rb::protocol::xproto::ModMask,
};

use common::ParseModMaskError;

#[derive(Debug, Serialize, Deserialize, Copy, Clone, PartialEq, Eq)]
#[serde(try_from = "String", into = "String")]
pub(crate) struct XModMask(ModMask);

impl XModMask {
    /// Left alt on most keyboards
    pub(crate) const ALT: Self = Self(ModMask::M1);
}

impl FromStr for XModMask {
    type Err = ParseModMaskError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "shift" => Ok(Self(ModMask::SHIFT)),
            "control" | "ctrl" => Ok(Self(ModMask::CONTROL)),
            "mod1" | "mod 1" | "alt" => Ok(Self(ModMask::M1)),
            "mod3" | "mod 3" => Ok(Self(ModMask::M3)),
            "mod4" | "mod 4" | "super" => Ok(Self(ModMask::M4)),
            "mod5" | "mod 5" => Ok(Self(ModMask::M5)),
            // Lock and (usually) Mod2 get stripped from every event, binding them makes no sense
            _ => Err(ParseModMaskError {
                mask: s.to_string(),
            }),
        }
    }
}

impl TryFrom<String> for XModMask {
    type Error = ParseModMaskError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<XModMask> for String {
    fn from(mask: XModMask) -> Self {
        match mask.0 {
            ModMask::SHIFT => String::from("Shift"),
            ModMask::CONTROL => String::from("Control"),
            ModMask::M1 => String::from("Mod 1"),
            ModMask::M3 => String::from("Mod 3"),
            ModMask::M4 => String::from("Mod 4"),
            ModMask::M5 => String::from("Mod 5"),
            _ => unreachable!(),
        }
    }
}

impl Display for XModMask {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", String::from(*self))
    }
}

impl From<XModMask> for ModMask {
    fn from(mask: XModMask) -> Self {
        mask.0
    }
}

impl From<XModMask> for u16 {
    fn from(mask: XModMask) -> Self {
        u16::from(mask.0)
    }
}

/// Keep only the real modifiers of `mask`, ignoring num lock and caps lock.
///
/// `numlock` is whatever modifier the keyboard mapping put Num_Lock on
pub(crate) fn clean_mask(mask: u16, numlock: u16) -> u16 {
    let modifiers = u16::from(
        ModMask::SHIFT
            | ModMask::CONTROL
            | ModMask::M1
            | ModMask::M2
            | ModMask::M3
            | ModMask::M4
            | ModMask::M5,
    );
    mask & !(numlock | u16::from(ModMask::LOCK)) & modifiers
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse() {
        assert_eq!("alt".parse::<XModMask>().unwrap(), XModMask(ModMask::M1));
        assert_eq!("Mod 4".parse::<XModMask>().unwrap(), XModMask(ModMask::M4));
        assert!("lock".parse::<XModMask>().is_err());
        assert_eq!(String::from(XModMask(ModMask::CONTROL)), "Control");
    }

    #[test]
    fn clean() {
        let numlock = u16::from(ModMask::M2);
        let mod1 = u16::from(ModMask::M1);
        let lock = u16::from(ModMask::LOCK);
        let button1 = 1 << 8;

        assert_eq!(clean_mask(mod1 | numlock | lock | button1, numlock), mod1);
        // Mod2 is a normal modifier if num lock lives somewhere else
        assert_eq!(
            clean_mask(numlock | lock, u16::from(ModMask::M5)),
            numlock
        );
    }
}
