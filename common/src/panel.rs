use std::{convert::TryFrom, str::FromStr};

use {
    derive_more::Display,
    serde::{Deserialize, Serialize},
};

use crate::{ParsePanelError, PANEL_COUNT, STATUS_PROPERTY};

/// A piece of text on the bar that other programs can set
#[derive(Display, Debug, Copy, Clone, Serialize, Deserialize, Eq, PartialEq, Hash)]
pub enum Panel {
    /// The text drawn inside the logo zone
    #[display(fmt = "status")]
    Status,
    /// One of the numbered side panels, the first one is drawn in the input method zone
    #[display(fmt = "panel{}", _0)]
    Numbered(u8),
}

impl Panel {
    /// The name of the root window property that holds the text of this panel
    pub fn property_name(&self) -> String {
        match self {
            Panel::Status => STATUS_PROPERTY.to_string(),
            Panel::Numbered(n) => format!("ZWM_PANEL{}_TEXT", n),
        }
    }

    /// Index into the panel text table, `None` for the status text
    pub fn index(&self) -> Option<usize> {
        match self {
            Panel::Status => None,
            Panel::Numbered(n) => Some(*n as usize),
        }
    }
}

impl TryFrom<u8> for Panel {
    type Error = ParsePanelError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        if (value as usize) < PANEL_COUNT {
            Ok(Self::Numbered(value))
        } else {
            Err(ParsePanelError {
                panel: value.to_string(),
            })
        }
    }
}

impl FromStr for Panel {
    type Err = ParsePanelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_ascii_lowercase();
        if s == "status" {
            return Ok(Self::Status);
        }

        let num = s.trim_start_matches("panel");
        num.parse::<u8>()
            .map_err(|_| ParsePanelError { panel: s.clone() })
            .and_then(Self::try_from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_panels() {
        assert_eq!("status".parse::<Panel>().unwrap(), Panel::Status);
        assert_eq!("panel1".parse::<Panel>().unwrap(), Panel::Numbered(1));
        assert_eq!("2".parse::<Panel>().unwrap(), Panel::Numbered(2));
        assert!("panel3".parse::<Panel>().is_err());
        assert!("volume".parse::<Panel>().is_err());
    }

    #[test]
    fn property_names() {
        assert_eq!(Panel::Status.property_name(), "WM_NAME");
        assert_eq!(Panel::Numbered(0).property_name(), "ZWM_PANEL0_TEXT");
    }
}
