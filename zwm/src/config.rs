use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};

use common::{LoadConfigError, TagValueError};

use crate::{
    color::Color, mod_mask::XModMask, rules::Rule, tags::MAX_TAGS, utils::expand_tilde,
};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Border of every client in pixels
    pub(crate) border_width: u32,
    /// Space around every tiled client
    pub(crate) gap: u32,
    /// Distance in pixels at which dragged windows snap to the edges of the work area
    pub(crate) snap: u32,
    /// The bar is this fraction of the screen height
    pub(crate) bar_height_ratio: f64,
    pub(crate) show_bar: bool,
    /// false puts the bar at the bottom
    pub(crate) top_bar: bool,
    pub(crate) focused_border_color: Color,
    pub(crate) normal_border_color: Color,
    /// Starting size of the master area, from 0.05 to 0.95
    pub(crate) mfact: f64,
    /// Starting number of clients in the master area
    pub(crate) nmaster: u32,
    /// One name per tag, at most 31
    pub(crate) tags: Vec<String>,
    pub(crate) rules: Vec<Rule>,
    pub(crate) mod_key: XModMask,
    /// Core X font used for the bar text
    pub(crate) font: String,
    /// Commands are run through `/bin/sh -c`
    pub(crate) terminal: String,
    pub(crate) launcher: String,
    pub(crate) lock: String,
    /// Image drawn on the root window of every monitor, the background color is used without it
    pub(crate) background: Option<PathBuf>,
    pub(crate) background_color: Color,
    /// Show the volume of the default sink, needs `wpctl`
    pub(crate) volume_panel: bool,
    /// Show the current input method, needs `fcitx5-remote`
    pub(crate) input_method_panel: bool,
    /// Also write logs to files in this directory
    pub(crate) log_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            border_width: 5, // pixels
            gap: 9,
            snap: 32,
            bar_height_ratio: 0.03,
            show_bar: true,
            top_bar: true,
            focused_border_color: Color::rgb(0x2d, 0x4f, 0x67),
            normal_border_color: Color::rgb(0x72, 0x71, 0x69).with_alpha(204),
            mfact: 0.55,
            nmaster: 1,
            tags: (1..=9).map(|i| i.to_string()).collect(),
            rules: Vec::new(),
            mod_key: XModMask::ALT,
            font: String::from("-misc-fixed-medium-r-normal--13-*-*-*-*-*-iso10646-1"),
            terminal: String::from("xterm"),
            launcher: String::from("rofi -show drun"),
            lock: String::from("xsecurelock"),
            background: None,
            background_color: Color::rgb(0x16, 0x16, 0x1d),
            volume_panel: true,
            input_method_panel: true,
            log_dir: None,
        }
    }
}

impl Config {
    /// `$XDG_CONFIG_HOME/zwm/config.ron`
    pub(crate) fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|mut dir| {
            dir.push("zwm");
            dir.push("config.ron");
            dir
        })
    }

    /// Load the config from `path`, or from the default path if it exists.
    ///
    /// Without any file the defaults are used. Environment overrides are applied in both cases
    pub(crate) fn load(path: Option<PathBuf>) -> Result<Self, LoadConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(&expand_tilde(&path))?,
            None => match Self::default_path().filter(|p| p.exists()) {
                Some(path) => Self::from_file(&path)?,
                None => Self::default(),
            },
        };

        config.apply_env_overrides(|var| std::env::var(var).ok());
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &Path) -> Result<Self, LoadConfigError> {
        log::info!("Loading configuration from {:?}", path);
        let content = fs::read_to_string(path)?;
        Self::from_ron(&content)
    }

    pub(crate) fn from_ron(content: &str) -> Result<Self, LoadConfigError> {
        let mut config: Self = ron::from_str(content)?;
        config.background = config.background.map(|p| expand_tilde(&p));
        config.log_dir = config.log_dir.map(|p| expand_tilde(&p));
        Ok(config)
    }

    pub(crate) fn to_ron(&self) -> Result<String, LoadConfigError> {
        Ok(ron::ser::to_string_pretty(
            self,
            ron::ser::PrettyConfig::default(),
        )?)
    }

    /// `ZWM_BG`, `ZWM_LAUNCHER`, `ZWM_TERM` and `ZWM_LOCK` win over the file
    pub(crate) fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(bg) = lookup("ZWM_BG") {
            self.background = Some(expand_tilde(Path::new(&bg)));
        }
        if let Some(launcher) = lookup("ZWM_LAUNCHER") {
            self.launcher = launcher;
        }
        if let Some(term) = lookup("ZWM_TERM") {
            self.terminal = term;
        }
        if let Some(lock) = lookup("ZWM_LOCK") {
            self.lock = lock;
        }
    }

    fn validate(&self) -> Result<(), LoadConfigError> {
        if self.tags.is_empty() || self.tags.len() > MAX_TAGS {
            return Err(LoadConfigError::new(
                TagValueError {
                    tag_num: self.tags.len(),
                }
                .to_string(),
            ));
        }
        for rule in &self.rules {
            let mask = rule
                .tag_mask()
                .map_err(|e| LoadConfigError::new(e.to_string()))?;
            if mask.masked(self.tags.len()) != mask {
                return Err(LoadConfigError::new(format!(
                    "Rule {:?} uses a tag that doesn't exist",
                    rule
                )));
            }
        }
        if !(0.05..=0.95).contains(&self.mfact) {
            return Err(LoadConfigError::new(format!(
                "mfact must be between 0.05 and 0.95, got {}",
                self.mfact
            )));
        }
        if !(0.0..0.5).contains(&self.bar_height_ratio) {
            return Err(LoadConfigError::new(format!(
                "bar_height_ratio must be between 0 and 0.5, got {}",
                self.bar_height_ratio
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use x11rb::protocol::xproto::ModMask;

    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.tags.len(), 9);
        assert_eq!(u16::from(config.mod_key), u16::from(ModMask::M1));
    }

    #[test]
    fn partial_file_uses_defaults() {
        let config = Config::from_ron("(gap: 0, top_bar: false, tags: [\"web\", \"code\"])").unwrap();
        assert_eq!(config.gap, 0);
        assert!(!config.top_bar);
        assert_eq!(config.tags, vec!["web", "code"]);
        assert_eq!(config.border_width, 5);
    }

    #[test]
    fn printed_config_parses_back() {
        let config = Config::default();
        let printed = config.to_ron().unwrap();
        let parsed = Config::from_ron(&printed).unwrap();
        assert_eq!(parsed.tags, config.tags);
        assert_eq!(parsed.normal_border_color, config.normal_border_color);
    }

    #[test]
    fn env_overrides() {
        let mut config = Config::default();
        config.apply_env_overrides(|var| match var {
            "ZWM_TERM" => Some(String::from("alacritty")),
            "ZWM_BG" => Some(String::from("/tmp/bg.png")),
            _ => None,
        });
        assert_eq!(config.terminal, "alacritty");
        assert_eq!(config.launcher, "rofi -show drun");
        assert_eq!(config.background, Some(PathBuf::from("/tmp/bg.png")));
    }

    #[test]
    fn invalid_values() {
        let mut config = Config::default();
        config.tags = (0..32).map(|i| i.to_string()).collect();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.mfact = 0.99;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.rules.push(Rule {
            tags: vec![10],
            ..Rule::default()
        });
        assert!(config.validate().is_err());
    }
}
