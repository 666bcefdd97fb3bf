use super::{command_output, Source};

/// Volume of the default sink
#[derive(Debug, Copy, Clone, PartialEq)]
pub(crate) struct Volume {
    /// From 0.0 to 1.0, more if the sink is boosted
    pub(crate) volume: f64,
    pub(crate) muted: bool,
}

/// Asks wireplumber through `wpctl`
#[derive(Debug, Default)]
pub(crate) struct VolumeSource;

impl Source for VolumeSource {
    type Value = Volume;

    fn name(&self) -> &'static str {
        "volume"
    }

    fn poll(&mut self) -> Result<Volume, String> {
        let output = command_output("wpctl", &["get-volume", "@DEFAULT_AUDIO_SINK@"])?;
        parse_volume(&output).ok_or_else(|| format!("unexpected wpctl output: {:?}", output))
    }
}

/// Parse `Volume: 0.40` or `Volume: 0.40 [MUTED]`
fn parse_volume(output: &str) -> Option<Volume> {
    let mut words = output.split_whitespace();
    if words.next()? != "Volume:" {
        return None;
    }
    let volume = words.next()?.parse::<f64>().ok()?;
    let muted = words.any(|w| w == "[MUTED]");
    Some(Volume { volume, muted })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wpctl_output() {
        assert_eq!(
            parse_volume("Volume: 0.40"),
            Some(Volume {
                volume: 0.4,
                muted: false
            })
        );
        assert_eq!(
            parse_volume("Volume: 1.00 [MUTED]"),
            Some(Volume {
                volume: 1.0,
                muted: true
            })
        );
        assert_eq!(parse_volume(""), None);
        assert_eq!(parse_volume("Volume: loud"), None);
        assert_eq!(parse_volume("Error: no sink"), None);
    }
}
