//! What the bar shows and where. Turning that into pixels is the job of a `Renderer`
pub(crate) mod render;
pub(crate) mod text;

use crate::{layouts::LayoutKind, rect::Rect, states::ClientId, tags::TagMask, watchers::Volume};

/// A rectangle of the bar, in bar coordinates
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub(crate) struct Zone {
    pub(crate) x: f64,
    pub(crate) y: f64,
    pub(crate) w: f64,
    pub(crate) h: f64,
}

impl Zone {
    pub(crate) fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self { x, y, w, h }
    }

    /// Points on the edges don't count
    pub(crate) fn hit(&self, x: f64, y: f64) -> bool {
        self.x < x && self.x + self.w > x && self.y < y && self.y + self.h > y
    }

    /// `n` zones of equal width side by side
    pub(crate) fn split(&self, n: usize) -> Vec<Zone> {
        let w = self.w / n as f64;
        (0..n)
            .map(|i| Zone::new(self.x + w * i as f64, self.y, w, self.h))
            .collect()
    }

    pub(crate) fn inset(&self, margin: f64) -> Zone {
        Zone::new(
            self.x + margin,
            self.y + margin,
            (self.w - 2.0 * margin).max(0.0),
            (self.h - 2.0 * margin).max(0.0),
        )
    }

    /// Pixels covered by the zone. Neighbouring zones never overlap or leave a gap
    pub(crate) fn to_rect(&self) -> Rect {
        let x = self.x.round() as i32;
        let y = self.y.round() as i32;
        Rect::new(
            x,
            y,
            (self.x + self.w).round() as i32 - x,
            (self.y + self.h).round() as i32 - y,
        )
    }
}

/// Optional zones on the right side of the bar
#[derive(Debug, Copy, Clone, PartialEq)]
pub(crate) struct BarPanels {
    pub(crate) volume: bool,
    pub(crate) input_method: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct BarLayout {
    pub(crate) logo: Zone,
    pub(crate) tags: Zone,
    pub(crate) layout_button: Zone,
    /// Zero width when the bar is too narrow for it
    pub(crate) windows: Zone,
    pub(crate) input_method: Option<Zone>,
    pub(crate) volume: Option<Zone>,
    pub(crate) clock: Zone,
}

impl BarLayout {
    /// Logo, tags and the layout button go from the left, the clock and panels from the right.
    /// The window list gets whatever is left in between
    pub(crate) fn new(width: f64, height: f64, tag_count: usize, panels: BarPanels) -> Self {
        let zone = |x: f64, w: f64| Zone::new(x, 0.0, w, height);

        let logo = zone(0.0, height * 3.0);
        let tags = zone(logo.x + logo.w, height * 1.2 * tag_count as f64);
        let layout_button = zone(tags.x + tags.w, height * 1.2);
        let left = layout_button.x + layout_button.w;

        let mut right = width;
        let clock = zone(right - height * 4.0, height * 4.0);
        right = clock.x;

        let volume = panels.volume.then(|| {
            let z = zone(right - height * 2.5, height * 2.5);
            right = z.x;
            z
        });
        let input_method = panels.input_method.then(|| {
            let z = zone(right - height * 1.2, height * 1.2);
            right = z.x;
            z
        });

        let windows = if right > left {
            zone(left, right - left)
        } else {
            zone(left, 0.0)
        };

        Self {
            logo,
            tags,
            layout_button,
            windows,
            input_method,
            volume,
            clock,
        }
    }

    /// What is under the given point, `windows` are the clients listed on the bar
    pub(crate) fn hit(
        &self,
        x: f64,
        y: f64,
        tag_count: usize,
        windows: &[ClientId],
    ) -> Option<BarClick> {
        if self.logo.hit(x, y) {
            return Some(BarClick::Status);
        }
        if let Some(i) = self.tags.split(tag_count).iter().position(|z| z.hit(x, y)) {
            return TagMask::single(i).ok().map(BarClick::Tag);
        }
        if self.layout_button.hit(x, y) {
            return Some(BarClick::LayoutButton);
        }
        if windows.is_empty() {
            return None;
        }
        self.windows
            .split(windows.len())
            .iter()
            .position(|z| z.hit(x, y))
            .map(|i| BarClick::WinTitle(windows[i]))
    }
}

/// The parts of the bar a button can be bound to
#[derive(Debug, Copy, Clone, PartialEq)]
pub(crate) enum BarClick {
    Status,
    Tag(TagMask),
    LayoutButton,
    WinTitle(ClientId),
}

/// How a part of the bar looks, the renderer picks colors from it
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub(crate) enum Flavor {
    Logo,
    DateTime,
    TagSel,
    TagSelActive,
    TagSelOccupied,
    TagSelUrgent,
    WinSel,
    WinSelActive,
    WinSelHidden,
    LayoutButton,
    Volume,
    InputMethod,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum FrameContent {
    Empty,
    Text(String),
    /// Fill ratio of the volume bar, `None` if unknown
    Level(Option<f64>),
    Icon(LayoutKind),
}

/// One thing to draw
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Frame {
    pub(crate) zone: Zone,
    pub(crate) flavor: Flavor,
    /// Paint the background of the zone first
    pub(crate) fill: bool,
    pub(crate) content: FrameContent,
    /// A small triangle in the top left corner
    pub(crate) pin: Option<Flavor>,
}

impl Frame {
    fn new(zone: Zone, flavor: Flavor, fill: bool, content: FrameContent) -> Self {
        Self {
            zone,
            flavor,
            fill,
            content,
            pin: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct WindowEntry<'a> {
    pub(crate) name: &'a str,
    pub(crate) selected: bool,
    /// Hidden, or only shown until it loses focus
    pub(crate) hidden: bool,
}

/// Everything one bar shows
#[derive(Debug, Clone)]
pub(crate) struct BarContent<'a> {
    pub(crate) status: &'a str,
    pub(crate) clock: &'a str,
    pub(crate) tag_names: &'a [String],
    pub(crate) active_tags: TagMask,
    pub(crate) occupied: TagMask,
    pub(crate) urgent: TagMask,
    pub(crate) layout: LayoutKind,
    pub(crate) windows: Vec<WindowEntry<'a>>,
    pub(crate) volume: Option<Volume>,
    pub(crate) input_method: &'a str,
}

/// The frames of a bar, back to front
pub(crate) fn frames(layout: &BarLayout, content: &BarContent) -> Vec<Frame> {
    let text = |s: &str| FrameContent::Text(s.to_string());
    let mut frames = vec![
        Frame::new(layout.logo, Flavor::Logo, true, text(content.status)),
        Frame::new(layout.clock, Flavor::DateTime, true, text(content.clock)),
        Frame::new(layout.tags, Flavor::TagSel, true, FrameContent::Empty),
    ];

    let tag_zones = layout.tags.split(content.tag_names.len());
    for (i, (zone, name)) in tag_zones.iter().zip(content.tag_names).enumerate() {
        let active = content.active_tags.contains(i);
        let flavor = if active {
            Flavor::TagSelActive
        } else {
            Flavor::TagSel
        };
        let mut frame = Frame::new(*zone, flavor, active, text(name));
        if content.urgent.contains(i) {
            frame.pin = Some(Flavor::TagSelUrgent);
        } else if content.occupied.contains(i) {
            frame.pin = Some(Flavor::TagSelOccupied);
        }
        frames.push(frame);
    }

    frames.push(Frame::new(
        layout.layout_button,
        Flavor::LayoutButton,
        true,
        FrameContent::Icon(content.layout),
    ));

    if layout.windows.w > 0.0 {
        frames.push(Frame::new(
            layout.windows,
            Flavor::WinSel,
            true,
            FrameContent::Empty,
        ));
        let window_zones = layout.windows.split(content.windows.len());
        for (zone, entry) in window_zones.iter().zip(&content.windows) {
            let flavor = if entry.selected {
                Flavor::WinSelActive
            } else {
                Flavor::WinSel
            };
            let mut frame = Frame::new(*zone, flavor, entry.selected, text(entry.name));
            if entry.hidden {
                frame.pin = Some(Flavor::WinSelHidden);
            }
            frames.push(frame);
        }
    }

    if let Some(zone) = layout.volume {
        let level = content
            .volume
            .map(|v| if v.muted { 0.0 } else { v.volume.clamp(0.0, 1.0) });
        frames.push(Frame::new(
            zone,
            Flavor::Volume,
            true,
            FrameContent::Level(level),
        ));
    }

    if let Some(zone) = layout.input_method {
        frames.push(Frame::new(
            zone,
            Flavor::InputMethod,
            true,
            text(content.input_method),
        ));
    }

    frames
}
