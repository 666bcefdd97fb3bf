use x11rb::protocol::xproto::Window;

use crate::{
    bar::{BarLayout, BarPanels},
    layouts::LayoutKind,
    rect::Rect,
    states::ClientId,
    tags::{TagMask, TagSet},
};

/// What every new monitor starts with
#[derive(Debug, Copy, Clone, PartialEq)]
pub(crate) struct MonitorSettings {
    pub(crate) mfact: f64,
    pub(crate) nmaster: u32,
    pub(crate) show_bar: bool,
    pub(crate) top_bar: bool,
    pub(crate) panels: BarPanels,
}

#[derive(Debug)]
pub(crate) struct Monitor {
    /// The whole output
    pub(crate) rect: Rect,
    /// `rect` without the bar
    pub(crate) work: Rect,
    /// Negative when the bar is hidden
    pub(crate) bar_y: i32,
    /// The current and the previous layout
    pub(crate) layouts: [LayoutKind; 2],
    pub(crate) selected_layout: usize,
    pub(crate) mfact: f64,
    pub(crate) nmaster: u32,
    pub(crate) tagset: TagSet,
    /// Clients in the order they were attached, newest first
    pub(crate) clients: Vec<ClientId>,
    /// Clients by how recently they had focus
    pub(crate) stack: Vec<ClientId>,
    pub(crate) sel: Option<ClientId>,
    /// A hidden client shown only while it has focus
    pub(crate) revealed: Option<ClientId>,
    pub(crate) show_bar: bool,
    pub(crate) top_bar: bool,
    /// 0 until the window is created
    pub(crate) bar_window: Window,
    pub(crate) bar: BarLayout,
    panels: BarPanels,
}

impl Monitor {
    pub(crate) fn new(
        rect: Rect,
        settings: &MonitorSettings,
        bar_height: i32,
        tag_count: usize,
    ) -> Self {
        let mut mon = Self {
            rect,
            work: rect,
            bar_y: 0,
            layouts: [LayoutKind::Tile, LayoutKind::Floating],
            selected_layout: 0,
            mfact: settings.mfact,
            nmaster: settings.nmaster,
            tagset: TagSet::new(TagMask::from_bits(1)),
            clients: Vec::new(),
            stack: Vec::new(),
            sel: None,
            revealed: None,
            show_bar: settings.show_bar,
            top_bar: settings.top_bar,
            bar_window: x11rb::NONE,
            bar: BarLayout::new(rect.width as f64, bar_height as f64, tag_count, settings.panels),
            panels: settings.panels,
        };
        mon.update_bar_position(bar_height);
        mon
    }

    pub(crate) fn layout(&self) -> LayoutKind {
        self.layouts[self.selected_layout]
    }

    pub(crate) fn active_tags(&self) -> TagMask {
        self.tagset.active()
    }

    /// Where the bar window goes
    pub(crate) fn bar_rect(&self, bar_height: i32) -> Rect {
        Rect::new(self.work.x, self.bar_y, self.work.width, bar_height)
    }

    /// Take the bar out of the work area, or give its space back when it's hidden
    pub(crate) fn update_bar_position(&mut self, bar_height: i32) {
        self.work = self.rect;
        if self.show_bar {
            self.work.height -= bar_height;
            self.bar_y = if self.top_bar {
                self.work.y
            } else {
                self.work.y + self.work.height
            };
            if self.top_bar {
                self.work.y += bar_height;
            }
        } else {
            self.bar_y = -bar_height;
        }
    }

    /// Needed after the width, the bar height or the tags change
    pub(crate) fn update_bar_layout(&mut self, bar_height: i32, tag_count: usize) {
        self.bar = BarLayout::new(
            self.rect.width as f64,
            bar_height as f64,
            tag_count,
            self.panels,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(top_bar: bool) -> MonitorSettings {
        MonitorSettings {
            mfact: 0.55,
            nmaster: 1,
            show_bar: true,
            top_bar,
            panels: BarPanels {
                volume: false,
                input_method: false,
            },
        }
    }

    #[test]
    fn bar_takes_space_from_the_work_area() {
        let rect = Rect::new(1920, 0, 1920, 1080);
        let mut mon = Monitor::new(rect, &settings(true), 32, 9);
        assert_eq!(mon.work, Rect::new(1920, 32, 1920, 1048));
        assert_eq!(mon.bar_y, 0);
        assert_eq!(mon.layout(), LayoutKind::Tile);
        assert_eq!(mon.active_tags().bits(), 1);

        mon.show_bar = false;
        mon.update_bar_position(32);
        assert_eq!(mon.work, rect);
        assert_eq!(mon.bar_y, -32);
    }

    #[test]
    fn bottom_bar() {
        let mon = Monitor::new(Rect::new(0, 0, 800, 600), &settings(false), 20, 9);
        assert_eq!(mon.work, Rect::new(0, 0, 800, 580));
        assert_eq!(mon.bar_rect(20), Rect::new(0, 580, 800, 20));
    }
}
