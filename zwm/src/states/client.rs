use x11rb::protocol::xproto::Window;

use crate::{rect::Rect, size_hints::SizeHints, tags::TagMask};

slotmap::new_key_type! {
    /// Stable handle to a managed window, stays valid while the window is managed
    pub(crate) struct ClientId;
}

/// Title of windows that don't set one
pub(crate) const BROKEN: &str = "broken";

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Client {
    pub(crate) window: Window,
    pub(crate) name: String,
    /// Position and size of the window content, without the border
    pub(crate) rect: Rect,
    pub(crate) old_rect: Rect,
    pub(crate) border: i32,
    pub(crate) old_border: i32,
    /// `None` until they are needed, and again after the window changes them
    pub(crate) hints: Option<SizeHints>,
    pub(crate) is_fixed: bool,
    pub(crate) floating: bool,
    /// What `floating` was before going fullscreen
    pub(crate) old_floating: bool,
    pub(crate) urgent: bool,
    pub(crate) fullscreen: bool,
    pub(crate) never_focus: bool,
    /// Iconified by us, still managed but not mapped
    pub(crate) hidden: bool,
    /// Index of the monitor this client is on
    pub(crate) monitor: usize,
    pub(crate) tags: TagMask,
}

impl Client {
    pub(crate) fn new(window: Window, rect: Rect, border: i32, monitor: usize) -> Self {
        Self {
            window,
            name: String::from(BROKEN),
            rect,
            old_rect: rect,
            border,
            old_border: border,
            hints: None,
            is_fixed: false,
            floating: false,
            old_floating: false,
            urgent: false,
            fullscreen: false,
            never_focus: false,
            hidden: false,
            monitor,
            tags: TagMask::EMPTY,
        }
    }

    /// Width including the border on both sides
    pub(crate) fn outer_width(&self) -> i32 {
        self.rect.width + 2 * self.border
    }

    pub(crate) fn outer_height(&self) -> i32 {
        self.rect.height + 2 * self.border
    }

    /// Move to `rect`, remembering where the window was
    pub(crate) fn set_rect(&mut self, rect: Rect) {
        self.old_rect = self.rect;
        self.rect = rect;
    }

    pub(crate) fn set_hints(&mut self, hints: SizeHints) {
        self.is_fixed = hints.is_fixed();
        self.hints = Some(hints);
    }

    /// Cover the whole `monitor` without a border. Returns false if already fullscreen
    pub(crate) fn enter_fullscreen(&mut self, monitor: Rect) -> bool {
        if self.fullscreen {
            return false;
        }
        self.fullscreen = true;
        self.old_floating = self.floating;
        self.old_border = self.border;
        self.border = 0;
        self.floating = true;
        self.set_rect(monitor);
        true
    }

    /// Undo `enter_fullscreen`. Returns false if it wasn't fullscreen
    pub(crate) fn leave_fullscreen(&mut self) -> bool {
        if !self.fullscreen {
            return false;
        }
        self.fullscreen = false;
        self.floating = self.old_floating;
        self.border = self.old_border;
        let previous = self.old_rect;
        self.set_rect(previous);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fullscreen_restores_previous_state() {
        let rect = Rect::new(100, 100, 300, 200);
        let mut client = Client::new(1, rect, 5, 0);
        let monitor = Rect::new(0, 0, 1920, 1080);

        assert!(client.enter_fullscreen(monitor));
        assert!(!client.enter_fullscreen(monitor));
        assert!(client.floating);
        assert_eq!(client.border, 0);
        assert_eq!(client.rect, monitor);

        assert!(client.leave_fullscreen());
        assert!(!client.leave_fullscreen());
        assert!(!client.floating);
        assert_eq!(client.border, 5);
        assert_eq!(client.rect, rect);
    }

    #[test]
    fn fixed_follows_hints() {
        let mut client = Client::new(1, Rect::new(0, 0, 10, 10), 1, 0);
        client.set_hints(SizeHints {
            min_width: 50,
            max_width: 50,
            min_height: 60,
            max_height: 60,
            ..SizeHints::default()
        });
        assert!(client.is_fixed);
        assert_eq!(client.outer_width(), 12);
    }
}
