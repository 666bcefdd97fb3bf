//! ICCCM size hints and the clamping every resize goes through

use x11rb::properties::WmSizeHints;

use crate::rect::Rect;

/// The parts of WM_NORMAL_HINTS we care about. A zero means "no constraint".
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub(crate) struct SizeHints {
    pub(crate) base_width: i32,
    pub(crate) base_height: i32,
    pub(crate) inc_width: i32,
    pub(crate) inc_height: i32,
    pub(crate) max_width: i32,
    pub(crate) max_height: i32,
    pub(crate) min_width: i32,
    pub(crate) min_height: i32,
    pub(crate) min_aspect: f32,
    pub(crate) max_aspect: f32,
}

impl SizeHints {
    /// Base size falls back to min size and the other way around, like ICCCM 4.1.2.3 says
    pub(crate) fn from_wm(hints: &WmSizeHints) -> Self {
        let (base_width, base_height) = hints.base_size.or(hints.min_size).unwrap_or((0, 0));
        let (min_width, min_height) = hints.min_size.or(hints.base_size).unwrap_or((0, 0));
        let (inc_width, inc_height) = hints.size_increment.unwrap_or((0, 0));
        let (max_width, max_height) = hints.max_size.unwrap_or((0, 0));

        let (min_aspect, max_aspect) = match hints.aspect {
            Some((min, max)) if min.numerator != 0 && max.denominator != 0 => (
                min.denominator as f32 / min.numerator as f32,
                max.numerator as f32 / max.denominator as f32,
            ),
            _ => (0.0, 0.0),
        };

        Self {
            base_width,
            base_height,
            inc_width: inc_width.max(0),
            inc_height: inc_height.max(0),
            max_width: max_width.max(0),
            max_height: max_height.max(0),
            min_width: min_width.max(0),
            min_height: min_height.max(0),
            min_aspect,
            max_aspect,
        }
    }

    /// A window that can't be resized at all
    pub(crate) fn is_fixed(&self) -> bool {
        self.max_width != 0
            && self.max_height != 0
            && self.max_width == self.min_width
            && self.max_height == self.min_height
    }
}

/// Everything about the surroundings of a client that `apply_size_hints` needs
#[derive(Debug, Copy, Clone)]
pub(crate) struct HintArea {
    /// Size of the whole X screen
    pub(crate) screen: Rect,
    /// Work area of the monitor the client is on
    pub(crate) work: Rect,
    pub(crate) bar_height: i32,
    pub(crate) gap: i32,
    /// True if the client is floating or the layout doesn't arrange windows
    pub(crate) honor_hints: bool,
}

/// Clamp `proposed` for a window that currently occupies `current` with the given border.
///
/// Returns the adjusted rectangle and whether it differs from `current`.
pub(crate) fn apply_size_hints(
    current: Rect,
    border: i32,
    hints: Option<&SizeHints>,
    proposed: Rect,
    interact: bool,
    area: &HintArea,
) -> (Rect, bool) {
    let Rect {
        mut x,
        mut y,
        width: mut w,
        height: mut h,
    } = proposed;
    let outer_w = current.width + 2 * border + area.gap;
    let outer_h = current.height + 2 * border + area.gap;

    w = w.max(1);
    h = h.max(1);
    if interact {
        let screen = area.screen;
        if x > screen.right() {
            x = screen.right() - outer_w;
        }
        if y > screen.bottom() {
            y = screen.bottom() - outer_h;
        }
        if x + w + 2 * border < screen.x {
            x = screen.x;
        }
        if y + h + 2 * border < screen.y {
            y = screen.y;
        }
    } else {
        let work = area.work;
        if x >= work.right() {
            x = work.right() - outer_w;
        }
        if y >= work.bottom() {
            y = work.bottom() - outer_h;
        }
        if x + w + 2 * border <= work.x {
            x = work.x;
        }
        if y + h + 2 * border <= work.y {
            y = work.y;
        }
    }
    h = h.max(area.bar_height);
    w = w.max(area.bar_height);

    if let (true, Some(hints)) = (area.honor_hints, hints) {
        let base_is_min =
            hints.base_width == hints.min_width && hints.base_height == hints.min_height;
        if !base_is_min {
            // temporarily remove the base size
            w -= hints.base_width;
            h -= hints.base_height;
        }

        if hints.min_aspect > 0.0 && hints.max_aspect > 0.0 && w > 0 && h > 0 {
            if hints.max_aspect < w as f32 / h as f32 {
                w = (h as f32 * hints.max_aspect + 0.5) as i32;
            } else if hints.min_aspect < h as f32 / w as f32 {
                h = (w as f32 * hints.min_aspect + 0.5) as i32;
            }
        }

        if base_is_min {
            // the increment calculation requires this
            w -= hints.base_width;
            h -= hints.base_height;
        }

        if hints.inc_width > 0 {
            w -= w.rem_euclid(hints.inc_width);
        }
        if hints.inc_height > 0 {
            h -= h.rem_euclid(hints.inc_height);
        }

        w = (w + hints.base_width).max(hints.min_width);
        h = (h + hints.base_height).max(hints.min_height);
        if hints.max_width > 0 {
            w = w.min(hints.max_width);
        }
        if hints.max_height > 0 {
            h = h.min(hints.max_height);
        }
        w = w.max(1);
        h = h.max(1);
    }

    let adjusted = Rect::new(x, y, w, h);
    (adjusted, adjusted != current)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn area(honor_hints: bool) -> HintArea {
        HintArea {
            screen: Rect::new(0, 0, 1920, 1080),
            work: Rect::new(0, 30, 1920, 1050),
            bar_height: 30,
            gap: 0,
            honor_hints,
        }
    }

    #[test]
    fn tiled_clients_ignore_hints() {
        let hints = SizeHints {
            inc_width: 7,
            inc_height: 13,
            max_width: 200,
            ..SizeHints::default()
        };
        let current = Rect::new(0, 30, 100, 100);
        let proposed = Rect::new(0, 30, 960, 1050);
        let (r, changed) = apply_size_hints(current, 2, Some(&hints), proposed, false, &area(false));
        assert_eq!(r, proposed);
        assert!(changed);
    }

    #[test]
    fn floating_clients_honor_increments_and_max() {
        let hints = SizeHints {
            base_width: 4,
            base_height: 4,
            inc_width: 10,
            inc_height: 20,
            max_width: 500,
            ..SizeHints::default()
        };
        let current = Rect::new(100, 100, 100, 100);
        let (r, _) = apply_size_hints(
            current,
            2,
            Some(&hints),
            Rect::new(100, 100, 999, 117),
            false,
            &area(true),
        );
        assert_eq!(r.width, 500);
        // (117 - 4) truncated to a multiple of 20, then the base is added back
        assert_eq!(r.height, 104);
    }

    #[test]
    fn aspect_ratio_limits_width() {
        // exactly 1:1
        let hints = SizeHints {
            min_aspect: 1.0,
            max_aspect: 1.0,
            ..SizeHints::default()
        };
        let current = Rect::new(100, 100, 100, 100);
        let (r, _) = apply_size_hints(
            current,
            0,
            Some(&hints),
            Rect::new(100, 100, 400, 200),
            false,
            &area(true),
        );
        assert_eq!((r.width, r.height), (200, 200));
    }

    #[test]
    fn contradictory_min_max_takes_max() {
        let hints = SizeHints {
            min_width: 800,
            min_height: 800,
            base_width: 800,
            base_height: 800,
            max_width: 300,
            max_height: 300,
            ..SizeHints::default()
        };
        let (r, _) = apply_size_hints(
            Rect::new(0, 30, 10, 10),
            0,
            Some(&hints),
            Rect::new(0, 30, 1000, 1000),
            false,
            &area(true),
        );
        assert_eq!((r.width, r.height), (300, 300));
    }

    #[test]
    fn bar_height_is_the_minimum() {
        let (r, _) = apply_size_hints(
            Rect::new(0, 30, 10, 10),
            0,
            None,
            Rect::new(0, 30, -5, 3),
            false,
            &area(false),
        );
        assert_eq!((r.width, r.height), (30, 30));
    }

    #[test]
    fn non_interactive_stays_on_the_work_area() {
        let current = Rect::new(0, 30, 100, 100);
        let (r, _) = apply_size_hints(
            current,
            1,
            None,
            Rect::new(5000, -500, 100, 100),
            false,
            &area(true),
        );
        assert_eq!(r.x, 1920 - 102);
        assert_eq!(r.y, 30);
    }

    #[test]
    fn interactive_can_leave_the_work_area_partially() {
        let current = Rect::new(0, 30, 100, 100);
        let (r, _) = apply_size_hints(
            current,
            1,
            None,
            Rect::new(-50, 1000, 100, 100),
            true,
            &area(true),
        );
        assert_eq!((r.x, r.y), (-50, 1000));

        let (r, _) = apply_size_hints(
            current,
            1,
            None,
            Rect::new(-500, 2000, 100, 100),
            true,
            &area(true),
        );
        assert_eq!((r.x, r.y), (0, 1080 - 102));
    }

    #[test]
    fn idempotent_and_positive() {
        let hints = SizeHints {
            base_width: 3,
            base_height: 5,
            min_width: 10,
            min_height: 10,
            inc_width: 6,
            inc_height: 9,
            min_aspect: 0.5,
            max_aspect: 2.0,
            ..SizeHints::default()
        };
        let current = Rect::new(10, 40, 50, 50);
        for honor in [true, false] {
            for interact in [true, false] {
                for (w, h) in [(-10, -10), (0, 0), (1, 1000), (1000, 1), (333, 777)] {
                    let proposed = Rect::new(-3000, 3000, w, h);
                    let a = area(honor);
                    let first = apply_size_hints(current, 2, Some(&hints), proposed, interact, &a);
                    let second = apply_size_hints(current, 2, Some(&hints), proposed, interact, &a);
                    assert_eq!(first, second);
                    assert!(first.0.width > 0 && first.0.height > 0);
                }
            }
        }
    }

    #[test]
    fn unchanged_rect_is_reported() {
        let current = Rect::new(10, 40, 50, 50);
        let (_, changed) = apply_size_hints(current, 0, None, current, false, &area(true));
        assert!(!changed);
    }
}
