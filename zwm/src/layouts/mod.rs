mod monocle;
mod tile;

use serde::{Deserialize, Serialize};

use crate::rect::Rect;

#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub(crate) enum LayoutKind {
    Tile,
    Floating,
    Monocle,
}

impl LayoutKind {
    /// Cells for `n` tiled clients inside `work`, in client order.
    ///
    /// The cells cover `work` exactly, gaps and borders are taken out by `place`.
    /// `None` means this layout doesn't move windows at all
    pub(crate) fn arrange(&self, work: Rect, n: usize, nmaster: u32, mfact: f64) -> Option<Vec<Rect>> {
        match self {
            LayoutKind::Tile => Some(tile::arrange(work, n, nmaster as usize, mfact)),
            LayoutKind::Monocle => Some(monocle::arrange(work, n)),
            LayoutKind::Floating => None,
        }
    }

    pub(crate) fn is_floating(&self) -> bool {
        *self == LayoutKind::Floating
    }

    /// Single tiled windows and monocle windows are drawn without border or gap
    pub(crate) fn borderless(&self, n: usize) -> bool {
        *self == LayoutKind::Monocle || n == 1
    }
}

/// Where a client with the given border goes inside its `cell`
pub(crate) fn place(cell: Rect, border: i32, gap: i32, borderless: bool) -> Rect {
    if borderless {
        // the border is still there, just pushed outside of the cell
        Rect::new(cell.x - border, cell.y - border, cell.width, cell.height)
    } else {
        Rect::new(
            cell.x + gap,
            cell.y + gap,
            cell.width - 2 * gap - 2 * border,
            cell.height - 2 * gap - 2 * border,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn floating_does_nothing() {
        assert!(LayoutKind::Floating
            .arrange(Rect::new(0, 0, 100, 100), 3, 1, 0.5)
            .is_none());
    }

    #[test]
    fn placement_keeps_outer_size() {
        let cell = Rect::new(10, 20, 300, 200);
        let p = place(cell, 5, 9, false);
        assert_eq!(p, Rect::new(19, 29, 300 - 18 - 10, 200 - 18 - 10));
        assert_eq!(p.width + 2 * 9 + 2 * 5, cell.width);

        let p = place(cell, 5, 9, true);
        assert_eq!(p, Rect::new(5, 15, 300, 200));
    }
}
