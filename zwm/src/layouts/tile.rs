use crate::rect::Rect;

/// The first `nmaster` windows stack on the left, everything else stacks on the right.
/// With `nmaster` or fewer windows the master column takes the whole width
pub(super) fn arrange(work: Rect, n: usize, nmaster: usize, mfact: f64) -> Vec<Rect> {
    if n == 0 {
        return Vec::new();
    }

    let master_width = if n > nmaster {
        if nmaster == 0 {
            0
        } else {
            (work.width as f64 * mfact) as i32
        }
    } else {
        work.width
    };

    let masters = n.min(nmaster);
    let mut cells = Vec::with_capacity(n);
    let (mut master_y, mut stack_y) = (0, 0);
    for i in 0..n {
        if i < nmaster {
            let height = (work.height - master_y) / (masters - i) as i32;
            cells.push(Rect::new(work.x, work.y + master_y, master_width, height));
            master_y += height;
        } else {
            let height = (work.height - stack_y) / (n - i) as i32;
            cells.push(Rect::new(
                work.x + master_width,
                work.y + stack_y,
                work.width - master_width,
                height,
            ));
            stack_y += height;
        }
    }
    cells
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn master_and_stack() {
        let work = Rect::new(0, 0, 1280, 800);
        let cells = arrange(work, 3, 1, 0.55);
        assert_eq!(cells[0], Rect::new(0, 0, 704, 800));
        assert_eq!(cells[1], Rect::new(704, 0, 576, 400));
        assert_eq!(cells[2], Rect::new(704, 400, 576, 400));
    }

    #[test]
    fn fewer_than_nmaster_takes_full_width() {
        let work = Rect::new(0, 30, 1000, 600);
        let cells = arrange(work, 2, 3, 0.55);
        assert_eq!(cells[0], Rect::new(0, 30, 1000, 300));
        assert_eq!(cells[1], Rect::new(0, 330, 1000, 300));
    }

    #[test]
    fn no_master() {
        let work = Rect::new(0, 0, 900, 900);
        let cells = arrange(work, 3, 0, 0.55);
        assert!(cells.iter().all(|c| c.x == 0 && c.width == 900));
        assert_eq!(cells.iter().map(|c| c.height).sum::<i32>(), 900);
    }

    #[test]
    fn heights_cover_the_work_area() {
        let work = Rect::new(0, 0, 1000, 1001);
        for n in 1..8 {
            for nmaster in 0..4 {
                let cells = arrange(work, n, nmaster, 0.6);
                assert_eq!(cells.len(), n);
                let area: i64 = cells.iter().map(|c| c.width as i64 * c.height as i64).sum();
                assert_eq!(area, 1000 * 1001);
            }
        }
    }
}
