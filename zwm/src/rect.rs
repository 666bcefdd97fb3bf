#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
pub(crate) struct Rect {
    pub(crate) x: i32,
    pub(crate) y: i32,
    pub(crate) width: i32,
    pub(crate) height: i32,
}

impl Rect {
    pub(crate) fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub(crate) fn right(&self) -> i32 {
        self.x + self.width
    }

    pub(crate) fn bottom(&self) -> i32 {
        self.y + self.height
    }

    pub(crate) fn contains_point(&self, x: i32, y: i32) -> bool {
        x >= self.x && x < self.right() && y >= self.y && y < self.bottom()
    }

    /// Area of the overlap between the two rectangles, 0 if they don't touch
    pub(crate) fn intersection_area(&self, other: &Rect) -> i64 {
        let w = 0.max(self.right().min(other.right()) - self.x.max(other.x));
        let h = 0.max(self.bottom().min(other.bottom()) - self.y.max(other.y));
        w as i64 * h as i64
    }
}

impl From<(i16, i16, u16, u16)> for Rect {
    fn from(r: (i16, i16, u16, u16)) -> Self {
        Self {
            x: r.0 as i32,
            y: r.1 as i32,
            width: r.2 as i32,
            height: r.3 as i32,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Rect;

    #[test]
    fn intersection() {
        let a = Rect::new(0, 0, 100, 100);
        assert_eq!(a.intersection_area(&Rect::new(50, 50, 100, 100)), 2500);
        assert_eq!(a.intersection_area(&Rect::new(100, 0, 10, 10)), 0);
        assert_eq!(a.intersection_area(&Rect::new(-10, -10, 5, 5)), 0);
    }

    #[test]
    fn points() {
        let a = Rect::new(10, 10, 10, 10);
        assert!(a.contains_point(10, 19));
        assert!(!a.contains_point(20, 10));
    }
}
