use crate::rect::Rect;

/// Every window takes the whole work area, only the top one is visible
pub(super) fn arrange(work: Rect, n: usize) -> Vec<Rect> {
    vec![work; n]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_equal_work_area() {
        let work = Rect::new(0, 30, 1920, 1050);
        let cells = arrange(work, 4);
        assert_eq!(cells.len(), 4);
        assert!(cells.iter().all(|c| *c == work));
    }
}
