use ratatui::layout::Rect;

pub fn rect_contains(rect: Rect, column: u16, row: u16) -> bool {
    if rect.width == 0 || rect.height == 0 {
        return false;
    }
    let max_x = rect.x.saturating_add(rect.width);
    let max_y = rect.y.saturating_add(rect.height);
    column >= rect.x && column < max_x && row >= rect.y && row < max_y
}

/// Place a `width` x `height` popup next to `anchor` inside `bounds`.
///
/// The popup opens below the anchor and flips above it when there are more
/// rows above than below. It is shifted left to stay inside `bounds` and
/// clamped when `bounds` is too small.
pub fn place_popup(anchor: Rect, width: u16, height: u16, bounds: Rect) -> Rect {
    let width = width.min(bounds.width);
    let bounds_bottom = bounds.y.saturating_add(bounds.height);
    let below_y = anchor.y.saturating_add(anchor.height);
    let space_below = bounds_bottom.saturating_sub(below_y);
    let space_above = anchor.y.saturating_sub(bounds.y);
    let (y, height) = if height <= space_below || space_below >= space_above {
        (below_y, height.min(space_below))
    } else {
        let height = height.min(space_above);
        (anchor.y.saturating_sub(height), height)
    };
    let max_x = bounds
        .x
        .saturating_add(bounds.width)
        .saturating_sub(width);
    let x = anchor.x.clamp(bounds.x, max_x.max(bounds.x));
    Rect {
        x,
        y,
        width,
        height,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect(x: u16, y: u16, width: u16, height: u16) -> Rect {
        Rect {
            x,
            y,
            width,
            height,
        }
    }

    #[test]
    fn rect_contains_edge_cases() {
        let r = rect(2, 3, 4, 2);
        assert!(rect_contains(r, 2, 3));
        assert!(rect_contains(r, 5, 4));
        assert!(!rect_contains(r, 6, 4));
        assert!(!rect_contains(r, 5, 5));
        assert!(!rect_contains(rect(0, 0, 0, 5), 0, 0));
    }

    #[test]
    fn popup_opens_below_when_it_fits() {
        let placed = place_popup(rect(2, 1, 6, 1), 20, 5, rect(0, 0, 80, 24));
        assert_eq!(placed, rect(2, 2, 20, 5));
    }

    #[test]
    fn popup_flips_above_near_bottom() {
        let placed = place_popup(rect(2, 20, 6, 1), 20, 8, rect(0, 0, 80, 24));
        assert_eq!(placed, rect(2, 12, 20, 8));
    }

    #[test]
    fn popup_shifts_left_and_clamps() {
        let placed = place_popup(rect(70, 0, 6, 1), 20, 5, rect(0, 0, 80, 24));
        assert_eq!(placed.x, 60);
        let tiny = place_popup(rect(0, 0, 3, 1), 20, 10, rect(0, 0, 10, 4));
        assert_eq!(tiny, rect(0, 1, 10, 3));
    }
}
