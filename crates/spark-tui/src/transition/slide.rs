use spark_core::reader::{Direction, SlideDirection};

use super::timing::lerp_u16;

fn window<T: Clone + Default>(lines: &[T], start: usize, len: usize) -> impl Iterator<Item = T> + '_ {
    (start..start + len).map(move |i| lines.get(i).cloned().unwrap_or_default())
}

/// One frame of a vertical page slide.
///
/// `shift` rows of the entering page are visible: a forward transition pushes
/// the exiting page up and brings the next page in from below, a backward one
/// does the opposite. Both pages keep the scroll offsets they were pinned at.
pub fn compose_vertical<T: Clone + Default>(
    exiting: &[T],
    exit_scroll: usize,
    entering: &[T],
    enter_scroll: usize,
    height: usize,
    shift: usize,
    direction: Direction,
) -> Vec<T> {
    let shift = shift.min(height);
    match direction {
        Direction::Forward => window(exiting, exit_scroll + shift, height - shift)
            .chain(window(entering, enter_scroll, shift))
            .collect(),
        Direction::Backward => window(entering, enter_scroll + height - shift, shift)
            .chain(window(exiting, exit_scroll, height - shift))
            .collect(),
        Direction::None => window(entering, enter_scroll, height).collect(),
    }
}

/// Columns to leave blank on the (left, right) of an incoming post
pub fn horizontal_inset(slide: SlideDirection, eased: f64, width: u16) -> (u16, u16) {
    let hidden = lerp_u16(width, 0, eased);
    match slide {
        SlideDirection::FromRight => (hidden, 0),
        SlideDirection::FromLeft => (0, hidden),
        SlideDirection::None => (0, 0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows(prefix: &str, n: usize) -> Vec<String> {
        (0..n).map(|i| format!("{}{}", prefix, i)).collect()
    }

    #[test]
    fn test_forward_slide_brings_next_page_from_below() {
        let old = rows("o", 10);
        let new = rows("n", 10);
        let frame = compose_vertical(&old, 4, &new, 0, 4, 1, Direction::Forward);
        assert_eq!(frame, vec!["o5", "o6", "o7", "n0"]);
    }

    #[test]
    fn test_backward_slide_brings_previous_page_from_above() {
        let old = rows("o", 10);
        let new = rows("n", 10);
        let frame = compose_vertical(&old, 0, &new, 6, 4, 3, Direction::Backward);
        assert_eq!(frame, vec!["n7", "n8", "n9", "o0"]);
    }

    #[test]
    fn test_short_pages_are_padded() {
        let old = rows("o", 2);
        let new = rows("n", 1);
        let frame = compose_vertical(&old, 0, &new, 0, 3, 2, Direction::Forward);
        assert_eq!(frame, vec!["".to_string(), "n0".to_string(), "".to_string()]);
    }

    #[test]
    fn test_idle_shows_entering_page_only() {
        let new = rows("n", 5);
        let frame = compose_vertical(&[], 0, &new, 2, 2, 9, Direction::None);
        assert_eq!(frame, vec!["n2", "n3"]);
    }

    #[test]
    fn test_horizontal_inset() {
        assert_eq!(horizontal_inset(SlideDirection::FromRight, 0.0, 80), (80, 0));
        assert_eq!(horizontal_inset(SlideDirection::FromRight, 0.5, 80), (40, 0));
        assert_eq!(horizontal_inset(SlideDirection::FromLeft, 0.75, 80), (0, 20));
        assert_eq!(horizontal_inset(SlideDirection::None, 0.1, 80), (0, 0));
    }
}
