//! Visual height estimation for blocks
//!
//! Heights are approximations in layout units; they only need to be stable,
//! not pixel accurate. Character weights are tracked in half units so the
//! arithmetic stays integral: a wide (CJK, fullwidth) character counts 2,
//! anything else 1, and a line holds `2 * chars_per_line` half units.

use unicode_width::UnicodeWidthChar;

use super::block::BlockKind;
use crate::config::LayoutConfig;

/// Half-unit weight of one character
#[inline]
fn char_weight(c: char) -> u32 {
    match c.width() {
        Some(2) => 2,
        _ => 1,
    }
}

/// Number of wrapped lines a non-empty text occupies
pub fn estimate_lines(text: &str, layout: &LayoutConfig) -> u32 {
    let units: u32 = text.chars().map(char_weight).sum();
    let per_line = layout.chars_per_line.max(1) * 2;
    units.div_ceil(per_line).max(1)
}

/// Estimated rendered height of a text run; empty text has no height
pub fn estimate_text_height(text: &str, layout: &LayoutConfig) -> u32 {
    if text.is_empty() {
        return 0;
    }
    estimate_lines(text, layout) * layout.line_height + layout.text_margin
}

/// Estimated rendered height of a block
pub fn estimate_block_height(kind: &BlockKind, layout: &LayoutConfig) -> u32 {
    match kind {
        BlockKind::Heading { .. } => layout.heading_height,
        BlockKind::Spacer { .. } => layout.spacer_height,
        BlockKind::Image { .. } => layout.image_height,
        BlockKind::Paragraph { text } | BlockKind::Quote { text, .. } => {
            estimate_text_height(text, layout)
        }
        BlockKind::List { items, .. } => items
            .iter()
            .map(|item| estimate_text_height(item, layout))
            .sum(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::block::{HeadingLevel, ImageSource, SpacerSize};

    fn layout() -> LayoutConfig {
        LayoutConfig::default()
    }

    #[test]
    fn test_empty_text_has_no_height() {
        assert_eq!(estimate_text_height("", &layout()), 0);
    }

    #[test]
    fn test_short_text_takes_one_line() {
        // 1 line * 24 + 16
        assert_eq!(estimate_text_height("Hi", &layout()), 40);
    }

    #[test]
    fn test_latin_characters_weigh_half() {
        // 44 latin chars = 22 full units = exactly one line
        assert_eq!(estimate_lines(&"a".repeat(44), &layout()), 1);
        assert_eq!(estimate_lines(&"a".repeat(45), &layout()), 2);
    }

    #[test]
    fn test_wide_characters_weigh_full() {
        assert_eq!(estimate_lines(&"字".repeat(22), &layout()), 1);
        assert_eq!(estimate_lines(&"字".repeat(23), &layout()), 2);
        // 50 latin = 25 units -> 2 lines -> 64
        assert_eq!(estimate_text_height(&"A".repeat(50), &layout()), 64);
    }

    #[test]
    fn test_fixed_block_heights() {
        let layout = layout();
        assert_eq!(
            estimate_block_height(&BlockKind::heading(HeadingLevel::H1, "Title"), &layout),
            50
        );
        assert_eq!(
            estimate_block_height(&BlockKind::spacer(SpacerSize::Lg), &layout),
            30
        );
        assert_eq!(
            estimate_block_height(&BlockKind::image(ImageSource::Ref("img_1".into())), &layout),
            300
        );
    }

    #[test]
    fn test_list_sums_items() {
        let list = BlockKind::list(vec!["one".into(), "two".into(), "".into()], false);
        assert_eq!(estimate_block_height(&list, &layout()), 80);
    }
}
