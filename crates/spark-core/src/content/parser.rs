//! Markdown-like description parsing
//!
//! Older posts carry a single description string instead of structured pages.
//! The grammar is deliberately small: headings, quotes, whole-line images,
//! flat lists and paragraphs, with `---` lines separating page groups.

use std::sync::OnceLock;

use regex::Regex;
use tracing::debug;

use super::block::{Block, BlockKind, HeadingLevel, ImageSource, Page, SpacerSize};
use super::id::IdGenerator;
use super::paginate::paginate;
use crate::config::LayoutConfig;

pub const NO_CONTENT: &str = "No content.";
pub const NO_CONTENT_AVAILABLE: &str = "No content available.";

fn image_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^!\[(.*?)\]\((.*?)\)$").expect("valid image pattern"))
}

fn unordered_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[-*]\s").expect("valid bullet pattern"))
}

fn ordered_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^\d+\.\s+").expect("valid ordered pattern"))
}

fn page_break_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^\s*---\s*$").expect("valid page break pattern"))
}

/// Whether a trimmed line opens a new block and so ends a paragraph
fn starts_block(line: &str) -> bool {
    line.starts_with('#')
        || line.starts_with('>')
        || line.starts_with("![")
        || unordered_pattern().is_match(line)
        || ordered_pattern().is_match(line)
}

fn heading(line: &str) -> Option<(HeadingLevel, &str)> {
    if let Some(rest) = line.strip_prefix("### ") {
        Some((HeadingLevel::H3, rest))
    } else if let Some(rest) = line.strip_prefix("## ") {
        Some((HeadingLevel::H2, rest))
    } else {
        line.strip_prefix("# ").map(|rest| (HeadingLevel::H1, rest))
    }
}

/// List items collected until something else interrupts them
struct PendingList {
    ordered: bool,
    items: Vec<String>,
}

struct BlockParser<'a> {
    ids: &'a dyn IdGenerator,
    blocks: Vec<Block>,
    list: Option<PendingList>,
}

impl<'a> BlockParser<'a> {
    fn new(ids: &'a dyn IdGenerator) -> Self {
        Self {
            ids,
            blocks: Vec::new(),
            list: None,
        }
    }

    fn emit(&mut self, kind: BlockKind) {
        self.blocks.push(Block::new(self.ids, kind));
    }

    fn flush_list(&mut self) {
        if let Some(list) = self.list.take() {
            if !list.items.is_empty() {
                self.emit(BlockKind::list(list.items, list.ordered));
            }
        }
    }

    fn push_item(&mut self, ordered: bool, item: &str) {
        if self.list.as_ref().is_some_and(|l| l.ordered != ordered) {
            self.flush_list();
        }
        self.list
            .get_or_insert_with(|| PendingList {
                ordered,
                items: Vec::new(),
            })
            .items
            .push(item.trim().to_string());
    }

    fn parse(mut self, text: &str) -> Vec<Block> {
        let lines: Vec<&str> = text.lines().map(str::trim).collect();
        let mut i = 0;

        while i < lines.len() {
            let line = lines[i];

            if line.is_empty() {
                self.flush_list();
                if lines.get(i + 1).is_some_and(|next| next.is_empty()) {
                    self.emit(BlockKind::spacer(SpacerSize::Lg));
                    while i < lines.len() && lines[i].is_empty() {
                        i += 1;
                    }
                } else {
                    i += 1;
                }
                continue;
            }

            if unordered_pattern().is_match(line) {
                self.push_item(false, &line[1..]);
                i += 1;
                continue;
            }

            if let Some(m) = ordered_pattern().find(line) {
                self.push_item(true, &line[m.end()..]);
                i += 1;
                continue;
            }

            self.flush_list();

            if let Some((level, rest)) = heading(line) {
                self.emit(BlockKind::heading(level, rest.trim()));
                i += 1;
                continue;
            }

            if line.starts_with("> ") {
                let mut quoted = Vec::new();
                while i < lines.len() {
                    match lines[i].strip_prefix("> ") {
                        Some(rest) => quoted.push(rest),
                        None => break,
                    }
                    i += 1;
                }
                self.emit(BlockKind::quote(quoted.join("\n")));
                continue;
            }

            if let Some(caps) = image_pattern().captures(line) {
                let alt = caps.get(1).map_or("", |m| m.as_str());
                let src = caps.get(2).map_or("", |m| m.as_str());
                self.emit(BlockKind::Image {
                    source: ImageSource::from_src(src),
                    alt: Some(alt.to_string()),
                    caption: None,
                });
                i += 1;
                continue;
            }

            let mut parts = vec![line];
            i += 1;
            while i < lines.len() && !lines[i].is_empty() && !starts_block(lines[i]) {
                parts.push(lines[i]);
                i += 1;
            }
            self.emit(BlockKind::paragraph(parts.join(" ")));
        }

        self.flush_list();

        if self.blocks.is_empty() {
            self.emit(BlockKind::paragraph(NO_CONTENT));
        }
        self.blocks
    }
}

/// Parse a description string into blocks. Never returns an empty list.
pub fn parse_to_blocks(text: &str, ids: &dyn IdGenerator) -> Vec<Block> {
    BlockParser::new(ids).parse(text)
}

/// Split a description on `---` lines and paginate each group on its own.
///
/// The title image, when given, opens the first page produced. Groups that
/// hold nothing but whitespace are skipped.
pub fn parse_to_pages(
    description: &str,
    title_image: Option<&ImageSource>,
    layout: &LayoutConfig,
    ids: &dyn IdGenerator,
) -> Vec<Page> {
    let mut segments: Vec<Vec<&str>> = vec![Vec::new()];
    for line in description.lines() {
        if page_break_pattern().is_match(line) {
            segments.push(Vec::new());
        } else if let Some(segment) = segments.last_mut() {
            segment.push(line);
        }
    }

    let mut pages: Vec<Page> = Vec::new();
    for segment in segments {
        let text = segment.join("\n");
        if text.trim().is_empty() {
            continue;
        }
        let blocks = parse_to_blocks(&text, ids);
        let image = if pages.is_empty() { title_image } else { None };
        pages.extend(paginate(&blocks, layout.page_height_limit, image, layout, ids));
    }

    if pages.is_empty() {
        debug!(has_title_image = title_image.is_some(), "Empty description");
        return match title_image {
            Some(_) => paginate(&[], layout.page_height_limit, title_image, layout, ids),
            None => vec![Page::new(
                ids,
                vec![Block::new(ids, BlockKind::paragraph(NO_CONTENT_AVAILABLE))],
            )],
        };
    }

    pages
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::id::SequentialIds;

    fn kinds(blocks: &[Block]) -> Vec<BlockKind> {
        blocks.iter().map(|b| b.kind.clone()).collect()
    }

    #[test]
    fn test_heading_paragraph_spacer_list() {
        let ids = SequentialIds::new("b");
        let blocks = parse_to_blocks("# Title\n\nHello world.\n\n\n- one\n- two", &ids);

        assert_eq!(
            kinds(&blocks),
            vec![
                BlockKind::heading(HeadingLevel::H1, "Title"),
                BlockKind::paragraph("Hello world."),
                BlockKind::spacer(SpacerSize::Lg),
                BlockKind::list(vec!["one".into(), "two".into()], false),
            ]
        );
    }

    #[test]
    fn test_blank_run_yields_single_spacer() {
        let ids = SequentialIds::new("b");
        let blocks = parse_to_blocks("First.\n\n\n\n\nSecond.", &ids);
        assert_eq!(
            kinds(&blocks),
            vec![
                BlockKind::paragraph("First."),
                BlockKind::spacer(SpacerSize::Lg),
                BlockKind::paragraph("Second."),
            ]
        );
    }

    #[test]
    fn test_paragraph_lines_join_until_block_start() {
        let ids = SequentialIds::new("b");
        let blocks = parse_to_blocks("line one\nline two\n## Next\n  indented  ", &ids);
        assert_eq!(
            kinds(&blocks),
            vec![
                BlockKind::paragraph("line one line two"),
                BlockKind::heading(HeadingLevel::H2, "Next"),
                BlockKind::paragraph("indented"),
            ]
        );
    }

    #[test]
    fn test_multiline_quote() {
        let ids = SequentialIds::new("b");
        let blocks = parse_to_blocks("> first\n> second\nafter", &ids);
        assert_eq!(
            kinds(&blocks),
            vec![
                BlockKind::quote("first\nsecond"),
                BlockKind::paragraph("after"),
            ]
        );
    }

    #[test]
    fn test_images_and_sources() {
        let ids = SequentialIds::new("b");
        let blocks = parse_to_blocks("![A cat](img_2)\n![](https://x.io/cat.png)", &ids);
        assert_eq!(
            kinds(&blocks),
            vec![
                BlockKind::Image {
                    source: ImageSource::Ref("img_2".into()),
                    alt: Some("A cat".into()),
                    caption: None,
                },
                BlockKind::Image {
                    source: ImageSource::Url("https://x.io/cat.png".into()),
                    alt: Some(String::new()),
                    caption: None,
                },
            ]
        );
    }

    #[test]
    fn test_list_type_switch_flushes() {
        let ids = SequentialIds::new("b");
        let blocks = parse_to_blocks("- a\n* b\n1. c\n2. d\ntext", &ids);
        assert_eq!(
            kinds(&blocks),
            vec![
                BlockKind::list(vec!["a".into(), "b".into()], false),
                BlockKind::list(vec!["c".into(), "d".into()], true),
                BlockKind::paragraph("text"),
            ]
        );
    }

    #[test]
    fn test_heading_levels() {
        let ids = SequentialIds::new("b");
        let blocks = parse_to_blocks("# One\n## Two\n### Three\n#### Four", &ids);
        assert_eq!(
            kinds(&blocks),
            vec![
                BlockKind::heading(HeadingLevel::H1, "One"),
                BlockKind::heading(HeadingLevel::H2, "Two"),
                BlockKind::heading(HeadingLevel::H3, "Three"),
                BlockKind::paragraph("#### Four"),
            ]
        );
    }

    #[test]
    fn test_empty_input_gives_placeholder() {
        let ids = SequentialIds::new("b");
        for input in ["", "\n", "   "] {
            let blocks = parse_to_blocks(input, &ids);
            assert_eq!(kinds(&blocks), vec![BlockKind::paragraph(NO_CONTENT)]);
        }
    }

    #[test]
    fn test_page_breaks_start_new_pages() {
        let ids = SequentialIds::new("b");
        let layout = LayoutConfig::default();
        let pages = parse_to_pages("Page one.\n---\nPage two.\n  ---  \n\n---\nPage three.", None, &layout, &ids);

        assert_eq!(pages.len(), 3);
        assert_eq!(pages[0].blocks[0].kind.text(), Some("Page one."));
        assert_eq!(pages[2].blocks[0].kind.text(), Some("Page three."));
    }

    #[test]
    fn test_title_image_only_on_first_page() {
        let ids = SequentialIds::new("b");
        let layout = LayoutConfig::default();
        let cover = ImageSource::Url("cover.png".into());
        let pages = parse_to_pages("One.\n---\nTwo.", Some(&cover), &layout, &ids);

        assert_eq!(pages.len(), 2);
        assert_eq!(pages[0].blocks.len(), 3);
        assert_eq!(pages[0].blocks[0].kind.name(), "image");
        assert_eq!(pages[1].blocks.len(), 1);
    }

    #[test]
    fn test_empty_description_placeholders() {
        let ids = SequentialIds::new("b");
        let layout = LayoutConfig::default();

        let pages = parse_to_pages("", None, &layout, &ids);
        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].blocks[0].kind.text(), Some(NO_CONTENT_AVAILABLE));

        let cover = ImageSource::Ref("cover".into());
        let pages = parse_to_pages("---\n\n---", Some(&cover), &layout, &ids);
        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].blocks[0].kind.name(), "image");
    }
}
