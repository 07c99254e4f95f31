//! Greedy packing of blocks into height-bounded pages

use std::sync::OnceLock;

use regex::Regex;
use tracing::debug;

use super::block::{Block, BlockKind, ImageSource, Page, SpacerSize};
use super::estimate::{estimate_block_height, estimate_text_height};
use super::id::IdGenerator;
use crate::config::LayoutConfig;

const TITLE_IMAGE_ALT: &str = "Title Image";

fn sentence_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"[^.!?。！？]*[.!?。！？]+|[^.!?。！？]+").expect("valid sentence pattern")
    })
}

fn word_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\s*\S+\s*").expect("valid word pattern"))
}

/// Running state of one pagination pass
struct PageBuilder<'a> {
    layout: &'a LayoutConfig,
    ids: &'a dyn IdGenerator,
    limit: u32,
    pages: Vec<Page>,
    current: Vec<Block>,
    height: u32,
}

impl<'a> PageBuilder<'a> {
    fn new(layout: &'a LayoutConfig, ids: &'a dyn IdGenerator, limit: u32) -> Self {
        Self {
            layout,
            ids,
            limit,
            pages: Vec::new(),
            current: Vec::new(),
            height: 0,
        }
    }

    fn push(&mut self, block: Block, height: u32) {
        self.current.push(block);
        self.height += height;
    }

    fn flush(&mut self) {
        if self.current.is_empty() {
            return;
        }
        let blocks = std::mem::take(&mut self.current);
        self.pages.push(Page::new(self.ids, blocks));
        self.height = 0;
    }

    fn push_title_image(&mut self, source: &ImageSource) {
        let image = BlockKind::Image {
            source: source.clone(),
            alt: Some(TITLE_IMAGE_ALT.to_string()),
            caption: None,
        };
        let spacer = BlockKind::spacer(SpacerSize::Md);
        let image_height = estimate_block_height(&image, self.layout);
        let spacer_height = estimate_block_height(&spacer, self.layout);
        self.push(Block::new(self.ids, image), image_height);
        self.push(Block::new(self.ids, spacer), spacer_height);
    }

    fn add(&mut self, block: &Block) {
        let block_height = estimate_block_height(&block.kind, self.layout);

        if self.height + block_height > self.limit && !self.current.is_empty() {
            self.flush();
        }

        if block_height <= self.limit {
            self.push(block.clone(), block_height);
            return;
        }

        match block.kind.text() {
            Some(text) if block.kind.is_splittable() => {
                self.split(&block.kind, text);
            }
            _ => {
                debug!(
                    kind = block.kind.name(),
                    height = block_height,
                    limit = self.limit,
                    "Block exceeds page height, keeping it whole"
                );
                self.push(block.clone(), block_height);
            }
        }
    }

    /// Spread an oversized paragraph or quote over as many pages as needed
    fn split(&mut self, kind: &BlockKind, text: &str) {
        let units = self.split_units(text);
        debug!(
            kind = kind.name(),
            units = units.len(),
            "Splitting oversized block"
        );

        let mut buffer = String::new();
        for unit in units {
            if !buffer.is_empty() {
                let candidate = format!("{}{}", buffer, unit);
                let candidate_height = estimate_text_height(candidate.trim(), self.layout);
                if self.height + candidate_height > self.limit {
                    self.emit_chunk(kind, &buffer);
                    self.flush();
                    buffer.clear();
                }
            }
            buffer.push_str(unit);
        }

        self.emit_chunk(kind, &buffer);
    }

    fn emit_chunk(&mut self, kind: &BlockKind, buffer: &str) {
        let chunk = buffer.trim();
        if chunk.is_empty() {
            return;
        }
        if let Some(chunk_kind) = kind.with_text(chunk.to_string()) {
            let height = estimate_text_height(chunk, self.layout);
            self.push(Block::new(self.ids, chunk_kind), height);
        }
    }

    /// Sentences, with any sentence that alone overflows broken into words
    fn split_units<'t>(&self, text: &'t str) -> Vec<&'t str> {
        let mut units = Vec::new();
        for sentence in sentence_pattern().find_iter(text) {
            let sentence = sentence.as_str();
            if estimate_text_height(sentence.trim(), self.layout) > self.limit {
                units.extend(word_pattern().find_iter(sentence).map(|m| m.as_str()));
            } else {
                units.push(sentence);
            }
        }
        units
    }

    fn finish(mut self) -> Vec<Page> {
        self.flush();
        if self.pages.is_empty() {
            self.pages.push(Page::new(self.ids, Vec::new()));
        }
        self.pages
    }
}

/// Pack `blocks` into pages whose estimated height stays within `height_limit`.
///
/// A page only exceeds the limit when it holds a single block that cannot be
/// split (list, image, heading, spacer, or a single overlong word). The
/// optional title image and an `md` spacer open the first page and count
/// against its budget. Always returns at least one page.
pub fn paginate(
    blocks: &[Block],
    height_limit: u32,
    title_image: Option<&ImageSource>,
    layout: &LayoutConfig,
    ids: &dyn IdGenerator,
) -> Vec<Page> {
    let mut builder = PageBuilder::new(layout, ids, height_limit);

    if let Some(source) = title_image {
        builder.push_title_image(source);
    }

    for block in blocks {
        builder.add(block);
    }

    let pages = builder.finish();
    debug!(
        blocks = blocks.len(),
        pages = pages.len(),
        limit = height_limit,
        "Paginated blocks"
    );
    pages
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::block::HeadingLevel;
    use crate::content::id::SequentialIds;

    fn layout() -> LayoutConfig {
        LayoutConfig::default()
    }

    fn page_height(page: &Page, layout: &LayoutConfig) -> u32 {
        page.blocks
            .iter()
            .map(|b| estimate_block_height(&b.kind, layout))
            .sum()
    }

    fn texts(pages: &[Page]) -> String {
        pages
            .iter()
            .flat_map(|p| p.blocks.iter())
            .filter_map(|b| b.kind.text())
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn squash(s: &str) -> String {
        s.chars().filter(|c| !c.is_whitespace()).collect()
    }

    #[test]
    fn test_two_paragraphs_and_image() {
        let ids = SequentialIds::new("b");
        let blocks = vec![
            Block::new(&ids, BlockKind::paragraph("A".repeat(50))),
            Block::new(&ids, BlockKind::paragraph("B".repeat(50))),
            Block::new(&ids, BlockKind::image(ImageSource::Ref("img_1".into()))),
        ];

        let pages = paginate(&blocks, 350, None, &layout(), &ids);

        // 64 + 64 fit; the image (300) would overflow 350 so it opens page 2
        assert_eq!(pages.len(), 2);
        assert_eq!(pages[0].blocks.len(), 2);
        assert_eq!(pages[1].blocks.len(), 1);
        assert_eq!(pages[1].blocks[0].kind.name(), "image");
        assert_eq!(pages[0].blocks[0].id, blocks[0].id);
    }

    #[test]
    fn test_empty_input_yields_one_empty_page() {
        let ids = SequentialIds::new("p");
        let pages = paginate(&[], 800, None, &layout(), &ids);
        assert_eq!(pages.len(), 1);
        assert!(pages[0].is_empty());

        let again = paginate(&[], 800, None, &layout(), &ids);
        assert_eq!(again.len(), 1);
        assert!(again[0].is_empty());
    }

    #[test]
    fn test_title_image_opens_first_page() {
        let ids = SequentialIds::new("b");
        let cover = ImageSource::Url("https://cdn.example.com/cover.png".into());
        let blocks = vec![Block::new(&ids, BlockKind::paragraph("Hello."))];

        let pages = paginate(&blocks, 800, Some(&cover), &layout(), &ids);

        assert_eq!(pages.len(), 1);
        let first = &pages[0].blocks;
        assert_eq!(first.len(), 3);
        match &first[0].kind {
            BlockKind::Image { source, alt, .. } => {
                assert_eq!(source, &cover);
                assert_eq!(alt.as_deref(), Some("Title Image"));
            }
            other => panic!("expected image, got {:?}", other),
        }
        assert_eq!(first[1].kind, BlockKind::spacer(SpacerSize::Md));
    }

    #[test]
    fn test_title_image_counts_against_budget() {
        let ids = SequentialIds::new("b");
        let cover = ImageSource::Ref("cover".into());
        // image 300 + spacer 30 leaves 20 of 350, a heading (50) must move on
        let blocks = vec![Block::new(&ids, BlockKind::heading(HeadingLevel::H1, "T"))];

        let pages = paginate(&blocks, 350, Some(&cover), &layout(), &ids);

        assert_eq!(pages.len(), 2);
        assert_eq!(pages[0].blocks.len(), 2);
        assert_eq!(pages[1].blocks[0].kind.name(), "heading");
    }

    #[test]
    fn test_oversized_paragraph_splits_on_sentences() {
        let layout = layout();
        let ids = SequentialIds::new("b");
        let sentence = "This sentence has a handful of words in it. ";
        let text = sentence.repeat(12);
        let blocks = vec![Block::new(&ids, BlockKind::paragraph(text.clone()))];

        let pages = paginate(&blocks, 200, None, &layout, &ids);

        assert!(pages.len() > 1);
        for page in &pages {
            assert!(page_height(page, &layout) <= 200);
            for block in &page.blocks {
                let chunk = block.kind.text().unwrap();
                assert!(chunk.ends_with('.'));
                assert_ne!(block.id, blocks[0].id);
            }
        }
        assert_eq!(squash(&texts(&pages)), squash(&text));
    }

    #[test]
    fn test_trailing_text_without_terminator_is_kept() {
        let ids = SequentialIds::new("b");
        let text = format!("{} and then it just trails off", "Words words words. ".repeat(10));
        let blocks = vec![Block::new(&ids, BlockKind::quote(text.clone()))];

        let pages = paginate(&blocks, 120, None, &layout(), &ids);

        assert_eq!(squash(&texts(&pages)), squash(&text));
        assert!(pages
            .iter()
            .flat_map(|p| p.blocks.iter())
            .all(|b| b.kind.name() == "quote"));
    }

    #[test]
    fn test_overlong_sentence_falls_back_to_words() {
        let layout = layout();
        let ids = SequentialIds::new("b");
        let text = "word ".repeat(200);
        let blocks = vec![Block::new(&ids, BlockKind::paragraph(text.clone()))];

        let pages = paginate(&blocks, 150, None, &layout, &ids);

        assert!(pages.len() > 1);
        for page in &pages {
            assert!(page_height(page, &layout) <= 150);
        }
        assert_eq!(squash(&texts(&pages)), squash(&text));
    }

    #[test]
    fn test_split_remainder_shares_page_with_following_blocks() {
        let ids = SequentialIds::new("b");
        let text = "Short one. ".repeat(30);
        let blocks = vec![
            Block::new(&ids, BlockKind::paragraph(text)),
            Block::new(&ids, BlockKind::paragraph("Tail.")),
        ];

        let pages = paginate(&blocks, 200, None, &layout(), &ids);

        let last = pages.last().unwrap();
        assert_eq!(last.blocks.len(), 2);
        assert_eq!(last.blocks[1].kind.text(), Some("Tail."));
    }

    #[test]
    fn test_unsplittable_blocks_stay_whole() {
        let layout = layout();
        let ids = SequentialIds::new("b");
        let items: Vec<String> = (0..30).map(|i| format!("item {}", i)).collect();
        let blocks = vec![
            Block::new(&ids, BlockKind::paragraph("Intro.")),
            Block::new(&ids, BlockKind::list(items.clone(), false)),
            Block::new(&ids, BlockKind::image(ImageSource::Ref("img_1".into()))),
        ];

        let pages = paginate(&blocks, 250, None, &layout, &ids);

        assert_eq!(pages.len(), 3);
        assert_eq!(pages[1].blocks.len(), 1);
        assert_eq!(pages[1].blocks[0].kind, BlockKind::list(items, false));
        assert!(page_height(&pages[1], &layout) > 250);
        // an image over the budget is accepted alone
        assert_eq!(pages[2].blocks.len(), 1);
        assert_eq!(pages[2].blocks[0].kind.name(), "image");
    }

    #[test]
    fn test_oversized_heading_and_spacer_get_their_own_page() {
        let layout = LayoutConfig {
            heading_height: 300,
            spacer_height: 280,
            ..LayoutConfig::default()
        };
        let ids = SequentialIds::new("b");
        let heading = BlockKind::heading(HeadingLevel::H1, "A heading far taller than the page");
        let blocks = vec![
            Block::new(&ids, BlockKind::paragraph("Intro.")),
            Block::new(&ids, heading.clone()),
            Block::new(&ids, BlockKind::spacer(SpacerSize::Lg)),
            Block::new(&ids, BlockKind::paragraph("Outro.")),
        ];

        let pages = paginate(&blocks, 250, None, &layout, &ids);

        let kinds: Vec<Vec<&str>> = pages
            .iter()
            .map(|p| p.blocks.iter().map(|b| b.kind.name()).collect())
            .collect();
        assert_eq!(
            kinds,
            vec![
                vec!["paragraph"],
                vec!["heading"],
                vec!["spacer"],
                vec!["paragraph"]
            ]
        );
        assert_eq!(pages[1].blocks[0].kind, heading);
        assert_eq!(pages[2].blocks[0].kind, BlockKind::spacer(SpacerSize::Lg));
    }

    #[test]
    fn test_pagination_is_deterministic() {
        let layout = layout();
        let ids = SequentialIds::new("b");
        let blocks: Vec<Block> = (0..20)
            .map(|i| Block::new(&ids, BlockKind::paragraph(format!("Paragraph {} body text.", i))))
            .collect();

        let shape = |pages: Vec<Page>| -> Vec<usize> { pages.iter().map(|p| p.blocks.len()).collect() };
        let first = shape(paginate(&blocks, 300, None, &layout, &ids));
        let second = shape(paginate(&blocks, 300, None, &layout, &ids));
        assert_eq!(first, second);
    }
}
