use serde::{Deserialize, Serialize};

use super::id::IdGenerator;

/// Heading depth; only three levels are rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum HeadingLevel {
    H1,
    H2,
    H3,
}

impl HeadingLevel {
    pub fn as_u8(self) -> u8 {
        match self {
            HeadingLevel::H1 => 1,
            HeadingLevel::H2 => 2,
            HeadingLevel::H3 => 3,
        }
    }
}

impl TryFrom<u8> for HeadingLevel {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(HeadingLevel::H1),
            2 => Ok(HeadingLevel::H2),
            3 => Ok(HeadingLevel::H3),
            other => Err(format!("unsupported heading level {}", other)),
        }
    }
}

impl From<HeadingLevel> for u8 {
    fn from(level: HeadingLevel) -> Self {
        level.as_u8()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpacerSize {
    Sm,
    Md,
    Lg,
}

/// Where an image block's pixels come from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageSource {
    /// Reference into the post's inline image table (e.g. `img_1`)
    Ref(String),
    /// Direct URL or path
    Url(String),
}

impl ImageSource {
    /// Classify a raw `src` string from markdown or API data
    pub fn from_src(src: &str) -> Self {
        let looks_like_location = src.contains("://")
            || src.starts_with('/')
            || src.starts_with("./")
            || src.starts_with("data:")
            || src.contains('.');
        if looks_like_location {
            ImageSource::Url(src.to_string())
        } else {
            ImageSource::Ref(src.to_string())
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            ImageSource::Ref(r) => r,
            ImageSource::Url(u) => u,
        }
    }
}

/// Content of a block, one variant per kind
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BlockKind {
    Heading {
        level: HeadingLevel,
        text: String,
    },
    Paragraph {
        text: String,
    },
    Quote {
        text: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        attribution: Option<String>,
    },
    Image {
        source: ImageSource,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        alt: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        caption: Option<String>,
    },
    Spacer {
        size: SpacerSize,
    },
    List {
        items: Vec<String>,
        #[serde(default)]
        ordered: bool,
    },
}

impl BlockKind {
    pub fn heading(level: HeadingLevel, text: impl Into<String>) -> Self {
        BlockKind::Heading {
            level,
            text: text.into(),
        }
    }

    pub fn paragraph(text: impl Into<String>) -> Self {
        BlockKind::Paragraph { text: text.into() }
    }

    pub fn quote(text: impl Into<String>) -> Self {
        BlockKind::Quote {
            text: text.into(),
            attribution: None,
        }
    }

    pub fn image(source: ImageSource) -> Self {
        BlockKind::Image {
            source,
            alt: None,
            caption: None,
        }
    }

    pub fn spacer(size: SpacerSize) -> Self {
        BlockKind::Spacer { size }
    }

    pub fn list(items: Vec<String>, ordered: bool) -> Self {
        BlockKind::List { items, ordered }
    }

    /// Body text of text-bearing blocks (heading, paragraph, quote)
    pub fn text(&self) -> Option<&str> {
        match self {
            BlockKind::Heading { text, .. }
            | BlockKind::Paragraph { text }
            | BlockKind::Quote { text, .. } => Some(text),
            BlockKind::Image { .. } | BlockKind::Spacer { .. } | BlockKind::List { .. } => None,
        }
    }

    /// Same block kind with its text replaced.
    ///
    /// Only paragraphs and quotes can be split across pages, so only they
    /// produce a copy; every other kind returns `None`.
    pub fn with_text(&self, text: String) -> Option<BlockKind> {
        match self {
            BlockKind::Paragraph { .. } => Some(BlockKind::Paragraph { text }),
            BlockKind::Quote { attribution, .. } => Some(BlockKind::Quote {
                text,
                attribution: attribution.clone(),
            }),
            BlockKind::Heading { .. }
            | BlockKind::Image { .. }
            | BlockKind::Spacer { .. }
            | BlockKind::List { .. } => None,
        }
    }

    /// Paragraphs and quotes may be broken across pages
    pub fn is_splittable(&self) -> bool {
        matches!(self, BlockKind::Paragraph { .. } | BlockKind::Quote { .. })
    }

    pub fn name(&self) -> &'static str {
        match self {
            BlockKind::Heading { .. } => "heading",
            BlockKind::Paragraph { .. } => "paragraph",
            BlockKind::Quote { .. } => "quote",
            BlockKind::Image { .. } => "image",
            BlockKind::Spacer { .. } => "spacer",
            BlockKind::List { .. } => "list",
        }
    }
}

/// A unit of post content with a rendering identity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub id: String,
    #[serde(flatten)]
    pub kind: BlockKind,
}

impl Block {
    pub fn new(ids: &dyn IdGenerator, kind: BlockKind) -> Self {
        Self {
            id: ids.next_id(),
            kind,
        }
    }
}

/// One screen of content
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    pub id: String,
    pub blocks: Vec<Block>,
}

impl Page {
    pub fn new(ids: &dyn IdGenerator, blocks: Vec<Block>) -> Self {
        Self {
            id: ids.next_id(),
            blocks,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::id::SequentialIds;

    #[test]
    fn test_with_text_only_for_splittable_kinds() {
        let quote = BlockKind::Quote {
            text: "old".into(),
            attribution: Some("Seneca".into()),
        };
        assert_eq!(
            quote.with_text("new".into()),
            Some(BlockKind::Quote {
                text: "new".into(),
                attribution: Some("Seneca".into()),
            })
        );
        assert!(BlockKind::heading(HeadingLevel::H1, "t")
            .with_text("x".into())
            .is_none());
        assert!(BlockKind::list(vec!["a".into()], false)
            .with_text("x".into())
            .is_none());
    }

    #[test]
    fn test_image_source_classification() {
        assert_eq!(ImageSource::from_src("img_1"), ImageSource::Ref("img_1".into()));
        assert_eq!(
            ImageSource::from_src("https://cdn.example.com/a.png"),
            ImageSource::Url("https://cdn.example.com/a.png".into())
        );
        assert_eq!(
            ImageSource::from_src("covers/a.jpg"),
            ImageSource::Url("covers/a.jpg".into())
        );
    }

    #[test]
    fn test_block_serializes_with_type_tag() {
        let ids = SequentialIds::new("b");
        let block = Block::new(&ids, BlockKind::heading(HeadingLevel::H2, "Intro"));
        let json = serde_json::to_value(&block).unwrap();
        assert_eq!(json["type"], "heading");
        assert_eq!(json["level"], 2);
        assert_eq!(json["id"], "b1");

        let back: Block = serde_json::from_value(json).unwrap();
        assert_eq!(back, block);
    }
}
