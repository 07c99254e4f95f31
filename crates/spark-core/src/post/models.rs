use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::LayoutConfig;
use crate::content::{
    parse_to_pages, Block, BlockKind, IdGenerator, ImageSource, Page, SpacerSize,
};

/// Author of a post, referenced by id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRef {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub avatar: Option<String>,
}

impl UserRef {
    /// A user known only by name, as most API posts carry it
    pub fn named(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            id: name.clone(),
            name,
            avatar: None,
        }
    }
}

/// Counters shown next to a post. Read-only for the reader.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Engagement {
    pub likes: u32,
    pub comments: u32,
    pub collects: u32,
    pub is_liked: bool,
    pub is_saved: bool,
}

/// Image a post's blocks can point at by id (`img_1`, ...)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InlineImage {
    pub id: String,
    pub url: String,
    #[serde(default)]
    pub prompt: Option<String>,
    #[serde(default)]
    pub placement_hint: Option<String>,
}

/// Post content, either laid out upstream or still a raw description
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PostBody {
    Pages(Vec<Page>),
    Description(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: String,
    pub title: String,
    pub headline: Option<String>,
    pub body: PostBody,
    pub cover_image: Option<ImageSource>,
    #[serde(default)]
    pub inline_images: Vec<InlineImage>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub topic: Option<String>,
    pub author: Option<UserRef>,
    #[serde(default)]
    pub engagement: Engagement,
    pub created_at: Option<DateTime<Utc>>,
    /// Base URL relative image paths are resolved against
    pub asset_base_url: Option<String>,
}

impl Post {
    /// A post with only a description, mostly for local files and tests
    pub fn from_description(
        id: impl Into<String>,
        title: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            headline: None,
            body: PostBody::Description(description.into()),
            cover_image: None,
            inline_images: Vec::new(),
            tags: Vec::new(),
            topic: None,
            author: None,
            engagement: Engagement::default(),
            created_at: None,
            asset_base_url: None,
        }
    }

    pub fn display_topic(&self) -> &str {
        self.topic
            .as_deref()
            .or_else(|| self.tags.first().map(String::as_str))
            .unwrap_or("General")
    }

    /// Page list for the reader.
    ///
    /// Upstream pages are used as given with the cover image injected at the
    /// top of the first page; a description (or an empty page list) is parsed
    /// and paginated locally.
    pub fn resolve_pages(&self, layout: &LayoutConfig, ids: &dyn IdGenerator) -> Vec<Page> {
        match &self.body {
            PostBody::Pages(pages) if !pages.is_empty() => {
                let mut pages = pages.clone();
                if let (Some(cover), Some(first)) = (&self.cover_image, pages.first_mut()) {
                    let image = BlockKind::Image {
                        source: cover.clone(),
                        alt: Some(self.title.clone()),
                        caption: None,
                    };
                    first.blocks.insert(0, Block::new(ids, BlockKind::spacer(SpacerSize::Md)));
                    first.blocks.insert(0, Block::new(ids, image));
                }
                pages
            }
            PostBody::Pages(_) => parse_to_pages("", self.cover_image.as_ref(), layout, ids),
            PostBody::Description(description) => {
                parse_to_pages(description, self.cover_image.as_ref(), layout, ids)
            }
        }
    }

    pub fn inline_image(&self, id: &str) -> Option<&InlineImage> {
        self.inline_images.iter().find(|img| img.id == id)
    }
}
