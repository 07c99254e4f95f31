//! Wire schema of the posts API and its conversion into [`Post`]

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::models::{Engagement, InlineImage, Post, PostBody, UserRef};
use crate::content::{Block, BlockKind, HeadingLevel, IdGenerator, ImageSource, Page, SpacerSize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiImage {
    #[serde(default)]
    pub id: Option<String>,
    pub url: String,
    #[serde(default)]
    pub prompt: Option<String>,
    #[serde(default)]
    pub file_name: Option<String>,
    #[serde(default)]
    pub placement_hint: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApiBlockType {
    H1,
    H2,
    H3,
    Paragraph,
    Image,
    Spacer,
    Bullets,
    Quote,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiBlock {
    #[serde(rename = "type")]
    pub block_type: ApiBlockType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, rename = "ref", skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<SpacerSize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attribution: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiPage {
    pub index: u32,
    #[serde(default)]
    pub target_words: Option<u32>,
    #[serde(default)]
    pub actual_words: Option<u32>,
    #[serde(default)]
    pub blocks: Vec<ApiBlock>,
}

/// A post as the API (and exported JSONL files) deliver it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiPost {
    pub uid: String,
    pub title: String,
    #[serde(default)]
    pub headline: Option<String>,
    #[serde(default)]
    pub topic: Option<String>,
    #[serde(default)]
    pub bucket_key: Option<String>,
    #[serde(default)]
    pub total_pages: Option<u32>,
    #[serde(default)]
    pub cover_image: Option<ApiImage>,
    #[serde(default)]
    pub inline_images: Vec<ApiImage>,
    #[serde(default)]
    pub pages: Vec<ApiPage>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub like_count: Option<u32>,
    #[serde(default)]
    pub collect_count: Option<u32>,
    #[serde(default)]
    pub comment_count: Option<u32>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub is_liked: Option<bool>,
    #[serde(default)]
    pub asset_base_url: Option<String>,
}

/// Parse API timestamps, which may or may not carry an offset
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f"))
        .ok()
        .map(|naive| naive.and_utc())
}

impl ApiBlock {
    /// Convert into a content block, or `None` when a required field is missing
    pub fn into_kind(self) -> Option<BlockKind> {
        let kind = match self.block_type {
            ApiBlockType::H1 => BlockKind::heading(HeadingLevel::H1, self.text?),
            ApiBlockType::H2 => BlockKind::heading(HeadingLevel::H2, self.text?),
            ApiBlockType::H3 => BlockKind::heading(HeadingLevel::H3, self.text?),
            ApiBlockType::Paragraph => BlockKind::paragraph(self.text?),
            ApiBlockType::Quote => BlockKind::Quote {
                text: self.text?,
                attribution: self.attribution,
            },
            ApiBlockType::Bullets => BlockKind::list(self.items?, false),
            ApiBlockType::Spacer => BlockKind::spacer(self.size.unwrap_or(SpacerSize::Md)),
            ApiBlockType::Image => BlockKind::Image {
                source: ImageSource::from_src(&self.reference?),
                alt: self.text,
                caption: self.caption,
            },
            ApiBlockType::Unknown => return None,
        };
        Some(kind)
    }
}

impl ApiPost {
    pub fn into_post(self, ids: &dyn IdGenerator) -> Post {
        let uid = self.uid;

        let mut api_pages = self.pages;
        api_pages.sort_by_key(|p| p.index);
        let pages: Vec<Page> = api_pages
            .into_iter()
            .map(|page| {
                let index = page.index;
                let blocks = page
                    .blocks
                    .into_iter()
                    .filter_map(|block| {
                        let block_type = block.block_type;
                        let kind = block.into_kind();
                        if kind.is_none() {
                            debug!(post = %uid, page = index, ?block_type, "Dropping incomplete block");
                        }
                        kind
                    })
                    .map(|kind| Block::new(ids, kind))
                    .collect();
                Page::new(ids, blocks)
            })
            .collect();

        let body = match self.description {
            Some(description) if pages.is_empty() => PostBody::Description(description),
            _ => PostBody::Pages(pages),
        };

        let inline_images = self
            .inline_images
            .into_iter()
            .filter_map(|img| {
                let id = img.id.or(img.file_name)?;
                Some(InlineImage {
                    id,
                    url: img.url,
                    prompt: img.prompt,
                    placement_hint: img.placement_hint,
                })
            })
            .collect();

        Post {
            id: uid,
            title: self.title,
            headline: self.headline,
            body,
            cover_image: self.cover_image.map(|img| ImageSource::Url(img.url)),
            inline_images,
            tags: self.tags,
            topic: self.topic.or(self.bucket_key),
            author: self.author.map(UserRef::named),
            engagement: Engagement {
                likes: self.like_count.unwrap_or(0),
                comments: self.comment_count.unwrap_or(0),
                collects: self.collect_count.unwrap_or(0),
                is_liked: self.is_liked.unwrap_or(false),
                is_saved: false,
            },
            created_at: self.created_at.as_deref().and_then(parse_timestamp),
            asset_base_url: self.asset_base_url,
        }
    }
}
