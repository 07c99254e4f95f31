use url::Url;

use super::models::Post;
use crate::content::ImageSource;

/// Turns an image block's source into something a renderer can load
pub trait ImageResolver: Send + Sync {
    fn resolve(&self, source: &ImageSource, post: &Post) -> Option<String>;
}

/// Looks references up in the post's inline images and anchors relative
/// paths on the post's asset base (or a fallback base).
#[derive(Debug, Clone, Default)]
pub struct InlineImageResolver {
    fallback_base: Option<Url>,
}

impl InlineImageResolver {
    pub fn new(fallback_base: Option<Url>) -> Self {
        Self { fallback_base }
    }

    fn absolutize(&self, location: &str, post: &Post) -> Option<String> {
        if location.starts_with("data:") {
            return Some(location.to_string());
        }
        if let Ok(url) = Url::parse(location) {
            return Some(url.to_string());
        }

        let base = post
            .asset_base_url
            .as_deref()
            .and_then(|b| Url::parse(&format!("{}/", b.trim_end_matches('/'))).ok())
            .or_else(|| self.fallback_base.clone());

        match base {
            Some(base) => base
                .join(location.trim_start_matches("./"))
                .ok()
                .map(|u| u.to_string()),
            // a bare relative path is still usable for local rendering
            None => Some(location.to_string()),
        }
    }
}

impl ImageResolver for InlineImageResolver {
    fn resolve(&self, source: &ImageSource, post: &Post) -> Option<String> {
        match source {
            ImageSource::Ref(id) => {
                let image = post.inline_image(id)?;
                self.absolutize(&image.url, post)
            }
            ImageSource::Url(location) => self.absolutize(location, post),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::post::models::InlineImage;

    fn post() -> Post {
        let mut post = Post::from_description("p1", "t", "");
        post.inline_images = vec![
            InlineImage {
                id: "img_1".into(),
                url: "https://cdn.example.com/1.png".into(),
                prompt: None,
                placement_hint: None,
            },
            InlineImage {
                id: "img_2".into(),
                url: "images/2.png".into(),
                prompt: None,
                placement_hint: None,
            },
        ];
        post.asset_base_url = Some("https://assets.example.com/posts/p1".into());
        post
    }

    #[test]
    fn test_resolves_inline_references() {
        let resolver = InlineImageResolver::default();
        let post = post();
        assert_eq!(
            resolver.resolve(&ImageSource::Ref("img_1".into()), &post).as_deref(),
            Some("https://cdn.example.com/1.png")
        );
        assert_eq!(
            resolver.resolve(&ImageSource::Ref("img_2".into()), &post).as_deref(),
            Some("https://assets.example.com/posts/p1/images/2.png")
        );
        assert_eq!(resolver.resolve(&ImageSource::Ref("img_9".into()), &post), None);
    }

    #[test]
    fn test_relative_urls_use_fallback_base() {
        let base = Url::parse("https://fallback.example.com/static/").unwrap();
        let resolver = InlineImageResolver::new(Some(base));
        let mut post = post();
        post.asset_base_url = None;
        assert_eq!(
            resolver.resolve(&ImageSource::Url("./cover.jpg".into()), &post).as_deref(),
            Some("https://fallback.example.com/static/cover.jpg")
        );
    }
}
