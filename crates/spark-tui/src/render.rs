//! Turning a page of blocks into terminal lines

use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use spark_core::content::{BlockKind, ImageSource, Page, SpacerSize};
use spark_core::post::{ImageResolver, Post};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::theme::Theme;

const QUOTE_BAR: &str = "│ ";
const BULLET: &str = "• ";

/// A page laid out for a given width
#[derive(Debug, Clone, Default)]
pub struct RenderedPage {
    pub lines: Vec<Line<'static>>,
    /// Row of the "Next Page" button, when there is a next page
    pub footer_row: Option<usize>,
}

impl RenderedPage {
    pub fn height(&self) -> usize {
        self.lines.len()
    }
}

pub struct PageRenderer<'a> {
    pub theme: &'a Theme,
    pub resolver: &'a dyn ImageResolver,
    pub width: u16,
    /// Rows reserved below the content for the footer
    pub footer_rows: usize,
}

impl PageRenderer<'_> {
    pub fn render(&self, page: &Page, post: &Post, has_next: bool) -> RenderedPage {
        let width = usize::from(self.width.max(4));
        let mut lines = Vec::new();

        for block in &page.blocks {
            self.render_block(&block.kind, post, width, &mut lines);
        }

        let footer_rows = self.footer_rows.max(1);
        let button_at = lines.len() + footer_rows / 2;
        for _ in 0..footer_rows / 2 {
            lines.push(Line::default());
        }
        let (label, style) = if has_next {
            (
                "▸ Next Page",
                Style::default()
                    .fg(self.theme.accent)
                    .add_modifier(Modifier::BOLD),
            )
        } else {
            ("End", self.theme.muted())
        };
        lines.push(centered(label, width, style));
        while lines.len() < button_at + footer_rows - footer_rows / 2 {
            lines.push(Line::default());
        }

        RenderedPage {
            lines,
            footer_row: has_next.then_some(button_at),
        }
    }

    fn render_block(&self, kind: &BlockKind, post: &Post, width: usize, out: &mut Vec<Line<'static>>) {
        let theme = self.theme;
        match kind {
            BlockKind::Heading { level, text } => {
                let style = theme.heading(*level);
                out.extend(wrap_text(text, width).into_iter().map(|l| Line::styled(l, style)));
                out.push(Line::default());
            }
            BlockKind::Paragraph { text } => {
                out.extend(
                    wrap_text(text, width)
                        .into_iter()
                        .map(|l| Line::styled(l, theme.text())),
                );
                out.push(Line::default());
            }
            BlockKind::Quote { text, attribution } => {
                let bar = Style::default().fg(theme.accent);
                for l in wrap_text(text, width.saturating_sub(QUOTE_BAR.width()).max(1)) {
                    out.push(Line::from(vec![
                        Span::styled(QUOTE_BAR, bar),
                        Span::styled(l, theme.quote()),
                    ]));
                }
                if let Some(name) = attribution {
                    out.push(Line::styled(format!("  - {}", name), theme.muted()));
                }
                out.push(Line::default());
            }
            BlockKind::Image {
                source,
                alt,
                caption,
            } => {
                let label = alt.as_deref().filter(|a| !a.is_empty()).unwrap_or("image");
                out.push(Line::from(vec![
                    Span::styled("[image] ", Style::default().fg(theme.blue)),
                    Span::styled(label.to_string(), Style::default().fg(theme.fg1)),
                ]));
                let location = self
                    .resolver
                    .resolve(source, post)
                    .unwrap_or_else(|| unresolved(source));
                out.push(Line::styled(format!("  {}", location), theme.muted()));
                if let Some(caption) = caption {
                    out.extend(
                        wrap_text(caption, width)
                            .into_iter()
                            .map(|l| Line::styled(l, theme.quote())),
                    );
                }
                out.push(Line::default());
            }
            BlockKind::Spacer { size } => {
                let rows = match size {
                    SpacerSize::Sm | SpacerSize::Md => 1,
                    SpacerSize::Lg => 2,
                };
                out.extend(std::iter::repeat_with(Line::default).take(rows));
            }
            BlockKind::List { items, ordered } => {
                for (i, item) in items.iter().enumerate() {
                    let marker = if *ordered {
                        format!("{}. ", i + 1)
                    } else {
                        BULLET.to_string()
                    };
                    let indent = " ".repeat(marker.width());
                    let wrapped = wrap_text(item, width.saturating_sub(marker.width()).max(1));
                    for (j, l) in wrapped.into_iter().enumerate() {
                        let lead = if j == 0 { marker.clone() } else { indent.clone() };
                        out.push(Line::from(vec![
                            Span::styled(lead, Style::default().fg(theme.yellow)),
                            Span::styled(l, theme.text()),
                        ]));
                    }
                }
                out.push(Line::default());
            }
        }
    }
}

fn unresolved(source: &ImageSource) -> String {
    match source {
        ImageSource::Ref(id) => format!("(missing image {})", id),
        ImageSource::Url(url) => url.clone(),
    }
}

fn centered(label: &str, width: usize, style: Style) -> Line<'static> {
    let pad = width.saturating_sub(label.width()) / 2;
    Line::from(vec![
        Span::raw(" ".repeat(pad)),
        Span::styled(label.to_string(), style),
    ])
}

/// Greedy word wrap by display width. Words wider than a line are broken.
pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut out = Vec::new();

    for source_line in text.split('\n') {
        let mut current = String::new();
        let mut current_width = 0;

        if source_line.trim().is_empty() {
            out.push(String::new());
            continue;
        }

        for word in source_line.split_whitespace() {
            let word_width = word.width();
            if word_width > width {
                if !current.is_empty() {
                    out.push(std::mem::take(&mut current));
                }
                current_width = 0;
                for c in word.chars() {
                    let cw = c.width().unwrap_or(0);
                    if current_width + cw > width && !current.is_empty() {
                        out.push(std::mem::take(&mut current));
                        current_width = 0;
                    }
                    current.push(c);
                    current_width += cw;
                }
            } else if current.is_empty() {
                current.push_str(word);
                current_width = word_width;
            } else if current_width + 1 + word_width <= width {
                current.push(' ');
                current.push_str(word);
                current_width += 1 + word_width;
            } else {
                out.push(std::mem::replace(&mut current, word.to_string()));
                current_width = word_width;
            }
        }
        if !current.is_empty() {
            out.push(current);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use spark_core::content::{Block, SequentialIds};
    use spark_core::post::InlineImageResolver;

    fn text_of(line: &Line) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn test_wrap_text_breaks_on_words() {
        assert_eq!(
            wrap_text("the quick brown fox", 10),
            vec!["the quick", "brown fox"]
        );
        assert_eq!(wrap_text("a\n\nb", 10), vec!["a", "", "b"]);
    }

    #[test]
    fn test_wrap_text_splits_long_words_and_wide_chars() {
        assert_eq!(wrap_text("abcdefgh", 3), vec!["abc", "def", "gh"]);
        // each CJK char is two columns wide
        assert_eq!(wrap_text("你好世界", 4), vec!["你好", "世界"]);
    }

    #[test]
    fn test_render_page_with_footer_button() {
        let ids = SequentialIds::new("b");
        let theme = Theme::default();
        let resolver = InlineImageResolver::default();
        let renderer = PageRenderer {
            theme: &theme,
            resolver: &resolver,
            width: 20,
            footer_rows: 5,
        };
        let page = Page::new(
            &ids,
            vec![Block::new(&ids, BlockKind::paragraph("Hello there."))],
        );
        let post = Post::from_description("p", "t", "");

        let rendered = renderer.render(&page, &post, true);
        assert_eq!(text_of(&rendered.lines[0]), "Hello there.");
        // paragraph + blank, then 5 footer rows
        assert_eq!(rendered.height(), 7);
        let row = rendered.footer_row.unwrap();
        assert!(text_of(&rendered.lines[row]).contains("Next Page"));

        let last = renderer.render(&page, &post, false);
        assert_eq!(last.footer_row, None);
        assert!(last.lines.iter().any(|l| text_of(l).trim() == "End"));
    }

    #[test]
    fn test_render_image_and_list() {
        let ids = SequentialIds::new("b");
        let theme = Theme::default();
        let resolver = InlineImageResolver::default();
        let renderer = PageRenderer {
            theme: &theme,
            resolver: &resolver,
            width: 30,
            footer_rows: 1,
        };
        let page = Page::new(
            &ids,
            vec![
                Block::new(
                    &ids,
                    BlockKind::image(ImageSource::Url("https://x.test/a.png".into())),
                ),
                Block::new(&ids, BlockKind::list(vec!["one".into(), "two".into()], true)),
            ],
        );
        let post = Post::from_description("p", "t", "");
        let lines: Vec<String> = renderer
            .render(&page, &post, false)
            .lines
            .iter()
            .map(text_of)
            .collect();
        assert_eq!(lines[0], "[image] image");
        assert_eq!(lines[1], "  https://x.test/a.png");
        assert_eq!(lines[3], "1. one");
        assert_eq!(lines[4], "2. two");
    }
}
