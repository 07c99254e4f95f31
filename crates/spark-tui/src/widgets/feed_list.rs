use chrono::{DateTime, Utc};
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState},
    Frame,
};
use spark_core::Post;

use crate::app::App;

pub struct FeedListWidget;

impl FeedListWidget {
    pub fn render(frame: &mut Frame, area: Rect, app: &App) {
        let theme = &app.theme;
        let block = Block::default()
            .title(" Feed ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme.accent))
            .style(Style::default().bg(theme.bg0));

        let now = Utc::now();
        let mut items: Vec<ListItem> = app
            .posts()
            .iter()
            .enumerate()
            .map(|(i, post)| {
                let title_style = if i == app.selected {
                    Style::default().fg(theme.fg1).add_modifier(Modifier::BOLD)
                } else {
                    theme.text()
                };
                let heart = if post.engagement.is_liked { "♥" } else { "♡" };
                let saved = if post.engagement.is_saved { " ★" } else { "" };
                ListItem::new(vec![
                    Line::from(vec![
                        Span::styled(post.title.clone(), title_style),
                        Span::styled(saved, Style::default().fg(theme.orange)),
                    ]),
                    Line::from(vec![
                        Span::styled(
                            format!("  {} {}", heart, post.engagement.likes),
                            Style::default().fg(theme.liked),
                        ),
                        Span::styled(format!("  {}", meta_line(post, now)), theme.muted()),
                    ]),
                ])
            })
            .collect();

        let trailer = if app.is_loading {
            Some("Loading...")
        } else if !app.has_more && !app.posts().is_empty() {
            Some("No more posts")
        } else if app.posts().is_empty() {
            Some("Nothing to read yet")
        } else {
            None
        };
        if let Some(text) = trailer {
            items.push(ListItem::new(Line::styled(text, theme.muted())));
        }

        let list = List::new(items)
            .block(block)
            .highlight_style(Style::default().bg(theme.selection));

        let mut state = ListState::default();
        if !app.posts().is_empty() {
            state.select(Some(app.selected));
        }
        frame.render_stateful_widget(list, area, &mut state);
    }
}

/// "topic · author · 3h ago"
fn meta_line(post: &Post, now: DateTime<Utc>) -> String {
    let mut parts = vec![post.display_topic().to_string()];
    if let Some(author) = &post.author {
        parts.push(author.name.clone());
    }
    if let Some(created) = post.created_at {
        parts.push(format_age(created, now));
    }
    parts.join(" · ")
}

/// Coarse relative age of a timestamp
pub fn format_age(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let age = now.signed_duration_since(then);
    if age.num_minutes() < 1 {
        "just now".to_string()
    } else if age.num_hours() < 1 {
        format!("{}m ago", age.num_minutes())
    } else if age.num_days() < 1 {
        format!("{}h ago", age.num_hours())
    } else if age.num_days() < 30 {
        format!("{}d ago", age.num_days())
    } else {
        then.format("%Y-%m-%d").to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use spark_core::post::UserRef;

    #[test]
    fn test_format_age() {
        let now = Utc.with_ymd_and_hms(2024, 5, 10, 12, 0, 0).unwrap();
        assert_eq!(format_age(now - Duration::seconds(20), now), "just now");
        assert_eq!(format_age(now - Duration::minutes(5), now), "5m ago");
        assert_eq!(format_age(now - Duration::hours(3), now), "3h ago");
        assert_eq!(format_age(now - Duration::days(2), now), "2d ago");
        assert_eq!(format_age(now - Duration::days(45), now), "2024-03-26");
    }

    #[test]
    fn test_meta_line() {
        let now = Utc.with_ymd_and_hms(2024, 5, 10, 12, 0, 0).unwrap();
        let mut post = Post::from_description("p", "t", "");
        assert_eq!(meta_line(&post, now), "General");

        post.topic = Some("Travel".into());
        post.author = Some(UserRef::named("Sam"));
        post.created_at = Some(now - Duration::hours(1));
        assert_eq!(meta_line(&post, now), "Travel · Sam · 1h ago");
    }
}
