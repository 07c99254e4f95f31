use std::time::Instant;

use ratatui::{
    layout::{Constraint, Direction as LayoutDirection, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Clear, Paragraph},
    Frame,
};
use spark_core::reader::{Direction, ReaderSession};
use spark_core::Post;
use unicode_width::UnicodeWidthStr;

use crate::app::App;
use crate::transition::{compose_vertical, horizontal_inset, lerp_u16, EasingTypeExt};

/// Areas of the reader screen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReaderLayout {
    pub header: Rect,
    pub progress: Rect,
    pub body: Rect,
}

pub struct ReaderWidget;

impl ReaderWidget {
    /// Split the screen; the header shrinks to one row once it is compact
    pub fn layout(area: Rect, app: &App) -> ReaderLayout {
        let compact = app.reader.session().is_some_and(ReaderSession::header_compact);
        let header_rows = if compact { 1 } else { 3 };
        let chunks = Layout::default()
            .direction(LayoutDirection::Vertical)
            .constraints([
                Constraint::Length(header_rows),
                Constraint::Length(1),
                Constraint::Min(1),
            ])
            .split(area);
        ReaderLayout {
            header: chunks[0],
            progress: chunks[1],
            body: chunks[2],
        }
    }

    pub fn render(frame: &mut Frame, layout: &ReaderLayout, app: &App, now: Instant) {
        let (Some(session), Some(post)) = (app.reader.session(), app.reader.current_post()) else {
            return;
        };
        frame.render_widget(Clear, layout.header);
        frame.render_widget(Clear, layout.body);

        Self::render_header(frame, layout.header, app, post, session.header_compact());
        Self::render_progress(frame, layout.progress, app, session);
        Self::render_body(frame, layout.body, app, session, now);
    }

    fn render_header(frame: &mut Frame, area: Rect, app: &App, post: &Post, compact: bool) {
        let theme = &app.theme;
        let title = Line::styled(
            post.title.clone(),
            Style::default().fg(theme.fg1).add_modifier(Modifier::BOLD),
        );
        let lines = if compact {
            vec![title]
        } else {
            let author = post
                .author
                .as_ref()
                .map(|a| format!("by {} · ", a.name))
                .unwrap_or_default();
            let e = &post.engagement;
            let heart = if e.is_liked { "♥" } else { "♡" };
            let star = if e.is_saved { "★" } else { "☆" };
            vec![
                title,
                Line::styled(format!("{}{}", author, post.display_topic()), theme.muted()),
                Line::from(vec![
                    Span::styled(format!("{} {}", heart, e.likes), Style::default().fg(theme.liked)),
                    Span::styled(format!("   ✎ {}", e.comments), theme.muted()),
                    Span::styled(format!("   {} {}", star, e.collects), Style::default().fg(theme.orange)),
                ]),
            ]
        };
        frame.render_widget(
            Paragraph::new(lines).style(Style::default().bg(theme.bg1)),
            area,
        );
    }

    fn render_progress(frame: &mut Frame, area: Rect, app: &App, session: &ReaderSession) {
        let theme = &app.theme;
        let indicator = if app.config.ui.show_page_indicator {
            session.page_indicator().map(|i| format!(" {} ", i))
        } else {
            None
        };
        let indicator_width = indicator.as_deref().map_or(0, UnicodeWidthStr::width) as u16;
        let bar_width = area.width.saturating_sub(indicator_width);
        let filled = lerp_u16(0, bar_width, session.progress());

        let mut spans = vec![
            Span::styled("━".repeat(usize::from(filled)), Style::default().fg(theme.accent)),
            Span::styled(
                "─".repeat(usize::from(bar_width - filled)),
                Style::default().fg(theme.grey0),
            ),
        ];
        if let Some(indicator) = indicator {
            spans.push(Span::styled(indicator, theme.muted()));
        }
        frame.render_widget(Paragraph::new(Line::from(spans)), area);
    }

    fn render_body(frame: &mut Frame, area: Rect, app: &App, session: &ReaderSession, now: Instant) {
        let easing = app.config.animation.easing;
        let height = usize::from(area.height);
        let entering = app
            .rendered_page(session.active_index())
            .map_or(&[][..], |p| p.lines.as_slice());
        let scroll = usize::from(app.viewport.scroll);

        let lines = match (session.navigator().exiting(), session.transition_progress(now)) {
            (Some(exit), Some(t)) => {
                let shift = usize::from(lerp_u16(0, area.height, easing.apply(t)));
                let exiting = app
                    .rendered_page(exit.index)
                    .map_or(&[][..], |p| p.lines.as_slice());
                compose_vertical(
                    exiting,
                    app.pinned_scroll(exit.index, exit.scroll),
                    entering,
                    scroll,
                    height,
                    shift,
                    session.direction(),
                )
            }
            _ => compose_vertical(&[], 0, entering, scroll, height, 0, Direction::None),
        };

        let mut target = area;
        if let Some(t) = app.reader.post_navigator().slide_progress(now) {
            let (left, right) = horizontal_inset(app.reader.slide(now), easing.apply(t), area.width);
            target.x += left;
            target.width = target.width.saturating_sub(left + right);
        }

        frame.render_widget(
            Paragraph::new(lines).style(Style::default().bg(app.theme.bg0)),
            target,
        );
    }
}
