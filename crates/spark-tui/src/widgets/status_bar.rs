use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};
use unicode_width::UnicodeWidthStr;

use crate::app::{App, Screen};

pub struct StatusBarWidget;

impl StatusBarWidget {
    pub fn render(frame: &mut Frame, area: Rect, app: &App) {
        let theme = &app.theme;
        let status_text = match &app.status_message {
            Some(msg) => format!(" {}", msg),
            None => Self::summary(app),
        };

        let help_hint = match app.screen {
            Screen::Feed => " q:quit j/k:move enter:open f:like r:refresh ",
            Screen::Reader => " space/b:page h/l:post f:like s:save esc:back ",
        };
        let padding_len = usize::from(area.width)
            .saturating_sub(status_text.width() + help_hint.width());

        let line = Line::from(vec![
            Span::styled(status_text, theme.bar()),
            Span::styled(" ".repeat(padding_len), theme.bar()),
            Span::styled(help_hint, Style::default().fg(theme.grey1).bg(theme.bg2)),
        ]);
        frame.render_widget(Paragraph::new(line), area);
    }

    fn summary(app: &App) -> String {
        let total = app.posts().len();
        let more = if app.has_more { "+" } else { "" };
        match (app.screen, app.reader.session()) {
            (Screen::Reader, Some(session)) => format!(
                " READER | Post {}/{}{} | Page {}/{}",
                app.reader.current_index() + 1,
                total,
                more,
                session.active_index() + 1,
                session.page_count()
            ),
            _ => format!(" FEED | Posts: {}{}", total, more),
        }
    }
}
