use crate::app::{AppState, UiMode};
use crate::ui::styles::{border_style, default_style, hint_style, modal_title_style, title_style};
use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

/// Render the viewed day's free-text summary; shows the edit buffer with a
/// cursor while editing
pub fn render_summary_pane(f: &mut Frame, app: &AppState, area: Rect) {
    let editing = app.ui_mode == UiMode::EditingSummary;

    let text = if editing {
        app.summary_buffer.clone()
    } else {
        app.viewed_day
            .and_then(|id| app.engine.day(id))
            .map(|d| d.summary.clone())
            .unwrap_or_default()
    };

    let mut lines: Vec<Line> = if text.is_empty() && !editing {
        vec![Line::styled("(no summary; press s to write one)", hint_style())]
    } else {
        text.lines().map(|l| Line::styled(l.to_string(), default_style())).collect()
    };

    if editing {
        if lines.is_empty() {
            lines.push(Line::raw(""));
        }
        if let Some(last) = lines.last_mut() {
            last.spans.push(Span::styled("█", modal_title_style()));
        }
    }

    let title = if editing { " Summary (editing · Esc done) " } else { " Summary " };

    let paragraph = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(border_style())
                .title(Span::styled(title, title_style())),
        );

    f.render_widget(paragraph, area);
}
