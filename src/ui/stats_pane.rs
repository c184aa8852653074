use crate::app::AppState;
use crate::report::daily_completion_rate;
use crate::ui::styles::{border_style, completed_style, default_style, hint_style, title_style};
use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

/// Format fractional minutes as "Xh Ym" or "Ym"
fn format_minutes(minutes: f64) -> String {
    let total = minutes.round() as i64;
    let hours = total / 60;
    let mins = total % 60;
    if hours > 0 {
        format!("{}h {}m", hours, mins)
    } else {
        format!("{}m", mins)
    }
}

/// Render the cached statistics plus the recent-day strip
pub fn render_stats_pane(f: &mut Frame, app: &AppState, area: Rect) {
    let stats = app.engine.stats();
    let mut lines = Vec::new();

    lines.push(Line::from(vec![
        Span::styled("Task groups: ", default_style()),
        Span::raw(format!(
            "{} ({} done · {} open)",
            stats.total_groups, stats.completed_groups, stats.pending_groups
        )),
    ]));
    lines.push(Line::from(vec![
        Span::styled("Avg completion: ", default_style()),
        Span::raw(format_minutes(stats.average_completion_minutes)),
    ]));
    lines.push(Line::from(vec![
        Span::styled("Avg daily rate: ", default_style()),
        Span::raw(format!("{:.0}%", stats.average_daily_completion_rate)),
    ]));
    lines.push(Line::from(vec![
        Span::styled("Today: ", default_style()),
        Span::styled(format!("{:.0}%", stats.today_completion_rate), completed_style()),
    ]));
    lines.push(Line::raw(""));

    lines.push(Line::styled("This week", title_style()));
    for day_id in app.engine.recent_days() {
        if let Some(day) = app.engine.day(*day_id) {
            let rate = daily_completion_rate(app.engine.arena(), day.id);
            let marker = if app.viewed_day == Some(day.id) { "▸ " } else { "  " };
            lines.push(Line::from(vec![
                Span::raw(marker),
                Span::raw(format!("{}  ", day.date.format("%a %m-%d"))),
                Span::styled(format!("{:.0}%", rate), hint_style()),
            ]));
        }
    }
    if !app.engine.older_days().is_empty() {
        lines.push(Line::styled(
            format!("+ {} older days", app.engine.older_days().len()),
            hint_style(),
        ));
    }

    let paragraph = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(border_style())
            .title(Span::styled(" Statistics ", title_style())),
    );

    f.render_widget(paragraph, area);
}
