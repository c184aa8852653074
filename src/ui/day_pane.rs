use crate::app::AppState;
use crate::domain::tree_connector;
use crate::ui::styles::{
    border_style, carryover_badge_style, completed_style, deadline_style, default_style,
    overdue_style, selected_style, title_style, tree_style,
};
use chrono::Local;
use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem},
    Frame,
};

/// Render the viewed day's task list
pub fn render_day_pane(f: &mut Frame, app: &AppState, area: Rect) {
    let now = Local::now();
    let rows = app.visible_rows();

    let items: Vec<ListItem> = rows
        .iter()
        .enumerate()
        .map(|(idx, row)| {
            let mut spans = Vec::new();

            if row.depth > 0 {
                spans.push(Span::styled("  ".repeat(row.depth), tree_style()));
                spans.push(Span::styled(tree_connector(row.is_last).to_string(), tree_style()));
                spans.push(Span::raw(" "));
            }

            let Some(task) = app.engine.arena().get(row.task_id) else {
                return ListItem::new(Line::raw(""));
            };

            let (checkbox, text_style) = if task.is_completed {
                ("✓ ", completed_style())
            } else {
                ("○ ", default_style())
            };
            spans.push(Span::styled(checkbox, text_style));
            spans.push(Span::styled(task.title.clone(), text_style));

            if let Some(deadline) = task.deadline {
                let style = if task.is_overdue(now) { overdue_style() } else { deadline_style() };
                let marker = if task.is_overdue(now) { " !" } else { "" };
                spans.push(Span::raw("  "));
                spans.push(Span::styled(
                    format!("⏰ {}{}", deadline.format("%m-%d %H:%M"), marker),
                    style,
                ));
            }

            if app.engine.is_carryover_instance(row.task_id) {
                let age = app.engine.carryover_age_in_days(row.task_id);
                let intensity = app.engine.carryover_badge_intensity(row.task_id);
                let count = app.engine.linked_instance_count(row.task_id);
                spans.push(Span::raw("  "));
                spans.push(Span::styled(
                    format!("↻{}d ×{}", age, count),
                    carryover_badge_style(intensity),
                ));
            }

            let line = Line::from(spans);
            if idx == app.selected_index {
                ListItem::new(line).style(selected_style())
            } else {
                ListItem::new(line)
            }
        })
        .collect();

    let title = match app.viewed_day.and_then(|id| app.engine.day(id)) {
        Some(day) => {
            let marker = if day.date == app.engine.today() { " · Today" } else { "" };
            format!(" {}{} ({} tasks) ", day.date.format("%a %Y-%m-%d"), marker, rows.len())
        }
        None => " No day ".to_string(),
    };

    let list = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(border_style())
            .title(Span::styled(title, title_style())),
    );

    f.render_widget(list, area);
}
