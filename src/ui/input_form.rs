use crate::app::{AppState, UiMode};
use crate::ui::{
    layout::create_modal_area,
    styles::{modal_bg_style, modal_title_style},
};
use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

fn field_line<'a>(value: &'a str, active: bool) -> Line<'a> {
    let mut spans = vec![Span::raw("> "), Span::styled(value, modal_title_style())];
    if active {
        spans.push(Span::styled("█", modal_title_style()));
    }
    Line::from(spans)
}

/// Render the input form for adding or editing tasks
pub fn render_input_form(f: &mut Frame, app: &AppState, area: Rect) {
    if let Some(form) = &app.input_form {
        let modal_area = create_modal_area(area);

        // Clear the area behind the form
        f.render_widget(Clear, modal_area);

        let title_text = match app.ui_mode {
            UiMode::AddingSubtask => " Add Subtask ",
            UiMode::EditingTask => " Edit Task ",
            _ => " Add Task ",
        };

        let mut lines = Vec::new();
        lines.push(Line::raw(""));

        let labels = ["Title:", "Description:", "Deadline (YYYY-MM-DD [HH:MM]):"];
        let values = [&form.title, &form.description, &form.deadline];
        for (idx, (label, value)) in labels.iter().zip(values.iter()).enumerate() {
            let active = form.editing_field == idx;
            let label = if active {
                format!("{} (editing)", label)
            } else {
                label.to_string()
            };
            lines.push(Line::raw(label));
            lines.push(field_line(value.as_str(), active));
            lines.push(Line::raw(""));
        }

        lines.push(Line::raw("Tab to switch fields  ·  Enter to submit  ·  Esc to cancel"));

        let paragraph = Paragraph::new(lines)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(Span::styled(title_text, modal_title_style()))
                    .style(modal_bg_style()),
            )
            .wrap(Wrap { trim: false });

        f.render_widget(paragraph, modal_area);
    }
}
