use crate::ui::styles::hint_style;
use ratatui::{layout::Rect, text::{Line, Span}, widgets::Paragraph, Frame};

/// Render the keybindings hint bar
pub fn render_keybindings(f: &mut Frame, area: Rect) {
    let hints = Line::from(vec![
        Span::raw(" ↑/↓ select   "),
        Span::raw("Shift+↑/↓ reorder   "),
        Span::raw("←/→ day   "),
        Span::raw("Enter done   "),
        Span::raw("t done (this day)   "),
        Span::raw("Space fold   "),
        Span::raw("a add   "),
        Span::raw("A subtask   "),
        Span::raw("e edit   "),
        Span::raw("x delete   "),
        Span::raw("s summary   "),
        Span::raw("q quit"),
    ]);

    let paragraph = Paragraph::new(hints).style(hint_style());
    f.render_widget(paragraph, area);
}
