pub mod day_pane;
pub mod input_form;
pub mod keybindings;
pub mod layout;
pub mod stats_pane;
pub mod styles;
pub mod summary_pane;

use crate::app::AppState;
use day_pane::render_day_pane;
use input_form::render_input_form;
use keybindings::render_keybindings;
use layout::create_layout;
use ratatui::Frame;
use stats_pane::render_stats_pane;
use summary_pane::render_summary_pane;

/// Main render function - draws the entire UI
pub fn render(f: &mut Frame, app: &AppState) {
    let size = f.size();
    let layout = create_layout(size);

    render_keybindings(f, layout.keybindings_area);
    render_day_pane(f, app, layout.day_area);
    render_stats_pane(f, app, layout.stats_area);
    render_summary_pane(f, app, layout.summary_area);

    // Render input form if active
    if app.input_form.is_some() {
        render_input_form(f, app, size);
    }
}
