use crate::app::{AppState, UiMode};
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Handle keyboard input events. Returns true when the app should quit.
pub fn handle_key(app: &mut AppState, key: KeyEvent) -> Result<bool> {
    match app.ui_mode {
        UiMode::Normal => handle_normal_mode(app, key),
        UiMode::AddingTask | UiMode::AddingSubtask | UiMode::EditingTask => {
            handle_input_form_mode(app, key)
        }
        UiMode::EditingSummary => handle_summary_mode(app, key),
    }
}

/// Handle keys in normal mode
fn handle_normal_mode(app: &mut AppState, key: KeyEvent) -> Result<bool> {
    match key.code {
        // Navigation (with Shift modifier for reordering)
        KeyCode::Up => {
            if key.modifiers.contains(KeyModifiers::SHIFT) {
                app.reorder_selected(true)?;
            } else {
                app.move_selection_up();
            }
            Ok(false)
        }
        KeyCode::Down => {
            if key.modifiers.contains(KeyModifiers::SHIFT) {
                app.reorder_selected(false)?;
            } else {
                app.move_selection_down();
            }
            Ok(false)
        }

        // Switch viewed day
        KeyCode::Left => {
            app.view_older_day();
            Ok(false)
        }
        KeyCode::Right => {
            app.view_newer_day();
            Ok(false)
        }

        // Toggle completion across every linked instance
        KeyCode::Enter => {
            app.toggle_selected_completion(true)?;
            Ok(false)
        }

        // Toggle completion for this day's instance only
        KeyCode::Char('t') | KeyCode::Char('T') => {
            app.toggle_selected_completion(false)?;
            Ok(false)
        }

        // Toggle expand/collapse
        KeyCode::Char(' ') => {
            app.toggle_selected_expansion()?;
            Ok(false)
        }

        // Add task
        KeyCode::Char('a') => {
            app.start_add_task();
            Ok(false)
        }

        // Add subtask
        KeyCode::Char('A') => {
            app.start_add_subtask();
            Ok(false)
        }

        // Edit task (open form with existing data)
        KeyCode::Char('e') | KeyCode::Char('E') => {
            app.start_edit_selected();
            Ok(false)
        }

        // Delete task
        KeyCode::Char('x') | KeyCode::Delete => {
            app.delete_selected()?;
            Ok(false)
        }

        // Delete the viewed day (and its whole task tree)
        KeyCode::Char('D') => {
            app.delete_viewed_day()?;
            Ok(false)
        }

        // Edit day summary
        KeyCode::Char('s') | KeyCode::Char('S') => {
            app.start_summary_edit();
            Ok(false)
        }

        // Quit
        KeyCode::Char('q') | KeyCode::Char('Q') => Ok(true),

        KeyCode::Esc => Ok(false),

        _ => Ok(false),
    }
}

/// Handle keys in input form mode (adding/editing tasks)
fn handle_input_form_mode(app: &mut AppState, key: KeyEvent) -> Result<bool> {
    match key.code {
        // Submit form
        KeyCode::Enter => {
            app.submit_input_form()?;
            Ok(false)
        }

        // Cancel form
        KeyCode::Esc => {
            app.cancel_input_form();
            Ok(false)
        }

        // Switch between fields
        KeyCode::Tab => {
            app.input_form_toggle_field();
            Ok(false)
        }

        KeyCode::Backspace => {
            app.input_form_backspace();
            Ok(false)
        }

        KeyCode::Char(c) => {
            app.input_form_add_char(c);
            Ok(false)
        }

        _ => Ok(false),
    }
}

/// Handle keys in summary editing mode
fn handle_summary_mode(app: &mut AppState, key: KeyEvent) -> Result<bool> {
    match key.code {
        // Commit and leave editing mode
        KeyCode::Esc => {
            app.finish_summary_edit()?;
            Ok(false)
        }

        KeyCode::Enter => {
            app.summary_add_char('\n');
            Ok(false)
        }

        KeyCode::Backspace => {
            app.summary_backspace();
            Ok(false)
        }

        KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.summary_add_char(c);
            Ok(false)
        }

        _ => Ok(false),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chime::SilentChime;
    use crate::engine::Engine;
    use crate::persistence::{MemoryStore, Settings};

    fn create_test_app() -> AppState {
        let engine = Engine::bootstrap(
            Box::new(MemoryStore::new()),
            Box::new(SilentChime),
            Settings::default(),
        )
        .unwrap();
        let mut app = AppState::new(engine);
        let day = app.viewed_day.unwrap();
        app.engine.add_top_level_task(day, "Test task", None).unwrap();
        app
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::empty())
    }

    #[test]
    fn test_handle_navigation() {
        let mut app = create_test_app();
        let day = app.viewed_day.unwrap();
        app.engine.add_top_level_task(day, "Task 2", None).unwrap();

        assert_eq!(app.selected_index, 0);

        handle_key(&mut app, key(KeyCode::Down)).unwrap();
        assert_eq!(app.selected_index, 1);

        handle_key(&mut app, key(KeyCode::Up)).unwrap();
        assert_eq!(app.selected_index, 0);
    }

    #[test]
    fn test_handle_quit() {
        let mut app = create_test_app();
        let should_quit = handle_key(&mut app, key(KeyCode::Char('q'))).unwrap();
        assert!(should_quit);
    }

    #[test]
    fn test_handle_add_task() {
        let mut app = create_test_app();
        let initial_count = app.visible_rows().len();

        // Press 'a' to open form
        handle_key(&mut app, key(KeyCode::Char('a'))).unwrap();
        assert_eq!(app.ui_mode, UiMode::AddingTask);
        assert!(app.input_form.is_some());

        // Type title
        handle_key(&mut app, key(KeyCode::Char('N'))).unwrap();
        handle_key(&mut app, key(KeyCode::Char('e'))).unwrap();
        handle_key(&mut app, key(KeyCode::Char('w'))).unwrap();

        // Submit with Enter
        handle_key(&mut app, key(KeyCode::Enter)).unwrap();
        assert_eq!(app.visible_rows().len(), initial_count + 1);
        assert_eq!(app.ui_mode, UiMode::Normal);
        assert!(app.input_form.is_none());
    }

    #[test]
    fn test_handle_toggle_completion() {
        let mut app = create_test_app();
        let id = app.selected_task().unwrap();

        handle_key(&mut app, key(KeyCode::Enter)).unwrap();
        assert!(app.engine.arena().get(id).unwrap().is_completed);

        // Completed task sorts to the same single row; toggle back
        handle_key(&mut app, key(KeyCode::Enter)).unwrap();
        assert!(!app.engine.arena().get(id).unwrap().is_completed);
    }

    #[test]
    fn test_handle_delete_task() {
        let mut app = create_test_app();
        assert_eq!(app.visible_rows().len(), 1);

        handle_key(&mut app, key(KeyCode::Char('x'))).unwrap();
        assert!(app.visible_rows().is_empty());
    }

    #[test]
    fn test_summary_mode_keys() {
        let mut app = create_test_app();
        handle_key(&mut app, key(KeyCode::Char('s'))).unwrap();
        assert_eq!(app.ui_mode, UiMode::EditingSummary);

        handle_key(&mut app, key(KeyCode::Char('o'))).unwrap();
        handle_key(&mut app, key(KeyCode::Char('k'))).unwrap();
        handle_key(&mut app, key(KeyCode::Esc)).unwrap();

        assert_eq!(app.ui_mode, UiMode::Normal);
        let day = app.engine.day(app.viewed_day.unwrap()).unwrap();
        assert_eq!(day.summary, "ok");
    }
}
