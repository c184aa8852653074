use crate::domain::{flatten_day, FlatRow};
use crate::engine::Engine;
use anyhow::Result;
use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, TimeZone};
use uuid::Uuid;

/// UI mode for the application
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiMode {
    Normal,
    AddingTask,
    AddingSubtask,
    EditingTask,
    EditingSummary,
}

/// What submitting the input form applies to
#[derive(Debug, Clone, Copy)]
pub enum FormTarget {
    NewTask,
    NewSubtask { parent: Uuid },
    Edit { task: Uuid },
}

/// Input form state for adding or editing tasks
#[derive(Debug, Clone)]
pub struct InputFormState {
    pub title: String,
    pub description: String,
    pub deadline: String,
    pub editing_field: usize, // 0 = title, 1 = description, 2 = deadline
    pub target: FormTarget,
}

/// Main application state: the engine plus everything the terminal UI
/// needs between frames.
pub struct AppState {
    pub engine: Engine,
    pub selected_index: usize,
    pub viewed_day: Option<Uuid>,
    pub ui_mode: UiMode,
    pub input_form: Option<InputFormState>,
    pub summary_buffer: String,
    pub summary_cursor: usize,
}

impl AppState {
    pub fn new(engine: Engine) -> Self {
        let viewed_day = engine.active_day().or_else(|| engine.days().first().map(|d| d.id));
        Self {
            engine,
            selected_index: 0,
            viewed_day,
            ui_mode: UiMode::Normal,
            input_form: None,
            summary_buffer: String::new(),
            summary_cursor: 0,
        }
    }

    /// The viewed day's rows in display order
    pub fn visible_rows(&self) -> Vec<FlatRow> {
        match self.viewed_day {
            Some(day) => flatten_day(self.engine.arena(), day),
            None => Vec::new(),
        }
    }

    pub fn selected_task(&self) -> Option<Uuid> {
        self.visible_rows().get(self.selected_index).map(|row| row.task_id)
    }

    pub fn move_selection_up(&mut self) {
        if self.selected_index > 0 {
            self.selected_index -= 1;
        }
    }

    pub fn move_selection_down(&mut self) {
        if self.selected_index + 1 < self.visible_rows().len() {
            self.selected_index += 1;
        }
    }

    fn clamp_selection(&mut self) {
        let len = self.visible_rows().len();
        if len == 0 {
            self.selected_index = 0;
        } else if self.selected_index >= len {
            self.selected_index = len - 1;
        }
    }

    /// Switch the viewed day one step toward the past (days are held date
    /// descending)
    pub fn view_older_day(&mut self) {
        self.shift_viewed_day(1);
    }

    pub fn view_newer_day(&mut self) {
        self.shift_viewed_day(-1);
    }

    fn shift_viewed_day(&mut self, delta: isize) {
        let days = self.engine.days();
        let Some(current) = self.viewed_day else {
            self.viewed_day = days.first().map(|d| d.id);
            return;
        };
        if let Some(pos) = days.iter().position(|d| d.id == current) {
            let target = pos as isize + delta;
            if target >= 0 && (target as usize) < days.len() {
                self.viewed_day = Some(days[target as usize].id);
                self.selected_index = 0;
            }
        }
    }

    pub fn toggle_selected_completion(&mut self, mark_all_linked: bool) -> Result<()> {
        if let Some(id) = self.selected_task() {
            self.engine.toggle_completion(id, mark_all_linked)?;
        }
        Ok(())
    }

    pub fn toggle_selected_expansion(&mut self) -> Result<()> {
        if let Some(id) = self.selected_task() {
            self.engine.toggle_expansion(id)?;
            self.clamp_selection();
        }
        Ok(())
    }

    /// Move the selected task one step among its siblings, in sort-order
    /// ranking. The ranking is recomputed from the arena right here, as the
    /// reindex contract requires.
    pub fn reorder_selected(&mut self, toward_front: bool) -> Result<()> {
        let Some(id) = self.selected_task() else {
            return Ok(());
        };
        let siblings = self.engine.arena().siblings_sorted(id);
        let Some(rank) = siblings.iter().position(|sid| *sid == id) else {
            return Ok(());
        };
        let target = if toward_front {
            match rank.checked_sub(1) {
                Some(t) => t,
                None => return Ok(()),
            }
        } else {
            if rank + 1 >= siblings.len() {
                return Ok(());
            }
            rank + 1
        };
        self.engine.move_sub_task(id, rank, target)
    }

    pub fn delete_selected(&mut self) -> Result<()> {
        if let Some(id) = self.selected_task() {
            self.engine.delete_task(id)?;
            self.clamp_selection();
        }
        Ok(())
    }

    pub fn delete_viewed_day(&mut self) -> Result<()> {
        if let Some(day) = self.viewed_day {
            self.engine.delete_day(day)?;
            self.viewed_day = self
                .engine
                .active_day()
                .or_else(|| self.engine.days().first().map(|d| d.id));
            self.selected_index = 0;
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Input form
    // ------------------------------------------------------------------

    pub fn start_add_task(&mut self) {
        if self.viewed_day.is_none() {
            return;
        }
        self.input_form = Some(InputFormState {
            title: String::new(),
            description: String::new(),
            deadline: String::new(),
            editing_field: 0,
            target: FormTarget::NewTask,
        });
        self.ui_mode = UiMode::AddingTask;
    }

    pub fn start_add_subtask(&mut self) {
        if let Some(parent) = self.selected_task() {
            self.input_form = Some(InputFormState {
                title: String::new(),
                description: String::new(),
                deadline: String::new(),
                editing_field: 0,
                target: FormTarget::NewSubtask { parent },
            });
            self.ui_mode = UiMode::AddingSubtask;
        }
    }

    pub fn start_edit_selected(&mut self) {
        let Some(id) = self.selected_task() else {
            return;
        };
        let Some(task) = self.engine.arena().get(id) else {
            return;
        };
        self.input_form = Some(InputFormState {
            title: task.title.clone(),
            description: task.description.clone(),
            deadline: task
                .deadline
                .map(|d| d.format("%Y-%m-%d %H:%M").to_string())
                .unwrap_or_default(),
            editing_field: 0,
            target: FormTarget::Edit { task: id },
        });
        self.ui_mode = UiMode::EditingTask;
    }

    pub fn input_form_toggle_field(&mut self) {
        if let Some(form) = &mut self.input_form {
            form.editing_field = (form.editing_field + 1) % 3;
        }
    }

    pub fn input_form_add_char(&mut self, c: char) {
        if let Some(form) = &mut self.input_form {
            match form.editing_field {
                0 => form.title.push(c),
                1 => form.description.push(c),
                2 => form.deadline.push(c),
                _ => {}
            }
        }
    }

    pub fn input_form_backspace(&mut self) {
        if let Some(form) = &mut self.input_form {
            match form.editing_field {
                0 => {
                    form.title.pop();
                }
                1 => {
                    form.description.pop();
                }
                2 => {
                    form.deadline.pop();
                }
                _ => {}
            }
        }
    }

    pub fn submit_input_form(&mut self) -> Result<()> {
        if let Some(form) = self.input_form.take() {
            let deadline = parse_deadline(&form.deadline);
            match form.target {
                FormTarget::NewTask => {
                    if let Some(day) = self.viewed_day {
                        let created =
                            self.engine.add_top_level_task(day, &form.title, deadline)?;
                        if let Some(id) = created {
                            if !form.description.trim().is_empty() {
                                self.engine.update_description(id, &form.description)?;
                            }
                        }
                    }
                }
                FormTarget::NewSubtask { parent } => {
                    let created = self.engine.add_sub_task(parent, &form.title)?;
                    if let Some(id) = created {
                        if !form.description.trim().is_empty() {
                            self.engine.update_description(id, &form.description)?;
                        }
                        if deadline.is_some() {
                            self.engine.update_deadline(id, deadline)?;
                        }
                    }
                }
                FormTarget::Edit { task } => {
                    if !form.title.trim().is_empty() {
                        self.engine.update_title(task, form.title.trim())?;
                    }
                    self.engine.update_description(task, &form.description)?;
                    self.engine.update_deadline(task, deadline)?;
                }
            }
            self.ui_mode = UiMode::Normal;
        }
        Ok(())
    }

    pub fn cancel_input_form(&mut self) {
        self.input_form = None;
        self.ui_mode = UiMode::Normal;
    }

    // ------------------------------------------------------------------
    // Day summary editing
    // ------------------------------------------------------------------

    pub fn start_summary_edit(&mut self) {
        let Some(day) = self.viewed_day.and_then(|id| self.engine.day(id)) else {
            return;
        };
        self.summary_buffer = day.summary.clone();
        self.summary_cursor = self.summary_buffer.len();
        self.ui_mode = UiMode::EditingSummary;
    }

    pub fn summary_add_char(&mut self, c: char) {
        self.summary_buffer.insert(self.summary_cursor, c);
        self.summary_cursor += c.len_utf8();
    }

    pub fn summary_backspace(&mut self) {
        if self.summary_cursor > 0 {
            let prev = self.summary_buffer[..self.summary_cursor]
                .chars()
                .next_back()
                .map(|c| c.len_utf8())
                .unwrap_or(0);
            self.summary_cursor -= prev;
            self.summary_buffer.remove(self.summary_cursor);
        }
    }

    /// Commit the edited summary back through the engine
    pub fn finish_summary_edit(&mut self) -> Result<()> {
        if let Some(day) = self.viewed_day {
            let text = self.summary_buffer.clone();
            self.engine.update_summary(day, &text)?;
        }
        self.ui_mode = UiMode::Normal;
        Ok(())
    }
}

/// Parse a deadline field: `YYYY-MM-DD HH:MM`, or a bare `YYYY-MM-DD`
/// meaning end of that day. Anything else (including blank) is no deadline.
pub fn parse_deadline(input: &str) -> Option<DateTime<Local>> {
    let s = input.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M") {
        return Local.from_local_datetime(&dt).single();
    }
    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Local.from_local_datetime(&d.and_hms_opt(23, 59, 0)?).single();
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chime::SilentChime;
    use crate::persistence::{MemoryStore, Settings};
    use chrono::{Datelike, Timelike};

    fn create_test_app() -> AppState {
        let engine = Engine::bootstrap(
            Box::new(MemoryStore::new()),
            Box::new(SilentChime),
            Settings::default(),
        )
        .unwrap();
        AppState::new(engine)
    }

    #[test]
    fn test_new_app_views_active_day() {
        let app = create_test_app();
        assert_eq!(app.viewed_day, app.engine.active_day());
        assert_eq!(app.selected_index, 0);
        assert_eq!(app.ui_mode, UiMode::Normal);
    }

    #[test]
    fn test_add_task_through_form() {
        let mut app = create_test_app();
        app.start_add_task();
        assert_eq!(app.ui_mode, UiMode::AddingTask);

        for c in "Water plants".chars() {
            app.input_form_add_char(c);
        }
        app.submit_input_form().unwrap();

        assert_eq!(app.ui_mode, UiMode::Normal);
        assert_eq!(app.visible_rows().len(), 1);
        let task = app.engine.arena().get(app.visible_rows()[0].task_id).unwrap();
        assert_eq!(task.title, "Water plants");
    }

    #[test]
    fn test_blank_form_adds_nothing() {
        let mut app = create_test_app();
        app.start_add_task();
        app.submit_input_form().unwrap();
        assert!(app.visible_rows().is_empty());
    }

    #[test]
    fn test_add_subtask_through_form() {
        let mut app = create_test_app();
        let day = app.viewed_day.unwrap();
        app.engine.add_top_level_task(day, "parent", None).unwrap();

        app.start_add_subtask();
        for c in "child".chars() {
            app.input_form_add_char(c);
        }
        app.submit_input_form().unwrap();

        assert_eq!(app.visible_rows().len(), 2);
        assert_eq!(app.visible_rows()[1].depth, 1);
    }

    #[test]
    fn test_edit_selected_through_form() {
        let mut app = create_test_app();
        let day = app.viewed_day.unwrap();
        app.engine.add_top_level_task(day, "draft", None).unwrap();

        app.start_edit_selected();
        let form = app.input_form.as_ref().unwrap();
        assert_eq!(form.title, "draft");

        app.input_form_add_char('!');
        app.input_form_toggle_field();
        for c in "notes".chars() {
            app.input_form_add_char(c);
        }
        app.submit_input_form().unwrap();

        let task = app.engine.arena().get(app.visible_rows()[0].task_id).unwrap();
        assert_eq!(task.title, "draft!");
        assert_eq!(task.description, "notes");
    }

    #[test]
    fn test_selection_moves_and_clamps() {
        let mut app = create_test_app();
        let day = app.viewed_day.unwrap();
        app.engine.add_top_level_task(day, "one", None).unwrap();
        app.engine.add_top_level_task(day, "two", None).unwrap();

        app.move_selection_down();
        assert_eq!(app.selected_index, 1);
        app.move_selection_down();
        assert_eq!(app.selected_index, 1);
        app.move_selection_up();
        assert_eq!(app.selected_index, 0);

        app.move_selection_down();
        app.delete_selected().unwrap();
        assert_eq!(app.selected_index, 0);
        assert_eq!(app.visible_rows().len(), 1);
    }

    #[test]
    fn test_reorder_selected_swaps_sort_order() {
        let mut app = create_test_app();
        let day = app.viewed_day.unwrap();
        let a = app.engine.add_top_level_task(day, "a", None).unwrap().unwrap();
        let b = app.engine.add_top_level_task(day, "b", None).unwrap().unwrap();

        // Row order equals creation order here (no deadlines, a created
        // first); move the second row to the front
        app.move_selection_down();
        app.reorder_selected(true).unwrap();
        assert_eq!(app.engine.arena().top_level_sorted(day), vec![b, a]);
    }

    #[test]
    fn test_summary_editing_round_trip() {
        let mut app = create_test_app();
        app.start_summary_edit();
        for c in "quiet morning".chars() {
            app.summary_add_char(c);
        }
        app.summary_backspace();
        app.finish_summary_edit().unwrap();

        let day = app.engine.day(app.viewed_day.unwrap()).unwrap();
        assert_eq!(day.summary, "quiet mornin");
        assert_eq!(app.ui_mode, UiMode::Normal);
    }

    #[test]
    fn test_parse_deadline() {
        assert!(parse_deadline("").is_none());
        assert!(parse_deadline("tomorrow").is_none());

        let full = parse_deadline("2026-03-01 14:30").unwrap();
        assert_eq!(full.hour(), 14);
        assert_eq!(full.minute(), 30);

        let bare = parse_deadline("2026-03-01").unwrap();
        assert_eq!(bare.day(), 1);
        assert_eq!(bare.hour(), 23);
        assert_eq!(bare.minute(), 59);
    }
}
