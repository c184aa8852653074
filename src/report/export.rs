use crate::domain::{Day, TaskArena};
use chrono::{DateTime, Local};
use uuid::Uuid;

const HEADER: [&str; 9] = [
    "Date", "Level", "Title", "Description", "Status", "Created", "Completed", "Deadline",
    "Overdue",
];

/// Serialize every loaded day and task into one delimited text blob.
///
/// Days come out in the day list's current order; each day's tasks follow a
/// depth-first pre-order walk with children in ascending sort order. The
/// depth is emitted both as the Level column and as two spaces of indent
/// baked into the Title field.
pub fn export_all(days: &[Day], arena: &TaskArena) -> String {
    let now = Local::now();
    let mut out = String::new();

    push_row(&mut out, &HEADER.map(String::from));
    for day in days {
        for id in arena.top_level_sorted(day.id) {
            push_task_rows(&mut out, arena, day, id, 0, now);
        }
    }
    out
}

fn push_task_rows(
    out: &mut String,
    arena: &TaskArena,
    day: &Day,
    id: Uuid,
    level: usize,
    now: DateTime<Local>,
) {
    let Some(task) = arena.get(id) else {
        return;
    };

    let status = if task.is_completed { "Completed" } else { "Pending" };
    let overdue = if task.is_overdue(now) { "Yes" } else { "No" };
    let fields = [
        day.date.format("%Y-%m-%d").to_string(),
        level.to_string(),
        format!("{}{}", "  ".repeat(level), task.title),
        task.description.clone(),
        status.to_string(),
        task.created_at.to_rfc3339(),
        task.completed_at.map(|t| t.to_rfc3339()).unwrap_or_default(),
        task.deadline.map(|t| t.to_rfc3339()).unwrap_or_default(),
        overdue.to_string(),
    ];
    push_row(out, &fields);

    for child in arena.children_sorted(id) {
        push_task_rows(out, arena, day, child, level + 1, now);
    }
}

fn push_row(out: &mut String, fields: &[String]) {
    for (idx, field) in fields.iter().enumerate() {
        if idx > 0 {
            out.push(',');
        }
        out.push_str(&escape_field(field));
    }
    out.push('\n');
}

/// Quote a field, doubling embedded quotes, and defuse spreadsheet formula
/// injection by prefixing an apostrophe when the escaped value starts with
/// a formula trigger character.
fn escape_field(value: &str) -> String {
    let mut escaped = value.replace('"', "\"\"");
    if escaped.starts_with(['=', '+', '-', '@', '\t', '\r']) {
        escaped.insert(0, '\'');
    }
    format!("\"{}\"", escaped)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Task;
    use chrono::{Duration, NaiveDate};

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    /// Split an output row back into unquoted fields (test titles contain
    /// no commas or quotes)
    fn fields_of(line: &str) -> Vec<String> {
        line.trim_start_matches('"')
            .trim_end_matches('"')
            .split("\",\"")
            .map(String::from)
            .collect()
    }

    #[test]
    fn test_escape_field_quotes() {
        assert_eq!(escape_field("say \"hi\""), "\"say \"\"hi\"\"\"");
    }

    #[test]
    fn test_escape_field_formula_injection() {
        assert_eq!(escape_field("=cmd|'/c calc'!A0"), "\"'=cmd|'/c calc'!A0\"");
        assert_eq!(escape_field("+1"), "\"'+1\"");
        assert_eq!(escape_field("-1"), "\"'-1\"");
        assert_eq!(escape_field("@sum"), "\"'@sum\"");
        assert_eq!(escape_field("plain"), "\"plain\"");
    }

    #[test]
    fn test_header_and_row_shape() {
        let day = Day::new(date("2026-01-06"));
        let mut arena = TaskArena::new();
        arena.insert(Task::new("Buy milk".to_string(), Some(day.id), None, 0));

        let out = export_all(&[day], &arena);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 2);

        let header = fields_of(lines[0]);
        assert_eq!(header[0], "Date");
        assert_eq!(header[8], "Overdue");

        let row = fields_of(lines[1]);
        assert_eq!(row[0], "2026-01-06");
        assert_eq!(row[1], "0");
        assert_eq!(row[2], "Buy milk");
        assert_eq!(row[4], "Pending");
        assert_eq!(row[6], "");
        assert_eq!(row[8], "No");
    }

    #[test]
    fn test_nested_tasks_are_indented_with_level() {
        let day = Day::new(date("2026-01-06"));
        let mut arena = TaskArena::new();
        let parent = Task::new("Parent".to_string(), Some(day.id), None, 0);
        let parent_id = parent.id;
        arena.insert(parent);
        let child = Task::new("Child".to_string(), None, Some(parent_id), 0);
        let child_id = child.id;
        arena.insert(child);
        arena.insert(Task::new("Grandchild".to_string(), None, Some(child_id), 0));

        let out = export_all(&[day], &arena);
        let lines: Vec<&str> = out.lines().collect();

        let child_row = fields_of(lines[2]);
        assert_eq!(child_row[1], "1");
        assert_eq!(child_row[2], "  Child");

        let grandchild_row = fields_of(lines[3]);
        assert_eq!(grandchild_row[1], "2");
        assert_eq!(grandchild_row[2], "    Grandchild");
    }

    #[test]
    fn test_children_follow_sort_order_not_display_order() {
        let day = Day::new(date("2026-01-06"));
        let mut arena = TaskArena::new();
        let parent = Task::new("Parent".to_string(), Some(day.id), None, 0);
        let parent_id = parent.id;
        arena.insert(parent);
        // Completed child sits first by sort order; display sorting would
        // push it last, but export follows sort order
        let mut done = Task::new("done".to_string(), None, Some(parent_id), 0);
        done.is_completed = true;
        done.completed_at = Some(Local::now());
        arena.insert(done);
        arena.insert(Task::new("open".to_string(), None, Some(parent_id), 1));

        let out = export_all(&[day], &arena);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(fields_of(lines[2])[2], "  done");
        assert_eq!(fields_of(lines[3])[2], "  open");
    }

    #[test]
    fn test_completed_task_is_never_overdue() {
        let day = Day::new(date("2026-01-06"));
        let mut arena = TaskArena::new();
        let mut task = Task::new("late but done".to_string(), Some(day.id), None, 0);
        task.deadline = Some(Local::now() - Duration::days(1));
        task.is_completed = true;
        task.completed_at = Some(Local::now());
        arena.insert(task);

        let mut overdue = Task::new("late and open".to_string(), Some(day.id), None, 1);
        overdue.deadline = Some(Local::now() - Duration::days(1));
        arena.insert(overdue);

        let out = export_all(&[day], &arena);
        let lines: Vec<&str> = out.lines().collect();
        // Pending sorts nowhere here: rows follow sort order, so row 1 is
        // the completed task
        assert_eq!(fields_of(lines[1])[4], "Completed");
        assert_eq!(fields_of(lines[1])[8], "No");
        assert_eq!(fields_of(lines[2])[4], "Pending");
        assert_eq!(fields_of(lines[2])[8], "Yes");
    }

    #[test]
    fn test_status_and_timestamps_round_trip() {
        let day = Day::new(date("2026-01-06"));
        let mut arena = TaskArena::new();
        let mut task = Task::new("Ship report".to_string(), Some(day.id), None, 0);
        task.is_completed = true;
        task.completed_at = Some(Local::now());
        arena.insert(task);

        let out = export_all(&[day], &arena);
        let row = fields_of(out.lines().nth(1).unwrap());

        assert_eq!(NaiveDate::parse_from_str(&row[0], "%Y-%m-%d").unwrap(), date("2026-01-06"));
        assert_eq!(row[1].parse::<usize>().unwrap(), 0);
        assert_eq!(row[4], "Completed");
        assert!(chrono::DateTime::parse_from_rfc3339(&row[5]).is_ok());
        assert!(chrono::DateTime::parse_from_rfc3339(&row[6]).is_ok());
    }
}
