use super::arena::TaskArena;
use super::task::Task;
use std::cmp::Ordering;
use uuid::Uuid;

/// Display ordering for any sibling set.
///
/// Incomplete tasks come before completed ones; among incomplete tasks,
/// deadlined tasks come before undeadlined ones with earlier deadlines
/// first; every remaining tie breaks on creation time, oldest first. This
/// is a total order independent of `sort_order`, recomputed on each render.
pub fn display_cmp(a: &Task, b: &Task) -> Ordering {
    match (a.is_completed, b.is_completed) {
        (false, true) => return Ordering::Less,
        (true, false) => return Ordering::Greater,
        _ => {}
    }
    if !a.is_completed {
        match (a.deadline, b.deadline) {
            (Some(da), Some(db)) => match da.cmp(&db) {
                Ordering::Equal => {}
                ord => return ord,
            },
            (Some(_), None) => return Ordering::Less,
            (None, Some(_)) => return Ordering::Greater,
            (None, None) => {}
        }
    }
    a.created_at.cmp(&b.created_at)
}

/// Sort a sibling id set by the display ordering
pub fn sorted_for_display(arena: &TaskArena, ids: &[Uuid]) -> Vec<Uuid> {
    let mut sorted: Vec<Uuid> = ids.to_vec();
    sorted.sort_by(|a, b| match (arena.get(*a), arena.get(*b)) {
        (Some(ta), Some(tb)) => display_cmp(ta, tb),
        _ => Ordering::Equal,
    });
    sorted
}

/// A flattened row for rendering a day's task tree
#[derive(Debug, Clone)]
pub struct FlatRow {
    pub task_id: Uuid,
    /// Depth in the tree (0 = top-level)
    pub depth: usize,
    /// Whether this is the last sibling at its depth (for tree connectors)
    pub is_last: bool,
}

/// Flatten a day's task tree into display order, hiding the children of
/// collapsed tasks.
pub fn flatten_day(arena: &TaskArena, day: Uuid) -> Vec<FlatRow> {
    let mut rows = Vec::new();
    let top = sorted_for_display(arena, &arena.top_level_sorted(day));
    let count = top.len();
    for (idx, id) in top.into_iter().enumerate() {
        push_rows(arena, id, 0, idx == count - 1, &mut rows);
    }
    rows
}

fn push_rows(arena: &TaskArena, id: Uuid, depth: usize, is_last: bool, rows: &mut Vec<FlatRow>) {
    rows.push(FlatRow { task_id: id, depth, is_last });
    let expanded = arena.get(id).map(|t| t.is_expanded).unwrap_or(false);
    if !expanded {
        return;
    }
    let children = sorted_for_display(arena, &arena.children_sorted(id));
    let count = children.len();
    for (idx, child) in children.into_iter().enumerate() {
        push_rows(arena, child, depth + 1, idx == count - 1, rows);
    }
}

/// Tree connector glyph for nested rows
pub fn tree_connector(is_last: bool) -> &'static str {
    if is_last {
        "└─"
    } else {
        "├─"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Local};

    fn task(day: Uuid, title: &str, sort_order: i64) -> Task {
        Task::new(title.to_string(), Some(day), None, sort_order)
    }

    #[test]
    fn test_deadline_sorts_before_no_deadline() {
        let day = Uuid::new_v4();
        let mut arena = TaskArena::new();
        // B is created first but has no deadline; A must still sort first
        let b = task(day, "B", 0);
        let b_id = b.id;
        arena.insert(b);
        let mut a = task(day, "A", 1);
        a.deadline = Some(Local::now() + Duration::days(5));
        let a_id = a.id;
        arena.insert(a);

        let order = sorted_for_display(&arena, &arena.top_level_sorted(day));
        assert_eq!(order, vec![a_id, b_id]);
    }

    #[test]
    fn test_earlier_deadline_first() {
        let day = Uuid::new_v4();
        let mut arena = TaskArena::new();
        let mut late = task(day, "late", 0);
        late.deadline = Some(Local::now() + Duration::days(9));
        let late_id = late.id;
        arena.insert(late);
        let mut soon = task(day, "soon", 1);
        soon.deadline = Some(Local::now() + Duration::days(1));
        let soon_id = soon.id;
        arena.insert(soon);

        let order = sorted_for_display(&arena, &arena.top_level_sorted(day));
        assert_eq!(order, vec![soon_id, late_id]);
    }

    #[test]
    fn test_completed_sort_last() {
        let day = Uuid::new_v4();
        let mut arena = TaskArena::new();
        let mut done = task(day, "done", 0);
        done.is_completed = true;
        done.deadline = Some(Local::now());
        let done_id = done.id;
        arena.insert(done);
        let open = task(day, "open", 1);
        let open_id = open.id;
        arena.insert(open);

        let order = sorted_for_display(&arena, &arena.top_level_sorted(day));
        assert_eq!(order, vec![open_id, done_id]);
    }

    #[test]
    fn test_created_at_breaks_ties() {
        let day = Uuid::new_v4();
        let mut arena = TaskArena::new();
        let mut older = task(day, "older", 1);
        older.created_at = Local::now() - Duration::hours(2);
        let older_id = older.id;
        let newer = task(day, "newer", 0);
        let newer_id = newer.id;
        arena.insert(newer);
        arena.insert(older);

        let order = sorted_for_display(&arena, &arena.top_level_sorted(day));
        assert_eq!(order, vec![older_id, newer_id]);
    }

    #[test]
    fn test_flatten_day_with_subtasks() {
        let day = Uuid::new_v4();
        let mut arena = TaskArena::new();
        let parent = task(day, "parent", 0);
        let parent_id = parent.id;
        arena.insert(parent);
        arena.insert(Task::new("first".to_string(), None, Some(parent_id), 0));
        arena.insert(Task::new("second".to_string(), None, Some(parent_id), 1));

        let rows = flatten_day(&arena, day);
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].depth, 0);
        assert_eq!(rows[1].depth, 1);
        assert_eq!(rows[2].depth, 1);
        assert!(!rows[1].is_last);
        assert!(rows[2].is_last);
    }

    #[test]
    fn test_flatten_day_collapsed() {
        let day = Uuid::new_v4();
        let mut arena = TaskArena::new();
        let mut parent = task(day, "parent", 0);
        parent.is_expanded = false;
        let parent_id = parent.id;
        arena.insert(parent);
        arena.insert(Task::new("hidden".to_string(), None, Some(parent_id), 0));

        let rows = flatten_day(&arena, day);
        assert_eq!(rows.len(), 1);
    }

    #[test]
    fn test_tree_connector() {
        assert_eq!(tree_connector(false), "├─");
        assert_eq!(tree_connector(true), "└─");
    }
}
