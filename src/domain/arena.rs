use super::task::Task;
use std::collections::HashMap;
use uuid::Uuid;

/// Id-keyed storage for every loaded task.
///
/// Parent links on the tasks themselves are weak references; ownership is
/// tracked through two secondary indexes (parent id to child ids, day id to
/// top-level task ids). Deleting a task walks its subtree and removes it
/// from both the storage and the indexes, which is what gives `Day` and
/// parent tasks their cascade semantics without owning child vectors.
#[derive(Debug, Clone, Default)]
pub struct TaskArena {
    tasks: HashMap<Uuid, Task>,
    children: HashMap<Uuid, Vec<Uuid>>,
    top_level: HashMap<Uuid, Vec<Uuid>>,
}

impl TaskArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild an arena from a flat task list (used when loading a snapshot)
    pub fn from_tasks(tasks: Vec<Task>) -> Self {
        let mut arena = Self::new();
        for task in tasks {
            arena.insert(task);
        }
        arena
    }

    pub fn insert(&mut self, task: Task) {
        if let Some(parent) = task.parent {
            self.children.entry(parent).or_default().push(task.id);
        } else if let Some(day) = task.owner_day {
            self.top_level.entry(day).or_default().push(task.id);
        }
        self.tasks.insert(task.id, task);
    }

    pub fn get(&self, id: Uuid) -> Option<&Task> {
        self.tasks.get(&id)
    }

    pub fn get_mut(&mut self, id: Uuid) -> Option<&mut Task> {
        self.tasks.get_mut(&id)
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Task> {
        self.tasks.values()
    }

    /// Direct children of a task, ascending by sort order
    pub fn children_sorted(&self, parent: Uuid) -> Vec<Uuid> {
        let ids = self.children.get(&parent).cloned().unwrap_or_default();
        self.sorted_by_order(ids)
    }

    /// Top-level tasks of a day, ascending by sort order
    pub fn top_level_sorted(&self, day: Uuid) -> Vec<Uuid> {
        let ids = self.top_level.get(&day).cloned().unwrap_or_default();
        self.sorted_by_order(ids)
    }

    /// The sibling set of a task (including the task itself), ascending by
    /// sort order. Siblings share a parent, or share a day for top-level
    /// tasks.
    pub fn siblings_sorted(&self, id: Uuid) -> Vec<Uuid> {
        match self.get(id) {
            Some(task) => match task.parent {
                Some(parent) => self.children_sorted(parent),
                None => match task.owner_day {
                    Some(day) => self.top_level_sorted(day),
                    None => Vec::new(),
                },
            },
            None => Vec::new(),
        }
    }

    /// Resolve the day a task belongs to by walking up to its top-level
    /// ancestor. Nested tasks reach their day transitively.
    pub fn owning_day(&self, id: Uuid) -> Option<Uuid> {
        let mut current = self.get(id)?;
        while let Some(parent) = current.parent {
            current = self.get(parent)?;
        }
        current.owner_day
    }

    /// All tasks of a day (every depth), depth-first pre-order with children
    /// in ascending sort order
    pub fn day_task_ids(&self, day: Uuid) -> Vec<Uuid> {
        let mut out = Vec::new();
        for id in self.top_level_sorted(day) {
            self.collect_subtree(id, &mut out);
        }
        out
    }

    /// Every task sharing a task-group id
    pub fn group_members(&self, group_id: Uuid) -> Vec<Uuid> {
        self.tasks
            .values()
            .filter(|t| t.group_id == group_id)
            .map(|t| t.id)
            .collect()
    }

    /// Remove a task and its whole subtree; returns the removed tasks.
    pub fn remove_subtree(&mut self, id: Uuid) -> Vec<Task> {
        let Some(root) = self.tasks.get(&id) else {
            return Vec::new();
        };

        // Unregister the root from whichever index owns it
        if let Some(parent) = root.parent {
            if let Some(ids) = self.children.get_mut(&parent) {
                ids.retain(|cid| *cid != id);
            }
        } else if let Some(day) = root.owner_day {
            if let Some(ids) = self.top_level.get_mut(&day) {
                ids.retain(|tid| *tid != id);
            }
        }

        let mut subtree = Vec::new();
        self.collect_subtree(id, &mut subtree);

        let mut removed = Vec::new();
        for tid in subtree {
            self.children.remove(&tid);
            if let Some(task) = self.tasks.remove(&tid) {
                removed.push(task);
            }
        }
        removed
    }

    /// Remove every task of a day (cascade for day deletion); returns the
    /// removed tasks.
    pub fn remove_day(&mut self, day: Uuid) -> Vec<Task> {
        let mut removed = Vec::new();
        for id in self.top_level.get(&day).cloned().unwrap_or_default() {
            removed.extend(self.remove_subtree(id));
        }
        self.top_level.remove(&day);
        removed
    }

    /// Flat task list for persisting; ordered by id so snapshots are stable
    pub fn snapshot_tasks(&self) -> Vec<Task> {
        let mut tasks: Vec<Task> = self.tasks.values().cloned().collect();
        tasks.sort_by_key(|t| t.id);
        tasks
    }

    fn collect_subtree(&self, id: Uuid, out: &mut Vec<Uuid>) {
        if !self.tasks.contains_key(&id) {
            return;
        }
        out.push(id);
        for child in self.children_sorted(id) {
            self.collect_subtree(child, out);
        }
    }

    fn sorted_by_order(&self, mut ids: Vec<Uuid>) -> Vec<Uuid> {
        ids.sort_by_key(|id| {
            self.get(*id)
                .map(|t| (t.sort_order, t.created_at, t.id))
                .unwrap_or((i64::MAX, chrono::Local::now(), *id))
        });
        ids
    }
}
