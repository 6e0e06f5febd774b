use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

pub const EMPTY_LIST_TEXT: &str =
    "📝 The task list is empty. Add your first task with /add <text>.";

/// One entry in a user's task list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskItem {
    pub id: u32,
    pub text: String,
    pub done: bool,
}

#[derive(Debug, Default)]
struct UserRecord {
    items: Vec<TaskItem>,
    messages_sent: u64,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

/// In-process per-user state. Records are created lazily on first touch and
/// live for the process lifetime.
///
/// Locking is two-level: the outer mutex guards the user map, a per-record
/// mutex guards one user's data. Every operation is pure in-memory work, so
/// no lock is ever held across an await point.
#[derive(Default)]
pub struct UserStateStore {
    records: Mutex<HashMap<i64, Arc<Mutex<UserRecord>>>>,
}

impl UserStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn record(&self, user_id: i64) -> Arc<Mutex<UserRecord>> {
        let mut map = lock(&self.records);
        map.entry(user_id).or_default().clone()
    }

    /// Appends a task. The new id is `items.len() + 1` at insertion time, so
    /// ids can recur once earlier items have been removed; `remove_item` and
    /// `toggle_item` act on the first match.
    pub fn add_item(&self, user_id: i64, text: &str) -> TaskItem {
        let record = self.record(user_id);
        let mut rec = lock(&record);
        let item = TaskItem {
            id: rec.items.len() as u32 + 1,
            text: text.to_string(),
            done: false,
        };
        rec.items.push(item.clone());
        item
    }

    pub fn remove_item(&self, user_id: i64, id: u32) -> bool {
        let record = self.record(user_id);
        let mut rec = lock(&record);
        match rec.items.iter().position(|item| item.id == id) {
            Some(pos) => {
                rec.items.remove(pos);
                true
            }
            None => false,
        }
    }

    pub fn toggle_item(&self, user_id: i64, id: u32) -> bool {
        let record = self.record(user_id);
        let mut rec = lock(&record);
        match rec.items.iter_mut().find(|item| item.id == id) {
            Some(item) => {
                item.done = !item.done;
                true
            }
            None => false,
        }
    }

    /// Renders the list as one `"{id}. {✅|❌} {text}"` line per item, in
    /// insertion order, or a fixed sentinel when there is nothing to show.
    pub fn list_items(&self, user_id: i64) -> String {
        let record = self.record(user_id);
        let rec = lock(&record);
        if rec.items.is_empty() {
            return EMPTY_LIST_TEXT.to_string();
        }
        rec.items
            .iter()
            .map(|item| {
                let icon = if item.done { "✅" } else { "❌" };
                format!("{}. {} {}", item.id, icon, item.text)
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn record_message(&self, user_id: i64) -> u64 {
        let record = self.record(user_id);
        let mut rec = lock(&record);
        rec.messages_sent += 1;
        rec.messages_sent
    }

    pub fn messages_sent(&self, user_id: i64) -> u64 {
        let record = self.record(user_id);
        let rec = lock(&record);
        rec.messages_sent
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_assigns_sequential_ids() {
        let store = UserStateStore::new();
        assert_eq!(store.add_item(1, "first").id, 1);
        assert_eq!(store.add_item(1, "second").id, 2);
        assert_eq!(store.add_item(1, "third").id, 3);
    }

    #[test]
    fn test_add_after_remove_reuses_id() {
        let store = UserStateStore::new();
        store.add_item(1, "a");
        store.add_item(1, "b");
        assert!(store.remove_item(1, 1));

        // One item left, so the next insertion gets id 2 again.
        let c = store.add_item(1, "c");
        assert_eq!(c.id, 2);

        // remove acts on the first id match: "b", not "c".
        assert!(store.remove_item(1, 2));
        let listing = store.list_items(1);
        assert!(listing.contains("c"));
        assert!(!listing.contains("b"));
    }

    #[test]
    fn test_remove_missing_returns_false() {
        let store = UserStateStore::new();
        store.add_item(1, "only");
        assert!(!store.remove_item(1, 7));
        assert!(!store.remove_item(2, 1));
    }

    #[test]
    fn test_toggle_flips_done_both_ways() {
        let store = UserStateStore::new();
        store.add_item(1, "task");
        assert!(store.toggle_item(1, 1));
        assert!(store.list_items(1).contains("✅"));
        assert!(store.toggle_item(1, 1));
        assert!(store.list_items(1).contains("❌"));
    }

    #[test]
    fn test_toggle_missing_returns_false() {
        let store = UserStateStore::new();
        assert!(!store.toggle_item(1, 1));
    }

    #[test]
    fn test_list_renders_ids_and_icons() {
        let store = UserStateStore::new();
        store.add_item(1, "Buy milk");
        store.add_item(1, "Walk dog");
        store.toggle_item(1, 1);

        let listing = store.list_items(1);
        let lines: Vec<&str> = listing.lines().collect();
        assert_eq!(lines, vec!["1. ✅ Buy milk", "2. ❌ Walk dog"]);
    }

    #[test]
    fn test_list_empty_sentinel() {
        let store = UserStateStore::new();
        assert_eq!(store.list_items(99), EMPTY_LIST_TEXT);
    }

    #[test]
    fn test_items_are_per_user() {
        let store = UserStateStore::new();
        store.add_item(1, "mine");
        store.add_item(2, "yours");
        assert!(store.list_items(1).contains("mine"));
        assert!(!store.list_items(1).contains("yours"));
    }

    #[test]
    fn test_message_counter_increments_per_user() {
        let store = UserStateStore::new();
        assert_eq!(store.record_message(1), 1);
        assert_eq!(store.record_message(1), 2);
        assert_eq!(store.record_message(2), 1);
        assert_eq!(store.messages_sent(1), 2);
        assert_eq!(store.messages_sent(3), 0);
    }

    #[test]
    fn test_concurrent_adds_from_threads() {
        let store = Arc::new(UserStateStore::new());
        let mut handles = Vec::new();
        for _ in 0..4 {
            let store = store.clone();
            handles.push(std::thread::spawn(move || {
                for i in 0..50 {
                    store.add_item(7, &format!("task {i}"));
                }
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(store.list_items(7).lines().count(), 200);
    }
}
