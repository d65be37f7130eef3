use crate::model::Todo;
use chrono::{DateTime, Local};

/// Ordered todo list. Insertion order is preserved by every operation.
#[derive(Debug, Default, Clone)]
pub struct TodoList {
    items: Vec<Todo>,
}

impl TodoList {
    pub fn new(items: Vec<Todo>) -> Self {
        Self { items }
    }

    pub fn items(&self) -> &[Todo] {
        &self.items
    }

    /// Appends a todo. Blank text is rejected.
    pub fn add(&mut self, text: &str, now: DateTime<Local>) -> Option<&Todo> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        // Ids are creation timestamps; bump on collision so they stay unique.
        let mut id = now.timestamp_millis();
        if let Some(max) = self.items.iter().map(|t| t.id).max() {
            if id <= max {
                id = max + 1;
            }
        }
        self.items.push(Todo {
            id,
            text: text.to_string(),
            completed: false,
            created_at: now,
        });
        self.items.last()
    }

    /// Flips completion, returning the new state.
    pub fn toggle(&mut self, id: i64) -> Option<bool> {
        let todo = self.items.iter_mut().find(|t| t.id == id)?;
        todo.completed = !todo.completed;
        Some(todo.completed)
    }

    pub fn delete(&mut self, id: i64) -> Option<Todo> {
        let index = self.items.iter().position(|t| t.id == id)?;
        Some(self.items.remove(index))
    }
}
