// Bounded in-memory inbox for assistant feedback

use std::collections::VecDeque;
use std::sync::Arc;

use tokio::sync::RwLock;

/// Most recent entries kept; older ones are dropped first
pub const MAX_FEEDBACK_ENTRIES: usize = 500;
/// Longer feedback is cut to this many characters
pub const MAX_FEEDBACK_CHARS: usize = 2_000;

#[derive(Debug, Clone, Default)]
pub struct FeedbackLog {
    entries: Arc<RwLock<VecDeque<String>>>,
}

impl FeedbackLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `feedback`, truncated, evicting the oldest entry when full
    pub async fn push(&self, feedback: &str) {
        let entry: String = feedback.chars().take(MAX_FEEDBACK_CHARS).collect();
        let mut entries = self.entries.write().await;
        if entries.len() == MAX_FEEDBACK_ENTRIES {
            entries.pop_front();
        }
        entries.push_back(entry);
    }

    pub async fn count(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Oldest first
    pub async fn recent(&self) -> Vec<String> {
        self.entries.read().await.iter().cloned().collect()
    }
}
