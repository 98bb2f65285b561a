//! User progress domain model.

use crate::pillar::{self, PillarCategory, TOTAL_PILLARS};
use crate::store::Write;
use serde::{Deserialize, Serialize};

/// Completed pillars for one user, stored as a single document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProgress {
    #[serde(default)]
    pub completed: Vec<String>,
    #[serde(default)]
    pub updated_at: i64,
}

impl UserProgress {
    pub fn is_completed(&self, pillar_id: &str) -> bool {
        self.completed.iter().any(|id| id == pillar_id)
    }

    /// The completed list with `pillar_id` membership flipped.
    pub fn toggled(&self, pillar_id: &str) -> Vec<String> {
        if self.is_completed(pillar_id) {
            self.completed
                .iter()
                .filter(|id| id.as_str() != pillar_id)
                .cloned()
                .collect()
        } else {
            let mut completed = self.completed.clone();
            completed.push(pillar_id.to_string());
            completed
        }
    }

    pub fn completed_count(&self) -> usize {
        self.completed.len()
    }

    /// Overall completion in percent, always out of all 30 pillars.
    pub fn percentage(&self) -> f64 {
        self.completed_count() as f64 / TOTAL_PILLARS as f64 * 100.0
    }

    pub fn category_completed(&self, category: PillarCategory) -> usize {
        pillar::by_category(category)
            .filter(|pillar| self.is_completed(pillar.id))
            .count()
    }

    /// Merge-write payload persisting a new completed list.
    pub fn write_for(completed: Vec<String>) -> Write {
        Write::new()
            .set("completed", completed)
            .server_timestamp("updatedAt")
    }
}
