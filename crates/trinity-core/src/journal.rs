//! Journal domain model.

use crate::store::Write;
use serde::{Deserialize, Serialize};

/// A free-text journal entry. Entries are never edited or deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JournalEntry {
    pub id: String,
    pub text: String,
    #[serde(default)]
    pub created_at: i64,
}

impl JournalEntry {
    pub fn new_write(text: &str) -> Write {
        Write::new().set("text", text).server_timestamp("createdAt")
    }
}
