//! Pillar domain model.

use crate::error::TrinityError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PillarCategory {
    Life,
    Money,
    Tech,
}

impl PillarCategory {
    pub const ALL: [PillarCategory; 3] = [PillarCategory::Life, PillarCategory::Money, PillarCategory::Tech];

    pub fn as_str(&self) -> &'static str {
        match self {
            PillarCategory::Life => "life",
            PillarCategory::Money => "money",
            PillarCategory::Tech => "tech",
        }
    }
}

impl fmt::Display for PillarCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PillarCategory {
    type Err = TrinityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PillarCategory::ALL
            .into_iter()
            .find(|category| category.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| TrinityError::validation(format!("Unknown pillar category '{s}'")))
    }
}

/// One fixed content and progress item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pillar {
    /// Stable identifier stored in the progress document
    pub id: &'static str,
    pub category: PillarCategory,
    pub name: &'static str,
    pub tagline: &'static str,
    pub reflection_prompt: &'static str,
    /// The single action that marks the pillar as lived
    pub major_move: &'static str,
}
