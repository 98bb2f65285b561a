//! Agent domain model.

use crate::error::TrinityError;
use crate::pillar::PillarCategory;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Identifier of one of the three preset agents.
///
/// Serialized with the same identifiers stored on threads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AgentId {
    #[serde(rename = "PILLAR")]
    Pillar,
    #[serde(rename = "COME-UP")]
    ComeUp,
    #[serde(rename = "CODEX")]
    Codex,
}

impl AgentId {
    pub const ALL: [AgentId; 3] = [AgentId::Pillar, AgentId::ComeUp, AgentId::Codex];

    pub fn as_str(&self) -> &'static str {
        match self {
            AgentId::Pillar => "PILLAR",
            AgentId::ComeUp => "COME-UP",
            AgentId::Codex => "CODEX",
        }
    }

    /// The pillar category this agent coaches.
    pub fn category(&self) -> PillarCategory {
        match self {
            AgentId::Pillar => PillarCategory::Life,
            AgentId::ComeUp => PillarCategory::Money,
            AgentId::Codex => PillarCategory::Tech,
        }
    }
}

impl Default for AgentId {
    fn default() -> Self {
        AgentId::Pillar
    }
}

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AgentId {
    type Err = TrinityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AgentId::ALL
            .into_iter()
            .find(|id| id.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| TrinityError::config(format!("Invalid Agent selected: '{s}'")))
    }
}

impl From<AgentId> for serde_json::Value {
    fn from(id: AgentId) -> Self {
        serde_json::Value::String(id.as_str().to_string())
    }
}

/// A preset conversational persona.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Agent {
    pub id: AgentId,
    /// Display name
    pub name: &'static str,
    /// One-line role description
    pub archetype: &'static str,
    pub summary: &'static str,
    /// Instruction sent with every request to this agent
    pub system_prompt: &'static str,
    /// Accent color used by front ends
    pub color: &'static str,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_agent_id() {
        assert_eq!("COME-UP".parse::<AgentId>().unwrap(), AgentId::ComeUp);
        assert_eq!("codex".parse::<AgentId>().unwrap(), AgentId::Codex);
        assert!("ORACLE".parse::<AgentId>().unwrap_err().is_config());
    }

    #[test]
    fn test_serde_uses_stored_identifiers() {
        assert_eq!(serde_json::to_string(&AgentId::ComeUp).unwrap(), "\"COME-UP\"");
        let parsed: AgentId = serde_json::from_str("\"PILLAR\"").unwrap();
        assert_eq!(parsed, AgentId::Pillar);
    }
}
