// Saved state of a logic device: program text plus memory

use crate::interpreter::errors::StateError;
use crate::memory::Memory;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Everything needed to resume a device where it left off.
///
/// Timers and counters keep their state in memory, so restoring a
/// `LogicState` continues in-flight timers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LogicState {
    pub code: String,
    #[serde(default)]
    pub memory: Memory,
}

impl LogicState {
    pub fn new(code: impl Into<String>, memory: Memory) -> Self {
        LogicState {
            code: code.into(),
            memory,
        }
    }

    pub fn to_json(&self) -> Result<String, StateError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(text: &str) -> Result<Self, StateError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn load(path: &Path) -> Result<Self, StateError> {
        let text = fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    pub fn save(&self, path: &Path) -> Result<(), StateError> {
        fs::write(path, self.to_json()?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_shape() {
        let mut memory = Memory::new();
        memory.set("a", 3);
        let state = LogicState::new("a = 3", memory);
        let json = state.to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["code"], "a = 3");
        assert_eq!(value["memory"]["a"], 3);
    }

    #[test]
    fn test_missing_memory_defaults_empty() {
        let state = LogicState::from_json(r#"{"code": "r = 1"}"#).unwrap();
        assert_eq!(state.code, "r = 1");
        assert!(state.memory.is_empty());
    }

    #[test]
    fn test_invalid_document() {
        let err = LogicState::from_json("[1, 2]").unwrap_err();
        assert!(matches!(err, StateError::Decode(_)));
    }
}
