//! The fixed damage category enumeration.
//!
//! Category keys are the exact strings stored in the `DAMAGE` / `s2_DAMAGE`
//! columns, so serde uses them as the wire representation.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Building damage assessment category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DamageCategory {
    #[serde(rename = "Destroyed (>50%)")]
    Destroyed,
    #[serde(rename = "Major (26-50%)")]
    Major,
    #[serde(rename = "Minor (10-25%)")]
    Minor,
    #[serde(rename = "Affected (1-9%)")]
    Affected,
    #[serde(rename = "Other")]
    Other,
}

impl DamageCategory {
    /// Every category, most severe first.
    pub const ALL: [DamageCategory; 5] = [
        DamageCategory::Destroyed,
        DamageCategory::Major,
        DamageCategory::Minor,
        DamageCategory::Affected,
        DamageCategory::Other,
    ];

    /// Database key, e.g. "Destroyed (>50%)".
    pub fn key(&self) -> &'static str {
        match self {
            DamageCategory::Destroyed => "Destroyed (>50%)",
            DamageCategory::Major => "Major (26-50%)",
            DamageCategory::Minor => "Minor (10-25%)",
            DamageCategory::Affected => "Affected (1-9%)",
            DamageCategory::Other => "Other",
        }
    }

    /// Short axis label, e.g. ">50%".
    pub fn label(&self) -> &'static str {
        match self {
            DamageCategory::Destroyed => ">50%",
            DamageCategory::Major => "26-50%",
            DamageCategory::Minor => "10-25%",
            DamageCategory::Affected => "1-9%",
            DamageCategory::Other => "Other",
        }
    }

    /// Look up a category by its database key.
    pub fn from_key(key: &str) -> Option<DamageCategory> {
        Self::ALL.iter().copied().find(|c| c.key() == key)
    }
}

impl fmt::Display for DamageCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keys_round_trip() {
        for category in DamageCategory::ALL {
            assert_eq!(DamageCategory::from_key(category.key()), Some(category));
        }
        assert_eq!(DamageCategory::from_key("Unknown"), None);
    }

    #[test]
    fn test_labels() {
        assert_eq!(DamageCategory::Destroyed.label(), ">50%");
        assert_eq!(DamageCategory::Affected.label(), "1-9%");
        assert_eq!(DamageCategory::Other.label(), "Other");
    }

    #[test]
    fn test_serde_uses_database_key() {
        let json = serde_json::to_string(&DamageCategory::Major).unwrap();
        assert_eq!(json, "\"Major (26-50%)\"");
        let parsed: DamageCategory = serde_json::from_str("\"Minor (10-25%)\"").unwrap();
        assert_eq!(parsed, DamageCategory::Minor);
    }
}
