//! Language and complexity tags attached to a query by the classifier.

use serde::{Deserialize, Serialize};

/// Detected primary language of a query.
///
/// Kurdish (Sorani) is written in Arabic script; English in Latin script.
/// Classification ties favor English.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    /// Sorani Kurdish, Arabic-script ranges U+0600–U+06FF and U+0750–U+077F.
    #[serde(rename = "ku")]
    Kurdish,
    /// English / Latin script. The secondary (tie-breaking) tag.
    #[serde(rename = "en")]
    English,
}

impl Language {
    /// Short tag used in logs ("ku" / "en").
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Kurdish => "ku",
            Self::English => "en",
        }
    }
}

/// Complexity tier of a query, driving token and retrieval-depth budgets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Complexity {
    /// Greetings, identity questions — answered briefly, no retrieval.
    Simple,
    /// The default tier.
    Medium,
    /// Procedural/domain questions or long queries — full budget.
    Detailed,
}

impl Complexity {
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Simple => "simple",
            Self::Medium => "medium",
            Self::Detailed => "detailed",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn language_serializes_as_short_tag() {
        assert_eq!(serde_json::to_string(&Language::Kurdish).unwrap(), "\"ku\"");
        assert_eq!(serde_json::to_string(&Language::English).unwrap(), "\"en\"");
    }

    #[test]
    fn complexity_ordering() {
        assert!(Complexity::Simple < Complexity::Medium);
        assert!(Complexity::Medium < Complexity::Detailed);
    }
}
