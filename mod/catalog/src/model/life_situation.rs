use serde::{Deserialize, Serialize};

/// The closed set of life situation categories.
///
/// The catalog tree is rooted in one of these per top-level node. The
/// stored value is the SCREAMING_SNAKE_CASE code; `label()` is what list
/// views display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LifeSituationKind {
    Birth,
    Family,
    Health,
    Education,
    Employment,
    Business,
    Relocation,
    Retirement,
    Property,
    Other,
}

impl LifeSituationKind {
    /// All `(code, display label)` pairs, in declaration order.
    pub const CHOICES: &'static [(&'static str, &'static str)] = &[
        ("BIRTH", "Birth of a child"),
        ("FAMILY", "Family and marriage"),
        ("HEALTH", "Health and medical care"),
        ("EDUCATION", "Education"),
        ("EMPLOYMENT", "Work and employment"),
        ("BUSINESS", "Starting a business"),
        ("RELOCATION", "Moving and residence"),
        ("RETIREMENT", "Retirement"),
        ("PROPERTY", "Housing and property"),
        ("OTHER", "Other"),
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Birth => "BIRTH",
            Self::Family => "FAMILY",
            Self::Health => "HEALTH",
            Self::Education => "EDUCATION",
            Self::Employment => "EMPLOYMENT",
            Self::Business => "BUSINESS",
            Self::Relocation => "RELOCATION",
            Self::Retirement => "RETIREMENT",
            Self::Property => "PROPERTY",
            Self::Other => "OTHER",
        }
    }

    /// Human-readable display label.
    pub fn label(&self) -> &'static str {
        Self::CHOICES
            .iter()
            .find(|(code, _)| *code == self.as_str())
            .map(|(_, label)| *label)
            .unwrap_or(self.as_str())
    }
}

impl std::fmt::Display for LifeSituationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// LifeSituation — a top-level catalog node.
///
/// `identifier` is allocated at creation as `{org_code}.{k}` and never
/// changes afterwards; `name` may be changed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LifeSituation {
    /// Unique identifier (UUIDv4, no dashes).
    pub id: String,

    /// Category of this node.
    pub name: LifeSituationKind,

    /// Hierarchical identifier, e.g. `MIN.3`. Server-computed, immutable.
    pub identifier: String,

    /// Owning organization code.
    pub organization: String,

    /// User id of the creator.
    pub owner: String,

    /// RFC 3339 creation timestamp.
    pub created_at: String,

    /// RFC 3339 last update timestamp.
    pub updated_at: String,
}

/// Input for creating a new LifeSituation.
///
/// `identifier` is accepted for wire compatibility but always discarded:
/// the allocator computes the real one.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateLifeSituation {
    pub name: LifeSituationKind,

    #[serde(default)]
    pub identifier: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_codes_match_choices() {
        for (code, _) in LifeSituationKind::CHOICES {
            let kind: LifeSituationKind =
                serde_json::from_value(serde_json::json!(code)).unwrap();
            assert_eq!(kind.as_str(), *code);
        }
    }

    #[test]
    fn kind_label() {
        assert_eq!(LifeSituationKind::Health.label(), "Health and medical care");
        assert_eq!(LifeSituationKind::Other.label(), "Other");
    }

    #[test]
    fn unknown_kind_rejected() {
        assert!(serde_json::from_value::<LifeSituationKind>(serde_json::json!("NOPE")).is_err());
    }

    #[test]
    fn life_situation_json_roundtrip() {
        let ls = LifeSituation {
            id: "a1".into(),
            name: LifeSituationKind::Education,
            identifier: "MIN.1".into(),
            organization: "MIN".into(),
            owner: "u-1".into(),
            created_at: "2026-01-01T00:00:00+00:00".into(),
            updated_at: "2026-01-01T00:00:00+00:00".into(),
        };
        let json = serde_json::to_value(&ls).unwrap();
        assert_eq!(json["name"], "EDUCATION");
        let back: LifeSituation = serde_json::from_value(json).unwrap();
        assert_eq!(ls, back);
    }
}
