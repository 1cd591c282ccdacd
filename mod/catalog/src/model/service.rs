use serde::{Deserialize, Serialize};

/// The closed set of service types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ServiceType {
    Public,
    Municipal,
    Departmental,
    Commercial,
    Other,
}

impl ServiceType {
    /// All `(code, display label)` pairs, in declaration order.
    pub const CHOICES: &'static [(&'static str, &'static str)] = &[
        ("PUBLIC", "Public service"),
        ("MUNICIPAL", "Municipal service"),
        ("DEPARTMENTAL", "Departmental service"),
        ("COMMERCIAL", "Commercial service"),
        ("OTHER", "Other"),
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Public => "PUBLIC",
            Self::Municipal => "MUNICIPAL",
            Self::Departmental => "DEPARTMENTAL",
            Self::Commercial => "COMMERCIAL",
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

impl std::fmt::Display for ServiceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Service — a catalog entry under exactly one LifeSituation.
///
/// `identifier` extends the parent's: `{life_situation.identifier}.{k}`.
/// The parent link and identifier are immutable after creation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Service {
    /// Unique identifier (UUIDv4, no dashes).
    pub id: String,

    pub service_type: ServiceType,

    /// Display name.
    pub name: String,

    /// Regulating act reference, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub regulating_act: Option<String>,

    /// Hierarchical identifier, e.g. `MIN.3.2`. Server-computed, immutable.
    pub identifier: String,

    /// Id of the parent LifeSituation. Immutable.
    pub life_situation: String,

    /// Owning organization code.
    pub organization: String,

    /// User id of the creator.
    pub owner: String,

    /// RFC 3339 creation timestamp.
    pub created_at: String,

    /// RFC 3339 last update timestamp.
    pub updated_at: String,
}

/// Input for creating a new Service.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateService {
    pub service_type: ServiceType,

    pub name: String,

    #[serde(default)]
    pub regulating_act: Option<String>,

    /// Id of the parent LifeSituation.
    pub life_situation: String,

    /// Accepted and discarded; the allocator computes the real one.
    #[serde(default)]
    pub identifier: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn service_type_label() {
        assert_eq!(ServiceType::Municipal.label(), "Municipal service");
    }

    #[test]
    fn service_json_roundtrip() {
        let svc = Service {
            id: "s1".into(),
            service_type: ServiceType::Public,
            name: "Birth certificate".into(),
            regulating_act: Some("Act 143-FZ".into()),
            identifier: "MIN.1.1".into(),
            life_situation: "a1".into(),
            organization: "MIN".into(),
            owner: "u-1".into(),
            created_at: "2026-01-01T00:00:00+00:00".into(),
            updated_at: "2026-01-01T00:00:00+00:00".into(),
        };
        let json = serde_json::to_value(&svc).unwrap();
        assert_eq!(json["service_type"], "PUBLIC");
        assert_eq!(json["life_situation"], "a1");
        let back: Service = serde_json::from_value(json).unwrap();
        assert_eq!(svc, back);
    }

    #[test]
    fn regulating_act_omitted_when_absent() {
        let svc = Service {
            id: "s1".into(),
            service_type: ServiceType::Other,
            name: "n".into(),
            regulating_act: None,
            identifier: "MIN.1.1".into(),
            life_situation: "a1".into(),
            organization: "MIN".into(),
            owner: "u-1".into(),
            created_at: "t".into(),
            updated_at: "t".into(),
        };
        let json = serde_json::to_value(&svc).unwrap();
        assert!(json.get("regulating_act").is_none());
    }
}
