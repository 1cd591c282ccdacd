use serde::{Deserialize, Serialize};

/// Fulfillment status of a Process.
///
/// A closed set fixed at build time. No transition table is enforced:
/// any member may be written at create or update time by an authorized
/// caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProcessStatus {
    NotStarted,
    InProgress,
    Suspended,
    Completed,
    Cancelled,
}

impl Default for ProcessStatus {
    fn default() -> Self {
        Self::NotStarted
    }
}

impl ProcessStatus {
    /// All `(code, display label)` pairs, in declaration order.
    pub const CHOICES: &'static [(&'static str, &'static str)] = &[
        ("NOT_STARTED", "Not started"),
        ("IN_PROGRESS", "In progress"),
        ("SUSPENDED", "Suspended"),
        ("COMPLETED", "Completed"),
        ("CANCELLED", "Cancelled"),
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotStarted => "NOT_STARTED",
            Self::InProgress => "IN_PROGRESS",
            Self::Suspended => "SUSPENDED",
            Self::Completed => "COMPLETED",
            Self::Cancelled => "CANCELLED",
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

impl std::fmt::Display for ProcessStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// ProcessData — the embedded data sub-record of a Process.
///
/// No independent identity or lifecycle: it is serialized inside the
/// Process record and persisted through it, so a Process and its data
/// always commit as one unit.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ProcessData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_value: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_data: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_data: Option<String>,

    /// Advisory cross-links to other Processes (ids). Display only,
    /// non-owning.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub related_processes: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
}

/// Process — a concrete fulfillment process under exactly one Service.
///
/// `identifier` extends the parent's: `{service.identifier}.{k}`. The
/// parent link and identifier are immutable after creation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Process {
    /// Unique identifier (UUIDv4, no dashes).
    pub id: String,

    /// Display name.
    pub name: String,

    #[serde(default)]
    pub status: ProcessStatus,

    /// Whether the process serves clients inside the organization.
    #[serde(default)]
    pub is_internal_client: bool,

    /// Whether the process serves external clients.
    #[serde(default)]
    pub is_external_client: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub responsible_authority: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,

    /// Whether the process is available in digital form.
    #[serde(default)]
    pub is_digital_format: bool,

    /// Whether the process is available in non-digital form.
    #[serde(default)]
    pub is_non_digital_format: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub digital_format_link: Option<String>,

    /// Hierarchical identifier, e.g. `MIN.3.2.1`. Server-computed,
    /// immutable.
    pub identifier: String,

    /// Id of the parent Service. Immutable.
    pub service: String,

    /// Owning organization code.
    pub organization: String,

    /// User id of the creator.
    pub owner: String,

    /// Embedded data sub-record. Absent at creation; materialized on the
    /// first nested `process_data` update.
    #[serde(default)]
    pub process_data: Option<ProcessData>,

    /// RFC 3339 creation timestamp.
    pub created_at: String,

    /// RFC 3339 last update timestamp.
    pub updated_at: String,
}

/// Input for creating a new Process. Excludes `process_data` — the
/// sub-record does not exist at creation time.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateProcess {
    pub name: String,

    /// Id of the parent Service.
    pub service: String,

    #[serde(default)]
    pub status: ProcessStatus,

    #[serde(default)]
    pub is_internal_client: bool,

    #[serde(default)]
    pub is_external_client: bool,

    #[serde(default)]
    pub responsible_authority: Option<String>,

    #[serde(default)]
    pub department: Option<String>,

    #[serde(default)]
    pub is_digital_format: bool,

    #[serde(default)]
    pub is_non_digital_format: bool,

    #[serde(default)]
    pub digital_format_link: Option<String>,

    /// Accepted and discarded; the allocator computes the real one.
    #[serde(default)]
    pub identifier: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_default_is_not_started() {
        assert_eq!(ProcessStatus::default(), ProcessStatus::NotStarted);
    }

    #[test]
    fn status_codes_match_choices() {
        for (code, _) in ProcessStatus::CHOICES {
            let status: ProcessStatus =
                serde_json::from_value(serde_json::json!(code)).unwrap();
            assert_eq!(status.as_str(), *code);
        }
    }

    #[test]
    fn process_json_roundtrip() {
        let p = Process {
            id: "p1".into(),
            name: "Issue certificate".into(),
            status: ProcessStatus::InProgress,
            is_internal_client: false,
            is_external_client: true,
            responsible_authority: Some("Civil registry".into()),
            department: None,
            is_digital_format: true,
            is_non_digital_format: false,
            digital_format_link: Some("https://example.org/form".into()),
            identifier: "MIN.1.1.1".into(),
            service: "s1".into(),
            organization: "MIN".into(),
            owner: "u-1".into(),
            process_data: Some(ProcessData {
                client_value: Some("certificate within 3 days".into()),
                ..Default::default()
            }),
            created_at: "t".into(),
            updated_at: "t".into(),
        };
        let json = serde_json::to_value(&p).unwrap();
        assert_eq!(json["status"], "IN_PROGRESS");
        assert_eq!(json["process_data"]["client_value"], "certificate within 3 days");
        let back: Process = serde_json::from_value(json).unwrap();
        assert_eq!(p, back);
    }

    #[test]
    fn process_data_absent_serializes_null() {
        let p = Process {
            id: "p1".into(),
            name: "n".into(),
            status: ProcessStatus::default(),
            is_internal_client: false,
            is_external_client: false,
            responsible_authority: None,
            department: None,
            is_digital_format: false,
            is_non_digital_format: false,
            digital_format_link: None,
            identifier: "MIN.1.1.1".into(),
            service: "s1".into(),
            organization: "MIN".into(),
            owner: "u-1".into(),
            process_data: None,
            created_at: "t".into(),
            updated_at: "t".into(),
        };
        let json = serde_json::to_value(&p).unwrap();
        assert!(json["process_data"].is_null());
    }
}
