use serde::{Deserialize, Serialize};

/// Organization — the tenant boundary.
///
/// Its `code` is the root segment of every identifier allocated in its
/// scope (`{code}.{k}` for LifeSituations and so on down the tree).
/// Organizations are created by bootstrap and immutable afterwards.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Organization {
    /// Short organization code — natural key, e.g. `MIN` or `CITY7`.
    pub code: String,

    /// Display name.
    pub name: String,

    /// RFC 3339 creation timestamp.
    pub created_at: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn organization_json_roundtrip() {
        let org = Organization {
            code: "MIN".into(),
            name: "Ministry of Services".into(),
            created_at: "2026-01-01T00:00:00+00:00".into(),
        };
        let json = serde_json::to_string(&org).unwrap();
        let back: Organization = serde_json::from_str(&json).unwrap();
        assert_eq!(org, back);
    }
}
