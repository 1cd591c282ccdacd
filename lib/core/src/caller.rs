//! Authenticated caller context.
//!
//! The core does not issue or verify credentials — that is the job of
//! whatever sits in front of it (the server binary validates JWTs, tests
//! construct a `Caller` directly). Every catalog query is scoped by
//! `Caller::organization`.

use serde::{Deserialize, Serialize};

/// The authenticated caller of a request.
///
/// Inserted into request extensions by the authentication middleware and
/// extracted by handlers via `Extension<Caller>`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Caller {
    /// User id of the caller.
    pub user_id: String,

    /// Organization code the caller belongs to. Forms the root segment
    /// of every identifier allocated in that organization's scope.
    pub organization: String,
}

impl Caller {
    pub fn new(user_id: impl Into<String>, organization: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            organization: organization.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn caller_json_roundtrip() {
        let caller = Caller::new("u-1", "MIN");
        let json = serde_json::to_string(&caller).unwrap();
        let back: Caller = serde_json::from_str(&json).unwrap();
        assert_eq!(back.user_id, "u-1");
        assert_eq!(back.organization, "MIN");
    }
}
