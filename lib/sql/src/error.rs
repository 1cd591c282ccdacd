use thiserror::Error;

#[derive(Error, Debug)]
pub enum SQLError {
    #[error("open error: {0}")]
    Open(String),

    #[error("query error: {0}")]
    Query(String),

    #[error("execution error: {0}")]
    Execute(String),
}

impl SQLError {
    /// Whether this error was caused by a UNIQUE constraint violation.
    ///
    /// Callers that implement insert-with-retry (e.g. identifier
    /// allocation) branch on this to distinguish a key collision from a
    /// genuine storage failure.
    pub fn is_unique_violation(&self) -> bool {
        match self {
            SQLError::Query(m) | SQLError::Execute(m) => m.contains("UNIQUE constraint"),
            SQLError::Open(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unique_violation_detection() {
        let err = SQLError::Execute("UNIQUE constraint failed: services.identifier".into());
        assert!(err.is_unique_violation());
        let err = SQLError::Execute("no such table: services".into());
        assert!(!err.is_unique_violation());
        assert!(!SQLError::Open("bad path".into()).is_unique_violation());
    }
}
