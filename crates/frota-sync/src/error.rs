// File: frota-sync/src/error.rs
// Purpose: Error types for facade operations and the remote adapter

/// Errors surfaced to the UI by facade mutations.
///
/// Everything here is detected before any store call is made.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FleetError {
    #[error("{0} is required")]
    EmptyField(&'static str),
    #[error("resource already exists: {0}")]
    DuplicateResource(String),
    #[error("car not found: {0}")]
    UnknownCar(String),
    #[error("project not found: {0}")]
    UnknownProject(String),
}

impl FleetError {
    /// Blocking warnings, as opposed to inline form messages.
    pub fn is_warning(&self) -> bool {
        matches!(self, FleetError::DuplicateResource(_))
    }
}

/// Failures from the remote table store. Logged and masked by the facade.
#[derive(Debug, thiserror::Error)]
pub enum RemoteError {
    #[error("network error: {0}")]
    Network(String),
    #[error("remote rejected request ({status}): {body}")]
    Status { status: u16, body: String },
    #[error("unexpected payload: {0}")]
    Decode(String),
    #[error("remote returned no record for {0}")]
    EmptyResponse(String),
}

impl From<reqwest::Error> for RemoteError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            RemoteError::Decode(err.to_string())
        } else {
            RemoteError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for RemoteError {
    fn from(err: serde_json::Error) -> Self {
        RemoteError::Decode(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_duplicates_are_warnings() {
        assert!(FleetError::DuplicateResource("Capota".into()).is_warning());
        assert!(!FleetError::EmptyField("plate").is_warning());
        assert!(!FleetError::UnknownProject("p9".into()).is_warning());
    }

    #[test]
    fn test_messages() {
        assert_eq!(FleetError::EmptyField("model").to_string(), "model is required");
        let err = RemoteError::Status { status: 401, body: "bad key".into() };
        assert_eq!(err.to_string(), "remote rejected request (401): bad key");
    }
}
