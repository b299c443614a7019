//! Error handling for the control panel

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Error types
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// HTTP client error (transport, timeout, body decode)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Device answered with a non-success status
    #[error("Device API error ({status}): {body}")]
    Api { status: u16, body: String },

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Operator input rejected before anything was sent
    #[error("Validation error: {0}")]
    Validation(String),

    /// Panel configuration error (bad `DEVICE_URL` and the like)
    #[error("Config error: {0}")]
    Config(String),

    /// Operation needs a configuration document that was never loaded
    #[error("Configuration not loaded yet")]
    NotLoaded,
}

impl Error {
    /// Whether the failure happened on the way to or from the device
    /// (as opposed to local validation).
    pub fn is_transport(&self) -> bool {
        matches!(self, Error::Http(_) | Error::Api { .. } | Error::Serialization(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_display() {
        let err = Error::Api {
            status: 503,
            body: "camera busy".to_string(),
        };
        assert_eq!(err.to_string(), "Device API error (503): camera busy");
        assert!(err.is_transport());
    }

    #[test]
    fn test_validation_is_not_transport() {
        assert!(!Error::Validation("bad".to_string()).is_transport());
        assert!(!Error::NotLoaded.is_transport());
        assert!(!Error::Config("bad url".to_string()).is_transport());
    }
}
