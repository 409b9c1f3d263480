use thiserror::Error;

use crate::config::ConfigError;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("unknown measure code {0} (expected 1..=6)")]
    UnknownMeasureCode(u8),
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ApplicationError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error("source snapshot failure: {0}")]
    Snapshot(String),
    #[error("configuration failure: {0}")]
    Configuration(String),
}

impl ApplicationError {
    /// Stable machine-readable class used in operator output.
    pub fn error_class(&self) -> &'static str {
        match self {
            Self::Domain(_) => "domain_validation",
            Self::Snapshot(_) => "snapshot_load",
            Self::Configuration(_) => "config_validation",
        }
    }

    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Configuration(_) => 2,
            Self::Snapshot(_) => 3,
            Self::Domain(_) => 4,
        }
    }
}

impl From<ConfigError> for ApplicationError {
    fn from(value: ConfigError) -> Self {
        Self::Configuration(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use crate::config::ConfigError;
    use crate::errors::{ApplicationError, DomainError};

    #[test]
    fn domain_error_is_classified_as_domain_validation() {
        let error = ApplicationError::from(DomainError::UnknownMeasureCode(9));

        assert_eq!(error.error_class(), "domain_validation");
        assert_eq!(error.to_string(), "unknown measure code 9 (expected 1..=6)");
    }

    #[test]
    fn config_error_maps_to_configuration_with_exit_code_two() {
        let error = ApplicationError::from(ConfigError::Validation(
            "logging.level must be one of trace|debug|info|warn|error".to_owned(),
        ));

        assert!(matches!(error, ApplicationError::Configuration(ref message)
            if message.contains("logging.level")));
        assert_eq!(error.exit_code(), 2);
    }

    #[test]
    fn snapshot_error_uses_snapshot_class() {
        let error = ApplicationError::Snapshot("missing file".to_owned());

        assert_eq!(error.error_class(), "snapshot_load");
        assert_eq!(error.exit_code(), 3);
    }
}
