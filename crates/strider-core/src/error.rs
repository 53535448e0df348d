use thiserror::Error;

/// Top-level error type for the Strider workspace.
///
/// Everything here is construction-time: a bad config file or a malformed
/// chain definition. Per-tick paths never return errors — a missed ray is a
/// sentinel, an unreachable IK target is a fully extended chain, a blocked
/// slope is a `false` from the drive call.
#[derive(Debug, Error)]
pub enum StriderError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Chain error: {0}")]
    Chain(#[from] ChainError),
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue {
        field: &'static str,
        message: &'static str,
    },
}

/// Chain construction errors, surfaced by `finalize()` only.
///
/// Copy + static messages for cheap propagation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ChainError {
    #[error("Chain has no joints")]
    Empty,

    #[error("Chain has no actuated joint (all joints are fixed)")]
    NoActuatedJoint,

    #[error("Joint {index} has inverted limits (min > max)")]
    InvertedLimits { index: usize },

    #[error("Joint {index} has a negative swing bound")]
    NegativeSwing { index: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strider_error_from_config_error() {
        let err = ConfigError::InvalidValue {
            field: "walk_speed",
            message: "must be non-negative",
        };
        let top: StriderError = err.into();
        assert!(matches!(top, StriderError::Config(_)));
        assert!(top.to_string().contains("walk_speed"));
    }

    #[test]
    fn strider_error_from_chain_error() {
        let err = ChainError::InvertedLimits { index: 2 };
        let top: StriderError = err.into();
        assert!(matches!(top, StriderError::Chain(_)));
        assert!(top.to_string().contains("2"));
    }

    #[test]
    fn config_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: ConfigError = io_err.into();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn chain_error_is_copy() {
        let err = ChainError::Empty;
        let err2 = err;
        assert_eq!(err, err2);
    }

    #[test]
    fn chain_error_display_messages() {
        assert_eq!(ChainError::Empty.to_string(), "Chain has no joints");
        assert_eq!(
            ChainError::NoActuatedJoint.to_string(),
            "Chain has no actuated joint (all joints are fixed)"
        );
        assert_eq!(
            ChainError::InvertedLimits { index: 1 }.to_string(),
            "Joint 1 has inverted limits (min > max)"
        );
        assert_eq!(
            ChainError::NegativeSwing { index: 0 }.to_string(),
            "Joint 0 has a negative swing bound"
        );
    }
}
