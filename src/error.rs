use std::io;
use thiserror::Error;

/// Errors that can abort a provisioning run
///
/// Soft conditions (a missing sysfs file, an absent enumeration tool) never
/// surface here; they degrade to empty/unknown values at the point of use.
/// Everything in this enum terminates the current command.
#[derive(Debug, Error)]
pub enum ProvisionError {
    // ===== Preconditions =====
    /// The host's stable machine identifier could not be read
    #[error("identity unavailable: {path}: {source}")]
    IdentityUnavailable {
        /// Path of the machine-id file that failed to read
        path: String,
        /// The underlying read error
        #[source]
        source: io::Error,
    },

    /// The command mutates system state and requires root
    #[error("this command must be run as root")]
    NotRoot,

    // ===== Validation =====
    /// Caller-supplied sample rate outside the accepted set
    #[error("invalid forced rate {rate}: allowed rates are 44100, 48000, 88200, 96000")]
    InvalidRate {
        /// The rejected rate
        rate: u32,
    },

    // ===== External commands =====
    /// A load-bearing external command exited non-zero
    #[error("command `{command}` failed with status {status}")]
    CommandFailed {
        /// The command line that failed
        command: String,
        /// Its exit status (-1 if terminated by signal)
        status: i32,
    },

    /// A load-bearing external command could not be started
    #[error("command `{command}` could not be run")]
    CommandUnavailable {
        /// The command line that failed to start
        command: String,
        /// The underlying spawn error
        #[source]
        source: io::Error,
    },

    /// The installed receiver stack cannot serve this configuration
    #[error("receiver stack unusable: {message}")]
    Stack {
        /// What is missing or mismatched
        message: String,
    },

    // ===== I/O =====
    /// Plain file I/O error from a config or state write
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// State document could not be serialized
    #[error("state serialization error: {0}")]
    State(#[from] serde_json::Error),
}

impl ProvisionError {
    /// Check if this error was rejected before any state mutation
    #[must_use]
    pub fn is_precondition(&self) -> bool {
        matches!(self, Self::NotRoot | Self::InvalidRate { .. })
    }
}

/// Result type alias for provisioning operations
pub type Result<T> = std::result::Result<T, ProvisionError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ProvisionError::InvalidRate { rate: 22050 };
        assert_eq!(
            err.to_string(),
            "invalid forced rate 22050: allowed rates are 44100, 48000, 88200, 96000"
        );

        let err = ProvisionError::CommandFailed {
            command: "systemctl daemon-reload".to_string(),
            status: 1,
        };
        assert_eq!(
            err.to_string(),
            "command `systemctl daemon-reload` failed with status 1"
        );
    }

    #[test]
    fn test_error_is_precondition() {
        assert!(ProvisionError::NotRoot.is_precondition());
        assert!(ProvisionError::InvalidRate { rate: 0 }.is_precondition());
        assert!(
            !ProvisionError::CommandFailed {
                command: "true".to_string(),
                status: 1,
            }
            .is_precondition()
        );
    }

    #[test]
    fn test_error_from_io() {
        let io_err = io::Error::new(io::ErrorKind::PermissionDenied, "denied");
        let err: ProvisionError = io_err.into();
        assert!(matches!(err, ProvisionError::Io(_)));
    }

    #[test]
    fn test_error_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ProvisionError>();
    }
}
