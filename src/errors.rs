// Error taxonomy for the review workflow
//
// Validation errors are raised locally before any network traffic and never
// advance state. Service errors come back from the generation service and
// leave the triggering state in place so the user can retry.

/// Local, pre-network failures. Always recoverable.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("case description must be at least {min} characters")]
    DescriptionTooShort { min: usize },
    #[error("select at least one capability")]
    EmptySelection,
    #[error("select no more than {max} capabilities")]
    TooManySelections { max: usize },
    #[error("enter improvement instructions")]
    EmptyInstruction,
    #[error("a request is already in flight")]
    AlreadyInFlight,
    #[error("operation requires the {expected} state, current state is {actual}")]
    InvalidState {
        expected: &'static str,
        actual: &'static str,
    },
}

/// Failures reported by (or while talking to) the generation service.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ServiceError {
    #[error("service returned {status}: {message}")]
    Status { status: u16, message: String },
    #[error("could not reach service: {0}")]
    Transport(String),
    #[error("could not decode service response: {0}")]
    Decode(String),
}

impl ServiceError {
    /// Whether a retry has a chance of succeeding.
    pub fn is_transient(&self) -> bool {
        match self {
            ServiceError::Status { status, .. } => *status >= 500,
            ServiceError::Transport(_) => true,
            ServiceError::Decode(_) => false,
        }
    }

    /// The message to show inline, without the status prefix.
    pub fn message(&self) -> &str {
        match self {
            ServiceError::Status { message, .. } => message,
            ServiceError::Transport(message) | ServiceError::Decode(message) => message,
        }
    }
}

/// Error returned by workflow operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReviewError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Service(#[from] ServiceError),
}

impl ReviewError {
    pub fn is_validation(&self) -> bool {
        matches!(self, ReviewError::Validation(_))
    }
}

/// Clipboard write failures. Never surfaced to the user, only logged.
#[derive(Debug, thiserror::Error)]
pub enum ClipboardError {
    #[error("clipboard unavailable: {0}")]
    Unavailable(String),
    #[error("clipboard write failed: {0}")]
    Write(String),
}

/// Configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },
}
