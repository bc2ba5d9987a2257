//! Caller-facing failure taxonomy for submission and retrieval.
use crate::params::ParameterError;
use std::fmt;
use std::path::PathBuf;

/// Why one form step did not succeed.
#[derive(Debug)]
pub enum StepFailure {
    Status(u16),
    Transport(anyhow::Error),
}

impl fmt::Display for StepFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StepFailure::Status(status) => write!(f, "HTTP status {status}"),
            StepFailure::Transport(err) => write!(f, "{err:#}"),
        }
    }
}

#[derive(Debug)]
pub enum SubmissionError {
    /// Rejected locally; nothing was sent.
    InvalidParameters(ParameterError),
    StepFailed { step: u8, cause: StepFailure },
    /// Step 4 answered, but in no recognized shape.
    IdentifierNotFound { final_url: String },
}

impl SubmissionError {
    pub fn step(&self) -> Option<u8> {
        match self {
            SubmissionError::StepFailed { step, .. } => Some(*step),
            _ => None,
        }
    }
}

impl fmt::Display for SubmissionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubmissionError::InvalidParameters(err) => write!(f, "invalid job parameters: {err}"),
            SubmissionError::StepFailed { step, cause } => {
                write!(f, "step {step} failed: {cause}")
            }
            SubmissionError::IdentifierNotFound { final_url } => write!(
                f,
                "job id not found in submission response (final url {final_url})"
            ),
        }
    }
}

impl std::error::Error for SubmissionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SubmissionError::InvalidParameters(err) => Some(err),
            SubmissionError::StepFailed {
                cause: StepFailure::Transport(err),
                ..
            } => Some(&**err),
            _ => None,
        }
    }
}

impl From<ParameterError> for SubmissionError {
    fn from(err: ParameterError) -> Self {
        SubmissionError::InvalidParameters(err)
    }
}

#[derive(Debug)]
pub enum RetrievalError {
    /// Non-2xx answer; a job still processing looks the same as a missing one.
    RetrievalFailed { status: u16 },
    Transport(anyhow::Error),
    Io { path: PathBuf, source: std::io::Error },
}

impl fmt::Display for RetrievalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RetrievalError::RetrievalFailed { status } => {
                write!(f, "artifact download failed with HTTP status {status}")
            }
            RetrievalError::Transport(err) => write!(f, "artifact download failed: {err:#}"),
            RetrievalError::Io { path, source } => {
                write!(f, "write artifact {}: {source}", path.display())
            }
        }
    }
}

impl std::error::Error for RetrievalError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RetrievalError::Transport(err) => Some(&**err),
            RetrievalError::Io { source, .. } => Some(source),
            RetrievalError::RetrievalFailed { .. } => None,
        }
    }
}
