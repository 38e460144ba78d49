//! Error types for the decay pipeline
//!
//! Missing particle references and unmatched templates are not errors; they
//! are absorbed by the matcher and the hit associator. Only batch-level
//! failures surface here.

use std::fmt;

/// Errors that can occur while running the pipeline
#[derive(Debug)]
pub enum PipelineError {
    /// An event index at or beyond the number of available events was requested
    EventOutOfRange {
        /// Requested event index
        index: usize,
        /// Number of events the source provides
        count: usize,
    },

    /// Configuration error
    Configuration {
        /// Description of the configuration issue
        description: String,
    },

    /// Reading input or writing output failed
    Io {
        /// What was being read or written
        context: String,
        /// Underlying I/O error
        source: std::io::Error,
    },

    /// Input could not be decoded, or output could not be encoded
    Parse {
        /// What was being decoded
        context: String,
        /// Decoder message
        description: String,
    },
}

impl PipelineError {
    /// Create a configuration error
    pub fn configuration(description: impl Into<String>) -> Self {
        PipelineError::Configuration {
            description: description.into(),
        }
    }

    /// Attach a context to an I/O error
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        PipelineError::Io {
            context: context.into(),
            source,
        }
    }

    /// Attach a context to a JSON error
    pub fn parse(context: impl Into<String>, error: serde_json::Error) -> Self {
        PipelineError::Parse {
            context: context.into(),
            description: error.to_string(),
        }
    }
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineError::EventOutOfRange { index, count } => {
                write!(
                    f,
                    "Event index {} out of range: source provides {} events",
                    index, count
                )
            }
            PipelineError::Configuration { description } => {
                write!(f, "Configuration error: {}", description)
            }
            PipelineError::Io { context, source } => {
                write!(f, "I/O error ({}): {}", context, source)
            }
            PipelineError::Parse {
                context,
                description,
            } => {
                write!(f, "Parse error ({}): {}", context, description)
            }
        }
    }
}

impl std::error::Error for PipelineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PipelineError::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<std::io::Error> for PipelineError {
    fn from(e: std::io::Error) -> Self {
        PipelineError::io("unspecified", e)
    }
}

impl From<serde_json::Error> for PipelineError {
    fn from(e: serde_json::Error) -> Self {
        PipelineError::parse("json", e)
    }
}
