use thiserror::Error;

#[derive(Debug, Error)]
pub enum AlignmentError {
    #[error("I/O error while {context}: {source}")]
    Io {
        context: &'static str,
        #[source]
        source: std::io::Error,
    },
    #[error("JSON parse error while {context}: {source}")]
    Json {
        context: &'static str,
        #[source]
        source: serde_json::Error,
    },
    /// A repository lookup failed. Nothing has been persisted when this is returned.
    #[error("data access failed while {context}: {message}")]
    DataAccess {
        context: &'static str,
        message: String,
    },
    #[error("result sink rejected write while {context}: {message}")]
    Sink {
        context: &'static str,
        message: String,
    },
    #[error("invalid input: {message}")]
    InvalidInput { message: String },
}

impl AlignmentError {
    pub(crate) fn io(context: &'static str, source: std::io::Error) -> Self {
        Self::Io { context, source }
    }

    pub(crate) fn json(context: &'static str, source: serde_json::Error) -> Self {
        Self::Json { context, source }
    }

    pub fn data_access(context: &'static str, err: impl std::fmt::Display) -> Self {
        Self::DataAccess {
            context,
            message: err.to_string(),
        }
    }

    pub fn sink(context: &'static str, err: impl std::fmt::Display) -> Self {
        Self::Sink {
            context,
            message: err.to_string(),
        }
    }

    pub(crate) fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    pub fn is_data_access(&self) -> bool {
        matches!(self, Self::DataAccess { .. })
    }
}
