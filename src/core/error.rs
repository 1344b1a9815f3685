//! Error types for the logging pipeline

pub type Result<T> = std::result::Result<T, LogError>;

#[derive(Debug, thiserror::Error)]
pub enum LogError {
    /// Malformed configuration; the pipeline cannot be built
    #[error("invalid configuration for {component}: {message}")]
    Config { component: String, message: String },

    /// A sink destination rejected a write; non-fatal to the pipeline
    #[error("sink '{sink}' write failed: {source}")]
    Write {
        sink: String,
        #[source]
        source: std::io::Error,
    },

    /// Rename/compress/delete during rotation failed
    #[error("rotation failed for '{path}': {message}")]
    Rotation { path: String, message: String },

    /// A dynamic level update carried an unparseable severity
    #[error("ignoring level update '{value}': {message}")]
    WatchParse { value: String, message: String },

    /// Structured encoding failed
    #[error("encode error: {0}")]
    Encode(#[from] serde_json::Error),

    /// Generic IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl LogError {
    /// Create a configuration error
    pub fn config(component: impl Into<String>, message: impl Into<String>) -> Self {
        LogError::Config {
            component: component.into(),
            message: message.into(),
        }
    }

    /// Create a sink write error
    pub fn write(sink: impl Into<String>, source: std::io::Error) -> Self {
        LogError::Write {
            sink: sink.into(),
            source,
        }
    }

    /// Create a rotation error
    pub fn rotation(path: impl Into<String>, message: impl Into<String>) -> Self {
        LogError::Rotation {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a watch parse error
    pub fn watch_parse(value: impl Into<String>, message: impl Into<String>) -> Self {
        LogError::WatchParse {
            value: value.into(),
            message: message.into(),
        }
    }
}
