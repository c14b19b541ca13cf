use std::io;
use std::path::PathBuf;

use thiserror::Error;

// =============================================================================
// Configuration errors
// =============================================================================

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Cannot determine working directory: {0}")]
    WorkingDir(#[source] io::Error),

    #[error("Failed to parse config file at line {line}, column {column}: {message}")]
    Parse {
        line: usize,
        column: usize,
        message: String,
    },

    #[error("memory.slots must be at least 1")]
    ZeroSlots,

    #[error(
        "{cycles} cycles of {slots} slots would retain {requested} bytes (limit: {limit})"
    )]
    RetentionLimit {
        cycles: usize,
        slots: usize,
        requested: u64,
        limit: u64,
    },

    #[error("Unknown log level '{level}'")]
    InvalidLogLevel { level: String },
}

impl ConfigError {
    pub fn parse(line: usize, column: usize, message: impl Into<String>) -> Self {
        Self::Parse {
            line,
            column,
            message: message.into(),
        }
    }

    /// Converts a TOML error, resolving its byte span to a 1-based line and
    /// column within `source`.
    pub fn from_toml(err: toml::de::Error, source: &str) -> Self {
        let (line, column) = match err.span() {
            Some(span) => line_column(source, span.start),
            None => (0, 0),
        };
        ConfigError::parse(line, column, err.message())
    }
}

fn line_column(source: &str, offset: usize) -> (usize, usize) {
    let prefix = &source[..offset.min(source.len())];
    let line = prefix.matches('\n').count() + 1;
    let column = prefix.rfind('\n').map_or(prefix.len(), |nl| prefix.len() - nl - 1) + 1;
    (line, column)
}

// =============================================================================
// Heap profile errors
// =============================================================================

#[derive(Error, Debug)]
pub enum ProfileError {
    #[error("Failed to create profile directory {}: {source}", .path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

// =============================================================================
// Call timer errors
// =============================================================================

#[derive(Error, Debug)]
pub enum TimerError {
    #[error("{label}: call {call} returned {actual}, expected {expected}")]
    UnexpectedSize {
        label: &'static str,
        expected: usize,
        actual: usize,
        call: usize,
    },

    #[error("Failed to write measurement: {0}")]
    Write(#[from] io::Error),
}

// =============================================================================
// Top-level error
// =============================================================================

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Profile(#[from] ProfileError),

    #[error(transparent)]
    Timer(#[from] TimerError),

    #[error("Failed to initialise logging: {0}")]
    Logging(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retention_limit_display() {
        let error = ConfigError::RetentionLimit {
            cycles: 1_000_000,
            slots: 65536,
            requested: 524_288_000_000,
            limit: 1 << 30,
        };
        let display = error.to_string();
        assert!(display.contains("1000000 cycles"));
        assert!(display.contains("65536 slots"));
        assert!(display.contains("limit: 1073741824"));
    }

    #[test]
    fn test_unexpected_size_display() {
        let error = TimerError::UnexpectedSize {
            label: "A: passing the val",
            expected: 65536,
            actual: 1,
            call: 7,
        };
        assert_eq!(
            error.to_string(),
            "A: passing the val: call 7 returned 1, expected 65536"
        );
    }

    #[test]
    fn test_top_level_is_transparent() {
        let error: Error = ConfigError::ZeroSlots.into();
        assert_eq!(error.to_string(), "memory.slots must be at least 1");
    }

    #[test]
    fn test_toml_error_conversion() {
        let source = "[memory]\ncycles = = 1\n";
        let err = toml::from_str::<toml::Value>(source).unwrap_err();
        match ConfigError::from_toml(err, source) {
            ConfigError::Parse { line, .. } => assert_eq!(line, 2),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_line_column() {
        let source = "[memory]\ncycles = x\n";
        assert_eq!(line_column(source, 0), (1, 1));
        assert_eq!(line_column(source, 9), (2, 1));
        assert_eq!(line_column(source, 18), (2, 10));
        assert_eq!(line_column(source, 500), (3, 1));
    }
}
