/*!
    Error types for the bitstream feeder crates.
*/

use std::collections::TryReserveError;
use std::fmt;

use thiserror::Error;

type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/**
    Error surfaced by a feeding session.

    Every variant is fatal: the session stops, releases its working buffer
    and reports the error to the caller. Nothing is retried internally.
*/
#[derive(Debug, Error)]
pub enum Error {
    /// The working buffer could not be reserved.
    #[error("could not allocate a working buffer of {capacity} bytes")]
    Allocation {
        capacity: usize,
        source: TryReserveError,
    },
    /// Buffer sizes or parser settings are inconsistent.
    #[error("invalid configuration: {message}")]
    InvalidConfig { message: String },
    /// The byte source failed (distinct from a clean end of stream).
    #[error("source read failed: {0}")]
    SourceRead(#[from] std::io::Error),
    /// The parser rejected its input.
    #[error("parse error at byte {offset}: {source}")]
    Parse { offset: u64, source: ParseError },
    /// The downstream sink rejected a chunk or its flush.
    #[error("consumer error: {0}")]
    Consumer(#[from] ConsumeError),
    /// The parser needs more data but the data region is already full.
    #[error("parser made no progress with {buffered} bytes buffered and no room to refill")]
    Stalled { buffered: usize },
}

impl Error {
    /**
        Create an invalid configuration error with the given message.
    */
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /**
        Returns true if the parser rejected its input.
    */
    pub fn is_parse(&self) -> bool {
        matches!(self, Self::Parse { .. })
    }

    /**
        Returns true if the downstream sink failed.
    */
    pub fn is_consumer(&self) -> bool {
        matches!(self, Self::Consumer(_))
    }
}

/**
    Failure reported by a parser for malformed input.
*/
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ParseError {
    message: String,
}

impl ParseError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/**
    Failure reported by a sink, optionally wrapping the underlying cause.
*/
#[derive(Debug)]
pub struct ConsumeError {
    message: String,
    source: Option<BoxError>,
}

impl ConsumeError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    /**
        Create an error that keeps `source` as its cause.
    */
    pub fn with_source(message: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for ConsumeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.source {
            Some(source) => write!(f, "{}: {source}", self.message),
            None => f.write_str(&self.message),
        }
    }
}

impl std::error::Error for ConsumeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_deref()
            .map(|e| e as &(dyn std::error::Error + 'static))
    }
}

impl From<std::io::Error> for ConsumeError {
    fn from(e: std::io::Error) -> Self {
        Self::with_source("sink I/O failed", e)
    }
}

/**
    Result type alias for the bitstream feeder crates.
*/
pub type Result<T> = std::result::Result<T, Error>;

static_assertions::assert_impl_all!(Error: Send, Sync);
