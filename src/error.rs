use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PingError {
    #[error("Failed to send packet: {0}")]
    SendError(#[from] io::Error),

    #[error("Timeout")]
    Timeout,

    #[error("Packet construction error")]
    PacketConstructionError,

    #[error("Permission denied: raw sockets require root privileges")]
    PermissionDenied,

    #[error("Failed to resolve hostname: {0}")]
    ResolutionError(String),

    #[error("Attempts must be at least 1, got {0}")]
    AttemptsOutOfRange(i64),
}

/// Errors raised while turning argv into a `Config`. All of them are fatal.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{0} or {1} should be provided")]
    MissingEndpointSource(&'static str, &'static str),

    #[error("only one of {0} or {1} may be provided")]
    ConflictingEndpointSources(&'static str, &'static str),

    #[error("{0} requires a value")]
    MissingValue(&'static str),

    #[error("{0} must be a valid integer, got '{1}'")]
    InvalidInteger(&'static str, String),

    #[error("{0} must not be negative, got {1}")]
    Negative(&'static str, i64),

    #[error("{0} must be at least 1, got {1}")]
    NotPositive(&'static str, i64),

    #[error("{0} is not a valid .txt file: {1}")]
    InvalidEndpointsFile(&'static str, String),

    #[error("no endpoints given via {0}")]
    NoEndpoints(&'static str),

    #[error("failed to read endpoints file {0}: {1}")]
    Io(String, #[source] io::Error),
}

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("failed to write report {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("failed to write console report: {0}")]
    Console(#[from] io::Error),
}

pub type PingResult<T> = Result<T, PingError>;
