/// Error types for record interpretation, decoding and configuration.
use thiserror::Error;

use crate::audio::DecoderSpec;

/// Result type alias using `PlayerError`
pub type Result<T> = std::result::Result<T, PlayerError>;

/// Problems found while interpreting a record's key/value descriptor.
#[derive(Error, Debug)]
pub enum MetadataError {
    /// Descriptor is not a key/value object
    #[error("descriptor is not a key/value object")]
    NotAnObject,

    /// A required field is missing or has the wrong type
    #[error("invalid descriptor: {0}")]
    Layout(#[from] serde_json::Error),

    #[error("configuration declares zero channels")]
    ZeroChannels,

    #[error("configuration declares a zero sample rate")]
    ZeroSampleRate,
}

/// Failures reported by a codec backend.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// Handle creation was rejected (bad parameters, unsupported layout)
    #[error("codec init failed: {0}")]
    Init(String),

    /// The backend ran out of memory while creating a handle
    #[error("codec resources exhausted: {0}")]
    Exhausted(String),

    /// The backend rejected a payload
    #[error("codec rejected payload: {0}")]
    Decode(String),
}

/// Per-record failures surfaced by the player.
///
/// Every variant is recovered per record: the record is skipped and the
/// stream continues. Only `ResourceExhausted` is flagged as fatal.
#[derive(Error, Debug)]
pub enum PlayerError {
    #[error("metadata error: {0}")]
    Metadata(#[from] MetadataError),

    /// The payload of a record whose descriptor failed to parse
    #[error("payload skipped: metadata for this record was rejected")]
    SkippedAfterMetadataFailure,

    #[error("invalid audio block: {0}")]
    InvalidSpec(String),

    #[error("decoder init failed for {spec}: {source}")]
    DecoderInit {
        spec: DecoderSpec,
        #[source]
        source: CodecError,
    },

    #[error("decoder resources exhausted for {spec}: {source}")]
    ResourceExhausted {
        spec: DecoderSpec,
        #[source]
        source: CodecError,
    },

    #[error("decode error: {0}")]
    Decode(#[source] CodecError),

    /// Decoded sample count disagrees with the record's capture timestamps
    #[error("decoded {decoded} samples but record carries {timestamps} timestamps")]
    SampleCountMismatch { decoded: usize, timestamps: usize },

    #[error("payload is {actual} bytes, expected {expected}")]
    PayloadSize { expected: usize, actual: usize },

    #[error("unsupported audio format: {0}")]
    UnsupportedFormat(String),
}

impl PlayerError {
    /// Whether the codec reported an unrecoverable condition.
    pub fn is_fatal(&self) -> bool {
        matches!(self, PlayerError::ResourceExhausted { .. })
    }
}

/// Configuration loading and validation failures.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to parse {0}")]
    Parse(&'static str),

    #[error("invalid config document: {0}")]
    Format(String),

    #[error("continuity tolerance must be within [0, 1), got {0}")]
    Tolerance(f64),
}
