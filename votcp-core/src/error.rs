//! Error types for votcp-core organized by processing stage.

use std::path::PathBuf;
use thiserror::Error;

/// Stop-tier preparation error variants organized by processing stage.
#[derive(Debug, Error)]
pub enum Error {
    /// Annotation file reading or writing error
    #[error(transparent)]
    TextGrid(#[from] TextGridError),

    /// Tier naming or pairing error
    #[error(transparent)]
    Tier(#[from] TierError),

    /// Interval repair error
    #[error(transparent)]
    Repair(#[from] RepairError),

    /// Audio preparation error
    #[error(transparent)]
    Audio(#[from] AudioError),

    /// Predictor invocation error
    #[error(transparent)]
    Predict(#[from] PredictError),
}

/// TextGrid reading, writing and editing errors.
#[derive(Debug, Error)]
pub enum TextGridError {
    /// File could not be read or parsed
    #[error("failed to read TextGrid {path:?}: {message}")]
    Read { path: PathBuf, message: String },

    /// File could not be written
    #[error("failed to write TextGrid {path:?}: {message}")]
    Write { path: PathBuf, message: String },

    /// Document or tier rejected by the TextGrid model
    #[error("invalid TextGrid: {0}")]
    Invalid(String),

    /// Tier name collision on insertion
    #[error("tier {0:?} already exists")]
    DuplicateTier(String),
}

/// Tier naming and word/phone pairing errors.
///
/// Every variant aborts the current recording.
#[derive(Debug, Error)]
pub enum TierError {
    /// A tier name already ends in the reserved suffix
    #[error("tier {name:?} in {file} ends with 'stops'; relabel it before continuing")]
    ReservedStopsSuffix { name: String, file: String },

    /// A tier has an empty name
    #[error("at least one tier in {file} has no name")]
    EmptyName { file: String },

    /// Two tier names collapse to the same lower-case name
    #[error("tier names in {file} collide after lower-casing: {name:?}")]
    DuplicateName { name: String, file: String },

    /// No tier name contains "word"
    #[error("{file} does not contain any tier labeled 'words'")]
    NoWordTier { file: String },

    /// No tier name contains "phone"
    #[error("{file} does not contain any tier labeled 'phones'")]
    NoPhoneTier { file: String },

    /// Word and phone tier counts differ
    #[error(
        "{file} has {words} 'word' tier(s) but {phones} 'phone' tier(s); expected one of each per speaker"
    )]
    CountMismatch {
        words: usize,
        phones: usize,
        file: String,
    },

    /// Phone tier without a matching word tier
    #[error("phone tier {phone:?} in {file} has no matching word tier {expected:?}")]
    Unpaired {
        phone: String,
        expected: String,
        file: String,
    },

    /// Selected tier is not an interval tier
    #[error("tier {name:?} in {file} is not an interval tier")]
    NotIntervalTier { name: String, file: String },

    /// No speaker produced a populated stop tier
    #[error("no stops of interest were found in {file}")]
    NoStopsFound { file: String },
}

/// Interval repair errors.
#[derive(Debug, Error)]
pub enum RepairError {
    /// Two padded intervals overlap
    #[error(
        "in {file} (after adding padding), the segment starting at {current_start:.3} sec overlaps with the segment starting at {next_start:.3}"
    )]
    Overlap {
        current_start: f64,
        next_start: f64,
        file: String,
    },
}

/// Audio loading, conversion and channel selection errors.
#[derive(Debug, Error)]
pub enum AudioError {
    /// Audio has no channels or no samples
    #[error("audio contains no samples")]
    Empty,

    /// Requested channel does not exist
    #[error("channel {channel} requested but audio has {channels} channel(s)")]
    ChannelOutOfRange { channel: u16, channels: u16 },

    /// Distinct-channel mode needs one channel per stop tier
    #[error(
        "distinct channels enabled, but {file} has {channels} channel(s) for {tiers} speaker tier(s)"
    )]
    ChannelCountMismatch {
        channels: usize,
        tiers: usize,
        file: String,
    },

    /// Sample-rate conversion failed
    #[error("resampling failed: {0}")]
    Resample(String),

    /// IO error during audio loading
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// WAV file format error
    #[error(transparent)]
    Hound(#[from] hound::Error),
}

/// External predictor errors.
#[derive(Debug, Error)]
pub enum PredictError {
    /// Predictor process could not be started
    #[error("failed to start predictor {program:?}: {source}")]
    Spawn {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Predictor exited unsuccessfully
    #[error("predictor failed on tier {tier:?} ({status})")]
    Failed { tier: String, status: String },

    /// No prediction was attempted
    #[error("no VOT predictions were obtained for {file}")]
    NoInvocation { file: String },

    /// IO error while preparing or relabelling files
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Result type alias for votcp-core operations.
pub type Result<T> = std::result::Result<T, Error>;

// Nested From implementations for automatic error conversion chains

// hound::Error → AudioError → Error
impl From<hound::Error> for Error {
    fn from(e: hound::Error) -> Self {
        Error::Audio(AudioError::Hound(e))
    }
}
