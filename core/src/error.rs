// Copyright (c) 2024 Mike Tsao. All rights reserved.

use thiserror::Error;

/// Everything that can stop a conversion. None of these produce partial
/// output: the pipeline either finishes or returns one of them.
#[derive(Debug, Error)]
pub enum ConvertError {
    /// The source couldn't be read at all.
    #[error("couldn't read input: {0}")]
    Io(#[from] std::io::Error),

    /// The bytes aren't a Standard MIDI File we can parse.
    #[error("couldn't parse MIDI file: {0}")]
    Smf(#[from] midly::Error),

    /// The export couldn't be serialized.
    #[error("couldn't serialize song: {0}")]
    Serialize(#[from] serde_json::Error),

    /// The file's timing mode can't be turned into wall-clock time.
    #[error("unsupported MIDI timing: {0}")]
    UnsupportedTiming(String),

    /// Tempo must be a positive number of microseconds per beat.
    #[error("tempo must be a positive number of microseconds per beat, got {0}")]
    InvalidTempo(u32),

    /// A message arrived with a time delta that isn't a finite, non-negative
    /// number of seconds.
    #[error("invalid time delta {0} seconds")]
    InvalidDelta(f64),

    /// Upstream data named a channel outside 1..=16.
    #[error("channel {0} is outside 1..=16")]
    ChannelOutOfRange(u8),

    /// Upstream data named a controller outside 0..=127.
    #[error("controller {0} is outside 0..=127")]
    ControllerOutOfRange(u8),

    /// A seven-bit data byte (key, velocity, program, value) was out of range.
    #[error("{field} {value} is outside 0..=127")]
    DataOutOfRange {
        /// Which field was bad.
        field: &'static str,
        /// The value we got.
        value: u8,
    },
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, ConvertError>;

/// Checks that a MIDI data byte fits in seven bits.
pub(crate) fn check_data_byte(field: &'static str, value: u8) -> Result<u8> {
    if value > 127 {
        Err(ConvertError::DataOutOfRange { field, value })
    } else {
        Ok(value)
    }
}
