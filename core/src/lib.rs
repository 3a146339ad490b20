// Copyright (c) 2024 Mike Tsao. All rights reserved.

//! Converts MIDI songs into the compact eight-channel format that small
//! sequencer players load.

/// Per-channel instrument/volume state and usage counting.
pub mod channels;
/// The end-to-end conversion pipeline.
pub mod convert;
/// Things that can go wrong.
pub mod error;
/// Note events placed on the grid.
pub mod event;
/// The compact song and its JSON form.
pub mod export;
/// MIDI-related constants and types.
pub mod midi;
/// Fits a song into the player's channel budget.
pub mod reduce;
/// Knobs for a conversion run.
pub mod settings;
/// Standard MIDI File input.
pub mod smf;
/// Playback ordering.
pub mod sort;
/// Timed message input.
pub mod stream;
/// Tempo and the bar/beat/tick grid.
pub mod time;

/// Recommended imports for easy onboarding.
pub mod prelude {
    pub use super::channels::{ChannelTable, ChannelUsage};
    pub use super::convert::{Conversion, ConversionReport, ConversionWarning, Converter};
    pub use super::error::{ConvertError, Result};
    pub use super::event::{NoteEvent, NoteStatus};
    pub use super::export::{ChannelSlots, CompactNote, CompactSong, ExportConstants};
    pub use super::midi::prelude::*;
    pub use super::reduce::{ChannelReducer, Reduction, ReductionStep};
    pub use super::settings::ConvertSettings;
    pub use super::smf::SmfReader;
    pub use super::sort::sort_events;
    pub use super::stream::{Song, SongBuilder, StreamEvent, StreamMessage};
    pub use super::time::{GridConfig, GridPosition, Tempo};
}
