// Copyright (c) 2024 Mike Tsao. All rights reserved.

//! The whole pipeline: read the stream, reduce channels, sort, export.

use crate::{
    channels::ChannelUsage,
    error::Result,
    export::{ChannelSlots, CompactSong},
    midi::MidiChannel,
    reduce::ReductionStep,
    settings::ConvertSettings,
    sort::sort_events,
    stream::{SongBuilder, StreamMessage},
    time::Tempo,
};
use std::fmt;

/// Something worth telling the user that doesn't stop the conversion.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConversionWarning {
    /// The stream set the tempo more than once. Only `kept` was used.
    MultipleTempo {
        #[allow(missing_docs)]
        kept: Tempo,
        #[allow(missing_docs)]
        ignored: Tempo,
    },
    /// The song has more notes than the player is comfortable with.
    TooManyNotes {
        #[allow(missing_docs)]
        count: usize,
        #[allow(missing_docs)]
        limit: usize,
    },
    /// The serialized song is bigger than the player can load.
    OutputTooLarge {
        #[allow(missing_docs)]
        size: usize,
        #[allow(missing_docs)]
        limit: usize,
    },
}
impl fmt::Display for ConversionWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConversionWarning::MultipleTempo { kept, ignored } => {
                write!(f, "multiple set tempo: kept {kept}, ignored {ignored}")
            }
            ConversionWarning::TooManyNotes { count, limit } => {
                write!(f, "song too long: {count} notes, limit is {limit}")
            }
            ConversionWarning::OutputTooLarge { size, limit } => {
                write!(f, "output too large: {size} characters, limit is {limit}")
            }
        }
    }
}

/// What a conversion did, for the user's benefit.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ConversionReport {
    /// Melodic channels with notes, before reduction.
    pub used_before: Vec<MidiChannel>,
    /// Channels in player slot order, percussion first.
    pub slots: Vec<MidiChannel>,
    /// Merges and drops, in the order they happened.
    pub steps: Vec<ReductionStep>,
    #[allow(missing_docs)]
    pub warnings: Vec<ConversionWarning>,
}
impl ConversionReport {
    fn warn(&mut self, warning: ConversionWarning) {
        log::warn!("{warning}");
        self.warnings.push(warning);
    }
}

/// A finished conversion.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Conversion {
    #[allow(missing_docs)]
    pub song: CompactSong,
    #[allow(missing_docs)]
    pub report: ConversionReport,
    output_size_limit: usize,
}
impl Conversion {
    /// Serializes the song and checks the result against the size limit. An
    /// oversized song is still returned; the report gets a warning.
    pub fn check_size(&mut self) -> Result<String> {
        let json = self.song.to_json()?;
        if json.len() > self.output_size_limit {
            self.report.warn(ConversionWarning::OutputTooLarge {
                size: json.len(),
                limit: self.output_size_limit,
            });
        }
        Ok(json)
    }
}

/// Runs a stream of messages through the pipeline.
#[derive(Clone, Debug, Default)]
pub struct Converter {
    settings: ConvertSettings,
}
impl Converter {
    #[allow(missing_docs)]
    pub fn new(settings: ConvertSettings) -> Self {
        Self { settings }
    }

    #[allow(missing_docs)]
    pub fn settings(&self) -> &ConvertSettings {
        &self.settings
    }

    /// Converts one song. Nothing is produced unless every message is valid.
    pub fn convert(&self, messages: &[StreamMessage]) -> Result<Conversion> {
        let mut builder = SongBuilder::new(self.settings.grid, self.settings.color);
        builder.ingest_all(messages)?;
        let mut song = builder.build();
        let mut report = ConversionReport::default();

        for ignored in song.ignored_tempos.iter() {
            report.warn(ConversionWarning::MultipleTempo {
                kept: song.tempo,
                ignored: *ignored,
            });
        }

        let usage = ChannelUsage::analyze(&song.events);
        usage.log_summary(&song.channels);
        report.used_before = usage.used_channels().to_vec();

        let reduction = self
            .settings
            .reducer()
            .reduce(&mut song.events, &song.channels);
        report.steps = reduction.steps;

        sort_events(&mut song.events);

        let slots = ChannelSlots::new(&reduction.used_channels);
        report.slots = slots.channels().to_vec();
        log::info!(
            "channels kept: {}",
            report
                .slots
                .iter()
                .map(|c| c.to_string())
                .collect::<Vec<_>>()
                .join(", ")
        );

        let compact = CompactSong::new(
            &song.events,
            &slots,
            &song.channels,
            song.tempo,
            &self.settings.export_constants(),
        );
        if compact.song_length > self.settings.song_length_limit {
            report.warn(ConversionWarning::TooManyNotes {
                count: compact.song_length,
                limit: self.settings.song_length_limit,
            });
        }

        Ok(Conversion {
            song: compact,
            report,
            output_size_limit: self.settings.output_size_limit,
        })
    }
}
