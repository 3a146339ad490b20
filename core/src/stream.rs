// Copyright (c) 2024 Mike Tsao. All rights reserved.

//! Reads a stream of timed MIDI messages into a [Song].

use crate::{
    channels::ChannelTable,
    error::{check_data_byte, ConvertError, Result},
    event::{NoteEvent, NoteStatus},
    midi::{MidiChannel, MidiController},
    time::{GridConfig, Tempo},
};

/// The kinds of message the converter cares about. Channels are 1-based;
/// everything else is the raw MIDI value. Values are checked when the message
/// is ingested, not here, because they come from outside.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum StreamEvent {
    #[allow(missing_docs)]
    NoteOn { channel: u8, key: u8, velocity: u8 },
    #[allow(missing_docs)]
    NoteOff { channel: u8, key: u8, velocity: u8 },
    #[allow(missing_docs)]
    SetTempo { micros_per_beat: u32 },
    #[allow(missing_docs)]
    ProgramChange { channel: u8, program: u8 },
    #[allow(missing_docs)]
    ControlChange {
        channel: u8,
        controller: u8,
        value: u8,
    },
    /// `denominator` is the actual note value (4 for quarter notes), not the
    /// power of two that SMF stores.
    TimeSignature { numerator: u8, denominator: u32 },
    /// Anything else. It still takes up time.
    Other,
}

/// A message plus the time since the previous message, in seconds.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StreamMessage {
    #[allow(missing_docs)]
    pub delta_seconds: f64,
    #[allow(missing_docs)]
    pub event: StreamEvent,
}
impl StreamMessage {
    #[allow(missing_docs)]
    pub fn new(delta_seconds: f64, event: StreamEvent) -> Self {
        Self {
            delta_seconds,
            event,
        }
    }
}

/// A song that has been read but not yet reduced or sorted.
#[derive(Clone, Debug, PartialEq)]
pub struct Song {
    /// The tempo that governed quantization.
    pub tempo: Tempo,
    /// Instrument and volume per channel, as of the end of the stream.
    pub channels: ChannelTable,
    /// Note events in arrival order.
    pub events: Vec<NoteEvent>,
    /// Tempo changes after the first one, which were ignored.
    pub ignored_tempos: Vec<Tempo>,
}

/// Accumulates a [Song] one message at a time.
#[derive(Debug)]
pub struct SongBuilder {
    grid: GridConfig,
    color: u8,
    elapsed_micros: u64,
    tempo: Tempo,
    tempo_is_set: bool,
    ignored_tempos: Vec<Tempo>,
    channels: ChannelTable,
    events: Vec<NoteEvent>,
}
impl Default for SongBuilder {
    fn default() -> Self {
        Self::new(GridConfig::default(), NoteEvent::DEFAULT_COLOR)
    }
}
impl SongBuilder {
    #[allow(missing_docs)]
    pub fn new(grid: GridConfig, color: u8) -> Self {
        Self {
            grid,
            color,
            elapsed_micros: 0,
            tempo: Tempo::DEFAULT,
            tempo_is_set: false,
            ignored_tempos: Vec::default(),
            channels: ChannelTable::default(),
            events: Vec::default(),
        }
    }

    /// Microseconds since the start of the stream.
    pub fn elapsed_micros(&self) -> u64 {
        self.elapsed_micros
    }

    /// Takes the next message. On error the builder should be discarded.
    pub fn ingest(&mut self, message: &StreamMessage) -> Result<()> {
        let delta = message.delta_seconds;
        if !delta.is_finite() || delta < 0.0 {
            return Err(ConvertError::InvalidDelta(delta));
        }
        // Truncated per message, so rounding error doesn't accumulate upward.
        self.elapsed_micros = self
            .elapsed_micros
            .saturating_add((delta * 1_000_000.0) as u64);

        match message.event {
            StreamEvent::NoteOn {
                channel,
                key,
                velocity,
            } => self.add_note(channel, NoteStatus::NoteOn, key, velocity)?,
            StreamEvent::NoteOff {
                channel,
                key,
                velocity,
            } => self.add_note(channel, NoteStatus::NoteOff, key, velocity)?,
            StreamEvent::SetTempo { micros_per_beat } => {
                let tempo = Tempo::new(micros_per_beat)?;
                if self.tempo_is_set {
                    log::warn!("multiple set tempo: keeping {}, ignoring {tempo}", self.tempo);
                    self.ignored_tempos.push(tempo);
                } else {
                    self.tempo = tempo;
                    self.tempo_is_set = true;
                }
            }
            StreamEvent::ProgramChange { channel, program } => {
                let channel = MidiChannel::new(channel)?;
                let program = check_data_byte("program", program)?;
                self.channels.set_instrument(channel, program);
            }
            StreamEvent::ControlChange {
                channel,
                controller,
                value,
            } => {
                let channel = MidiChannel::new(channel)?;
                if controller > MidiController::MAX_VALUE {
                    return Err(ConvertError::ControllerOutOfRange(controller));
                }
                let value = check_data_byte("controller value", value)?;
                match controller {
                    MidiController::VOLUME => self.channels.set_volume(channel, value),
                    MidiController::BANK_SELECT_MSB | MidiController::BANK_SELECT_LSB => {
                        log::debug!("channel {channel}: ignoring bank select {value}");
                    }
                    _ => {}
                }
            }
            StreamEvent::TimeSignature {
                numerator,
                denominator,
            } => {
                if numerator as u32 != self.grid.beats_per_bar()
                    || denominator != self.grid.beat_type()
                {
                    log::debug!(
                        "ignoring time signature {numerator}/{denominator}; the grid is {}/{}",
                        self.grid.beats_per_bar(),
                        self.grid.beat_type()
                    );
                }
            }
            StreamEvent::Other => {}
        }
        Ok(())
    }

    fn add_note(&mut self, channel: u8, status: NoteStatus, key: u8, velocity: u8) -> Result<()> {
        let channel = MidiChannel::new(channel)?;
        let key = check_data_byte("key", key)?;
        let velocity = check_data_byte("velocity", velocity)?;
        let position = self.grid.quantize(self.elapsed_micros, self.tempo);
        self.events.push(NoteEvent::new(
            channel, status, key, velocity, position, self.color,
        ));
        Ok(())
    }

    /// Ingests a whole stream.
    pub fn ingest_all<'a>(
        &mut self,
        messages: impl IntoIterator<Item = &'a StreamMessage>,
    ) -> Result<()> {
        messages.into_iter().try_for_each(|m| self.ingest(m))
    }

    /// Freezes the channel table and hands over the song.
    pub fn build(self) -> Song {
        Song {
            tempo: self.tempo,
            channels: self.channels,
            events: self.events,
            ignored_tempos: self.ignored_tempos,
        }
    }
}
