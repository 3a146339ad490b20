// Copyright (c) 2024 Mike Tsao. All rights reserved.

//! Per-channel state and usage counting.

use crate::{
    event::NoteEvent,
    midi::{GeneralMidiProgram, MidiChannel},
};

/// The instrument and volume each channel ended up with. Filled in message
/// order while a song is read, and only read after that.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ChannelTable {
    instruments: [u8; MidiChannel::COUNT],
    volumes: [u8; MidiChannel::COUNT],
}
impl ChannelTable {
    /// The last program change seen on the channel, or 0 (Acoustic Grand
    /// Piano).
    pub fn instrument(&self, channel: MidiChannel) -> u8 {
        self.instruments[channel.index()]
    }

    /// The last controller-7 value seen on the channel, or 0.
    pub fn volume(&self, channel: MidiChannel) -> u8 {
        self.volumes[channel.index()]
    }

    #[allow(missing_docs)]
    pub fn set_instrument(&mut self, channel: MidiChannel, program: u8) {
        self.instruments[channel.index()] = program;
    }

    #[allow(missing_docs)]
    pub fn set_volume(&mut self, channel: MidiChannel, volume: u8) {
        self.volumes[channel.index()] = volume;
    }
}

/// How many events each channel carries, and which melodic channels that
/// makes "used." The percussion channel is counted but never listed, because
/// it always gets its own output slot.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ChannelUsage {
    counts: [usize; MidiChannel::COUNT],
    used: Vec<MidiChannel>,
}
impl ChannelUsage {
    /// Counts every event, on or off, per channel.
    pub fn analyze(events: &[NoteEvent]) -> Self {
        let mut counts = [0; MidiChannel::COUNT];
        events
            .iter()
            .for_each(|e| counts[e.channel().index()] += 1);
        let used = MidiChannel::all()
            .filter(|c| !c.is_percussion() && counts[c.index()] > 0)
            .collect();
        Self { counts, used }
    }

    /// Melodic channels with at least one event, lowest first.
    pub fn used_channels(&self) -> &[MidiChannel] {
        &self.used
    }

    #[allow(missing_docs)]
    pub fn note_count(&self, channel: MidiChannel) -> usize {
        self.counts[channel.index()]
    }

    /// Reports each channel's state at info level.
    pub fn log_summary(&self, table: &ChannelTable) {
        for channel in MidiChannel::all() {
            let count = self.note_count(channel);
            if channel.is_percussion() {
                log::info!("channel {channel}: PERCUSSION - nb notes: {count}");
            } else if count > 0 {
                let program = table.instrument(channel);
                log::info!(
                    "channel {channel}: USED - instrument: {program} {} - volume: {} - nb notes: {count}",
                    GeneralMidiProgram::name_of(program),
                    table.volume(channel),
                );
            } else {
                log::info!("channel {channel}: UNUSED");
            }
        }
    }
}
