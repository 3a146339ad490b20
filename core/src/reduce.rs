// Copyright (c) 2024 Mike Tsao. All rights reserved.

//! Fits a song into the player's channel budget.
//!
//! Reduction happens in two phases. First, melodic channels that play the
//! same instrument are folded into one: the listener can't tell them apart
//! anyway. If that isn't enough, whole channels are dropped, quietest (fewest
//! events) first. The percussion channel is never considered; it owns its
//! own slot.

use crate::{
    channels::{ChannelTable, ChannelUsage},
    event::NoteEvent,
    export::ChannelSlots,
    midi::{GeneralMidiProgram, MidiChannel},
};
use std::{collections::HashMap, fmt};

/// One decision the reducer made.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReductionStep {
    /// Every event on `from` now plays on `into`.
    Merged {
        #[allow(missing_docs)]
        from: MidiChannel,
        #[allow(missing_docs)]
        into: MidiChannel,
        /// The instrument the two channels shared.
        program: u8,
    },
    /// The channel and all its events are gone.
    Dropped {
        #[allow(missing_docs)]
        channel: MidiChannel,
        #[allow(missing_docs)]
        program: u8,
        #[allow(missing_docs)]
        volume: u8,
        #[allow(missing_docs)]
        note_count: usize,
    },
}
impl fmt::Display for ReductionStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReductionStep::Merged {
                from,
                into,
                program,
            } => write!(
                f,
                "merged channel {from} into channel {into} - instrument: {program} {}",
                GeneralMidiProgram::name_of(*program)
            ),
            ReductionStep::Dropped {
                channel,
                program,
                volume,
                note_count,
            } => write!(
                f,
                "removed channel {channel} - instrument: {program} {} - volume: {volume} - nb notes: {note_count}",
                GeneralMidiProgram::name_of(*program)
            ),
        }
    }
}

/// What's left after reduction.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Reduction {
    /// Surviving melodic channels, lowest first. Never longer than the
    /// reducer's budget.
    pub used_channels: Vec<MidiChannel>,
    /// Everything the reducer did, in order.
    pub steps: Vec<ReductionStep>,
}

/// Applies merge-then-drop until the melodic channels fit the budget.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChannelReducer {
    max_melodic_channels: usize,
    always_merge: bool,
}
impl Default for ChannelReducer {
    fn default() -> Self {
        Self::new(Self::DEFAULT_MAX_MELODIC_CHANNELS)
    }
}
impl ChannelReducer {
    /// Eight player channels, one of which is percussion.
    pub const DEFAULT_MAX_MELODIC_CHANNELS: usize = 7;

    /// The most melodic channels the player has slots for.
    pub const MAX_MELODIC_CHANNELS: usize = ChannelSlots::SLOT_COUNT - 1;

    /// Budgets above [Self::MAX_MELODIC_CHANNELS] are clamped to it.
    pub fn new(max_melodic_channels: usize) -> Self {
        if max_melodic_channels > Self::MAX_MELODIC_CHANNELS {
            log::warn!(
                "max melodic channels {max_melodic_channels} is more than the player's {}; using {}",
                Self::MAX_MELODIC_CHANNELS,
                Self::MAX_MELODIC_CHANNELS
            );
        }
        Self {
            max_melodic_channels: max_melodic_channels.min(Self::MAX_MELODIC_CHANNELS),
            always_merge: false,
        }
    }

    /// Merge channels that share an instrument even when the song already
    /// fits.
    pub fn with_always_merge(mut self, always_merge: bool) -> Self {
        self.always_merge = always_merge;
        self
    }

    #[allow(missing_docs)]
    pub fn max_melodic_channels(&self) -> usize {
        self.max_melodic_channels
    }

    /// Whether the given channel count needs reducing.
    pub fn is_over_budget(&self, channel_count: usize) -> bool {
        channel_count > self.max_melodic_channels
    }

    /// Runs both phases as needed. `events` is edited in place: merged events
    /// change channel, dropped events disappear, and everything else keeps its
    /// relative order.
    pub fn reduce(&self, events: &mut Vec<NoteEvent>, table: &ChannelTable) -> Reduction {
        let mut usage = ChannelUsage::analyze(events);
        let mut steps = Vec::default();

        if self.always_merge || self.is_over_budget(usage.used_channels().len()) {
            if self.is_over_budget(usage.used_channels().len()) {
                log::info!(
                    "{} melodic channels used, more than {}. Trying to merge channels that use the same instrument...",
                    usage.used_channels().len(),
                    self.max_melodic_channels
                );
            }
            steps.extend(Self::merge_shared_instruments(
                events,
                table,
                usage.used_channels(),
            ));
            usage = ChannelUsage::analyze(events);
        }

        let mut used_channels = usage.used_channels().to_vec();
        if self.is_over_budget(used_channels.len()) {
            log::info!(
                "{} melodic channels still used. Removing the channels that have the fewest notes...",
                used_channels.len()
            );
            steps.extend(self.drop_least_used(events, table, &usage, &mut used_channels));
        }

        Reduction {
            used_channels,
            steps,
        }
    }

    /// Phase 1. Within each group of channels sharing a program, the first in
    /// `used` order absorbs the others.
    pub fn merge_shared_instruments(
        events: &mut [NoteEvent],
        table: &ChannelTable,
        used: &[MidiChannel],
    ) -> Vec<ReductionStep> {
        let mut canonical: HashMap<u8, MidiChannel> = HashMap::default();
        let mut remap: HashMap<MidiChannel, MidiChannel> = HashMap::default();
        let mut steps = Vec::default();

        for &channel in used {
            let program = table.instrument(channel);
            let into = *canonical.entry(program).or_insert(channel);
            if into != channel {
                remap.insert(channel, into);
                let step = ReductionStep::Merged {
                    from: channel,
                    into,
                    program,
                };
                log::info!("{step}");
                steps.push(step);
            }
        }

        if !remap.is_empty() {
            events.iter_mut().for_each(|e| {
                if let Some(into) = remap.get(&e.channel()) {
                    e.set_channel(*into);
                }
            });
        }
        steps
    }

    /// Phase 2. Repeatedly removes the channel with the fewest events. Ties go
    /// to the channel that comes first in `used_channels`.
    pub fn drop_least_used(
        &self,
        events: &mut Vec<NoteEvent>,
        table: &ChannelTable,
        usage: &ChannelUsage,
        used_channels: &mut Vec<MidiChannel>,
    ) -> Vec<ReductionStep> {
        let mut steps = Vec::default();
        while self.is_over_budget(used_channels.len()) {
            let Some((index, channel)) = used_channels
                .iter()
                .copied()
                .enumerate()
                .min_by_key(|(_, c)| usage.note_count(*c))
            else {
                break;
            };
            used_channels.remove(index);
            events.retain(|e| e.channel() != channel);

            let step = ReductionStep::Dropped {
                channel,
                program: table.instrument(channel),
                volume: table.volume(channel),
                note_count: usage.note_count(channel),
            };
            log::info!("{step}");
            steps.push(step);
        }
        steps
    }
}
