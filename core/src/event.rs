// Copyright (c) 2024 Mike Tsao. All rights reserved.

use crate::{
    midi::MidiChannel,
    time::GridPosition,
};
use serde::{Deserialize, Serialize};

/// Whether a note starts or stops.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NoteStatus {
    #[allow(missing_docs)]
    NoteOn,
    #[allow(missing_docs)]
    NoteOff,
}
impl NoteStatus {
    /// The MIDI status nibble, which is also what the player stores.
    pub const fn status_byte(&self) -> u8 {
        match self {
            NoteStatus::NoteOn => 0x90,
            NoteStatus::NoteOff => 0x80,
        }
    }

    /// Ordering among events at the same instant. Note-ons come first.
    pub(crate) const fn rank(&self) -> u8 {
        match self {
            NoteStatus::NoteOn => 0,
            NoteStatus::NoteOff => 1,
        }
    }
}

/// A note-on or note-off, already placed on the grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NoteEvent {
    channel: MidiChannel,
    status: NoteStatus,
    key: u8,
    velocity: u8,
    position: GridPosition,
    quantized: GridPosition,
    color: u8,
}
impl NoteEvent {
    /// The color the player uses unless told otherwise.
    pub const DEFAULT_COLOR: u8 = 0x2D;

    /// Creates an event. A note-on with zero velocity is a note-off, and is
    /// recorded as one.
    pub fn new(
        channel: MidiChannel,
        status: NoteStatus,
        key: u8,
        velocity: u8,
        position: GridPosition,
        color: u8,
    ) -> Self {
        let status = if velocity == 0 {
            NoteStatus::NoteOff
        } else {
            status
        };
        Self {
            channel,
            status,
            key,
            velocity,
            position,
            quantized: position,
            color,
        }
    }

    #[allow(missing_docs)]
    pub fn channel(&self) -> MidiChannel {
        self.channel
    }

    #[allow(missing_docs)]
    pub fn status(&self) -> NoteStatus {
        self.status
    }

    #[allow(missing_docs)]
    pub fn key(&self) -> u8 {
        self.key
    }

    #[allow(missing_docs)]
    pub fn velocity(&self) -> u8 {
        self.velocity
    }

    /// Where the event actually happened.
    pub fn position(&self) -> GridPosition {
        self.position
    }

    /// Where the player should put it. Identical to `position()` until
    /// something re-quantizes.
    pub fn quantized(&self) -> GridPosition {
        self.quantized
    }

    #[allow(missing_docs)]
    pub fn color(&self) -> u8 {
        self.color
    }

    /// Moves the event to another channel. Only channel reduction does this.
    pub(crate) fn set_channel(&mut self, channel: MidiChannel) {
        self.channel = channel;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn channel(value: u8) -> MidiChannel {
        MidiChannel::new(value).unwrap()
    }

    #[test]
    fn zero_velocity_note_on_is_note_off() {
        for key in [0, 60, 127] {
            let e = NoteEvent::new(
                channel(1),
                NoteStatus::NoteOn,
                key,
                0,
                GridPosition::default(),
                NoteEvent::DEFAULT_COLOR,
            );
            assert_eq!(e.status(), NoteStatus::NoteOff);
            assert_eq!(e.status().status_byte(), 0x80);
        }
        let e = NoteEvent::new(
            channel(1),
            NoteStatus::NoteOn,
            60,
            1,
            GridPosition::default(),
            NoteEvent::DEFAULT_COLOR,
        );
        assert_eq!(e.status(), NoteStatus::NoteOn, "any velocity > 0 stays on");
        assert_eq!(e.status().status_byte(), 0x90);
    }

    #[test]
    fn quantized_matches_position() {
        let position = GridPosition {
            bar: 3,
            beat: 2,
            tick: 1000,
        };
        let mut e = NoteEvent::new(
            channel(4),
            NoteStatus::NoteOff,
            64,
            90,
            position,
            NoteEvent::DEFAULT_COLOR,
        );
        assert_eq!(e.position(), e.quantized());
        assert_eq!(e.color(), 0x2D);

        e.set_channel(channel(2));
        assert_eq!(e.channel(), channel(2));
        assert_eq!(e.position(), position, "moving channels leaves time alone");
    }

    #[test]
    fn note_on_ranks_before_note_off() {
        assert!(NoteStatus::NoteOn.rank() < NoteStatus::NoteOff.rank());
    }
}
