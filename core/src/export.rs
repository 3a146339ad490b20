// Copyright (c) 2024 Mike Tsao. All rights reserved.

//! The fixed-shape song the player loads.

use crate::{
    channels::ChannelTable,
    error::Result,
    event::NoteEvent,
    midi::MidiChannel,
    time::{GridConfig, Tempo},
};
use serde::{Deserialize, Serialize};

/// Maps surviving channels to player slots and back. Slot 0 is always the
/// percussion channel, whether or not the song uses it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChannelSlots(Vec<MidiChannel>);
impl ChannelSlots {
    /// How many instrument slots the player has.
    pub const SLOT_COUNT: usize = 8;

    /// `used_channels` must not contain the percussion channel and must fit
    /// in the remaining slots; extra channels get no slot.
    pub fn new(used_channels: &[MidiChannel]) -> Self {
        let mut slots = Vec::with_capacity(Self::SLOT_COUNT);
        slots.push(MidiChannel::PERCUSSION);
        slots.extend(
            used_channels
                .iter()
                .filter(|c| !c.is_percussion())
                .take(Self::SLOT_COUNT - 1),
        );
        Self(slots)
    }

    /// Channels in slot order.
    pub fn channels(&self) -> &[MidiChannel] {
        &self.0
    }

    #[allow(missing_docs)]
    pub fn slot_of(&self, channel: MidiChannel) -> Option<u8> {
        self.0
            .iter()
            .position(|c| *c == channel)
            .map(|slot| slot as u8)
    }

    #[allow(missing_docs)]
    pub fn channel_of(&self, slot: u8) -> Option<MidiChannel> {
        self.0.get(slot as usize).copied()
    }

    /// One value per slot, zero-padded to [Self::SLOT_COUNT].
    fn per_slot(&self, f: impl Fn(MidiChannel) -> u8) -> Vec<u8> {
        let mut values: Vec<u8> = self.0.iter().map(|c| f(*c)).collect();
        values.resize(Self::SLOT_COUNT, 0);
        values
    }
}

/// One note as the player stores it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompactNote {
    /// Player slot, not MIDI channel.
    pub instrument: u8,
    /// MIDI status byte: 0x90 on, 0x80 off.
    pub status: u8,
    #[allow(missing_docs)]
    pub key: u8,
    #[allow(missing_docs)]
    pub velocity: u8,
    #[allow(missing_docs)]
    pub color: u8,
    #[allow(missing_docs)]
    pub bar: u32,
    #[allow(missing_docs)]
    pub beat: u32,
    #[allow(missing_docs)]
    pub tick: u32,
    #[allow(missing_docs)]
    pub qbar: u32,
    #[allow(missing_docs)]
    pub qbeat: u32,
    #[allow(missing_docs)]
    pub qtick: u32,
}
impl CompactNote {
    fn new(event: &NoteEvent, instrument: u8) -> Self {
        let position = event.position();
        let quantized = event.quantized();
        Self {
            instrument,
            status: event.status().status_byte(),
            key: event.key(),
            velocity: event.velocity(),
            color: event.color(),
            bar: position.bar,
            beat: position.beat,
            tick: position.tick,
            qbar: quantized.bar,
            qbeat: quantized.beat,
            qtick: quantized.tick,
        }
    }
}

/// Song-wide values that don't come from the MIDI data.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ExportConstants {
    #[allow(missing_docs)]
    pub grid: GridConfig,
    #[allow(missing_docs)]
    pub time_bpm_multiplier: u32,
    /// Quantizer granularity, in divisions of a bar. 4 is sixteenths.
    pub quantizer: u32,
}
impl Default for ExportConstants {
    fn default() -> Self {
        Self {
            grid: GridConfig::default(),
            time_bpm_multiplier: 1,
            quantizer: 4,
        }
    }
}

/// The whole song, ready to serialize. Field order matches what the player's
/// loader expects.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompactSong {
    /// Program per slot.
    pub instruments: Vec<u8>,
    /// Volume per slot.
    pub volumes: Vec<u8>,
    #[allow(missing_docs)]
    pub beats_per_bar: u32,
    #[allow(missing_docs)]
    pub beat_type: u32,
    #[allow(missing_docs)]
    pub ticks_per_beat: u32,
    /// Tempo in BPM, rounded.
    pub ticks_beats_per_minute: u32,
    #[allow(missing_docs)]
    pub time_bpm_multiplier: u32,
    #[allow(missing_docs)]
    pub quantizer: u32,
    /// Always `notes.len()`.
    pub song_length: usize,
    #[allow(missing_docs)]
    pub notes: Vec<CompactNote>,
}
impl CompactSong {
    /// Builds the export from sorted events. Events on channels without a slot
    /// are left out.
    pub fn new(
        events: &[NoteEvent],
        slots: &ChannelSlots,
        table: &ChannelTable,
        tempo: Tempo,
        constants: &ExportConstants,
    ) -> Self {
        let notes: Vec<CompactNote> = events
            .iter()
            .filter_map(|e| {
                slots
                    .slot_of(e.channel())
                    .map(|slot| CompactNote::new(e, slot))
            })
            .collect();
        Self {
            instruments: slots.per_slot(|c| table.instrument(c)),
            volumes: slots.per_slot(|c| table.volume(c)),
            beats_per_bar: constants.grid.beats_per_bar(),
            beat_type: constants.grid.beat_type(),
            ticks_per_beat: constants.grid.ticks_per_beat(),
            ticks_beats_per_minute: tempo.bpm(),
            time_bpm_multiplier: constants.time_bpm_multiplier,
            quantizer: constants.quantizer,
            song_length: notes.len(),
            notes,
        }
    }

    /// JSON with four-space indentation, which is what the player's tools
    /// produce.
    pub fn to_json(&self) -> Result<String> {
        let mut buffer = Vec::default();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut buffer, formatter);
        self.serialize(&mut serializer)?;
        // serde_json only ever writes UTF-8.
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{event::NoteStatus, time::GridPosition};

    fn channel(value: u8) -> MidiChannel {
        MidiChannel::new(value).unwrap()
    }

    fn event(channel_value: u8, key: u8) -> NoteEvent {
        NoteEvent::new(
            channel(channel_value),
            NoteStatus::NoteOn,
            key,
            100,
            GridPosition {
                bar: 1,
                beat: 2,
                tick: 999,
            },
            NoteEvent::DEFAULT_COLOR,
        )
    }

    #[test]
    fn slots_round_trip() {
        let used = vec![channel(2), channel(5), channel(16)];
        let slots = ChannelSlots::new(&used);
        assert_eq!(
            slots.channels(),
            &[MidiChannel::PERCUSSION, channel(2), channel(5), channel(16)]
        );
        for (slot, c) in slots.channels().iter().enumerate() {
            assert_eq!(slots.slot_of(*c), Some(slot as u8));
            assert_eq!(slots.channel_of(slot as u8), Some(*c));
        }
        assert_eq!(slots.slot_of(channel(3)), None);
        assert_eq!(slots.channel_of(4), None);
    }

    #[test]
    fn slots_never_exceed_eight() {
        let used: Vec<MidiChannel> = MidiChannel::all().collect();
        let slots = ChannelSlots::new(&used);
        assert_eq!(slots.channels().len(), ChannelSlots::SLOT_COUNT);
        assert_eq!(
            slots
                .channels()
                .iter()
                .filter(|c| c.is_percussion())
                .count(),
            1,
            "percussion gets exactly one slot"
        );
    }

    #[test]
    fn export_pads_and_remaps() {
        let mut table = ChannelTable::default();
        table.set_instrument(channel(3), 24);
        table.set_volume(channel(3), 90);
        table.set_instrument(MidiChannel::PERCUSSION, 1);
        table.set_volume(MidiChannel::PERCUSSION, 127);
        let events = vec![event(3, 60), event(10, 36), event(4, 70)];
        let slots = ChannelSlots::new(&[channel(3)]);

        let song = CompactSong::new(
            &events,
            &slots,
            &table,
            Tempo::DEFAULT,
            &ExportConstants::default(),
        );
        assert_eq!(song.instruments, vec![1, 24, 0, 0, 0, 0, 0, 0]);
        assert_eq!(song.volumes, vec![127, 90, 0, 0, 0, 0, 0, 0]);
        assert_eq!(song.ticks_beats_per_minute, 120);
        assert_eq!(song.song_length, 2, "channel 4 has no slot");
        assert_eq!(song.notes[0].instrument, 1);
        assert_eq!(song.notes[1].instrument, 0);
        assert_eq!(
            song.notes[0],
            CompactNote {
                instrument: 1,
                status: 0x90,
                key: 60,
                velocity: 100,
                color: 0x2D,
                bar: 1,
                beat: 2,
                tick: 999,
                qbar: 1,
                qbeat: 2,
                qtick: 999,
            }
        );
    }

    #[test]
    fn json_layout() {
        let song = CompactSong::new(
            &[event(1, 60)],
            &ChannelSlots::new(&[channel(1)]),
            &ChannelTable::default(),
            Tempo::DEFAULT,
            &ExportConstants::default(),
        );
        let json = song.to_json().unwrap();
        assert!(json.starts_with("{\n    \"instruments\": ["), "{json}");
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["beats_per_bar"], 4);
        assert_eq!(value["beat_type"], 4);
        assert_eq!(value["ticks_per_beat"], 480);
        assert_eq!(value["time_bpm_multiplier"], 1);
        assert_eq!(value["quantizer"], 4);
        assert_eq!(value["song_length"], 1);
        assert_eq!(value["notes"][0]["status"], 144);
        assert_eq!(value["notes"][0]["qtick"], 999);

        let keys: Vec<&str> = value
            .as_object()
            .unwrap()
            .keys()
            .map(|k| k.as_str())
            .collect();
        assert!(keys.contains(&"ticks_beats_per_minute"));
    }
}
