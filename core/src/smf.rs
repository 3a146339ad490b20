// Copyright (c) 2024 Mike Tsao. All rights reserved.

//! Turns a Standard MIDI File into the message stream that [SongBuilder]
//! consumes.
//!
//! [SongBuilder]: crate::stream::SongBuilder

use crate::{
    error::{ConvertError, Result},
    midi::MidiChannel,
    stream::{StreamEvent, StreamMessage},
    time::Tempo,
};
use midly::{Format, MetaMessage, MidiMessage, Smf, Timing, TrackEventKind};
use std::path::Path;

/// Reads SMF data with [midly].
#[derive(Debug)]
pub struct SmfReader;
impl SmfReader {
    /// Reads and parses a file from disk.
    pub fn read_file(path: &Path) -> Result<Vec<StreamMessage>> {
        let data = std::fs::read(path)?;
        Self::read(&data)
    }

    /// Merges all tracks into one time-ordered stream. Deltas are in seconds
    /// and follow every tempo change in the file, even though only the first
    /// one will matter for quantization.
    pub fn read(data: &[u8]) -> Result<Vec<StreamMessage>> {
        let smf = Smf::parse(data)?;
        let mut clock = TickClock::new(smf.header.timing)?;

        // (absolute tick, event), ordered by tick. Ties keep track order.
        let mut merged: Vec<(u64, TrackEventKind)> = Vec::default();
        let mut track_offset = 0u64;
        for track in smf.tracks.iter() {
            let mut tick = track_offset;
            for event in track.iter() {
                tick += event.delta.as_int() as u64;
                merged.push((tick, event.kind));
            }
            if smf.header.format == Format::Sequential {
                // Type 2 files play their tracks one after another.
                track_offset = tick;
            }
        }
        merged.sort_by_key(|(tick, _)| *tick);

        let mut previous_tick = 0u64;
        let mut messages = Vec::with_capacity(merged.len());
        for (tick, kind) in merged {
            let delta_seconds = clock.seconds(tick - previous_tick);
            previous_tick = tick;

            let event = Self::stream_event(&kind);
            if let StreamEvent::SetTempo { micros_per_beat } = event {
                // A zero tempo is rejected later, when the song is built.
                if let Ok(tempo) = Tempo::new(micros_per_beat) {
                    clock.set_tempo(tempo);
                }
            }
            messages.push(StreamMessage::new(delta_seconds, event));
        }
        log::debug!("read {} messages from MIDI data", messages.len());
        Ok(messages)
    }

    fn stream_event(kind: &TrackEventKind) -> StreamEvent {
        match *kind {
            TrackEventKind::Midi { channel, message } => {
                let channel = MidiChannel::from(channel).value();
                match message {
                    MidiMessage::NoteOn { key, vel } => StreamEvent::NoteOn {
                        channel,
                        key: key.as_int(),
                        velocity: vel.as_int(),
                    },
                    MidiMessage::NoteOff { key, vel } => StreamEvent::NoteOff {
                        channel,
                        key: key.as_int(),
                        velocity: vel.as_int(),
                    },
                    MidiMessage::ProgramChange { program } => StreamEvent::ProgramChange {
                        channel,
                        program: program.as_int(),
                    },
                    MidiMessage::Controller { controller, value } => {
                        StreamEvent::ControlChange {
                            channel,
                            controller: controller.as_int(),
                            value: value.as_int(),
                        }
                    }
                    _ => StreamEvent::Other,
                }
            }
            TrackEventKind::Meta(MetaMessage::Tempo(tempo)) => StreamEvent::SetTempo {
                micros_per_beat: tempo.as_int(),
            },
            TrackEventKind::Meta(MetaMessage::TimeSignature(numerator, denominator_exp, _, _)) => {
                StreamEvent::TimeSignature {
                    numerator,
                    denominator: 1u32.checked_shl(denominator_exp as u32).unwrap_or(0),
                }
            }
            _ => StreamEvent::Other,
        }
    }
}

/// Converts tick deltas to seconds.
#[derive(Debug)]
enum TickClock {
    Metrical {
        ticks_per_beat: f64,
        micros_per_beat: f64,
    },
    Timecode {
        seconds_per_tick: f64,
    },
}
impl TickClock {
    fn new(timing: Timing) -> Result<Self> {
        match timing {
            Timing::Metrical(ticks_per_beat) if ticks_per_beat.as_int() > 0 => {
                Ok(Self::Metrical {
                    ticks_per_beat: ticks_per_beat.as_int() as f64,
                    micros_per_beat: Tempo::DEFAULT.micros_per_beat() as f64,
                })
            }
            Timing::Metrical(_) => Err(ConvertError::UnsupportedTiming(
                "zero ticks per beat".to_string(),
            )),
            Timing::Timecode(fps, subframes) if subframes > 0 => Ok(Self::Timecode {
                seconds_per_tick: 1.0 / (fps.as_f32() as f64 * subframes as f64),
            }),
            Timing::Timecode(fps, subframes) => Err(ConvertError::UnsupportedTiming(format!(
                "{} fps with {subframes} subframes",
                fps.as_f32()
            ))),
        }
    }

    fn set_tempo(&mut self, tempo: Tempo) {
        if let Self::Metrical {
            micros_per_beat, ..
        } = self
        {
            *micros_per_beat = tempo.micros_per_beat() as f64;
        }
    }

    fn seconds(&self, ticks: u64) -> f64 {
        match self {
            Self::Metrical {
                ticks_per_beat,
                micros_per_beat,
            } => ticks as f64 * micros_per_beat / 1_000_000.0 / ticks_per_beat,
            Self::Timecode { seconds_per_tick } => ticks as f64 * seconds_per_tick,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use midly::{
        num::{u15, u24, u28, u4, u7},
        Header, TrackEvent,
    };

    fn write(smf: &Smf) -> Vec<u8> {
        let mut bytes = Vec::default();
        smf.write_std(&mut bytes).unwrap();
        bytes
    }

    fn midi(delta: u32, channel: u8, message: MidiMessage) -> TrackEvent<'static> {
        TrackEvent {
            delta: u28::new(delta),
            kind: TrackEventKind::Midi {
                channel: u4::new(channel),
                message,
            },
        }
    }

    fn meta(delta: u32, message: MetaMessage<'static>) -> TrackEvent<'static> {
        TrackEvent {
            delta: u28::new(delta),
            kind: TrackEventKind::Meta(message),
        }
    }

    #[test]
    fn merges_tracks_and_converts_time() {
        let mut smf = Smf::new(Header::new(Format::Parallel, Timing::Metrical(u15::new(96))));
        smf.tracks.push(vec![
            meta(0, MetaMessage::Tempo(u24::new(1_000_000))),
            meta(0, MetaMessage::TimeSignature(3, 3, 24, 8)),
            meta(0, MetaMessage::EndOfTrack),
        ]);
        smf.tracks.push(vec![
            midi(
                0,
                9,
                MidiMessage::NoteOn {
                    key: u7::new(36),
                    vel: u7::new(100),
                },
            ),
            midi(
                96,
                9,
                MidiMessage::NoteOff {
                    key: u7::new(36),
                    vel: u7::new(0),
                },
            ),
            meta(0, MetaMessage::EndOfTrack),
        ]);
        smf.tracks.push(vec![
            midi(
                48,
                0,
                MidiMessage::ProgramChange {
                    program: u7::new(40),
                },
            ),
            midi(
                0,
                0,
                MidiMessage::Controller {
                    controller: u7::new(7),
                    value: u7::new(80),
                },
            ),
            meta(0, MetaMessage::EndOfTrack),
        ]);

        let messages = SmfReader::read(&write(&smf)).unwrap();
        let events: Vec<StreamEvent> = messages.iter().map(|m| m.event).collect();
        assert_eq!(events[0], StreamEvent::SetTempo { micros_per_beat: 1_000_000 });
        assert_eq!(
            events[1],
            StreamEvent::TimeSignature {
                numerator: 3,
                denominator: 8
            }
        );
        assert!(events.contains(&StreamEvent::NoteOn {
            channel: 10,
            key: 36,
            velocity: 100
        }));
        assert!(events.contains(&StreamEvent::ProgramChange {
            channel: 1,
            program: 40
        }));
        assert!(events.contains(&StreamEvent::ControlChange {
            channel: 1,
            controller: 7,
            value: 80
        }));

        let total: f64 = messages.iter().map(|m| m.delta_seconds).sum();
        assert!(
            (total - 1.0).abs() < 1e-9,
            "96 ticks at 96 PPQN and 60 BPM should last one second, got {total}"
        );

        let mut program_at = 0.0;
        for m in &messages {
            program_at += m.delta_seconds;
            if matches!(m.event, StreamEvent::ProgramChange { .. }) {
                break;
            }
        }
        assert!((program_at - 0.5).abs() < 1e-9, "got {program_at}");
    }

    #[test]
    fn sequential_tracks_follow_each_other() {
        let mut smf = Smf::new(Header::new(
            Format::Sequential,
            Timing::Metrical(u15::new(480)),
        ));
        for _ in 0..2 {
            smf.tracks.push(vec![
                midi(
                    480,
                    0,
                    MidiMessage::NoteOn {
                        key: u7::new(60),
                        vel: u7::new(1),
                    },
                ),
                meta(0, MetaMessage::EndOfTrack),
            ]);
        }
        let messages = SmfReader::read(&write(&smf)).unwrap();
        let total: f64 = messages.iter().map(|m| m.delta_seconds).sum();
        assert!((total - 1.0).abs() < 1e-9, "two beats at 120 BPM, got {total}");
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(matches!(
            SmfReader::read(b"definitely not a MIDI file"),
            Err(ConvertError::Smf(_))
        ));
        assert!(matches!(
            SmfReader::read_file(Path::new("/nonexistent/song.mid")),
            Err(ConvertError::Io(_))
        ));
    }
}
