// Copyright (c) 2024 Mike Tsao. All rights reserved.

use crate::error::{ConvertError, Result};
use derivative::Derivative;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Tempo as MIDI files carry it: microseconds per beat (quarter note).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct Tempo(u32);
impl Default for Tempo {
    fn default() -> Self {
        Self::DEFAULT
    }
}
impl fmt::Display for Tempo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} BPM ({} us/beat)", self.bpm(), self.0)
    }
}
impl TryFrom<u32> for Tempo {
    type Error = ConvertError;

    fn try_from(value: u32) -> Result<Self> {
        Self::new(value)
    }
}
impl From<Tempo> for u32 {
    fn from(value: Tempo) -> Self {
        value.0
    }
}
impl Tempo {
    /// 120 BPM, which is what a MIDI file means when it doesn't say.
    pub const DEFAULT: Self = Self(500_000);

    const MICROS_PER_MINUTE: u64 = 60_000_000;

    /// Fails for zero, which would make every beat instantaneous.
    pub fn new(micros_per_beat: u32) -> Result<Self> {
        if micros_per_beat == 0 {
            Err(ConvertError::InvalidTempo(micros_per_beat))
        } else {
            Ok(Self(micros_per_beat))
        }
    }

    #[allow(missing_docs)]
    pub const fn micros_per_beat(&self) -> u32 {
        self.0
    }

    /// Beats per minute, rounded to the nearest integer.
    pub fn bpm(&self) -> u32 {
        let micros = self.0 as u64;
        ((Self::MICROS_PER_MINUTE + micros / 2) / micros) as u32
    }
}

/// Bar/beat/tick coordinates on the quantization grid. `tick` counts from the
/// start of the bar, so it runs up to `beats_per_bar * ticks_per_beat`, and
/// `beat` is the same information at coarser resolution.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct GridPosition {
    #[allow(missing_docs)]
    pub bar: u32,
    #[allow(missing_docs)]
    pub beat: u32,
    #[allow(missing_docs)]
    pub tick: u32,
}
impl fmt::Display for GridPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.bar, self.beat, self.tick)
    }
}
impl GridPosition {
    /// Where a tick falls inside its beat.
    pub fn tick_in_beat(&self, grid: &GridConfig) -> u32 {
        self.tick % grid.ticks_per_beat.max(1)
    }
}

/// The meter and resolution of the output grid. The player understands only
/// 4/4 at 480 PPQN, so that's the default, but nothing else in the crate
/// hardcodes those numbers.
#[derive(Clone, Copy, Debug, Derivative, PartialEq, Eq, Serialize, Deserialize)]
#[derivative(Default)]
#[serde(rename_all = "kebab-case", default)]
pub struct GridConfig {
    #[derivative(Default(value = "4"))]
    beats_per_bar: u32,
    #[derivative(Default(value = "4"))]
    beat_type: u32,
    #[derivative(Default(value = "480"))]
    ticks_per_beat: u32,
}
impl GridConfig {
    /// Builds a grid. Zero beats per bar or zero ticks per beat make no sense
    /// and are bumped to one.
    pub fn new(beats_per_bar: u32, beat_type: u32, ticks_per_beat: u32) -> Self {
        Self {
            beats_per_bar: beats_per_bar.max(1),
            beat_type,
            ticks_per_beat: ticks_per_beat.max(1),
        }
    }

    #[allow(missing_docs)]
    pub fn beats_per_bar(&self) -> u32 {
        self.beats_per_bar
    }

    #[allow(missing_docs)]
    pub fn beat_type(&self) -> u32 {
        self.beat_type
    }

    #[allow(missing_docs)]
    pub fn ticks_per_beat(&self) -> u32 {
        self.ticks_per_beat
    }

    /// How many ticks make up one bar, saturating at `u32::MAX`.
    pub fn ticks_per_bar(&self) -> u32 {
        self.beats_per_bar.saturating_mul(self.ticks_per_beat)
    }

    /// Places an absolute time on the grid. Every division truncates.
    pub fn quantize(&self, elapsed_micros: u64, tempo: Tempo) -> GridPosition {
        let elapsed = elapsed_micros as u128;
        let micros_per_beat = tempo.micros_per_beat() as u128;
        let beats_per_bar = self.beats_per_bar.max(1) as u128;

        let beats = elapsed / micros_per_beat;
        let in_bar = elapsed % (micros_per_beat * beats_per_bar);
        let tick = in_bar * self.ticks_per_beat as u128 / micros_per_beat;

        GridPosition {
            bar: u32::try_from(beats / beats_per_bar).unwrap_or(u32::MAX),
            beat: (beats % beats_per_bar) as u32,
            tick: tick as u32,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use more_asserts::{assert_ge, assert_lt};

    #[test]
    fn tempo_rejects_zero() {
        assert!(matches!(Tempo::new(0), Err(ConvertError::InvalidTempo(0))));
        assert_eq!(Tempo::new(500_000).unwrap(), Tempo::DEFAULT);
    }

    #[test]
    fn tempo_bpm_rounds() {
        assert_eq!(Tempo::DEFAULT.bpm(), 120);
        assert_eq!(Tempo::new(1_000_000).unwrap().bpm(), 60);
        // 60_000_000 / 461_538 = 130.0001
        assert_eq!(Tempo::new(461_538).unwrap().bpm(), 130);
        // 60_000_000 / 631_579 = 94.99, which truncation would get wrong
        assert_eq!(Tempo::new(631_579).unwrap().bpm(), 95);
    }

    #[test]
    fn quantize_mainline() {
        let grid = GridConfig::default();
        let tempo = Tempo::DEFAULT;

        assert_eq!(grid.quantize(0, tempo), GridPosition::default());
        assert_eq!(
            grid.quantize(500_000, tempo),
            GridPosition {
                bar: 0,
                beat: 1,
                tick: 480
            },
            "one beat in should be tick 480 of bar 0"
        );
        assert_eq!(
            grid.quantize(750_000, tempo),
            GridPosition {
                bar: 0,
                beat: 1,
                tick: 720
            }
        );
        assert_eq!(
            grid.quantize(2_000_000, tempo),
            GridPosition {
                bar: 1,
                beat: 0,
                tick: 0
            },
            "four beats in should start bar 1"
        );
        assert_eq!(
            grid.quantize(3_999_999, tempo),
            GridPosition {
                bar: 1,
                beat: 3,
                tick: 1919
            },
            "truncation should keep the last tick of a bar below the next bar"
        );
    }

    #[test]
    fn quantize_truncates() {
        let grid = GridConfig::default();
        // 1041.67 us per tick at 120 BPM
        let tempo = Tempo::DEFAULT;
        assert_eq!(grid.quantize(1_041, tempo).tick, 0);
        assert_eq!(grid.quantize(1_042, tempo).tick, 1);
    }

    #[test]
    fn quantize_stays_on_grid_and_never_regresses() {
        let grid = GridConfig::default();
        for micros_per_beat in [1, 7, 333_333, 500_000, 600_001, 16_777_215] {
            let tempo = Tempo::new(micros_per_beat).unwrap();
            let mut previous = GridPosition::default();
            let step = (micros_per_beat as u64 / 97).max(1);
            for i in 0..2_000u64 {
                let position = grid.quantize(i * step, tempo);
                assert_lt!(position.beat, grid.beats_per_bar());
                assert_lt!(position.tick, grid.ticks_per_bar());
                assert_lt!(position.tick_in_beat(&grid), grid.ticks_per_beat());
                assert_eq!(
                    position.beat,
                    position.tick / grid.ticks_per_beat(),
                    "beat should be derivable from the bar-relative tick"
                );
                assert_ge!(
                    (position.bar, position.tick),
                    (previous.bar, previous.tick),
                    "position should never move backward"
                );
                previous = position;
            }
        }
    }

    #[test]
    fn quantize_survives_huge_times() {
        let grid = GridConfig::default();
        let position = grid.quantize(u64::MAX / 2, Tempo::new(u32::MAX).unwrap());
        assert_lt!(position.tick, grid.ticks_per_bar());
    }

    #[test]
    fn huge_grid_does_not_overflow() {
        let grid: GridConfig =
            serde_json::from_str(r#"{"beats-per-bar": 4000000000, "ticks-per-beat": 4000000000}"#)
                .unwrap();
        assert_eq!(grid.ticks_per_bar(), u32::MAX);
        let position = grid.quantize(1_000_000, Tempo::DEFAULT);
        assert_eq!(position.bar, 0);
    }

    #[test]
    fn grid_config_serde_defaults() {
        let grid: GridConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(grid, GridConfig::default());
        let grid: GridConfig = serde_json::from_str(r#"{"ticks-per-beat": 96}"#).unwrap();
        assert_eq!(grid.ticks_per_beat(), 96);
        assert_eq!(grid.beats_per_bar(), 4);
    }
}
