// Copyright (c) 2024 Mike Tsao. All rights reserved.

//! Knobs for a conversion run. Intended to be serialized.

use crate::{
    event::NoteEvent,
    export::ExportConstants,
    reduce::ChannelReducer,
    time::GridConfig,
};
use derivative::Derivative;
use serde::{Deserialize, Serialize};
use std::{fs::File, io::Read, path::Path};

/// Everything a conversion can be told. The defaults describe the stock
/// eight-channel player.
#[derive(Clone, Debug, Derivative, PartialEq, Eq, Serialize, Deserialize)]
#[derivative(Default)]
#[serde(rename_all = "kebab-case", default)]
pub struct ConvertSettings {
    /// Melodic channels the player can hold, besides percussion.
    #[derivative(Default(value = "ChannelReducer::DEFAULT_MAX_MELODIC_CHANNELS"))]
    pub max_melodic_channels: usize,

    /// Fold channels that share an instrument even when they'd all fit.
    pub always_merge_shared_instruments: bool,

    /// Tag carried on every note.
    #[derivative(Default(value = "NoteEvent::DEFAULT_COLOR"))]
    pub color: u8,

    /// Quantizer granularity written to the export (4 = sixteenths).
    #[derivative(Default(value = "4"))]
    pub quantizer: u32,

    #[allow(missing_docs)]
    #[derivative(Default(value = "1"))]
    pub time_bpm_multiplier: u32,

    /// Songs with more notes than this get a warning.
    #[derivative(Default(value = "10_000"))]
    pub song_length_limit: usize,

    /// Exports longer than this many characters get a warning.
    #[derivative(Default(value = "4_000_000"))]
    pub output_size_limit: usize,

    #[allow(missing_docs)]
    pub grid: GridConfig,
}
impl ConvertSettings {
    /// Reads settings from a JSON file. Missing fields take their defaults.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let mut contents = String::new();
        let mut file = File::open(path)
            .map_err(|e| anyhow::format_err!("Couldn't open {path:?}: {}", e))?;
        file.read_to_string(&mut contents)
            .map_err(|e| anyhow::format_err!("Couldn't read {path:?}: {}", e))?;
        serde_json::from_str(&contents)
            .map_err(|e| anyhow::format_err!("Couldn't parse {path:?}: {}", e))
    }

    /// The reducer these settings describe.
    pub fn reducer(&self) -> ChannelReducer {
        ChannelReducer::new(self.max_melodic_channels)
            .with_always_merge(self.always_merge_shared_instruments)
    }

    /// The song-wide export values these settings describe.
    pub fn export_constants(&self) -> ExportConstants {
        ExportConstants {
            grid: self.grid,
            time_bpm_multiplier: self.time_bpm_multiplier,
            quantizer: self.quantizer,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_describe_the_stock_player() {
        let s = ConvertSettings::default();
        assert_eq!(s.max_melodic_channels, 7);
        assert!(!s.always_merge_shared_instruments);
        assert_eq!(s.color, 0x2D);
        assert_eq!(s.quantizer, 4);
        assert_eq!(s.time_bpm_multiplier, 1);
        assert_eq!(s.song_length_limit, 10_000);
        assert_eq!(s.output_size_limit, 4_000_000);
        assert_eq!(s.grid, GridConfig::default());
    }

    #[test]
    fn partial_json_fills_in_defaults() {
        let s: ConvertSettings = serde_json::from_str(
            r#"{"max-melodic-channels": 3, "always-merge-shared-instruments": true}"#,
        )
        .unwrap();
        assert_eq!(s.max_melodic_channels, 3);
        assert!(s.always_merge_shared_instruments);
        assert_eq!(s.color, NoteEvent::DEFAULT_COLOR);
        assert_eq!(s.reducer().max_melodic_channels(), 3);
    }

    #[test]
    fn load_from_file() {
        let path = std::env::temp_dir().join(format!(
            "mid2song-settings-{}.json",
            std::process::id()
        ));
        {
            let mut f = File::create(&path).unwrap();
            f.write_all(br#"{"quantizer": 8, "grid": {"ticks-per-beat": 96}}"#)
                .unwrap();
        }
        let s = ConvertSettings::load(&path).unwrap();
        let _ = std::fs::remove_file(&path);
        assert_eq!(s.quantizer, 8);
        assert_eq!(s.export_constants().grid.ticks_per_beat(), 96);

        assert!(ConvertSettings::load(Path::new("/nonexistent/mid2song.json")).is_err());
    }
}
