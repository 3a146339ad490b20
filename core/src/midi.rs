// Copyright (c) 2024 Mike Tsao. All rights reserved.

use crate::error::{ConvertError, Result};
use derive_more::Display as DeriveDisplay;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumCount, FromRepr};

pub use midly::num::{u4, u7};

/// Recommended imports for easy onboarding.
pub mod prelude {
    pub use super::{GeneralMidiProgram, MidiChannel, MidiController};
}

/// A MIDI channel, numbered the way musicians number them: 1 through 16.
/// Channel 10 carries percussion in General MIDI.
#[derive(
    Clone,
    Copy,
    Debug,
    DeriveDisplay,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
)]
#[serde(try_from = "u8", into = "u8")]
pub struct MidiChannel(u8);
#[allow(missing_docs)]
impl MidiChannel {
    pub const MIN_VALUE: u8 = 1;
    pub const MAX_VALUE: u8 = 16; // inclusive
    pub const COUNT: usize = 16;
    pub const PERCUSSION_VALUE: u8 = 10;
    pub const PERCUSSION: Self = Self(Self::PERCUSSION_VALUE);

    /// Validates a 1-based channel number.
    pub fn new(value: u8) -> Result<Self> {
        if (Self::MIN_VALUE..=Self::MAX_VALUE).contains(&value) {
            Ok(Self(value))
        } else {
            Err(ConvertError::ChannelOutOfRange(value))
        }
    }

    pub const fn value(&self) -> u8 {
        self.0
    }

    pub const fn is_percussion(&self) -> bool {
        self.0 == Self::PERCUSSION_VALUE
    }

    /// All sixteen channels, lowest first.
    pub fn all() -> impl Iterator<Item = Self> {
        (Self::MIN_VALUE..=Self::MAX_VALUE).map(Self)
    }

    /// Zero-based position, for per-channel tables.
    pub(crate) const fn index(&self) -> usize {
        (self.0 - Self::MIN_VALUE) as usize
    }
}
/// midly numbers channels 0..=15 on the wire.
impl From<u4> for MidiChannel {
    fn from(value: u4) -> Self {
        Self(value.as_int() + Self::MIN_VALUE)
    }
}
impl TryFrom<u8> for MidiChannel {
    type Error = ConvertError;

    fn try_from(value: u8) -> Result<Self> {
        Self::new(value)
    }
}
impl From<MidiChannel> for u8 {
    fn from(value: MidiChannel) -> Self {
        value.0
    }
}

/// Controller numbers that mean something to the converter.
#[derive(Debug)]
pub struct MidiController;
#[allow(missing_docs)]
impl MidiController {
    pub const BANK_SELECT_MSB: u8 = 0;
    pub const VOLUME: u8 = 7;
    pub const BANK_SELECT_LSB: u8 = 32;
    pub const MAX_VALUE: u8 = 127;
}

/// The General MIDI instruments, named as the standard names them.
/// <https://en.wikipedia.org/wiki/General_MIDI>
#[allow(missing_docs)]
#[derive(Clone, Copy, Debug, Display, EnumCount, FromRepr, PartialEq, Eq)]
#[repr(u8)]
pub enum GeneralMidiProgram {
    #[strum(serialize = "Acoustic Grand Piano")]
    AcousticGrand = 0,
    #[strum(serialize = "Bright Acoustic Piano")]
    BrightAcoustic,
    #[strum(serialize = "Electric Grand Piano")]
    ElectricGrand,
    #[strum(serialize = "Honky-tonk Piano")]
    HonkyTonk,
    #[strum(serialize = "Electric Piano 1")]
    ElectricPiano1,
    #[strum(serialize = "Electric Piano 2")]
    ElectricPiano2,
    Harpsichord,
    Clavinet,
    Celesta,
    Glockenspiel,
    #[strum(serialize = "Music Box")]
    MusicBox,
    Vibraphone,
    Marimba,
    Xylophone,
    #[strum(serialize = "Tubular Bells")]
    TubularBells,
    Dulcimer,
    #[strum(serialize = "Drawbar Organ")]
    DrawbarOrgan,
    #[strum(serialize = "Percussive Organ")]
    PercussiveOrgan,
    #[strum(serialize = "Rock Organ")]
    RockOrgan,
    #[strum(serialize = "Church Organ")]
    ChurchOrgan,
    #[strum(serialize = "Reed Organ")]
    ReedOrgan,
    Accordion,
    Harmonica,
    #[strum(serialize = "Tango Accordion")]
    TangoAccordion,
    #[strum(serialize = "Acoustic Guitar (nylon)")]
    AcousticGuitarNylon,
    #[strum(serialize = "Acoustic Guitar (steel)")]
    AcousticGuitarSteel,
    #[strum(serialize = "Electric Guitar (jazz)")]
    ElectricGuitarJazz,
    #[strum(serialize = "Electric Guitar (clean)")]
    ElectricGuitarClean,
    #[strum(serialize = "Electric Guitar (muted)")]
    ElectricGuitarMuted,
    #[strum(serialize = "Overdriven Guitar")]
    OverdrivenGuitar,
    #[strum(serialize = "Distortion Guitar")]
    DistortionGuitar,
    #[strum(serialize = "Guitar Harmonics")]
    GuitarHarmonics,
    #[strum(serialize = "Acoustic Bass")]
    AcousticBass,
    #[strum(serialize = "Electric Bass (finger)")]
    ElectricBassFinger,
    #[strum(serialize = "Electric Bass (pick)")]
    ElectricBassPick,
    #[strum(serialize = "Fretless Bass")]
    FretlessBass,
    #[strum(serialize = "Slap Bass 1")]
    SlapBass1,
    #[strum(serialize = "Slap Bass 2")]
    SlapBass2,
    #[strum(serialize = "Synth Bass 1")]
    SynthBass1,
    #[strum(serialize = "Synth Bass 2")]
    SynthBass2,
    Violin,
    Viola,
    Cello,
    Contrabass,
    #[strum(serialize = "Tremolo Strings")]
    TremoloStrings,
    #[strum(serialize = "Pizzicato Strings")]
    PizzicatoStrings,
    #[strum(serialize = "Orchestral Harp")]
    OrchestralHarp,
    Timpani,
    #[strum(serialize = "String Ensemble 1")]
    StringEnsemble1,
    #[strum(serialize = "String Ensemble 2")]
    StringEnsemble2,
    #[strum(serialize = "SynthStrings 1")]
    Synthstrings1,
    #[strum(serialize = "SynthStrings 2")]
    Synthstrings2,
    #[strum(serialize = "Choir Aahs")]
    ChoirAahs,
    #[strum(serialize = "Voice Oohs")]
    VoiceOohs,
    #[strum(serialize = "Synth Voice")]
    SynthVoice,
    #[strum(serialize = "Orchestra Hit")]
    OrchestraHit,
    Trumpet,
    Trombone,
    Tuba,
    #[strum(serialize = "Muted Trumpet")]
    MutedTrumpet,
    #[strum(serialize = "French Horn")]
    FrenchHorn,
    #[strum(serialize = "Brass Section")]
    BrassSection,
    #[strum(serialize = "SynthBrass 1")]
    Synthbrass1,
    #[strum(serialize = "SynthBrass 2")]
    Synthbrass2,
    #[strum(serialize = "Soprano Sax")]
    SopranoSax,
    #[strum(serialize = "Alto Sax")]
    AltoSax,
    #[strum(serialize = "Tenor Sax")]
    TenorSax,
    #[strum(serialize = "Baritone Sax")]
    BaritoneSax,
    Oboe,
    #[strum(serialize = "English Horn")]
    EnglishHorn,
    Bassoon,
    Clarinet,
    Piccolo,
    Flute,
    Recorder,
    #[strum(serialize = "Pan Flute")]
    PanFlute,
    #[strum(serialize = "Blown Bottle")]
    BlownBottle,
    Shakuhachi,
    Whistle,
    Ocarina,
    #[strum(serialize = "Lead 1 (square)")]
    Lead1Square,
    #[strum(serialize = "Lead 2 (sawtooth)")]
    Lead2Sawtooth,
    #[strum(serialize = "Lead 3 (calliope)")]
    Lead3Calliope,
    #[strum(serialize = "Lead 4 (chiff)")]
    Lead4Chiff,
    #[strum(serialize = "Lead 5 (charang)")]
    Lead5Charang,
    #[strum(serialize = "Lead 6 (voice)")]
    Lead6Voice,
    #[strum(serialize = "Lead 7 (fifths)")]
    Lead7Fifths,
    #[strum(serialize = "Lead 8 (bass + lead)")]
    Lead8BassLead,
    #[strum(serialize = "Pad 1 (new age)")]
    Pad1NewAge,
    #[strum(serialize = "Pad 2 (warm)")]
    Pad2Warm,
    #[strum(serialize = "Pad 3 (polysynth)")]
    Pad3Polysynth,
    #[strum(serialize = "Pad 4 (choir)")]
    Pad4Choir,
    #[strum(serialize = "Pad 5 (bowed)")]
    Pad5Bowed,
    #[strum(serialize = "Pad 6 (metallic)")]
    Pad6Metallic,
    #[strum(serialize = "Pad 7 (halo)")]
    Pad7Halo,
    #[strum(serialize = "Pad 8 (sweep)")]
    Pad8Sweep,
    #[strum(serialize = "FX 1 (rain)")]
    Fx1Rain,
    #[strum(serialize = "FX 2 (soundtrack)")]
    Fx2Soundtrack,
    #[strum(serialize = "FX 3 (crystal)")]
    Fx3Crystal,
    #[strum(serialize = "FX 4 (atmosphere)")]
    Fx4Atmosphere,
    #[strum(serialize = "FX 5 (brightness)")]
    Fx5Brightness,
    #[strum(serialize = "FX 6 (goblins)")]
    Fx6Goblins,
    #[strum(serialize = "FX 7 (echoes)")]
    Fx7Echoes,
    #[strum(serialize = "FX 8 (sci-fi)")]
    Fx8SciFi,
    Sitar,
    Banjo,
    Shamisen,
    Koto,
    Kalimba,
    Bagpipe,
    Fiddle,
    Shanai,
    #[strum(serialize = "Tinkle Bell")]
    TinkleBell,
    Agogo,
    #[strum(serialize = "Steel Drums")]
    SteelDrums,
    Woodblock,
    #[strum(serialize = "Taiko Drum")]
    TaikoDrum,
    #[strum(serialize = "Melodic Tom")]
    MelodicTom,
    #[strum(serialize = "Synth Drum")]
    SynthDrum,
    #[strum(serialize = "Reverse Cymbal")]
    ReverseCymbal,
    #[strum(serialize = "Guitar Fret Noise")]
    GuitarFretNoise,
    #[strum(serialize = "Breath Noise")]
    BreathNoise,
    Seashore,
    #[strum(serialize = "Bird Tweet")]
    BirdTweet,
    #[strum(serialize = "Telephone Ring")]
    TelephoneRing,
    Helicopter,
    Applause,
    Gunshot = 127,
}
impl GeneralMidiProgram {
    /// A human-readable name for a program number, for diagnostics.
    pub fn name_of(program: u8) -> String {
        Self::from_repr(program)
            .map(|p| p.to_string())
            .unwrap_or_else(|| format!("Program {program}"))
    }
}
