// Copyright (c) 2024 Mike Tsao. All rights reserved.

#![warn(missing_docs)]

//! The `mid2song` crate turns MIDI files into compact songs that an
//! eight-channel sequencer player can load.
//!
//! A conversion reads a stream of timed messages, places every note on a
//! bar/beat/tick grid, squeezes the melodic channels down to the player's
//! budget, sorts the notes into playback order, and writes them out with
//! player slots in place of MIDI channels.

pub mod input {
    //! Where conversions get their messages.
    //!
    //! [SmfReader] reads Standard MIDI Files. Anything else that can produce
    //! [StreamMessage]s with per-message deltas in seconds works just as well.

    pub use mid2song_core::{
        smf::SmfReader,
        stream::{Song, SongBuilder, StreamEvent, StreamMessage},
    };

    /// The most commonly used imports.
    pub mod prelude {
        pub use super::{SmfReader, StreamEvent, StreamMessage};
    }
}

pub mod midi {
    //! MIDI channels, controllers, and General MIDI program names.

    pub use mid2song_core::midi::{u4, u7, GeneralMidiProgram, MidiChannel, MidiController};

    /// The most commonly used imports.
    pub mod prelude {
        pub use super::{GeneralMidiProgram, MidiChannel};
    }
}

pub mod time {
    //! Tempo and the quantization grid.

    pub use mid2song_core::time::{GridConfig, GridPosition, Tempo};

    /// The most commonly used imports.
    pub mod prelude {
        pub use super::{GridConfig, GridPosition, Tempo};
    }
}

pub mod reduction {
    //! Channel usage analysis and the merge-then-drop reducer.

    pub use mid2song_core::{
        channels::{ChannelTable, ChannelUsage},
        event::{NoteEvent, NoteStatus},
        reduce::{ChannelReducer, Reduction, ReductionStep},
        sort::sort_events,
    };

    /// The most commonly used imports.
    pub mod prelude {
        pub use super::{ChannelReducer, ReductionStep};
    }
}

pub mod conversion {
    //! The pipeline and its output.

    pub use mid2song_core::{
        convert::{Conversion, ConversionReport, ConversionWarning, Converter},
        error::{ConvertError, Result},
        export::{ChannelSlots, CompactNote, CompactSong, ExportConstants},
        settings::ConvertSettings,
    };

    /// The most commonly used imports.
    pub mod prelude {
        pub use super::{CompactSong, ConvertError, ConvertSettings, Converter};
    }
}

// https://stackoverflow.com/a/65972328/344467
/// A string that's useful for displaying build information to end users.
pub fn app_version() -> &'static str {
    option_env!("GIT_DESCRIBE")
        .unwrap_or(option_env!("GIT_REV_PARSE").unwrap_or(env!("CARGO_PKG_VERSION")))
}

/// A collection of imports that are useful to users of this crate. `use
/// mid2song::prelude::*;` for easier onboarding.
pub mod prelude {
    pub use super::{
        conversion::prelude::*, input::prelude::*, midi::prelude::*, reduction::prelude::*,
        time::prelude::*,
    };
}
