// Copyright (c) 2024 Mike Tsao. All rights reserved.

use crate::event::NoteEvent;

/// Puts events in playback order: by bar, then tick, then note-ons before
/// note-offs. The sort is stable, so events that tie keep the order they
/// arrived in.
///
/// `beat` isn't part of the key. Ticks count from the start of the bar, so
/// two events in the same bar with different beats always have different
/// ticks.
pub fn sort_events(events: &mut [NoteEvent]) {
    events.sort_by_key(|e| {
        let position = e.quantized();
        (position.bar, position.tick, e.status().rank())
    });
}
