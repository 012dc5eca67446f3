// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Note table for the demo keyboard.
//!
//! Maps the key labels the UI surface reports (e.g. "C4") to their
//! equal-tempered frequencies in Hz, covering the thirteen keys of the
//! on-screen C4..C5 keyboard.

/// A key on the demo keyboard
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Key {
    /// Key label, e.g. "C#4"
    pub label: &'static str,
    /// Equal-tempered frequency in Hz (A4 = 440)
    pub frequency: f64,
}

/// The thirteen keys of the C4..C5 keyboard
pub const KEYBOARD: [Key; 13] = [
    Key { label: "C4", frequency: 261.63 },
    Key { label: "C#4", frequency: 277.18 },
    Key { label: "D4", frequency: 293.66 },
    Key { label: "D#4", frequency: 311.13 },
    Key { label: "E4", frequency: 329.63 },
    Key { label: "F4", frequency: 349.23 },
    Key { label: "F#4", frequency: 369.99 },
    Key { label: "G4", frequency: 392.00 },
    Key { label: "G#4", frequency: 415.30 },
    Key { label: "A4", frequency: 440.00 },
    Key { label: "A#4", frequency: 466.16 },
    Key { label: "B4", frequency: 493.88 },
    Key { label: "C5", frequency: 523.25 },
];

/// Look up the frequency for a key label
pub fn frequency_of(label: &str) -> Option<f64> {
    KEYBOARD
        .iter()
        .find(|key| key.label == label)
        .map(|key| key.frequency)
}
