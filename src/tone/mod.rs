// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Tone engine for sounding recorded notes.
//!
//! The recorder core only triggers abstract "start pitch" / "stop pitch"
//! commands; this module provides the [`ToneEngine`] trait for that seam,
//! a cpal-backed engine with basic waveform synthesis, and a silent engine
//! for headless use.
//!
//! The engine is deliberately monophonic, matching the observed behavior of
//! the teaching page: a single voice, where a later note-on replaces the
//! note currently sounding.

pub mod output;

pub use output::{OutputConfig, OutputStream};

use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Oscillator waveform shapes offered by the teaching page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Waveform {
    Sine,
    Square,
    Sawtooth,
    Triangle,
}

impl Default for Waveform {
    fn default() -> Self {
        Waveform::Sine
    }
}

impl Waveform {
    /// Sample the waveform at a phase in [0, 1)
    pub fn sample(self, phase: f64) -> f64 {
        match self {
            Waveform::Sine => (phase * std::f64::consts::TAU).sin(),
            Waveform::Square => {
                if phase < 0.5 {
                    1.0
                } else {
                    -1.0
                }
            }
            Waveform::Sawtooth => 2.0 * phase - 1.0,
            Waveform::Triangle => {
                if phase < 0.5 {
                    4.0 * phase - 1.0
                } else {
                    3.0 - 4.0 * phase
                }
            }
        }
    }
}

/// Tone engine errors
#[derive(Debug, Error)]
pub enum ToneError {
    /// No audio device available
    #[error("no audio device available")]
    NoDevice,
    /// Failed to query or configure the output device
    #[error("audio initialization failed: {0}")]
    InitFailed(String),
    /// Failed to build or start the output stream
    #[error("audio stream failed: {0}")]
    StreamFailed(String),
}

/// Abstract note commands triggered by the recorder core.
///
/// Contract: monophonic. `note_on` replaces whatever is currently sounding;
/// `note_off` releases only if the label matches the sounding note, so a
/// stale note-off cannot cut a newer note.
pub trait ToneEngine {
    /// Start sounding a pitch
    fn note_on(&mut self, note: &str, frequency: f64);

    /// Stop sounding the named pitch
    fn note_off(&mut self, note: &str);

    /// Silence everything immediately
    fn all_notes_off(&mut self);
}

impl<T: ToneEngine + ?Sized> ToneEngine for Box<T> {
    fn note_on(&mut self, note: &str, frequency: f64) {
        (**self).note_on(note, frequency);
    }

    fn note_off(&mut self, note: &str) {
        (**self).note_off(note);
    }

    fn all_notes_off(&mut self) {
        (**self).all_notes_off();
    }
}

/// Engine that discards all note commands
#[derive(Debug, Default)]
pub struct SilentToneEngine;

impl ToneEngine for SilentToneEngine {
    fn note_on(&mut self, _note: &str, _frequency: f64) {}

    fn note_off(&mut self, _note: &str) {}

    fn all_notes_off(&mut self) {}
}

/// The single synthesis voice shared with the audio callback
#[derive(Debug)]
struct Voice {
    frequency: f64,
    waveform: Waveform,
    phase: f64,
    /// Gain the ramp is heading toward (target gain or 0.0)
    target_gain: f32,
    /// Ramped gain applied to the signal, avoids clicks on note edges
    current_gain: f32,
}

impl Voice {
    fn new(waveform: Waveform) -> Self {
        Self {
            frequency: 440.0,
            waveform,
            phase: 0.0,
            target_gain: 0.0,
            current_gain: 0.0,
        }
    }

    /// Fill an interleaved output buffer
    fn render(&mut self, buffer: &mut [f32], channels: usize, sample_rate: f64) {
        // ~5ms attack/release ramp
        let ramp_step = (1.0 / (sample_rate * 0.005)) as f32;
        let phase_inc = self.frequency / sample_rate;

        for frame in buffer.chunks_mut(channels) {
            if self.current_gain < self.target_gain {
                self.current_gain = (self.current_gain + ramp_step).min(self.target_gain);
            } else if self.current_gain > self.target_gain {
                self.current_gain = (self.current_gain - ramp_step).max(self.target_gain);
            }

            let sample = self.waveform.sample(self.phase) as f32 * self.current_gain;
            for out in frame.iter_mut() {
                *out = sample;
            }

            self.phase += phase_inc;
            if self.phase >= 1.0 {
                self.phase -= 1.0;
            }
        }
    }
}

/// Monophonic tone engine backed by a cpal output stream
pub struct CpalToneEngine {
    voice: Arc<Mutex<Voice>>,
    /// Label of the note currently sounding
    active_note: Option<String>,
    gain: f32,
    _stream: OutputStream,
}

impl CpalToneEngine {
    /// Create an engine and start its output stream
    pub fn new(waveform: Waveform, gain: f32) -> Result<Self, ToneError> {
        let config = OutputConfig::default();
        let voice = Arc::new(Mutex::new(Voice::new(waveform)));
        let sample_rate = config.sample_rate as f64;

        let render_voice = Arc::clone(&voice);
        let stream = OutputStream::new(config, move |buffer, channels| {
            if let Ok(mut voice) = render_voice.lock() {
                voice.render(buffer, channels, sample_rate);
            }
        })?;

        Ok(Self {
            voice,
            active_note: None,
            gain: gain.clamp(0.0, 1.0),
            _stream: stream,
        })
    }

    /// Change the oscillator waveform
    pub fn set_waveform(&mut self, waveform: Waveform) {
        if let Ok(mut voice) = self.voice.lock() {
            voice.waveform = waveform;
        }
    }

    /// Label of the note currently sounding
    pub fn active_note(&self) -> Option<&str> {
        self.active_note.as_deref()
    }
}

impl ToneEngine for CpalToneEngine {
    fn note_on(&mut self, note: &str, frequency: f64) {
        debug!(note, frequency, "note on");
        if let Ok(mut voice) = self.voice.lock() {
            voice.frequency = frequency;
            voice.target_gain = self.gain;
        }
        self.active_note = Some(note.to_string());
    }

    fn note_off(&mut self, note: &str) {
        if self.active_note.as_deref() != Some(note) {
            return;
        }
        debug!(note, "note off");
        if let Ok(mut voice) = self.voice.lock() {
            voice.target_gain = 0.0;
        }
        self.active_note = None;
    }

    fn all_notes_off(&mut self) {
        if let Ok(mut voice) = self.voice.lock() {
            voice.target_gain = 0.0;
        }
        self.active_note = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_waveform_samples() {
        assert!(Waveform::Sine.sample(0.0).abs() < 1e-9);
        assert!((Waveform::Sine.sample(0.25) - 1.0).abs() < 1e-9);

        assert_eq!(Waveform::Square.sample(0.25), 1.0);
        assert_eq!(Waveform::Square.sample(0.75), -1.0);

        assert_eq!(Waveform::Sawtooth.sample(0.0), -1.0);
        assert_eq!(Waveform::Sawtooth.sample(0.5), 0.0);

        assert_eq!(Waveform::Triangle.sample(0.25), 0.0);
        assert_eq!(Waveform::Triangle.sample(0.5), 1.0);
    }

    #[test]
    fn test_waveform_serde_names() {
        let yaml = serde_yaml::to_string(&Waveform::Sawtooth).unwrap();
        assert_eq!(yaml.trim(), "sawtooth");
        let parsed: Waveform = serde_yaml::from_str("square").unwrap();
        assert_eq!(parsed, Waveform::Square);
    }

    #[test]
    fn test_voice_ramps_toward_target() {
        let mut voice = Voice::new(Waveform::Sine);
        voice.target_gain = 0.5;

        let mut buffer = vec![0.0f32; 4096 * 2];
        voice.render(&mut buffer, 2, 44100.0);

        assert!((voice.current_gain - 0.5).abs() < 1e-6);
        // Both channels of a frame carry the same sample
        assert_eq!(buffer[4094], buffer[4095]);
    }

    #[test]
    fn test_silent_engine_is_inert() {
        let mut engine = SilentToneEngine;
        engine.note_on("C4", 261.63);
        engine.note_off("C4");
        engine.all_notes_off();
    }
}
