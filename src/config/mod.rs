// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Recorder configuration.
//!
//! Settings for the recorder core and the demo tone engine, loadable from
//! a YAML file. Every field has a default matching the teaching page, so
//! an empty file (or no file) yields a working configuration.

use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::tone::Waveform;

/// Recorder and tone engine settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecorderConfig {
    /// Title written into export envelopes
    #[serde(default = "default_title")]
    pub title: String,
    /// Recording limit in active (non-paused) seconds
    #[serde(default = "default_max_duration_secs")]
    pub max_duration_secs: u64,
    /// Trailing time after the last event before playback stops, in ms
    #[serde(default = "default_playback_tail_ms")]
    pub playback_tail_ms: u64,
    /// Oscillator waveform for the tone engine
    #[serde(default)]
    pub waveform: Waveform,
    /// Output gain (0.0 - 1.0)
    #[serde(default = "default_gain")]
    pub gain: f32,
}

fn default_title() -> String {
    "DIY Synthesizer Recording".to_string()
}

fn default_max_duration_secs() -> u64 {
    60
}

fn default_playback_tail_ms() -> u64 {
    1000
}

fn default_gain() -> f32 {
    0.3
}

impl Default for RecorderConfig {
    fn default() -> Self {
        Self {
            title: default_title(),
            max_duration_secs: default_max_duration_secs(),
            playback_tail_ms: default_playback_tail_ms(),
            waveform: Waveform::default(),
            gain: default_gain(),
        }
    }
}

impl RecorderConfig {
    /// Load a configuration from a YAML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {:?}", path.as_ref()))?;
        Self::from_yaml(&contents)
    }

    /// Parse a configuration from a YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Self =
            serde_yaml::from_str(yaml).context("Failed to parse YAML configuration")?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize to YAML string
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).context("Failed to serialize configuration to YAML")
    }

    /// Check the configuration for usable values
    pub fn validate(&self) -> Result<()> {
        if self.max_duration_secs == 0 {
            bail!("max_duration_secs must be at least 1");
        }
        if !(0.0..=1.0).contains(&self.gain) {
            bail!("gain must be between 0.0 and 1.0");
        }
        Ok(())
    }

    /// Recording limit as a duration
    pub fn max_duration(&self) -> Duration {
        Duration::from_secs(self.max_duration_secs)
    }

    /// Playback tail as a duration
    pub fn playback_tail(&self) -> Duration {
        Duration::from_millis(self.playback_tail_ms)
    }
}
