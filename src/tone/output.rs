// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Audio output via cpal.
//!
//! Thin wrapper around a cpal output stream: the caller supplies a fill
//! callback and the stream keeps running for the lifetime of the handle.

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, Stream, StreamConfig};

use super::ToneError;

/// Output stream configuration
#[derive(Debug, Clone)]
pub struct OutputConfig {
    /// Sample rate in Hz
    pub sample_rate: u32,
    /// Number of output channels
    pub channels: u16,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            sample_rate: 44100,
            channels: 2,
        }
    }
}

/// A running audio output stream
pub struct OutputStream {
    _stream: Stream,
    _device: Device,
    config: OutputConfig,
}

impl OutputStream {
    /// Open the default output device and start a stream driven by `callback`.
    ///
    /// The callback receives the interleaved sample buffer and the channel
    /// count, and must fill the whole buffer.
    pub fn new<F>(config: OutputConfig, mut callback: F) -> Result<Self, ToneError>
    where
        F: FnMut(&mut [f32], usize) + Send + 'static,
    {
        let host = cpal::default_host();

        let device = host.default_output_device().ok_or(ToneError::NoDevice)?;

        device
            .default_output_config()
            .map_err(|e| ToneError::InitFailed(format!("failed to get default config: {}", e)))?;

        let stream_config = StreamConfig {
            channels: config.channels,
            sample_rate: cpal::SampleRate(config.sample_rate),
            buffer_size: cpal::BufferSize::Default,
        };

        let channels = config.channels as usize;

        let stream = device
            .build_output_stream(
                &stream_config,
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                    for sample in data.iter_mut() {
                        *sample = 0.0;
                    }
                    callback(data, channels);
                },
                move |err| {
                    tracing::error!("audio stream error: {}", err);
                },
                None,
            )
            .map_err(|e| ToneError::StreamFailed(format!("failed to build stream: {}", e)))?;

        stream
            .play()
            .map_err(|e| ToneError::StreamFailed(format!("failed to start stream: {}", e)))?;

        Ok(Self {
            _stream: stream,
            _device: device,
            config,
        })
    }

    /// Get the stream configuration
    pub fn config(&self) -> &OutputConfig {
        &self.config
    }
}
