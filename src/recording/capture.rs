// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Raw-audio capture collaborator seam.
//!
//! The system audio recorder runs in parallel with the note-event session
//! and is entirely opaque to it: the session never inspects the captured
//! bytes, it only forwards them to the exporter. A backend that fails to
//! initialize is a recoverable degradation, not an error; recording simply
//! continues in event-log-only mode.

use tracing::warn;

/// An opaque audio blob produced by a capture backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedAudio {
    /// Raw encoded audio bytes
    pub data: Vec<u8>,
    /// File extension for the export filename (e.g. "webm")
    pub extension: String,
}

impl CapturedAudio {
    /// Create a captured blob
    pub fn new(data: Vec<u8>, extension: impl Into<String>) -> Self {
        Self {
            data,
            extension: extension.into(),
        }
    }
}

/// A raw-audio capture backend running alongside the recording session.
///
/// Implementations mirror the session lifecycle: `start` when recording
/// begins, `pause`/`resume` with the session, `stop` when the log freezes.
pub trait AudioCapture {
    /// Begin capturing. Returns false when the backend is unavailable;
    /// the caller keeps recording without raw audio.
    fn start(&mut self) -> bool;

    /// Suspend capturing
    fn pause(&mut self);

    /// Continue capturing after a pause
    fn resume(&mut self);

    /// Finish capturing and hand back the blob, if any was produced
    fn stop(&mut self) -> Option<CapturedAudio>;
}

/// Capture backend used when no system audio recorder exists
#[derive(Debug, Default)]
pub struct UnavailableCapture;

impl AudioCapture for UnavailableCapture {
    fn start(&mut self) -> bool {
        warn!("audio capture unavailable, recording note events only");
        false
    }

    fn pause(&mut self) {}

    fn resume(&mut self) {}

    fn stop(&mut self) -> Option<CapturedAudio> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unavailable_capture_yields_nothing() {
        let mut capture = UnavailableCapture;
        assert!(!capture.start());
        capture.pause();
        capture.resume();
        assert!(capture.stop().is_none());
    }
}
