// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Note-event recording.
//!
//! This module provides:
//! - The recording session state machine (idle/recording/paused/stopped)
//! - The timestamped note-event log with pause-corrected timing
//! - The seam for the parallel raw-audio capture collaborator

pub mod capture;
pub mod session;

pub use capture::{AudioCapture, CapturedAudio, UnavailableCapture};
pub use session::{
    NoteEvent, NoteEventKind, RecorderState, RecordingSession, Transition, DEFAULT_MAX_DURATION,
};
