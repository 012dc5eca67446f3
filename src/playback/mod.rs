// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Playback of frozen note-event logs.
//!
//! This module provides:
//! - The deadline scheduler with epoch-guarded cancellation
//! - The controller that drives a tone engine from scheduled actions

pub mod scheduler;

pub use scheduler::{PlaybackAction, PlaybackScheduler, DEFAULT_PLAYBACK_TAIL};

use std::time::{Duration, Instant};

use tracing::debug;

use crate::recording::RecordingSession;
use crate::tone::ToneEngine;

/// Outcome of a play request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub enum PlayRequest {
    /// Playback started
    Started,
    /// A round is already playing; request ignored
    AlreadyPlaying,
    /// The log has no events; nothing to play
    EmptyLog,
}

impl PlayRequest {
    /// True if playback started
    pub fn started(&self) -> bool {
        matches!(self, PlayRequest::Started)
    }
}

/// Replays a frozen log through a tone engine.
///
/// The owner drives the controller by calling [`poll`](Self::poll) (or
/// `poll_at` with an explicit clock reading) until it reports that the
/// round has finished.
pub struct PlaybackController<E: ToneEngine> {
    scheduler: PlaybackScheduler,
    engine: E,
}

impl<E: ToneEngine> PlaybackController<E> {
    /// Create a controller around a tone engine
    pub fn new(engine: E) -> Self {
        Self {
            scheduler: PlaybackScheduler::new(),
            engine,
        }
    }

    /// Create a controller with a custom tail after the last event
    pub fn with_tail(engine: E, tail: Duration) -> Self {
        Self {
            scheduler: PlaybackScheduler::with_tail(tail),
            engine,
        }
    }

    /// Start replaying the session's log
    pub fn play(&mut self, session: &RecordingSession) -> PlayRequest {
        self.play_at(session, Instant::now())
    }

    /// Start replaying at an explicit clock reading
    pub fn play_at(&mut self, session: &RecordingSession, now: Instant) -> PlayRequest {
        if self.scheduler.is_playing() {
            return PlayRequest::AlreadyPlaying;
        }
        if !session.has_events() {
            return PlayRequest::EmptyLog;
        }
        let started = self.scheduler.start_at(session.events(), now);
        debug!(events = session.events().len(), "playback started");
        debug_assert!(started);
        PlayRequest::Started
    }

    /// Dispatch all due actions to the engine. Returns true while the round
    /// is still playing.
    pub fn poll(&mut self) -> bool {
        self.poll_at(Instant::now())
    }

    /// Dispatch due actions at an explicit clock reading
    pub fn poll_at(&mut self, now: Instant) -> bool {
        for action in self.scheduler.poll_at(now) {
            match action {
                PlaybackAction::NoteOn { note, frequency } => {
                    self.engine.note_on(&note, frequency);
                }
                PlaybackAction::NoteOff { note } => {
                    self.engine.note_off(&note);
                }
                PlaybackAction::Finish => {
                    debug!("playback finished");
                    self.engine.all_notes_off();
                }
            }
        }
        self.scheduler.is_playing()
    }

    /// Stop playback, cancelling every pending delivery and silencing the
    /// engine
    pub fn stop(&mut self) {
        if self.scheduler.is_playing() {
            debug!("playback stopped");
        }
        self.scheduler.cancel();
        self.engine.all_notes_off();
    }

    /// Check if a round is playing
    pub fn is_playing(&self) -> bool {
        self.scheduler.is_playing()
    }

    /// Time until the next deadline, if playing
    pub fn time_to_next(&self, now: Instant) -> Option<Duration> {
        self.scheduler.time_to_next(now)
    }

    /// Access the tone engine
    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Mutable access to the tone engine
    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }
}
