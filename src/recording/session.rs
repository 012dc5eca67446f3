// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Recording session state machine and note-event log.
//!
//! A session owns the recorder state, the append-only event log, and the
//! clock bookkeeping that normalizes timestamps to active recording time
//! (paused intervals excluded).

use std::time::{Duration, Instant};

use tracing::debug;

/// Recorder state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecorderState {
    /// Nothing recorded yet
    Idle,
    /// Actively recording
    Recording,
    /// Recording suspended; note events are dropped
    Paused,
    /// Recording finished; log is frozen
    StoppedWithData,
}

impl Default for RecorderState {
    fn default() -> Self {
        RecorderState::Idle
    }
}

/// Kind of note event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoteEventKind {
    NoteOn,
    NoteOff,
}

/// A timestamped note event
#[derive(Debug, Clone, PartialEq)]
pub struct NoteEvent {
    /// Key label, e.g. "C4"
    pub note: String,
    /// Pitch in Hz (present on note-on events)
    pub frequency: Option<f64>,
    /// Milliseconds of active recording time since session start
    pub timestamp_ms: u64,
    /// Note-on or note-off
    pub kind: NoteEventKind,
}

/// Outcome of a control operation on the session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub enum Transition {
    /// The trigger was legal in the current state and took effect
    Applied,
    /// The trigger is not legal in the given state and was ignored
    Rejected(RecorderState),
}

impl Transition {
    /// True if the trigger took effect
    pub fn applied(&self) -> bool {
        matches!(self, Transition::Applied)
    }
}

/// Default recording limit in active (non-paused) time
pub const DEFAULT_MAX_DURATION: Duration = Duration::from_secs(60);

/// A note-event recording session.
///
/// All control operations are idempotent-safe: a trigger that is not legal
/// in the current state returns [`Transition::Rejected`] and changes
/// nothing. Timestamps derive from a single monotonic clock sampled at
/// event time; every public operation has an `*_at` twin taking an explicit
/// [`Instant`] so tests can drive simulated time.
#[derive(Debug)]
pub struct RecordingSession {
    state: RecorderState,
    events: Vec<NoteEvent>,
    started_at: Option<Instant>,
    total_paused: Duration,
    pause_started_at: Option<Instant>,
    max_duration: Duration,
}

impl RecordingSession {
    /// Create a new session in the idle state
    pub fn new() -> Self {
        Self {
            state: RecorderState::Idle,
            events: Vec::new(),
            started_at: None,
            total_paused: Duration::ZERO,
            pause_started_at: None,
            max_duration: DEFAULT_MAX_DURATION,
        }
    }

    /// Create a session with a custom active-time recording limit
    pub fn with_max_duration(max_duration: Duration) -> Self {
        Self {
            max_duration,
            ..Self::new()
        }
    }

    /// Current state
    pub fn state(&self) -> RecorderState {
        self.state
    }

    /// Recorded events in chronological order
    pub fn events(&self) -> &[NoteEvent] {
        &self.events
    }

    /// True if at least one event was captured
    pub fn has_events(&self) -> bool {
        !self.events.is_empty()
    }

    /// Number of note-on events
    pub fn note_on_count(&self) -> usize {
        self.events
            .iter()
            .filter(|e| e.kind == NoteEventKind::NoteOn)
            .count()
    }

    /// Timestamp of the last event in milliseconds (0 when empty)
    pub fn duration_ms(&self) -> u64 {
        self.events.last().map(|e| e.timestamp_ms).unwrap_or(0)
    }

    /// Active recording limit
    pub fn max_duration(&self) -> Duration {
        self.max_duration
    }

    /// Start recording.
    ///
    /// Legal from `Idle` and `StoppedWithData`; starting over a frozen
    /// session discards its log.
    pub fn start(&mut self) -> Transition {
        self.start_at(Instant::now())
    }

    /// Start recording at an explicit clock reading
    pub fn start_at(&mut self, now: Instant) -> Transition {
        match self.state {
            RecorderState::Idle | RecorderState::StoppedWithData => {
                if !self.events.is_empty() {
                    debug!(discarded = self.events.len(), "discarding previous recording");
                }
                self.events.clear();
                self.started_at = Some(now);
                self.total_paused = Duration::ZERO;
                self.pause_started_at = None;
                self.state = RecorderState::Recording;
                Transition::Applied
            }
            other => Transition::Rejected(other),
        }
    }

    /// Pause recording (legal only while `Recording`)
    pub fn pause(&mut self) -> Transition {
        self.pause_at(Instant::now())
    }

    /// Pause recording at an explicit clock reading
    pub fn pause_at(&mut self, now: Instant) -> Transition {
        match self.state {
            RecorderState::Recording => {
                self.pause_started_at = Some(now);
                self.state = RecorderState::Paused;
                Transition::Applied
            }
            other => Transition::Rejected(other),
        }
    }

    /// Resume recording, folding the elapsed pause into the total
    pub fn resume(&mut self) -> Transition {
        self.resume_at(Instant::now())
    }

    /// Resume recording at an explicit clock reading
    pub fn resume_at(&mut self, now: Instant) -> Transition {
        match self.state {
            RecorderState::Paused => {
                self.commit_pause(now);
                self.state = RecorderState::Recording;
                Transition::Applied
            }
            other => Transition::Rejected(other),
        }
    }

    /// Stop recording and freeze the log.
    ///
    /// Legal from `Recording` and `Paused`. Freezing always succeeds; an
    /// empty frozen log simply means playback and export will be refused.
    pub fn stop(&mut self) -> Transition {
        self.stop_at(Instant::now())
    }

    /// Stop recording at an explicit clock reading
    pub fn stop_at(&mut self, now: Instant) -> Transition {
        match self.state {
            RecorderState::Recording | RecorderState::Paused => {
                self.commit_pause(now);
                self.state = RecorderState::StoppedWithData;
                debug!(
                    events = self.events.len(),
                    duration_ms = self.duration_ms(),
                    "recording stopped"
                );
                Transition::Applied
            }
            other => Transition::Rejected(other),
        }
    }

    /// Record a note-on event. Returns true if the event was appended;
    /// events arriving while not `Recording` are dropped.
    pub fn record_note_on(&mut self, note: &str, frequency: f64) -> bool {
        self.record_note_on_at(note, frequency, Instant::now())
    }

    /// Record a note-on event at an explicit clock reading
    pub fn record_note_on_at(&mut self, note: &str, frequency: f64, now: Instant) -> bool {
        if self.state != RecorderState::Recording {
            return false;
        }
        let timestamp_ms = self.relative_timestamp(now);
        self.events.push(NoteEvent {
            note: note.to_string(),
            frequency: Some(frequency),
            timestamp_ms,
            kind: NoteEventKind::NoteOn,
        });
        true
    }

    /// Record a note-off event. Same guard as [`record_note_on`](Self::record_note_on).
    pub fn record_note_off(&mut self, note: &str) -> bool {
        self.record_note_off_at(note, Instant::now())
    }

    /// Record a note-off event at an explicit clock reading
    pub fn record_note_off_at(&mut self, note: &str, now: Instant) -> bool {
        if self.state != RecorderState::Recording {
            return false;
        }
        let timestamp_ms = self.relative_timestamp(now);
        self.events.push(NoteEvent {
            note: note.to_string(),
            frequency: None,
            timestamp_ms,
            kind: NoteEventKind::NoteOff,
        });
        true
    }

    /// Elapsed active recording time (pauses excluded)
    pub fn active_elapsed(&self, now: Instant) -> Duration {
        let started = match self.started_at {
            Some(s) => s,
            None => return Duration::ZERO,
        };
        // While paused the active clock is frozen at the pause point
        let reference = match (self.state, self.pause_started_at) {
            (RecorderState::Paused, Some(paused_at)) => paused_at,
            _ => now,
        };
        reference
            .saturating_duration_since(started)
            .saturating_sub(self.total_paused)
    }

    /// Poll the auto-stop limit. Stops the recording and returns true when
    /// the active elapsed time has reached the limit.
    pub fn tick(&mut self) -> bool {
        self.tick_at(Instant::now())
    }

    /// Poll the auto-stop limit at an explicit clock reading
    pub fn tick_at(&mut self, now: Instant) -> bool {
        if self.state != RecorderState::Recording {
            return false;
        }
        if self.active_elapsed(now) >= self.max_duration {
            debug!("recording limit reached, stopping");
            let _ = self.stop_at(now);
            return true;
        }
        false
    }

    /// Fold an in-progress pause into the accumulated total
    fn commit_pause(&mut self, now: Instant) {
        if let Some(paused_at) = self.pause_started_at.take() {
            self.total_paused += now.saturating_duration_since(paused_at);
        }
    }

    /// Active-time timestamp for an event sampled at `now`.
    ///
    /// Clamped against the tail of the log so insertion order always equals
    /// chronological order, even if a caller hands in a stale instant.
    fn relative_timestamp(&self, now: Instant) -> u64 {
        let started = match self.started_at {
            Some(s) => s,
            None => return 0,
        };
        let active = now
            .saturating_duration_since(started)
            .saturating_sub(self.total_paused);
        let ms = active.as_millis() as u64;
        match self.events.last() {
            Some(last) => ms.max(last.timestamp_ms),
            None => ms,
        }
    }
}

impl Default for RecordingSession {
    fn default() -> Self {
        Self::new()
    }
}
