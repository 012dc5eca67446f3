// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Deadline scheduler for note-event playback.
//!
//! Replays a frozen event log by holding a priority queue of
//! (deadline, action) pairs drained by a poll loop. Every scheduling round
//! carries an epoch number; cancelling playback bumps the epoch, so a
//! deadline from a superseded round can never fire.

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::time::{Duration, Instant};

use crate::recording::{NoteEvent, NoteEventKind};

/// Trailing time appended after the last event before playback finishes
pub const DEFAULT_PLAYBACK_TAIL: Duration = Duration::from_millis(1000);

/// Action delivered when a scheduled deadline fires
#[derive(Debug, Clone, PartialEq)]
pub enum PlaybackAction {
    /// Start sounding a pitch
    NoteOn { note: String, frequency: f64 },
    /// Stop sounding a pitch
    NoteOff { note: String },
    /// Playback reached the end of the log plus the tail
    Finish,
}

/// A queued action with its deadline
#[derive(Debug, Clone)]
struct ScheduledAction {
    /// Milliseconds after playback start
    due_ms: u64,
    /// Scheduling round this action belongs to
    epoch: u64,
    action: PlaybackAction,
}

// Reverse ordering by deadline for min-heap behavior
impl Eq for ScheduledAction {}

impl PartialEq for ScheduledAction {
    fn eq(&self, other: &Self) -> bool {
        self.due_ms == other.due_ms
    }
}

impl Ord for ScheduledAction {
    fn cmp(&self, other: &Self) -> Ordering {
        other.due_ms.cmp(&self.due_ms)
    }
}

impl PartialOrd for ScheduledAction {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Playback deadline queue
pub struct PlaybackScheduler {
    queue: BinaryHeap<ScheduledAction>,
    /// Current scheduling round; bumped on every start and cancel
    epoch: u64,
    started_at: Option<Instant>,
    playing: bool,
    tail: Duration,
}

impl PlaybackScheduler {
    /// Create a new scheduler with the default tail
    pub fn new() -> Self {
        Self {
            queue: BinaryHeap::new(),
            epoch: 0,
            started_at: None,
            playing: false,
            tail: DEFAULT_PLAYBACK_TAIL,
        }
    }

    /// Create a scheduler with a custom tail after the last event
    pub fn with_tail(tail: Duration) -> Self {
        Self {
            tail,
            ..Self::new()
        }
    }

    /// Check if a playback round is active
    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// Number of pending deadlines
    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }

    /// Current scheduling round
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Schedule a frozen log for playback starting at `now`.
    ///
    /// Returns false without scheduling anything if the log is empty or a
    /// round is already playing. Note-on events missing a frequency cannot
    /// be sounded and are skipped.
    pub fn start_at(&mut self, events: &[NoteEvent], now: Instant) -> bool {
        if self.playing || events.is_empty() {
            return false;
        }

        self.epoch += 1;
        self.queue.clear();

        let mut last_ms = 0u64;
        for event in events {
            last_ms = last_ms.max(event.timestamp_ms);
            let action = match (event.kind, event.frequency) {
                (NoteEventKind::NoteOn, Some(frequency)) => PlaybackAction::NoteOn {
                    note: event.note.clone(),
                    frequency,
                },
                (NoteEventKind::NoteOn, None) => continue,
                (NoteEventKind::NoteOff, _) => PlaybackAction::NoteOff {
                    note: event.note.clone(),
                },
            };
            self.queue.push(ScheduledAction {
                due_ms: event.timestamp_ms,
                epoch: self.epoch,
                action,
            });
        }

        self.queue.push(ScheduledAction {
            due_ms: last_ms + self.tail.as_millis() as u64,
            epoch: self.epoch,
            action: PlaybackAction::Finish,
        });

        self.started_at = Some(now);
        self.playing = true;
        true
    }

    /// Cancel the current round, dropping every pending deadline
    pub fn cancel(&mut self) {
        self.epoch += 1;
        self.queue.clear();
        self.started_at = None;
        self.playing = false;
    }

    /// Drain the actions due at `now`, in deadline order.
    ///
    /// Delivering [`PlaybackAction::Finish`] ends the round. Actions from a
    /// superseded epoch are discarded without being delivered.
    pub fn poll_at(&mut self, now: Instant) -> Vec<PlaybackAction> {
        if !self.playing {
            return Vec::new();
        }
        let started = match self.started_at {
            Some(s) => s,
            None => return Vec::new(),
        };

        let elapsed_ms = now.saturating_duration_since(started).as_millis() as u64;
        let mut actions = Vec::new();

        while let Some(head) = self.queue.peek() {
            if head.due_ms > elapsed_ms {
                break;
            }
            let scheduled = self.queue.pop().expect("peeked entry exists");
            if scheduled.epoch != self.epoch {
                continue;
            }
            let finished = scheduled.action == PlaybackAction::Finish;
            actions.push(scheduled.action);
            if finished {
                self.queue.clear();
                self.started_at = None;
                self.playing = false;
                break;
            }
        }

        actions
    }

    /// Time until the next deadline, if a round is playing
    pub fn time_to_next(&self, now: Instant) -> Option<Duration> {
        if !self.playing {
            return None;
        }
        let started = self.started_at?;
        let elapsed_ms = now.saturating_duration_since(started).as_millis() as u64;
        self.queue.peek().map(|head| {
            if head.due_ms <= elapsed_ms {
                Duration::ZERO
            } else {
                Duration::from_millis(head.due_ms - elapsed_ms)
            }
        })
    }
}

impl Default for PlaybackScheduler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn on(note: &str, frequency: f64, timestamp_ms: u64) -> NoteEvent {
        NoteEvent {
            note: note.to_string(),
            frequency: Some(frequency),
            timestamp_ms,
            kind: NoteEventKind::NoteOn,
        }
    }

    fn off(note: &str, timestamp_ms: u64) -> NoteEvent {
        NoteEvent {
            note: note.to_string(),
            frequency: None,
            timestamp_ms,
            kind: NoteEventKind::NoteOff,
        }
    }

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn test_scheduler_creation() {
        let scheduler = PlaybackScheduler::new();
        assert!(!scheduler.is_playing());
        assert_eq!(scheduler.queue_len(), 0);
    }

    #[test]
    fn test_empty_log_refused() {
        let mut scheduler = PlaybackScheduler::new();
        assert!(!scheduler.start_at(&[], Instant::now()));
        assert!(!scheduler.is_playing());
        assert_eq!(scheduler.queue_len(), 0);
    }

    #[test]
    fn test_double_start_refused() {
        let mut scheduler = PlaybackScheduler::new();
        let t0 = Instant::now();
        let events = vec![on("C4", 261.63, 0)];

        assert!(scheduler.start_at(&events, t0));
        assert!(!scheduler.start_at(&events, t0 + ms(10)));
    }

    #[test]
    fn test_actions_fire_in_order() {
        let mut scheduler = PlaybackScheduler::new();
        let t0 = Instant::now();
        // Scheduled out of order on purpose
        let events = vec![off("C4", 500), on("C4", 261.63, 0), on("E4", 329.63, 700)];

        assert!(scheduler.start_at(&events, t0));

        let actions = scheduler.poll_at(t0 + ms(600));
        assert_eq!(actions.len(), 2);
        assert_eq!(
            actions[0],
            PlaybackAction::NoteOn {
                note: "C4".to_string(),
                frequency: 261.63
            }
        );
        assert_eq!(
            actions[1],
            PlaybackAction::NoteOff {
                note: "C4".to_string()
            }
        );

        let actions = scheduler.poll_at(t0 + ms(750));
        assert_eq!(actions.len(), 1);
        assert!(scheduler.is_playing());
    }

    #[test]
    fn test_finishes_after_tail() {
        let mut scheduler = PlaybackScheduler::new();
        let t0 = Instant::now();
        let events = vec![on("C4", 261.63, 0), off("C4", 500)];

        assert!(scheduler.start_at(&events, t0));
        let _ = scheduler.poll_at(t0 + ms(500));
        assert!(scheduler.is_playing());

        // Finish marker sits at max timestamp + 1000ms
        let actions = scheduler.poll_at(t0 + ms(1499));
        assert!(actions.is_empty());

        let actions = scheduler.poll_at(t0 + ms(1500));
        assert_eq!(actions, vec![PlaybackAction::Finish]);
        assert!(!scheduler.is_playing());
        assert_eq!(scheduler.queue_len(), 0);
    }

    #[test]
    fn test_cancel_prevents_pending_deadlines() {
        let mut scheduler = PlaybackScheduler::new();
        let t0 = Instant::now();
        let events = vec![on("C4", 261.63, 0), on("D4", 293.66, 500), on("E4", 329.63, 1000)];

        assert!(scheduler.start_at(&events, t0));
        let fired = scheduler.poll_at(t0 + ms(550));
        assert_eq!(fired.len(), 2);

        scheduler.cancel();
        assert!(!scheduler.is_playing());

        // The event at 1000ms must never fire
        assert!(scheduler.poll_at(t0 + ms(1100)).is_empty());
        assert!(scheduler.poll_at(t0 + ms(2000)).is_empty());
    }

    #[test]
    fn test_cancel_bumps_epoch() {
        let mut scheduler = PlaybackScheduler::new();
        let e0 = scheduler.epoch();
        scheduler.cancel();
        assert_eq!(scheduler.epoch(), e0 + 1);
    }

    #[test]
    fn test_restart_after_cancel() {
        let mut scheduler = PlaybackScheduler::new();
        let t0 = Instant::now();
        let events = vec![on("C4", 261.63, 0)];

        assert!(scheduler.start_at(&events, t0));
        scheduler.cancel();
        assert!(scheduler.start_at(&events, t0 + ms(100)));

        let actions = scheduler.poll_at(t0 + ms(100));
        assert_eq!(actions.len(), 1);
    }

    #[test]
    fn test_note_on_without_frequency_skipped() {
        let mut scheduler = PlaybackScheduler::new();
        let t0 = Instant::now();
        let mut broken = on("C4", 261.63, 0);
        broken.frequency = None;

        assert!(scheduler.start_at(&[broken], t0));
        // Only the finish marker remains
        assert_eq!(scheduler.queue_len(), 1);
    }

    #[test]
    fn test_time_to_next() {
        let mut scheduler = PlaybackScheduler::new();
        let t0 = Instant::now();
        let events = vec![on("C4", 261.63, 300)];

        assert_eq!(scheduler.time_to_next(t0), None);
        assert!(scheduler.start_at(&events, t0));
        assert_eq!(scheduler.time_to_next(t0), Some(ms(300)));
        assert_eq!(scheduler.time_to_next(t0 + ms(400)), Some(Duration::ZERO));
    }
}
