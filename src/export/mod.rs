// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Export and sharing of frozen recordings.
//!
//! Two export paths, matching the teaching page:
//! - A raw audio blob captured alongside the session is forwarded unchanged
//!   as `synthesizer-recording-<stamp>.<ext>`.
//! - Otherwise the event log is serialized to a JSON sequence file named
//!   `synthesizer-sequence-<stamp>.json`.
//!
//! Also produces the compact `note@deciseconds` share summary. All paths
//! refuse an empty log.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::recording::{CapturedAudio, NoteEventKind, RecordingSession};

/// Maximum length of the share summary before truncation
const SHARE_SUMMARY_LIMIT: usize = 100;

/// Nominal note length written for note-on entries, in seconds.
/// The log does not track held durations, so exports carry this fixed value.
const NOMINAL_NOTE_DURATION: f64 = 0.5;

/// Export errors
#[derive(Debug, Error)]
pub enum ExportError {
    /// The log has no events; nothing to export
    #[error("nothing recorded")]
    EmptyLog,
    /// JSON serialization failed
    #[error("failed to serialize export: {0}")]
    Serialize(#[from] serde_json::Error),
    /// Writing the export file failed
    #[error("failed to write export: {0}")]
    Io(#[from] std::io::Error),
}

/// Entry kind in an exported sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    Start,
    End,
}

/// One entry of an exported sequence
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SequenceEntry {
    /// Key label, e.g. "C4"
    pub note: String,
    /// Pitch in Hz (absent on end entries)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frequency: Option<f64>,
    /// Event time in seconds
    pub time: f64,
    /// "start" or "end"
    #[serde(rename = "type")]
    pub kind: EntryKind,
    /// Nominal duration in seconds (0.5 for start entries, 0 for end)
    pub duration: f64,
}

/// Envelope of an exported recording
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordingExport {
    /// Recording title
    pub title: String,
    /// ISO-8601 creation time
    pub created: String,
    /// Timestamp of the last event in seconds
    pub total_duration: f64,
    /// Number of note-on events
    pub note_count: usize,
    /// The exported event sequence
    pub sequence: Vec<SequenceEntry>,
}

/// Serializes frozen logs and forwards captured audio blobs
pub struct Exporter {
    title: String,
}

impl Exporter {
    /// Create an exporter with the title written into export envelopes
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
        }
    }

    /// Build the export envelope for a session's log
    pub fn sequence_export(&self, session: &RecordingSession) -> Result<RecordingExport, ExportError> {
        if !session.has_events() {
            return Err(ExportError::EmptyLog);
        }

        let sequence = session
            .events()
            .iter()
            .map(|event| SequenceEntry {
                note: event.note.clone(),
                frequency: event.frequency,
                time: event.timestamp_ms as f64 / 1000.0,
                kind: match event.kind {
                    NoteEventKind::NoteOn => EntryKind::Start,
                    NoteEventKind::NoteOff => EntryKind::End,
                },
                duration: match event.kind {
                    NoteEventKind::NoteOn => NOMINAL_NOTE_DURATION,
                    NoteEventKind::NoteOff => 0.0,
                },
            })
            .collect();

        Ok(RecordingExport {
            title: self.title.clone(),
            created: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            total_duration: session.duration_ms() as f64 / 1000.0,
            note_count: session.note_on_count(),
            sequence,
        })
    }

    /// Serialize the session's log as pretty-printed JSON
    pub fn to_json(&self, session: &RecordingSession) -> Result<String, ExportError> {
        let export = self.sequence_export(session)?;
        Ok(serde_json::to_string_pretty(&export)?)
    }

    /// Write the export into `dir`, forwarding the audio blob when one was
    /// captured, and return the path of the written file.
    pub fn export_to_dir(
        &self,
        session: &RecordingSession,
        capture: Option<&CapturedAudio>,
        dir: &Path,
    ) -> Result<PathBuf, ExportError> {
        if !session.has_events() {
            return Err(ExportError::EmptyLog);
        }

        let stamp = Utc::now().format("%Y-%m-%dT%H-%M-%S");
        let path = match capture {
            Some(audio) => {
                let path = dir.join(format!("synthesizer-recording-{}.{}", stamp, audio.extension));
                fs::write(&path, &audio.data)?;
                path
            }
            None => {
                let path = dir.join(format!("synthesizer-sequence-{}.json", stamp));
                fs::write(&path, self.to_json(session)?)?;
                path
            }
        };

        info!(path = %path.display(), "recording exported");
        Ok(path)
    }

    /// Compact human-readable summary of the note-on events, formatted as
    /// `note@deciseconds` comma-joined and truncated to 100 characters.
    pub fn share_summary(&self, session: &RecordingSession) -> Result<String, ExportError> {
        if !session.has_events() {
            return Err(ExportError::EmptyLog);
        }

        let joined = session
            .events()
            .iter()
            .filter(|e| e.kind == NoteEventKind::NoteOn)
            .map(|e| format!("{}@{}", e.note, (e.timestamp_ms + 50) / 100))
            .collect::<Vec<_>>()
            .join(",");

        if joined.len() > SHARE_SUMMARY_LIMIT {
            let truncated: String = joined.chars().take(SHARE_SUMMARY_LIMIT).collect();
            Ok(format!("{}...", truncated))
        } else {
            Ok(joined)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recording::RecordingSession;
    use std::time::{Duration, Instant};

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    fn empty_session() -> RecordingSession {
        let mut session = RecordingSession::new();
        let t0 = Instant::now();
        assert!(session.start_at(t0).applied());
        assert!(session.stop_at(t0).applied());
        session
    }

    fn one_note_session() -> RecordingSession {
        let mut session = RecordingSession::new();
        let t0 = Instant::now();
        assert!(session.start_at(t0).applied());
        assert!(session.record_note_on_at("C4", 261.63, t0));
        assert!(session.record_note_off_at("C4", t0 + ms(500)));
        assert!(session.stop_at(t0 + ms(600)).applied());
        session
    }

    #[test]
    fn test_empty_log_refused() {
        let exporter = Exporter::new("Test");
        let session = empty_session();

        assert!(matches!(
            exporter.sequence_export(&session),
            Err(ExportError::EmptyLog)
        ));
        assert!(matches!(
            exporter.share_summary(&session),
            Err(ExportError::EmptyLog)
        ));
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            exporter.export_to_dir(&session, None, dir.path()),
            Err(ExportError::EmptyLog)
        ));
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_export_shape() {
        let exporter = Exporter::new("Test");
        let export = exporter.sequence_export(&one_note_session()).unwrap();

        assert_eq!(export.title, "Test");
        assert_eq!(export.note_count, 1);
        assert_eq!(export.total_duration, 0.5);
        assert_eq!(export.sequence.len(), 2);

        let start = &export.sequence[0];
        assert_eq!(start.note, "C4");
        assert_eq!(start.frequency, Some(261.63));
        assert_eq!(start.time, 0.0);
        assert_eq!(start.kind, EntryKind::Start);
        assert_eq!(start.duration, 0.5);

        let end = &export.sequence[1];
        assert_eq!(end.time, 0.5);
        assert_eq!(end.kind, EntryKind::End);
        assert_eq!(end.duration, 0.0);
        assert_eq!(end.frequency, None);
    }

    #[test]
    fn test_json_field_names() {
        let exporter = Exporter::new("Test");
        let json = exporter.to_json(&one_note_session()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert!(value["created"].is_string());
        assert_eq!(value["totalDuration"], 0.5);
        assert_eq!(value["noteCount"], 1);
        assert_eq!(value["sequence"][0]["type"], "start");
        assert_eq!(value["sequence"][1]["type"], "end");
        // End entries omit the frequency field entirely
        assert!(value["sequence"][1].get("frequency").is_none());
    }

    #[test]
    fn test_export_json_file() {
        let exporter = Exporter::new("Test");
        let dir = tempfile::tempdir().unwrap();

        let path = exporter
            .export_to_dir(&one_note_session(), None, dir.path())
            .unwrap();

        let name = path.file_name().unwrap().to_str().unwrap();
        assert!(name.starts_with("synthesizer-sequence-"));
        assert!(name.ends_with(".json"));

        let contents = fs::read_to_string(&path).unwrap();
        let value: serde_json::Value = serde_json::from_str(&contents).unwrap();
        assert_eq!(value["noteCount"], 1);
    }

    #[test]
    fn test_export_forwards_audio_blob() {
        let exporter = Exporter::new("Test");
        let dir = tempfile::tempdir().unwrap();
        let audio = CapturedAudio::new(vec![1, 2, 3, 4], "webm");

        let path = exporter
            .export_to_dir(&one_note_session(), Some(&audio), dir.path())
            .unwrap();

        let name = path.file_name().unwrap().to_str().unwrap();
        assert!(name.starts_with("synthesizer-recording-"));
        assert!(name.ends_with(".webm"));
        assert_eq!(fs::read(&path).unwrap(), vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_share_summary_format() {
        let mut session = RecordingSession::new();
        let t0 = Instant::now();
        assert!(session.start_at(t0).applied());
        assert!(session.record_note_on_at("C4", 261.63, t0));
        assert!(session.record_note_off_at("C4", t0 + ms(400)));
        assert!(session.record_note_on_at("E4", 329.63, t0 + ms(1250)));
        assert!(session.stop_at(t0 + ms(1500)).applied());

        let exporter = Exporter::new("Test");
        // 1250ms rounds to 13 deciseconds; note-offs are omitted
        assert_eq!(exporter.share_summary(&session).unwrap(), "C4@0,E4@13");
    }

    #[test]
    fn test_share_summary_truncation() {
        let mut session = RecordingSession::new();
        let t0 = Instant::now();
        assert!(session.start_at(t0).applied());
        for i in 0..40 {
            assert!(session.record_note_on_at("C4", 261.63, t0 + ms(i * 100)));
        }
        assert!(session.stop_at(t0 + ms(5000)).applied());

        let exporter = Exporter::new("Test");
        let summary = exporter.share_summary(&session).unwrap();
        assert_eq!(summary.len(), SHARE_SUMMARY_LIMIT + 3);
        assert!(summary.ends_with("..."));
    }
}
