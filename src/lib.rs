// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Note-event recorder/player for the DIY synthesizer demo.
//!
//! Captures timestamped key-press events during a live playing session,
//! replays them with correct relative timing, and exports them as a JSON
//! sequence or a forwarded raw-audio blob. The UI surface, chart rendering
//! and circuit display of the teaching page are external collaborators and
//! not part of this crate.

pub mod config;
pub mod export;
pub mod music;
pub mod playback;
pub mod recording;
pub mod tone;
