// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

use std::path::Path;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::Result;
use tracing::warn;

use synthrec::config::RecorderConfig;
use synthrec::export::Exporter;
use synthrec::music;
use synthrec::playback::PlaybackController;
use synthrec::recording::RecordingSession;
use synthrec::tone::{CpalToneEngine, SilentToneEngine, ToneEngine};

fn print_usage() {
    println!("SYNTHREC - Note-Event Recorder/Player");
    println!();
    println!("Usage: synthrec [OPTIONS]");
    println!();
    println!("Options:");
    println!("  --demo              Record a scripted riff and play it back");
    println!("  --export <DIR>      Record the riff and write a JSON sequence export");
    println!("  --config <FILE>     Load recorder settings from a YAML file");
    println!("  --silent            Use the silent tone engine (no audio device)");
    println!("  --help              Show this help message");
}

/// Pick the cpal engine, falling back to the silent one when no device exists
fn make_engine(config: &RecorderConfig, silent: bool) -> Box<dyn ToneEngine> {
    if silent {
        return Box::new(SilentToneEngine);
    }
    match CpalToneEngine::new(config.waveform, config.gain) {
        Ok(engine) => Box::new(engine),
        Err(e) => {
            warn!("tone engine unavailable ({}), continuing silently", e);
            Box::new(SilentToneEngine)
        }
    }
}

/// Record a short scripted riff in real time
fn record_riff(config: &RecorderConfig) -> RecordingSession {
    let mut session = RecordingSession::with_max_duration(config.max_duration());

    let riff = [("C4", 200u64), ("E4", 200), ("G4", 200), ("C5", 400)];

    println!("Recording riff...");
    let _ = session.start();

    for (note, hold_ms) in riff {
        let frequency = music::frequency_of(note).expect("riff uses keyboard notes");
        session.record_note_on(note, frequency);
        thread::sleep(Duration::from_millis(hold_ms));
        session.record_note_off(note);
        thread::sleep(Duration::from_millis(60));
        session.tick();
    }

    let _ = session.stop();
    println!(
        "Recorded {} events over {}ms",
        session.events().len(),
        session.duration_ms()
    );
    session
}

/// Play a frozen session through the tone engine
fn play_session(config: &RecorderConfig, session: &RecordingSession, silent: bool) {
    let engine = make_engine(config, silent);
    let mut controller = PlaybackController::with_tail(engine, config.playback_tail());

    if !controller.play(session).started() {
        println!("Nothing to play");
        return;
    }

    println!("Playing back...");
    while controller.poll() {
        let sleep_for = controller
            .time_to_next(Instant::now())
            .unwrap_or(Duration::from_millis(5))
            .clamp(Duration::from_millis(1), Duration::from_millis(20));
        thread::sleep(sleep_for);
    }
    println!("Playback finished");
}

fn run_demo(config: &RecorderConfig, export_dir: Option<&Path>, silent: bool) -> Result<()> {
    let session = record_riff(config);

    play_session(config, &session, silent);

    let exporter = Exporter::new(config.title.clone());
    println!("Share summary: {}", exporter.share_summary(&session)?);

    if let Some(dir) = export_dir {
        // Raw audio capture is unavailable here, so this writes the JSON sequence
        let path = exporter.export_to_dir(&session, None, dir)?;
        println!("Export written to {}", path.display());
    }

    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let args: Vec<String> = std::env::args().collect();

    let mut demo = false;
    let mut export_dir: Option<String> = None;
    let mut config_path: Option<String> = None;
    let mut silent = false;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--demo" => demo = true,
            "--export" => {
                i += 1;
                match args.get(i) {
                    Some(dir) => export_dir = Some(dir.clone()),
                    None => {
                        eprintln!("--export requires a directory");
                        print_usage();
                        std::process::exit(1);
                    }
                }
            }
            "--config" => {
                i += 1;
                match args.get(i) {
                    Some(path) => config_path = Some(path.clone()),
                    None => {
                        eprintln!("--config requires a file");
                        print_usage();
                        std::process::exit(1);
                    }
                }
            }
            "--silent" => silent = true,
            "--help" => {
                print_usage();
                return Ok(());
            }
            other => {
                eprintln!("Unknown option: {}", other);
                print_usage();
                std::process::exit(1);
            }
        }
        i += 1;
    }

    let config = match config_path {
        Some(path) => RecorderConfig::load(path)?,
        None => RecorderConfig::default(),
    };

    if demo || export_dir.is_some() {
        run_demo(&config, export_dir.as_deref().map(Path::new), silent)
    } else {
        print_usage();
        Ok(())
    }
}
