//! rpl - replica CLI
//!
//! Record, replay and inspect mouse/keyboard macros from the terminal.

use anyhow::Result;
use clap::{Parser, Subcommand};
use replica::prelude::*;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "rpl")]
#[command(about = "replica - record and replay input macros")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Record a macro until Ctrl+C or the hotkey stops it
    Record {
        /// Output file; defaults to a timestamped name in the current directory
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Key that toggles recording
        #[arg(long, default_value = "f8")]
        hotkey: String,
        /// Do not install the recording hotkey
        #[arg(long)]
        no_hotkey: bool,
    },
    /// Replay a macro file
    Play {
        file: PathBuf,
        /// Playback speed multiplier
        #[arg(short, long, default_value = "1.0")]
        speed: f64,
        /// How many times to replay the sequence
        #[arg(short, long, default_value = "1")]
        repeats: u32,
        /// Seconds to wait before the first event
        #[arg(short, long, default_value = "2")]
        delay: u64,
    },
    /// Show macro file info
    Show {
        file: PathBuf,
        /// Print every event
        #[arg(long)]
        all: bool,
        /// Print events as JSON lines
        #[arg(long)]
        json: bool,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Record { output, hotkey, no_hotkey } => record(output, &hotkey, !no_hotkey),
        Commands::Play { file, speed, repeats, delay } => play(&file, speed, repeats, delay),
        Commands::Show { file, all, json } => show(&file, all, json),
    };
    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn record(output: Option<PathBuf>, hotkey: &str, hotkey_enabled: bool) -> Result<()> {
    let key = KeyToken::from_str_token(hotkey)
        .ok_or_else(|| anyhow::anyhow!("hotkey name must not be empty"))?;
    let controller = SessionController::with_options(
        RdevHooks::new()?,
        RdevEmitter,
        SystemClock,
        ControllerOptions { hotkey: key.clone(), ..Default::default() },
    );
    if hotkey_enabled {
        controller.set_hotkey_enabled(true)?;
        println!("Recording (press {} or Ctrl+C to stop)", key);
    } else {
        println!("Recording (Ctrl+C to stop)");
    }
    controller.start_recording()?;

    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    ctrlc::set_handler(move || {
        r.store(false, Ordering::SeqCst);
    })?;

    let mut count = 0;
    while running.load(Ordering::SeqCst) && controller.state() == SessionState::Recording {
        let seen = controller.log_len();
        if seen != count {
            count = seen;
            print!("\r{} events", count);
            io::stdout().flush()?;
        }
        thread::sleep(Duration::from_millis(50));
    }
    controller.stop_recording()?;

    let captured = controller.snapshot().len();
    println!("\n{} events recorded", captured);

    let path = output.unwrap_or_else(storage::default_filename);
    controller.save_macro(&path)?;
    println!("Saved: {}", path.display());
    Ok(())
}

fn play(file: &Path, speed: f64, repeats: u32, delay: u64) -> Result<()> {
    let controller = SessionController::new(RdevHooks::new()?, RdevEmitter, SystemClock);
    let count = controller.load_macro(file)?;
    println!("Replaying {} ({} events) at {}x speed...", file.display(), count, speed);
    if delay > 0 {
        println!("Starting in {} seconds...", delay);
        thread::sleep(Duration::from_secs(delay));
    }

    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    ctrlc::set_handler(move || {
        r.store(false, Ordering::SeqCst);
    })?;

    controller.play_with(PlaybackConfig::new(speed, repeats))?;
    while controller.state() == SessionState::Playing {
        if !running.load(Ordering::SeqCst) {
            controller.stop_playback()?;
            println!("Cancelled.");
            return Ok(());
        }
        thread::sleep(Duration::from_millis(50));
    }
    println!("Done.");
    Ok(())
}

fn show(file: &Path, all: bool, json: bool) -> Result<()> {
    let log = storage::load(file)?;
    if json {
        for event in &log.events {
            println!("{}", serde_json::to_string(event)?);
        }
        return Ok(());
    }

    println!("File: {}", file.display());
    println!("Events: {}", log.len());
    println!("Duration: {:.3}s", log.duration());
    let (mut moves, mut clicks, mut keys) = (0, 0, 0);
    for e in &log.events {
        match &e.kind {
            EventKind::PointerMove { .. } => moves += 1,
            EventKind::PointerButton { .. } => clicks += 1,
            EventKind::KeyChange { .. } => keys += 1,
        }
    }
    println!("\nSummary: {} moves, {} clicks, {} keys", moves, clicks, keys);
    if all {
        for (i, e) in log.events.iter().enumerate() {
            println!("{}: {:?}", i, e);
        }
    }
    Ok(())
}
