//! Voxscript TTS worker binary.
//!
//! Speaks the line-delimited JSON protocol on stdin/stdout and drives a
//! local espeak-ng install. Logs go to stderr — stdout belongs to the
//! protocol and must stay clean.
//!
//! Usage:
//!   voxscript-worker
//!   voxscript-worker --espeak /opt/espeak/bin/espeak-ng
//!
//! Probe it by hand:
//!   echo '{"command":"meta"}' | voxscript-worker

use std::io;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt};

use voxscript_tts::Interpreter;

mod espeak;

use espeak::EspeakEngine;

/// Speech-synthesis worker for voxscript.
#[derive(Parser, Debug)]
#[command(name = "voxscript-worker")]
#[command(about = "TTS worker speaking line-delimited JSON on stdio")]
struct Args {
    /// espeak-ng executable to drive.
    #[arg(long, default_value = "espeak-ng")]
    espeak: String,
}

fn main() -> Result<()> {
    // Log to stderr — stdout carries the protocol.
    fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(io::stderr)
        .with_ansi(false)
        .init();

    let args = Args::parse();
    tracing::info!(espeak = %args.espeak, "voxscript-worker ready");

    let engine = EspeakEngine::new(args.espeak);
    let mut interpreter = Interpreter::new(env!("CARGO_PKG_VERSION"), engine);
    interpreter.run(io::stdin().lock(), io::stdout().lock())?;

    tracing::info!("voxscript-worker shutting down");
    Ok(())
}
