//! Subcommand implementations.

use crate::config::AppConfig;
use anyhow::{Context, Result};
use goldilock_door::{AccessOutcome, DoorController};
use goldilock_hardware::mock::MockRelay;
use goldilock_hardware::{
    AnyEdgeSource, AnyLockActuator, LineEdgeSource, ReaderEvent, ReaderManager,
};
use goldilock_wiegand::{BitStream, FormatCatalog, FormatResolver, Resolution};
use std::fmt::Write as _;
use tracing::{debug, error, info, warn};

/// `goldilock decode`
pub fn decode(config: &AppConfig, bits: &str, json: bool) -> Result<()> {
    let stream: BitStream = bits
        .parse()
        .with_context(|| format!("Cannot read frame '{bits}'"))?;
    let resolution = FormatResolver::new(config.catalog()).resolve(&stream);

    if json {
        println!("{}", serde_json::to_string_pretty(&resolution)?);
    } else {
        println!("{}", render_resolution(&stream, &resolution));
    }
    Ok(())
}

/// `goldilock formats`
pub fn formats(config: &AppConfig) -> Result<()> {
    print!("{}", render_catalog(&config.catalog()));
    Ok(())
}

/// `goldilock run`
pub async fn run(config: &AppConfig) -> Result<()> {
    let catalog = config.catalog();
    info!(
        version = goldilock_core::VERSION,
        location = %config.location,
        formats = catalog.len(),
        credentials = config.credentials.len(),
        "Goldilock starting"
    );
    for length in catalog.ambiguous_lengths() {
        warn!(bits = length, "Several formats share this length; the first listed wins");
    }

    let mut manager = ReaderManager::new(config.reader_config(), FormatResolver::new(catalog));
    manager.register_source(AnyEdgeSource::Lines(LineEdgeSource::stdin(config.line_gap())));
    let mut events = manager.start();

    let (relay, _pulses) = MockRelay::with_name(format!("{} relay", config.location));
    let mut door = DoorController::new(
        config.allow_list(),
        AnyLockActuator::Mock(relay),
        config.door_config(),
    );

    let mut stats = RunStats::default();
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            event = events.recv() => match event {
                Some(ReaderEvent::FrameResolved { frame, resolution }) => {
                    info!(bits = frame.len(), "Read {} bits", frame.len());
                    if frame.overflow() > 0 {
                        warn!(dropped = frame.overflow(), "Frame exceeded the bit buffer");
                    }
                    debug!(frame = %frame.bits(), captured_at = %frame.captured_at(), "Frame");

                    match door.handle(&resolution).await {
                        Ok(outcome) => stats.record(&outcome),
                        Err(e) => {
                            error!(error = %e, "Door action failed");
                            stats.failed += 1;
                        }
                    }
                }
                Some(ReaderEvent::DeviceError { device, error }) => {
                    error!(device = %device, error = %error, "Reader failed");
                }
                Some(ReaderEvent::SourceClosed) | None => {
                    info!("Input closed");
                    break;
                }
                Some(other) => debug!(event = ?other, "Unhandled reader event"),
            },
            result = &mut shutdown => {
                result.context("Failed to listen for Ctrl-C")?;
                info!("Interrupted");
                break;
            }
        }
    }

    events.shutdown().await?;
    info!(
        frames = stats.frames(),
        unlocked = stats.unlocked,
        denied = stats.denied,
        ignored = stats.ignored,
        failed = stats.failed,
        "Goldilock stopped"
    );
    Ok(())
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct RunStats {
    unlocked: usize,
    denied: usize,
    ignored: usize,
    failed: usize,
}

impl RunStats {
    fn record(&mut self, outcome: &AccessOutcome) {
        match outcome {
            AccessOutcome::Unlocked { .. } => self.unlocked += 1,
            AccessOutcome::Denied { .. } => self.denied += 1,
            AccessOutcome::Ignored { .. } => self.ignored += 1,
        }
    }

    fn frames(&self) -> usize {
        self.unlocked + self.denied + self.ignored + self.failed
    }
}

fn render_resolution(stream: &BitStream, resolution: &Resolution) -> String {
    match resolution {
        Resolution::Decoded(code) => format!(
            "{} bits: {}\n  Facility Code: {}\n  TagID: {}",
            stream.len(),
            code.format_name,
            code.facility_code,
            code.card_code
        ),
        Resolution::Unrecognized { length } => {
            format!("{length} bits: unknown card format")
        }
    }
}

fn render_catalog(catalog: &FormatCatalog) -> String {
    let mut out = String::new();
    for (index, format) in catalog.iter().enumerate() {
        let _ = writeln!(out, "{}. {format}", index + 1);
    }
    for length in catalog.ambiguous_lengths() {
        let _ = writeln!(
            out,
            "note: {length}-bit frames match more than one format; the first listed wins"
        );
    }
    out
}
