//! CLI Command Implementations
//!
//! Renders an explosion from the parsed command line and writes it out.

use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use log::info;
use sha2::{Digest, Sha256};

use super::Cli;
use crate::dsp::NoiseSource;
use crate::engine::{export_wav, ExportFormat};
use crate::error::{ExplodeError, Result};
use crate::synth::{ExplosionComposer, ExplosionDef, Stage};

/// What a finished render produced
#[derive(Debug, Clone)]
pub struct RenderReport {
    pub output: PathBuf,
    pub def: ExplosionDef,
    pub seed: u64,
    pub samples: usize,
    pub duration_secs: f64,
    pub peak: f32,
    pub checksum: String,
    pub trace: Vec<Stage>,
}

/// Render an explosion and write it to the output file.
pub fn generate(cli: &Cli) -> Result<RenderReport> {
    let format = ExportFormat::new(cli.bit_depth);
    format.validate()?;
    let mut def = cli.explosion_def()?;

    let mut noise = match cli.seed {
        Some(seed) => NoiseSource::seeded(seed),
        None => NoiseSource::from_clock(),
    };
    info!("Using seed {}", noise.seed());

    if cli.mutate {
        def = def.mutated(&mut noise);
        info!("Mutated parameters: {:?}", def);
    }

    if let Some(path) = &cli.save_preset {
        def.save_preset(path)?;
        info!("Saved preset to {}", path.display());
    }

    let seed = noise.seed();
    let mut composer = ExplosionComposer::new(def.clone(), noise)?;
    let explosion = composer.compose()?;

    export_wav(&explosion, &cli.output, format)?;
    let checksum = calculate_checksum(&cli.output)?;

    Ok(RenderReport {
        output: cli.output.clone(),
        def,
        seed,
        samples: explosion.len(),
        duration_secs: explosion.duration_secs(),
        peak: explosion.peak(),
        checksum,
        trace: composer.trace().to_vec(),
    })
}

/// Print a finished render to stdout.
pub fn print_report(report: &RenderReport) {
    println!("Saved output in '{}'", report.output.display());
    println!("SHA-256: {}", report.checksum);
    println!();
    println!("--- Render ---");
    println!("Seed: {}", report.seed);
    println!("Samples: {}", report.samples);
    println!("Duration: {:.2}s", report.duration_secs);
    println!("Peak: {:.4}", report.peak);

    let stages: Vec<String> = report.trace.iter().map(|s| s.to_string()).collect();
    println!("Stages: {}", stages.join(" -> "));
}

/// Recovery hints for a failed run, one `  - ` line each after a header
///
/// Empty when the error has no hints.
pub fn recovery_hints(err: &ExplodeError) -> String {
    let suggestions = err.recovery_suggestions();
    if suggestions.is_empty() {
        return String::new();
    }

    let mut hints = format!("Suggestions ({}):", err.error_code());
    for suggestion in suggestions {
        hints.push_str("\n  - ");
        hints.push_str(suggestion);
    }
    hints
}

/// SHA-256 of a file, as lowercase hex
pub fn calculate_checksum(path: &Path) -> Result<String> {
    let mut file = fs::File::open(path)?;
    let mut hasher = Sha256::new();
    let mut buffer = [0u8; 8192];

    loop {
        let bytes_read = file.read(&mut buffer)?;
        if bytes_read == 0 {
            break;
        }
        hasher.update(&buffer[..bytes_read]);
    }

    Ok(format!("{:x}", hasher.finalize()))
}
