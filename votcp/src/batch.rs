//! Batch subcommand - process every wav/TextGrid pair in a directory.

use crate::config::{PrepArgs, PrepConfig};
use crate::run::{TEXTGRID_EXTENSION, WAV_EXTENSION, process_pair};
use color_eyre::Section;
use eyre::{Context, Result, bail, eyre};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use votcp_core::traits::VotPredictor;

/// CLI arguments for batch processing.
#[derive(clap::Args, Debug)]
pub struct Args {
    /// Directory holding '<name>.wav' and '<name>.TextGrid' pairs
    pub dir: PathBuf,

    #[command(flatten)]
    pub prep: PrepArgs,
}

/// Resolved configuration for batch processing.
#[derive(Debug)]
pub struct Config {
    pub dir: PathBuf,
    pub prep: PrepConfig,
}

impl TryFrom<Args> for Config {
    type Error = eyre::Error;

    fn try_from(args: Args) -> Result<Self> {
        Ok(Self {
            dir: args.dir,
            prep: args.prep.try_into()?,
        })
    }
}

pub fn execute(config: Config) -> Result<()> {
    let report = process_dir(&config.prep.predictor, &config.dir, &config.prep)?;

    if report.failed > 0 {
        bail!(
            "{} of {} recording(s) in {:?} could not be processed",
            report.failed,
            report.processed + report.failed,
            config.dir.display()
        );
    }

    Ok(())
}

/// Outcome of a batch run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub processed: usize,
    pub failed: usize,
}

/// Audio and annotation found for one stem.
#[derive(Debug, Default)]
struct Pair {
    wav: Option<PathBuf>,
    textgrid: Option<PathBuf>,
}

/// Process every complete pair in `dir`, in stem order.
///
/// A failing pair is logged and skipped; only an unreadable directory is fatal.
pub fn process_dir<P: VotPredictor + ?Sized>(
    predictor: &P,
    dir: &Path,
    config: &PrepConfig,
) -> Result<BatchReport> {
    let pairs = collect_pairs(dir)?;
    tracing::info!(dir = ?dir.display(), stems = pairs.len(), "starting batch");

    let mut report = BatchReport::default();

    for (stem, pair) in pairs {
        let (Some(wav), Some(textgrid)) = (pair.wav, pair.textgrid) else {
            tracing::debug!(stem = %stem, "skipping incomplete pair");
            continue;
        };

        // errors are already logged inside the recording span
        match process_pair(predictor, &wav, &textgrid, config) {
            Ok(_) => report.processed += 1,
            Err(_) => report.failed += 1,
        }
    }

    tracing::info!(
        processed = report.processed,
        failed = report.failed,
        "batch complete"
    );

    Ok(report)
}

/// Group `.wav` and `.TextGrid` files by stem.
fn collect_pairs(dir: &Path) -> Result<BTreeMap<String, Pair>> {
    if !dir.is_dir() {
        return Err(eyre!(
            "the input directory {:?} does not exist",
            dir.display()
        )
        .suggestion("pass an existing directory to 'votcp batch'"));
    }

    let mut pairs: BTreeMap<String, Pair> = BTreeMap::new();

    for entry in std::fs::read_dir(dir)
        .wrap_err_with(|| format!("failed to read directory: {:?}", dir.display()))?
    {
        let path = entry?.path();
        let (Some(stem), Some(ext)) = (path.file_stem(), path.extension()) else {
            continue;
        };
        let stem = stem.to_string_lossy().into_owned();

        if ext == WAV_EXTENSION {
            pairs.entry(stem).or_default().wav = Some(path);
        } else if ext == TEXTGRID_EXTENSION {
            pairs.entry(stem).or_default().textgrid = Some(path);
        }
    }

    Ok(pairs)
}
