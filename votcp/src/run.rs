//! Run subcommand - measure VOT for one wav/TextGrid pair.

use crate::config::{PrepArgs, PrepConfig};
use color_eyre::Section;
use eyre::{Context, OptionExt, Report, Result, eyre};
use std::path::{Path, PathBuf};
use votcp_core::category::{Padding, StopFilter};
use votcp_core::error::{AudioError, Error, PredictError, TierError};
use votcp_core::predict::{PredictionSummary, get_predictions};
use votcp_core::synth::add_stop_tiers;
use votcp_core::textgrid::TextGrid;
use votcp_core::traits::VotPredictor;

pub const WAV_EXTENSION: &str = "wav";
pub const TEXTGRID_EXTENSION: &str = "TextGrid";

/// CLI arguments for single-pair processing.
#[derive(clap::Args, Debug)]
pub struct Args {
    /// Recording with a '.wav' extension
    pub wav: PathBuf,

    /// Forced-aligned annotation with a '.TextGrid' extension
    pub textgrid: PathBuf,

    #[command(flatten)]
    pub prep: PrepArgs,
}

/// Resolved configuration for single-pair processing.
#[derive(Debug)]
pub struct Config {
    pub wav: PathBuf,
    pub textgrid: PathBuf,
    pub prep: PrepConfig,
}

impl TryFrom<Args> for Config {
    type Error = eyre::Error;

    fn try_from(args: Args) -> Result<Self> {
        Ok(Self {
            wav: args.wav,
            textgrid: args.textgrid,
            prep: args.prep.try_into()?,
        })
    }
}

pub fn execute(config: Config) -> Result<()> {
    process_pair(
        &config.prep.predictor,
        &config.wav,
        &config.textgrid,
        &config.prep,
    )?;
    Ok(())
}

/// Annotated TextGrid written for one recording.
#[derive(Debug)]
pub struct PairOutput {
    pub textgrid: PathBuf,
    pub stop_tiers: Vec<String>,
    pub summary: PredictionSummary,
}

/// Prepare stop tiers for a pair, save them, then obtain predictions.
///
/// Failures are logged inside the `recording` span before being returned.
pub fn process_pair<P: VotPredictor + ?Sized>(
    predictor: &P,
    wav: &Path,
    textgrid: &Path,
    config: &PrepConfig,
) -> Result<PairOutput> {
    let wav_name = file_name(wav);
    let textgrid_name = file_name(textgrid);

    let span = tracing::info_span!("recording", wav = %wav_name, textgrid = %textgrid_name);
    let _enter = span.enter();

    prepare_and_predict(predictor, wav, textgrid, config, &wav_name, &textgrid_name)
        .inspect_err(|e| tracing::error!("{e:#}"))
}

fn prepare_and_predict<P: VotPredictor + ?Sized>(
    predictor: &P,
    wav: &Path,
    textgrid: &Path,
    config: &PrepConfig,
    wav_name: &str,
    textgrid_name: &str,
) -> Result<PairOutput> {
    check_extensions(wav, textgrid)?;
    tracing::info!("Processing {wav_name} and {textgrid_name}...");

    let padding = Padding::from_millis(config.start_padding_ms, config.end_padding_ms);
    let filter = StopFilter::resolve(&config.stops, textgrid_name);

    std::fs::create_dir_all(&config.output_directory).wrap_err_with(|| {
        format!(
            "failed to create output directory: {:?}",
            config.output_directory.display()
        )
    })?;

    let mut tg = TextGrid::from_file(textgrid)
        .wrap_err_with(|| format!("failed to read TextGrid: {:?}", textgrid.display()))?;

    let tags = add_stop_tiers(&mut tg, &filter, padding, textgrid_name)
        .map_err(|e| with_suggestion(e, textgrid_name))?;

    let stem = textgrid
        .file_stem()
        .ok_or_eyre("TextGrid path has no file name")?
        .to_string_lossy();
    let output = config
        .output_directory
        .join(format!("{stem}_output.{TEXTGRID_EXTENSION}"));

    tracing::info!(path = ?output.display(), "write annotated TextGrid");
    tg.save(&output)
        .wrap_err_with(|| format!("failed to write TextGrid: {:?}", output.display()))?;

    let summary = get_predictions(predictor, wav, &tags, &output, &config.prediction)
        .map_err(|e| with_suggestion(e, textgrid_name))
        .wrap_err_with(|| {
            format!("something went wrong while obtaining VOT predictions for {wav_name} and {textgrid_name}")
        })?;

    tracing::info!("Process for {wav_name} and {textgrid_name} is complete.");

    Ok(PairOutput {
        textgrid: output,
        stop_tiers: tags.iter().map(|tag| tag.stops_tier()).collect(),
        summary,
    })
}

/// Both inputs must carry their exact extension.
fn check_extensions(wav: &Path, textgrid: &Path) -> Result<()> {
    let has = |path: &Path, ext: &str| path.extension().is_some_and(|e| e == ext);

    if has(wav, WAV_EXTENSION) && has(textgrid, TEXTGRID_EXTENSION) {
        return Ok(());
    }

    Err(eyre!(
        "{} must be a wav file and {} must be a TextGrid file. One or both files do not meet format requirements.",
        file_name(wav),
        file_name(textgrid)
    )
    .suggestion("pass the audio as '<name>.wav' and the annotation as '<name>.TextGrid'"))
}

/// Attach a fix-it hint to errors the user can resolve in Praat.
fn with_suggestion(err: Error, file: &str) -> Report {
    let hint = match &err {
        Error::Tier(TierError::ReservedStopsSuffix { .. }) => {
            Some("rename the tier so that it does not end in 'stops'")
        }
        Error::Tier(TierError::EmptyName { .. }) => Some("give every tier a name"),
        Error::Tier(TierError::DuplicateName { .. }) => {
            Some("tier names are compared case-insensitively; make them distinct")
        }
        Error::Tier(TierError::Unpaired { .. } | TierError::CountMismatch { .. }) => {
            Some("name each speaker's tiers '<speaker> - words' and '<speaker> - phones'")
        }
        Error::Repair(_) => Some("reduce the padding or correct the boundaries in Praat"),
        Error::Audio(AudioError::ChannelCountMismatch { .. }) => {
            Some("drop --distinct-channels or give each speaker their own channel")
        }
        Error::Predict(PredictError::Spawn { .. }) => {
            Some("set --python and --autovot-script to a working AutoVOT install")
        }
        _ => None,
    };

    let report = Report::new(err).wrap_err(format!("process incomplete for {file}"));
    match hint {
        Some(hint) => report.suggestion(hint),
        None => report,
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned())
}
