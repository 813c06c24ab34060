//! Options shared by `run` and `batch`, and their resolved form.

use eyre::{Result, ensure};
use std::path::PathBuf;
use votcp_core::predict::{
    AutoVotCommand, ChannelMode, DEFAULT_MODEL, DEFAULT_PYTHON, DEFAULT_SCRIPT, PredictionConfig,
};

/// Stop selection, padding and predictor options.
#[derive(clap::Args, Clone, Debug)]
pub struct PrepArgs {
    /// Stop symbols to measure (default: every IPA voiceless stop)
    #[arg(long, value_name = "SYM", num_args = 1..)]
    pub stops: Vec<String>,

    /// Directory for the annotated TextGrids
    #[arg(long, default_value = "output")]
    pub output_directory: PathBuf,

    /// Milliseconds added to each stop's start, between -25 and 25
    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    pub start_padding: i32,

    /// Milliseconds added to each stop's end, between -25 and 25
    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    pub end_padding: i32,

    /// 1-based audio channel used when speakers share a channel
    #[arg(long, default_value_t = 1)]
    pub preferred_channel: u16,

    /// Each speaker has their own channel, in tier order
    #[arg(long)]
    pub distinct_channels: bool,

    /// AutoVOT classifier
    #[arg(long, default_value = DEFAULT_MODEL)]
    pub trained_model: PathBuf,

    /// Python interpreter with AutoVOT installed
    #[arg(long, default_value = DEFAULT_PYTHON)]
    pub python: PathBuf,

    /// AutoVOT decoding script
    #[arg(long, default_value = DEFAULT_SCRIPT)]
    pub autovot_script: PathBuf,
}

/// Resolved preparation settings.
///
/// Padding and stops stay raw: they are clamped and validated per recording
/// so the warnings name the file being processed.
#[derive(Clone, Debug)]
pub struct PrepConfig {
    pub stops: Vec<String>,
    pub output_directory: PathBuf,
    pub start_padding_ms: i32,
    pub end_padding_ms: i32,
    pub prediction: PredictionConfig,
    pub predictor: AutoVotCommand,
}

impl TryFrom<PrepArgs> for PrepConfig {
    type Error = eyre::Error;

    fn try_from(args: PrepArgs) -> Result<Self> {
        ensure!(
            args.preferred_channel >= 1,
            "--preferred-channel is 1-based, got {}",
            args.preferred_channel
        );

        let channel_mode = if args.distinct_channels {
            ChannelMode::Distinct
        } else {
            ChannelMode::Preferred(args.preferred_channel)
        };

        Ok(Self {
            stops: args.stops,
            output_directory: args.output_directory,
            start_padding_ms: args.start_padding,
            end_padding_ms: args.end_padding,
            prediction: PredictionConfig {
                channel_mode,
                model: args.trained_model,
            },
            predictor: AutoVotCommand {
                python: args.python,
                script: args.autovot_script,
            },
        })
    }
}
