//! votcp-core: stop-interval preparation for Voice Onset Time prediction.
//!
//! This crate turns a forced-aligned Praat TextGrid into per-speaker `stops`
//! tiers that an external VOT predictor (AutoVOT) can consume, then drives
//! that predictor over the matching audio.
//!
//! # Architecture
//!
//! A recording flows through these stages:
//!
//! - [`category`]: resolves the requested stop symbols and padding
//! - [`speaker`]: validates tier names and pairs word/phone tiers per speaker
//! - [`extract`]: keeps word-initial phones matching the stop filter
//! - [`repair`]: pads intervals and resolves length/proximity conflicts
//! - [`synth`]: adds the repaired intervals back as `stops` tiers
//! - [`predict`]: renders 16kHz audio and calls a [`traits::VotPredictor`]
//!
//! # Quick Start
//!
//! ```ignore
//! use votcp_core::category::{Padding, StopFilter};
//! use votcp_core::predict::{AutoVotCommand, PredictionConfig, get_predictions};
//! use votcp_core::synth::add_stop_tiers;
//! use votcp_core::textgrid::TextGrid;
//!
//! let mut tg = TextGrid::from_file("rec.TextGrid")?;
//! let tags = add_stop_tiers(&mut tg, &StopFilter::voiceless(), Padding::ZERO, "rec.TextGrid")?;
//! tg.save("output/rec_output.TextGrid")?;
//!
//! let config = PredictionConfig::default();
//! get_predictions(
//!     &AutoVotCommand::default(),
//!     "rec.wav".as_ref(),
//!     &tags,
//!     "output/rec_output.TextGrid".as_ref(),
//!     &config,
//! )?;
//! ```

pub mod audio;
pub mod category;
pub mod error;
pub mod extract;
pub mod predict;
pub mod repair;
pub mod speaker;
pub mod synth;
pub mod textgrid;
pub mod traits;
