//! Seam between stop-tier preparation and the external VOT predictor.

use crate::error::PredictError;
use std::path::Path;

/// One predictor call: a stop tier, the audio it was drawn from, and the
/// annotation file the predictor writes its tier into.
#[derive(Clone, Copy, Debug)]
pub struct PredictionRequest<'a> {
    /// Stop tier to predict on
    pub tier: &'a str,
    /// Single-channel 16kHz audio
    pub audio: &'a Path,
    /// Annotation file, mutated in place
    pub textgrid: &'a Path,
    /// Trained classifier
    pub model: &'a Path,
}

/// Black-box VOT predictor.
///
/// Implementations add a prediction tier to `request.textgrid` and report
/// nothing else. A returned error aborts the recording.
pub trait VotPredictor {
    fn predict(&self, request: &PredictionRequest<'_>) -> Result<(), PredictError>;
}
