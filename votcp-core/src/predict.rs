//! Prediction invoker: audio rendering, predictor calls and tier relabelling.

use crate::audio::{AudioBuffer, SAMPLE_RATE, write_mono_wav};
use crate::error::{AudioError, PredictError, Result};
use crate::speaker::{PREDICTION_TIER, SpeakerTag};
use crate::traits::{PredictionRequest, VotPredictor};
use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

/// AutoVOT's pretrained classifier, relative to the working directory.
pub const DEFAULT_MODEL: &str = "autovot/models/vot_predictor.amanda.max_num_instances_1000.model";

/// AutoVOT's decoding entry point.
pub const DEFAULT_SCRIPT: &str = "autovot/auto_vot_decode.py";

pub const DEFAULT_PYTHON: &str = "python";

/// Label marking intervals the predictor should consider.
pub const VOT_MARK: &str = "*";

/// Runs AutoVOT's decoder as a child process.
#[derive(Clone, Debug)]
pub struct AutoVotCommand {
    pub python: PathBuf,
    pub script: PathBuf,
}

impl Default for AutoVotCommand {
    fn default() -> Self {
        Self {
            python: DEFAULT_PYTHON.into(),
            script: DEFAULT_SCRIPT.into(),
        }
    }
}

impl VotPredictor for AutoVotCommand {
    fn predict(&self, request: &PredictionRequest<'_>) -> std::result::Result<(), PredictError> {
        tracing::debug!(
            python = %self.python.display(),
            script = %self.script.display(),
            tier = request.tier,
            "invoking AutoVOT"
        );

        let status = Command::new(&self.python)
            .arg(&self.script)
            .args(["--vot_tier", request.tier, "--vot_mark", VOT_MARK])
            .arg(request.audio)
            .arg(request.textgrid)
            .arg(request.model)
            .arg("--ignore_existing_tiers")
            .status()
            .map_err(|source| PredictError::Spawn {
                program: self.python.clone(),
                source,
            })?;

        if !status.success() {
            return Err(PredictError::Failed {
                tier: request.tier.to_string(),
                status: status.to_string(),
            });
        }

        Ok(())
    }
}

/// How audio channels map onto speakers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChannelMode {
    /// One shared rendering from this 1-based channel
    Preferred(u16),
    /// Channel `n` belongs to the `n`-th stop tier
    Distinct,
}

impl Default for ChannelMode {
    fn default() -> Self {
        Self::Preferred(1)
    }
}

#[derive(Clone, Debug)]
pub struct PredictionConfig {
    pub channel_mode: ChannelMode,
    pub model: PathBuf,
}

impl Default for PredictionConfig {
    fn default() -> Self {
        Self {
            channel_mode: ChannelMode::default(),
            model: DEFAULT_MODEL.into(),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PredictionSummary {
    pub invocations: usize,
    /// Prediction tier names rewritten with their speaker tag
    pub relabelled: usize,
}

/// Run the predictor once per stop tier against a 16kHz rendering of `wav`.
///
/// Temporary audio lives in a scoped directory removed on every exit path.
/// With more than one speaker, the predictor's generic tier names in
/// `textgrid` are rewritten afterwards, in invocation order.
pub fn get_predictions<P: VotPredictor + ?Sized>(
    predictor: &P,
    wav: &Path,
    tags: &[SpeakerTag],
    textgrid: &Path,
    config: &PredictionConfig,
) -> Result<PredictionSummary> {
    let file_name = wav.file_name().unwrap_or(OsStr::new("audio.wav"));
    let file = file_name.to_string_lossy();

    let audio = AudioBuffer::from_file(wav)?;

    if config.channel_mode == ChannelMode::Distinct && audio.channel_count() != tags.len() {
        return Err(AudioError::ChannelCountMismatch {
            channels: audio.channel_count(),
            tiers: tags.len(),
            file: file.into_owned(),
        }
        .into());
    }

    let temp_dir = tempfile::tempdir().map_err(PredictError::Io)?;
    let temp_wav = temp_dir.path().join(file_name);
    let audio = audio.resample(SAMPLE_RATE)?;

    let mut summary = PredictionSummary::default();
    let mut invoke = |tier: String| -> Result<()> {
        let request = PredictionRequest {
            tier: &tier,
            audio: &temp_wav,
            textgrid,
            model: &config.model,
        };
        tracing::info!(tier = %tier, "obtaining VOT predictions");
        predictor.predict(&request)?;
        summary.invocations += 1;
        Ok(())
    };

    match config.channel_mode {
        ChannelMode::Distinct => {
            for (channel, tag) in audio.channels.iter().zip(tags) {
                write_mono_wav(&temp_wav, channel, SAMPLE_RATE)?;
                invoke(tag.stops_tier())?;
            }
        }
        ChannelMode::Preferred(channel) => {
            let samples = match audio.channels.as_slice() {
                [mono] => mono.as_slice(),
                _ => audio.channel(channel)?,
            };
            write_mono_wav(&temp_wav, samples, SAMPLE_RATE)?;
            for tag in tags {
                invoke(tag.stops_tier())?;
            }
        }
    }

    temp_dir.close().map_err(PredictError::Io)?;

    if summary.invocations == 0 {
        return Err(PredictError::NoInvocation {
            file: file.into_owned(),
        }
        .into());
    }

    if tags.len() > 1 {
        summary.relabelled = relabel_prediction_tiers(textgrid, tags).map_err(PredictError::Io)?;
    }

    Ok(summary)
}

/// Give each generic prediction tier its speaker's name.
///
/// A text patch on the saved file: lines carrying the quoted tier name are
/// rewritten top to bottom, one per tag. Returns the number of lines patched.
pub fn relabel_prediction_tiers(path: &Path, tags: &[SpeakerTag]) -> std::io::Result<usize> {
    let text = fs::read_to_string(path)?;
    let quoted = format!("\"{PREDICTION_TIER}\"");

    let mut pending = tags.iter();
    let mut relabelled = 0;
    let mut leftover = 0;
    let mut patched = String::with_capacity(text.len() + tags.len() * 16);

    for line in text.split_inclusive('\n') {
        if line.contains(&quoted) {
            match pending.next() {
                Some(tag) => {
                    let name = format!("\"{}\"", tag.prediction_tier().replace('"', "\"\""));
                    patched.push_str(&line.replacen(&quoted, &name, 1));
                    relabelled += 1;
                    continue;
                }
                None => leftover += 1,
            }
        }
        patched.push_str(line);
    }

    if leftover > 0 {
        tracing::warn!(
            "{leftover} additional '{PREDICTION_TIER}' tier(s) in {} were left unchanged.",
            path.display()
        );
    }
    if relabelled < tags.len() {
        tracing::warn!(
            expected = tags.len(),
            found = relabelled,
            "fewer prediction tiers than speakers in {}",
            path.display()
        );
    }

    fs::write(path, patched)?;
    Ok(relabelled)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use hound::{SampleFormat, WavSpec, WavWriter};
    use std::cell::RefCell;
    use std::io::Write;

    /// Records each call and appends a prediction tier line like AutoVOT does.
    #[derive(Default)]
    struct RecordingPredictor {
        calls: RefCell<Vec<(String, PathBuf, f32)>>,
    }

    impl VotPredictor for RecordingPredictor {
        fn predict(&self, request: &PredictionRequest<'_>) -> std::result::Result<(), PredictError> {
            let audio = AudioBuffer::from_file(request.audio).unwrap();
            assert_eq!(audio.sample_rate, SAMPLE_RATE);
            assert_eq!(audio.channel_count(), 1);

            self.calls.borrow_mut().push((
                request.tier.to_string(),
                request.audio.to_path_buf(),
                audio.channels[0][0],
            ));

            let mut file = fs::OpenOptions::new().append(true).open(request.textgrid)?;
            writeln!(file, "        name = \"AutoVOT\"")?;
            Ok(())
        }
    }

    fn stereo_wav(dir: &Path) -> PathBuf {
        let path = dir.join("rec.wav");
        let spec = WavSpec {
            channels: 2,
            sample_rate: SAMPLE_RATE,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        };
        let mut writer = WavWriter::create(&path, spec).unwrap();
        for _ in 0..160 {
            writer.write_sample(8192_i16).unwrap();
            writer.write_sample(-8192_i16).unwrap();
        }
        writer.finalize().unwrap();
        path
    }

    fn tags(names: &[&str]) -> Vec<SpeakerTag> {
        names
            .iter()
            .map(|name| SpeakerTag::from_phone_tier(name))
            .collect()
    }

    fn config(channel_mode: ChannelMode) -> PredictionConfig {
        PredictionConfig {
            channel_mode,
            ..Default::default()
        }
    }

    #[test]
    fn distinct_channels_isolate_each_speaker() {
        let dir = tempfile::tempdir().unwrap();
        let wav = stereo_wav(dir.path());
        let textgrid = dir.path().join("rec_output.TextGrid");
        fs::write(&textgrid, "").unwrap();
        let predictor = RecordingPredictor::default();

        let summary = get_predictions(
            &predictor,
            &wav,
            &tags(&["a - phones", "b - phones"]),
            &textgrid,
            &config(ChannelMode::Distinct),
        )
        .unwrap();

        assert_eq!(summary.invocations, 2);
        assert_eq!(summary.relabelled, 2);

        let calls = predictor.calls.borrow();
        assert_eq!(calls[0].0, "a - stops");
        assert!(calls[0].2 > 0.2);
        assert_eq!(calls[1].0, "b - stops");
        assert!(calls[1].2 < -0.2);
        assert!(!calls[0].1.exists(), "temporary audio should be removed");

        let text = fs::read_to_string(&textgrid).unwrap();
        assert!(text.contains("\"a - AutoVOT\""));
        assert!(text.contains("\"b - AutoVOT\""));
    }

    #[test]
    fn preferred_channel_is_shared() {
        let dir = tempfile::tempdir().unwrap();
        let wav = stereo_wav(dir.path());
        let textgrid = dir.path().join("rec_output.TextGrid");
        fs::write(&textgrid, "").unwrap();
        let predictor = RecordingPredictor::default();

        let summary = get_predictions(
            &predictor,
            &wav,
            &tags(&["phones"]),
            &textgrid,
            &config(ChannelMode::Preferred(2)),
        )
        .unwrap();

        assert_eq!(summary, PredictionSummary { invocations: 1, relabelled: 0 });
        assert!(predictor.calls.borrow()[0].2 < -0.2);
        assert!(fs::read_to_string(&textgrid).unwrap().contains("\"AutoVOT\""));
    }

    #[test]
    fn channel_count_mismatch_stops_before_invoking() {
        let dir = tempfile::tempdir().unwrap();
        let wav = stereo_wav(dir.path());
        let textgrid = dir.path().join("rec_output.TextGrid");
        fs::write(&textgrid, "").unwrap();
        let predictor = RecordingPredictor::default();

        let result = get_predictions(
            &predictor,
            &wav,
            &tags(&["a - phones", "b - phones", "c - phones"]),
            &textgrid,
            &config(ChannelMode::Distinct),
        );

        assert!(matches!(
            result,
            Err(Error::Audio(AudioError::ChannelCountMismatch {
                channels: 2,
                tiers: 3,
                ..
            }))
        ));
        assert!(predictor.calls.borrow().is_empty());
    }

    #[test]
    fn no_tiers_means_no_predictions() {
        let dir = tempfile::tempdir().unwrap();
        let wav = stereo_wav(dir.path());
        let textgrid = dir.path().join("rec_output.TextGrid");
        fs::write(&textgrid, "").unwrap();

        let result = get_predictions(
            &RecordingPredictor::default(),
            &wav,
            &[],
            &textgrid,
            &PredictionConfig::default(),
        );

        assert!(matches!(
            result,
            Err(Error::Predict(PredictError::NoInvocation { .. }))
        ));
    }

    #[test]
    fn relabels_in_order_and_leaves_extras() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("grid.TextGrid");
        fs::write(
            &path,
            "name = \"words\"\nname = \"AutoVOT\"\ntext = \"AutoVOT rocks\"\nname = \"AutoVOT\"\nname = \"AutoVOT\"\n",
        )
        .unwrap();

        let count = relabel_prediction_tiers(&path, &tags(&["x phones", "y phones"])).unwrap();

        assert_eq!(count, 2);
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "name = \"words\"\nname = \"x AutoVOT\"\ntext = \"AutoVOT rocks\"\nname = \"y AutoVOT\"\nname = \"AutoVOT\"\n"
        );
    }

    #[test]
    fn relabel_doubles_quotes_in_speaker_names() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("grid.TextGrid");
        fs::write(&path, "name = \"AutoVOT\"\n").unwrap();

        relabel_prediction_tiers(&path, &tags(&["ann \"jr\" phones"])).unwrap();

        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "name = \"ann \"\"jr\"\" AutoVOT\"\n"
        );
    }

    #[test]
    fn autovot_command_defaults() {
        let command = AutoVotCommand::default();
        assert_eq!(command.python, Path::new("python"));
        assert_eq!(command.script, Path::new("autovot/auto_vot_decode.py"));
        assert_eq!(PredictionConfig::default().model, Path::new(DEFAULT_MODEL));
    }

    #[test]
    fn missing_interpreter_is_a_spawn_error() {
        let command = AutoVotCommand {
            python: "definitely-not-a-python-interpreter".into(),
            script: DEFAULT_SCRIPT.into(),
        };
        let request = PredictionRequest {
            tier: "stops",
            audio: Path::new("a.wav"),
            textgrid: Path::new("a.TextGrid"),
            model: Path::new(DEFAULT_MODEL),
        };

        assert!(matches!(
            command.predict(&request),
            Err(PredictError::Spawn { .. })
        ));
    }
}
