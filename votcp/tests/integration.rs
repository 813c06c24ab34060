//! Integration tests for the votcp pipeline.

use clap::Parser;
use hound::{SampleFormat, WavSpec, WavWriter};
use std::cell::RefCell;
use std::path::{Path, PathBuf};
use votcp::batch::{BatchReport, process_dir};
use votcp::cli::{Cli, run_cli};
use votcp::config::PrepConfig;
use votcp::run::process_pair;
use votcp_core::error::PredictError;
use votcp_core::predict::{AutoVotCommand, ChannelMode, PredictionConfig};
use votcp_core::textgrid::{Interval, TextGrid, Tier, interval_tier, intervals};
use votcp_core::traits::{PredictionRequest, VotPredictor};

/// Stands in for AutoVOT: appends a generic prediction tier per call.
#[derive(Default)]
struct RecordingPredictor {
    tiers: RefCell<Vec<String>>,
    models: RefCell<Vec<PathBuf>>,
}

impl VotPredictor for RecordingPredictor {
    fn predict(&self, request: &PredictionRequest<'_>) -> Result<(), PredictError> {
        assert!(request.audio.exists(), "temporary audio missing");

        self.tiers.borrow_mut().push(request.tier.to_string());
        self.models.borrow_mut().push(request.model.to_path_buf());

        let mut tg = TextGrid::from_file(request.textgrid).unwrap();
        let (xmin, xmax) = (tg.xmin(), tg.xmax());
        tg.tiers_mut()
            .push(interval_tier("AutoVOT", xmin, xmax, &[]));
        tg.save(request.textgrid).unwrap();
        Ok(())
    }
}

fn write_wav(path: &Path, channels: u16, sample_rate: u32, secs: f32) {
    let spec = WavSpec {
        channels,
        sample_rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };
    let mut writer = WavWriter::create(path, spec).unwrap();
    let frames = (sample_rate as f32 * secs) as usize;
    for i in 0..frames {
        let t = i as f32 / sample_rate as f32;
        let sample = ((t * 440.0 * std::f32::consts::TAU).sin() * 8000.0) as i16;
        for _ in 0..channels {
            writer.write_sample(sample).unwrap();
        }
    }
    writer.finalize().unwrap();
}

fn tier(name: &str, intervals: &[(&str, f64, f64)]) -> Tier {
    let intervals: Vec<_> = intervals
        .iter()
        .map(|&(label, start, end)| Interval::new(label, start, end))
        .collect();
    interval_tier(name, 0.0, 2.0, &intervals)
}

fn write_two_speaker_textgrid(path: &Path) {
    let mut tg = TextGrid::new(0.0, 2.0).unwrap();
    tg.tiers_mut().extend([
        tier("Ann - words", &[("tapa", 0.1, 0.6)]),
        tier(
            "Ann - phones",
            &[("t", 0.1, 0.2), ("a", 0.2, 0.3), ("p", 0.3, 0.4), ("a", 0.4, 0.6)],
        ),
        tier("Bob - words", &[("kat", 1.0, 1.5)]),
        tier("Bob - phones", &[("k", 1.0, 1.1), ("at", 1.1, 1.5)]),
    ]);
    tg.save(path).unwrap();
}

fn prep(output: &Path, channel_mode: ChannelMode) -> PrepConfig {
    PrepConfig {
        stops: Vec::new(),
        output_directory: output.to_path_buf(),
        start_padding_ms: 0,
        end_padding_ms: 0,
        prediction: PredictionConfig {
            channel_mode,
            model: "models/custom.model".into(),
        },
        predictor: AutoVotCommand::default(),
    }
}

#[test]
fn run_prepares_tiers_and_relabels_predictions() {
    let dir = tempfile::tempdir().unwrap();
    let wav = dir.path().join("rec.wav");
    let textgrid = dir.path().join("rec.TextGrid");
    write_wav(&wav, 1, 44100, 2.0);
    write_two_speaker_textgrid(&textgrid);

    let output_dir = dir.path().join("output");
    let predictor = RecordingPredictor::default();

    let output = process_pair(
        &predictor,
        &wav,
        &textgrid,
        &prep(&output_dir, ChannelMode::Preferred(1)),
    )
    .unwrap();

    assert_eq!(output.textgrid, output_dir.join("rec_output.TextGrid"));
    assert_eq!(output.stop_tiers, ["ann - stops", "bob - stops"]);
    assert_eq!(output.summary.invocations, 2);
    assert_eq!(*predictor.tiers.borrow(), ["ann - stops", "bob - stops"]);
    assert!(
        predictor
            .models
            .borrow()
            .iter()
            .all(|model| model == Path::new("models/custom.model"))
    );

    let annotated = TextGrid::from_file(&output.textgrid).unwrap();
    let names: Vec<_> = annotated.tier_names().collect();
    assert_eq!(
        names,
        [
            "ann - words",
            "ann - phones",
            "bob - words",
            "bob - phones",
            "ann - stops",
            "bob - stops",
            "ann - AutoVOT",
            "bob - AutoVOT",
        ]
    );

    let ann = intervals(annotated.tier("ann - stops").unwrap()).unwrap();
    assert!(ann.iter().any(|i| i.label == "t"));
    assert!(ann.iter().all(|i| i.label != "p"));
}

#[test]
fn distinct_channel_mismatch_never_invokes_predictor() {
    let dir = tempfile::tempdir().unwrap();
    let wav = dir.path().join("rec.wav");
    let textgrid = dir.path().join("rec.TextGrid");
    write_wav(&wav, 1, 16000, 2.0);
    write_two_speaker_textgrid(&textgrid);

    let predictor = RecordingPredictor::default();

    let err = process_pair(
        &predictor,
        &wav,
        &textgrid,
        &prep(&dir.path().join("output"), ChannelMode::Distinct),
    )
    .unwrap_err();

    assert!(
        err.chain()
            .any(|e| e.to_string().contains("distinct channels enabled"))
    );
    assert!(predictor.tiers.borrow().is_empty());
}

#[test]
fn distinct_channels_run_once_per_speaker() {
    let dir = tempfile::tempdir().unwrap();
    let wav = dir.path().join("rec.wav");
    let textgrid = dir.path().join("rec.TextGrid");
    write_wav(&wav, 2, 16000, 2.0);
    write_two_speaker_textgrid(&textgrid);

    let predictor = RecordingPredictor::default();

    let output = process_pair(
        &predictor,
        &wav,
        &textgrid,
        &prep(&dir.path().join("output"), ChannelMode::Distinct),
    )
    .unwrap();

    assert_eq!(output.summary.invocations, 2);
    assert_eq!(*predictor.tiers.borrow(), ["ann - stops", "bob - stops"]);
}

#[test]
fn wrong_extension_fails_before_any_output() {
    let dir = tempfile::tempdir().unwrap();
    let wav = dir.path().join("rec.mp3");
    let textgrid = dir.path().join("rec.TextGrid");
    let output_dir = dir.path().join("output");

    let err = process_pair(
        &RecordingPredictor::default(),
        &wav,
        &textgrid,
        &prep(&output_dir, ChannelMode::Preferred(1)),
    )
    .unwrap_err();

    assert!(err.to_string().contains("format requirements"));
    assert!(!output_dir.exists());
}

#[test]
fn batch_skips_incomplete_pairs_and_continues_after_failures() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("corpus");
    std::fs::create_dir(&input).unwrap();

    write_wav(&input.join("a.wav"), 1, 16000, 2.0);
    write_two_speaker_textgrid(&input.join("a.TextGrid"));
    write_wav(&input.join("b.wav"), 1, 16000, 2.0);

    // no phone tiers
    write_wav(&input.join("c.wav"), 1, 16000, 2.0);
    let mut broken = TextGrid::new(0.0, 2.0).unwrap();
    broken.tiers_mut().push(tier("words", &[("ta", 0.1, 0.5)]));
    broken.save(input.join("c.TextGrid")).unwrap();

    let output_dir = dir.path().join("output");
    let predictor = RecordingPredictor::default();

    let report = process_dir(
        &predictor,
        &input,
        &prep(&output_dir, ChannelMode::Preferred(1)),
    )
    .unwrap();

    assert_eq!(
        report,
        BatchReport {
            processed: 1,
            failed: 1
        }
    );
    assert!(output_dir.join("a_output.TextGrid").exists());
    assert!(!output_dir.join("b_output.TextGrid").exists());
    assert!(!output_dir.join("c_output.TextGrid").exists());
}

#[test]
fn batch_rejects_missing_directory() {
    let dir = tempfile::tempdir().unwrap();

    let result = process_dir(
        &RecordingPredictor::default(),
        &dir.path().join("missing"),
        &prep(&dir.path().join("output"), ChannelMode::Preferred(1)),
    );

    assert!(result.is_err());
}

#[test]
#[ignore = "requires a local AutoVOT install under ./autovot"]
fn run_with_autovot() {
    let dir = tempfile::tempdir().unwrap();
    let wav = dir.path().join("rec.wav");
    let textgrid = dir.path().join("rec.TextGrid");
    write_wav(&wav, 1, 16000, 2.0);
    write_two_speaker_textgrid(&textgrid);
    let output_dir = dir.path().join("output");

    let cli = Cli::parse_from([
        "votcp",
        "run",
        wav.to_str().unwrap(),
        textgrid.to_str().unwrap(),
        "--output-directory",
        output_dir.to_str().unwrap(),
    ]);

    run_cli(cli).expect("failed to obtain VOT predictions");

    let annotated = TextGrid::from_file(output_dir.join("rec_output.TextGrid")).unwrap();
    assert!(annotated.tier("ann - AutoVOT").is_some());
    assert!(annotated.tier("bob - AutoVOT").is_some());
}
