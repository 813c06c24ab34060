//! Audio loading, resampling and channel selection for the predictor.

use crate::error::{AudioError, Result};
use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use rubato::{FastFixedIn, PolynomialDegree, Resampler};
use std::path::Path;

/// Sample rate expected by the predictor (16kHz)
pub const SAMPLE_RATE: u32 = 16000;

/// Planar audio: one sample buffer per channel.
#[derive(Clone, Debug)]
pub struct AudioBuffer {
    pub sample_rate: u32,
    pub channels: Vec<Vec<f32>>,
}

impl AudioBuffer {
    /// Load a WAV file into planar buffers.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let (samples, spec) = load_audio(path)?;

        if spec.channels == 0 || samples.is_empty() {
            return Err(AudioError::Empty.into());
        }

        Ok(Self {
            sample_rate: spec.sample_rate,
            channels: deinterleave(&samples, spec.channels),
        })
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// Samples of a 1-based channel.
    pub fn channel(&self, number: u16) -> Result<&[f32]> {
        usize::from(number)
            .checked_sub(1)
            .and_then(|index| self.channels.get(index))
            .map(Vec::as_slice)
            .ok_or_else(|| {
                AudioError::ChannelOutOfRange {
                    channel: number,
                    channels: self.channels.len() as u16,
                }
                .into()
            })
    }

    /// Convert to `rate`, returning the buffer unchanged if already there.
    pub fn resample(self, rate: u32) -> Result<Self> {
        if self.sample_rate == rate {
            tracing::debug!(rate, "sample rate already matches, skipping resample");
            return Ok(self);
        }

        let frames = self.channels.first().map_or(0, Vec::len);
        tracing::debug!(from = self.sample_rate, to = rate, frames, "resampling audio");

        let mut resampler = FastFixedIn::<f32>::new(
            f64::from(rate) / f64::from(self.sample_rate),
            1.0,
            PolynomialDegree::Septic,
            frames,
            self.channels.len(),
        )
        .map_err(|e| AudioError::Resample(e.to_string()))?;

        let channels = resampler
            .process(&self.channels, None)
            .map_err(|e| AudioError::Resample(e.to_string()))?;

        Ok(Self {
            sample_rate: rate,
            channels,
        })
    }
}

/// Load audio from a WAV file as interleaved samples scaled to [-1, 1].
///
/// Returns audio samples and WAV specification.
pub fn load_audio<P: AsRef<Path>>(path: P) -> Result<(Vec<f32>, WavSpec)> {
    let mut reader = WavReader::open(path)?;
    let spec = reader.spec();

    let samples: Vec<f32> = match spec.sample_format {
        SampleFormat::Float => reader.samples::<f32>().collect::<hound::Result<_>>()?,
        SampleFormat::Int => {
            let scale = (1_i64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .samples::<i32>()
                .map(|s| s.map(|s| s as f32 / scale))
                .collect::<hound::Result<_>>()?
        }
    };

    Ok((samples, spec))
}

/// Write mono 16-bit PCM.
pub fn write_mono_wav(path: impl AsRef<Path>, samples: &[f32], sample_rate: u32) -> Result<()> {
    let spec = WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };

    let mut writer = WavWriter::create(path, spec)?;
    for &sample in samples {
        writer.write_sample((sample.clamp(-1.0, 1.0) * f32::from(i16::MAX)) as i16)?;
    }
    writer.finalize()?;

    Ok(())
}

/// Convert interleaved samples to planar format.
///
/// Input:  [L, R, L, R, ...]
/// Output: [[L, L, ...], [R, R, ...]]
fn deinterleave(samples: &[f32], channels: u16) -> Vec<Vec<f32>> {
    let channels = usize::from(channels);
    let mut planar = vec![Vec::with_capacity(samples.len() / channels); channels];

    for frame in samples.chunks_exact(channels) {
        for (buffer, &sample) in planar.iter_mut().zip(frame) {
            buffer.push(sample);
        }
    }

    planar
}
