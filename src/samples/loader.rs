// Copyright (C) 2026 Michael Wilson <mike@mdwn.dev>
//
// This program is free software: you can redistribute it and/or modify it under
// the terms of the GNU General Public License as published by the Free Software
// Foundation, version 3.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// this program. If not, see <https://www.gnu.org/licenses/>.
//

//! Sample loading and caching.
//!
//! Decodes audio files with symphonia, downmixes to mono, and resamples to
//! the output rate so playback is a plain buffer walk.

use std::collections::HashMap;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use symphonia::default::{get_codecs, get_probe};
use tracing::{debug, info};

use super::SamplePlayback;

/// Typed error for sample load/decode failures.
#[derive(Debug, thiserror::Error)]
pub enum SampleLoadError {
    #[error("failed to open sample {0}: {1}")]
    Io(PathBuf, std::io::Error),

    #[error("failed to decode sample {0}: {1}")]
    Decode(PathBuf, SymphoniaError),

    #[error("sample {0} has no audio track")]
    NoAudioTrack(PathBuf),

    #[error("sample {0} does not specify a sample rate")]
    NoSampleRate(PathBuf),
}

/// A sample decoded into memory, shared between playbacks via Arc.
#[derive(Clone)]
pub struct LoadedSample {
    /// Mono samples at the loader's target rate.
    data: Arc<Vec<f32>>,
    sample_rate: u32,
}

impl LoadedSample {
    /// Creates a new playback of this sample at the given volume.
    pub fn create_playback(&self, volume: f32) -> SamplePlayback {
        SamplePlayback::new(self.data.clone(), volume)
    }

    pub fn duration(&self) -> Duration {
        Duration::from_secs_f64(self.data.len() as f64 / self.sample_rate as f64)
    }

    pub fn memory_size(&self) -> usize {
        self.data.len() * std::mem::size_of::<f32>()
    }

    #[cfg(test)]
    pub fn from_data(data: Vec<f32>, sample_rate: u32) -> LoadedSample {
        LoadedSample {
            data: Arc::new(data),
            sample_rate,
        }
    }
}

/// Manages loading and caching of sample data.
pub struct SampleLoader {
    /// Cache of loaded samples by file path.
    cache: HashMap<PathBuf, LoadedSample>,
    /// Target sample rate (matches the audio output).
    target_sample_rate: u32,
}

impl SampleLoader {
    pub fn new(target_sample_rate: u32) -> SampleLoader {
        SampleLoader {
            cache: HashMap::new(),
            target_sample_rate,
        }
    }

    /// Loads a sample from a file into memory, returning a cached copy if it
    /// was loaded before.
    pub fn load(&mut self, path: &Path) -> Result<LoadedSample, SampleLoadError> {
        if let Some(sample) = self.cache.get(path) {
            debug!(path = ?path, "Using cached sample");
            return Ok(sample.clone());
        }

        let (samples, source_rate) = decode_to_mono(path)?;

        let data = if source_rate == self.target_sample_rate {
            samples
        } else {
            info!(
                path = ?path,
                source_rate,
                target_rate = self.target_sample_rate,
                "Resampling sample"
            );
            resample_linear(&samples, source_rate, self.target_sample_rate)
        };

        let loaded = LoadedSample {
            data: Arc::new(data),
            sample_rate: self.target_sample_rate,
        };
        info!(
            path = ?path,
            duration_ms = loaded.duration().as_millis(),
            memory_kb = loaded.memory_size() / 1024,
            "Sample loaded"
        );

        self.cache.insert(path.to_path_buf(), loaded.clone());
        Ok(loaded)
    }

    /// Total memory used by all cached samples, in bytes.
    pub fn total_memory_usage(&self) -> usize {
        self.cache.values().map(|s| s.memory_size()).sum()
    }
}

/// Decodes an audio file to mono f32 samples at its native rate.
fn decode_to_mono(path: &Path) -> Result<(Vec<f32>, u32), SampleLoadError> {
    let file = File::open(path).map_err(|e| SampleLoadError::Io(path.to_path_buf(), e))?;
    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    let mut hint = Hint::new();
    if let Some(extension) = path.extension().and_then(|ext| ext.to_str()) {
        hint.with_extension(extension);
    }

    let probed = get_probe()
        .format(
            &hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(|e| SampleLoadError::Decode(path.to_path_buf(), e))?;
    let mut format_reader = probed.format;

    let track = format_reader
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or_else(|| SampleLoadError::NoAudioTrack(path.to_path_buf()))?;
    let track_id = track.id;
    let sample_rate = track
        .codec_params
        .sample_rate
        .ok_or_else(|| SampleLoadError::NoSampleRate(path.to_path_buf()))?;

    let mut decoder = get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .map_err(|e| SampleLoadError::Decode(path.to_path_buf(), e))?;

    let mut mono = Vec::new();
    let mut sample_buffer: Option<SampleBuffer<f32>> = None;

    loop {
        let packet = match format_reader.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::IoError(e))
                if e.kind() == std::io::ErrorKind::UnexpectedEof =>
            {
                break;
            }
            // Some decoders return DecodeError at EOF instead of IoError.
            Err(SymphoniaError::DecodeError(_)) => break,
            Err(e) => return Err(SampleLoadError::Decode(path.to_path_buf(), e)),
        };
        if packet.track_id() != track_id {
            continue;
        }

        let decoded = match decoder.decode(&packet) {
            Ok(decoded) => decoded,
            Err(SymphoniaError::ResetRequired) => {
                decoder.reset();
                continue;
            }
            Err(e) => return Err(SampleLoadError::Decode(path.to_path_buf(), e)),
        };

        let buffer = sample_buffer.get_or_insert_with(|| {
            SampleBuffer::new(decoded.capacity() as u64, *decoded.spec())
        });
        let channels = decoded.spec().channels.count().max(1);
        buffer.copy_interleaved_ref(decoded);

        for frame in buffer.samples().chunks_exact(channels) {
            mono.push(frame.iter().sum::<f32>() / channels as f32);
        }
    }

    Ok((mono, sample_rate))
}

/// Linear-interpolation resampling. Good enough for one-shot pads; anything
/// hi-fi would want a real resampler.
fn resample_linear(samples: &[f32], source_rate: u32, target_rate: u32) -> Vec<f32> {
    if samples.is_empty() {
        return Vec::new();
    }
    let ratio = source_rate as f64 / target_rate as f64;
    let output_len = (samples.len() as f64 / ratio).ceil() as usize;
    let mut out = Vec::with_capacity(output_len);
    for i in 0..output_len {
        let position = i as f64 * ratio;
        let index = position as usize;
        let frac = (position - index as f64) as f32;
        let a = samples[index.min(samples.len() - 1)];
        let b = samples[(index + 1).min(samples.len() - 1)];
        out.push(a + (b - a) * frac);
    }
    out
}

#[cfg(test)]
mod test {
    use super::*;

    fn write_wav(path: &Path, samples: &[f32], channels: u16, sample_rate: u32) {
        let spec = hound::WavSpec {
            channels,
            sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(path, spec).unwrap();
        for sample in samples {
            writer
                .write_sample((sample * i16::MAX as f32) as i16)
                .unwrap();
        }
        writer.finalize().unwrap();
    }

    #[test]
    fn test_load_mono_wav() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tone.wav");
        write_wav(&path, &[0.0, 0.5, -0.5, 0.25], 1, 44100);

        let mut loader = SampleLoader::new(44100);
        let sample = loader.load(&path).unwrap();
        assert_eq!(sample.data.len(), 4);
        assert!((sample.data[1] - 0.5).abs() < 0.001);
    }

    #[test]
    fn test_load_downmixes_stereo() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stereo.wav");
        // Two frames: (0.4, 0.2) and (-0.4, -0.2).
        write_wav(&path, &[0.4, 0.2, -0.4, -0.2], 2, 44100);

        let mut loader = SampleLoader::new(44100);
        let sample = loader.load(&path).unwrap();
        assert_eq!(sample.data.len(), 2);
        assert!((sample.data[0] - 0.3).abs() < 0.001);
        assert!((sample.data[1] + 0.3).abs() < 0.001);
    }

    #[test]
    fn test_load_resamples() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("slow.wav");
        write_wav(&path, &[0.0; 22050], 1, 22050);

        let mut loader = SampleLoader::new(44100);
        let sample = loader.load(&path).unwrap();
        // One second of audio at either rate.
        assert!((sample.duration().as_secs_f64() - 1.0).abs() < 0.01);
    }

    #[test]
    fn test_cache() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cached.wav");
        write_wav(&path, &[0.1, 0.2], 1, 44100);

        let mut loader = SampleLoader::new(44100);
        loader.load(&path).unwrap();
        let first_usage = loader.total_memory_usage();
        loader.load(&path).unwrap();
        assert_eq!(loader.total_memory_usage(), first_usage);
    }

    #[test]
    fn test_missing_file() {
        let mut loader = SampleLoader::new(44100);
        assert!(matches!(
            loader.load(Path::new("/does/not/exist.wav")),
            Err(SampleLoadError::Io(..))
        ));
    }

    #[test]
    fn test_resample_linear() {
        let out = resample_linear(&[0.0, 1.0], 2, 4);
        assert_eq!(out.len(), 4);
        assert_eq!(out[0], 0.0);
        assert_eq!(out[1], 0.5);
        assert_eq!(out[2], 1.0);
    }
}
