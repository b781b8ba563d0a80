//! Speaker playback using cpal.
//! Resamples from the synthesized rate to the native device rate if needed.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, FromSample, SampleFormat, SizedSample, Stream, StreamConfig};
use rubato::{FftFixedIn, Resampler};
use tracing::{debug, error};

use super::AudioSink;
use crate::core::tts::{AudioData, TTSError, TTSResult};

const POLL_INTERVAL: Duration = Duration::from_millis(20);
const DRAIN_GRACE: Duration = Duration::from_secs(2);

/// Plays audio on the default output device.
///
/// cpal streams are not `Send`, so the device is opened and driven on a
/// blocking worker for each playback.
#[derive(Debug, Default, Clone)]
pub struct SpeakerSink;

impl SpeakerSink {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl AudioSink for SpeakerSink {
    async fn play(&self, audio: AudioData) -> TTSResult<()> {
        if audio.data.is_empty() {
            return Ok(());
        }

        tokio::task::spawn_blocking(move || play_blocking(&audio))
            .await
            .map_err(|e| TTSError::InternalError(format!("playback task failed: {e}")))?
    }
}

fn play_blocking(audio: &AudioData) -> TTSResult<()> {
    let host = cpal::default_host();
    let device = host
        .default_output_device()
        .ok_or_else(|| TTSError::AudioOutputFailed("no output device available".to_string()))?;

    let supported_config = device.default_output_config().map_err(|e| {
        TTSError::AudioOutputFailed(format!("failed to get default output config: {e}"))
    })?;

    let native_rate = supported_config.sample_rate().0;
    let native_channels = supported_config.channels() as usize;
    let sample_format = supported_config.sample_format();
    let config: StreamConfig = supported_config.into();

    let input_samples = i16_bytes_to_f32(&audio.data);
    let resampled = if audio.sample_rate == native_rate {
        input_samples
    } else {
        resample(&input_samples, audio.sample_rate, native_rate)?
    };

    let samples = if native_channels > 1 {
        expand_to_channels(&resampled, native_channels)
    } else {
        resampled
    };

    debug!(
        native_rate,
        native_channels,
        samples = samples.len(),
        "Starting speaker playback"
    );

    let expected = Duration::from_millis(audio.duration_ms.unwrap_or(0) as u64);
    let samples = Arc::new(samples);
    let position = Arc::new(AtomicUsize::new(0));
    let finished = Arc::new(AtomicBool::new(false));

    let stream = match sample_format {
        SampleFormat::F32 => {
            build_stream::<f32>(&device, &config, samples, position, finished.clone())?
        }
        SampleFormat::I16 => {
            build_stream::<i16>(&device, &config, samples, position, finished.clone())?
        }
        format => {
            return Err(TTSError::AudioOutputFailed(format!(
                "unsupported sample format: {format:?}"
            )));
        }
    };

    stream
        .play()
        .map_err(|e| TTSError::AudioOutputFailed(format!("failed to start playback: {e}")))?;

    let deadline = Instant::now() + expected + DRAIN_GRACE;
    while !finished.load(Ordering::SeqCst) {
        if Instant::now() >= deadline {
            return Err(TTSError::AudioOutputFailed(
                "playback did not finish in time".to_string(),
            ));
        }
        std::thread::sleep(POLL_INTERVAL);
    }

    Ok(())
}

fn build_stream<T>(
    device: &Device,
    config: &StreamConfig,
    samples: Arc<Vec<f32>>,
    position: Arc<AtomicUsize>,
    finished: Arc<AtomicBool>,
) -> TTSResult<Stream>
where
    T: SizedSample + FromSample<f32> + Default + Send + 'static,
{
    device
        .build_output_stream(
            config,
            move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
                let pos = position.load(Ordering::SeqCst);
                let remaining = samples.len().saturating_sub(pos);

                if remaining == 0 {
                    data.fill(T::default());
                    finished.store(true, Ordering::SeqCst);
                    return;
                }

                let to_copy = remaining.min(data.len());
                for (i, &sample) in samples[pos..pos + to_copy].iter().enumerate() {
                    data[i] = T::from_sample(sample);
                }

                if to_copy < data.len() {
                    data[to_copy..].fill(T::default());
                }

                position.store(pos + to_copy, Ordering::SeqCst);
            },
            move |err| {
                error!(error = ?err, "playback stream error");
            },
            None,
        )
        .map_err(|e| TTSError::AudioOutputFailed(format!("failed to build output stream: {e}")))
}

fn i16_bytes_to_f32(bytes: &[u8]) -> Vec<f32> {
    bytes
        .chunks_exact(2)
        .map(|chunk| i16::from_le_bytes([chunk[0], chunk[1]]) as f32 / 32768.0)
        .collect()
}

fn resample(samples: &[f32], source_rate: u32, target_rate: u32) -> TTSResult<Vec<f32>> {
    let chunk_size = 1024;
    let mut resampler =
        FftFixedIn::<f32>::new(source_rate as usize, target_rate as usize, chunk_size, 2, 1)
            .map_err(|e| TTSError::AudioOutputFailed(format!("failed to create resampler: {e}")))?;

    let mut output = Vec::new();
    let mut pos = 0;

    while pos < samples.len() {
        let frames_needed = resampler.input_frames_next();
        let end = (pos + frames_needed).min(samples.len());

        let mut input_chunk = samples[pos..end].to_vec();
        if input_chunk.len() < frames_needed {
            input_chunk.resize(frames_needed, 0.0);
        }

        let resampled = resampler
            .process(&[input_chunk], None)
            .map_err(|e| TTSError::AudioOutputFailed(format!("resampling failed: {e:?}")))?;
        if let Some(chunk) = resampled.into_iter().next() {
            output.extend(chunk);
        }

        pos = end;
    }

    Ok(output)
}

fn expand_to_channels(samples: &[f32], channels: usize) -> Vec<f32> {
    samples
        .iter()
        .flat_map(|&sample| std::iter::repeat_n(sample, channels))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_i16_bytes_to_f32() {
        let bytes = [0x00, 0x00, 0xff, 0x7f, 0x00, 0x80, 0x01];
        let samples = i16_bytes_to_f32(&bytes);
        assert_eq!(samples.len(), 3);
        assert_eq!(samples[0], 0.0);
        assert!((samples[1] - 32767.0 / 32768.0).abs() < f32::EPSILON);
        assert_eq!(samples[2], -1.0);
    }

    #[test]
    fn test_expand_to_channels() {
        assert_eq!(
            expand_to_channels(&[0.1, 0.2], 2),
            vec![0.1, 0.1, 0.2, 0.2]
        );
    }

    #[test]
    fn test_resample_doubles_length() {
        let samples = vec![0.0f32; 24000];
        let output = resample(&samples, 24000, 48000).unwrap();
        assert!(output.len() >= 47000, "got {}", output.len());
    }
}
