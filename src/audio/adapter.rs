//! Microphone adapter — cpal capture bridged to blocking fixed-size reads.
//!
//! The ingestion loop wants the shape of a blocking device: "give me the next
//! frame of 16-bit samples".  cpal is callback-driven, so [`CpalCapture`]
//! owns the host/device/stream lifecycle and forwards raw callback chunks
//! over an mpsc channel, while [`CpalAdapter`] re-chunks them into
//! fixed-size frames behind the [`AudioAdapter`] trait.  The returned
//! [`StreamHandle`] is a RAII guard — dropping it stops the underlying
//! stream.

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use std::sync::{mpsc, Mutex};
use thiserror::Error;

/// One fixed-length block of signed 16-bit mono samples at the configured
/// sample rate.  Each frame is an independent copy; it is never aliased or
/// mutated after it leaves the adapter.
pub type AudioFrame = Vec<i16>;

// ---------------------------------------------------------------------------
// AudioError
// ---------------------------------------------------------------------------

/// Errors that can occur while setting up or reading from audio capture.
#[derive(Debug, Error)]
pub enum AudioError {
    #[error("no input device found on the default audio host")]
    NoDevice,

    #[error("input device does not support {0} Hz 16-bit capture")]
    NoSupportedConfig(u32),

    #[error("failed to enumerate input configs: {0}")]
    SupportedConfigs(#[from] cpal::SupportedStreamConfigsError),

    #[error("failed to build input stream: {0}")]
    BuildStream(#[from] cpal::BuildStreamError),

    #[error("failed to start audio stream: {0}")]
    PlayStream(#[from] cpal::PlayStreamError),

    #[error("audio stream disconnected")]
    Disconnected,
}

// ---------------------------------------------------------------------------
// AudioAdapter trait
// ---------------------------------------------------------------------------

/// Blocking microphone source.
///
/// `read_frame` returns exactly one fixed-size frame per call and blocks
/// until that much audio has arrived.  Implementations must be `Send + Sync`
/// so the ingestion loop can own them behind an `Arc` on its own thread.
pub trait AudioAdapter: Send + Sync {
    fn read_frame(&self) -> Result<AudioFrame, AudioError>;
}

// ---------------------------------------------------------------------------
// StreamHandle
// ---------------------------------------------------------------------------

/// RAII guard that keeps the cpal stream alive.
///
/// Dropping this value stops the underlying hardware stream.  Keep it in
/// `main` for the lifetime of the process.
pub struct StreamHandle {
    _stream: cpal::Stream,
}

// ---------------------------------------------------------------------------
// CpalCapture
// ---------------------------------------------------------------------------

/// Device/config selection and stream construction.
///
/// Requires a device that can capture signed 16-bit audio at the requested
/// sample rate; multi-channel devices are accepted and reduced to their
/// first channel in the callback.
pub struct CpalCapture {
    device: cpal::Device,
    config: cpal::StreamConfig,
    channels: u16,
}

impl CpalCapture {
    /// Select the default input device and a 16-bit config at `sample_rate`.
    ///
    /// # Errors
    ///
    /// Returns [`AudioError::NoDevice`] when no input device is available, or
    /// [`AudioError::NoSupportedConfig`] when the device cannot capture
    /// 16-bit audio at the requested rate.
    pub fn new(sample_rate: u32) -> Result<Self, AudioError> {
        let host = cpal::default_host();
        let device = host.default_input_device().ok_or(AudioError::NoDevice)?;

        let range = device
            .supported_input_configs()?
            .filter(|r| r.sample_format() == cpal::SampleFormat::I16)
            .filter(|r| {
                r.min_sample_rate().0 <= sample_rate && sample_rate <= r.max_sample_rate().0
            })
            // Prefer mono so the callback does no channel reduction at all.
            .min_by_key(|r| r.channels())
            .ok_or(AudioError::NoSupportedConfig(sample_rate))?;

        let channels = range.channels();
        let config: cpal::StreamConfig = range
            .with_sample_rate(cpal::SampleRate(sample_rate))
            .into();

        Ok(Self {
            device,
            config,
            channels,
        })
    }

    /// Start capturing and send raw callback chunks to `tx`.
    ///
    /// The cpal callback runs on a dedicated audio thread; interleaved
    /// multi-channel input is reduced to the first channel.  Send errors
    /// (receiver dropped) are ignored so the audio thread never panics.
    pub fn start(&self, tx: mpsc::Sender<Vec<i16>>) -> Result<StreamHandle, AudioError> {
        let channels = self.channels as usize;

        let stream = self.device.build_input_stream(
            &self.config,
            move |data: &[i16], _: &cpal::InputCallbackInfo| {
                let mono: Vec<i16> = if channels > 1 {
                    data.iter().step_by(channels).copied().collect()
                } else {
                    data.to_vec()
                };
                let _ = tx.send(mono);
            },
            |err: cpal::StreamError| {
                log::error!("cpal stream error: {err}");
            },
            None, // no timeout
        )?;

        stream.play()?;
        Ok(StreamHandle { _stream: stream })
    }
}

// ---------------------------------------------------------------------------
// CpalAdapter
// ---------------------------------------------------------------------------

/// [`AudioAdapter`] over the chunk channel fed by [`CpalCapture`].
///
/// Accumulates arbitrarily-sized callback chunks and hands out exact
/// `frame_size`-sample frames.  Only ever read from one thread (the
/// ingestion loop); the internal mutexes exist to satisfy `Sync`, not to
/// arbitrate real contention.
pub struct CpalAdapter {
    rx: Mutex<mpsc::Receiver<Vec<i16>>>,
    pending: Mutex<Vec<i16>>,
    frame_size: usize,
}

impl CpalAdapter {
    /// Wrap the receiving end of the capture channel.
    pub fn new(rx: mpsc::Receiver<Vec<i16>>, frame_size: usize) -> Self {
        Self {
            rx: Mutex::new(rx),
            pending: Mutex::new(Vec::with_capacity(frame_size * 2)),
            frame_size,
        }
    }
}

impl AudioAdapter for CpalAdapter {
    /// Block until `frame_size` samples have accumulated, then return them.
    ///
    /// # Errors
    ///
    /// Returns [`AudioError::Disconnected`] when the capture stream has gone
    /// away (sender dropped).
    fn read_frame(&self) -> Result<AudioFrame, AudioError> {
        let rx = self.rx.lock().unwrap();
        let mut pending = self.pending.lock().unwrap();

        while pending.len() < self.frame_size {
            let chunk = rx.recv().map_err(|_| AudioError::Disconnected)?;
            pending.extend_from_slice(&chunk);
        }

        let rest = pending.split_off(self.frame_size);
        let frame = std::mem::replace(&mut *pending, rest);
        Ok(frame)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn adapter_rechunks_to_exact_frames() {
        let (tx, rx) = mpsc::channel();
        let adapter = CpalAdapter::new(rx, 4);

        tx.send(vec![1, 2, 3]).unwrap();
        tx.send(vec![4, 5, 6, 7, 8]).unwrap();

        assert_eq!(adapter.read_frame().unwrap(), vec![1, 2, 3, 4]);
        assert_eq!(adapter.read_frame().unwrap(), vec![5, 6, 7, 8]);
    }

    #[test]
    fn adapter_reports_disconnect() {
        let (tx, rx) = mpsc::channel::<Vec<i16>>();
        let adapter = CpalAdapter::new(rx, 4);
        drop(tx);

        assert!(matches!(
            adapter.read_frame(),
            Err(AudioError::Disconnected)
        ));
    }

    #[test]
    fn leftover_samples_survive_between_reads() {
        let (tx, rx) = mpsc::channel();
        let adapter = CpalAdapter::new(rx, 2);

        tx.send(vec![9, 8, 7]).unwrap();
        assert_eq!(adapter.read_frame().unwrap(), vec![9, 8]);

        tx.send(vec![6]).unwrap();
        assert_eq!(adapter.read_frame().unwrap(), vec![7, 6]);
    }

    /// `AudioFrame` must be `Send` so it can cross thread boundaries.
    #[test]
    fn audio_frame_is_send() {
        fn assert_send<T: Send>() {}
        assert_send::<AudioFrame>();
    }
}
