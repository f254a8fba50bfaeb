//! Audio ingestion loop and the bounded frame queue.
//!
//! [`AudioFeed`] continuously drains the microphone adapter into a bounded
//! `tokio::sync::mpsc` channel without ever blocking on a slow or absent
//! consumer.  When the queue is full the frame is dropped — downstream
//! recognition tolerates an occasional gap far better than a stalled
//! capture pipeline.
//!
//! The loop runs on its own named `std::thread` because the adapter read is
//! a blocking call.  A shutdown signal observed between reads ends the loop;
//! dropping the sender closes the queue and unblocks any pending receive.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch};

use super::adapter::{AudioAdapter, AudioFrame};

/// Capacity of the frame queue (100 frames ≈ 25 s at 250 ms per frame).
pub const QUEUE_CAPACITY: usize = 100;

/// Producer half of the frame queue.
pub type FrameSender = mpsc::Sender<AudioFrame>;
/// Consumer half of the frame queue.
pub type FrameReceiver = mpsc::Receiver<AudioFrame>;

/// Create the bounded frame queue shared by the feed and the listeners.
pub fn frame_queue() -> (FrameSender, FrameReceiver) {
    mpsc::channel(QUEUE_CAPACITY)
}

/// Publish one frame without blocking.
///
/// Returns `false` when the frame was dropped — either the queue is full
/// (overflow: freshness over backpressure) or the consumer side is gone.
/// Never waits in either case.
pub fn publish_frame(tx: &FrameSender, frame: AudioFrame) -> bool {
    match tx.try_send(frame) {
        Ok(()) => true,
        Err(mpsc::error::TrySendError::Full(_)) => false,
        Err(mpsc::error::TrySendError::Closed(_)) => false,
    }
}

// ---------------------------------------------------------------------------
// AudioFeed
// ---------------------------------------------------------------------------

/// Owns the microphone adapter and pumps it into the frame queue.
pub struct AudioFeed {
    adapter: Arc<dyn AudioAdapter>,
}

impl AudioFeed {
    pub fn new(adapter: Arc<dyn AudioAdapter>) -> Self {
        Self { adapter }
    }

    /// Start the ingestion loop on a dedicated thread.
    ///
    /// The loop runs until `shutdown` flips to `true`.  Adapter read errors
    /// are transient (hardware hiccup): the frame is skipped and the read
    /// retried after a short pause.  Exactly one frame is either delivered or
    /// dropped per successful read.  On shutdown the sender is dropped,
    /// which closes the queue for all consumers.
    pub fn spawn(
        self,
        tx: FrameSender,
        shutdown: watch::Receiver<bool>,
    ) -> std::thread::JoinHandle<()> {
        std::thread::Builder::new()
            .name("audio-feed".into())
            .spawn(move || {
                while !*shutdown.borrow() {
                    match self.adapter.read_frame() {
                        Ok(frame) => {
                            if !publish_frame(&tx, frame) {
                                log::trace!("audio feed: frame dropped (queue full or closed)");
                            }
                        }
                        Err(e) => {
                            log::debug!("audio feed: read error, retrying: {e}");
                            std::thread::sleep(Duration::from_millis(50));
                        }
                    }
                }
                log::info!("audio feed: shutdown observed, closing frame queue");
                // tx dropped here — queue closes.
            })
            .expect("failed to spawn audio-feed thread")
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
