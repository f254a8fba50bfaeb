//! Audio pipeline — microphone capture → fixed-size frames → bounded queue.
//!
//! # Pipeline
//!
//! ```text
//! Microphone → cpal callback → chunk channel → CpalAdapter (re-chunk)
//!           → AudioFeed thread → bounded frame queue (drop on overflow)
//! ```
//!
//! The queue is the only structure shared between the ingestion thread and
//! the orchestrator; publishing never blocks and frames arrive in capture
//! order (drops break contiguity but never reorder).

pub mod adapter;
pub mod feed;

pub use adapter::{AudioAdapter, AudioError, AudioFrame, CpalAdapter, CpalCapture, StreamHandle};
pub use feed::{frame_queue, publish_frame, AudioFeed, FrameReceiver, FrameSender, QUEUE_CAPACITY};
