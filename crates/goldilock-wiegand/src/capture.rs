//! Frame capture: edge accumulation and idle-timeout framing.
//!
//! Capture state is shared between one asynchronous producer (the edge
//! source, typically an interrupt or GPIO event handler) and one polling
//! consumer. [`channel`] splits it into two halves:
//!
//! - [`EdgeSender`] appends bits. It is `Clone + Send + Sync` and each call
//!   holds the lock only for a single append.
//! - [`FrameReceiver`] advances the idle timer and takes completed frames.
//!   It is not `Clone` and takes `&mut self`, so there is exactly one
//!   consumer and a frame can only leave the capture state by value.
//!
//! ```text
//!  on_edge ──► [ BitStream | timer | ready ] ◄── tick / take_frame
//!  (producer)          Arc<Mutex<..>>              (consumer)
//! ```
//!
//! A frame becomes ready when the timer, reset to the idle window by every
//! edge, counts down to zero with at least one bit captured. While a ready
//! frame is waiting, new edges are rejected so that the next card never
//! interleaves with an unconsumed one.

use crate::bitstream::BitStream;
use chrono::{DateTime, Utc};
use goldilock_core::EdgeKind;
use goldilock_core::constants::DEFAULT_IDLE_TICKS;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Capture tuning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureConfig {
    /// Quiet ticks after the last edge before a frame closes.
    pub idle_ticks: u32,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            idle_ticks: DEFAULT_IDLE_TICKS,
        }
    }
}

impl CaptureConfig {
    /// Set the idle window, in ticks. Zero is raised to one.
    pub fn idle_ticks(mut self, ticks: u32) -> Self {
        self.idle_ticks = ticks.max(1);
        self
    }
}

/// A completed card read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    bits: BitStream,
    overflow: usize,
    captured_at: DateTime<Utc>,
}

impl Frame {
    /// Captured bits in arrival order.
    pub fn bits(&self) -> &BitStream {
        &self.bits
    }

    /// Number of bits held, capped at the buffer size.
    pub fn len(&self) -> usize {
        self.bits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    /// Edges dropped because the buffer was already full.
    pub fn overflow(&self) -> usize {
        self.overflow
    }

    /// When the frame was handed to the consumer.
    pub fn captured_at(&self) -> DateTime<Utc> {
        self.captured_at
    }

    pub fn into_bits(self) -> BitStream {
        self.bits
    }
}

#[derive(Debug)]
struct CaptureState {
    stream: BitStream,
    overflow: usize,
    timer: u32,
    ready: bool,
    rejected: u64,
    idle_ticks: u32,
}

impl CaptureState {
    fn new(config: CaptureConfig) -> Self {
        Self {
            stream: BitStream::new(),
            overflow: 0,
            timer: 0,
            ready: false,
            rejected: 0,
            idle_ticks: config.idle_ticks.max(1),
        }
    }
}

#[derive(Debug)]
struct Shared {
    state: Mutex<CaptureState>,
}

impl Shared {
    // The state is plain data that is consistent between calls, so a panic
    // elsewhere while holding the lock leaves nothing to repair.
    fn lock(&self) -> MutexGuard<'_, CaptureState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Create a capture channel.
///
/// # Examples
///
/// ```
/// use goldilock_core::EdgeKind;
/// use goldilock_wiegand::{CaptureConfig, capture};
///
/// let (sender, mut receiver) = capture::channel(CaptureConfig::default().idle_ticks(2));
///
/// sender.on_edge(EdgeKind::One);
/// sender.on_edge(EdgeKind::Zero);
///
/// assert!(!receiver.tick());
/// assert!(receiver.tick());
///
/// let frame = receiver.take_frame().unwrap();
/// assert_eq!(frame.bits().as_slice(), &[true, false]);
/// assert!(receiver.take_frame().is_none());
/// ```
pub fn channel(config: CaptureConfig) -> (EdgeSender, FrameReceiver) {
    let shared = Arc::new(Shared {
        state: Mutex::new(CaptureState::new(config)),
    });

    (
        EdgeSender {
            shared: Arc::clone(&shared),
        },
        FrameReceiver { shared },
    )
}

/// Producer half: pushes edges into the frame being captured.
#[derive(Debug, Clone)]
pub struct EdgeSender {
    shared: Arc<Shared>,
}

impl EdgeSender {
    /// Record one edge.
    ///
    /// Appends the edge's bit unless the buffer is full, and restarts the idle
    /// timer either way. Edges arriving while a completed frame is waiting to
    /// be taken are rejected and counted.
    pub fn on_edge(&self, kind: EdgeKind) {
        let mut state = self.shared.lock();

        if state.ready {
            state.rejected += 1;
            return;
        }

        if !state.stream.push(kind.bit()) {
            state.overflow += 1;
        }
        state.timer = state.idle_ticks;
    }
}

/// Consumer half: drives the idle timer and hands out completed frames.
#[derive(Debug)]
pub struct FrameReceiver {
    shared: Arc<Shared>,
}

impl FrameReceiver {
    /// Advance the idle timer by one tick.
    ///
    /// Returns `true` when a frame is ready to be taken. A timer that runs out
    /// with no bits captured never produces a frame.
    pub fn tick(&mut self) -> bool {
        let mut state = self.shared.lock();

        if state.ready {
            return true;
        }

        state.timer = state.timer.saturating_sub(1);
        if state.timer == 0 && !state.stream.is_empty() {
            state.ready = true;
        }
        state.ready
    }

    /// Take the ready frame and reset capture for the next card.
    ///
    /// Returns `None` when no frame is ready.
    pub fn take_frame(&mut self) -> Option<Frame> {
        let mut state = self.shared.lock();

        if !state.ready {
            return None;
        }

        let bits = std::mem::take(&mut state.stream);
        let overflow = std::mem::take(&mut state.overflow);
        state.timer = 0;
        state.ready = false;
        drop(state);

        debug_assert!(!bits.is_empty(), "ready frame without bits");

        Some(Frame {
            bits,
            overflow,
            captured_at: Utc::now(),
        })
    }

    /// Whether a completed frame is waiting.
    pub fn is_ready(&self) -> bool {
        self.shared.lock().ready
    }

    /// Bits captured so far for the current frame.
    pub fn pending_bits(&self) -> usize {
        self.shared.lock().stream.len()
    }

    /// Whether a card is being read or a frame is waiting.
    pub fn is_busy(&self) -> bool {
        let state = self.shared.lock();
        state.ready || !state.stream.is_empty()
    }

    /// Edges dropped since creation because a ready frame was still waiting.
    pub fn rejected_edges(&self) -> u64 {
        self.shared.lock().rejected
    }

    /// Whether every [`EdgeSender`] has been dropped.
    ///
    /// Once orphaned, no new bits can arrive; only an in-progress frame may
    /// still complete.
    pub fn is_orphaned(&self) -> bool {
        Arc::strong_count(&self.shared) == 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use goldilock_core::constants::MAX_BITS;

    fn send_bits(sender: &EdgeSender, bits: &str) {
        for c in bits.chars() {
            if let Some(edge) = EdgeKind::from_char(c) {
                sender.on_edge(edge);
            }
        }
    }

    fn tick_n(receiver: &mut FrameReceiver, n: u32) -> bool {
        let mut ready = false;
        for _ in 0..n {
            ready = receiver.tick();
        }
        ready
    }

    #[test]
    fn test_frame_ready_after_idle_window() {
        let (sender, mut receiver) = channel(CaptureConfig::default().idle_ticks(5));

        send_bits(&sender, "1011");
        assert!(!tick_n(&mut receiver, 4));
        assert!(!receiver.is_ready());
        assert!(receiver.tick());
        assert!(receiver.is_ready());

        let frame = receiver.take_frame().unwrap();
        assert_eq!(frame.len(), 4);
        assert_eq!(frame.bits().as_slice(), &[true, false, true, true]);
        assert_eq!(frame.overflow(), 0);
    }

    #[test]
    fn test_edge_restarts_idle_timer() {
        let (sender, mut receiver) = channel(CaptureConfig::default().idle_ticks(3));

        sender.on_edge(EdgeKind::One);
        assert!(!tick_n(&mut receiver, 2));
        sender.on_edge(EdgeKind::Zero);
        assert!(!tick_n(&mut receiver, 2));
        assert!(receiver.tick());

        let frame = receiver.take_frame().unwrap();
        assert_eq!(frame.len(), 2);
    }

    #[test]
    fn test_timeout_without_bits_never_ready() {
        let (_sender, mut receiver) = channel(CaptureConfig::default().idle_ticks(2));

        assert!(!tick_n(&mut receiver, 100));
        assert!(receiver.take_frame().is_none());
        assert!(!receiver.is_busy());
    }

    #[test]
    fn test_take_frame_resets_state() {
        let (sender, mut receiver) = channel(CaptureConfig::default().idle_ticks(1));

        send_bits(&sender, "111");
        assert!(receiver.tick());
        let first = receiver.take_frame().unwrap();
        assert_eq!(first.len(), 3);

        assert!(!receiver.is_ready());
        assert_eq!(receiver.pending_bits(), 0);
        assert!(receiver.take_frame().is_none());
        assert!(!receiver.tick());

        send_bits(&sender, "00");
        assert!(receiver.tick());
        let second = receiver.take_frame().unwrap();
        assert_eq!(second.bits().as_slice(), &[false, false]);
    }

    #[test]
    fn test_edges_rejected_while_frame_waiting() {
        let (sender, mut receiver) = channel(CaptureConfig::default().idle_ticks(1));

        send_bits(&sender, "10");
        assert!(receiver.tick());

        send_bits(&sender, "111");
        assert_eq!(receiver.rejected_edges(), 3);

        let frame = receiver.take_frame().unwrap();
        assert_eq!(frame.bits().as_slice(), &[true, false]);
        assert_eq!(receiver.pending_bits(), 0);
    }

    #[test]
    fn test_overflow_caps_length() {
        let (sender, mut receiver) = channel(CaptureConfig::default().idle_ticks(1));

        for _ in 0..MAX_BITS + 7 {
            sender.on_edge(EdgeKind::One);
        }
        assert!(receiver.tick());

        let frame = receiver.take_frame().unwrap();
        assert_eq!(frame.len(), MAX_BITS);
        assert_eq!(frame.overflow(), 7);
    }

    #[test]
    fn test_zero_idle_ticks_raised_to_one() {
        let config = CaptureConfig::default().idle_ticks(0);
        assert_eq!(config.idle_ticks, 1);
    }

    #[test]
    fn test_orphaned_after_senders_dropped() {
        let (sender, receiver) = channel(CaptureConfig::default());
        let clone = sender.clone();
        assert!(!receiver.is_orphaned());

        drop(sender);
        assert!(!receiver.is_orphaned());
        drop(clone);
        assert!(receiver.is_orphaned());
    }

    #[test]
    fn test_in_progress_frame_is_busy() {
        let (sender, receiver) = channel(CaptureConfig::default());
        assert!(!receiver.is_busy());
        sender.on_edge(EdgeKind::Zero);
        assert!(receiver.is_busy());
        assert_eq!(receiver.pending_bits(), 1);
    }
}
