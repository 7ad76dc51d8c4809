//! Reader manager.
//!
//! Connects an [`EdgeSource`] to frame capture and resolution, and turns the
//! result into a stream of [`ReaderEvent`]s.
//!
//! # Architecture
//!
//! Two tasks share one capture channel. The edge task forwards pulses from
//! the source into the [`EdgeSender`]; the frame task ticks the idle timer
//! at a fixed interval, takes each completed frame, resolves it, and sends
//! the outcome to the event channel.
//!
//! ```text
//! ┌──────────┐  on_edge  ┌─────────┐  tick/take  ┌──────────┐
//! │ Edge     │──────────►│ Capture │◄────────────│ Frame    │──► ReaderEvent
//! │ Task     │           │ State   │             │ Task     │    (mpsc)
//! └──────────┘           └─────────┘             └──────────┘
//! ```
//!
//! When the source is exhausted the edge task drops its sender. The frame
//! task finishes any frame still in progress, reports
//! [`ReaderEvent::SourceClosed`], and exits.
//!
//! # Examples
//!
//! ```no_run
//! use goldilock_hardware::manager::{ReaderConfig, ReaderEvent, ReaderManager};
//! use goldilock_hardware::devices::AnyEdgeSource;
//! use goldilock_hardware::mock::MockWiegandReader;
//! use goldilock_wiegand::FormatResolver;
//!
//! #[tokio::main]
//! async fn main() -> goldilock_hardware::Result<()> {
//!     let mut manager = ReaderManager::new(ReaderConfig::default(), FormatResolver::standard());
//!
//!     let (reader, _handle) = MockWiegandReader::new();
//!     manager.register_source(AnyEdgeSource::Mock(reader));
//!
//!     let mut handle = manager.start();
//!     while let Some(event) = handle.recv().await {
//!         if let ReaderEvent::FrameResolved { resolution, .. } = event {
//!             println!("{resolution}");
//!         }
//!     }
//!
//!     handle.shutdown().await?;
//!     Ok(())
//! }
//! ```

use crate::Result;
use crate::devices::AnyEdgeSource;
use crate::traits::EdgeSource;
use goldilock_core::constants::{
    DEFAULT_EVENT_CHANNEL_CAPACITY, DEFAULT_IDLE_TICKS, DEFAULT_TICK_INTERVAL_MS,
};
use goldilock_wiegand::{
    CaptureConfig, EdgeSender, Frame, FormatResolver, FrameReceiver, Resolution, capture,
};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

/// Event produced by the reader pipeline.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub enum ReaderEvent {
    /// A frame closed and was run through the resolver.
    FrameResolved {
        /// The captured frame.
        frame: Frame,

        /// What the resolver made of it.
        resolution: Resolution,
    },

    /// The edge source failed. No further edges will arrive.
    DeviceError {
        /// Source name.
        device: String,

        /// Error message.
        error: String,
    },

    /// The edge source is exhausted and every frame has been delivered.
    SourceClosed,
}

/// Timing and buffering for the reader pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReaderConfig {
    /// Quiet ticks after the last edge before a frame closes.
    pub idle_ticks: u32,

    /// Period of the idle timer.
    pub tick_interval: Duration,

    /// Capacity of the event channel.
    pub channel_capacity: usize,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            idle_ticks: DEFAULT_IDLE_TICKS,
            tick_interval: Duration::from_millis(DEFAULT_TICK_INTERVAL_MS),
            channel_capacity: DEFAULT_EVENT_CHANNEL_CAPACITY,
        }
    }
}

impl ReaderConfig {
    pub fn idle_ticks(mut self, ticks: u32) -> Self {
        self.idle_ticks = ticks.max(1);
        self
    }

    /// Set the tick period. A zero period is raised to one millisecond.
    pub fn tick_interval(mut self, interval: Duration) -> Self {
        self.tick_interval = interval.max(Duration::from_millis(1));
        self
    }

    pub fn channel_capacity(mut self, capacity: usize) -> Self {
        self.channel_capacity = capacity.max(1);
        self
    }

    /// Idle window as wall-clock time.
    pub fn idle_window(&self) -> Duration {
        self.tick_interval * self.idle_ticks
    }
}

/// Handle for receiving events from a running reader pipeline.
#[derive(Debug)]
pub struct ReaderHandle {
    event_rx: mpsc::Receiver<ReaderEvent>,
    tasks: JoinSet<Result<()>>,
}

impl ReaderHandle {
    /// Receive the next event.
    ///
    /// Returns `None` once both pipeline tasks have finished.
    pub async fn recv(&mut self) -> Option<ReaderEvent> {
        self.event_rx.recv().await
    }

    /// Stop the pipeline.
    ///
    /// Aborts both tasks and waits for them. Task failures are logged, not
    /// returned.
    pub async fn shutdown(mut self) -> Result<()> {
        self.tasks.abort_all();

        let mut error_count = 0;
        let mut panic_count = 0;

        while let Some(result) = self.tasks.join_next().await {
            match result {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    debug!(error = %e, "Reader task ended with error");
                    error_count += 1;
                }
                Err(e) if e.is_cancelled() => {}
                Err(e) => {
                    error!(error = %e, "Reader task panicked");
                    panic_count += 1;
                }
            }
        }

        if error_count + panic_count > 0 {
            warn!(errors = error_count, panics = panic_count, "Reader pipeline stopped");
        } else {
            debug!("Reader pipeline stopped");
        }

        Ok(())
    }
}

/// Wires an edge source to capture and resolution.
///
/// # Lifecycle
///
/// 1. Create the manager with a configuration and a resolver
/// 2. Register the edge source
/// 3. Call `start()` to spawn the pipeline and get a handle
/// 4. Receive events until `SourceClosed` or shutdown
#[derive(Debug)]
pub struct ReaderManager {
    source: Option<AnyEdgeSource>,
    resolver: FormatResolver,
    config: ReaderConfig,
}

impl ReaderManager {
    pub fn new(config: ReaderConfig, resolver: FormatResolver) -> Self {
        Self {
            source: None,
            resolver,
            config,
        }
    }

    /// Register the edge source, replacing any previous one.
    pub fn register_source(&mut self, source: AnyEdgeSource) {
        self.source = Some(source);
    }

    /// Whether a source has been registered.
    pub fn has_source(&self) -> bool {
        self.source.is_some()
    }

    pub fn config(&self) -> &ReaderConfig {
        &self.config
    }

    /// Spawn the pipeline tasks and return the event handle.
    ///
    /// Without a registered source no task is spawned and the handle's
    /// stream ends immediately.
    pub fn start(mut self) -> ReaderHandle {
        let (event_tx, event_rx) = mpsc::channel(self.config.channel_capacity);
        let mut tasks = JoinSet::new();

        if let Some(source) = self.source.take() {
            let (sender, receiver) =
                capture::channel(CaptureConfig::default().idle_ticks(self.config.idle_ticks));

            tasks.spawn(Self::edge_task(source, sender, event_tx.clone()));
            tasks.spawn(Self::frame_task(
                receiver,
                self.resolver,
                self.config.tick_interval,
                event_tx,
            ));
        }

        ReaderHandle { event_rx, tasks }
    }

    async fn edge_task(
        mut source: AnyEdgeSource,
        sender: EdgeSender,
        tx: mpsc::Sender<ReaderEvent>,
    ) -> Result<()> {
        let device = source.get_info().await?.name;
        info!(device = %device, "Edge source started");

        loop {
            match source.next_edge().await {
                Ok(Some(edge)) => sender.on_edge(edge),
                Ok(None) => {
                    info!(device = %device, "Edge source exhausted");
                    return Ok(());
                }
                Err(e) => {
                    error!(device = %device, error = %e, "Edge source failed");
                    let _ = tx
                        .send(ReaderEvent::DeviceError {
                            device,
                            error: e.to_string(),
                        })
                        .await;
                    return Err(e);
                }
            }
        }
    }

    async fn frame_task(
        mut receiver: FrameReceiver,
        resolver: FormatResolver,
        tick_interval: Duration,
        tx: mpsc::Sender<ReaderEvent>,
    ) -> Result<()> {
        let mut ticker = tokio::time::interval(tick_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut rejected = 0;

        loop {
            ticker.tick().await;

            if receiver.tick()
                && let Some(frame) = receiver.take_frame()
            {
                let resolution = resolver.resolve(frame.bits());
                debug!(
                    bits = frame.len(),
                    overflow = frame.overflow(),
                    frame = %frame.bits(),
                    "Frame captured"
                );

                if tx
                    .send(ReaderEvent::FrameResolved { frame, resolution })
                    .await
                    .is_err()
                {
                    return Ok(());
                }
                continue;
            }

            let total = receiver.rejected_edges();
            if total > rejected {
                warn!(dropped = total - rejected, "Edges arrived while a frame was waiting");
                rejected = total;
            }

            if receiver.is_orphaned() && !receiver.is_busy() {
                let _ = tx.send(ReaderEvent::SourceClosed).await;
                return Ok(());
            }
        }
    }
}
