//! Mock Wiegand reader for testing and development.
//!
//! The reader side implements [`EdgeSource`]; the handle side lets a test
//! or simulator push edges, whole frames, or encoded cards into it.

use crate::{
    HardwareError, Result,
    traits::EdgeSource,
    types::DeviceInfo,
};
use goldilock_core::EdgeKind;
use goldilock_wiegand::{BitStream, FormatDescriptor};
use tokio::sync::mpsc;

/// Mock Wiegand reader.
///
/// # Examples
///
/// ```
/// use goldilock_hardware::mock::MockWiegandReader;
/// use goldilock_hardware::traits::EdgeSource;
/// use goldilock_core::EdgeKind;
///
/// #[tokio::main]
/// async fn main() -> goldilock_hardware::Result<()> {
///     let (mut reader, handle) = MockWiegandReader::new();
///
///     handle.send_edge(EdgeKind::One).await?;
///     drop(handle);
///
///     assert_eq!(reader.next_edge().await?, Some(EdgeKind::One));
///     assert_eq!(reader.next_edge().await?, None);
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct MockWiegandReader {
    /// Channel receiver for simulated edges
    edge_rx: mpsc::Receiver<EdgeKind>,

    /// Device name
    name: String,
}

impl MockWiegandReader {
    /// Create a new mock reader with the default name.
    ///
    /// The reader reports the end of input once every handle is dropped.
    pub fn new() -> (Self, MockWiegandReaderHandle) {
        Self::with_name("Mock Wiegand Reader".to_string())
    }

    /// Create a new mock reader with a custom name.
    pub fn with_name(name: String) -> (Self, MockWiegandReaderHandle) {
        let (edge_tx, edge_rx) = mpsc::channel(64);

        let reader = Self {
            edge_rx,
            name: name.clone(),
        };
        let handle = MockWiegandReaderHandle { edge_tx, name };

        (reader, handle)
    }
}

impl Default for MockWiegandReader {
    fn default() -> Self {
        Self::new().0
    }
}

impl EdgeSource for MockWiegandReader {
    async fn next_edge(&mut self) -> Result<Option<EdgeKind>> {
        Ok(self.edge_rx.recv().await)
    }

    async fn get_info(&self) -> Result<DeviceInfo> {
        Ok(DeviceInfo::new(self.name.clone(), "Mock Wiegand"))
    }
}

/// Handle for driving a mock reader.
///
/// Cloneable; the reader sees the end of input when the last clone is
/// dropped.
#[derive(Debug, Clone)]
pub struct MockWiegandReaderHandle {
    edge_tx: mpsc::Sender<EdgeKind>,
    name: String,
}

impl MockWiegandReaderHandle {
    /// Send a single edge.
    ///
    /// # Errors
    ///
    /// Returns `HardwareError::Disconnected` if the reader has been dropped.
    pub async fn send_edge(&self, edge: EdgeKind) -> Result<()> {
        self.edge_tx
            .send(edge)
            .await
            .map_err(|_| HardwareError::disconnected(format!("{}: edge channel closed", self.name)))
    }

    /// Send every bit of a frame, in order.
    pub async fn present_bits(&self, bits: &BitStream) -> Result<()> {
        for bit in bits {
            self.send_edge(EdgeKind::from_bit(bit)).await?;
        }
        Ok(())
    }

    /// Encode a card in `format` and send it.
    ///
    /// Returns the frame that was sent.
    ///
    /// # Errors
    ///
    /// Returns `HardwareError::InvalidData` if the codes do not fit the format.
    pub async fn present_card(
        &self,
        format: &FormatDescriptor,
        facility_code: u64,
        card_code: u64,
    ) -> Result<BitStream> {
        let bits = format
            .encode(facility_code, card_code)
            .map_err(|e| HardwareError::invalid_data(e.to_string()))?;
        self.present_bits(&bits).await?;
        Ok(bits)
    }

    /// Drop this handle.
    ///
    /// The reader reports the end of input once every clone is closed.
    pub fn close(self) {}

    /// Get the device name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether the reader side has been dropped.
    pub fn is_closed(&self) -> bool {
        self.edge_tx.is_closed()
    }
}
