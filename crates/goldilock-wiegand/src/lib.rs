//! Wiegand frame capture and card format resolution.
//!
//! This crate turns the two edge-triggered data lines of a Wiegand reader
//! into typed card codes. It has two strictly layered parts:
//!
//! - **Frame capture** ([`capture`]): accumulates edges into a [`BitStream`]
//!   and closes the frame once the lines stay quiet for the idle window.
//! - **Format resolution** ([`resolver`]): matches a closed frame against an
//!   ordered [`FormatCatalog`] and extracts facility and card codes.
//!
//! Nothing here blocks, allocates on the edge path, or performs I/O. Device
//! drivers, door actuation and authorization live in downstream crates.
//!
//! # Examples
//!
//! ```
//! use goldilock_core::EdgeKind;
//! use goldilock_wiegand::{CaptureConfig, FormatResolver, Resolution, capture};
//!
//! let (sender, mut receiver) = capture::channel(CaptureConfig::default().idle_ticks(3));
//!
//! // 26-bit frame: parity, facility 7, card 4660, parity
//! let bits = "1 00000111 0001001000110100 0";
//! for c in bits.chars().filter(|c| !c.is_whitespace()) {
//!     sender.on_edge(EdgeKind::from_char(c).unwrap());
//! }
//!
//! while !receiver.tick() {}
//! let frame = receiver.take_frame().unwrap();
//!
//! let resolver = FormatResolver::standard();
//! match resolver.resolve(frame.bits()) {
//!     Resolution::Decoded(code) => {
//!         assert_eq!(code.facility_code, 7);
//!         assert_eq!(code.card_code, 4660);
//!         assert_eq!(code.format_name, "26-bit facility");
//!     }
//!     Resolution::Unrecognized { length } => panic!("unrecognized {length}-bit frame"),
//! }
//! ```

pub mod bitstream;
pub mod capture;
pub mod catalog;
pub mod format;
pub mod resolver;

pub use bitstream::BitStream;
pub use capture::{CaptureConfig, EdgeSender, Frame, FrameReceiver};
pub use catalog::FormatCatalog;
pub use format::{
    BitRange, FormatDescriptor, HID_CORPORATE_1000_35, HID_H10304_37, WIEGAND_26_FACILITY,
    WIEGAND_26_NO_FACILITY,
};
pub use resolver::{DecodedCode, FormatResolver, Resolution, extract_bits};
