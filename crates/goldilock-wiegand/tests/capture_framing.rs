//! Integration tests for frame capture feeding the resolver.

use goldilock_core::EdgeKind;
use goldilock_core::constants::MAX_BITS;
use goldilock_wiegand::{
    BitStream, CaptureConfig, EdgeSender, FormatCatalog, FormatDescriptor, FormatResolver,
    FrameReceiver, HID_CORPORATE_1000_35, HID_H10304_37, Resolution, WIEGAND_26_FACILITY,
    capture,
};
use rstest::rstest;
use std::thread;

const IDLE_TICKS: u32 = 8;

fn send(sender: &EdgeSender, bits: &BitStream) {
    for bit in bits {
        sender.on_edge(EdgeKind::from_bit(bit));
    }
}

/// Tick until a frame is ready, failing after a generous bound.
fn wait_ready(receiver: &mut FrameReceiver) -> u32 {
    for ticks in 1..=IDLE_TICKS * 4 {
        if receiver.tick() {
            return ticks;
        }
    }
    panic!("frame never became ready");
}

#[rstest]
#[case(1)]
#[case(26)]
#[case(37)]
#[case(MAX_BITS)]
fn test_burst_then_silence_yields_one_frame(#[case] n: usize) {
    let (sender, mut receiver) = capture::channel(CaptureConfig::default().idle_ticks(IDLE_TICKS));

    for i in 0..n {
        sender.on_edge(EdgeKind::from_bit(i % 3 == 0));
        // Gaps shorter than the idle window keep the frame open.
        for _ in 0..IDLE_TICKS - 1 {
            assert!(!receiver.tick());
        }
    }

    assert_eq!(wait_ready(&mut receiver), 1);
    let frame = receiver.take_frame().unwrap();
    assert_eq!(frame.len(), n);
    assert!(receiver.take_frame().is_none());

    for _ in 0..IDLE_TICKS * 2 {
        assert!(!receiver.tick());
    }
}

#[rstest]
#[case(WIEGAND_26_FACILITY, 7, 4660)]
#[case(HID_CORPORATE_1000_35, 2048, 999_999)]
#[case(HID_H10304_37, 31337, 262_143)]
fn test_captured_frame_resolves(
    #[case] format: FormatDescriptor,
    #[case] facility: u64,
    #[case] card: u64,
) {
    let (sender, mut receiver) = capture::channel(CaptureConfig::default().idle_ticks(IDLE_TICKS));
    send(&sender, &format.encode(facility, card).unwrap());
    wait_ready(&mut receiver);

    let frame = receiver.take_frame().unwrap();
    let code = FormatResolver::standard()
        .resolve(frame.bits())
        .decoded()
        .cloned()
        .unwrap();
    assert_eq!((code.facility_code, code.card_code), (facility, card));
}

#[test]
fn test_overflowed_frame_is_unrecognized() {
    let (sender, mut receiver) = capture::channel(CaptureConfig::default().idle_ticks(IDLE_TICKS));
    for _ in 0..MAX_BITS * 2 {
        sender.on_edge(EdgeKind::One);
    }
    wait_ready(&mut receiver);

    let frame = receiver.take_frame().unwrap();
    assert_eq!(frame.len(), MAX_BITS);
    assert_eq!(frame.overflow(), MAX_BITS);
    assert_eq!(
        FormatResolver::standard().resolve(frame.bits()),
        Resolution::Unrecognized { length: MAX_BITS }
    );
}

#[test]
fn test_overflowed_frame_matches_format_of_buffer_size() {
    let card = goldilock_wiegand::BitRange::new(0, 64);
    let catch_all = FormatDescriptor::new("full buffer", MAX_BITS, None, card).unwrap();
    let resolver = FormatResolver::new(FormatCatalog::new(vec![catch_all]).unwrap());

    let (sender, mut receiver) = capture::channel(CaptureConfig::default().idle_ticks(IDLE_TICKS));
    for _ in 0..MAX_BITS + 10 {
        sender.on_edge(EdgeKind::One);
    }
    wait_ready(&mut receiver);

    let frame = receiver.take_frame().unwrap();
    assert!(resolver.resolve(frame.bits()).is_decoded());
}

#[test]
fn test_consecutive_cards_are_framed_separately() {
    let (sender, mut receiver) = capture::channel(CaptureConfig::default().idle_ticks(IDLE_TICKS));
    let resolver = FormatResolver::standard();

    let cards = [(1, 100), (2, 200), (3, 300)];
    for (facility, card) in cards {
        send(&sender, &WIEGAND_26_FACILITY.encode(facility, card).unwrap());
        wait_ready(&mut receiver);
        let frame = receiver.take_frame().unwrap();
        let code = resolver.resolve(frame.bits()).decoded().cloned().unwrap();
        assert_eq!((code.facility_code, code.card_code), (facility, card));
    }
    assert_eq!(receiver.rejected_edges(), 0);
}

#[test]
fn test_producer_thread_and_polling_consumer() {
    let (sender, mut receiver) = capture::channel(CaptureConfig::default().idle_ticks(IDLE_TICKS));
    let expected = HID_H10304_37.encode(4242, 123_456).unwrap();
    let to_send = expected.clone();

    let producer = thread::spawn(move || {
        for bit in &to_send {
            sender.on_edge(EdgeKind::from_bit(bit));
        }
    });
    producer.join().unwrap();

    assert!(receiver.is_orphaned());
    wait_ready(&mut receiver);
    let frame = receiver.take_frame().unwrap();
    assert_eq!(frame.bits(), &expected);
}

#[test]
fn test_concurrent_producers_never_lose_or_reorder_within_a_sender() {
    // Bits from one producer arrive in its own order even when a second
    // producer interleaves with it.
    let (sender, mut receiver) = capture::channel(CaptureConfig::default().idle_ticks(IDLE_TICKS));
    let ones = sender.clone();

    let a = thread::spawn(move || {
        for _ in 0..40 {
            sender.on_edge(EdgeKind::Zero);
        }
    });
    let b = thread::spawn(move || {
        for _ in 0..40 {
            ones.on_edge(EdgeKind::One);
        }
    });
    a.join().unwrap();
    b.join().unwrap();

    wait_ready(&mut receiver);
    let frame = receiver.take_frame().unwrap();
    assert_eq!(frame.len(), 80);
    assert_eq!(frame.bits().iter().filter(|&bit| bit).count(), 40);
}
