//! End-to-end tests for the reader pipeline: edge source, capture, resolution.

use goldilock_hardware::{
    AnyEdgeSource, LineEdgeSource, ReaderConfig, ReaderEvent, ReaderHandle, ReaderManager,
};
use goldilock_wiegand::{
    FormatResolver, HID_CORPORATE_1000_35, HID_H10304_37, Resolution, WIEGAND_26_FACILITY,
};
use std::io::Cursor;
use std::time::Duration;

fn start_replay(input: String) -> ReaderHandle {
    let config = ReaderConfig::default()
        .idle_ticks(5)
        .tick_interval(Duration::from_millis(1));
    let source = LineEdgeSource::new(Cursor::new(input.into_bytes()), Duration::from_millis(50));

    let mut manager = ReaderManager::new(config, FormatResolver::standard());
    manager.register_source(AnyEdgeSource::Lines(source));
    manager.start()
}

async fn collect(mut handle: ReaderHandle) -> (Vec<Resolution>, bool) {
    let mut resolutions = Vec::new();
    let mut closed = false;

    while let Some(event) = handle.recv().await {
        match event {
            ReaderEvent::FrameResolved { resolution, .. } => resolutions.push(resolution),
            ReaderEvent::SourceClosed => closed = true,
            other => panic!("unexpected event: {other:?}"),
        }
    }
    (resolutions, closed)
}

#[tokio::test(start_paused = true)]
async fn test_replayed_lines_resolve_in_order() {
    let input = format!(
        "# replay\n{}\n{}\n{}\n",
        WIEGAND_26_FACILITY.encode(7, 4660).unwrap(),
        HID_CORPORATE_1000_35.encode(4095, 1_048_575).unwrap(),
        HID_H10304_37.encode(65_535, 1).unwrap(),
    );

    let (resolutions, closed) = collect(start_replay(input)).await;

    let codes: Vec<_> = resolutions
        .iter()
        .map(|r| {
            let code = r.decoded().unwrap();
            (code.format_name.to_string(), code.facility_code, code.card_code)
        })
        .collect();

    assert_eq!(
        codes,
        vec![
            (WIEGAND_26_FACILITY.name().to_string(), 7, 4660),
            (HID_CORPORATE_1000_35.name().to_string(), 4095, 1_048_575),
            (HID_H10304_37.name().to_string(), 65_535, 1),
        ]
    );
    assert!(closed);
}

#[tokio::test(start_paused = true)]
async fn test_unknown_length_is_reported_not_dropped() {
    let input = "1111 0000 1111 0000 1111 0000 1\n".to_string();

    let (resolutions, closed) = collect(start_replay(input)).await;

    assert_eq!(resolutions, vec![Resolution::Unrecognized { length: 25 }]);
    assert!(closed);
}

#[tokio::test(start_paused = true)]
async fn test_empty_replay_closes_without_frames() {
    let (resolutions, closed) = collect(start_replay("# nothing here\n\n".to_string())).await;

    assert!(resolutions.is_empty());
    assert!(closed);
}

#[tokio::test(start_paused = true)]
async fn test_malformed_line_does_not_stop_the_replay() {
    let input = format!(
        "{}\n10a01\n{}\n",
        WIEGAND_26_FACILITY.encode(1, 2).unwrap(),
        WIEGAND_26_FACILITY.encode(3, 4).unwrap(),
    );

    let (resolutions, closed) = collect(start_replay(input)).await;

    let codes: Vec<_> = resolutions
        .iter()
        .map(|r| {
            let code = r.decoded().unwrap();
            (code.facility_code, code.card_code)
        })
        .collect();
    assert_eq!(codes, vec![(1, 2), (3, 4)]);
    assert!(closed);
}
