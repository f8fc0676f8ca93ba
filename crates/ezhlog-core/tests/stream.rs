use std::io;

use ezhlog_core::{
    ByteSource, DecodeError, LayoutId, RawHeader, RawRecord, RecordStream, SliceSource,
    SourceError, StreamState, encode_header, encode_record,
};

fn v1_header(record_count: u16, rtc_secs: u32, uptime_ms: u32, flags: u16) -> RawHeader {
    RawHeader {
        layout: LayoutId::V1,
        record_count,
        rtc_secs: Some(rtc_secs),
        uptime_ms: Some(uptime_ms),
        flags,
    }
}

fn v1_record(elapsed_ms: u32, pulse_count: u16, air: u16, water: u16) -> RawRecord {
    RawRecord {
        layout: LayoutId::V1,
        elapsed_ms,
        pulse_count,
        air_temp: Some(air),
        water_temp: Some(water),
    }
}

fn dump(header: &RawHeader, records: &[RawRecord]) -> Vec<u8> {
    let mut bytes = encode_header(header);
    for record in records {
        bytes.extend_from_slice(&encode_record(record));
    }
    bytes
}

// Serves a fixed number of reads from the inner slice, then errors.
struct DetachingSource<'a> {
    inner: SliceSource<'a>,
    reads_left: u32,
}

impl ByteSource for DetachingSource<'_> {
    fn read_up_to(&mut self, buf: &mut [u8]) -> Result<usize, SourceError> {
        if self.reads_left == 0 {
            return Err(SourceError::Io(io::Error::other("device detached")));
        }
        self.reads_left -= 1;
        self.inner.read_up_to(buf)
    }
}

#[test]
fn v1_stream_yields_declared_records_in_order() {
    let header = v1_header(2, 1000, 500, 0);
    let records = [v1_record(510, 1, 200, 210), v1_record(520, 2, 201, 211)];
    let bytes = dump(&header, &records);

    let mut stream = RecordStream::new(LayoutId::V1, SliceSource::new(&bytes));

    let first = stream.next().expect("first record").expect("decodes");
    assert_eq!(first.elapsed_ms, 510);
    assert_eq!(first.pulse_count, 1);
    assert_eq!(first.air_temp_raw, Some(200));
    assert_eq!(first.water_temp_raw, Some(210));
    assert_eq!(first.epoch_seconds, None);

    let second = stream.next().expect("second record").expect("decodes");
    assert_eq!(second.elapsed_ms, 520);
    assert_eq!(second.pulse_count, 2);
    assert_eq!(second.air_temp_raw, Some(201));
    assert_eq!(second.water_temp_raw, Some(211));

    assert!(stream.next().is_none());
    assert_eq!(stream.state(), StreamState::Done);
    assert_eq!(stream.records_decoded(), 2);
}

#[test]
fn missing_final_record_fails_with_partial_count() {
    let header = v1_header(3, 1000, 500, 0);
    let records = [v1_record(510, 1, 200, 210), v1_record(520, 2, 201, 211)];
    let bytes = dump(&header, &records);

    let mut stream = RecordStream::new(LayoutId::V1, SliceSource::new(&bytes));
    assert!(stream.next().expect("first").is_ok());
    assert!(stream.next().expect("second").is_ok());

    let err = stream.next().expect("third pull").unwrap_err();
    match err {
        DecodeError::TruncatedInput {
            needed,
            available,
            decoded,
        } => {
            assert_eq!(needed, 9);
            assert_eq!(available, 0);
            assert_eq!(decoded, 2);
        }
        other => panic!("unexpected error: {other:?}"),
    }

    assert!(stream.next().is_none());
    assert_eq!(stream.state(), StreamState::Failed);
    assert_eq!(stream.records_decoded(), 2);
    assert!(stream.header().is_some());
}

#[test]
fn partial_trailing_record_reports_available_bytes() {
    let header = v1_header(3, 1000, 500, 0);
    let records = [v1_record(510, 1, 200, 210), v1_record(520, 2, 201, 211)];
    let mut bytes = dump(&header, &records);
    bytes.extend_from_slice(&530u32.to_le_bytes());

    let mut stream = RecordStream::new(LayoutId::V1, SliceSource::new(&bytes));
    assert!(stream.next().expect("first").is_ok());
    assert!(stream.next().expect("second").is_ok());

    let err = stream.next().expect("third pull").unwrap_err();
    match err {
        DecodeError::TruncatedInput {
            needed,
            available,
            decoded,
        } => {
            assert_eq!(needed, 9);
            assert_eq!(available, 4);
            assert_eq!(decoded, 2);
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn truncated_header_fails_before_any_record() {
    let bytes = [0u8; 5];
    let mut stream = RecordStream::new(LayoutId::V1, SliceSource::new(&bytes));

    let err = stream.next().expect("header pull").unwrap_err();
    match err {
        DecodeError::TruncatedInput {
            needed,
            available,
            decoded,
        } => {
            assert_eq!(needed, 11);
            assert_eq!(available, 5);
            assert_eq!(decoded, 0);
        }
        other => panic!("unexpected error: {other:?}"),
    }

    assert!(stream.next().is_none());
    assert_eq!(stream.state(), StreamState::Failed);
    assert!(stream.header().is_none());
}

#[test]
fn source_failure_mid_stream_fails_with_partial_count() {
    let header = v1_header(3, 1000, 500, 0);
    let records = [v1_record(510, 1, 200, 210), v1_record(520, 2, 201, 211)];
    let bytes = dump(&header, &records);
    // Three reads cover the header and two records; the next pull errors.
    let source = DetachingSource {
        inner: SliceSource::new(&bytes),
        reads_left: 3,
    };

    let mut stream = RecordStream::new(LayoutId::V1, source);
    assert!(stream.next().expect("first").is_ok());
    assert!(stream.next().expect("second").is_ok());

    let err = stream.next().expect("third pull").unwrap_err();
    match err {
        DecodeError::Source { decoded, source } => {
            assert_eq!(decoded, 2);
            assert!(matches!(source, SourceError::Io(_)));
        }
        other => panic!("unexpected error: {other:?}"),
    }

    assert!(stream.next().is_none());
    assert_eq!(stream.state(), StreamState::Failed);
    assert_eq!(stream.records_decoded(), 2);
    assert!(stream.header().is_some());
}

#[test]
fn bytes_past_declared_count_are_ignored() {
    let header = v1_header(1, 1000, 500, 0);
    let records = [v1_record(510, 1, 200, 210)];
    let mut bytes = dump(&header, &records);
    bytes.extend_from_slice(&encode_record(&v1_record(520, 2, 201, 211)));

    let mut stream = RecordStream::new(LayoutId::V1, SliceSource::new(&bytes));
    assert!(stream.next().expect("first").is_ok());
    assert!(stream.next().is_none());
    assert_eq!(stream.state(), StreamState::Done);
    assert_eq!(stream.records_decoded(), 1);
}

#[test]
fn v1_stream_derives_dump_anchored_epochs() {
    let header = v1_header(2, 1_234_567_890, 1000, 1);
    let records = [v1_record(1500, 0, 150, 155), v1_record(2500, 3, 160, 165)];
    let bytes = dump(&header, &records);

    let stream = RecordStream::new(LayoutId::V1, SliceSource::new(&bytes));
    let decoded: Vec<_> = stream.map(|item| item.expect("record decodes")).collect();

    assert_eq!(decoded.len(), 2);
    assert_eq!(decoded[0].epoch_seconds, Some(1_234_567_890));
    assert_eq!(decoded[1].epoch_seconds, Some(1_234_567_891));
}

#[test]
fn v4_stream_derives_boot_anchored_epochs() {
    let header = RawHeader {
        layout: LayoutId::V4,
        record_count: 2,
        rtc_secs: Some(1_600_000_000),
        uptime_ms: None,
        flags: 1,
    };
    let records = [
        RawRecord {
            layout: LayoutId::V4,
            elapsed_ms: 250,
            pulse_count: 300,
            air_temp: None,
            water_temp: None,
        },
        RawRecord {
            layout: LayoutId::V4,
            elapsed_ms: 1250,
            pulse_count: 65_535,
            air_temp: None,
            water_temp: None,
        },
    ];
    let bytes = dump(&header, &records);

    let stream = RecordStream::new(LayoutId::V4, SliceSource::new(&bytes));
    let decoded: Vec<_> = stream.map(|item| item.expect("record decodes")).collect();

    assert_eq!(decoded.len(), 2);
    assert_eq!(decoded[0].pulse_count, 300);
    assert_eq!(decoded[0].epoch_seconds, Some(1_600_000_000));
    assert_eq!(decoded[0].air_temp_raw, None);
    assert_eq!(decoded[0].water_temp_raw, None);
    assert_eq!(decoded[1].pulse_count, 65_535);
    assert_eq!(decoded[1].epoch_seconds, Some(1_600_000_001));
}
