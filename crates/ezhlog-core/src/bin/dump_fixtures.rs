use std::fs;
use std::path::{Path, PathBuf};

use ezhlog_core::{LayoutId, RawHeader, RawRecord, encode_header, encode_record};

fn main() -> Result<(), String> {
    let root = PathBuf::from("tests/golden");
    for case in cases() {
        write_dump(&root, &case)?;
    }
    Ok(())
}

struct DumpCase {
    dir: &'static str,
    header: RawHeader,
    records: Vec<RawRecord>,
    /// Raw bytes appended after the records (truncation scenarios).
    trailing: Vec<u8>,
}

fn cases() -> Vec<DumpCase> {
    vec![
        DumpCase {
            dir: "v1_basic",
            header: header(LayoutId::V1, 2, 1000, Some(500), 0),
            records: vec![
                record(LayoutId::V1, 510, 1, Some(200), Some(210)),
                record(LayoutId::V1, 520, 2, Some(201), Some(211)),
            ],
            trailing: Vec::new(),
        },
        DumpCase {
            dir: "v1_rtc_valid",
            header: header(LayoutId::V1, 3, 1_234_567_890, Some(1000), 1),
            records: vec![
                record(LayoutId::V1, 1500, 0, Some(150), Some(155)),
                record(LayoutId::V1, 2500, 3, Some(160), Some(165)),
                record(LayoutId::V1, 3600, 255, Some(170), Some(175)),
            ],
            trailing: Vec::new(),
        },
        DumpCase {
            dir: "v1_truncated",
            header: header(LayoutId::V1, 3, 1000, Some(500), 1),
            records: vec![
                record(LayoutId::V1, 510, 1, Some(200), Some(210)),
                record(LayoutId::V1, 520, 2, Some(201), Some(211)),
            ],
            // The third record breaks off after its elapsed-ms field.
            trailing: encode_record(&record(LayoutId::V1, 530, 3, Some(202), Some(212)))[..4]
                .to_vec(),
        },
        DumpCase {
            dir: "v2_flags_clear",
            header: header(LayoutId::V2, 1, 0, Some(0), 0),
            records: vec![record(LayoutId::V2, 750, 12, Some(300), Some(280))],
            trailing: Vec::new(),
        },
        DumpCase {
            dir: "v3_session",
            header: header(LayoutId::V3, 1, 946_684_800, Some(10_000), 1),
            records: vec![record(LayoutId::V3, 12_345, 7, Some(300), Some(280))],
            trailing: Vec::new(),
        },
        DumpCase {
            dir: "v4_wide_pulse",
            header: header(LayoutId::V4, 2, 1_600_000_000, None, 1),
            records: vec![
                record(LayoutId::V4, 250, 300, None, None),
                record(LayoutId::V4, 1250, 65_535, None, None),
            ],
            trailing: Vec::new(),
        },
    ]
}

fn header(
    layout: LayoutId,
    record_count: u16,
    rtc_secs: u32,
    uptime_ms: Option<u32>,
    flags: u16,
) -> RawHeader {
    RawHeader {
        layout,
        record_count,
        rtc_secs: Some(rtc_secs),
        uptime_ms,
        flags,
    }
}

fn record(
    layout: LayoutId,
    elapsed_ms: u32,
    pulse_count: u16,
    air_temp: Option<u16>,
    water_temp: Option<u16>,
) -> RawRecord {
    RawRecord {
        layout,
        elapsed_ms,
        pulse_count,
        air_temp,
        water_temp,
    }
}

fn write_dump(root: &Path, case: &DumpCase) -> Result<(), String> {
    let dir = root.join(case.dir);
    fs::create_dir_all(&dir)
        .map_err(|err| format!("failed to create {}: {}", dir.display(), err))?;

    let mut bytes = encode_header(&case.header);
    for record in &case.records {
        bytes.extend_from_slice(&encode_record(record));
    }
    bytes.extend_from_slice(&case.trailing);

    let path = dir.join("input.ezh");
    fs::write(&path, bytes)
        .map_err(|err| format!("failed to write {}: {}", path.display(), err))?;
    Ok(())
}
