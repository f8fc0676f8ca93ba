//! Field-for-field encoders for the catalog layouts.
//!
//! Used by the fixture generator and round-trip tests; the logger firmware
//! is the only producer of real dumps.

use super::layout::{ByteOrder, FieldRole, FieldSpec};
use super::parser::{RawHeader, RawRecord};

/// Encode a header exactly as the firmware revision tagged on it would.
/// Fields the layout does not carry are skipped; `None` values for fields
/// it does carry encode as zero.
pub fn encode_header(header: &RawHeader) -> Vec<u8> {
    let layout = header.layout;
    let mut bytes = Vec::with_capacity(layout.header_size());
    for spec in layout.spec().header {
        let value = match spec.role {
            FieldRole::RecordCount => u64::from(header.record_count),
            FieldRole::RtcSeconds => u64::from(header.rtc_secs.unwrap_or(0)),
            FieldRole::ElapsedMillis => u64::from(header.uptime_ms.unwrap_or(0)),
            FieldRole::Flags => u64::from(header.flags),
            role => unreachable!("{role:?} cannot appear in a header layout"),
        };
        push_field(&mut bytes, spec, value);
    }
    bytes
}

/// Encode one record per its layout's record field list.
pub fn encode_record(record: &RawRecord) -> Vec<u8> {
    let layout = record.layout;
    let mut bytes = Vec::with_capacity(layout.record_size());
    for spec in layout.spec().record {
        let value = match spec.role {
            FieldRole::ElapsedMillis => u64::from(record.elapsed_ms),
            FieldRole::PulseCount => u64::from(record.pulse_count),
            FieldRole::AirTemp => u64::from(record.air_temp.unwrap_or(0)),
            FieldRole::WaterTemp => u64::from(record.water_temp.unwrap_or(0)),
            role => unreachable!("{role:?} cannot appear in a record layout"),
        };
        push_field(&mut bytes, spec, value);
    }
    bytes
}

fn push_field(bytes: &mut Vec<u8>, spec: &FieldSpec, value: u64) {
    let width = usize::from(spec.width);
    let le = value.to_le_bytes();
    match spec.order {
        ByteOrder::Little => bytes.extend_from_slice(&le[..width]),
        ByteOrder::Big => bytes.extend(le[..width].iter().rev()),
    }
}
