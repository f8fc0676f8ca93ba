use time::{OffsetDateTime, format_description::well_known::Rfc3339};

use super::parser::{RawHeader, RawRecord};
use crate::{NormalizedRecord, SessionSummary};

/// Map one raw record into the canonical shape.
///
/// Total over well-formed header/record pairs; it never fails on data.
/// Passing a header and record decoded under different layouts is a caller
/// bug and panics.
pub fn normalize(header: &RawHeader, record: &RawRecord) -> NormalizedRecord {
    assert_eq!(
        header.layout, record.layout,
        "header and record decoded under different layouts"
    );

    NormalizedRecord {
        elapsed_ms: u64::from(record.elapsed_ms),
        pulse_count: u32::from(record.pulse_count),
        air_temp_raw: record.air_temp,
        water_temp_raw: record.water_temp,
        epoch_seconds: epoch_seconds(header, record),
    }
}

/// Wall-clock seconds for one record, when the session RTC allows it.
///
/// Requires the RTC-valid flags bit for the layout; an unset bit means the
/// clock was running from power-on and its value is meaningless.
fn epoch_seconds(header: &RawHeader, record: &RawRecord) -> Option<u64> {
    if header.flags & header.layout.rtc_valid_mask() == 0 {
        return None;
    }
    let rtc = i64::from(header.rtc_secs?);
    let delta_ms = match header.uptime_ms {
        // The RTC was latched together with this uptime value at dump
        // time, so each record sits at a signed offset from that anchor
        // (records are written before the dump, hence usually negative).
        // The subtraction is modulo 2^32 to survive uptime rollover.
        Some(anchor) => i64::from(record.elapsed_ms.wrapping_sub(anchor) as i32),
        // No anchor field: the RTC was latched at boot and uptime counts
        // from the same instant.
        None => i64::from(record.elapsed_ms),
    };
    u64::try_from(rtc + delta_ms.div_euclid(1000)).ok()
}

/// Session-level summary derived from a decoded header.
pub fn session_summary(header: &RawHeader) -> SessionSummary {
    let rtc_valid = header.flags & header.layout.rtc_valid_mask() != 0;
    SessionSummary {
        layout: header.layout,
        declared_records: header.record_count,
        flags: header.flags,
        rtc_valid,
        rtc_seconds: header.rtc_secs,
        rtc_time: if rtc_valid {
            header.rtc_secs.and_then(rtc_to_rfc3339)
        } else {
            None
        },
        uptime_anchor_ms: header.uptime_ms,
    }
}

fn rtc_to_rfc3339(secs: u32) -> Option<String> {
    OffsetDateTime::from_unix_timestamp(i64::from(secs))
        .ok()
        .and_then(|dt| dt.format(&Rfc3339).ok())
}
