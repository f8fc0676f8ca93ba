//! EZH logger core library for offline dump decoding.
//!
//! This crate implements the decode pipeline used by the CLI: a byte source
//! feeds a `RecordStream`, which drives the layout catalog's header/record
//! parsers and normalizes every measurement into one canonical shape.
//! Parsing is byte-oriented and side-effect free; all I/O is isolated in
//! `source` modules. Revision differences (field order, widths, which
//! clock fields exist) live as data in the `format::layout` catalog, so
//! decoders carry no per-version branching.
//!
//! Invariants:
//! - A stream's layout never changes mid-session; widths and byte order
//!   come from the catalog, never inferred from record contents.
//! - Missing sensor fields normalize to absent values, never zero.
//! - Reports are deterministic: the same dump bytes and layout hint always
//!   produce the same JSON.
//!
//! Version française (résumé):
//! Cette crate fournit le cœur de décodage hors ligne : source d'octets ->
//! flux de session -> catalogue de révisions -> enregistrements normalisés.
//! Les E/S restent dans `source`, les différences de révision dans le
//! catalogue `format::layout`. Garanties : révision fixe par session,
//! capteurs absents distincts de zéro, rapports déterministes.
//!
//! # Examples
//! ```no_run
//! use std::path::Path;
//!
//! use ezhlog_core::{LayoutId, decode_dump_file};
//!
//! let report = decode_dump_file(Path::new("session.ezh"), Some(LayoutId::V1))?;
//! println!("decoded {} records", report.records_decoded);
//! # Ok::<(), ezhlog_core::DecodeError>(())
//! ```

use serde::{Deserialize, Serialize};

mod decode;
mod format;
mod source;

pub use decode::{DecodeError, RecordStream, StreamState, decode_dump_file, decode_source};
pub use format::encode::{encode_header, encode_record};
pub use format::error::{FormatError, ParseLayoutError, UnresolvedFormat};
pub use format::layout::{
    ByteOrder, FieldRole, FieldSpec, LayoutId, LayoutSpec, RTC_VALID_BIT, SERIAL_BAUD,
};
pub use format::normalize::{normalize, session_summary};
pub use format::parser::{RawHeader, RawRecord, parse_header, parse_record};
pub use format::resolve::resolve_layout;
pub use source::{ByteSource, FileSource, SliceSource, SourceError};

/// Current report schema version.
pub const REPORT_VERSION: u32 = 1;
/// Default timestamp used when the session has no trustworthy RTC value.
pub const DEFAULT_GENERATED_AT: &str = "1970-01-01T00:00:00Z";

/// Decoded dump report with deterministic contents.
///
/// # Examples
/// ```
/// use ezhlog_core::{InputInfo, LayoutId, SessionSummary, build_report};
///
/// let session = SessionSummary {
///     layout: LayoutId::V1,
///     declared_records: 0,
///     flags: 0,
///     rtc_valid: false,
///     rtc_seconds: Some(0),
///     rtc_time: None,
///     uptime_anchor_ms: Some(0),
/// };
/// let input = InputInfo {
///     path: "session.ezh".to_string(),
///     bytes: 11,
/// };
/// let report = build_report(input, session, Vec::new(), None);
/// assert_eq!(report.report_version, ezhlog_core::REPORT_VERSION);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DumpReport {
    /// Report schema version (not the firmware revision).
    pub report_version: u32,
    /// Tool identification metadata.
    pub tool: ToolInfo,
    /// RFC3339 timestamp; the session RTC when valid, else a fixed default.
    pub generated_at: String,

    /// Input dump metadata.
    pub input: InputInfo,

    /// Session header summary.
    pub session: SessionSummary,
    /// Number of records successfully decoded and normalized.
    pub records_decoded: u32,
    /// Normalized records in dump order.
    pub records: Vec<NormalizedRecord>,
    /// Decode error text when the dump ended early; absent on clean dumps.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Tool metadata embedded in reports.
///
/// # Examples
/// ```
/// use ezhlog_core::ToolInfo;
///
/// let tool = ToolInfo {
///     name: "ezhlog".to_string(),
///     version: "0.2.0".to_string(),
/// };
/// assert_eq!(tool.name, "ezhlog");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolInfo {
    /// Tool name (e.g., "ezhlog").
    pub name: String,
    /// Tool version (semver).
    pub version: String,
}

/// Input dump metadata embedded in reports.
///
/// # Examples
/// ```
/// use ezhlog_core::InputInfo;
///
/// let input = InputInfo {
///     path: "session.ezh".to_string(),
///     bytes: 29,
/// };
/// assert_eq!(input.bytes, 29);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputInfo {
    /// Input path as provided to the decoder.
    pub path: String,
    /// Input size in bytes.
    pub bytes: u64,
}

/// Session-level facts decoded from the dump header.
///
/// # Examples
/// ```
/// use ezhlog_core::{LayoutId, SessionSummary};
///
/// let session = SessionSummary {
///     layout: LayoutId::V4,
///     declared_records: 2,
///     flags: 1,
///     rtc_valid: true,
///     rtc_seconds: Some(1_600_000_000),
///     rtc_time: Some("2020-09-13T12:26:40Z".to_string()),
///     uptime_anchor_ms: None,
/// };
/// assert_eq!(session.declared_records, 2);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSummary {
    /// Firmware revision the dump was decoded under.
    pub layout: LayoutId,
    /// Record count the header declares.
    pub declared_records: u16,
    /// Raw header flags word.
    pub flags: u16,
    /// Whether the flags mark the RTC value as trustworthy.
    pub rtc_valid: bool,
    /// Raw RTC seconds from the header, where the revision has them.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rtc_seconds: Option<u32>,
    /// RFC3339 rendering of the RTC value (valid RTC only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rtc_time: Option<String>,
    /// Device uptime captured alongside the RTC, where the revision has it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uptime_anchor_ms: Option<u32>,
}

/// Canonical measurement, layout-independent.
///
/// Temperatures stay in raw sensor units; revisions without the sensors
/// leave them absent rather than zero, so a missing probe can never read
/// as a freezing one.
///
/// # Examples
/// ```
/// use ezhlog_core::NormalizedRecord;
///
/// let record = NormalizedRecord {
///     elapsed_ms: 510,
///     pulse_count: 1,
///     air_temp_raw: Some(200),
///     water_temp_raw: Some(210),
///     epoch_seconds: None,
/// };
/// assert_eq!(record.pulse_count, 1);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NormalizedRecord {
    /// Device uptime at capture, milliseconds since logger start.
    pub elapsed_ms: u64,
    /// Pulse count widened from the source width (8- or 16-bit), lossless.
    pub pulse_count: u32,
    /// Raw air temperature reading, where the revision has the sensor.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub air_temp_raw: Option<u16>,
    /// Raw water temperature reading, where the revision has the sensor.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub water_temp_raw: Option<u16>,
    /// Wall-clock seconds, derivable only from a valid session RTC.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub epoch_seconds: Option<u64>,
}

/// Assemble a report from decoded pieces.
///
/// `generated_at` mirrors the session RTC when it was valid so reports stay
/// reproducible; dumps without wall-clock data use a fixed default.
///
/// # Examples
/// ```
/// use ezhlog_core::{DEFAULT_GENERATED_AT, InputInfo, LayoutId, SessionSummary, build_report};
///
/// let session = SessionSummary {
///     layout: LayoutId::V2,
///     declared_records: 0,
///     flags: 0,
///     rtc_valid: false,
///     rtc_seconds: Some(0),
///     rtc_time: None,
///     uptime_anchor_ms: Some(0),
/// };
/// let input = InputInfo {
///     path: "session.ezh".to_string(),
///     bytes: 11,
/// };
/// let report = build_report(input, session, Vec::new(), None);
/// assert_eq!(report.generated_at, DEFAULT_GENERATED_AT);
/// ```
pub fn build_report(
    input: InputInfo,
    session: SessionSummary,
    records: Vec<NormalizedRecord>,
    error: Option<String>,
) -> DumpReport {
    let generated_at = session
        .rtc_time
        .clone()
        .unwrap_or_else(|| DEFAULT_GENERATED_AT.to_string());
    DumpReport {
        report_version: REPORT_VERSION,
        tool: ToolInfo {
            name: "ezhlog".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        },
        generated_at,
        input,
        session,
        records_decoded: records.len() as u32,
        records,
        error,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_omits_optional_fields_when_none() {
        let report = DumpReport {
            report_version: REPORT_VERSION,
            tool: ToolInfo {
                name: "ezhlog".to_string(),
                version: "0.2.0".to_string(),
            },
            generated_at: DEFAULT_GENERATED_AT.to_string(),
            input: InputInfo {
                path: "session.ezh".to_string(),
                bytes: 1,
            },
            session: SessionSummary {
                layout: LayoutId::V4,
                declared_records: 1,
                flags: 0,
                rtc_valid: false,
                rtc_seconds: Some(0),
                rtc_time: None,
                uptime_anchor_ms: None,
            },
            records_decoded: 1,
            records: vec![NormalizedRecord {
                elapsed_ms: 1,
                pulse_count: 0,
                air_temp_raw: None,
                water_temp_raw: None,
                epoch_seconds: None,
            }],
            error: None,
        };

        let value = serde_json::to_value(&report).expect("report json");
        assert!(value.get("error").is_none());

        let session = value.get("session").expect("session");
        assert_eq!(session["layout"], "v4");
        assert!(session.get("rtc_time").is_none());
        assert!(session.get("uptime_anchor_ms").is_none());

        let record = &value["records"][0];
        assert!(record.get("air_temp_raw").is_none());
        assert!(record.get("water_temp_raw").is_none());
        assert!(record.get("epoch_seconds").is_none());
    }

    #[test]
    fn generated_at_prefers_session_rtc_time() {
        let session = SessionSummary {
            layout: LayoutId::V1,
            declared_records: 0,
            flags: 1,
            rtc_valid: true,
            rtc_seconds: Some(1_234_567_890),
            rtc_time: Some("2009-02-13T23:31:30Z".to_string()),
            uptime_anchor_ms: Some(0),
        };
        let input = InputInfo {
            path: "session.ezh".to_string(),
            bytes: 11,
        };
        let report = build_report(input, session, Vec::new(), None);
        assert_eq!(report.generated_at, "2009-02-13T23:31:30Z");
        assert_eq!(report.records_decoded, 0);
    }
}
