use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::error::ParseLayoutError;

/// Serial rate every firmware revision uses for dump mode.
pub const SERIAL_BAUD: u32 = 115_200;

/// Flags bit set by the firmware when the RTC held a battery-backed value
/// at capture time. Shared by all revisions to date.
pub const RTC_VALID_BIT: u16 = 0x0001;

/// One firmware revision's dump format.
///
/// Dumps are not self-describing, so the id always comes from the caller
/// (device label, capture notes) via the resolver.
///
/// # Examples
/// ```
/// use ezhlog_core::LayoutId;
///
/// let layout: LayoutId = "v4".parse()?;
/// assert_eq!(layout, LayoutId::V4);
/// assert_eq!(layout.header_size(), 8);
/// # Ok::<(), ezhlog_core::ParseLayoutError>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutId {
    V1,
    V2,
    V3,
    V4,
}

/// Semantic role of one packed field, independent of width or position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldRole {
    RecordCount,
    RtcSeconds,
    ElapsedMillis,
    Flags,
    PulseCount,
    AirTemp,
    WaterTemp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteOrder {
    Little,
    Big,
}

/// One packed field: role, byte width, byte order, signedness.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub role: FieldRole,
    pub width: u8,
    pub order: ByteOrder,
    pub signed: bool,
}

impl FieldSpec {
    /// Little-endian unsigned field, the shape every logger revision emits.
    pub const fn le(role: FieldRole, width: u8) -> Self {
        Self {
            role,
            width,
            order: ByteOrder::Little,
            signed: false,
        }
    }
}

/// Field-by-field description of one revision's header and record.
///
/// Sizes are derived by summing widths; the firmware writes these structs
/// packed, so there is never padding between fields.
#[derive(Debug, Clone, Copy)]
pub struct LayoutSpec {
    pub header: &'static [FieldSpec],
    pub record: &'static [FieldSpec],
    /// Flags bit marking the header RTC value as trustworthy.
    pub rtc_valid_mask: u16,
}

const V1_HEADER: &[FieldSpec] = &[
    FieldSpec::le(FieldRole::RecordCount, 1),
    FieldSpec::le(FieldRole::RtcSeconds, 4),
    FieldSpec::le(FieldRole::ElapsedMillis, 4),
    FieldSpec::le(FieldRole::Flags, 2),
];

const V1_RECORD: &[FieldSpec] = &[
    FieldSpec::le(FieldRole::ElapsedMillis, 4),
    FieldSpec::le(FieldRole::PulseCount, 1),
    FieldSpec::le(FieldRole::AirTemp, 2),
    FieldSpec::le(FieldRole::WaterTemp, 2),
];

// Rev 2 firmware kept rev 1's byte shape; only record internals were
// renamed. It stays a separate entry because devices report it as a
// distinct revision and future rev 2 patches may diverge.
const V2_HEADER: &[FieldSpec] = V1_HEADER;
const V2_RECORD: &[FieldSpec] = V1_RECORD;

// Rev 3 renamed the header uptime field to "micros" but kept millisecond
// units and the four-byte width, so the role stays ElapsedMillis.
const V3_HEADER: &[FieldSpec] = V1_HEADER;
const V3_RECORD: &[FieldSpec] = V1_RECORD;

// Rev 4 dropped the temperature sensors, widened the pulse counter to
// sixteen bits, and moved the RTC value first. There is no header uptime
// field; the RTC is latched at boot instead of at dump time.
const V4_HEADER: &[FieldSpec] = &[
    FieldSpec::le(FieldRole::RtcSeconds, 4),
    FieldSpec::le(FieldRole::RecordCount, 2),
    FieldSpec::le(FieldRole::Flags, 2),
];

const V4_RECORD: &[FieldSpec] = &[
    FieldSpec::le(FieldRole::ElapsedMillis, 4),
    FieldSpec::le(FieldRole::PulseCount, 2),
];

const V1_SPEC: LayoutSpec = LayoutSpec {
    header: V1_HEADER,
    record: V1_RECORD,
    rtc_valid_mask: RTC_VALID_BIT,
};

const V2_SPEC: LayoutSpec = LayoutSpec {
    header: V2_HEADER,
    record: V2_RECORD,
    rtc_valid_mask: RTC_VALID_BIT,
};

const V3_SPEC: LayoutSpec = LayoutSpec {
    header: V3_HEADER,
    record: V3_RECORD,
    rtc_valid_mask: RTC_VALID_BIT,
};

const V4_SPEC: LayoutSpec = LayoutSpec {
    header: V4_HEADER,
    record: V4_RECORD,
    rtc_valid_mask: RTC_VALID_BIT,
};

impl LayoutId {
    /// Every known revision, oldest first.
    pub const ALL: [LayoutId; 4] = [LayoutId::V1, LayoutId::V2, LayoutId::V3, LayoutId::V4];

    /// Catalog entry for this revision. Total over the closed id set; a new
    /// revision means one more entry here and nothing else changes.
    pub fn spec(self) -> &'static LayoutSpec {
        match self {
            LayoutId::V1 => &V1_SPEC,
            LayoutId::V2 => &V2_SPEC,
            LayoutId::V3 => &V3_SPEC,
            LayoutId::V4 => &V4_SPEC,
        }
    }

    /// Fixed header size in bytes for this revision.
    pub fn header_size(self) -> usize {
        packed_size(self.spec().header)
    }

    /// Fixed record size in bytes for this revision.
    pub fn record_size(self) -> usize {
        packed_size(self.spec().record)
    }

    /// Flags bit marking the header RTC value as trustworthy.
    pub fn rtc_valid_mask(self) -> u16 {
        self.spec().rtc_valid_mask
    }

    pub fn name(self) -> &'static str {
        match self {
            LayoutId::V1 => "v1",
            LayoutId::V2 => "v2",
            LayoutId::V3 => "v3",
            LayoutId::V4 => "v4",
        }
    }
}

impl fmt::Display for LayoutId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for LayoutId {
    type Err = ParseLayoutError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "v1" => Ok(LayoutId::V1),
            "v2" => Ok(LayoutId::V2),
            "v3" => Ok(LayoutId::V3),
            "v4" => Ok(LayoutId::V4),
            _ => Err(ParseLayoutError(value.to_string())),
        }
    }
}

const fn packed_size(fields: &[FieldSpec]) -> usize {
    let mut total = 0;
    let mut index = 0;
    while index < fields.len() {
        total += fields[index].width as usize;
        index += 1;
    }
    total
}
