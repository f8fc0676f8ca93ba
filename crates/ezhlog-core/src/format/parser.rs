use super::error::FormatError;
use super::layout::{FieldRole, LayoutId};
use super::reader::FieldReader;

/// Decoded session header, shaped per the resolved layout.
///
/// Fields the layout does not carry stay `None`; the parser never invents
/// values for them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawHeader {
    pub layout: LayoutId,
    pub record_count: u16,
    pub rtc_secs: Option<u32>,
    /// Device uptime captured alongside the RTC, where the revision has it.
    pub uptime_ms: Option<u32>,
    pub flags: u16,
}

/// Decoded measurement fields for one record, shaped per the layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawRecord {
    pub layout: LayoutId,
    pub elapsed_ms: u32,
    pub pulse_count: u16,
    pub air_temp: Option<u16>,
    pub water_temp: Option<u16>,
}

/// Decode a session header from a buffer of at least the catalog-declared
/// header size. Flags and counts are opaque here; interpretation happens in
/// `normalize`.
pub fn parse_header(layout: LayoutId, bytes: &[u8]) -> Result<RawHeader, FormatError> {
    let mut reader = FieldReader::new(bytes);
    reader.require_len(layout.header_size())?;

    let mut header = RawHeader {
        layout,
        record_count: 0,
        rtc_secs: None,
        uptime_ms: None,
        flags: 0,
    };
    for spec in layout.spec().header {
        let value = reader.read_field(spec)?;
        match spec.role {
            FieldRole::RecordCount => header.record_count = value as u16,
            FieldRole::RtcSeconds => header.rtc_secs = Some(value as u32),
            FieldRole::ElapsedMillis => header.uptime_ms = Some(value as u32),
            FieldRole::Flags => header.flags = value as u16,
            role => unreachable!("{role:?} cannot appear in a header layout"),
        }
    }
    Ok(header)
}

/// Decode one record from a buffer of at least the catalog-declared record
/// size. Fixed-offset reads only; records carry no delimiters or length
/// prefixes.
pub fn parse_record(layout: LayoutId, bytes: &[u8]) -> Result<RawRecord, FormatError> {
    let mut reader = FieldReader::new(bytes);
    reader.require_len(layout.record_size())?;

    let mut record = RawRecord {
        layout,
        elapsed_ms: 0,
        pulse_count: 0,
        air_temp: None,
        water_temp: None,
    };
    for spec in layout.spec().record {
        let value = reader.read_field(spec)?;
        match spec.role {
            FieldRole::ElapsedMillis => record.elapsed_ms = value as u32,
            FieldRole::PulseCount => record.pulse_count = value as u16,
            FieldRole::AirTemp => record.air_temp = Some(value as u16),
            FieldRole::WaterTemp => record.water_temp = Some(value as u16),
            role => unreachable!("{role:?} cannot appear in a record layout"),
        }
    }
    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::{parse_header, parse_record};
    use crate::format::layout::LayoutId;

    #[test]
    fn exact_header_size_never_truncates() {
        for layout in LayoutId::ALL {
            let bytes = vec![0u8; layout.header_size()];
            assert!(parse_header(layout, &bytes).is_ok(), "{layout}");
        }
    }

    #[test]
    fn one_byte_short_header_always_truncates() {
        for layout in LayoutId::ALL {
            let bytes = vec![0u8; layout.header_size() - 1];
            let err = parse_header(layout, &bytes).unwrap_err();
            assert!(err.to_string().contains("too short"), "{layout}");
        }
    }

    #[test]
    fn exact_record_size_never_truncates() {
        for layout in LayoutId::ALL {
            let bytes = vec![0u8; layout.record_size()];
            assert!(parse_record(layout, &bytes).is_ok(), "{layout}");
        }
    }

    #[test]
    fn one_byte_short_record_always_truncates() {
        for layout in LayoutId::ALL {
            let bytes = vec![0u8; layout.record_size() - 1];
            assert!(parse_record(layout, &bytes).is_err(), "{layout}");
        }
    }

    #[test]
    fn parses_v1_header_fields() {
        let mut bytes = Vec::new();
        bytes.push(0x02);
        bytes.extend_from_slice(&1000u32.to_le_bytes());
        bytes.extend_from_slice(&500u32.to_le_bytes());
        bytes.extend_from_slice(&0u16.to_le_bytes());

        let header = parse_header(LayoutId::V1, &bytes).unwrap();
        assert_eq!(header.record_count, 2);
        assert_eq!(header.rtc_secs, Some(1000));
        assert_eq!(header.uptime_ms, Some(500));
        assert_eq!(header.flags, 0);
    }

    #[test]
    fn parses_v1_record_fields() {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&510u32.to_le_bytes());
        bytes.push(0x01);
        bytes.extend_from_slice(&200u16.to_le_bytes());
        bytes.extend_from_slice(&210u16.to_le_bytes());

        let record = parse_record(LayoutId::V1, &bytes).unwrap();
        assert_eq!(record.elapsed_ms, 510);
        assert_eq!(record.pulse_count, 1);
        assert_eq!(record.air_temp, Some(200));
        assert_eq!(record.water_temp, Some(210));
    }

    #[test]
    fn parses_v4_header_with_rtc_first_and_wide_count() {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&1_600_000_000u32.to_le_bytes());
        bytes.extend_from_slice(&400u16.to_le_bytes());
        bytes.extend_from_slice(&1u16.to_le_bytes());

        let header = parse_header(LayoutId::V4, &bytes).unwrap();
        assert_eq!(header.record_count, 400);
        assert_eq!(header.rtc_secs, Some(1_600_000_000));
        assert_eq!(header.uptime_ms, None);
        assert_eq!(header.flags, 1);
    }

    #[test]
    fn parses_v4_record_without_temperatures() {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&250u32.to_le_bytes());
        bytes.extend_from_slice(&300u16.to_le_bytes());

        let record = parse_record(LayoutId::V4, &bytes).unwrap();
        assert_eq!(record.elapsed_ms, 250);
        assert_eq!(record.pulse_count, 300);
        assert_eq!(record.air_temp, None);
        assert_eq!(record.water_temp, None);
    }

    #[test]
    fn trailing_bytes_beyond_declared_size_are_ignored() {
        let mut bytes = vec![0u8; LayoutId::V1.record_size()];
        bytes.extend_from_slice(&[0xAA, 0xBB]);
        assert!(parse_record(LayoutId::V1, &bytes).is_ok());
    }
}
