//! Dump decoding drivers.
//!
//! `RecordStream` is the lazy state machine (header first, then records);
//! `decode_dump_file` and `decode_source` run one to completion and build
//! the JSON-ready report the CLI serializes.

mod stream;

pub use stream::{RecordStream, StreamState};

use std::path::Path;

use thiserror::Error;

use crate::format::error::UnresolvedFormat;
use crate::format::layout::LayoutId;
use crate::format::normalize::session_summary;
use crate::format::resolve::resolve_layout;
use crate::source::{ByteSource, FileSource, SourceError};
use crate::{DumpReport, InputInfo, build_report};

#[derive(Debug, Error)]
pub enum DecodeError {
    /// The source ended mid-read. `decoded` counts records already yielded.
    #[error("input truncated: need {needed} bytes, got {available} ({decoded} records decoded)")]
    TruncatedInput {
        needed: usize,
        available: usize,
        decoded: u32,
    },
    #[error(transparent)]
    Unresolved(#[from] UnresolvedFormat),
    /// The byte source itself failed; not a framing problem.
    #[error("source error after {decoded} records: {source}")]
    Source {
        decoded: u32,
        #[source]
        source: SourceError,
    },
}

impl DecodeError {
    /// Records successfully decoded before the failure.
    pub fn records_decoded(&self) -> u32 {
        match self {
            DecodeError::TruncatedInput { decoded, .. } | DecodeError::Source { decoded, .. } => {
                *decoded
            }
            DecodeError::Unresolved(_) => 0,
        }
    }
}

/// Decode a stored dump file into a report.
///
/// Fails outright when the layout cannot be resolved or the header itself
/// is unreadable; a failure mid-records instead produces a report carrying
/// the partial records plus the error text, so callers decide whether
/// partial data is usable.
///
/// # Examples
/// ```no_run
/// use std::path::Path;
///
/// use ezhlog_core::{LayoutId, decode_dump_file};
///
/// let report = decode_dump_file(Path::new("session.ezh"), Some(LayoutId::V1))?;
/// println!("decoded {} records", report.records_decoded);
/// # Ok::<(), ezhlog_core::DecodeError>(())
/// ```
pub fn decode_dump_file(path: &Path, hint: Option<LayoutId>) -> Result<DumpReport, DecodeError> {
    let layout = resolve_layout(hint)?;
    let source = FileSource::open(path).map_err(|err| DecodeError::Source {
        decoded: 0,
        source: err,
    })?;
    let bytes = path
        .metadata()
        .map_err(|err| DecodeError::Source {
            decoded: 0,
            source: SourceError::Io(err),
        })?
        .len();
    let input = InputInfo {
        path: path.display().to_string(),
        bytes,
    };
    decode_source(input, layout, source)
}

/// Decode an already-opened byte source under a resolved layout.
pub fn decode_source<S: ByteSource>(
    input: InputInfo,
    layout: LayoutId,
    source: S,
) -> Result<DumpReport, DecodeError> {
    let mut stream = RecordStream::new(layout, source);
    let mut records = Vec::new();
    let mut failure = None;

    for item in &mut stream {
        match item {
            Ok(record) => records.push(record),
            Err(err) => {
                failure = Some(err);
                break;
            }
        }
    }

    let Some(header) = stream.header().copied() else {
        // The header never decoded, so there is no session to report on.
        return Err(failure.unwrap_or(DecodeError::TruncatedInput {
            needed: layout.header_size(),
            available: 0,
            decoded: 0,
        }));
    };

    let session = session_summary(&header);
    let error = failure.map(|err| err.to_string());
    Ok(build_report(input, session, records, error))
}
