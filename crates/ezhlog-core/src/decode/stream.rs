use crate::NormalizedRecord;
use crate::format::error::FormatError;
use crate::format::layout::LayoutId;
use crate::format::normalize::normalize;
use crate::format::parser::{RawHeader, parse_header, parse_record};
use crate::source::ByteSource;

use super::DecodeError;

/// Decode progress, for callers inspecting a stream mid-flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamState {
    /// No bytes consumed yet.
    Start,
    /// Header decoded; records still expected.
    Reading,
    /// Declared record count reached without error.
    Done,
    /// Decode stopped early; records already yielded remain valid.
    Failed,
}

/// Lazy record stream over one dump session.
///
/// The header is decoded on the first pull, then one record per pull until
/// the declared count is exhausted. The layout never changes mid-stream.
/// Streams are not restartable: construct a fresh one to re-read a source.
///
/// # Examples
/// ```
/// use ezhlog_core::{LayoutId, RecordStream, SliceSource, StreamState};
///
/// // v1 header declaring zero records.
/// let bytes = [0x00, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0];
/// let mut stream = RecordStream::new(LayoutId::V1, SliceSource::new(&bytes));
/// assert!(stream.next().is_none());
/// assert_eq!(stream.state(), StreamState::Done);
/// ```
pub struct RecordStream<S> {
    source: S,
    layout: LayoutId,
    scratch: Vec<u8>,
    decoded: u32,
    phase: Phase,
}

#[derive(Debug, Clone, Copy)]
enum Phase {
    Start,
    Reading { header: RawHeader, remaining: u16 },
    Done { header: RawHeader },
    Failed { header: Option<RawHeader> },
}

impl<S: ByteSource> RecordStream<S> {
    pub fn new(layout: LayoutId, source: S) -> Self {
        Self {
            source,
            layout,
            scratch: Vec::new(),
            decoded: 0,
            phase: Phase::Start,
        }
    }

    pub fn layout(&self) -> LayoutId {
        self.layout
    }

    /// Records successfully yielded so far.
    pub fn records_decoded(&self) -> u32 {
        self.decoded
    }

    /// Session header, available once the first pull has consumed it.
    pub fn header(&self) -> Option<&RawHeader> {
        match &self.phase {
            Phase::Start => None,
            Phase::Reading { header, .. } | Phase::Done { header } => Some(header),
            Phase::Failed { header } => header.as_ref(),
        }
    }

    pub fn state(&self) -> StreamState {
        match self.phase {
            Phase::Start => StreamState::Start,
            Phase::Reading { .. } => StreamState::Reading,
            Phase::Done { .. } => StreamState::Done,
            Phase::Failed { .. } => StreamState::Failed,
        }
    }

    fn pull_header(&mut self) -> Result<RawHeader, DecodeError> {
        let size = self.layout.header_size();
        self.scratch.resize(size, 0);
        read_exact_or_truncated(&mut self.source, &mut self.scratch, self.decoded)?;
        parse_header(self.layout, &self.scratch).map_err(|err| self.map_format(err))
    }

    fn pull_record(&mut self, header: &RawHeader) -> Result<NormalizedRecord, DecodeError> {
        let size = self.layout.record_size();
        self.scratch.resize(size, 0);
        read_exact_or_truncated(&mut self.source, &mut self.scratch, self.decoded)?;
        let record = parse_record(self.layout, &self.scratch).map_err(|err| self.map_format(err))?;
        Ok(normalize(header, &record))
    }

    fn map_format(&self, err: FormatError) -> DecodeError {
        match err {
            FormatError::TooShort { needed, actual } => DecodeError::TruncatedInput {
                needed,
                available: actual,
                decoded: self.decoded,
            },
        }
    }
}

fn read_exact_or_truncated<S: ByteSource>(
    source: &mut S,
    buf: &mut [u8],
    decoded: u32,
) -> Result<(), DecodeError> {
    let filled = source
        .read_up_to(buf)
        .map_err(|err| DecodeError::Source {
            decoded,
            source: err,
        })?;
    if filled < buf.len() {
        return Err(DecodeError::TruncatedInput {
            needed: buf.len(),
            available: filled,
            decoded,
        });
    }
    Ok(())
}

impl<S: ByteSource> Iterator for RecordStream<S> {
    type Item = Result<NormalizedRecord, DecodeError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match self.phase {
                Phase::Start => match self.pull_header() {
                    Ok(header) => {
                        self.phase = Phase::Reading {
                            header,
                            remaining: header.record_count,
                        };
                    }
                    Err(err) => {
                        self.phase = Phase::Failed { header: None };
                        return Some(Err(err));
                    }
                },
                Phase::Reading { header, remaining } => {
                    if remaining == 0 {
                        self.phase = Phase::Done { header };
                        return None;
                    }
                    match self.pull_record(&header) {
                        Ok(record) => {
                            self.decoded += 1;
                            self.phase = Phase::Reading {
                                header,
                                remaining: remaining - 1,
                            };
                            return Some(Ok(record));
                        }
                        Err(err) => {
                            self.phase = Phase::Failed {
                                header: Some(header),
                            };
                            return Some(Err(err));
                        }
                    }
                }
                Phase::Done { .. } | Phase::Failed { .. } => return None,
            }
        }
    }
}
