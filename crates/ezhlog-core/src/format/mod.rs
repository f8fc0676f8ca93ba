//! EZH dump format support.
//!
//! Format handling follows a layered structure:
//! - `layout`: the revision catalog (field order, widths, byte order);
//!   the single source of truth for every known firmware revision
//! - `reader`: safe byte access driven by catalog field descriptions
//! - `parser`: domain-level decoding (no direct byte indexing)
//! - `normalize`: canonical units and wall-clock derivation
//! - `encode`: field-for-field encoders for fixtures and round-trip tests
//! - `resolve`: layout selection for non-self-describing dumps
//! - `error`: explicit, actionable errors
//!
//! Parsers are pure and contain no I/O; byte sources and the stream driver
//! live in `source` and `decode`.

pub mod encode;
pub mod error;
pub mod layout;
pub mod normalize;
pub mod parser;
pub mod reader;
pub mod resolve;
