//! Deterministic transformation from raw backend text to structured
//! outline records.
//!
//! Pipeline: [`token`] turns lines into a typed stream, [`classify`]
//! groups the stream into segments, [`extract`] pulls canonical records
//! out of each segment, and [`table`] handles literal pipe tables.
//! Everything here is pure computation over a single string; parsing
//! anomalies degrade gracefully and never escape as errors.

pub mod classify;
pub mod extract;
pub mod normalize;
pub mod table;
pub mod token;

pub use classify::{classify, ClassifyContext, ClassifyOptions, Segment, SegmentKind};
pub use extract::{extract, parse_response, ParsedResponse};
pub use normalize::normalize;
pub use table::{find_table_block, parse_table};
