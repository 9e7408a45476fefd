/*!

Error types for every stage of the splice graph pipeline.

* [`ParseError`] is returned for a malformed exon prediction record;
  the interval filter skips such records and keeps going.
* [`GraphError`] is returned when an encoded gene record is corrupt
  or cannot be written.
* [`InvariantViolation`] reports a broken graph invariant. These are
  programming errors, found by [`validate`](crate::util::validate).

*/

use thiserror::Error;

use crate::exon::ExonId;

/// A single exon prediction record could not be read.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("record has {0} fields, expected at least 8")]
    MissingFields(usize),
    #[error("invalid {field} '{value}'")]
    InvalidNumber { field: &'static str, value: String },
    #[error("invalid strand '{0}'")]
    InvalidStrand(String),
    #[error("reading frame {0} is not one of 0, 1, 2")]
    InvalidFrame(i64),
    #[error("empty interval {start}..{end}")]
    EmptyInterval { start: i64, end: i64 },
    #[error("'{0}' is not an exon feature")]
    UnknownFeature(String),
}

/// Reading or writing an encoded gene failed, or a batch could not
/// be run.
#[derive(Error, Debug)]
pub enum GraphError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("gene {gene}: record truncated at byte {offset} while reading {field}")]
    Truncated {
        gene: usize,
        offset: u64,
        field: &'static str,
    },
    #[error(
        "gene {gene}, exon {exon}: sequence length {length} exceeds limit {limit} (byte {offset})"
    )]
    SequenceTooLong {
        gene: usize,
        exon: usize,
        length: i32,
        limit: usize,
        offset: u64,
    },
    #[error("gene {gene}: negative {field} {value} at byte {offset}")]
    NegativeCount {
        gene: usize,
        field: &'static str,
        value: i32,
        offset: u64,
    },
    #[error(
        "gene {gene}, exon {exon}: back-link to exon {target} outside 0..{exon_count} (byte {offset})"
    )]
    LinkOutOfRange {
        gene: usize,
        exon: usize,
        target: i32,
        exon_count: usize,
        offset: u64,
    },
    #[error("gene {gene}, exon {exon}: empty interval {start}..{end}")]
    EmptyInterval {
        gene: usize,
        exon: usize,
        start: i32,
        end: i32,
    },
    #[error("gene name is {0} bytes long, at most 256 fit in a record")]
    NameTooLong(usize),
    #[error("gene {gene} has {count} exons, more than a record can hold")]
    TooManyExons { gene: usize, count: usize },
    #[error("{0} unexpected bytes after the gene record")]
    TrailingBytes(usize),
    #[error("could not start the worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

/// Which side of an exon a degree bound was broken on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkSide {
    Back,
    Forward,
}

/// A gene graph broke one of its structural invariants.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvariantViolation {
    #[error("exon {exon} has empty interval {start}..{end}")]
    EmptyInterval { exon: ExonId, start: i32, end: i32 },
    #[error("exon {exon} links to missing exon {target}")]
    DanglingLink { exon: ExonId, target: ExonId },
    #[error(
        "link {source_exon} -> {target} (weight {weight}) is not mirrored on the other exon"
    )]
    AsymmetricLink {
        source_exon: ExonId,
        target: ExonId,
        weight: i32,
    },
    #[error("exon {exon} has {degree} {side:?} links, bound is {bound}")]
    DegreeExceeded {
        exon: ExonId,
        side: LinkSide,
        degree: usize,
        bound: usize,
    },
}
