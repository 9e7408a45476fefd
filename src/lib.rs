/*!
Exon splice graphs for proteogenomic search.

# Overview

A gene is modelled as a directed graph of exons, where each edge is a
splice junction between two exons of the same chromosome strand.
Walking a path through the graph and concatenating the exon sequences
spells out one possible transcript (or protein), so a single graph
encodes every alternative splicing the junctions allow.

The crate covers the whole life cycle of such graphs:

* [`interval`] and [`filter`] read scored exon predictions and reduce
  them to one [`IntervalCandidate`](interval::IntervalCandidate) per
  distinct interval
* [`linker`] joins candidates into a bounded-degree splice graph and
  splits it into genes, scoring junctions with the functions in
  [`scoring`]
* [`codec`] reads and writes genes in a compact little-endian binary
  format
* [`reverse`] builds the reverse-orientation decoy of a gene
* [`matcher`] finds the longest prefix of a query that can be spelled
  along a path of a gene
* [`batch`] runs linking and matching over many chromosomes on a
  rayon pool


# `ExonId`s and `Link`s

The core types are defined in [`exon`] and [`genegraph`]:

* [`ExonId`](exon::ExonId) is a newtype used as an exon identifier,
  local to its gene
* [`Link`](exon::Link) is one end of a junction, with a weight and an
  optional bridging residue
* [`Gene`](genegraph::Gene) owns its exons, and keeps every junction
  both as a back link on the downstream exon and as a forward link on
  the upstream one

# Misc.

* [`config`] collects the tunable parameters, all with defaults
* [`error`] has the error types shared by the modules
* [`disjoint`] is a concurrent union-find, used to split linked
  intervals into genes
* [`util`] has DNA helpers and the graph invariant checker

*/

pub mod exon;
pub mod genegraph;

pub mod filter;
pub mod interval;
pub mod linker;
pub mod scoring;

pub mod codec;
pub mod matcher;
pub mod reverse;

pub mod batch;
pub mod config;
pub mod disjoint;
pub mod error;
pub mod util;

pub use crate::error::{GraphError, InvariantViolation, ParseError};
pub use crate::exon::{ExonId, Link, Strand};
pub use crate::genegraph::{Exon, Gene};
