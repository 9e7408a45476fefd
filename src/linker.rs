/*!

Linking exon candidates into a splice graph.

The [`GraphLinker`] takes the candidates of one chromosome strand and
proposes a junction from every interval `A` to every later interval
`B` that it could splice into in frame, across an intron of
acceptable length. Junctions are scored, and only those that rank
among the best [`LinkerConfig::max_links`] at both of their ends are
kept (see [`bounded`]).

The result is a [`LinkedIntervals`], which can be written to the
intermediate interval-graph file or split into genes with
[`LinkedIntervals::genes`].

*/

#[allow(unused_imports)]
use log::{debug, info, trace, warn};

use crate::config::LinkerConfig;
use crate::exon::Strand;
use crate::interval::io::IntervalRecord;
use crate::interval::IntervalCandidate;
use crate::scoring::{
    ExonPairScore, IntronLengthScore, PiecewiseQuadratic, Quadratic,
};

pub mod assembly;
pub mod bounded;

pub use self::assembly::{NoSequence, SequenceSource};
use self::bounded::{Admission, EdgeIndex};

/// Whether a codon split by the junction `a -> b` can be completed.
///
/// On the forward strand the partial codon after `a`'s last full
/// codon must be completed by the partial codon before `b`'s first;
/// on the reverse strand, transcription runs from `b` to `a` and the
/// roles of prefix and suffix swap.
pub fn frame_compatible(
    a: &IntervalCandidate,
    b: &IntervalCandidate,
    strand: Strand,
) -> bool {
    match strand {
        Strand::Forward => a.suffixes.complement().intersects(b.prefixes),
        Strand::Reverse => a.prefixes.complement().intersects(b.suffixes),
    }
}

/// Persisted weight of a junction score.
#[inline]
pub fn junction_weight(score: f64) -> i32 {
    (score * 100.0).round() as i32
}

/// A junction entering an interval.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Junction {
    /// Index of the upstream interval, in genomic order.
    pub source: usize,
    pub score: f64,
}

impl Junction {
    #[inline]
    pub fn weight(&self) -> i32 {
        junction_weight(self.score)
    }
}

/// The intervals of one chromosome strand, sorted by `(start, end)`,
/// with the junctions entering each of them.
#[derive(Debug, Clone, PartialEq)]
pub struct LinkedIntervals {
    strand: Strand,
    max_links: usize,
    intervals: Vec<IntervalCandidate>,
    back_links: Vec<Vec<Junction>>,
}

impl LinkedIntervals {
    #[inline]
    pub fn strand(&self) -> Strand {
        self.strand
    }

    /// Degree bound the junctions were selected under.
    #[inline]
    pub fn max_links(&self) -> usize {
        self.max_links
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.intervals.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.intervals.is_empty()
    }

    #[inline]
    pub fn intervals(&self) -> &[IntervalCandidate] {
        &self.intervals
    }

    #[inline]
    pub fn back_links(&self, ix: usize) -> &[Junction] {
        &self.back_links[ix]
    }

    pub fn junction_count(&self) -> usize {
        self.back_links.iter().map(|j| j.len()).sum()
    }

    /// Number of junctions leaving each interval.
    pub fn out_degrees(&self) -> Vec<usize> {
        let mut degrees = vec![0; self.intervals.len()];
        for junctions in self.back_links.iter() {
            for j in junctions.iter() {
                degrees[j.source] += 1;
            }
        }
        degrees
    }

    pub fn has_junction(&self, from: usize, to: usize) -> bool {
        self.back_links
            .get(to)
            .map(|js| js.iter().any(|j| j.source == from))
            .unwrap_or(false)
    }

    /// The records of the intermediate interval-graph file. Each
    /// junction is named by the end position of its upstream
    /// interval.
    pub fn records(&self) -> Vec<IntervalRecord> {
        self.intervals
            .iter()
            .zip(self.back_links.iter())
            .map(|(interval, junctions)| IntervalRecord {
                interval: interval.clone(),
                junctions: junctions
                    .iter()
                    .map(|j| (self.intervals[j.source].end, j.score as f32))
                    .collect(),
            })
            .collect()
    }
}

/// Connects the exon candidates of a chromosome strand into a
/// degree-bounded splice graph.
#[derive(Debug, Clone)]
pub struct GraphLinker<P = PiecewiseQuadratic, I = Quadratic> {
    config: LinkerConfig,
    pair_score: P,
    intron_score: I,
}

impl GraphLinker {
    pub fn new(config: LinkerConfig) -> Self {
        GraphLinker {
            config,
            pair_score: PiecewiseQuadratic::exon_pair(),
            intron_score: Quadratic::intron_length(),
        }
    }
}

impl Default for GraphLinker {
    fn default() -> Self {
        GraphLinker::new(LinkerConfig::default())
    }
}

impl<P, I> GraphLinker<P, I>
where
    P: ExonPairScore,
    I: IntronLengthScore,
{
    pub fn with_scoring(
        config: LinkerConfig,
        pair_score: P,
        intron_score: I,
    ) -> Self {
        GraphLinker {
            config,
            pair_score,
            intron_score,
        }
    }

    #[inline]
    pub fn config(&self) -> &LinkerConfig {
        &self.config
    }

    /// Score of the junction `a -> b`.
    pub fn edge_score(
        &self,
        a: &IntervalCandidate,
        b: &IntervalCandidate,
    ) -> f64 {
        let intron = b.start - a.end;
        self.pair_score.score(a.score.saturating_add(b.score))
            + self.intron_score.score(intron)
    }

    /// Sort, merge and link the candidates of one chromosome strand.
    pub fn link(
        &self,
        intervals: Vec<IntervalCandidate>,
        strand: Strand,
    ) -> LinkedIntervals {
        let intervals = prepare(intervals);
        let min_intron = self.config.min_intron;
        let max_intron = self.config.max_intron;

        let mut index = EdgeIndex::new(intervals.len(), self.config.max_links);
        let mut accepted = 0usize;
        let mut rejected = 0usize;

        // best junction from `a` per downstream start position
        let mut desirable: Vec<(i32, f64, usize)> = Vec::new();

        for (a_ix, a) in intervals.iter().enumerate() {
            if !a.can_link_forward(strand) {
                continue;
            }

            let nearest = a.end.saturating_add(min_intron);
            let first_b = intervals.partition_point(|b| b.start < nearest);

            desirable.clear();
            for (b_ix, b) in intervals.iter().enumerate().skip(first_b) {
                let intron = b.start - a.end;
                if intron > max_intron {
                    break;
                }
                if !b.can_link_back(strand)
                    || !frame_compatible(a, b, strand)
                {
                    continue;
                }

                let score = self.edge_score(a, b);
                match desirable.last_mut() {
                    Some(last) if last.0 == b.start => {
                        if score > last.1 {
                            *last = (b.start, score, b_ix);
                        }
                    }
                    _ => desirable.push((b.start, score, b_ix)),
                }
            }

            for &(_, score, b_ix) in desirable.iter() {
                match index.offer(a_ix, b_ix, score) {
                    Admission::Rejected => rejected += 1,
                    _ => accepted += 1,
                }
            }
        }

        debug_assert!(index.is_symmetric());

        let back_links = (0..intervals.len())
            .map(|ix| {
                let mut junctions: Vec<Junction> = index
                    .incoming(ix)
                    .iter()
                    .map(|e| Junction {
                        source: e.peer,
                        score: e.score,
                    })
                    .collect();
                junctions.sort_by_key(|j| j.source);
                junctions
            })
            .collect();

        let linked = LinkedIntervals {
            strand,
            max_links: self.config.max_links,
            intervals,
            back_links,
        };

        debug!(
            "linked {} {} intervals with {} junctions ({} offers accepted, {} rejected)",
            linked.len(),
            strand,
            linked.junction_count(),
            accepted,
            rejected
        );

        linked
    }
}

/// Drop malformed candidates, sort the rest by `(start, end)` and
/// merge duplicates.
fn prepare(intervals: Vec<IntervalCandidate>) -> Vec<IntervalCandidate> {
    let mut intervals: Vec<_> = intervals
        .into_iter()
        .filter(|iv| {
            if iv.is_empty() {
                warn!(
                    "skipping empty interval candidate {}..{}",
                    iv.start, iv.end
                );
                false
            } else {
                true
            }
        })
        .collect();
    intervals.sort_by_key(|iv| iv.key());

    let mut merged: Vec<IntervalCandidate> =
        Vec::with_capacity(intervals.len());
    for iv in intervals {
        match merged.last_mut() {
            Some(last) if last.key() == iv.key() => last.merge(&iv),
            _ => merged.push(iv),
        }
    }
    merged
}
