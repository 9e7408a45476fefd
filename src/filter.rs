/*!

Deduplication of exon predictions for one chromosome strand.

The [`IntervalFilter`] keeps one [`IntervalCandidate`] per `(start,
end)`. Predictions for the same coordinates in different frames are
merged into it, so the candidate ends up with every phase, prefix and
suffix length any of them allowed.

*/

use std::io::BufRead;

use fnv::FnvHashMap;

#[allow(unused_imports)]
use log::{debug, info, trace, warn};

use crate::config::FilterConfig;
use crate::error::{GraphError, ParseError};
use crate::exon::Strand;
use crate::interval::{IntervalCandidate, RawInterval};

/// Counters collected while filtering.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterStats {
    pub lines: usize,
    pub accepted: usize,
    pub merged: usize,
    pub below_cutoff: usize,
    pub wrong_strand: usize,
    pub unknown_feature: usize,
    pub malformed: usize,
}

#[derive(Debug, Clone)]
pub struct IntervalFilter {
    strand: Strand,
    cutoff: f64,
    intervals: FnvHashMap<(i32, i32), IntervalCandidate>,
    stats: FilterStats,
}

impl IntervalFilter {
    pub fn new(config: &FilterConfig, strand: Strand) -> Self {
        IntervalFilter {
            strand,
            cutoff: config.score_cutoff(),
            intervals: FnvHashMap::default(),
            stats: FilterStats::default(),
        }
    }

    #[inline]
    pub fn strand(&self) -> Strand {
        self.strand
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
    pub fn stats(&self) -> FilterStats {
        self.stats
    }

    pub fn get(&self, start: i32, end: i32) -> Option<&IntervalCandidate> {
        self.intervals.get(&(start, end))
    }

    /// Add one prediction. Returns `true` if it was kept, either as a
    /// new candidate or merged into an existing one.
    pub fn insert(&mut self, raw: &RawInterval) -> bool {
        if raw.strand != self.strand {
            self.stats.wrong_strand += 1;
            return false;
        }
        if raw.score < self.cutoff {
            self.stats.below_cutoff += 1;
            return false;
        }
        if raw.end <= raw.start {
            self.stats.malformed += 1;
            return false;
        }

        let candidate = raw.candidate();
        self.stats.accepted += 1;
        match self.intervals.get_mut(&candidate.key()) {
            Some(existing) => {
                existing.merge(&candidate);
                self.stats.merged += 1;
            }
            None => {
                self.intervals.insert(candidate.key(), candidate);
            }
        }
        true
    }

    /// Parse and insert one prediction line. Blank and comment lines
    /// are ignored. A malformed line is logged and skipped.
    pub fn insert_line(&mut self, line: &str) {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            return;
        }
        self.stats.lines += 1;

        match RawInterval::parse_line(line) {
            Ok(raw) => {
                self.insert(&raw);
            }
            Err(ParseError::UnknownFeature(feature)) => {
                trace!("skipping {} record", feature);
                self.stats.unknown_feature += 1;
            }
            Err(err) => {
                warn!("skipping prediction record: {}", err);
                self.stats.malformed += 1;
            }
        }
    }

    /// Feed every line of a prediction file through the filter. Only
    /// I/O failures are returned; bad records are skipped.
    pub fn read_lines<R: BufRead>(
        &mut self,
        input: R,
    ) -> Result<FilterStats, GraphError> {
        for line in input.lines() {
            let line = line?;
            self.insert_line(&line);
        }
        debug!(
            "filtered {} {} predictions into {} intervals",
            self.stats.lines,
            self.strand,
            self.intervals.len()
        );
        Ok(self.stats)
    }

    /// The surviving candidates, sorted by `(start, end)`.
    pub fn into_sorted(self) -> Vec<IntervalCandidate> {
        let mut intervals: Vec<_> =
            self.intervals.into_iter().map(|(_, iv)| iv).collect();
        intervals.sort_by_key(|iv| iv.key());
        intervals
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Organism;
    use crate::interval::{FrameSet, LinkageType};

    fn raw(start: i32, end: i32, score: f64, frame: u8) -> RawInterval {
        RawInterval {
            start,
            end,
            score,
            strand: Strand::Forward,
            linkage: LinkageType::Internal,
            frame,
        }
    }

    #[test]
    fn same_coordinates_are_merged() {
        let mut filter =
            IntervalFilter::new(&FilterConfig::default(), Strand::Forward);

        assert!(filter.insert(&raw(100, 160, 1.0, 0)));
        let mut first = raw(100, 160, 2.5, 1);
        first.linkage = LinkageType::First;
        assert!(filter.insert(&first));

        assert_eq!(filter.len(), 1);
        let merged = filter.get(100, 160).unwrap();
        assert_eq!(merged.score, 250);
        assert_eq!(merged.prefixes, FrameSet::from_bits(0b011));
        // codons start at 100 and 101, phases 1 and 2
        assert_eq!(merged.phases, FrameSet::from_bits(0b110));
        // 60 bases: suffix 0 in frame 0, 2 in frame 1
        assert_eq!(merged.suffixes, FrameSet::from_bits(0b101));
        assert!(merged.first);
        assert!(!merged.last);
        assert_eq!(filter.stats().merged, 1);
    }

    #[test]
    fn cutoff_depends_on_organism() {
        let mut human =
            IntervalFilter::new(&FilterConfig::default(), Strand::Forward);
        let mut plant = IntervalFilter::new(
            &FilterConfig::for_organism(Organism::Arabidopsis),
            Strand::Forward,
        );

        for filter in [&mut human, &mut plant].iter_mut() {
            filter.insert(&raw(0, 30, -0.5, 0));
            filter.insert(&raw(40, 90, 3.6, 0));
            filter.insert(&raw(100, 130, -1.5, 0));
        }

        assert_eq!(human.len(), 2);
        assert_eq!(human.stats().below_cutoff, 1);
        assert_eq!(plant.len(), 1);
        assert_eq!(plant.stats().below_cutoff, 2);
    }

    #[test]
    fn other_strand_is_ignored() {
        let mut filter =
            IntervalFilter::new(&FilterConfig::default(), Strand::Reverse);
        assert!(!filter.insert(&raw(0, 30, 1.0, 0)));
        assert!(filter.is_empty());
        assert_eq!(filter.stats().wrong_strand, 1);
    }

    #[test]
    fn read_lines_skips_bad_records() {
        let input = "\
# gene predictions
chr1\tgeneid\tFirst\t1\t60\t2.0\t+\t0

chr1\tgeneid\tInternal\tten\t60\t2.0\t+\t0
chr1\tgeneid\tPromoter\t1\t60\t2.0\t+\t0
chr1\tgeneid\tTerminal\t301\t390\t0.5\t+\t2
chr1\tgeneid\tInternal\t501\t590\t0.5\t-\t2
";
        let mut filter =
            IntervalFilter::new(&FilterConfig::default(), Strand::Forward);
        let stats = filter.read_lines(input.as_bytes()).unwrap();

        assert_eq!(stats.lines, 5);
        assert_eq!(stats.accepted, 2);
        assert_eq!(stats.malformed, 1);
        assert_eq!(stats.unknown_feature, 1);
        assert_eq!(stats.wrong_strand, 1);

        let sorted = filter.into_sorted();
        let keys: Vec<_> = sorted.iter().map(|iv| iv.key()).collect();
        assert_eq!(keys, vec![(0, 60), (300, 390)]);
        assert!(sorted[0].first);
        assert!(sorted[1].last);
    }
}
