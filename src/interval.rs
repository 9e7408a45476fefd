/*!

Scored genomic intervals, before they become exons.

An exon predictor reports each putative exon as a
[`RawInterval`]: coordinates, a score, a strand, a linkage type and
the offset of the first complete codon. [`RawInterval::candidate`]
turns that into an [`IntervalCandidate`], which records the codon
phase and which partial-codon lengths are legal at either end of the
interval. Those sets are what the linker uses to decide whether two
intervals can be spliced together in frame.

*/

use std::str::FromStr;

use crate::error::ParseError;
use crate::exon::Strand;

pub mod io;

/// How an exon prediction may sit inside a transcript.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LinkageType {
    Internal,
    First,
    Terminal,
    Single,
}

impl LinkageType {
    #[inline]
    pub fn is_first(self) -> bool {
        matches!(self, LinkageType::First | LinkageType::Single)
    }

    #[inline]
    pub fn is_last(self) -> bool {
        matches!(self, LinkageType::Terminal | LinkageType::Single)
    }
}

impl FromStr for LinkageType {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Internal" => Ok(LinkageType::Internal),
            "First" => Ok(LinkageType::First),
            "Terminal" => Ok(LinkageType::Terminal),
            "Single" => Ok(LinkageType::Single),
            _ => Err(ParseError::UnknownFeature(s.to_string())),
        }
    }
}

/// A subset of `{0, 1, 2}`, packed in the low three bits of a byte.
///
/// Used both for codon phases and for legal partial-codon lengths.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct FrameSet(u8);

impl FrameSet {
    pub const EMPTY: FrameSet = FrameSet(0);
    pub const ALL: FrameSet = FrameSet(0b111);

    #[inline]
    pub fn from_bits(bits: u8) -> Self {
        FrameSet(bits & 0b111)
    }

    #[inline]
    pub fn single(frame: u8) -> Self {
        debug_assert!(frame < 3);
        FrameSet(1 << (frame % 3))
    }

    #[inline]
    pub fn bits(self) -> u8 {
        self.0
    }

    #[inline]
    pub fn contains(self, frame: u8) -> bool {
        frame < 3 && self.0 & (1 << frame) != 0
    }

    #[inline]
    pub fn insert(&mut self, frame: u8) {
        if frame < 3 {
            self.0 |= 1 << frame;
        }
    }

    #[inline]
    pub fn union(self, other: Self) -> Self {
        FrameSet(self.0 | other.0)
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Map every partial-codon length to the length that completes
    /// the codon on the other side of a junction: `0 -> 0, 1 -> 2,
    /// 2 -> 1`.
    #[inline]
    pub fn complement(self) -> Self {
        let bit = |from: u8, to: u8| ((self.0 >> from) & 1) << to;
        FrameSet(bit(0, 0) | bit(1, 2) | bit(2, 1))
    }

    #[inline]
    pub fn intersects(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }

    pub fn iter(self) -> impl Iterator<Item = u8> {
        (0..3u8).filter(move |&f| self.contains(f))
    }
}

/// An exon candidate: a genomic interval with its frame information.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntervalCandidate {
    pub start: i32,
    pub end: i32,
    /// Prediction score, scaled by 100.
    pub score: i32,
    /// Genomic positions (mod 3) at which a codon may start.
    pub phases: FrameSet,
    /// Legal lengths of the partial codon before the first full codon.
    pub prefixes: FrameSet,
    /// Legal lengths of the partial codon after the last full codon.
    pub suffixes: FrameSet,
    pub first: bool,
    pub last: bool,
}

impl IntervalCandidate {
    pub fn new(start: i32, end: i32, score: i32) -> Self {
        IntervalCandidate {
            start,
            end,
            score,
            phases: FrameSet::EMPTY,
            prefixes: FrameSet::EMPTY,
            suffixes: FrameSet::EMPTY,
            first: false,
            last: false,
        }
    }

    #[inline]
    pub fn len(&self) -> i32 {
        self.end - self.start
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    #[inline]
    pub fn key(&self) -> (i32, i32) {
        (self.start, self.end)
    }

    /// Fold another prediction for the same interval into this one.
    pub fn merge(&mut self, other: &IntervalCandidate) {
        debug_assert_eq!(self.key(), other.key());
        self.score = self.score.max(other.score);
        self.phases = self.phases.union(other.phases);
        self.prefixes = self.prefixes.union(other.prefixes);
        self.suffixes = self.suffixes.union(other.suffixes);
        self.first |= other.first;
        self.last |= other.last;
    }

    /// Whether this interval may open a junction (be its upstream
    /// side in genomic order) on `strand`.
    #[inline]
    pub fn can_link_forward(&self, strand: Strand) -> bool {
        match strand {
            Strand::Forward => !self.last,
            Strand::Reverse => !self.first,
        }
    }

    /// Whether this interval may close a junction (be its downstream
    /// side in genomic order) on `strand`.
    #[inline]
    pub fn can_link_back(&self, strand: Strand) -> bool {
        match strand {
            Strand::Forward => !self.first,
            Strand::Reverse => !self.last,
        }
    }

    /// Pack the frame sets and linkage flags into one word, see
    /// [`io`].
    pub fn frame_flags(&self) -> i32 {
        let mut flags = self.phases.bits() as i32;
        if self.first {
            flags |= 1 << 3;
        }
        if self.last {
            flags |= 1 << 4;
        }
        flags |= (self.prefixes.bits() as i32) << 5;
        flags |= (self.suffixes.bits() as i32) << 8;
        flags
    }

    pub fn set_frame_flags(&mut self, flags: i32) {
        self.phases = FrameSet::from_bits(flags as u8);
        self.first = flags & (1 << 3) != 0;
        self.last = flags & (1 << 4) != 0;
        self.prefixes = FrameSet::from_bits((flags >> 5) as u8);
        self.suffixes = FrameSet::from_bits((flags >> 8) as u8);
    }
}

/// One exon prediction as reported by the gene finder.
#[derive(Debug, Clone, PartialEq)]
pub struct RawInterval {
    /// 0-based, inclusive.
    pub start: i32,
    /// 0-based, exclusive.
    pub end: i32,
    pub score: f64,
    pub strand: Strand,
    pub linkage: LinkageType,
    /// Number of bases before the first complete codon.
    pub frame: u8,
}

fn parse_number<T: FromStr>(
    field: &'static str,
    value: &str,
) -> Result<T, ParseError> {
    value.trim().parse().map_err(|_| ParseError::InvalidNumber {
        field,
        value: value.to_string(),
    })
}

impl RawInterval {
    /// Parse a tab-separated GeneID exon line:
    /// `seqname source feature start end score strand frame ...`
    /// with 1-based inclusive coordinates.
    pub fn parse_line(line: &str) -> Result<RawInterval, ParseError> {
        let fields: Vec<&str> = line.trim_end().split('\t').collect();
        if fields.len() < 8 {
            return Err(ParseError::MissingFields(fields.len()));
        }

        let start = parse_number::<i32>("start", fields[3])?.saturating_sub(1);
        let end = parse_number::<i32>("end", fields[4])?;
        let score = parse_number::<f64>("score", fields[5])?;
        let frame = parse_number::<i64>("frame", fields[7])?;

        let strand = Strand::from_symbol(fields[6].trim())
            .ok_or_else(|| ParseError::InvalidStrand(fields[6].to_string()))?;
        let linkage: LinkageType = fields[2].trim().parse()?;

        if !(0..3).contains(&frame) {
            return Err(ParseError::InvalidFrame(frame));
        }
        if end <= start {
            return Err(ParseError::EmptyInterval {
                start: start as i64,
                end: end as i64,
            });
        }

        Ok(RawInterval {
            start,
            end,
            score,
            strand,
            linkage,
            frame: frame as u8,
        })
    }

    /// The codon phase of the interval: the genomic position, modulo
    /// 3, at which its first complete codon starts.
    pub fn phase(&self) -> u8 {
        let frame = self.frame as i32;
        let phase = match self.strand {
            Strand::Forward => (self.start + frame).rem_euclid(3),
            Strand::Reverse => (self.end - 1 - frame).rem_euclid(3),
        };
        phase as u8
    }

    #[inline]
    pub fn prefix_len(&self) -> u8 {
        self.frame
    }

    #[inline]
    pub fn suffix_len(&self) -> u8 {
        (self.end - self.start - self.frame as i32).rem_euclid(3) as u8
    }

    /// Score scaled by 100 and truncated towards zero.
    #[inline]
    pub fn scaled_score(&self) -> i32 {
        (self.score * 100.0) as i32
    }

    pub fn candidate(&self) -> IntervalCandidate {
        let mut prefixes = FrameSet::EMPTY;
        prefixes.insert(self.prefix_len());
        let mut suffixes = FrameSet::EMPTY;
        suffixes.insert(self.suffix_len());

        IntervalCandidate {
            start: self.start,
            end: self.end,
            score: self.scaled_score(),
            phases: FrameSet::single(self.phase()),
            prefixes,
            suffixes,
            first: self.linkage.is_first(),
            last: self.linkage.is_last(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_set_complement() {
        assert_eq!(FrameSet::single(0).complement(), FrameSet::single(0));
        assert_eq!(FrameSet::single(1).complement(), FrameSet::single(2));
        assert_eq!(FrameSet::single(2).complement(), FrameSet::single(1));
        assert_eq!(FrameSet::ALL.complement(), FrameSet::ALL);
        assert_eq!(FrameSet::EMPTY.complement(), FrameSet::EMPTY);

        let mut set = FrameSet::EMPTY;
        set.insert(1);
        set.insert(2);
        assert_eq!(set.iter().collect::<Vec<_>>(), vec![1, 2]);
        assert!(set.intersects(FrameSet::single(2)));
        assert!(!set.intersects(FrameSet::single(0)));
    }

    #[test]
    fn parse_forward_line() {
        let line = "chr1\tgeneid_v1.2\tInternal\t101\t161\t2.5\t+\t1\t.\tchr1_1";
        let raw = RawInterval::parse_line(line).unwrap();

        assert_eq!(raw.start, 100);
        assert_eq!(raw.end, 161);
        assert_eq!(raw.strand, Strand::Forward);
        assert_eq!(raw.linkage, LinkageType::Internal);
        assert_eq!(raw.scaled_score(), 250);

        // codons start one base in, at genomic position 101
        assert_eq!(raw.phase(), 101 % 3);
        assert_eq!(raw.prefix_len(), 1);
        // 61 bases, 1 before the first codon, 60 in full codons
        assert_eq!(raw.suffix_len(), 0);
    }

    #[test]
    fn parse_reverse_line_phase() {
        let line = "chr1\tgeneid\tTerminal\t11\t30\t0.5\t-\t2";
        let raw = RawInterval::parse_line(line).unwrap();
        assert_eq!(raw.start, 10);
        assert_eq!(raw.end, 30);
        // first codon starts at end - 1 - frame = 27
        assert_eq!(raw.phase(), 0);
        assert_eq!(raw.suffix_len(), (20 - 2) % 3);

        let cand = raw.candidate();
        assert!(cand.last);
        assert!(!cand.first);
        assert_eq!(cand.phases, FrameSet::single(0));
        assert_eq!(cand.prefixes, FrameSet::single(2));
    }

    #[test]
    fn single_exon_is_first_and_last() {
        assert!(LinkageType::Single.is_first());
        assert!(LinkageType::Single.is_last());
        assert!(!LinkageType::Internal.is_first());
        assert!(!LinkageType::Internal.is_last());
    }

    #[test]
    fn malformed_lines() {
        let bad_start = "chr1\tgeneid\tInternal\tabc\t30\t0.5\t+\t0";
        assert_eq!(
            RawInterval::parse_line(bad_start),
            Err(ParseError::InvalidNumber {
                field: "start",
                value: "abc".to_string()
            })
        );

        let short = "chr1\tgeneid\tInternal\t1\t30";
        assert_eq!(
            RawInterval::parse_line(short),
            Err(ParseError::MissingFields(5))
        );

        let bad_frame = "chr1\tgeneid\tInternal\t1\t30\t0.5\t+\t4";
        assert_eq!(
            RawInterval::parse_line(bad_frame),
            Err(ParseError::InvalidFrame(4))
        );

        let not_exon = "chr1\tgeneid\tPromoter\t1\t30\t0.5\t+\t0";
        assert!(matches!(
            RawInterval::parse_line(not_exon),
            Err(ParseError::UnknownFeature(_))
        ));
    }

    #[test]
    fn frame_flags_roundtrip() {
        let mut cand = IntervalCandidate::new(10, 70, 300);
        cand.phases = FrameSet::from_bits(0b101);
        cand.prefixes = FrameSet::single(2);
        cand.suffixes = FrameSet::from_bits(0b011);
        cand.first = true;

        let mut other = IntervalCandidate::new(10, 70, 300);
        other.set_frame_flags(cand.frame_flags());
        assert_eq!(other, cand);
    }
}
