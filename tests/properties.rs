use quickcheck::{Arbitrary, Gen, QuickCheck};

use splicegraph::{
    codec::{decode, encode},
    config::LinkerConfig,
    exon::{ExonId, Strand},
    genegraph::Gene,
    interval::{FrameSet, IntervalCandidate},
    linker::{frame_compatible, GraphLinker, LinkedIntervals},
    matcher::PathMatcher,
    reverse::reverse,
    util::validate::validate,
};

/// A random chromosome strand's worth of exon candidates.
#[derive(Debug, Clone)]
struct Candidates {
    strand: Strand,
    max_links: usize,
    intervals: Vec<IntervalCandidate>,
}

fn frame_set<G: Gen>(g: &mut G) -> FrameSet {
    FrameSet::from_bits(u8::arbitrary(g) % 7 + 1)
}

impl Arbitrary for Candidates {
    fn arbitrary<G: Gen>(g: &mut G) -> Self {
        let strand = if bool::arbitrary(g) {
            Strand::Reverse
        } else {
            Strand::Forward
        };
        let max_links = usize::arbitrary(g) % 4 + 1;
        let count = usize::arbitrary(g) % 24 + 1;

        let intervals = (0..count)
            .map(|_| {
                let start = (usize::arbitrary(g) % 100) as i32 * 150;
                let len = 10 + (usize::arbitrary(g) % 100) as i32 * 3;
                let mut iv = IntervalCandidate::new(
                    start,
                    start + len,
                    i32::arbitrary(g) * 10,
                );
                iv.phases = frame_set(g);
                iv.prefixes = frame_set(g);
                iv.suffixes = frame_set(g);
                iv.first = u8::arbitrary(g) % 5 == 0;
                iv.last = u8::arbitrary(g) % 5 == 0;
                iv
            })
            .collect();

        Candidates {
            strand,
            max_links,
            intervals,
        }
    }
}

fn genome() -> Vec<u8> {
    (0..16_000usize).map(|i| b"ACGT"[(i * 7 + i / 3) % 4]).collect()
}

impl Candidates {
    fn config(&self) -> LinkerConfig {
        LinkerConfig {
            max_links: self.max_links,
            ..LinkerConfig::default()
        }
    }

    fn link(&self) -> LinkedIntervals {
        GraphLinker::new(self.config())
            .link(self.intervals.clone(), self.strand)
    }

    fn genes(&self) -> Vec<Gene> {
        self.link().genes(7, &genome())
    }
}

#[test]
fn degree_is_bounded() {
    fn prop(input: Candidates) -> bool {
        let linked = input.link();
        let k = input.max_links;
        let in_ok = (0..linked.len()).all(|ix| linked.back_links(ix).len() <= k);
        let out_ok = linked.out_degrees().into_iter().all(|d| d <= k);
        let genes_ok = input
            .genes()
            .iter()
            .all(|gene| validate(gene, Some(k)).is_ok());
        in_ok && out_ok && genes_ok
    }
    QuickCheck::new()
        .tests(200)
        .quickcheck(prop as fn(Candidates) -> bool);
}

#[test]
fn junctions_respect_frames_and_introns() {
    fn prop(input: Candidates) -> bool {
        let linked = input.link();
        let strand = linked.strand();
        let config = input.config();
        let intervals = linked.intervals();

        (0..linked.len()).all(|to| {
            linked.back_links(to).iter().all(|j| {
                let a = &intervals[j.source];
                let b = &intervals[to];
                let intron = b.start - a.end;
                frame_compatible(a, b, strand)
                    && a.can_link_forward(strand)
                    && b.can_link_back(strand)
                    && intron >= config.min_intron
                    && intron <= config.max_intron
            })
        })
    }
    QuickCheck::new()
        .tests(200)
        .quickcheck(prop as fn(Candidates) -> bool);
}

#[test]
fn encoding_round_trips() {
    fn prop(input: Candidates) -> bool {
        input.genes().iter().all(|gene| match encode(gene) {
            Ok(bytes) => match decode(&bytes) {
                Ok(decoded) => {
                    &decoded == gene && validate(&decoded, None).is_ok()
                }
                Err(_) => false,
            },
            Err(_) => false,
        })
    }
    QuickCheck::new()
        .tests(100)
        .quickcheck(prop as fn(Candidates) -> bool);
}

#[test]
fn reversing_twice_is_identity() {
    fn prop(input: Candidates) -> bool {
        input.genes().iter().all(|gene| {
            let decoy = reverse(gene);
            validate(&decoy, Some(input.max_links)).is_ok()
                && decoy.link_count() == gene.link_count()
                && &reverse(&decoy) == gene
        })
    }
    QuickCheck::new()
        .tests(100)
        .quickcheck(prop as fn(Candidates) -> bool);
}

#[test]
fn every_path_spells_a_match() {
    fn prop(input: Candidates) -> bool {
        let matcher = PathMatcher::new();
        input.genes().iter().all(|gene| {
            // follow the first junction out of each exon
            let mut query = Vec::new();
            let mut current = Some(ExonId(0));
            while let Some(id) = current {
                let exon = gene.exon_unchecked(id);
                query.extend_from_slice(&exon.sequence);
                current = exon.forward_links.first().map(|l| l.exon);
            }
            let found = matcher.find(gene, &query);
            found.is_complete(&query) && found.exhaustive
        })
    }
    QuickCheck::new()
        .tests(50)
        .quickcheck(prop as fn(Candidates) -> bool);
}
