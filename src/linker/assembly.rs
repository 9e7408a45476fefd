/*!

Turning linked intervals into genes.

Every connected component of a [`LinkedIntervals`] becomes one
[`Gene`]. Its exons keep genomic order, so every back-link of an
exon points to an exon with a lower index.

*/

#[allow(unused_imports)]
use log::{debug, info, trace, warn};

use crate::disjoint::DisjointSets;
use crate::exon::{Link, Strand, NO_RESIDUE};
use crate::genegraph::{Exon, Gene};
use crate::interval::IntervalCandidate;
use crate::util::dna;

use super::LinkedIntervals;

/// Genomic sequence of one chromosome, addressed by 0-based half-open
/// coordinates.
pub trait SequenceSource {
    /// The bases in `start..end`, or `None` if the range is not
    /// available.
    fn fetch(&self, start: i32, end: i32) -> Option<&[u8]>;
}

impl SequenceSource for [u8] {
    fn fetch(&self, start: i32, end: i32) -> Option<&[u8]> {
        if start < 0 || end < start {
            return None;
        }
        self.get(start as usize..end as usize)
    }
}

impl SequenceSource for Vec<u8> {
    #[inline]
    fn fetch(&self, start: i32, end: i32) -> Option<&[u8]> {
        self.as_slice().fetch(start, end)
    }
}

/// A source without any sequence; exons are left empty.
#[derive(Default, Debug, Clone, Copy)]
pub struct NoSequence;

impl SequenceSource for NoSequence {
    #[inline]
    fn fetch(&self, _start: i32, _end: i32) -> Option<&[u8]> {
        None
    }
}

fn context(bases: Option<&[u8]>, strand: Strand) -> [u8; 2] {
    match bases {
        Some(&[x, y]) => match strand {
            Strand::Forward => [x, y],
            Strand::Reverse => [dna::comp_base(y), dna::comp_base(x)],
        },
        _ => [0; 2],
    }
}

/// An exon for `interval`, with sequence and splice contexts taken
/// from `source` in transcript orientation.
pub fn build_exon<S>(
    interval: &IntervalCandidate,
    strand: Strand,
    source: &S,
) -> Exon
where
    S: SequenceSource + ?Sized,
{
    let mut exon = Exon::new(interval.start, interval.end);

    if let Some(bases) = source.fetch(interval.start, interval.end) {
        exon.sequence = match strand {
            Strand::Forward => bases.to_vec(),
            Strand::Reverse => dna::rev_comp(bases),
        };
    }

    let upstream =
        source.fetch(interval.start.saturating_sub(2), interval.start);
    let downstream =
        source.fetch(interval.end, interval.end.saturating_add(2));
    match strand {
        Strand::Forward => {
            exon.prefix = context(upstream, strand);
            exon.suffix = context(downstream, strand);
        }
        Strand::Reverse => {
            exon.prefix = context(downstream, strand);
            exon.suffix = context(upstream, strand);
        }
    }

    exon
}

/// Name of the `ordinal`th gene of a chromosome strand.
pub fn gene_name(chromosome: i32, strand: Strand, ordinal: usize) -> Vec<u8> {
    format!("{}{}.{}", chromosome, strand, ordinal).into_bytes()
}

impl LinkedIntervals {
    /// The connected components of the junction graph, each as an
    /// ascending list of interval indices, ordered by their first
    /// interval.
    pub fn components(&self) -> Vec<Vec<usize>> {
        let sets = DisjointSets::new(self.len());
        for (to, junctions) in self.back_links.iter().enumerate() {
            for j in junctions.iter() {
                sets.unite(j.source, to);
            }
        }
        sets.components()
    }

    /// One gene holding the intervals `members`, which must be
    /// ascending. Junctions from intervals outside `members` are
    /// dropped.
    pub fn gene_from<S>(
        &self,
        name: Vec<u8>,
        chromosome: i32,
        members: &[usize],
        source: &S,
    ) -> Gene
    where
        S: SequenceSource + ?Sized,
    {
        debug_assert!(members.windows(2).all(|w| w[0] < w[1]));

        let local = |ix: usize| members.binary_search(&ix).ok();

        let exons: Vec<Exon> = members
            .iter()
            .map(|&ix| {
                let mut exon =
                    build_exon(&self.intervals[ix], self.strand, source);
                exon.back_links = self.back_links[ix]
                    .iter()
                    .filter_map(|j| {
                        let from = local(j.source)?;
                        Some(Link::new(from, j.weight(), NO_RESIDUE))
                    })
                    .collect();
                exon
            })
            .collect();

        let gene = Gene::from_back_links(name, chromosome, self.strand, exons);
        debug_assert_eq!(
            crate::util::validate::validate(&gene, Some(self.max_links)),
            Ok(())
        );
        gene
    }

    /// All intervals as one gene.
    pub fn to_gene<S>(&self, name: &[u8], chromosome: i32, source: &S) -> Gene
    where
        S: SequenceSource + ?Sized,
    {
        let members: Vec<usize> = (0..self.len()).collect();
        self.gene_from(name.to_vec(), chromosome, &members, source)
    }

    /// Split the intervals into genes, one per connected component,
    /// named `<chromosome><strand>.<ordinal>`.
    pub fn genes<S>(&self, chromosome: i32, source: &S) -> Vec<Gene>
    where
        S: SequenceSource + ?Sized,
    {
        let genes: Vec<Gene> = self
            .components()
            .iter()
            .enumerate()
            .map(|(ordinal, members)| {
                let name = gene_name(chromosome, self.strand, ordinal);
                self.gene_from(name, chromosome, members, source)
            })
            .collect();

        debug!(
            "split {} {} intervals into {} genes",
            self.len(),
            self.strand,
            genes.len()
        );
        genes
    }
}
