/*!

The exon graph of one gene.

A [`Gene`] owns an ordered list of [`Exon`]s. Every exon keeps the
splice junctions that enter it as back-links, and the junctions that
leave it as forward links. Only the back-links are ever persisted;
forward links are derived from them, see
[`Gene::rebuild_forward_links`].

*/

use bstr::ByteSlice;

use crate::exon::{ExonId, Link, Strand};

/// Upper bound on the byte length of a gene name.
pub const MAX_NAME_LEN: usize = 256;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exon {
    pub start: i32,
    pub end: i32,
    pub occurrences: i32,
    pub sequence: Vec<u8>,
    pub prefix: [u8; 2],
    pub suffix: [u8; 2],
    pub back_links: Vec<Link>,
    pub forward_links: Vec<Link>,
}

impl Exon {
    pub fn new(start: i32, end: i32) -> Exon {
        Exon {
            start,
            end,
            occurrences: 1,
            sequence: Vec::new(),
            prefix: [0; 2],
            suffix: [0; 2],
            back_links: Vec::new(),
            forward_links: Vec::new(),
        }
    }

    pub fn with_sequence(mut self, sequence: &[u8]) -> Exon {
        self.sequence = sequence.into();
        self
    }

    /// Length of the stored sequence, which may be shorter than the
    /// genomic interval (or empty).
    #[inline]
    pub fn len(&self) -> usize {
        self.sequence.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.sequence.is_empty()
    }

    #[inline]
    pub fn genomic_len(&self) -> i32 {
        self.end - self.start
    }

    #[inline]
    pub fn in_degree(&self) -> usize {
        self.back_links.len()
    }

    #[inline]
    pub fn out_degree(&self) -> usize {
        self.forward_links.len()
    }
}

/// A gene: a named splice graph on one chromosome strand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Gene {
    pub name: Vec<u8>,
    pub chromosome: i32,
    pub strand: Strand,
    exons: Vec<Exon>,
}

impl Gene {
    pub fn new(name: &[u8], chromosome: i32, strand: Strand) -> Gene {
        Gene {
            name: name.into(),
            chromosome,
            strand,
            exons: Vec::new(),
        }
    }

    /// Build a gene from exons whose back-links are already filled in.
    /// Any forward links on the exons are discarded and derived again
    /// from the back-links.
    pub(crate) fn from_back_links(
        name: Vec<u8>,
        chromosome: i32,
        strand: Strand,
        exons: Vec<Exon>,
    ) -> Gene {
        let mut gene = Gene {
            name,
            chromosome,
            strand,
            exons,
        };
        gene.rebuild_forward_links();
        gene
    }

    /// Build a gene from exons that already carry both link lists.
    pub(crate) fn from_linked_exons(
        name: Vec<u8>,
        chromosome: i32,
        strand: Strand,
        exons: Vec<Exon>,
    ) -> Gene {
        Gene {
            name,
            chromosome,
            strand,
            exons,
        }
    }

    /// Add an exon to the end of the exon list. Links on `exon` are
    /// dropped; use [`Gene::create_link`] to connect it.
    pub fn append_exon(&mut self, mut exon: Exon) -> ExonId {
        exon.back_links.clear();
        exon.forward_links.clear();
        let id = ExonId(self.exons.len());
        self.exons.push(exon);
        id
    }

    /// Insert the junction `from -> to`, storing it as a back-link on
    /// `to` and a forward link on `from`. Returns `false` if either
    /// exon does not exist.
    pub fn create_link(
        &mut self,
        from: ExonId,
        to: ExonId,
        weight: i32,
        residue: u8,
    ) -> bool {
        if !self.has_exon(from) || !self.has_exon(to) {
            return false;
        }
        let link = Link::new(from, weight, residue);
        self.exons[to.ix()].back_links.push(link);
        self.exons[from.ix()].forward_links.push(link.mirrored(to));
        true
    }

    /// Derive every forward link from the back-links, in a single
    /// pass over all exons. Back-links to missing exons are skipped;
    /// the decoder rejects them before this runs.
    pub fn rebuild_forward_links(&mut self) {
        for exon in self.exons.iter_mut() {
            exon.forward_links.clear();
        }
        for ix in 0..self.exons.len() {
            for l_ix in 0..self.exons[ix].back_links.len() {
                let link = self.exons[ix].back_links[l_ix];
                if let Some(source) = self.exons.get_mut(link.exon.ix()) {
                    source.forward_links.push(link.mirrored(ix));
                }
            }
        }
    }

    #[inline]
    pub fn has_exon(&self, id: ExonId) -> bool {
        id.ix() < self.exons.len()
    }

    #[inline]
    pub fn exon(&self, id: ExonId) -> Option<&Exon> {
        self.exons.get(id.ix())
    }

    pub fn exon_unchecked(&self, id: ExonId) -> &Exon {
        self.exons.get(id.ix()).unwrap_or_else(|| {
            panic!("Tried getting an exon that doesn't exist, ID: {}", id)
        })
    }

    #[inline]
    pub fn exons(&self) -> &[Exon] {
        &self.exons
    }

    pub fn exon_ids(&self) -> impl Iterator<Item = ExonId> {
        (0..self.exons.len()).map(ExonId)
    }

    #[inline]
    pub fn exon_count(&self) -> usize {
        self.exons.len()
    }

    /// Number of junctions, counted once per back-link.
    pub fn link_count(&self) -> usize {
        self.exons.iter().map(|e| e.back_links.len()).sum()
    }

    /// Sum of all exon sequence lengths.
    pub fn total_length(&self) -> usize {
        self.exons.iter().map(|e| e.len()).sum()
    }

    pub fn has_link(&self, from: ExonId, to: ExonId) -> bool {
        self.exon(to)
            .map(|e| e.back_links.iter().any(|l| l.exon == from))
            .unwrap_or(false)
    }

    /// Genomic span covered by the exons, or `None` for an empty gene.
    pub fn span(&self) -> Option<(i32, i32)> {
        let start = self.exons.iter().map(|e| e.start).min()?;
        let end = self.exons.iter().map(|e| e.end).max()?;
        Some((start, end))
    }

    pub fn into_exons(self) -> Vec<Exon> {
        self.exons
    }

    pub fn print_exons(&self) {
        println!(
            "Gene\t{}\tchromosome {}{}\t{} exons",
            self.name.as_bstr(),
            self.chromosome,
            self.strand,
            self.exons.len()
        );
        for (ix, exon) in self.exons.iter().enumerate() {
            println!(
                "  {:3}\t{}-{}\t{}",
                ix,
                exon.start,
                exon.end,
                exon.sequence.as_bstr()
            );
            let back: Vec<_> = exon.back_links.iter().map(|l| l.exon.0).collect();
            let forward: Vec<_> =
                exon.forward_links.iter().map(|l| l.exon.0).collect();
            println!("  Back links:    {:?}", back);
            println!("  Forward links: {:?}", forward);
        }
    }
}
