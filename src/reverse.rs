/*!

Reverse-orientation (decoy) genes.

[`reverse`] builds a gene that reads its source backwards: the exon
list is reversed, every sequence is reversed byte by byte, and every
junction `a -> b` becomes `b' -> a'`. Sequences are not complemented,
and the splice contexts are copied as they are. Reversing twice gives
back the original gene.

*/

use std::io::{Read, Write};

#[allow(unused_imports)]
use log::{debug, info, trace, warn};

use crate::codec::{write_gene, GeneReader};
use crate::error::GraphError;
use crate::exon::{ExonId, Link};
use crate::genegraph::{Exon, Gene};

/// The reverse-orientation counterpart of `gene`.
pub fn reverse(gene: &Gene) -> Gene {
    let count = gene.exon_count();
    let flip = |id: ExonId| ExonId(count - 1 - id.ix());
    let flip_links = |links: &[Link]| -> Vec<Link> {
        links.iter().map(|l| l.mirrored(flip(l.exon))).collect()
    };

    let exons: Vec<Exon> = gene
        .exons()
        .iter()
        .rev()
        .map(|exon| Exon {
            start: exon.start,
            end: exon.end,
            occurrences: exon.occurrences,
            sequence: exon.sequence.iter().rev().copied().collect(),
            prefix: exon.prefix,
            suffix: exon.suffix,
            back_links: flip_links(&exon.forward_links),
            forward_links: flip_links(&exon.back_links),
        })
        .collect();

    Gene::from_linked_exons(
        gene.name.clone(),
        gene.chromosome,
        gene.strand.flip(),
        exons,
    )
}

/// Reverse every gene of an encoded gene stream into `out`, returning
/// the number of genes written.
pub fn reverse_stream<R, W>(input: R, out: &mut W) -> Result<usize, GraphError>
where
    R: Read,
    W: Write,
{
    let mut count = 0;
    for gene in GeneReader::new(input) {
        let gene = gene?;
        write_gene(&reverse(&gene), out)?;
        count += 1;
    }
    out.flush()?;
    debug!("wrote {} decoy genes", count);
    Ok(count)
}
