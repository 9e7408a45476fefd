use fnv::FnvHashMap;

#[allow(unused_imports)]
use log::{debug, error, info, trace};

use bstr::ByteSlice;

use crate::error::{InvariantViolation, LinkSide};
use crate::exon::ExonId;
use crate::genegraph::Gene;

/// Check the structural invariants of a gene graph:
///
/// * every exon has `start < end`,
/// * every link points to an exon of the gene,
/// * the back-links and forward links describe the same multiset of
///   `(source, target, weight, residue)` junctions,
/// * if `max_degree` is given, no exon has more links than that on
///   either side.
///
/// Every problem found is logged; the first one is returned.
pub fn validate(
    gene: &Gene,
    max_degree: Option<usize>,
) -> Result<(), InvariantViolation> {
    trace!("validating gene {}", gene.name.as_bstr());

    let mut problems: Vec<InvariantViolation> = Vec::new();
    let exon_count = gene.exon_count();

    for (ix, exon) in gene.exons().iter().enumerate() {
        let id = ExonId(ix);
        if exon.start >= exon.end {
            problems.push(InvariantViolation::EmptyInterval {
                exon: id,
                start: exon.start,
                end: exon.end,
            });
        }

        for link in exon.back_links.iter().chain(exon.forward_links.iter()) {
            if link.exon.ix() >= exon_count {
                problems.push(InvariantViolation::DanglingLink {
                    exon: id,
                    target: link.exon,
                });
            }
        }

        if let Some(bound) = max_degree {
            if exon.in_degree() > bound {
                problems.push(InvariantViolation::DegreeExceeded {
                    exon: id,
                    side: LinkSide::Back,
                    degree: exon.in_degree(),
                    bound,
                });
            }
            if exon.out_degree() > bound {
                problems.push(InvariantViolation::DegreeExceeded {
                    exon: id,
                    side: LinkSide::Forward,
                    degree: exon.out_degree(),
                    bound,
                });
            }
        }
    }

    // (source, target, weight, residue) -> back-link count minus
    // forward link count
    let mut junctions: FnvHashMap<(ExonId, ExonId, i32, u8), i64> =
        FnvHashMap::default();
    for (ix, exon) in gene.exons().iter().enumerate() {
        for link in exon.back_links.iter() {
            let key = (link.exon, ExonId(ix), link.weight, link.residue);
            *junctions.entry(key).or_insert(0) += 1;
        }
        for link in exon.forward_links.iter() {
            let key = (ExonId(ix), link.exon, link.weight, link.residue);
            *junctions.entry(key).or_insert(0) -= 1;
        }
    }

    let mut asymmetric: Vec<_> = junctions
        .into_iter()
        .filter(|(_, balance)| *balance != 0)
        .map(|((source, target, weight, _), _)| (source, target, weight))
        .collect();
    asymmetric.sort();
    for (source_exon, target, weight) in asymmetric {
        problems.push(InvariantViolation::AsymmetricLink {
            source_exon,
            target,
            weight,
        });
    }

    for problem in problems.iter() {
        info!("gene {}: {}", gene.name.as_bstr(), problem);
    }

    match problems.into_iter().next() {
        Some(problem) => Err(problem),
        None => Ok(()),
    }
}
