#![allow(dead_code)]

use bstr::B;

use crate::exon::{ExonId, Strand, NO_RESIDUE};
use crate::genegraph::{Exon, Gene};

fn id(x: usize) -> ExonId {
    ExonId(x)
}

/// A gene from `(start, end, sequence)` exons and `(from, to,
/// weight, residue)` junctions.
pub fn build_gene(
    name: &str,
    exons: &[(i32, i32, &str)],
    links: &[(usize, usize, i32, u8)],
) -> Gene {
    let mut gene = Gene::new(B(name), 1, Strand::Forward);
    for &(start, end, seq) in exons.iter() {
        gene.append_exon(Exon::new(start, end).with_sequence(B(seq)));
    }
    for &(from, to, weight, residue) in links.iter() {
        assert!(gene.create_link(id(from), id(to), weight, residue));
    }
    gene
}

pub fn diamond_gene() -> Gene {
    /*
          1
        /   \
      0       3
        \   /
          2
    */
    build_gene(
        "Diamond",
        &[
            (100, 130, "MAST"),
            (300, 330, "KLE"),
            (320, 360, "RSQW"),
            (600, 640, "PEPT"),
        ],
        &[
            (0, 1, 12, NO_RESIDUE),
            (0, 2, -40, b'G'),
            (1, 3, 7, NO_RESIDUE),
            (2, 3, 0, b'V'),
        ],
    )
}

/// `AB -> CDE`, spliced between codons.
pub fn split_gene() -> Gene {
    build_gene(
        "Split",
        &[(1, 500, "AB"), (600, 900, "CDE")],
        &[(0, 1, 5, NO_RESIDUE)],
    )
}

/// `AB -X-> CDE`, with `X` spanning the junction.
pub fn bridged_gene() -> Gene {
    build_gene(
        "Bridged",
        &[(1, 500, "AB"), (600, 900, "CDE")],
        &[(0, 1, 5, b'X')],
    )
}
