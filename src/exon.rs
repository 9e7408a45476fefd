use std::fmt;

/// Newtype for the position of an exon in its gene's exon list.
///
/// An `ExonId` is only meaningful together with the gene it was taken
/// from; reordering the exon list (e.g. when building a decoy gene)
/// renumbers every exon.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct ExonId(pub usize);

impl ExonId {
    #[inline]
    pub fn ix(self) -> usize {
        self.0
    }
}

impl fmt::Display for ExonId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<usize> for ExonId {
    #[inline]
    fn from(ix: usize) -> Self {
        ExonId(ix)
    }
}

impl From<ExonId> for usize {
    #[inline]
    fn from(id: ExonId) -> Self {
        id.0
    }
}

/// Genomic strand of a gene or interval batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Strand {
    Forward,
    Reverse,
}

impl Default for Strand {
    fn default() -> Self {
        Strand::Forward
    }
}

impl Strand {
    #[inline]
    pub fn is_reverse(self) -> bool {
        self == Strand::Reverse
    }

    #[inline]
    pub fn flip(self) -> Self {
        match self {
            Strand::Forward => Strand::Reverse,
            Strand::Reverse => Strand::Forward,
        }
    }

    /// The on-disk strand byte. Any nonzero byte reads as reverse.
    #[inline]
    pub fn from_flag(flag: u8) -> Self {
        if flag == 0 {
            Strand::Forward
        } else {
            Strand::Reverse
        }
    }

    #[inline]
    pub fn flag(self) -> u8 {
        match self {
            Strand::Forward => 0,
            Strand::Reverse => 1,
        }
    }

    #[inline]
    pub fn symbol(self) -> char {
        match self {
            Strand::Forward => '+',
            Strand::Reverse => '-',
        }
    }

    pub fn from_symbol(symbol: &str) -> Option<Self> {
        match symbol {
            "+" => Some(Strand::Forward),
            "-" => Some(Strand::Reverse),
            _ => None,
        }
    }
}

impl fmt::Display for Strand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// Residue byte of a junction that splices exactly between codons.
pub const NO_RESIDUE: u8 = 0;

/// One end of a splice junction as stored on an exon.
///
/// On a back-link `exon` is the source of the junction, on a forward
/// link it is the target. `residue` is the amino acid spanning the
/// junction, or [`NO_RESIDUE`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Link {
    pub exon: ExonId,
    pub weight: i32,
    pub residue: u8,
}

impl Link {
    #[inline]
    pub fn new<T: Into<ExonId>>(exon: T, weight: i32, residue: u8) -> Self {
        Link {
            exon: exon.into(),
            weight,
            residue,
        }
    }

    /// The bridging residue, if the junction has one.
    #[inline]
    pub fn bridging(&self) -> Option<u8> {
        if self.residue == NO_RESIDUE {
            None
        } else {
            Some(self.residue)
        }
    }

    /// The same junction seen from its other end.
    #[inline]
    pub fn mirrored<T: Into<ExonId>>(&self, exon: T) -> Self {
        Link {
            exon: exon.into(),
            weight: self.weight,
            residue: self.residue,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strand_flag_is_isomorphism() {
        for strand in [Strand::Forward, Strand::Reverse].iter() {
            assert_eq!(Strand::from_flag(strand.flag()), *strand);
        }
        assert_eq!(Strand::from_flag(7), Strand::Reverse);
    }

    #[test]
    fn strand_flip() {
        assert_eq!(Strand::Forward.flip(), Strand::Reverse);
        assert_eq!(Strand::Forward.flip().flip(), Strand::Forward);
        assert_eq!(Strand::from_symbol("-"), Some(Strand::Reverse));
        assert_eq!(Strand::from_symbol("."), None);
    }

    #[test]
    fn link_bridging_residue() {
        let free = Link::new(3usize, 12, NO_RESIDUE);
        let bridged = Link::new(3usize, 12, b'X');

        assert_eq!(free.bridging(), None);
        assert_eq!(bridged.bridging(), Some(b'X'));

        let back = bridged.mirrored(ExonId(7));
        assert_eq!(back.exon, ExonId(7));
        assert_eq!(back.weight, 12);
        assert_eq!(back.residue, b'X');
    }
}
