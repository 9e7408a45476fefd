pub(crate) mod read;
pub mod validate;

#[cfg(test)]
pub mod test;

pub mod dna {

    const fn comp_base_impl(base: u8) -> u8 {
        match base {
            b'A' => b'T',
            b'G' => b'C',
            b'C' => b'G',
            b'T' => b'A',
            b'a' => b't',
            b'g' => b'c',
            b'c' => b'g',
            b't' => b'a',
            _ => b'N',
        }
    }

    // loops can be used in const fns since Rust 1.46, meaning we can
    // build a lookup table at compile time
    const fn comp_base_table() -> [u8; 256] {
        let mut i = 0;
        let mut table: [u8; 256] = [0; 256];
        while i <= 255 {
            table[i] = comp_base_impl(i as u8);
            i += 1;
        }
        table
    }

    const DNA_COMP_TABLE: [u8; 256] = comp_base_table();

    /// Retrieves the DNA complement for the provided base using a
    /// lookup-table built at compile time. Anything that isn't one
    /// of `ACGTacgt` complements to `N`.
    #[inline]
    pub const fn comp_base(base: u8) -> u8 {
        DNA_COMP_TABLE[base as usize]
    }

    /// Calculates the reverse complement for a sequence provided as a
    /// double-ended iterator. Collects into a `Vec<u8>` for
    /// convenience.
    #[inline]
    pub fn rev_comp<I, B>(seq: I) -> Vec<u8>
    where
        B: std::borrow::Borrow<u8>,
        I: IntoIterator<Item = B>,
        I::IntoIter: DoubleEndedIterator,
    {
        seq.into_iter()
            .rev()
            .map(|b| comp_base(*b.borrow()))
            .collect()
    }

}
