use std::io::{self, ErrorKind, Read};

/// Upper bound on how many elements are reserved up front from a count
/// read off the input. Larger counts grow the vector as elements
/// actually arrive.
pub(crate) const PREALLOC_LIMIT: usize = 1024;

/// Capacity to reserve for `count` elements announced by the input.
#[inline]
pub(crate) fn prealloc(count: usize) -> usize {
    count.min(PREALLOC_LIMIT)
}

/// Fill as much of `buf` as the input allows, returning the number of
/// bytes read. Fewer than `buf.len()` bytes means the input ended.
pub(crate) fn read_up_to<R: Read>(
    inner: &mut R,
    buf: &mut [u8],
) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match inner.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}
