/*!

The binary gene record.

Genes are stored as concatenated little-endian records:

```text
name              256 bytes, NUL-padded
legacy            256 bytes, zero on write, ignored on read
chromosome        i32
strand            u8, 0 forward, anything else reverse
exon_count        i32
exon_count x
    start  end  sequence_length  occurrences     i32 each
    sequence                                     sequence_length bytes
    prefix  suffix                               2 bytes each
    back_link_count  forward_link_count          i32 each
    back_link_count x
        source  weight                           i32 each
        residue                                  u8
```

Only back-links are stored; the forward link count is written for
readers that want to preallocate, and the forward links themselves
are rebuilt from the back-links when a record is decoded.

*/

use std::convert::TryFrom;
use std::io::{ErrorKind, Read, Write};

#[allow(unused_imports)]
use log::{debug, info, trace, warn};

use crate::config::CodecConfig;
use crate::error::GraphError;
use crate::exon::{Link, Strand};
use crate::genegraph::{Exon, Gene, MAX_NAME_LEN};
use crate::util::read::{prealloc, read_up_to};

/// Width of the name field, and of the legacy field after it.
pub const NAME_FIELD_LEN: usize = MAX_NAME_LEN;

fn count_field(
    gene: usize,
    field: &'static str,
    count: usize,
) -> Result<[u8; 4], GraphError> {
    i32::try_from(count)
        .map(|c| c.to_le_bytes())
        .map_err(|_| {
            warn!("gene {}: {} {} does not fit a record", gene, field, count);
            GraphError::TooManyExons { gene, count }
        })
}

/// Write one gene record.
pub fn write_gene<W: Write>(gene: &Gene, out: &mut W) -> Result<(), GraphError> {
    write_record(gene, 0, out)
}

fn write_record<W: Write>(
    gene: &Gene,
    ordinal: usize,
    out: &mut W,
) -> Result<(), GraphError> {
    if gene.name.len() > NAME_FIELD_LEN {
        return Err(GraphError::NameTooLong(gene.name.len()));
    }

    let mut name = [0u8; NAME_FIELD_LEN];
    name[..gene.name.len()].copy_from_slice(&gene.name);
    out.write_all(&name)?;
    out.write_all(&[0u8; NAME_FIELD_LEN])?;
    out.write_all(&gene.chromosome.to_le_bytes())?;
    out.write_all(&[gene.strand.flag()])?;
    out.write_all(&count_field(ordinal, "exon count", gene.exon_count())?)?;

    for exon in gene.exons().iter() {
        out.write_all(&exon.start.to_le_bytes())?;
        out.write_all(&exon.end.to_le_bytes())?;
        out.write_all(&count_field(
            ordinal,
            "sequence length",
            exon.sequence.len(),
        )?)?;
        out.write_all(&exon.occurrences.to_le_bytes())?;
        out.write_all(&exon.sequence)?;
        out.write_all(&exon.prefix)?;
        out.write_all(&exon.suffix)?;
        out.write_all(&count_field(
            ordinal,
            "back link count",
            exon.back_links.len(),
        )?)?;
        out.write_all(&count_field(
            ordinal,
            "forward link count",
            exon.forward_links.len(),
        )?)?;
        for link in exon.back_links.iter() {
            let source = i32::try_from(link.exon.ix()).map_err(|_| {
                GraphError::TooManyExons {
                    gene: ordinal,
                    count: link.exon.ix(),
                }
            })?;
            out.write_all(&source.to_le_bytes())?;
            out.write_all(&link.weight.to_le_bytes())?;
            out.write_all(&[link.residue])?;
        }
    }
    Ok(())
}

/// Encode one gene record into a new buffer.
pub fn encode(gene: &Gene) -> Result<Vec<u8>, GraphError> {
    let mut bytes = Vec::with_capacity(
        2 * NAME_FIELD_LEN + 9 + gene.total_length() + 32 * gene.exon_count(),
    );
    write_gene(gene, &mut bytes)?;
    Ok(bytes)
}

/// Write every gene, one record after the other.
pub fn write_genes<'a, W, I>(genes: I, out: &mut W) -> Result<usize, GraphError>
where
    W: Write,
    I: IntoIterator<Item = &'a Gene>,
{
    let mut count = 0;
    for gene in genes {
        write_record(gene, count, out)?;
        count += 1;
    }
    out.flush()?;
    Ok(count)
}

/// Decode exactly one gene record; bytes left over after it are an
/// error.
pub fn decode(bytes: &[u8]) -> Result<Gene, GraphError> {
    decode_with(bytes, &CodecConfig::default())
}

pub fn decode_with(
    bytes: &[u8],
    config: &CodecConfig,
) -> Result<Gene, GraphError> {
    let mut reader = GeneReader::with_config(bytes, *config);
    let gene = reader.read_gene()?.ok_or(GraphError::Truncated {
        gene: 0,
        offset: 0,
        field: "name",
    })?;
    if !reader.inner.is_empty() {
        return Err(GraphError::TrailingBytes(reader.inner.len()));
    }
    Ok(gene)
}

/// Read every gene record of a stream.
pub fn read_genes<R: Read>(input: R) -> Result<Vec<Gene>, GraphError> {
    GeneReader::new(input).collect()
}

/// Iterates over the gene records of a stream. Iteration ends at a
/// clean end of input between two records, or after the first error.
pub struct GeneReader<R> {
    inner: R,
    config: CodecConfig,
    offset: u64,
    gene: usize,
    failed: bool,
}

impl<R: Read> GeneReader<R> {
    pub fn new(inner: R) -> Self {
        GeneReader::with_config(inner, CodecConfig::default())
    }

    pub fn with_config(inner: R, config: CodecConfig) -> Self {
        GeneReader {
            inner,
            config,
            offset: 0,
            gene: 0,
            failed: false,
        }
    }

    /// Bytes consumed so far.
    #[inline]
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Number of genes read so far.
    #[inline]
    pub fn genes_read(&self) -> usize {
        self.gene
    }

    fn truncated(&self, field: &'static str) -> GraphError {
        GraphError::Truncated {
            gene: self.gene,
            offset: self.offset,
            field,
        }
    }

    fn fill(
        &mut self,
        buf: &mut [u8],
        field: &'static str,
    ) -> Result<(), GraphError> {
        match self.inner.read_exact(buf) {
            Ok(()) => {
                self.offset += buf.len() as u64;
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::UnexpectedEof => {
                Err(self.truncated(field))
            }
            Err(e) => Err(e.into()),
        }
    }

    fn i32(&mut self, field: &'static str) -> Result<i32, GraphError> {
        let mut buf = [0u8; 4];
        self.fill(&mut buf, field)?;
        Ok(i32::from_le_bytes(buf))
    }

    fn u8(&mut self, field: &'static str) -> Result<u8, GraphError> {
        let mut buf = [0u8; 1];
        self.fill(&mut buf, field)?;
        Ok(buf[0])
    }

    fn count(&mut self, field: &'static str) -> Result<usize, GraphError> {
        let value = self.i32(field)?;
        if value < 0 {
            return Err(GraphError::NegativeCount {
                gene: self.gene,
                field,
                value,
                offset: self.offset - 4,
            });
        }
        Ok(value as usize)
    }

    /// Read the name field, or `None` at a clean end of input.
    fn name(&mut self) -> Result<Option<Vec<u8>>, GraphError> {
        let mut buf = [0u8; NAME_FIELD_LEN];
        let filled = read_up_to(&mut self.inner, &mut buf)?;
        self.offset += filled as u64;

        if filled == 0 {
            return Ok(None);
        }
        if filled < buf.len() {
            return Err(self.truncated("name"));
        }
        let len = buf.iter().position(|&b| b == 0).unwrap_or(buf.len());
        Ok(Some(buf[..len].to_vec()))
    }

    fn exon(
        &mut self,
        ix: usize,
        exon_count: usize,
    ) -> Result<Exon, GraphError> {
        let start = self.i32("exon start")?;
        let end = self.i32("exon end")?;
        let length = self.i32("sequence length")?;
        if length < 0 {
            return Err(GraphError::NegativeCount {
                gene: self.gene,
                field: "sequence length",
                value: length,
                offset: self.offset - 4,
            });
        }
        if length as usize > self.config.max_sequence_len {
            return Err(GraphError::SequenceTooLong {
                gene: self.gene,
                exon: ix,
                length,
                limit: self.config.max_sequence_len,
                offset: self.offset - 4,
            });
        }
        let occurrences = self.i32("occurrence count")?;
        if start >= end {
            return Err(GraphError::EmptyInterval {
                gene: self.gene,
                exon: ix,
                start,
                end,
            });
        }

        let mut exon = Exon::new(start, end);
        exon.occurrences = occurrences;
        exon.sequence = vec![0; length as usize];
        self.fill(&mut exon.sequence, "sequence")?;
        self.fill(&mut exon.prefix, "prefix context")?;
        self.fill(&mut exon.suffix, "suffix context")?;

        let back_count = self.count("back link count")?;
        let _forward_count = self.count("forward link count")?;

        exon.back_links.reserve(prealloc(back_count.min(exon_count)));
        for _ in 0..back_count {
            let target = self.i32("back link")?;
            let weight = self.i32("link weight")?;
            let residue = self.u8("link residue")?;
            if target < 0 || target as usize >= exon_count {
                return Err(GraphError::LinkOutOfRange {
                    gene: self.gene,
                    exon: ix,
                    target,
                    exon_count,
                    offset: self.offset - 9,
                });
            }
            exon.back_links.push(Link::new(target as usize, weight, residue));
        }

        Ok(exon)
    }

    /// Read the next gene record, or `None` at a clean end of input.
    pub fn read_gene(&mut self) -> Result<Option<Gene>, GraphError> {
        let name = match self.name()? {
            Some(name) => name,
            None => return Ok(None),
        };
        let mut legacy = [0u8; NAME_FIELD_LEN];
        self.fill(&mut legacy, "legacy field")?;
        let chromosome = self.i32("chromosome")?;
        let strand = Strand::from_flag(self.u8("strand")?);
        let exon_count = self.count("exon count")?;

        // the count may be corrupt, so don't trust it for allocation
        let mut exons = Vec::with_capacity(prealloc(exon_count));
        for ix in 0..exon_count {
            exons.push(self.exon(ix, exon_count)?);
        }

        let gene = Gene::from_back_links(name, chromosome, strand, exons);
        trace!(
            "decoded gene {} with {} exons, {} links",
            self.gene,
            gene.exon_count(),
            gene.link_count()
        );
        self.gene += 1;
        Ok(Some(gene))
    }
}

impl<R: Read> Iterator for GeneReader<R> {
    type Item = Result<Gene, GraphError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        match self.read_gene() {
            Ok(gene) => gene.map(Ok),
            Err(err) => {
                self.failed = true;
                Some(Err(err))
            }
        }
    }
}
