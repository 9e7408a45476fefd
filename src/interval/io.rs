/*!

The intermediate interval-graph file written between filtering and
gene assembly, one file per chromosome strand.

Each interval, in `(start, end)` order, is stored little-endian as

```text
start:i32  end:i32  frame_flags:i32  score:i32  junction_count:i32
junction_count x (end_pos:i32  score:f32)
```

`frame_flags` packs the codon phases in bits 0-2, the first/last
flags in bits 3 and 4, the prefix lengths in bits 5-7 and the suffix
lengths in bits 8-10. Each junction names the genomic end position of
the upstream interval and the junction score.

*/

use std::io::{ErrorKind, Read, Write};

use crate::error::GraphError;
use crate::interval::IntervalCandidate;
use crate::util::read::{prealloc, read_up_to};

/// An interval together with the junctions that enter it.
#[derive(Debug, Clone, PartialEq)]
pub struct IntervalRecord {
    pub interval: IntervalCandidate,
    /// `(end position of the upstream interval, junction score)`
    pub junctions: Vec<(i32, f32)>,
}

pub fn write_records<'a, W, I>(records: I, out: &mut W) -> Result<(), GraphError>
where
    W: Write,
    I: IntoIterator<Item = &'a IntervalRecord>,
{
    for record in records {
        let iv = &record.interval;
        out.write_all(&iv.start.to_le_bytes())?;
        out.write_all(&iv.end.to_le_bytes())?;
        out.write_all(&iv.frame_flags().to_le_bytes())?;
        out.write_all(&iv.score.to_le_bytes())?;
        out.write_all(&(record.junctions.len() as i32).to_le_bytes())?;
        for (end_pos, score) in record.junctions.iter() {
            out.write_all(&end_pos.to_le_bytes())?;
            out.write_all(&score.to_le_bytes())?;
        }
    }
    out.flush()?;
    Ok(())
}

struct WordReader<R> {
    inner: R,
    offset: u64,
    record: usize,
}

impl<R: Read> WordReader<R> {
    fn word(&mut self, field: &'static str) -> Result<[u8; 4], GraphError> {
        let mut buf = [0u8; 4];
        match self.inner.read_exact(&mut buf) {
            Ok(()) => {
                self.offset += 4;
                Ok(buf)
            }
            Err(e) if e.kind() == ErrorKind::UnexpectedEof => {
                Err(GraphError::Truncated {
                    gene: self.record,
                    offset: self.offset,
                    field,
                })
            }
            Err(e) => Err(e.into()),
        }
    }

    fn i32(&mut self, field: &'static str) -> Result<i32, GraphError> {
        Ok(i32::from_le_bytes(self.word(field)?))
    }

    fn f32(&mut self, field: &'static str) -> Result<f32, GraphError> {
        Ok(f32::from_le_bytes(self.word(field)?))
    }

    /// Read the first word of a record, or `None` at a clean EOF.
    fn first_word(&mut self) -> Result<Option<i32>, GraphError> {
        let mut buf = [0u8; 4];
        let filled = read_up_to(&mut self.inner, &mut buf)?;
        self.offset += filled as u64;
        match filled {
            0 => Ok(None),
            4 => Ok(Some(i32::from_le_bytes(buf))),
            _ => Err(GraphError::Truncated {
                gene: self.record,
                offset: self.offset,
                field: "start",
            }),
        }
    }
}

/// Read every record of an interval-graph file. Truncated input is
/// reported with the ordinal of the broken record.
pub fn read_records<R: Read>(input: R) -> Result<Vec<IntervalRecord>, GraphError> {
    let mut reader = WordReader {
        inner: input,
        offset: 0,
        record: 0,
    };
    let mut records = Vec::new();

    while let Some(start) = reader.first_word()? {
        let end = reader.i32("end")?;
        let flags = reader.i32("frame flags")?;
        let score = reader.i32("score")?;
        let count = reader.i32("junction count")?;
        if count < 0 {
            return Err(GraphError::NegativeCount {
                gene: reader.record,
                field: "junction count",
                value: count,
                offset: reader.offset,
            });
        }

        let mut interval = IntervalCandidate::new(start, end, score);
        interval.set_frame_flags(flags);

        let mut junctions = Vec::with_capacity(prealloc(count as usize));
        for _ in 0..count {
            let end_pos = reader.i32("junction end")?;
            let score = reader.f32("junction score")?;
            junctions.push((end_pos, score));
        }

        records.push(IntervalRecord {
            interval,
            junctions,
        });
        reader.record += 1;
    }

    Ok(records)
}
