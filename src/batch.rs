/*!

Running the pipeline over many chromosome strands at once.

Each chromosome strand is linked and split into genes independently,
on a fixed-size rayon pool. Within one strand the linker stays
single-threaded: admitting a junction can evict others that share an
endpoint, so the order of admissions matters.

*/

use fnv::FnvHashMap;
use rayon::prelude::*;

#[allow(unused_imports)]
use log::{debug, info, trace, warn};

use crate::codec::encode;
use crate::config::{BatchConfig, LinkerConfig};
use crate::error::GraphError;
use crate::exon::Strand;
use crate::genegraph::Gene;
use crate::interval::IntervalCandidate;
use crate::linker::{GraphLinker, LinkedIntervals, NoSequence};
use crate::matcher::{PathMatch, PathMatcher};

/// The exon candidates of one chromosome strand.
#[derive(Debug, Clone, PartialEq)]
pub struct ChromosomeBatch {
    pub chromosome: i32,
    pub strand: Strand,
    pub intervals: Vec<IntervalCandidate>,
}

impl ChromosomeBatch {
    pub fn new(
        chromosome: i32,
        strand: Strand,
        intervals: Vec<IntervalCandidate>,
    ) -> Self {
        ChromosomeBatch {
            chromosome,
            strand,
            intervals,
        }
    }
}

pub struct BatchLinker {
    pool: rayon::ThreadPool,
    linker: GraphLinker,
}

impl BatchLinker {
    pub fn new(
        batch: &BatchConfig,
        linker: LinkerConfig,
    ) -> Result<Self, GraphError> {
        let mut builder = rayon::ThreadPoolBuilder::new();
        if let Some(threads) = batch.num_threads {
            builder = builder.num_threads(threads);
        }
        let pool = builder.build()?;
        info!(
            "linking on {} worker threads",
            pool.current_num_threads()
        );
        Ok(BatchLinker {
            pool,
            linker: GraphLinker::new(linker),
        })
    }

    #[inline]
    pub fn num_threads(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// Link every batch; results are in the order of `batches`.
    pub fn link_batches(
        &self,
        batches: Vec<ChromosomeBatch>,
    ) -> Vec<(i32, LinkedIntervals)> {
        let linker = &self.linker;
        self.pool.install(|| {
            batches
                .into_par_iter()
                .map(|batch| {
                    let linked = linker.link(batch.intervals, batch.strand);
                    (batch.chromosome, linked)
                })
                .collect()
        })
    }

    /// Link every batch and split it into genes. Exon sequences are
    /// taken from `genome`, keyed by chromosome; chromosomes missing
    /// from it give genes without sequence.
    pub fn genes(
        &self,
        batches: Vec<ChromosomeBatch>,
        genome: &FnvHashMap<i32, Vec<u8>>,
    ) -> Vec<Gene> {
        let linker = &self.linker;
        let per_batch: Vec<Vec<Gene>> = self.pool.install(|| {
            batches
                .into_par_iter()
                .map(|batch| {
                    let chromosome = batch.chromosome;
                    let linked = linker.link(batch.intervals, batch.strand);
                    match genome.get(&chromosome) {
                        Some(seq) => linked.genes(chromosome, seq.as_slice()),
                        None => {
                            debug!("no sequence for chromosome {}", chromosome);
                            linked.genes(chromosome, &NoSequence)
                        }
                    }
                })
                .collect()
        });

        let genes: Vec<Gene> = per_batch.into_iter().flatten().collect();
        info!("built {} genes", genes.len());
        genes
    }

    /// Encode genes in parallel, one buffer per gene.
    pub fn encode_all(&self, genes: &[Gene]) -> Result<Vec<Vec<u8>>, GraphError> {
        self.pool.install(|| genes.par_iter().map(encode).collect())
    }

    /// Match every query against `gene`, one query per task.
    pub fn match_all<Q>(
        &self,
        matcher: &PathMatcher,
        gene: &Gene,
        queries: &[Q],
    ) -> Vec<PathMatch>
    where
        Q: AsRef<[u8]> + Sync,
    {
        self.pool.install(|| {
            queries
                .par_iter()
                .map(|query| matcher.find(gene, query.as_ref()))
                .collect()
        })
    }
}
