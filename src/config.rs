/*!

Tunables for every stage of the pipeline.

Each stage takes its own config struct; [`SpliceGraphConfig`] bundles
them for callers that run the whole pipeline.

```rust
use splicegraph::config::{Organism, SpliceGraphConfig, FilterConfig};

let config = SpliceGraphConfig {
    filter: FilterConfig::for_organism(Organism::Arabidopsis),
    ..Default::default()
};
assert_eq!(config.filter.score_cutoff(), 3.5);
assert_eq!(config.linker.max_links, 10);
```

*/

/// The organism an exon predictor was trained for. Selects the score
/// cutoff of the interval filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Organism {
    Human,
    Arabidopsis,
}

impl Default for Organism {
    fn default() -> Self {
        Organism::Human
    }
}

impl Organism {
    /// Lowest raw prediction score (before scaling by 100) that is
    /// kept.
    pub fn score_cutoff(self) -> f64 {
        match self {
            Organism::Human => -1.0,
            Organism::Arabidopsis => 3.5,
        }
    }
}

/// Settings of the interval filter.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterConfig {
    pub organism: Organism,

    /// Replaces the organism's cutoff when set.
    ///
    /// **Default**: `None`
    pub min_score: Option<f64>,
}

impl Default for FilterConfig {
    fn default() -> Self {
        FilterConfig {
            organism: Organism::default(),
            min_score: None,
        }
    }
}

impl FilterConfig {
    pub fn for_organism(organism: Organism) -> Self {
        FilterConfig {
            organism,
            min_score: None,
        }
    }

    #[inline]
    pub fn score_cutoff(&self) -> f64 {
        self.min_score
            .unwrap_or_else(|| self.organism.score_cutoff())
    }
}

/// Settings of the graph linker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinkerConfig {
    /// Shortest intron, in bases, that a junction may span.
    ///
    /// **Default**: `25`
    pub min_intron: i32,

    /// Longest intron, in bases, that a junction may span.
    ///
    /// **Default**: `20000`
    pub max_intron: i32,

    /// Most junctions kept on either side of an interval.
    ///
    /// **Default**: `10`
    pub max_links: usize,
}

impl Default for LinkerConfig {
    fn default() -> Self {
        LinkerConfig {
            min_intron: 25,
            max_intron: 20_000,
            max_links: 10,
        }
    }
}

/// Settings of the path matcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchConfig {
    /// Search states expanded before the search gives up and reports
    /// a non-exhaustive result.
    ///
    /// **Default**: `1_000_000`
    pub max_steps: usize,

    /// Longest chain of exons followed from one start exon.
    ///
    /// **Default**: `10_000`
    pub max_depth: usize,

    /// Remember the outcome of every finished search state.
    ///
    /// **Default**: `true`
    pub memoize: bool,
}

impl Default for MatchConfig {
    fn default() -> Self {
        MatchConfig {
            max_steps: 1_000_000,
            max_depth: 10_000,
            memoize: true,
        }
    }
}

/// Settings of the gene record decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodecConfig {
    /// Longest exon sequence accepted when decoding.
    ///
    /// **Default**: `10_000`
    pub max_sequence_len: usize,
}

impl Default for CodecConfig {
    fn default() -> Self {
        CodecConfig {
            max_sequence_len: 10_000,
        }
    }
}

/// Settings of the batch worker pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BatchConfig {
    /// Worker threads; `None` uses one per logical CPU.
    ///
    /// **Default**: `None`
    pub num_threads: Option<usize>,
}

/// All pipeline settings.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SpliceGraphConfig {
    pub filter: FilterConfig,
    pub linker: LinkerConfig,
    pub matcher: MatchConfig,
    pub codec: CodecConfig,
    pub batch: BatchConfig,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn organism_cutoffs() {
        assert_eq!(FilterConfig::default().score_cutoff(), -1.0);
        assert_eq!(
            FilterConfig::for_organism(Organism::Arabidopsis).score_cutoff(),
            3.5
        );

        let custom = FilterConfig {
            min_score: Some(0.25),
            ..Default::default()
        };
        assert_eq!(custom.score_cutoff(), 0.25);
    }
}
