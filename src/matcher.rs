/*!

Finding the exon path that covers the longest prefix of a query.

A match may begin anywhere: inside any exon, or on the bridging
residue of a junction entering an exon. Once an exon has been entered
through a junction, the query has to continue at the exon's first
byte. When an exon runs out, every junction leaving it is tried; a
junction without a residue is free, one with a residue must match the
next query byte, which then counts towards the match.

The search is a depth-first walk over states `(exon, query offset,
entered)` driven by an explicit stack, so neither long queries nor
long exon chains can overflow the call stack. Finished states are
memoized. The walk is bounded by [`MatchConfig::max_steps`] and
[`MatchConfig::max_depth`]; a search cut short by either reports
[`PathMatch::exhaustive`] as `false`.

*/

use fnv::{FnvHashMap, FnvHashSet};

#[allow(unused_imports)]
use log::{debug, info, trace, warn};

use crate::config::MatchConfig;
use crate::exon::ExonId;
use crate::genegraph::{Exon, Gene};

/// The best match of a query against a gene.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathMatch {
    /// Length of the covered query prefix.
    pub matched: usize,
    /// Exons visited, in order. Empty if nothing matched.
    pub trail: Vec<ExonId>,
    /// `false` if the step or depth bound cut the search short, in
    /// which case a longer match may exist.
    pub exhaustive: bool,
}

impl PathMatch {
    #[inline]
    pub fn is_complete(&self, query: &[u8]) -> bool {
        self.matched == query.len()
    }

    /// Genomic locus covered by the trail.
    pub fn genomic_span(&self, gene: &Gene) -> Option<(i32, i32)> {
        let exons = || self.trail.iter().filter_map(|&id| gene.exon(id));
        let start = exons().map(|e| e.start).min()?;
        let end = exons().map(|e| e.end).max()?;
        Some((start, end))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct State {
    exon: ExonId,
    offset: usize,
    entered: bool,
}

#[derive(Debug, Clone, Default)]
struct Outcome {
    matched: usize,
    trail: Vec<ExonId>,
}

/// How a child state's trail joins its parent's.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Splice {
    /// Through a junction into another exon.
    Edge,
    /// Onto the bridging residue of a junction entering the same exon.
    Entry,
}

#[derive(Debug, Clone, Copy)]
enum Step {
    /// The match ends inside this exon after `matched` bytes.
    Local { matched: usize },
    /// The match continues in `child` after `consumed` bytes.
    Descend {
        child: State,
        consumed: usize,
        splice: Splice,
    },
}

struct Frame {
    state: State,
    remaining: usize,
    steps: Vec<Step>,
    cursor: usize,
    best: Option<Outcome>,
    pending: Option<(usize, Splice)>,
}

impl Frame {
    fn offer(&mut self, candidate: Outcome) {
        let better = match &self.best {
            Some(best) => candidate.matched > best.matched,
            None => true,
        };
        if better {
            self.best = Some(candidate);
        }
    }

    fn join(&mut self, consumed: usize, splice: Splice, child: &Outcome) {
        let exon = self.state.exon;
        let trail = match splice {
            Splice::Edge => {
                let mut trail = Vec::with_capacity(child.trail.len() + 1);
                trail.push(exon);
                trail.extend_from_slice(&child.trail);
                trail
            }
            Splice::Entry if child.trail.is_empty() => vec![exon],
            Splice::Entry => child.trail.clone(),
        };
        self.offer(Outcome {
            matched: consumed + child.matched,
            trail,
        });
    }

    fn is_done(&self) -> bool {
        self.cursor >= self.steps.len()
            || self
                .best
                .as_ref()
                .map(|b| b.matched == self.remaining)
                .unwrap_or(false)
    }

    fn finish(self) -> Outcome {
        match self.best {
            Some(best) if best.matched > 0 => best,
            _ => Outcome::default(),
        }
    }
}

fn common_prefix(a: &[u8], b: &[u8]) -> usize {
    a.iter().zip(b.iter()).take_while(|(x, y)| x == y).count()
}

/// Matches queries against the exon graph of one gene.
#[derive(Debug, Clone, Default)]
pub struct PathMatcher {
    config: MatchConfig,
}

impl PathMatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: MatchConfig) -> Self {
        PathMatcher { config }
    }

    #[inline]
    pub fn config(&self) -> &MatchConfig {
        &self.config
    }

    /// The longest query prefix covered by a path through `gene`.
    /// Ties go to the match found first, in exon order.
    pub fn find(&self, gene: &Gene, query: &[u8]) -> PathMatch {
        let mut search = Search {
            gene,
            query,
            config: &self.config,
            memo: FnvHashMap::default(),
            active: FnvHashSet::default(),
            steps: 0,
            exhaustive: true,
        };

        let mut best = Outcome::default();
        if !query.is_empty() {
            for exon in gene.exon_ids() {
                if search.steps >= self.config.max_steps {
                    search.exhaustive = false;
                    break;
                }
                let outcome = search.run(State {
                    exon,
                    offset: 0,
                    entered: false,
                });
                if outcome.matched > best.matched {
                    best = outcome;
                }
                if best.matched == query.len() {
                    break;
                }
            }
        }

        trace!(
            "matched {} of {} query bytes over {} exons in {} steps",
            best.matched,
            query.len(),
            best.trail.len(),
            search.steps
        );
        if !search.exhaustive {
            debug!(
                "match search stopped early after {} steps",
                search.steps
            );
        }

        PathMatch {
            matched: best.matched,
            trail: best.trail,
            exhaustive: search.exhaustive,
        }
    }
}

struct Search<'a> {
    gene: &'a Gene,
    query: &'a [u8],
    config: &'a MatchConfig,
    memo: FnvHashMap<State, Outcome>,
    active: FnvHashSet<State>,
    steps: usize,
    exhaustive: bool,
}

impl<'a> Search<'a> {
    fn frame(&mut self, state: State) -> Frame {
        self.steps += 1;
        self.active.insert(state);
        Frame {
            state,
            remaining: self.query.len() - state.offset,
            steps: self.plan(state),
            cursor: 0,
            best: None,
            pending: None,
        }
    }

    fn run(&mut self, root: State) -> Outcome {
        if let Some(known) = self.memo.get(&root) {
            return known.clone();
        }

        let first = self.frame(root);
        let mut stack: Vec<Frame> = vec![first];
        let mut returned: Option<Outcome> = None;

        loop {
            let depth = stack.len();
            let frame = match stack.last_mut() {
                Some(frame) => frame,
                None => break,
            };
            if let Some(child) = returned.take() {
                if let Some((consumed, splice)) = frame.pending.take() {
                    frame.join(consumed, splice, &child);
                }
            }

            if frame.is_done() {
                let frame = match stack.pop() {
                    Some(frame) => frame,
                    None => break,
                };
                let state = frame.state;
                let outcome = frame.finish();
                self.active.remove(&state);
                if self.config.memoize {
                    self.memo.insert(state, outcome.clone());
                }
                if stack.is_empty() {
                    return outcome;
                }
                returned = Some(outcome);
                continue;
            }

            let step = frame.steps[frame.cursor];
            frame.cursor += 1;

            match step {
                Step::Local { matched } => frame.offer(Outcome {
                    matched,
                    trail: vec![frame.state.exon],
                }),
                Step::Descend {
                    child,
                    consumed,
                    splice,
                } => {
                    if let Some(known) = self.memo.get(&child) {
                        frame.join(consumed, splice, known);
                    } else if self.active.contains(&child) {
                        trace!("skipping cycle through exon {}", child.exon);
                    } else if self.steps >= self.config.max_steps
                        || depth >= self.config.max_depth
                    {
                        self.exhaustive = false;
                    } else {
                        frame.pending = Some((consumed, splice));
                        let next = self.frame(child);
                        stack.push(next);
                    }
                }
            }
        }

        Outcome::default()
    }

    /// Everything the state `state` may try, in order.
    fn plan(&self, state: State) -> Vec<Step> {
        let rest = &self.query[state.offset..];
        let exon = match self.gene.exon(state.exon) {
            Some(exon) if !rest.is_empty() => exon,
            _ => return Vec::new(),
        };
        let seq = exon.sequence.as_slice();
        let mut steps = Vec::new();

        if state.entered {
            let shared = common_prefix(seq, rest);
            if shared < seq.len().min(rest.len()) {
                steps.push(Step::Local { matched: shared });
            } else if seq.len() >= rest.len() {
                steps.push(Step::Local {
                    matched: rest.len(),
                });
            } else {
                steps.push(Step::Local { matched: seq.len() });
                self.plan_junctions(&mut steps, exon, state.offset, seq.len());
            }
            return steps;
        }

        for link in exon.back_links.iter() {
            if link.bridging() == Some(rest[0]) {
                steps.push(Step::Descend {
                    child: State {
                        exon: state.exon,
                        offset: state.offset + 1,
                        entered: true,
                    },
                    consumed: 1,
                    splice: Splice::Entry,
                });
            }
        }

        for start in 0..seq.len() {
            let window = &seq[start..];
            let reach = window.len().min(rest.len());
            let shared = common_prefix(window, rest);
            if shared < reach {
                steps.push(Step::Local { matched: shared });
                continue;
            }
            steps.push(Step::Local { matched: reach });
            if reach == rest.len() {
                break;
            }
            self.plan_junctions(&mut steps, exon, state.offset, reach);
        }

        steps
    }

    /// Steps for every junction leaving `exon` once `consumed` bytes
    /// past `offset` have been matched inside it.
    fn plan_junctions(
        &self,
        steps: &mut Vec<Step>,
        exon: &Exon,
        offset: usize,
        consumed: usize,
    ) {
        let next = offset + consumed;
        for link in exon.forward_links.iter() {
            if !self.gene.has_exon(link.exon) {
                continue;
            }
            match link.bridging() {
                None => steps.push(Step::Descend {
                    child: State {
                        exon: link.exon,
                        offset: next,
                        entered: true,
                    },
                    consumed,
                    splice: Splice::Edge,
                }),
                Some(residue) if self.query.get(next) == Some(&residue) => {
                    steps.push(Step::Descend {
                        child: State {
                            exon: link.exon,
                            offset: next + 1,
                            entered: true,
                        },
                        consumed: consumed + 1,
                        splice: Splice::Edge,
                    })
                }
                Some(_) => {}
            }
        }
    }
}
