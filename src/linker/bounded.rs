/*!

Fixed-capacity sets of the best-scoring junctions of each interval.

Every interval has a [`BoundedEdgeSet`] of incoming and one of
outgoing junctions. An [`EdgeIndex`] keeps the two sides consistent:
a junction is stored at both of its ends or at neither, and when a
set evicts its lowest entry to make room, the mirrored entry at the
other end is removed as well.

*/

use std::cmp::Ordering;

/// A junction as seen from one of its ends.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scored {
    pub score: f64,
    pub peer: usize,
}

impl Scored {
    #[inline]
    fn cmp_rank(&self, other: &Scored) -> Ordering {
        self.score
            .total_cmp(&other.score)
            .then(self.peer.cmp(&other.peer))
    }
}

/// The `capacity` best junctions on one side of an interval, kept in
/// ascending order of score.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundedEdgeSet {
    capacity: usize,
    entries: Vec<Scored>,
}

impl BoundedEdgeSet {
    pub fn new(capacity: usize) -> Self {
        BoundedEdgeSet {
            capacity,
            entries: Vec::with_capacity(capacity),
        }
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.entries.len() >= self.capacity
    }

    /// The entry that would be evicted next.
    #[inline]
    pub fn lowest(&self) -> Option<Scored> {
        self.entries.first().copied()
    }

    /// Whether a junction with `score` would currently be kept.
    pub fn admits(&self, score: f64) -> bool {
        if self.capacity == 0 {
            return false;
        }
        match self.lowest() {
            Some(low) if self.is_full() => score > low.score,
            _ => true,
        }
    }

    pub fn contains(&self, peer: usize) -> bool {
        self.entries.iter().any(|e| e.peer == peer)
    }

    pub fn get(&self, peer: usize) -> Option<f64> {
        self.entries.iter().find(|e| e.peer == peer).map(|e| e.score)
    }

    /// Insert a junction, returning the entry evicted to make room.
    /// A junction to a peer already in the set keeps the higher of
    /// the two scores. The caller must check [`admits`] first.
    ///
    /// [`admits`]: BoundedEdgeSet::admits
    pub fn insert(&mut self, score: f64, peer: usize) -> Option<Scored> {
        if let Some(ix) = self.entries.iter().position(|e| e.peer == peer) {
            let old = self.entries.remove(ix);
            let score = if score > old.score { score } else { old.score };
            self.insert_sorted(Scored { score, peer });
            return None;
        }

        let evicted = if self.is_full() && !self.entries.is_empty() {
            Some(self.entries.remove(0))
        } else {
            None
        };
        self.insert_sorted(Scored { score, peer });
        evicted
    }

    fn insert_sorted(&mut self, entry: Scored) {
        let ix = self
            .entries
            .partition_point(|e| e.cmp_rank(&entry) == Ordering::Less);
        self.entries.insert(ix, entry);
    }

    pub fn remove(&mut self, peer: usize) -> Option<Scored> {
        let ix = self.entries.iter().position(|e| e.peer == peer)?;
        Some(self.entries.remove(ix))
    }

    /// Entries in ascending order of score.
    pub fn iter(&self) -> impl Iterator<Item = &Scored> + '_ {
        self.entries.iter()
    }
}

/// The outcome of [`EdgeIndex::offer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    Accepted,
    Updated,
    Rejected,
}

/// Incoming and outgoing [`BoundedEdgeSet`]s for every interval.
#[derive(Debug, Clone)]
pub struct EdgeIndex {
    forward: Vec<BoundedEdgeSet>,
    backward: Vec<BoundedEdgeSet>,
}

impl EdgeIndex {
    pub fn new(size: usize, capacity: usize) -> Self {
        EdgeIndex {
            forward: vec![BoundedEdgeSet::new(capacity); size],
            backward: vec![BoundedEdgeSet::new(capacity); size],
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.forward.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.forward.is_empty()
    }

    #[inline]
    pub fn outgoing(&self, ix: usize) -> &BoundedEdgeSet {
        &self.forward[ix]
    }

    #[inline]
    pub fn incoming(&self, ix: usize) -> &BoundedEdgeSet {
        &self.backward[ix]
    }

    /// Offer the junction `from -> to`. It is stored only if it ranks
    /// among the best at both ends; entries evicted on either side
    /// are removed from the opposite side too.
    pub fn offer(&mut self, from: usize, to: usize, score: f64) -> Admission {
        if let Some(existing) = self.forward[from].get(to) {
            if score <= existing {
                return Admission::Rejected;
            }
            self.forward[from].insert(score, to);
            self.backward[to].insert(score, from);
            return Admission::Updated;
        }

        if !self.forward[from].admits(score)
            || !self.backward[to].admits(score)
        {
            return Admission::Rejected;
        }

        if let Some(evicted) = self.forward[from].insert(score, to) {
            self.backward[evicted.peer].remove(from);
        }
        if let Some(evicted) = self.backward[to].insert(score, from) {
            self.forward[evicted.peer].remove(to);
        }
        Admission::Accepted
    }

    /// Whether every junction is stored at both of its ends.
    pub fn is_symmetric(&self) -> bool {
        let forward_ok = self.forward.iter().enumerate().all(|(from, set)| {
            set.iter()
                .all(|e| self.backward[e.peer].get(from) == Some(e.score))
        });
        let backward_ok =
            self.backward.iter().enumerate().all(|(to, set)| {
                set.iter()
                    .all(|e| self.forward[e.peer].get(to) == Some(e.score))
            });
        forward_ok && backward_ok
    }
}
