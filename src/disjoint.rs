/*!
Lock-free disjoint sets, used to split a linked chromosome strand into
genes.

Rust implementation of the parallel disjoint set described in the
paper "Wait-free Parallel Algorithms for the Union-Find Problem" by
Richard J. Anderson and Heather Woll.
*/

use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;

use fnv::FnvHashMap;

pub struct DisjointSets {
    data: Vec<AtomicU64>,
    len: usize,
}

impl DisjointSets {
    pub fn new(size: usize) -> Self {
        let mut data = Vec::with_capacity(size * 2);
        for i in 0..size {
            data.push(AtomicU64::new(0));
            data.push(AtomicU64::new(i as u64));
        }
        Self { data, len: size }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    fn rank(&self, id: u64) -> u64 {
        let ix = (id * 2) as usize;
        self.data[ix].load(Ordering::SeqCst)
    }

    #[inline]
    fn parent(&self, id: u64) -> u64 {
        let ix = ((id * 2) + 1) as usize;
        self.data[ix].load(Ordering::SeqCst)
    }

    /// Representative of the set containing `id`, halving the path
    /// on the way.
    #[inline]
    pub fn find(&self, id: usize) -> usize {
        let mut id = id as u64;
        while id != self.parent(id) {
            let parent = self.parent(id);
            let new_parent = self.parent(parent);

            let ix = ((id * 2) + 1) as usize;
            let _ = self.data[ix].compare_exchange(
                parent,
                new_parent,
                Ordering::SeqCst,
                Ordering::SeqCst,
            );

            id = new_parent;
        }
        id as usize
    }

    #[inline]
    pub fn same(&self, id_1: usize, id_2: usize) -> bool {
        let mut id_1 = id_1;
        let mut id_2 = id_2;
        loop {
            id_1 = self.find(id_1);
            id_2 = self.find(id_2);

            if id_1 == id_2 {
                return true;
            }
            if self.parent(id_1 as u64) == id_1 as u64 {
                return false;
            }
        }
    }

    /// Merge the sets of `id_1` and `id_2`, returning the new
    /// representative.
    pub fn unite(&self, id_1: usize, id_2: usize) -> usize {
        let mut id_1 = id_1 as u64;
        let mut id_2 = id_2 as u64;
        loop {
            id_1 = self.find(id_1 as usize) as u64;
            id_2 = self.find(id_2 as usize) as u64;

            if id_1 == id_2 {
                return id_1 as usize;
            }

            let mut r_1 = self.rank(id_1);
            let mut r_2 = self.rank(id_2);

            if r_1 > r_2 || (r_1 == r_2 && id_1 < id_2) {
                std::mem::swap(&mut r_1, &mut r_2);
                std::mem::swap(&mut id_1, &mut id_2);
            }

            let rank_ix = (id_1 * 2) as usize;
            let parent_ix = ((id_1 * 2) + 1) as usize;

            if self.data[parent_ix]
                .compare_exchange(id_1, id_2, Ordering::SeqCst, Ordering::SeqCst)
                .is_err()
            {
                continue;
            }

            if r_1 == r_2 {
                let _ = self.data[rank_ix].compare_exchange(
                    r_2,
                    r_2 + 1,
                    Ordering::SeqCst,
                    Ordering::SeqCst,
                );
            }

            break;
        }

        id_2 as usize
    }

    /// Every set, as ascending lists of members. Sets are ordered by
    /// their smallest member.
    pub fn components(&self) -> Vec<Vec<usize>> {
        let mut slots: FnvHashMap<usize, usize> = FnvHashMap::default();
        let mut components: Vec<Vec<usize>> = Vec::new();
        for id in 0..self.len {
            let root = self.find(id);
            let slot = *slots.entry(root).or_insert_with(|| {
                components.push(Vec::new());
                components.len() - 1
            });
            components[slot].push(id);
        }
        components
    }
}
