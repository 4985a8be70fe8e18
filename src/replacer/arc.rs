//! Adaptive Replacement Cache (ARC) frame replacer.
//!
//! The algorithm implemented here is based on the [ARC paper](https://www.usenix.org/conference/fast-03/arc-self-tuning-low-overhead-replacement-cache).

use {
    crate::{
        AccessType,
        FrameId,
        PageId,
        ReclaimError,
        ReclaimResult,
        ReplacementPolicy,
        util::{SlotId, SlotList},
    },
    log::{debug, trace},
    parking_lot::RwLock,
    std::{collections::HashMap, sync::Arc},
};

/// Region of the cache directory an entry currently occupies.
///
/// `T1`/`T2` hold resident frames; `B1`/`B2` are their ghost histories,
/// remembering the page identities of evicted frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Region {
    /// Resident, seen exactly once since admission.
    T1,
    /// Resident, seen more than once.
    T2,
    /// Ghosts of pages evicted from `T1`.
    B1,
    /// Ghosts of pages evicted from `T2`.
    B2,
}

/// Directory entry for a resident frame or a ghost page.
#[derive(Debug, Clone, Copy)]
struct FrameStatus {
    page_id: PageId,
    /// For ghosts, the frame the page occupied before eviction.
    frame_id: FrameId,
    /// Ghost entries are never evictable.
    evictable: bool,
    region: Region,
    /// Handle of this entry's node in the list named by `region`.
    slot: SlotId,
}

/// Adaptive Replacement Cache (ARC) frame replacer.
///
/// Splits resident frames between a recency list (`T1`, pages seen once) and
/// a frequency list (`T2`, pages seen more than once), and remembers the
/// identities of recently evicted pages on two ghost lists. A hit on a ghost
/// means the access would have been a resident hit had the corresponding
/// list been larger, so the adaptive target `p` -- the share of the pool
/// granted to recency -- is nudged towards that side. This makes the policy
/// resistant to sequential scans: a scan floods `T1` and its ghosts, never
/// `T2`, and the frequent working set survives.
#[derive(Clone)]
pub struct ArcReplacer {
    inner: Arc<RwLock<Inner>>,
}

struct Inner {
    /// Maximum number of resident frames; ghost history is bounded so that
    /// the whole directory never exceeds twice this.
    capacity: usize,

    /// Resident frames seen exactly once, MRU at the front.
    t1: SlotList,
    /// Resident frames seen more than once, MRU at the front.
    t2: SlotList,
    /// Page ids evicted from `t1`, MRU at the front.
    b1: SlotList,
    /// Page ids evicted from `t2`, MRU at the front.
    b2: SlotList,

    /// Target size for `t1`. Evictions come from `t1` once it reaches the
    /// target, from `t2` otherwise. Adapted on ghost hits, clamped to
    /// `[0, capacity]`.
    p: usize,

    /// Index of resident entries, keyed by frame id.
    alive: HashMap<FrameId, FrameStatus>,
    /// Index of ghost entries, keyed by page id.
    ghost: HashMap<PageId, FrameStatus>,

    /// Number of evictable resident frames.
    size: usize,
}

impl ArcReplacer {
    /// Creates a new ARC replacer over a pool of `capacity` frames.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "capacity must be > 0");
        Self {
            inner: Arc::new(RwLock::new(Inner {
                capacity,
                t1: SlotList::with_capacity(capacity),
                t2: SlotList::with_capacity(capacity),
                b1: SlotList::with_capacity(capacity),
                b2: SlotList::with_capacity(capacity),
                p: 0,
                alive: HashMap::with_capacity(capacity),
                ghost: HashMap::with_capacity(capacity),
                size: 0,
            })),
        }
    }

    /// Current adaptive target size for the recency list.
    ///
    /// Starts at zero and moves towards the side whose ghost list is being
    /// hit; always within `[0, capacity]`.
    pub fn mru_target(&self) -> usize {
        self.inner.read().p
    }
}

impl Inner {
    fn list_mut(&mut self, region: Region) -> &mut SlotList {
        match region {
            Region::T1 => &mut self.t1,
            Region::T2 => &mut self.t2,
            Region::B1 => &mut self.b1,
            Region::B2 => &mut self.b2,
        }
    }

    fn directory_len(&self) -> usize {
        self.t1.len() + self.t2.len() + self.b1.len() + self.b2.len()
    }

    /// Admits a frame as a fresh resident entry at the MRU end of `region`.
    fn admit(&mut self, frame_id: FrameId, page_id: PageId, region: Region) {
        debug_assert!(matches!(region, Region::T1 | Region::T2));
        let slot = self.list_mut(region).push_front(frame_id);
        self.alive.insert(frame_id, FrameStatus {
            page_id,
            frame_id,
            evictable: true,
            region,
            slot,
        });
        self.size += 1;
    }

    /// Makes room in the directory before a miss admission.
    ///
    /// Ghost history is trimmed so that the recency side stays within
    /// `capacity` entries and the whole directory within twice that. When
    /// `t1` alone saturates the directory there is no ghost left to trim,
    /// and its coldest resident is dropped outright, unremembered.
    fn make_room(&mut self) {
        if self.t1.len() + self.b1.len() == self.capacity {
            if self.t1.len() < self.capacity {
                if let Some(page_id) = self.b1.pop_back() {
                    self.ghost.remove(&page_id);
                }
            } else if let Some(frame_id) = self.t1.pop_back() {
                if let Some(status) = self.alive.remove(&frame_id) {
                    if status.evictable {
                        self.size -= 1;
                    }
                }
            }
        } else if self.directory_len() == 2 * self.capacity {
            if let Some(page_id) = self.b2.pop_back() {
                self.ghost.remove(&page_id);
            }
        }
    }

    /// First evictable frame from the LRU end of a resident list.
    fn victim_in(&self, region: Region) -> Option<FrameId> {
        let list = match region {
            Region::T1 => &self.t1,
            _ => &self.t2,
        };
        list.iter_lru()
            .map(|(_, frame_id)| frame_id)
            .find(|frame_id| self.alive.get(frame_id).is_some_and(|s| s.evictable))
    }

    /// Selects the victim without removing it: `t1` once it has reached the
    /// adaptive target, `t2` otherwise, falling back to the other list when
    /// the preferred one holds no evictable frame.
    fn select_victim(&self) -> Option<FrameId> {
        if self.t1.len() >= self.p {
            self.victim_in(Region::T1)
                .or_else(|| self.victim_in(Region::T2))
        } else {
            self.victim_in(Region::T2)
                .or_else(|| self.victim_in(Region::T1))
        }
    }

    /// Moves an evicted frame's entry from the resident index to the ghost
    /// history matching its former region.
    fn retire(&mut self, frame_id: FrameId) -> Option<FrameId> {
        let mut status = self.alive.remove(&frame_id)?;
        debug_assert!(matches!(status.region, Region::T1 | Region::T2));
        let ghost_region = if status.region == Region::T1 {
            Region::B1
        } else {
            Region::B2
        };

        self.list_mut(status.region).unlink(status.slot);
        status.slot = self.list_mut(ghost_region).push_front(status.page_id);
        status.region = ghost_region;
        status.evictable = false;
        self.size -= 1;

        debug!(
            "evicted frame {}; page {} remembered in {ghost_region:?}",
            status.frame_id, status.page_id
        );
        self.ghost.insert(status.page_id, status);
        Some(frame_id)
    }
}

impl ReplacementPolicy for ArcReplacer {
    type Error = ReclaimError;

    fn record_access(&self, frame_id: FrameId, page_id: PageId) -> ReclaimResult<()> {
        let mut inner = self.inner.write();

        // Resident hit. Frame identity wins: if the caller reports a new
        // page id for a resident frame, the stored page id is kept.
        if let Some(mut status) = inner.alive.get(&frame_id).copied() {
            debug_assert!(matches!(status.region, Region::T1 | Region::T2));
            if status.region == Region::T1 {
                // Second access promotes the frame to the frequent side.
                inner.t1.unlink(status.slot);
                status.slot = inner.t2.push_front(frame_id);
                status.region = Region::T2;
                inner.alive.insert(frame_id, status);
            } else {
                inner.t2.move_to_front(status.slot);
            }
            return Ok(());
        }

        // Ghost hit. The access would have been resident under a different
        // recency/frequency split, so shift the target towards the side that
        // missed, then re-admit the page as frequent.
        if let Some(status) = inner.ghost.remove(&page_id) {
            let (b1_len, b2_len) = (inner.b1.len(), inner.b2.len());
            if status.region == Region::B1 {
                let delta = if b1_len >= b2_len { 1 } else { b2_len / b1_len };
                inner.p = (inner.p + delta).min(inner.capacity);
                inner.b1.unlink(status.slot);
            } else {
                let delta = if b2_len >= b1_len { 1 } else { b1_len / b2_len };
                inner.p = inner.p.saturating_sub(delta);
                inner.b2.unlink(status.slot);
            }
            trace!(
                "ghost hit on page {page_id} in {:?}; recency target now {}",
                status.region, inner.p
            );
            inner.admit(frame_id, page_id, Region::T2);
            return Ok(());
        }

        // Miss: the page has no history at all.
        inner.make_room();
        inner.admit(frame_id, page_id, Region::T1);
        Ok(())
    }

    fn record_access_with(
        &self,
        frame_id: FrameId,
        page_id: PageId,
        _access_type: AccessType,
    ) -> ReclaimResult<()> {
        // No special handling for access type in ARC.
        self.record_access(frame_id, page_id)
    }

    fn set_evictable(&self, frame_id: FrameId, evictable: bool) -> ReclaimResult<()> {
        let mut inner = self.inner.write();

        let status = inner
            .alive
            .get_mut(&frame_id)
            .ok_or(ReclaimError::InvalidFrameId(frame_id))?;

        // No-op if the frame is already in the desired state.
        if status.evictable == evictable {
            return Ok(());
        }

        status.evictable = evictable;
        if evictable {
            inner.size += 1;
        } else {
            inner.size -= 1;
        }
        Ok(())
    }

    fn evict(&self) -> Option<FrameId> {
        let mut inner = self.inner.write();
        let frame_id = inner.select_victim()?;
        inner.retire(frame_id)
    }

    fn peek(&self) -> Option<FrameId> {
        self.inner.read().select_victim()
    }

    fn remove(&self, frame_id: FrameId) -> ReclaimResult<()> {
        let mut inner = self.inner.write();

        let Some(status) = inner.alive.get(&frame_id).copied() else {
            return Ok(());
        };
        if !status.evictable {
            return Err(ReclaimError::PinnedFrameRemoval(frame_id));
        }

        // Explicit removal is not a policy eviction: no ghost is recorded.
        inner.list_mut(status.region).unlink(status.slot);
        inner.alive.remove(&frame_id);
        inner.size -= 1;
        Ok(())
    }

    fn capacity(&self) -> usize {
        self.inner.read().capacity
    }

    fn size(&self) -> usize {
        self.inner.read().size
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    impl Inner {
        /// LRU-to-MRU frame order of a resident list.
        fn lru_frames(&self, region: Region) -> Vec<FrameId> {
            let list = match region {
                Region::T1 => &self.t1,
                _ => &self.t2,
            };
            list.iter_lru().map(|(_, frame_id)| frame_id).collect()
        }

        /// LRU-to-MRU page order of a ghost list.
        fn lru_pages(&self, region: Region) -> Vec<PageId> {
            let list = match region {
                Region::B1 => &self.b1,
                _ => &self.b2,
            };
            list.iter_lru().map(|(_, page_id)| page_id).collect()
        }

        fn assert_invariants(&self) {
            assert!(self.t1.len() + self.b1.len() <= self.capacity);
            assert!(self.directory_len() <= 2 * self.capacity);
            assert!(self.p <= self.capacity);

            assert_eq!(self.alive.len(), self.t1.len() + self.t2.len());
            assert_eq!(self.ghost.len(), self.b1.len() + self.b2.len());
            assert_eq!(
                self.size,
                self.alive.values().filter(|s| s.evictable).count()
            );

            // Every list entry resolves through its index, and the index's
            // node handle points back at the entry's actual list position.
            for (region, list) in [(Region::T1, &self.t1), (Region::T2, &self.t2)] {
                for (slot, frame_id) in list.iter_lru() {
                    let status = &self.alive[&frame_id];
                    assert_eq!(status.region, region);
                    assert_eq!(status.slot, slot);
                    assert_eq!(status.frame_id, frame_id);
                }
            }
            for (region, list) in [(Region::B1, &self.b1), (Region::B2, &self.b2)] {
                for (slot, page_id) in list.iter_lru() {
                    let status = &self.ghost[&page_id];
                    assert_eq!(status.region, region);
                    assert_eq!(status.slot, slot);
                    assert_eq!(status.page_id, page_id);
                    assert!(!status.evictable);
                }
            }
        }
    }

    #[test]
    fn regions_after_miss_hit_and_evict() {
        let replacer = ArcReplacer::new(3);
        replacer.record_access(0, 10).unwrap();
        replacer.record_access(1, 11).unwrap();
        replacer.record_access(2, 12).unwrap();
        replacer.record_access(0, 10).unwrap();

        {
            let inner = replacer.inner.read();
            assert_eq!(inner.lru_frames(Region::T1), vec![1, 2]);
            assert_eq!(inner.lru_frames(Region::T2), vec![0]);
            inner.assert_invariants();
        }

        // |T1| = 2 >= p = 0, so the victim is T1's LRU entry.
        assert_eq!(replacer.evict(), Some(1));
        let inner = replacer.inner.read();
        assert_eq!(inner.lru_pages(Region::B1), vec![11]);
        inner.assert_invariants();
    }

    #[test]
    fn recency_side_full_drops_oldest_ghost() {
        let replacer = ArcReplacer::new(2);
        replacer.record_access(0, 10).unwrap();
        replacer.record_access(1, 11).unwrap();
        assert_eq!(replacer.evict(), Some(0));

        // |T1| + |B1| == capacity with room in T1: the oldest B1 ghost goes.
        replacer.record_access(0, 12).unwrap();
        let inner = replacer.inner.read();
        assert_eq!(inner.lru_frames(Region::T1), vec![1, 0]);
        assert_eq!(inner.lru_pages(Region::B1), Vec::<PageId>::new());
        inner.assert_invariants();
    }

    #[test]
    fn saturated_recency_list_drops_its_coldest_resident() {
        let replacer = ArcReplacer::new(2);
        replacer.record_access(0, 10).unwrap();
        replacer.record_access(1, 11).unwrap();

        // T1 alone fills the directory and B1 is empty, so the miss pushes
        // out T1's LRU resident without leaving a ghost behind.
        replacer.record_access(2, 12).unwrap();
        let inner = replacer.inner.read();
        assert_eq!(inner.lru_frames(Region::T1), vec![1, 2]);
        assert!(!inner.alive.contains_key(&0));
        assert!(!inner.ghost.contains_key(&10));
        assert_eq!(inner.size, 2);
        inner.assert_invariants();
    }

    #[test]
    fn full_directory_drops_oldest_frequent_ghost() {
        let replacer = ArcReplacer::new(2);
        // Build T2 = [1, 0] via second hits, then push both to B2.
        replacer.record_access(0, 10).unwrap();
        replacer.record_access(1, 11).unwrap();
        replacer.record_access(0, 10).unwrap();
        replacer.record_access(1, 11).unwrap();
        assert_eq!(replacer.evict(), Some(0));
        assert_eq!(replacer.evict(), Some(1));

        // Rebuild one resident on each side and one B1 ghost, filling the
        // directory: T2 = [0], B1 = [13], B2 = [10, 11].
        replacer.record_access(0, 12).unwrap();
        replacer.record_access(0, 12).unwrap();
        replacer.record_access(1, 13).unwrap();
        assert_eq!(replacer.evict(), Some(1));

        {
            let inner = replacer.inner.read();
            assert_eq!(inner.directory_len(), 4);
            assert_eq!(inner.lru_pages(Region::B2), vec![10, 11]);
            inner.assert_invariants();
        }

        // Directory is at 2 * capacity and the recency side is not full:
        // the next miss forgets B2's LRU ghost, page 10.
        replacer.record_access(1, 14).unwrap();
        let inner = replacer.inner.read();
        assert!(!inner.ghost.contains_key(&10));
        assert!(inner.ghost.contains_key(&11));
        assert_eq!(inner.directory_len(), 4);
        inner.assert_invariants();
    }

    #[test]
    fn removal_leaves_no_ghost() {
        let replacer = ArcReplacer::new(2);
        replacer.record_access(0, 10).unwrap();
        replacer.record_access(1, 11).unwrap();
        replacer.remove(0).unwrap();

        let inner = replacer.inner.read();
        assert_eq!(inner.lru_frames(Region::T1), vec![1]);
        assert!(inner.ghost.is_empty());
        assert_eq!(inner.size, 1);
        inner.assert_invariants();
    }

    #[test]
    fn invariants_hold_under_mixed_workload() {
        // Cheap xorshift so the schedule is deterministic.
        let mut state = 0x9e3779b97f4a7c15u64;
        let mut next = move || {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            state
        };

        let capacity = 8;
        let replacer = ArcReplacer::new(capacity);
        for _ in 0..4000 {
            let frame_id = (next() % capacity as u64) as FrameId;
            let page_id = (next() % (3 * capacity) as u64) as PageId;
            match next() % 10 {
                0..=4 => replacer.record_access(frame_id, page_id).unwrap(),
                5 => {
                    let _ = replacer.set_evictable(frame_id, false);
                }
                6 => {
                    let _ = replacer.set_evictable(frame_id, true);
                }
                7 => {
                    let _ = replacer.remove(frame_id);
                }
                8 => {
                    replacer.evict();
                }
                _ => {
                    let peeked = replacer.peek();
                    assert_eq!(peeked, replacer.evict());
                }
            }
            replacer.inner.read().assert_invariants();
        }
    }
}
