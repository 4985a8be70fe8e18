use {
    crate::{AccessType, FrameId, PageId, ReclaimError, ReclaimResult, ReplacementPolicy},
    log::debug,
    parking_lot::RwLock,
    std::sync::Arc,
};

/// Second-chance (CLOCK) frame replacer.
///
/// Approximates LRU with a circular hand sweeping a fixed array of frame
/// slots. Each tracked slot carries a reference bit: the hand clears the bit
/// and moves on, so a frame accessed since the last sweep survives one extra
/// rotation before it is victimized.
///
/// Frame identifiers must be below the construction-time capacity;
/// out-of-range identifiers are ignored by every operation.
#[derive(Clone)]
pub struct ClockReplacer {
    inner: Arc<RwLock<Inner>>,
}

#[derive(Debug, Clone, Copy, Default)]
struct Slot {
    /// Whether the frame is held by the replacer as an eviction candidate.
    tracked: bool,
    /// Set on access; grants one extra rotation before eviction.
    referenced: bool,
}

struct Inner {
    /// One slot per frame in the pool.
    slots: Vec<Slot>,

    /// Clock hand, always within `[0, capacity)`.
    hand: usize,

    /// Number of tracked (evictable) frames.
    size: usize,
}

impl ClockReplacer {
    /// Creates a new CLOCK replacer over a pool of `capacity` frames.
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Inner {
                slots: vec![Slot::default(); capacity],
                hand: 0,
                size: 0,
            })),
        }
    }
}

impl ReplacementPolicy for ClockReplacer {
    type Error = ReclaimError;

    fn record_access(&self, frame_id: FrameId, _page_id: PageId) -> ReclaimResult<()> {
        let mut inner = self.inner.write();
        match inner.slots.get_mut(frame_id) {
            // An access to a tracked frame earns it a second chance; an
            // access to an untracked frame admits it.
            Some(slot) if slot.tracked => slot.referenced = true,
            Some(slot) => {
                slot.tracked = true;
                inner.size += 1;
            }
            None => {}
        }
        Ok(())
    }

    fn record_access_with(
        &self,
        frame_id: FrameId,
        page_id: PageId,
        _access_type: AccessType,
    ) -> ReclaimResult<()> {
        // No special handling for access type in CLOCK.
        self.record_access(frame_id, page_id)
    }

    fn set_evictable(&self, frame_id: FrameId, evictable: bool) -> ReclaimResult<()> {
        let mut inner = self.inner.write();
        match inner.slots.get_mut(frame_id) {
            Some(slot) if evictable && !slot.tracked => {
                // Freshly admitted frames start with the reference bit clear;
                // only a subsequent access earns the second chance.
                slot.tracked = true;
                slot.referenced = false;
                inner.size += 1;
            }
            Some(slot) if !evictable && slot.tracked => {
                *slot = Slot::default();
                inner.size -= 1;
            }
            // Already in the requested state, or out of range.
            _ => {}
        }
        Ok(())
    }

    fn evict(&self) -> Option<FrameId> {
        let mut inner = self.inner.write();
        if inner.size == 0 {
            return None;
        }

        // At least one frame is tracked, so the sweep terminates within two
        // rotations: one to clear reference bits, one to select.
        loop {
            let hand = inner.hand;
            let slot = &mut inner.slots[hand];
            if slot.tracked && !slot.referenced {
                *slot = Slot::default();
                inner.size -= 1;
                inner.hand = (hand + 1) % inner.slots.len();
                debug!("clock hand victimized frame {hand}");
                return Some(hand);
            }
            if slot.tracked {
                slot.referenced = false;
            }
            inner.hand = (hand + 1) % inner.slots.len();
        }
    }

    fn peek(&self) -> Option<FrameId> {
        let inner = self.inner.read();
        if inner.size == 0 {
            return None;
        }

        let capacity = inner.slots.len();
        let from_hand = (0..capacity).map(|i| (inner.hand + i) % capacity);

        // First rotation takes the first unreferenced candidate; if every
        // candidate holds a reference bit, the sweep would clear them all and
        // come back to the first tracked slot.
        from_hand
            .clone()
            .find(|&i| inner.slots[i].tracked && !inner.slots[i].referenced)
            .or_else(|| from_hand.clone().find(|&i| inner.slots[i].tracked))
    }

    fn remove(&self, frame_id: FrameId) -> ReclaimResult<()> {
        let mut inner = self.inner.write();
        match inner.slots.get_mut(frame_id) {
            Some(slot) if slot.tracked => {
                *slot = Slot::default();
                inner.size -= 1;
            }
            // A withdrawn frame and a never-seen frame look the same here,
            // so both take the unknown-frame no-op path.
            _ => {}
        }
        Ok(())
    }

    fn capacity(&self) -> usize {
        self.inner.read().slots.len()
    }

    fn size(&self) -> usize {
        self.inner.read().size
    }
}
