#![doc = include_str!("../README.md")]
#![deny(missing_docs)]
#![deny(elided_lifetimes_in_paths)]

mod error;
mod replacer;
mod util;

use std::error::Error;

pub use {
    error::{ReclaimError, ReclaimResult},
    replacer::{ArcReplacer, ClockReplacer},
};

/// Buffer pool frame identifier.
///
/// Conceptually, the buffer pool is a fixed-size array of frames/slots, where
/// each frame holds the contents of some page. The frame identifier is an
/// index into this array. Frames are allocated by the buffer pool manager,
/// never by a replacer.
pub type FrameId = usize;

/// Logical page identifier.
///
/// Pages outlive their residency in a frame: a policy may remember the
/// identity of an evicted page (a "ghost" entry) to detect accesses that
/// would have been hits under a slightly larger cache. CLOCK ignores page
/// identifiers entirely.
pub type PageId = usize;

/// Nature of a page access.
///
/// Policies might want to distinguish access patterns -- a page fetched for a
/// single point lookup is not the same signal as a page streamed through by
/// a full scan. Neither bundled policy currently weights access types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AccessType {
    /// Access of an unspecified nature.
    #[default]
    Unknown,
    /// Point lookup of a single record.
    Lookup,
    /// Sequential scan touching many pages once.
    Scan,
    /// Access on behalf of an index traversal.
    Index,
}

/// Frame replacement policy.
///
/// Defines an interface for interacting with different eviction strategies.
/// At its core, it provides methods for logging page accesses, managing the
/// pool of eviction candidates, and eventually locating the next frame to
/// reuse.
///
/// All operations serialize on a lock internal to the policy, so a policy
/// handle may be shared freely between threads.
pub trait ReplacementPolicy {
    /// Error type for the replacement policy.
    type Error: Error;

    /// Notifies the policy that the page held by `frame_id` has been
    /// referenced/accessed.
    ///
    /// `page_id` names the page currently loaded in the frame; policies that
    /// track evicted page identities use it to recognize reloads.
    fn record_access(&self, frame_id: FrameId, page_id: PageId) -> Result<(), Self::Error>;

    /// Same as [`ReplacementPolicy::record_access`], but also logs the nature
    /// of the access.
    fn record_access_with(
        &self,
        frame_id: FrameId,
        page_id: PageId,
        access_type: AccessType,
    ) -> Result<(), Self::Error>;

    /// Admits (`true`) or withdraws (`false`) a frame from the candidate
    /// pool.
    ///
    /// A non-evictable frame is invisible to [`ReplacementPolicy::evict`].
    /// If the frame is already in the requested state, nothing happens.
    fn set_evictable(&self, frame_id: FrameId, evictable: bool) -> Result<(), Self::Error>;

    /// Finds the next frame to be evicted and evicts it.
    ///
    /// Only evictable frames are candidates. Returns `None` when no
    /// candidate exists (pool empty, or every frame pinned) -- an expected
    /// condition the caller handles by blocking or retrying, not an error.
    fn evict(&self) -> Option<FrameId>;

    /// Peeks at the next frame to be evicted.
    ///
    /// Returns the frame [`ReplacementPolicy::evict`] would select, without
    /// changing any policy state.
    fn peek(&self) -> Option<FrameId>;

    /// Removes a frame entirely, regardless of its eviction priority.
    ///
    /// In contrast to [`ReplacementPolicy::evict`], this drops an arbitrary
    /// frame and records no history about its page. Removing a known but
    /// non-evictable frame is a caller bookkeeping bug and returns an error;
    /// removing an unknown frame is a no-op.
    fn remove(&self, frame_id: FrameId) -> Result<(), Self::Error>;

    /// Returns the maximum number of resident frames the policy tracks.
    fn capacity(&self) -> usize;

    /// The number of frames that can be evicted, i.e. the evictable ones.
    fn size(&self) -> usize;

    /// Pins a frame, marking it non-evictable.
    fn pin(&self, frame_id: FrameId) -> Result<(), Self::Error> {
        self.set_evictable(frame_id, false)
    }

    /// Unpins a frame, marking it evictable.
    fn unpin(&self, frame_id: FrameId) -> Result<(), Self::Error> {
        self.set_evictable(frame_id, true)
    }
}
