use crate::FrameId;

/// Replacement policy error.
///
/// Every variant signals a caller bookkeeping bug; the replacer does not
/// attempt recovery. Running out of eviction candidates is not an error --
/// it is reported as an absent victim.
#[derive(Debug, PartialEq, thiserror::Error)]
pub enum ReclaimError {
    /// Invalid frame id.
    #[error("Invalid frame id: {0}")]
    InvalidFrameId(FrameId),

    /// Trying to remove a pinned frame.
    #[error("Trying to remove pinned frame: {0}")]
    PinnedFrameRemoval(FrameId),
}

/// Replacement policy result type.
pub type ReclaimResult<T> = Result<T, ReclaimError>;
