//! Error types.
//!
//! Only allocation failure is a hard error. Malformed Markdown constructs
//! degrade to paragraph text and are reported through
//! [`ParseReport`](crate::block::ParseReport) instead.

/// Result alias used throughout the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Hard failure of a parse or render call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// The arena (or an output buffer) could not provide the requested memory.
    #[error("allocation of {requested} bytes failed: {cause}")]
    AllocationFailure {
        /// Number of bytes (or elements) requested.
        requested: usize,
        /// Why the allocation was refused.
        cause: AllocCause,
    },
}

impl Error {
    pub(crate) fn limit(requested: usize) -> Self {
        Self::AllocationFailure {
            requested,
            cause: AllocCause::LimitExceeded,
        }
    }

    pub(crate) fn out_of_memory(requested: usize) -> Self {
        Self::AllocationFailure {
            requested,
            cause: AllocCause::OutOfMemory,
        }
    }
}

/// Reason an allocation was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AllocCause {
    /// The arena's configured capacity limit would be exceeded.
    LimitExceeded,
    /// The global allocator refused the reservation.
    OutOfMemory,
}

impl std::fmt::Display for AllocCause {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::LimitExceeded => f.write_str("arena limit exceeded"),
            Self::OutOfMemory => f.write_str("out of memory"),
        }
    }
}
