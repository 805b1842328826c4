//! Chunked bump arena for parsed text.
//!
//! Every string the block parser produces lives here. Each chunk is a
//! `String` whose capacity is reserved once and never exceeded, so its heap
//! buffer never moves. When a chunk cannot satisfy a request a new chunk is
//! appended; the unused tail of the old one is abandoned. Handles are plain
//! indices resolved at the point of use.
//!
//! # Example
//! ```
//! use inkpress::Arena;
//!
//! let mut arena = Arena::with_chunk_size(8);
//! let a = arena.alloc_str("hello").unwrap();
//! let b = arena.alloc_str("a longer string").unwrap();
//! assert_eq!(arena.str(a), "hello");
//! assert_eq!(arena.str(b), "a longer string");
//! assert_eq!(arena.stats().chunks, 2);
//! ```

use smallvec::SmallVec;

use crate::error::{Error, Result};

/// Capacity of the first chunk when none is given.
pub const DEFAULT_CHUNK_SIZE: usize = 4 * 1024;

/// Upper bound for the doubling growth policy. Larger requests still get a
/// chunk of exactly their size.
pub const MAX_CHUNK_SIZE: usize = 1024 * 1024;

/// Handle to a byte range issued by an [`Arena`].
///
/// A span stays valid for the whole lifetime of the arena that issued it.
/// Resolving a span against a different arena is a logic error and may panic.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub struct Span {
    chunk: u32,
    start: u32,
    len: u32,
}

// Compile-time size verification
const _: () = assert!(std::mem::size_of::<Span>() == 12);

impl Span {
    /// The empty span. Resolves to `""` in every arena.
    pub const EMPTY: Span = Span {
        chunk: 0,
        start: 0,
        len: 0,
    };

    /// Length in bytes.
    #[inline]
    pub const fn len(&self) -> usize {
        self.len as usize
    }

    /// Check if the span is empty.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }
}

/// Per-arena allocation counters.
///
/// These are owned by the arena, so independent sessions never share them.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ArenaStats {
    /// Successful non-empty allocations.
    pub allocations: usize,
    /// Total bytes handed out.
    pub bytes_allocated: usize,
    /// Number of chunks acquired.
    pub chunks: usize,
    /// Total capacity of all chunks.
    pub capacity: usize,
    /// Unused chunk tails left behind when a new chunk was acquired.
    pub abandoned: usize,
}

/// Pointer-stable bump allocator.
#[derive(Debug)]
pub struct Arena {
    chunks: SmallVec<[String; 4]>,
    next_chunk_size: usize,
    limit: Option<usize>,
    stats: ArenaStats,
}

impl Arena {
    /// Create an arena with the default first chunk size.
    pub fn new() -> Self {
        Self::with_chunk_size(DEFAULT_CHUNK_SIZE)
    }

    /// Create an arena whose first chunk holds `chunk_size` bytes.
    ///
    /// No memory is acquired until the first allocation.
    pub fn with_chunk_size(chunk_size: usize) -> Self {
        Self {
            chunks: SmallVec::new(),
            next_chunk_size: chunk_size.max(1),
            limit: None,
            stats: ArenaStats::default(),
        }
    }

    /// Size the first chunk for a document of `input_len` bytes.
    ///
    /// Parsed text is never longer than its source, so one chunk of the input
    /// size usually suffices.
    pub fn with_capacity_for(input_len: usize) -> Self {
        Self::with_chunk_size(input_len.clamp(64, MAX_CHUNK_SIZE))
    }

    /// Cap the total chunk capacity this arena may acquire.
    pub fn with_limit(mut self, max_bytes: usize) -> Self {
        self.limit = Some(max_bytes);
        self
    }

    /// Allocation counters for this arena.
    #[inline]
    pub fn stats(&self) -> ArenaStats {
        self.stats
    }

    /// Allocate `len` zero bytes and return their handle.
    ///
    /// On failure nothing is allocated.
    pub fn allocate(&mut self, len: usize) -> Result<Span> {
        self.push_with(len, |chunk| {
            chunk.extend(std::iter::repeat_n('\0', len));
        })
    }

    /// Copy a string into the arena.
    pub fn alloc_str(&mut self, s: &str) -> Result<Span> {
        self.push_with(s.len(), |chunk| chunk.push_str(s))
    }

    /// Resolve a handle to its text.
    #[inline]
    pub fn str(&self, span: Span) -> &str {
        if span.is_empty() {
            return "";
        }
        let start = span.start as usize;
        &self.chunks[span.chunk as usize][start..start + span.len()]
    }

    /// Mutable access to allocated text, for filling a span from
    /// [`allocate`](Self::allocate) in place.
    #[inline]
    pub fn str_mut(&mut self, span: Span) -> &mut str {
        if span.is_empty() {
            return Default::default();
        }
        let start = span.start as usize;
        &mut self.chunks[span.chunk as usize][start..start + span.len()]
    }

    /// Resolve a handle to its bytes.
    #[inline]
    pub fn bytes(&self, span: Span) -> &[u8] {
        self.str(span).as_bytes()
    }

    /// Reserve room for `len` bytes, then let `write` append exactly that many.
    fn push_with<F>(&mut self, len: usize, write: F) -> Result<Span>
    where
        F: FnOnce(&mut String),
    {
        if len == 0 {
            return Ok(Span::EMPTY);
        }
        if len > u32::MAX as usize {
            return Err(self.fail(Error::limit(len)));
        }

        let fits = self
            .chunks
            .last()
            .is_some_and(|chunk| chunk.capacity() - chunk.len() >= len);
        if !fits {
            self.grow(len)?;
        }

        let index = self.chunks.len() - 1;
        let chunk = &mut self.chunks[index];
        let start = chunk.len();
        let capacity = chunk.capacity();
        write(chunk);
        debug_assert_eq!(chunk.len(), start + len);
        debug_assert_eq!(chunk.capacity(), capacity, "arena chunk relocated");

        self.stats.allocations += 1;
        self.stats.bytes_allocated += len;

        Ok(Span {
            chunk: index as u32,
            start: start as u32,
            len: len as u32,
        })
    }

    /// Acquire a new chunk able to hold at least `min` bytes.
    #[cold]
    fn grow(&mut self, min: usize) -> Result<()> {
        let mut capacity = self.next_chunk_size.max(min);
        if let Some(limit) = self.limit {
            let available = limit.saturating_sub(self.stats.capacity);
            if available < min {
                return Err(self.fail(Error::limit(min)));
            }
            capacity = capacity.min(available);
        }
        if self.chunks.len() >= u32::MAX as usize {
            return Err(self.fail(Error::limit(min)));
        }

        let mut chunk = String::new();
        if chunk.try_reserve_exact(capacity).is_err() {
            return Err(self.fail(Error::out_of_memory(capacity)));
        }
        if self.chunks.try_reserve(1).is_err() {
            return Err(self.fail(Error::out_of_memory(std::mem::size_of::<String>())));
        }

        if let Some(last) = self.chunks.last() {
            self.stats.abandoned += last.capacity() - last.len();
        }
        self.stats.chunks += 1;
        self.stats.capacity += chunk.capacity();
        self.next_chunk_size = self
            .next_chunk_size
            .max(capacity.saturating_mul(2).min(MAX_CHUNK_SIZE));

        tracing::debug!(
            chunk = self.chunks.len(),
            capacity = chunk.capacity(),
            total = self.stats.capacity,
            "arena acquired chunk"
        );
        self.chunks.push(chunk);
        Ok(())
    }

    #[cold]
    fn fail(&self, err: Error) -> Error {
        tracing::warn!(
            error = %err,
            capacity = self.stats.capacity,
            limit = ?self.limit,
            "arena allocation failed"
        );
        err
    }
}

impl Default for Arena {
    fn default() -> Self {
        Self::new()
    }
}
