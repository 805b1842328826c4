//! The block sequence produced by the parser.
//!
//! Blocks are stored in an index arena and linked through [`BlockId`]s, so
//! growing the backing `Vec` never invalidates a link.

use crate::error::{Error, Result};

use super::event::Block;

/// Handle to a block within a [`Document`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlockId(u32);

impl BlockId {
    /// Position of the block in append order.
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone)]
struct Node {
    block: Block,
    next: Option<BlockId>,
}

/// Singly-linked sequence of blocks with O(1) append.
#[derive(Debug, Clone, Default)]
pub struct Document {
    nodes: Vec<Node>,
    first: Option<BlockId>,
    current: Option<BlockId>,
}

impl Document {
    /// Create an empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty document with room for `capacity` blocks.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: Vec::with_capacity(capacity),
            first: None,
            current: None,
        }
    }

    /// Append a block after the current tail.
    pub fn push(&mut self, block: Block) -> Result<BlockId> {
        if self.nodes.len() >= u32::MAX as usize {
            return Err(Error::limit(self.nodes.len() + 1));
        }
        self.nodes
            .try_reserve(1)
            .map_err(|_| Error::out_of_memory(std::mem::size_of::<Node>()))?;

        let id = BlockId(self.nodes.len() as u32);
        self.nodes.push(Node { block, next: None });
        match self.current {
            Some(tail) => self.nodes[tail.index()].next = Some(id),
            None => self.first = Some(id),
        }
        self.current = Some(id);
        Ok(id)
    }

    /// Drop every block appended after the first `len`, relinking the tail.
    ///
    /// Does nothing if the document holds `len` blocks or fewer.
    pub fn truncate(&mut self, len: usize) {
        if len >= self.nodes.len() {
            return;
        }
        self.nodes.truncate(len);
        self.current = len.checked_sub(1).map(|i| BlockId(i as u32));
        match self.current {
            Some(tail) => self.nodes[tail.index()].next = None,
            None => self.first = None,
        }
    }

    /// First block, if any.
    #[inline]
    pub fn first(&self) -> Option<BlockId> {
        self.first
    }

    /// Most recently appended block, if any.
    #[inline]
    pub fn current(&self) -> Option<BlockId> {
        self.current
    }

    /// Look up a block.
    #[inline]
    pub fn get(&self, id: BlockId) -> Option<&Block> {
        self.nodes.get(id.index()).map(|node| &node.block)
    }

    /// The block linked after `id`.
    #[inline]
    pub fn next(&self, id: BlockId) -> Option<BlockId> {
        self.nodes.get(id.index()).and_then(|node| node.next)
    }

    /// Number of blocks.
    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if the document has no blocks.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Walk the blocks in sequence order.
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            doc: self,
            cursor: self.first,
        }
    }
}

impl<'a> IntoIterator for &'a Document {
    type Item = &'a Block;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl FromIterator<Block> for Document {
    /// Build a document directly, bypassing the parser.
    fn from_iter<I: IntoIterator<Item = Block>>(iter: I) -> Self {
        let mut doc = Document::new();
        for block in iter {
            doc.nodes.push(Node { block, next: None });
        }
        let len = doc.nodes.len() as u32;
        for i in 1..len {
            doc.nodes[(i - 1) as usize].next = Some(BlockId(i));
        }
        if len > 0 {
            doc.first = Some(BlockId(0));
            doc.current = Some(BlockId(len - 1));
        }
        doc
    }
}

/// Iterator over the blocks of a [`Document`], following the links.
pub struct Iter<'a> {
    doc: &'a Document,
    cursor: Option<BlockId>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = &'a Block;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.cursor?;
        let node = self.doc.nodes.get(id.index())?;
        self.cursor = node.next;
        Some(&node.block)
    }
}
