//! Markov speed chain.
//!
//! An ordered ladder of speeds arranged as a doubly-linked list inside a
//! fixed arena.  The tail's forward link wraps to the head; the head's
//! backward link points at itself.  Each link carries the percentage chance of
//! stepping back to its predecessor and forward to its successor; whatever
//! is left over is the chance of staying put.  Walking the chain one draw
//! at a time gives speeds that drift up and down smoothly instead of
//! jumping around like plain uniform sampling would.
//!
//! ```text
//!        ┌──────────────────────────────────────────────┐
//!        ▼                                              │
//!   [0] 2 ◀──▶ [1] 4 ◀──▶ [2] 6 ◀──▶ ... ◀──▶ [n-1] 32 ─┘
//!    ▲ head (back = self)                     tail
//!    cursor moves at most one link per draw
//! ```
//!
//! Links are arena indices, so the structure is `Copy`-friendly and needs
//! no lifetimes.  The chain is only mutable through
//! [`MarkovChainBuilder`]; once built, the cursor is the only state that
//! changes.

use heapless::Vec;
use rand::Rng;

use crate::config::SPEED_LADDER;
use crate::error::ChainError;

/// Arena size of the firmware's speed chain.
pub const CHAIN_CAPACITY: usize = 16;

/// The firmware's speed chain type.
pub type SpeedChain = MarkovChain<CHAIN_CAPACITY>;

/// One speed state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarkovNode {
    pub speed: u16,
    /// Arena index of the predecessor.
    pub previous: usize,
    /// Chance (0-100 %) of stepping to the predecessor.
    pub previous_probability: u8,
    /// Arena index of the successor.
    pub next: usize,
    /// Chance (0-100 %) of stepping to the successor.
    pub next_probability: u8,
}

// ═══════════════════════════════════════════════════════════════
//  Builder
// ═══════════════════════════════════════════════════════════════

/// Appends links in order and validates each one as it goes.
pub struct MarkovChainBuilder<const N: usize> {
    nodes: Vec<MarkovNode, N>,
}

impl<const N: usize> Default for MarkovChainBuilder<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> MarkovChainBuilder<N> {
    pub fn new() -> Self {
        Self { nodes: Vec::new() }
    }

    /// Append a link after the current tail.
    ///
    /// The new link points back at the old tail and forward at the head;
    /// only the old tail's forward link is rewritten.  The head's backward
    /// link stays on the head.
    pub fn add_link_to_back(
        &mut self,
        speed: u16,
        previous_probability: u8,
        next_probability: u8,
    ) -> Result<&mut Self, ChainError> {
        let index = self.nodes.len();
        if u16::from(previous_probability) + u16::from(next_probability) > 100 {
            return Err(ChainError::ProbabilityOverflow {
                index,
                previous: previous_probability,
                next: next_probability,
            });
        }

        let tail = index.checked_sub(1);
        let node = MarkovNode {
            speed,
            previous: tail.unwrap_or(index),
            previous_probability,
            next: 0,
            next_probability,
        };
        self.nodes
            .push(node)
            .map_err(|_| ChainError::CapacityExceeded { capacity: N })?;

        if let Some(tail) = tail {
            self.nodes[tail].next = index;
        }
        Ok(self)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Freeze the chain.  The cursor starts on the head.
    pub fn build(self) -> Result<MarkovChain<N>, ChainError> {
        if self.nodes.is_empty() {
            return Err(ChainError::Empty);
        }
        Ok(MarkovChain {
            nodes: self.nodes,
            cursor: 0,
        })
    }
}

// ═══════════════════════════════════════════════════════════════
//  Chain
// ═══════════════════════════════════════════════════════════════

/// A built, immutable speed chain plus its cursor.
#[derive(Debug, Clone)]
pub struct MarkovChain<const N: usize> {
    nodes: Vec<MarkovNode, N>,
    cursor: usize,
}

impl<const N: usize> MarkovChain<N> {
    /// Draw a uniform integer in `[0, 100]`, move the cursor accordingly
    /// and return its speed.
    pub fn next_speed<R: Rng + ?Sized>(&mut self, rng: &mut R) -> u16 {
        let draw: u8 = rng.gen_range(0..=100);
        self.advance(draw)
    }

    /// Move the cursor for a given draw in `[0, 100]`.
    ///
    /// `draw < previous` steps back, `draw < previous + next` steps
    /// forward, anything else stays.
    pub fn advance(&mut self, draw: u8) -> u16 {
        let node = self.nodes[self.cursor];
        let draw = u16::from(draw);
        let previous = u16::from(node.previous_probability);
        let next = u16::from(node.next_probability);

        if draw < previous {
            self.cursor = node.previous;
        } else if draw < previous + next {
            self.cursor = node.next;
        }
        self.nodes[self.cursor].speed
    }

    /// Speed under the cursor, without drawing.
    pub fn current_speed(&self) -> u16 {
        self.nodes[self.cursor].speed
    }

    /// Arena index of the cursor.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Place the cursor on a constructed link.
    pub fn seek(&mut self, index: usize) -> Result<(), ChainError> {
        self.check_index(index)?;
        self.cursor = index;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Bounds-checked access to a link.
    pub fn node(&self, index: usize) -> Result<&MarkovNode, ChainError> {
        self.check_index(index)?;
        Ok(&self.nodes[index])
    }

    pub fn nodes(&self) -> &[MarkovNode] {
        &self.nodes
    }

    fn check_index(&self, index: usize) -> Result<(), ChainError> {
        if index >= self.nodes.len() {
            return Err(ChainError::IndexOutOfRange {
                index,
                len: self.nodes.len(),
            });
        }
        Ok(())
    }
}

/// Build the firmware speed chain from [`SPEED_LADDER`].
pub fn default_speed_chain() -> Result<SpeedChain, ChainError> {
    let mut builder = MarkovChainBuilder::new();
    for (speed, previous, next) in SPEED_LADDER {
        builder.add_link_to_back(speed, previous, next)?;
    }
    builder.build()
}
