use glam::IVec3;
use std::collections::VecDeque;

/// A queued voxel and the index of the next neighbour direction to try
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchPosition {
    pub pos: IVec3,
    pub next_direction: usize,
}

impl SearchPosition {
    pub fn new(pos: IVec3) -> Self {
        Self {
            pos,
            next_direction: 0,
        }
    }
}

/// Two-queue breadth frontier
///
/// `current` holds positions at depth `k`, `next` collects their accepted
/// neighbours at depth `k + 1`. The queues swap only when `current` runs dry,
/// so every voxel at depth `k` is fully expanded before any at `k + 1`.
#[derive(Debug, Clone, Default)]
pub struct Frontier {
    current: VecDeque<SearchPosition>,
    next: VecDeque<SearchPosition>,
    depth: usize,
}

impl Frontier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Frontier holding a single seed at depth zero
    pub fn with_seed(seed: IVec3) -> Self {
        let mut frontier = Self::new();
        frontier.current.push_back(SearchPosition::new(seed));
        frontier
    }

    /// Queue a position one level deeper than the ones being expanded
    pub fn push(&mut self, pos: IVec3) {
        self.next.push_back(SearchPosition::new(pos));
    }

    /// Position being expanded, moving to the next depth when needed
    pub fn front_mut(&mut self) -> Option<&mut SearchPosition> {
        if self.current.is_empty() && !self.next.is_empty() {
            std::mem::swap(&mut self.current, &mut self.next);
            self.depth += 1;
        }
        self.current.front_mut()
    }

    /// Drop the position at the front once all its directions are tried
    pub fn pop_front(&mut self) -> Option<SearchPosition> {
        self.current.pop_front()
    }

    /// Depth of the positions currently being expanded
    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn len(&self) -> usize {
        self.current.len() + self.next.len()
    }

    pub fn is_empty(&self) -> bool {
        self.current.is_empty() && self.next.is_empty()
    }
}
