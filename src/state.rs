use crate::types::{Direction, UnitigId};

/// Traversal mark of one unitig in one direction. Marks only ever progress
/// `Undiscovered -> Seen -> Visited` within a walk; the seen-only cleaner is
/// the single sanctioned downgrade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mark {
    #[default]
    Undiscovered,
    Seen,
    Visited,
}

#[derive(Debug, Clone, Copy, Default)]
struct NodeState {
    fw: Mark,
    bw: Mark,
}

/// Side table of per-unitig, per-direction traversal marks, owned by the
/// DFS engine. Indexed by 1-based unitig id.
#[derive(Debug)]
pub struct NodeStates {
    states: Vec<NodeState>,
}

impl NodeStates {
    pub fn new(num_unitigs: usize) -> Self {
        NodeStates { states: vec![NodeState::default(); num_unitigs + 1] }
    }

    #[inline]
    pub fn get(&self, id: UnitigId, direction: Direction) -> Mark {
        let state = &self.states[id];
        match direction {
            Direction::Forward => state.fw,
            Direction::Backward => state.bw,
        }
    }

    #[inline]
    pub fn is_undiscovered(&self, id: UnitigId, direction: Direction) -> bool {
        self.get(id, direction) == Mark::Undiscovered
    }

    #[inline]
    pub fn is_visited(&self, id: UnitigId, direction: Direction) -> bool {
        self.get(id, direction) == Mark::Visited
    }

    pub fn mark_seen(&mut self, id: UnitigId, direction: Direction) {
        let slot = self.slot(id, direction);
        if *slot != Mark::Visited {
            *slot = Mark::Seen;
        }
    }

    /// Start nodes that produced a traceback are finalized in both directions.
    pub fn mark_visited(&mut self, id: UnitigId) {
        self.states[id].fw = Mark::Visited;
        self.states[id].bw = Mark::Visited;
    }

    /// The seen-only cleaner: downgrade `Seen` back to `Undiscovered` in both
    /// directions, leaving `Visited` untouched.
    pub fn clear_seen(&mut self) {
        for state in self.states.iter_mut() {
            if state.fw == Mark::Seen {
                state.fw = Mark::Undiscovered;
            }
            if state.bw == Mark::Seen {
                state.bw = Mark::Undiscovered;
            }
        }
    }

    pub fn clear_all(&mut self) {
        for state in self.states.iter_mut() {
            *state = NodeState::default();
        }
    }

    fn slot(&mut self, id: UnitigId, direction: Direction) -> &mut Mark {
        let state = &mut self.states[id];
        match direction {
            Direction::Forward => &mut state.fw,
            Direction::Backward => &mut state.bw,
        }
    }
}
