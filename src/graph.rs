use crate::colors::ColorSet;
use crate::constants::NEIGHBORS_PER_SIDE;
use crate::sequence::check_alphabet;
use crate::types::{ColortigError, Direction, UnitigId};
use fxhash::FxHashMap;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

pub type NeighborList = SmallVec<[Neighbor; NEIGHBORS_PER_SIDE]>;

/// One oriented adjacency entry: the neighbor's id plus the side of the
/// neighbor from which the walk enters when following this entry. Entering
/// from the backward side means the neighbor is read forward, and vice versa.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Neighbor {
    pub id: UnitigId,
    pub entry: Direction,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Unitig {
    pub id: UnitigId,
    pub name: String,
    pub seq: String,
    /// True if the stored sequence is the canonical orientation.
    pub strand: bool,
    pub predecessors: NeighborList,
    pub successors: NeighborList,
    pub head_colors: ColorSet,
    pub tail_colors: ColorSet,
}

impl Unitig {
    pub fn degree(&self) -> usize {
        self.predecessors.len() + self.successors.len()
    }

    pub fn side(&self, direction: Direction) -> &NeighborList {
        match direction {
            Direction::Forward => &self.successors,
            Direction::Backward => &self.predecessors,
        }
    }
}

/// Read-only façade over a built colored compacted de Bruijn graph. The
/// traversal engine never mutates it; all traversal state lives in side
/// tables owned by the engine.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Ccdbg {
    pub k: usize,
    pub num_colors: usize,
    unitigs: Vec<Unitig>,
    name_index: FxHashMap<String, usize>,
    ids_assigned: bool,
}

impl Ccdbg {
    pub fn new(k: usize, num_colors: usize) -> Self {
        Ccdbg {
            k,
            num_colors,
            unitigs: Vec::new(),
            name_index: FxHashMap::default(),
            ids_assigned: false,
        }
    }

    pub fn len(&self) -> usize {
        self.unitigs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.unitigs.is_empty()
    }

    /// Add a unitig with empty neighbor lists and colorless ends. Returns the
    /// id the unitig will carry once `assign_ids` has run.
    pub fn add_segment(&mut self, name: &str, seq: &str) -> Result<UnitigId, ColortigError> {
        if self.name_index.contains_key(name) {
            return Err(ColortigError::InvariantViolation(format!(
                "duplicate segment name '{}'",
                name
            )));
        }
        let slot = self.unitigs.len();
        self.name_index.insert(name.to_string(), slot);
        self.unitigs.push(Unitig {
            id: 0,
            name: name.to_string(),
            seq: seq.to_string(),
            strand: true,
            predecessors: SmallVec::new(),
            successors: SmallVec::new(),
            head_colors: ColorSet::new(self.num_colors),
            tail_colors: ColorSet::new(self.num_colors),
        });
        self.ids_assigned = false;
        Ok(slot + 1)
    }

    pub fn set_colors(
        &mut self,
        name: &str,
        strand: bool,
        head: ColorSet,
        tail: ColorSet,
    ) -> Result<(), ColortigError> {
        let slot = self.slot_of(name)?;
        let unitig = &mut self.unitigs[slot];
        unitig.strand = strand;
        unitig.head_colors = head;
        unitig.tail_colors = tail;
        Ok(())
    }

    /// Register a link `from(from_fwd)` -> `to(to_fwd)` on both unitigs.
    /// Reciprocal registrations of the same physical link deduplicate.
    pub fn add_link(
        &mut self,
        from: &str,
        from_fwd: bool,
        to: &str,
        to_fwd: bool,
    ) -> Result<(), ColortigError> {
        let from_slot = self.slot_of(from)?;
        let to_slot = self.slot_of(to)?;
        let from_id = from_slot + 1;
        let to_id = to_slot + 1;

        // the oriented `from` end leads into `to`
        let from_entry = Neighbor {
            id: to_id,
            entry: if to_fwd { Direction::Backward } else { Direction::Forward },
        };
        // walking the link the other way enters `from` from the end it left
        let to_entry = Neighbor {
            id: from_id,
            entry: if from_fwd { Direction::Forward } else { Direction::Backward },
        };

        {
            let u = &mut self.unitigs[from_slot];
            let list = if from_fwd { &mut u.successors } else { &mut u.predecessors };
            push_unique(list, from_entry);
        }
        {
            let u = &mut self.unitigs[to_slot];
            let list = if to_fwd { &mut u.predecessors } else { &mut u.successors };
            push_unique(list, to_entry);
        }
        Ok(())
    }

    /// Assign dense 1-based ids in construction order. Idempotent.
    pub fn assign_ids(&mut self) {
        for (i, unitig) in self.unitigs.iter_mut().enumerate() {
            unitig.id = i + 1;
        }
        self.ids_assigned = true;
    }

    pub fn is_id_init(&self) -> bool {
        self.ids_assigned
    }

    #[inline]
    pub fn unitig(&self, id: UnitigId) -> &Unitig {
        &self.unitigs[id - 1]
    }

    pub fn unitig_by_name(&self, name: &str) -> Option<&Unitig> {
        self.name_index.get(name).map(|&slot| &self.unitigs[slot])
    }

    pub fn iter(&self) -> impl Iterator<Item = &Unitig> {
        self.unitigs.iter()
    }

    pub fn degree(&self, id: UnitigId) -> usize {
        self.unitig(id).degree()
    }

    /// Direction the walk continues in after arriving at `u` from `src`:
    /// forward if `src` sits among `u`'s predecessors, backward otherwise.
    /// Ambiguous inside tight loops; callers disambiguate via state marks.
    pub fn where_to_go(&self, u: UnitigId, src: UnitigId) -> Direction {
        let mut ret = Direction::Backward;
        for nb in &self.unitig(u).predecessors {
            if nb.id == src {
                ret = Direction::Forward;
            }
        }
        ret
    }

    /// Side of `u` from which a walk coming out of `src` enters it.
    pub fn where_from(&self, u: UnitigId, src: UnitigId) -> Direction {
        self.where_to_go(u, src).flip()
    }

    /// Check the invariants traversal correctness depends on: the alphabet,
    /// minimum sequence length, id density, link reciprocity and the
    /// consistency of stored entry orientations.
    pub fn validate(&self) -> Result<(), ColortigError> {
        for (slot, unitig) in self.unitigs.iter().enumerate() {
            check_alphabet(&unitig.name, &unitig.seq)?;
            if unitig.seq.len() < self.k {
                return Err(ColortigError::InvariantViolation(format!(
                    "unitig '{}' is shorter than k ({} < {})",
                    unitig.name,
                    unitig.seq.len(),
                    self.k
                )));
            }
            if self.ids_assigned && unitig.id != slot + 1 {
                return Err(ColortigError::InvariantViolation(format!(
                    "unitig '{}' has id {} but occupies slot {}",
                    unitig.name,
                    unitig.id,
                    slot + 1
                )));
            }
            let own_id = slot + 1;
            for nb in unitig.predecessors.iter().chain(unitig.successors.iter()) {
                if nb.id == 0 || nb.id > self.unitigs.len() {
                    return Err(ColortigError::InvariantViolation(format!(
                        "unitig '{}' links to unknown id {}",
                        unitig.name, nb.id
                    )));
                }
                let other = &self.unitigs[nb.id - 1];
                let reciprocal = other
                    .predecessors
                    .iter()
                    .chain(other.successors.iter())
                    .any(|back| back.id == own_id);
                if !reciprocal {
                    return Err(ColortigError::InvariantViolation(format!(
                        "link {} -> {} has no reciprocal entry",
                        unitig.name, other.name
                    )));
                }
                // stored orientation must agree with the predecessor scan
                // unless the pair is loop-ambiguous
                let in_pre = other.predecessors.iter().any(|b| b.id == own_id);
                let in_suc = other.successors.iter().any(|b| b.id == own_id);
                if in_pre != in_suc {
                    let scanned = self.where_from(nb.id, own_id);
                    if scanned != nb.entry {
                        return Err(ColortigError::InvariantViolation(format!(
                            "link {} -> {} stores entry {:?} but adjacency implies {:?}",
                            unitig.name, other.name, nb.entry, scanned
                        )));
                    }
                }
            }
        }
        Ok(())
    }

    fn slot_of(&self, name: &str) -> Result<usize, ColortigError> {
        self.name_index.get(name).copied().ok_or_else(|| {
            ColortigError::InvariantViolation(format!("unknown segment name '{}'", name))
        })
    }
}

fn push_unique(list: &mut NeighborList, nb: Neighbor) {
    if !list.iter().any(|existing| *existing == nb) {
        list.push(nb);
    }
}
