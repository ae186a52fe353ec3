use crate::types::{ColortigError, UnitigId};
use fxhash::FxHashSet;
use std::io::Write;

/// Greedy set-cover bookkeeping over the unitig universe. The active DFS walk
/// maintains `current_path`; a successful traceback offers the path via
/// `unify()`, which commits it only when it contributes enough ids not yet
/// covered by an earlier contig.
#[derive(Debug)]
pub struct SetCover {
    current_path: Vec<UnitigId>,
    covered: FxHashSet<UnitigId>,
    committed: Vec<Vec<UnitigId>>,
    start_nodes: Vec<UnitigId>,
    min_novel: usize,
}

impl SetCover {
    pub fn new(min_novel: usize) -> Self {
        SetCover {
            current_path: Vec::new(),
            covered: FxHashSet::default(),
            committed: Vec::new(),
            start_nodes: Vec::new(),
            min_novel: min_novel.max(1),
        }
    }

    pub fn add(&mut self, id: UnitigId) {
        self.current_path.push(id);
    }

    /// Pop one id from the current path; called when the DFS returns.
    pub fn del(&mut self) -> Option<UnitigId> {
        self.current_path.pop()
    }

    /// Empty the current path; called when a start node is finalized.
    pub fn clear(&mut self) {
        self.current_path.clear();
    }

    /// Offer the current path. Commits (and returns true) iff it covers at
    /// least `min_novel` previously uncovered ids; a rejected path must be
    /// discarded from the caller's traceback bundle.
    pub fn unify(&mut self) -> bool {
        let novel = self
            .current_path
            .iter()
            .filter(|id| !self.covered.contains(id))
            .count();
        if novel < self.min_novel {
            log::trace!(
                "setcover rejected path of {} ids ({} novel)",
                self.current_path.len(),
                novel
            );
            return false;
        }
        self.covered.extend(self.current_path.iter().copied());
        self.committed.push(self.current_path.clone());
        true
    }

    pub fn add_start_node(&mut self, id: UnitigId) {
        self.start_nodes.push(id);
    }

    pub fn covered(&self) -> &FxHashSet<UnitigId> {
        &self.covered
    }

    pub fn committed(&self) -> &[Vec<UnitigId>] {
        &self.committed
    }

    pub fn start_nodes(&self) -> &[UnitigId] {
        &self.start_nodes
    }

    /// Summary of start nodes and committed per-contig id lists.
    pub fn write_csv<W: Write>(&self, out: &mut W) -> Result<(), ColortigError> {
        writeln!(out, "record,id,unitigs").map_err(ColortigError::OutputUnavailable)?;
        for id in &self.start_nodes {
            writeln!(out, "start,{},", id).map_err(ColortigError::OutputUnavailable)?;
        }
        for (n, path) in self.committed.iter().enumerate() {
            let ids = path
                .iter()
                .map(|id| id.to_string())
                .collect::<Vec<_>>()
                .join(";");
            writeln!(out, "contig,{},{}", n + 1, ids).map_err(ColortigError::OutputUnavailable)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unify_commits_novel_paths() {
        let mut sc = SetCover::new(1);
        sc.add(1);
        sc.add(2);
        sc.add(3);
        assert!(sc.unify());
        sc.clear();

        // overlapping path with one novel id still commits
        sc.add(1);
        sc.add(2);
        sc.add(4);
        assert!(sc.unify());
        sc.clear();

        // a fully covered path is rejected
        sc.add(2);
        sc.add(3);
        assert!(!sc.unify());
        sc.clear();

        assert_eq!(sc.committed().len(), 2);
        let covered: Vec<UnitigId> = {
            let mut v: Vec<_> = sc.covered().iter().copied().collect();
            v.sort();
            v
        };
        assert_eq!(covered, vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_higher_floor() {
        let mut sc = SetCover::new(2);
        sc.add(1);
        sc.add(2);
        assert!(sc.unify());
        sc.clear();
        // one novel id is below the floor
        sc.add(2);
        sc.add(3);
        assert!(!sc.unify());
        sc.clear();
        assert!(!sc.covered().contains(&3));
    }

    #[test]
    fn test_stack_discipline() {
        let mut sc = SetCover::new(1);
        sc.add(7);
        sc.add(8);
        assert_eq!(sc.del(), Some(8));
        sc.clear();
        assert_eq!(sc.del(), None);
    }

    #[test]
    fn test_write_csv() {
        let mut sc = SetCover::new(1);
        sc.add(1);
        sc.add(2);
        assert!(sc.unify());
        sc.clear();
        sc.add_start_node(1);

        let mut buf = Vec::new();
        sc.write_csv(&mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(text, "record,id,unitigs\nstart,1,\ncontig,1,1;2\n");
    }
}
