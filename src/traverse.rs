use crate::colors::ColorSet;
use crate::graph::{Ccdbg, Neighbor};
use crate::sequence::oriented_sequence;
use crate::setcover::SetCover;
use crate::state::NodeStates;
use crate::traceback::Traceback;
use crate::types::{ColortigError, Direction, UnitigId};
use std::io::Write;

/// Directed depth-first traversal over the strand-agnostic graph. The engine
/// owns every piece of mutable traversal state (node marks, set-cover
/// bookkeeping, the per-walk path budget); the graph itself is never touched.
pub struct DfsEngine<'a> {
    graph: &'a Ccdbg,
    states: NodeStates,
    setcover: SetCover,
    /// Successful tracebacks in the current walk.
    priority: u32,
    /// Path budget of the current outer-loop pass.
    limit: u32,
}

impl<'a> DfsEngine<'a> {
    pub fn new(graph: &'a Ccdbg, min_novel: usize) -> Self {
        DfsEngine {
            graph,
            states: NodeStates::new(graph.len()),
            setcover: SetCover::new(min_novel),
            priority: 0,
            limit: 0,
        }
    }

    pub fn setcover(&self) -> &SetCover {
        &self.setcover
    }

    pub fn states(&self) -> &NodeStates {
        &self.states
    }

    /// The outer merge loop: run the budget from `max_paths` down to 1 so the
    /// first pass can emit alternative paths per start node and later passes
    /// pick up components that earlier visited marks had blocked. Seen marks
    /// are cleaned after every start-node attempt; visited marks persist.
    pub fn merge<W: Write>(
        &mut self,
        out: &mut W,
        max_paths: u32,
        min_entropy: f64,
    ) -> Result<usize, ColortigError> {
        if !self.graph.is_id_init() {
            return Err(ColortigError::NotInitialized);
        }
        let mut counter = 0usize;
        for budget in (1..=max_paths).rev() {
            log::debug!("traversal pass with path budget {}", budget);
            for uid in 1..=self.graph.len() {
                let tb = self.dfs_init(uid, budget);
                if tb.success {
                    tb.write(out, self.graph.k, &mut counter, min_entropy)?;
                }
                self.states.clear_seen();
            }
        }
        Ok(counter)
    }

    /// Start a walk from `uid` if it qualifies: singletons are emitted
    /// directly, one-sided nodes pass the Y-stem guard and seed the color
    /// start vector from their entry-end k-mer, everything else is skipped.
    pub fn dfs_init(&mut self, uid: UnitigId, budget: u32) -> Traceback {
        self.limit = budget;
        self.priority = 0;

        let graph = self.graph;
        let unitig = graph.unitig(uid);
        let mut tb = Traceback::default();

        // a start that already produced contigs stays finalized across passes
        if self.states.is_visited(uid, Direction::Forward) {
            log::trace!("skipping {}: visited already", uid);
            return tb;
        }

        let has_pre = !unitig.predecessors.is_empty();
        let has_suc = !unitig.successors.is_empty();

        if !has_pre && !has_suc {
            self.setcover.add(uid);
            if self.setcover.unify() {
                tb.push_path(vec![oriented_sequence(unitig)]);
                tb.success = true;
            }
            self.setcover.clear();
            return tb;
        }
        if has_pre && has_suc {
            // internal node, not a start candidate
            return tb;
        }
        if self.is_y_stem(uid) {
            log::trace!("discarding start {}: stem of a Y subgraph", uid);
            return tb;
        }

        let direction = if has_pre { Direction::Backward } else { Direction::Forward };
        self.states.mark_seen(uid, direction);
        log::trace!("starting at {} ({:?})", uid, direction);

        let mut csv = match direction {
            Direction::Forward => unitig.tail_colors.clone(),
            Direction::Backward => unitig.head_colors.clone(),
        };

        for nb in rank_neighbors(graph, unitig.side(direction), &csv) {
            if self.priority >= self.limit {
                break;
            }
            self.dfs_case(uid, nb, &mut csv, &mut tb);
        }

        self.setcover.clear();

        if tb.success {
            self.states.mark_visited(uid);
            self.setcover.add_start_node(uid);
            log::trace!("finalized start {}", uid);
        }
        tb
    }

    /// Dispatch on the neighbor's orientation relative to the current node.
    /// A neighbor entered from its backward side must be undiscovered in the
    /// forward direction (and vice versa); anything else is a loop or
    /// back-edge and is pruned silently.
    fn dfs_case(
        &mut self,
        current: UnitigId,
        neighbor: Neighbor,
        csv: &mut ColorSet,
        tb: &mut Traceback,
    ) {
        let onward = neighbor.entry.flip();
        if !self.states.is_undiscovered(neighbor.id, onward) {
            log::trace!("seen {} before, going back without traceback", neighbor.id);
            return;
        }

        self.setcover.add(current);
        let returned = self.dfs_visit(neighbor.id, csv, neighbor.entry);
        if returned.success {
            let mut returned = returned;
            returned.push_to_all(&oriented_sequence(self.graph.unitig(current)));
            tb.success = true;
            tb.join(returned);
        }
        self.setcover.del();
    }

    /// Visit `uid`, entered such that going back toward the source means
    /// walking `src_direction`. Intersects the color start vector, prunes on
    /// emptiness, triggers a traceback at sinks, and otherwise recurses into
    /// the ranked far-side neighbors.
    fn dfs_visit(&mut self, uid: UnitigId, csv: &mut ColorSet, src_direction: Direction) -> Traceback {
        let graph = self.graph;
        let unitig = graph.unitig(uid);
        let mut tb = Traceback::default();

        let traversal_direction = src_direction.flip();
        csv.intersect_with(&unitig.head_colors);
        csv.intersect_with(&unitig.tail_colors);
        self.states.mark_seen(uid, traversal_direction);

        if csv.is_empty() {
            log::trace!("{} fails the color criterion, stopping here", uid);
            return tb;
        }

        let side = unitig.side(traversal_direction);
        if side.is_empty() {
            // visited check avoids re-reporting the reverse-complement path
            if !self.states.is_visited(uid, traversal_direction) {
                log::trace!("traceback from sink {}", uid);
                self.setcover.add(uid);
                if self.setcover.unify() {
                    tb.push_path(vec![oriented_sequence(unitig)]);
                    tb.success = true;
                    self.priority += 1;
                }
                self.setcover.del();
            }
            return tb;
        }

        for nb in rank_neighbors(graph, side, csv) {
            if self.priority >= self.limit {
                break;
            }
            self.dfs_case(uid, nb, csv, &mut tb);
        }
        tb
    }

    /// A start candidate whose sole-side neighbors all have total degree 1 is
    /// the stem of a Y: starting there would finalize the stem and strand one
    /// of the arms. Checked at start selection only.
    fn is_y_stem(&self, uid: UnitigId) -> bool {
        let unitig = self.graph.unitig(uid);
        let side = if !unitig.predecessors.is_empty() {
            &unitig.predecessors
        } else {
            &unitig.successors
        };
        side.iter().all(|nb| self.graph.degree(nb.id) == 1)
    }
}

/// Score each neighbor by how well its end colors agree with the live color
/// support and return the survivors in descending order, ties broken by
/// ascending id. Rate-0 neighbors are dropped entirely.
fn rank_neighbors(graph: &Ccdbg, side: &[Neighbor], reference: &ColorSet) -> Vec<Neighbor> {
    let mut ranked: Vec<(f64, Neighbor)> = side
        .iter()
        .filter_map(|nb| {
            let neighbor = graph.unitig(nb.id);
            let rate = reference.equal_bit_rate(&neighbor.head_colors, &neighbor.tail_colors);
            (rate > 0.0).then_some((rate, *nb))
        })
        .collect();
    ranked.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap().then(a.1.id.cmp(&b.1.id)));
    ranked.into_iter().map(|(_, nb)| nb).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::colors::ColorSet;
    use crate::state::Mark;

    fn add_unitig(g: &mut Ccdbg, name: &str, seq: &str, colors: &[usize]) {
        let c = g.num_colors;
        g.add_segment(name, seq).unwrap();
        g.set_colors(
            name,
            true,
            ColorSet::from_ids(c, colors),
            ColorSet::from_ids(c, colors),
        )
        .unwrap();
    }

    fn run_merge(graph: &Ccdbg, max_paths: u32) -> (String, DfsEngine<'_>) {
        let mut engine = DfsEngine::new(graph, 1);
        let mut buf = Vec::new();
        engine.merge(&mut buf, max_paths, 0.0).unwrap();
        (String::from_utf8(buf).unwrap(), engine)
    }

    fn records(fasta: &str) -> Vec<&str> {
        fasta.lines().filter(|l| !l.starts_with('>')).collect()
    }

    #[test]
    fn test_requires_ids() {
        let mut g = Ccdbg::new(3, 1);
        add_unitig(&mut g, "u1", "AAACC", &[0]);
        let mut engine = DfsEngine::new(&g, 1);
        let mut buf = Vec::new();
        assert!(matches!(
            engine.merge(&mut buf, 1, 0.0),
            Err(ColortigError::NotInitialized)
        ));
    }

    #[test]
    fn test_singleton_emitted_exactly_once() {
        let mut g = Ccdbg::new(5, 1);
        add_unitig(&mut g, "u1", "ACGTACGTAC", &[0]);
        g.assign_ids();

        let (fasta, _) = run_merge(&g, 3);
        // three passes, but set cover rejects the re-offers
        assert_eq!(fasta, ">contig_1\nACGTACGTAC\n");
    }

    #[test]
    fn test_linear_chain() {
        let mut g = Ccdbg::new(3, 1);
        add_unitig(&mut g, "u1", "AAACC", &[0]);
        add_unitig(&mut g, "u2", "CCGG", &[0]);
        add_unitig(&mut g, "u3", "GGTT", &[0]);
        g.add_link("u1", true, "u2", true).unwrap();
        g.add_link("u2", true, "u3", true).unwrap();
        g.assign_ids();

        let (fasta, engine) = run_merge(&g, 1);
        assert_eq!(fasta, ">contig_1\nAAACCGGTT\n");

        let mut covered: Vec<_> = engine.setcover().covered().iter().copied().collect();
        covered.sort();
        assert_eq!(covered, vec![1, 2, 3]);
        assert_eq!(engine.setcover().start_nodes(), &[1]);

        // the start is finalized in both directions, interior marks cleaned
        assert!(engine.states().is_visited(1, Direction::Forward));
        assert!(engine.states().is_visited(1, Direction::Backward));
        assert_eq!(engine.states().get(2, Direction::Forward), Mark::Undiscovered);
        assert_eq!(engine.states().get(3, Direction::Forward), Mark::Undiscovered);
    }

    #[test]
    fn test_dfs_init_paths_are_sink_first() {
        let mut g = Ccdbg::new(3, 1);
        add_unitig(&mut g, "u1", "AAACC", &[0]);
        add_unitig(&mut g, "u2", "CCGG", &[0]);
        add_unitig(&mut g, "u3", "GGTT", &[0]);
        g.add_link("u1", true, "u2", true).unwrap();
        g.add_link("u2", true, "u3", true).unwrap();
        g.assign_ids();

        let mut engine = DfsEngine::new(&g, 1);
        let tb = engine.dfs_init(1, 1);
        assert!(tb.success);
        assert_eq!(tb.len(), 1);
        // the sink's sequence enters the path first, the start's last
        assert_eq!(tb.paths()[0], vec!["GGTT", "CCGG", "AAACC"]);
    }

    #[test]
    fn test_y_split_covers_both_arms() {
        // u0 -> u1 -> {u2, u3}; u0 enters iteration last
        let mut g = Ccdbg::new(3, 2);
        add_unitig(&mut g, "u1", "CCGG", &[0, 1]);
        add_unitig(&mut g, "u2", "GGTT", &[0]);
        add_unitig(&mut g, "u3", "GGAA", &[1]);
        add_unitig(&mut g, "u0", "AAACC", &[0, 1]);
        g.add_link("u0", true, "u1", true).unwrap();
        g.add_link("u1", true, "u2", true).unwrap();
        g.add_link("u1", true, "u3", true).unwrap();
        g.assign_ids();

        let (fasta, engine) = run_merge(&g, 2);
        let seqs = records(&fasta);
        assert_eq!(seqs.len(), 2);

        let mut covered: Vec<_> = engine.setcover().covered().iter().copied().collect();
        covered.sort();
        assert_eq!(covered, vec![1, 2, 3, 4]);

        // the shared stem is committed once; the second path only contributes
        // its private arm
        let committed = engine.setcover().committed();
        assert_eq!(committed.len(), 2);
        assert!(committed[0].contains(&1));
        let novel_in_second: Vec<_> = committed[1]
            .iter()
            .filter(|id| !committed[0].contains(id))
            .collect();
        assert_eq!(novel_in_second.len(), 1);
    }

    #[test]
    fn test_color_steering_picks_consistent_branch() {
        // u1{0,1} -> u2{0} -> u3{1} | u4{0}: the walk carries {0} past u2 and
        // never enters u3
        let mut g = Ccdbg::new(3, 2);
        add_unitig(&mut g, "u1", "AAACC", &[0, 1]);
        add_unitig(&mut g, "u2", "CCGG", &[0]);
        add_unitig(&mut g, "u3", "GGTT", &[1]);
        add_unitig(&mut g, "u4", "GGAA", &[0]);
        g.add_link("u1", true, "u2", true).unwrap();
        g.add_link("u2", true, "u3", true).unwrap();
        g.add_link("u2", true, "u4", true).unwrap();
        g.assign_ids();

        let (fasta, engine) = run_merge(&g, 2);
        assert_eq!(records(&fasta), vec!["AAACCGGAA"]);

        let mut covered: Vec<_> = engine.setcover().covered().iter().copied().collect();
        covered.sort();
        assert_eq!(covered, vec![1, 2, 4]);
        // the discordant branch was never even entered
        assert_eq!(engine.states().get(3, Direction::Forward), Mark::Undiscovered);
        assert_eq!(engine.states().get(3, Direction::Backward), Mark::Undiscovered);
    }

    #[test]
    fn test_colorless_node_empties_csv() {
        let mut g = Ccdbg::new(3, 2);
        add_unitig(&mut g, "u1", "AAACC", &[0]);
        add_unitig(&mut g, "u2", "CCGG", &[]);
        add_unitig(&mut g, "u3", "GGTT", &[0]);
        g.add_link("u1", true, "u2", true).unwrap();
        g.add_link("u2", true, "u3", true).unwrap();
        g.assign_ids();

        let (fasta, engine) = run_merge(&g, 1);
        // the blank node ranks above zero but kills the color support
        assert!(fasta.is_empty());
        assert!(engine.setcover().covered().is_empty());
    }

    #[test]
    fn test_pure_cycle_emits_nothing() {
        let mut g = Ccdbg::new(3, 1);
        add_unitig(&mut g, "u1", "AACC", &[0]);
        add_unitig(&mut g, "u2", "CCGG", &[0]);
        add_unitig(&mut g, "u3", "GGAA", &[0]);
        g.add_link("u1", true, "u2", true).unwrap();
        g.add_link("u2", true, "u3", true).unwrap();
        g.add_link("u3", true, "u1", true).unwrap();
        g.assign_ids();

        let (fasta, _) = run_merge(&g, 2);
        assert!(fasta.is_empty());
    }

    #[test]
    fn test_y_stem_guard() {
        // arms a1, a2 feed stem s; s must not start, the arms must
        let mut g = Ccdbg::new(3, 1);
        add_unitig(&mut g, "a1", "AAACC", &[0]);
        add_unitig(&mut g, "a2", "TTTCC", &[0]);
        add_unitig(&mut g, "s", "CCGG", &[0]);
        g.add_link("a1", true, "s", true).unwrap();
        g.add_link("a2", true, "s", true).unwrap();
        g.assign_ids();

        let (fasta, engine) = run_merge(&g, 1);
        let seqs = records(&fasta);
        assert_eq!(seqs, vec!["AAACCGG", "TTTCCGG"]);
        assert_eq!(engine.setcover().start_nodes(), &[1, 2]);
        // the stem itself never served as a start
        assert!(!engine.states().is_visited(3, Direction::Forward));
    }

    #[test]
    fn test_reverse_strand_unitig() {
        let mut g = Ccdbg::new(4, 1);
        add_unitig(&mut g, "u1", "AAAGGG", &[0]);
        g.add_segment("u2", "CCCTTT").unwrap();
        g.set_colors("u2", false, ColorSet::from_ids(1, &[0]), ColorSet::from_ids(1, &[0]))
            .unwrap();
        g.add_link("u1", true, "u2", true).unwrap();
        g.assign_ids();

        let (fasta, _) = run_merge(&g, 1);
        let seqs = records(&fasta);
        assert_eq!(seqs.len(), 1);
        assert!(seqs[0].starts_with("AAAGGG"));
        assert!(!seqs[0].contains("CCCTTT"));
    }

    #[test]
    fn test_two_components() {
        let mut g = Ccdbg::new(3, 1);
        add_unitig(&mut g, "u1", "AAACC", &[0]);
        add_unitig(&mut g, "u2", "CCGG", &[0]);
        add_unitig(&mut g, "u3", "TTTGG", &[0]);
        add_unitig(&mut g, "u4", "GGAA", &[0]);
        g.add_link("u1", true, "u2", true).unwrap();
        g.add_link("u3", true, "u4", true).unwrap();
        g.assign_ids();

        let uf = crate::components::connected_components(&g).unwrap();
        assert_eq!(crate::components::count_components(&uf), 2);

        let (fasta, engine) = run_merge(&g, 1);
        assert_eq!(records(&fasta).len(), 2);
        let mut covered: Vec<_> = engine.setcover().covered().iter().copied().collect();
        covered.sort();
        assert_eq!(covered, vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_merge_is_deterministic() {
        let mut g = Ccdbg::new(3, 2);
        add_unitig(&mut g, "u1", "CCGG", &[0, 1]);
        add_unitig(&mut g, "u2", "GGTT", &[0]);
        add_unitig(&mut g, "u3", "GGAA", &[1]);
        add_unitig(&mut g, "u0", "AAACC", &[0, 1]);
        g.add_link("u0", true, "u1", true).unwrap();
        g.add_link("u1", true, "u2", true).unwrap();
        g.add_link("u1", true, "u3", true).unwrap();
        g.assign_ids();

        let (first, _) = run_merge(&g, 2);
        let (second, _) = run_merge(&g, 2);
        assert_eq!(first, second);
    }

    #[test]
    fn test_rank_neighbors_order() {
        let mut g = Ccdbg::new(3, 2);
        add_unitig(&mut g, "hub", "AAACC", &[0, 1]);
        add_unitig(&mut g, "best", "CCGG", &[0, 1]);
        add_unitig(&mut g, "tied_a", "CCTT", &[0]);
        add_unitig(&mut g, "tied_b", "CCAA", &[0]);
        add_unitig(&mut g, "zero", "CCCG", &[]);
        g.add_link("hub", true, "best", true).unwrap();
        g.add_link("hub", true, "tied_a", true).unwrap();
        g.add_link("hub", true, "tied_b", true).unwrap();
        g.add_link("hub", true, "zero", true).unwrap();
        g.assign_ids();

        let reference = ColorSet::from_ids(2, &[0, 1]);
        let ranked = rank_neighbors(&g, &g.unitig(1).successors, &reference);
        let ids: Vec<UnitigId> = ranked.iter().map(|nb| nb.id).collect();
        // best (rate 1.0) first, then the tied pair by ascending id; the
        // all-blank neighbor scores 0 against an all-set reference and drops
        assert_eq!(ids, vec![2, 3, 4]);
    }
}
