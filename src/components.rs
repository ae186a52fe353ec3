use crate::graph::Ccdbg;
use crate::types::ColortigError;
use disjoint::DisjointSet;

/// Union-find over unitig ids for weakly-connected component discovery.
/// Both neighbor sides are joined because the undirected adjacency may be
/// represented asymmetrically across strands (two unitigs facing each other
/// each list the link once). Leaves traversal state untouched.
pub fn connected_components(graph: &Ccdbg) -> Result<DisjointSet, ColortigError> {
    if !graph.is_id_init() {
        return Err(ColortigError::NotInitialized);
    }
    // ids start at 1, so the table is one bigger than the graph
    let mut uf = DisjointSet::with_len(graph.len() + 1);
    for unitig in graph.iter() {
        for nb in &unitig.predecessors {
            uf.join(unitig.id, nb.id);
        }
        for nb in &unitig.successors {
            uf.join(unitig.id, nb.id);
        }
    }
    Ok(uf)
}

/// Number of distinct union-find roots over the unitig ids.
pub fn count_components(uf: &DisjointSet) -> usize {
    let mut representatives: Vec<usize> = Vec::new();
    // slot 0 is padding for the 1-based ids and never joined
    for id in 1..uf.len() {
        if !representatives.iter().any(|&rep| uf.is_joined(rep, id)) {
            representatives.push(id);
        }
    }
    representatives.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::colors::ColorSet;

    fn two_component_graph() -> Ccdbg {
        let mut g = Ccdbg::new(3, 1);
        for (name, seq) in [("u1", "AAACC"), ("u2", "CCGG"), ("u3", "GGTT"), ("u4", "TTTAA")] {
            g.add_segment(name, seq).unwrap();
            g.set_colors(name, true, ColorSet::from_ids(1, &[0]), ColorSet::from_ids(1, &[0]))
                .unwrap();
        }
        g.add_link("u1", true, "u2", true).unwrap();
        g.add_link("u2", true, "u3", true).unwrap();
        g.assign_ids();
        g
    }

    #[test]
    fn test_count_components() {
        let g = two_component_graph();
        let uf = connected_components(&g).unwrap();
        assert_eq!(count_components(&uf), 2);
        assert!(uf.is_joined(1, 3));
        assert!(!uf.is_joined(1, 4));
    }

    #[test]
    fn test_components_invariant_under_rerun() {
        let g = two_component_graph();
        let first = connected_components(&g).unwrap();
        let second = connected_components(&g).unwrap();
        assert_eq!(count_components(&first), count_components(&second));
    }

    #[test]
    fn test_requires_ids() {
        let mut g = Ccdbg::new(3, 1);
        g.add_segment("u1", "AAACC").unwrap();
        assert!(matches!(
            connected_components(&g),
            Err(ColortigError::NotInitialized)
        ));
    }
}
