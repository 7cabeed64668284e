//! Regular Path Queries via the tensor method.
use std::collections::BTreeSet;

use crate::error::Result;
use crate::graph::{Graph, NodeId};
use crate::regex::Regex;
use crate::symbol::Symbol;

/// Build graph and regex ABMs, intersect, take the transitive closure, and read
/// node pairs connected by a path in `L(regex)` back off the closure.
///
/// `start_nodes`/`final_nodes` of `None` means "every node" (full-graph reachability),
/// matching `Graph::to_nfa`'s convention.
pub fn rpq(
    regex: &Regex<Symbol>,
    graph: &Graph,
    start_nodes: Option<&BTreeSet<NodeId>>,
    final_nodes: Option<&BTreeSet<NodeId>>,
) -> Result<BTreeSet<(NodeId, NodeId)>> {
    let graph_abm = graph.to_abm(start_nodes, final_nodes)?;
    let regex_dfa = regex.to_epsilon_nfa().to_nfa().determinize().minimize();
    let regex_nfa = regex_dfa.to_nfa();
    let regex_abm = crate::abm::Abm::from_nfa(&regex_nfa);

    let intersection = graph_abm.intersect(&regex_abm);
    let closure = intersection.transitive_closure();

    let mut result = BTreeSet::new();
    for (i, j) in closure.nonzero() {
        if intersection.start_indices().contains(&i) && intersection.final_indices().contains(&j)
        {
            let (from, _) = intersection.states()[i].clone();
            let (to, _) = intersection.states()[j].clone();
            result.insert((from, to));
        }
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbol::SymbolTable;

    /// Scenario S1: edges `(0,R,1),(1,P,2),(2,Q,3),(3,G,4),(4,R,5)`, regex `R P Q`,
    /// start `{0}`, final `{3}`. Expected `{(0,3)}`.
    #[test]
    fn scenario_s1_rpq_linear_chain() {
        let mut table = SymbolTable::new();
        let r = table.intern("R");
        let p = table.intern("P");
        let q = table.intern("Q");
        let g = table.intern("G");

        let mut graph = Graph::new(0);
        graph.add_edge(NodeId(0), r, NodeId(1));
        graph.add_edge(NodeId(1), p, NodeId(2));
        graph.add_edge(NodeId(2), q, NodeId(3));
        graph.add_edge(NodeId(3), g, NodeId(4));
        graph.add_edge(NodeId(4), r, NodeId(5));

        let regex = crate::regex::parse("R P Q", &mut table).unwrap();
        let start: BTreeSet<NodeId> = [NodeId(0)].into_iter().collect();
        let finals: BTreeSet<NodeId> = [NodeId(3)].into_iter().collect();

        let result = rpq(&regex, &graph, Some(&start), Some(&finals)).unwrap();
        assert_eq!(result, [(NodeId(0), NodeId(3))].into_iter().collect());
    }

    /// Scenario S5: empty regex on any graph yields the empty set.
    #[test]
    fn scenario_s5_empty_regex_yields_empty_set() {
        let mut table = SymbolTable::new();
        let a = table.intern("a");
        let mut graph = Graph::new(0);
        graph.add_edge(NodeId(0), a, NodeId(1));

        let regex = crate::regex::parse("", &mut table).unwrap();
        let result = rpq(&regex, &graph, None, None).unwrap();
        assert!(result.is_empty());
    }
}
