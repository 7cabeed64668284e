//! Context-Free Path Query evaluators and their dispatcher: algorithm choice is a tagged
//! variant plus a dispatching function, rather than dynamic dispatch.
pub mod hellings;
pub mod matrix;
pub mod tensor;

use std::collections::BTreeSet;

use crate::cfg::{cfg_to_wcnf, Cfg};
use crate::graph::{Graph, NodeId};
use crate::symbol::{Symbol, SymbolTable};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CfpqAlgorithm {
    Hellings,
    Matrix,
    Tensor,
}

/// Runs `cfg`'s reachability query over `graph` with the chosen algorithm, filtering the
/// raw `(nonterminal, from, to)` closure down to `(from, to)` pairs where the nonterminal
/// is `start_symbol` and both endpoints satisfy the optional start/final restrictions
/// (full node set when `None`, matching `to_nfa`'s `(None, None)` convention).
pub fn cfpq(
    algorithm: CfpqAlgorithm,
    cfg: &Cfg,
    graph: &Graph,
    table: &mut SymbolTable,
    start_symbol: Symbol,
    start_nodes: Option<&BTreeSet<NodeId>>,
    final_nodes: Option<&BTreeSet<NodeId>>,
) -> BTreeSet<(NodeId, NodeId)> {
    let triples = match algorithm {
        CfpqAlgorithm::Hellings => {
            let wcnf = cfg_to_wcnf(cfg, table);
            hellings::closure(&wcnf, graph)
        }
        CfpqAlgorithm::Matrix => {
            let wcnf = cfg_to_wcnf(cfg, table);
            matrix::closure(&wcnf, graph)
        }
        CfpqAlgorithm::Tensor => tensor::closure(cfg, graph),
    };

    let all_nodes: BTreeSet<NodeId> = (0..graph.node_count()).map(NodeId).collect();
    let starts = start_nodes.unwrap_or(&all_nodes);
    let finals = final_nodes.unwrap_or(&all_nodes);

    triples
        .into_iter()
        .filter(|&(head, u, v)| head == start_symbol && starts.contains(&u) && finals.contains(&v))
        .map(|(_, u, v)| (u, v))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    /// S3/S4/S6 from the scenario catalog: the same `a^n b^n` grammar and two-cycle-ish
    /// graph used by each evaluator's own unit tests, now driven through the dispatcher
    /// and checked against both the full (S3) and filtered (S4) expected sets, and for
    /// agreement across all three algorithms (S6).
    fn anbn_fixture() -> (Cfg, Graph, SymbolTable) {
        let mut table = SymbolTable::new();
        let cfg = Cfg::parse(
            "S -> A B | A C\nC -> S B\nA -> a\nB -> b",
            &mut table,
        )
        .unwrap();
        let mut graph = Graph::new(4);
        let a = table.intern("a");
        let b = table.intern("b");
        graph.add_edge(NodeId(0), a, NodeId(1));
        graph.add_edge(NodeId(1), a, NodeId(2));
        graph.add_edge(NodeId(2), a, NodeId(0));
        graph.add_edge(NodeId(2), b, NodeId(3));
        graph.add_edge(NodeId(3), b, NodeId(2));
        (cfg, graph, table)
    }

    #[test]
    fn scenario_s3_unfiltered_anbn_reachability() {
        let (cfg, graph, mut table) = anbn_fixture();
        let start = table.intern("S");
        let result = cfpq(
            CfpqAlgorithm::Hellings,
            &cfg,
            &graph,
            &mut table,
            start,
            None,
            None,
        );
        let expected: BTreeSet<(NodeId, NodeId)> = [
            (1, 2),
            (0, 3),
            (2, 3),
            (0, 2),
            (2, 2),
            (1, 3),
        ]
        .into_iter()
        .map(|(u, v)| (NodeId(u), NodeId(v)))
        .collect();
        assert_eq!(result, expected);
    }

    #[test]
    fn scenario_s4_filtered_anbn_reachability() {
        let (cfg, graph, mut table) = anbn_fixture();
        let start = table.intern("S");
        let starts: BTreeSet<NodeId> = [NodeId(0), NodeId(2)].into_iter().collect();
        let finals: BTreeSet<NodeId> = [NodeId(3)].into_iter().collect();
        let result = cfpq(
            CfpqAlgorithm::Matrix,
            &cfg,
            &graph,
            &mut table,
            start,
            Some(&starts),
            Some(&finals),
        );
        let expected: BTreeSet<(NodeId, NodeId)> = [(NodeId(0), NodeId(3)), (NodeId(2), NodeId(3))]
            .into_iter()
            .collect();
        assert_eq!(result, expected);
    }

    #[test]
    fn scenario_s6_all_three_algorithms_agree() {
        let (cfg, graph, mut table) = anbn_fixture();
        let start = table.intern("S");
        let hellings = cfpq(
            CfpqAlgorithm::Hellings,
            &cfg,
            &graph,
            &mut table,
            start,
            None,
            None,
        );
        let matrix = cfpq(
            CfpqAlgorithm::Matrix,
            &cfg,
            &graph,
            &mut table,
            start,
            None,
            None,
        );
        let tensor = cfpq(
            CfpqAlgorithm::Tensor,
            &cfg,
            &graph,
            &mut table,
            start,
            None,
            None,
        );
        assert_eq!(hellings, matrix);
        assert_eq!(matrix, tensor);
    }
}
