//! Black-box scenarios exercising path-constrained reachability end to end, through the
//! public `rpq`/`cfpq` entry points rather than any internal module. Run with
//! `RUST_LOG=debug cargo test -- --nocapture` to see the fixed-point convergence logging.
use std::collections::BTreeSet;
use std::sync::Once;

use pathlang::cfg::Cfg;
use pathlang::cfpq::{cfpq, CfpqAlgorithm};
use pathlang::graph::{Graph, NodeId};
use pathlang::regex;
use pathlang::rpq::rpq;
use pathlang::symbol::SymbolTable;

static LOGGING: Once = Once::new();

fn init_logging() {
    LOGGING.call_once(|| {
        let _ = env_logger::builder().is_test(true).try_init();
    });
}

/// Edges `(0,R,1),(1,P,2),(2,Q,3),(3,G,4),(4,R,5)`, regex `R P Q`, start `{0}`,
/// final `{3}`. Only path spelling exactly `R P Q` is `0->1->2->3`.
#[test]
fn rpq_linear_chain_reaches_only_the_exact_spelling() {
    init_logging();
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

    let query = regex::parse("R P Q", &mut table).unwrap();
    let start: BTreeSet<NodeId> = [NodeId(0)].into_iter().collect();
    let finals: BTreeSet<NodeId> = [NodeId(3)].into_iter().collect();

    let result = rpq(&query, &graph, Some(&start), Some(&finals)).unwrap();
    assert_eq!(result, [(NodeId(0), NodeId(3))].into_iter().collect());
}

#[test]
fn rpq_empty_regex_never_reaches_anything() {
    init_logging();
    let mut table = SymbolTable::new();
    let a = table.intern("a");
    let mut graph = Graph::new(0);
    graph.add_edge(NodeId(0), a, NodeId(1));

    let query = regex::parse("", &mut table).unwrap();
    let result = rpq(&query, &graph, None, None).unwrap();
    assert!(result.is_empty());
}

fn anbn_fixture() -> (Cfg, Graph, SymbolTable) {
    let mut table = SymbolTable::new();
    let cfg = Cfg::parse("S -> A B | A C\nC -> S B\nA -> a\nB -> b", &mut table).unwrap();
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
fn cfpq_anbn_like_grammar_unfiltered_reachability() {
    init_logging();
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
    let expected: BTreeSet<(NodeId, NodeId)> = [(1, 2), (0, 3), (2, 3), (0, 2), (2, 2), (1, 3)]
        .into_iter()
        .map(|(u, v)| (NodeId(u), NodeId(v)))
        .collect();
    assert_eq!(result, expected);
}

#[test]
fn cfpq_anbn_like_grammar_filtered_by_source_and_target() {
    init_logging();
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
    let expected: BTreeSet<(NodeId, NodeId)> =
        [(NodeId(0), NodeId(3)), (NodeId(2), NodeId(3))].into_iter().collect();
    assert_eq!(result, expected);
}

#[test]
fn cfpq_hellings_matrix_and_tensor_agree_on_a_shared_grammar_and_graph() {
    init_logging();
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

/// Edges `(0,a,1),(0,b,3),(3,b,0),(1,b,2),(2,a,0)`, regex `b* a b`, sources `{0,1}`,
/// target `{2}`. Per-source BFS tags each reachable target with the graph source it
/// came from, keeping the two sources' contributions distinct.
#[test]
fn constrained_bfs_per_source_reachability_stays_separated() {
    init_logging();
    use pathlang::abm::Abm;
    use pathlang::automaton::Nfa;
    use pathlang::bfs::{constraint_bfs, BfsResult};

    let mut table = SymbolTable::new();
    let a = table.intern("a");
    let b = table.intern("b");

    let mut graph = Nfa::<pathlang::symbol::Symbol>::new(4);
    graph.add_edge(0, a, 1);
    graph.add_edge(0, b, 3);
    graph.add_edge(3, b, 0);
    graph.add_edge(1, b, 2);
    graph.add_edge(2, a, 0);
    graph.start.insert(0);
    graph.start.insert(1);
    graph.finals.insert(2);
    let data: Abm<usize> = Abm::from_nfa(&graph);

    let query = regex::parse("b* a b", &mut table).unwrap();
    let dfa = query.to_epsilon_nfa().to_nfa().determinize().minimize();
    let constraint: Abm<usize> = Abm::from_nfa(&dfa.to_nfa());

    match constraint_bfs(&constraint, &data, true) {
        BfsResult::Separate(pairs) => {
            assert_eq!(pairs, [(0usize, 2usize), (1, 2)].into_iter().collect());
        }
        BfsResult::Merged(_) => panic!("expected separate-mode result"),
    }
}
