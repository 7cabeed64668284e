//! Tensor/RSM CFPQ: intersect the grammar's merged recursive state machine against
//! the graph, take the transitive closure, and graft every start-to-final RSM shortcut
//! back onto the graph ABM as a new nonterminal-labeled edge, until nothing changes.
//! Operates on the original CFG, not a WCNF normalization: `Ecfg::from_cfg` is defined
//! for any CFG, and nullability is recomputed over the original productions directly.
use std::collections::BTreeSet;

use crate::abm::Abm;
use crate::cfg::{Cfg, CfgSymbol};
use crate::ecfg::Ecfg;
use crate::graph::{Graph, NodeId};
use crate::matrix::BoolMatrix;
use crate::rsm::Rsm;
use crate::symbol::Symbol;

/// Same contract as [`crate::cfpq::hellings::closure`], computed via RSM/graph
/// intersection.
pub fn closure(cfg: &Cfg, graph: &Graph) -> BTreeSet<(Symbol, NodeId, NodeId)> {
    let ecfg = Ecfg::from_cfg(cfg);
    let rsm = Rsm::from_ecfg(&ecfg).minimize();
    let (merged_nfa, labels) = rsm.merge_boxes_to_nfa();
    let rsm_abm: Abm<(Symbol, usize)> = Abm::from_nfa_labeled(&merged_nfa, labels);

    let mut graph_abm = graph
        .to_abm(None, None)
        .expect("full-graph conversion is infallible: no start/final sets to validate");

    let k = graph_abm.state_count();
    let identity = BoolMatrix::identity(k);
    for nt in nullable_symbols(cfg) {
        graph_abm.or_into(nt, &identity);
    }

    let mut previous_nnz = 0usize;
    let mut rounds = 0usize;
    loop {
        let intersection = rsm_abm.intersect(&graph_abm);
        let reached = intersection.transitive_closure();
        let nnz = reached.nnz();
        rounds += 1;
        if nnz == previous_nnz {
            break;
        }
        previous_nnz = nnz;

        for (p, q) in reached.nonzero() {
            let (r_i, g_i) = (p / k, p % k);
            let (r_j, g_j) = (q / k, q % k);
            if rsm_abm.start_indices().contains(&r_i) && rsm_abm.final_indices().contains(&r_j) {
                let (nonterminal, _) = rsm_abm.states()[r_i];
                graph_abm.set_edge(nonterminal, g_i, g_j);
            }
        }
    }
    log::debug!("tensor/RSM shortcut grafting settled after {rounds} rounds");

    let mut result = BTreeSet::new();
    for symbol in graph_abm.symbols() {
        if !cfg.nonterminals.contains(&symbol) {
            continue;
        }
        let m = graph_abm.matrix(symbol).expect("symbol came from graph_abm.symbols()");
        for (i, j) in m.nonzero() {
            result.insert((symbol, NodeId(i), NodeId(j)));
        }
    }
    result
}

/// Standard nullable-symbol fixpoint over the *original* grammar: `A` is nullable if some
/// body of `A` is empty or consists entirely of already-nullable nonterminals.
fn nullable_symbols(cfg: &Cfg) -> BTreeSet<Symbol> {
    let mut nullable = BTreeSet::new();
    loop {
        let mut changed = false;
        for p in &cfg.productions {
            if nullable.contains(&p.head) {
                continue;
            }
            let all_nullable_nonterminals = p.body.iter().all(|s| match s {
                CfgSymbol::Terminal(_) => false,
                CfgSymbol::NonTerminal(nt) => nullable.contains(nt),
            });
            if all_nullable_nonterminals {
                changed |= nullable.insert(p.head);
            }
        }
        if !changed {
            break;
        }
    }
    nullable
}
