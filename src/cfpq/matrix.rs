//! Matrix-fixed-point CFPQ: one boolean adjacency matrix per nonterminal, saturated
//! by repeated application of the binary productions until no matrix gains a nonzero
//! entry.
use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::cfg::{Cfg, WcnfView};
use crate::graph::{Graph, NodeId};
use crate::matrix::BoolMatrix;
use crate::symbol::Symbol;

/// Same contract as [`crate::cfpq::hellings::closure`], computed via per-nonterminal
/// matrix saturation instead of a worklist. `wcnf` must already be normalized.
pub fn closure(wcnf: &Cfg, graph: &Graph) -> BTreeSet<(Symbol, NodeId, NodeId)> {
    let view = WcnfView::new(wcnf);
    let n = graph.node_count();

    let mut adj: BTreeMap<Symbol, BoolMatrix> = wcnf
        .nonterminals
        .iter()
        .map(|&nt| (nt, BoolMatrix::new(n, n)))
        .collect();

    let mut by_terminal: HashMap<Symbol, Vec<Symbol>> = HashMap::new();
    for (&head, terms) in &view.terminal {
        for &t in terms {
            by_terminal.entry(t).or_default().push(head);
        }
    }
    for (from, label, to) in graph.edges() {
        if let Some(heads) = by_terminal.get(&label) {
            for &head in heads {
                adj.get_mut(&head).unwrap().set(from.0, to.0);
            }
        }
    }

    let identity = BoolMatrix::identity(n);
    for &head in &view.nullable {
        adj.get_mut(&head).unwrap().or_assign(&identity);
    }

    let mut rounds = 0usize;
    loop {
        let mut changed = false;
        for (&head, bodies) in &view.binary {
            for &(b, c) in bodies {
                let product = adj[&b].matmul(&adj[&c]);
                let before = adj[&head].nnz();
                adj.get_mut(&head).unwrap().or_assign(&product);
                changed |= adj[&head].nnz() != before;
            }
        }
        rounds += 1;
        if !changed {
            break;
        }
    }

    let mut result = BTreeSet::new();
    for (&head, m) in &adj {
        for (i, j) in m.nonzero() {
            result.insert((head, NodeId(i), NodeId(j)));
        }
    }
    log::debug!(
        "matrix fixed point reached after {rounds} rounds, {} triples derived",
        result.len()
    );
    result
}
