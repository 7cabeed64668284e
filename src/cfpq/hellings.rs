//! Hellings' worklist algorithm: derive every `(nonterminal, from, to)` triple the
//! grammar certifies over the graph, via pairwise composition against a growing result
//! set.
use std::collections::{BTreeSet, HashMap};

use crate::cfg::{Cfg, WcnfView};
use crate::graph::{Graph, NodeId};
use crate::symbol::Symbol;

/// `(A, u, v)` is in the returned set iff `A` derives some string spelled by a path from
/// `u` to `v` in `graph`. `wcnf` must already be in weak Chomsky Normal Form (the caller
/// normalizes once via `cfg_to_wcnf` and shares it across evaluators).
pub fn closure(wcnf: &Cfg, graph: &Graph) -> BTreeSet<(Symbol, NodeId, NodeId)> {
    let view = WcnfView::new(wcnf);
    let var_prods: Vec<(Symbol, Symbol, Symbol)> = view
        .binary
        .iter()
        .flat_map(|(&head, bodies)| bodies.iter().map(move |&(b, c)| (head, b, c)))
        .collect();

    let mut by_terminal: HashMap<Symbol, Vec<Symbol>> = HashMap::new();
    for (&head, terms) in &view.terminal {
        for &t in terms {
            by_terminal.entry(t).or_default().push(head);
        }
    }

    let mut result: BTreeSet<(Symbol, NodeId, NodeId)> = BTreeSet::new();
    let mut worklist: Vec<(Symbol, NodeId, NodeId)> = Vec::new();

    for (from, label, to) in graph.edges() {
        if let Some(heads) = by_terminal.get(&label) {
            for &head in heads {
                let triple = (head, from, to);
                if result.insert(triple) {
                    worklist.push(triple);
                }
            }
        }
    }
    for i in 0..graph.node_count() {
        for &head in &view.nullable {
            let triple = (head, NodeId(i), NodeId(i));
            if result.insert(triple) {
                worklist.push(triple);
            }
        }
    }

    // For every new `(B, u, v)` popped, look for compositions on both endpoints against
    // `A -> C B` (this triple extends something ending at `u`) and `A -> B C` (this
    // triple extends something starting at `v`). Scanning a snapshot of `result` rather
    // than the live set (as the original worklist loop does) still reaches the same
    // fixed point: anything the live-mutation variant would catch early, this pops and
    // processes on its own later turn.
    let mut popped = 0usize;
    while let Some((b_head, u, v)) = worklist.pop() {
        popped += 1;
        let snapshot: Vec<_> = result.iter().copied().collect();
        for &(r_head, r_from, r_to) in &snapshot {
            if u == r_to {
                for &(head, left, right) in &var_prods {
                    if left == r_head && right == b_head {
                        let triple = (head, r_from, v);
                        if result.insert(triple) {
                            worklist.push(triple);
                        }
                    }
                }
            }
        }
        for &(r_head, r_from, r_to) in &snapshot {
            if v == r_from {
                for &(head, left, right) in &var_prods {
                    if left == b_head && right == r_head {
                        let triple = (head, u, r_to);
                        if result.insert(triple) {
                            worklist.push(triple);
                        }
                    }
                }
            }
        }
    }

    log::debug!(
        "hellings worklist drained after {popped} pops, {} triples derived",
        result.len()
    );
    result
}
