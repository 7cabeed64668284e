//! Recursive State Machine: one minimized automaton ("box") per nonterminal, and
//! their merge into a single ABM-ready NFA.
use indexmap::IndexMap;

use crate::automaton::{Dfa, Nfa};
use crate::ecfg::Ecfg;
use crate::symbol::Symbol;

pub struct Rsm {
    pub start: Symbol,
    pub boxes: IndexMap<Symbol, Dfa<Symbol>>,
}

impl Rsm {
    /// `Box[A] := to_ε_NFA(R[A])` followed immediately by minimization, since this
    /// crate's `Regex` pipeline always produces a minimal DFA in one pass; `minimize()`
    /// (kept as a separate step below) is then a no-op over already-minimal boxes, which
    /// matches calling it on an already-minimized RSM harmlessly.
    pub fn from_ecfg(ecfg: &Ecfg) -> Rsm {
        let boxes = ecfg
            .productions
            .iter()
            .map(|(&nt, regex)| {
                let dfa = regex.to_epsilon_nfa().to_nfa().determinize().minimize();
                (nt, dfa)
            })
            .collect();
        Rsm {
            start: ecfg.start,
            boxes,
        }
    }

    /// Re-minimizes every box in place; idempotent since `from_ecfg` already minimizes.
    pub fn minimize(mut self) -> Rsm {
        for dfa in self.boxes.values_mut() {
            *dfa = dfa.minimize();
        }
        self
    }

    /// Produces one ε-free NFA whose states are `(A, q)` arena-indexed states, plus the
    /// `(nonterminal, local substate)` label for each arena index in order: the label
    /// vector feeds `Abm::from_nfa_labeled` directly.
    pub fn merge_boxes_to_nfa(&self) -> (Nfa<Symbol>, Vec<(Symbol, usize)>) {
        let mut base_of: IndexMap<Symbol, usize> = IndexMap::new();
        let mut total = 0;
        for (&nt, dfa) in &self.boxes {
            base_of.insert(nt, total);
            total += dfa.state_count();
        }

        let mut labels = vec![(self.start, 0usize); total];
        let mut nfa = Nfa::new(total);

        for (&nt, dfa) in &self.boxes {
            let base = base_of[&nt];
            for local in 0..dfa.state_count() {
                labels[base + local] = (nt, local);
            }
            for (from, a, to) in dfa.all_edges() {
                nfa.add_edge(base + from, a, base + to);
            }
            if dfa.state_count() > 0 {
                nfa.start.insert(base + dfa.start());
                for local in 0..dfa.state_count() {
                    if dfa.is_final(local) {
                        nfa.finals.insert(base + local);
                    }
                }
            }
        }

        (nfa, labels)
    }
}
