//! Automaton Boolean-Matrix Form: an NFA represented as a symbol-indexed family of
//! boolean matrices plus start/final state sets and a state-to-index bijection.
//!
//! Generic over the state-label type `S` so the same machinery serves plain automaton
//! states (`usize`), graph nodes (`NodeId`), and RSM box states (`(Symbol, usize)`) alike.

use std::collections::BTreeSet;
use std::hash::Hash;

use indexmap::IndexMap;

use crate::automaton::Nfa;
use crate::matrix::BoolMatrix;
use crate::symbol::Symbol;

/// An NFA in boolean-matrix form: `Abm<S>` pairs a symbol-keyed family of adjacency
/// matrices with a bijection from matrix indices to caller-chosen state labels `S`.
pub struct Abm<S> {
    states: Vec<S>,
    matrices: IndexMap<Symbol, BoolMatrix>,
    start: BTreeSet<usize>,
    finals: BTreeSet<usize>,
}

impl<S: Clone + Eq + Hash> Abm<S> {
    pub fn state_count(&self) -> usize {
        self.states.len()
    }

    pub fn states(&self) -> &[S] {
        &self.states
    }

    pub fn start_indices(&self) -> &BTreeSet<usize> {
        &self.start
    }

    pub fn final_indices(&self) -> &BTreeSet<usize> {
        &self.finals
    }

    pub fn matrix(&self, symbol: Symbol) -> Option<&BoolMatrix> {
        self.matrices.get(&symbol)
    }

    pub fn symbols(&self) -> impl Iterator<Item = Symbol> + '_ {
        self.matrices.keys().copied()
    }

    /// Mutable access to `M[symbol]`, creating a zero matrix on first touch. Used by the
    /// tensor CFPQ evaluator to graft RSM-derived shortcut edges and nullable-nonterminal
    /// self-loops onto a graph ABM after construction.
    pub fn ensure_matrix(&mut self, symbol: Symbol) -> &mut BoolMatrix {
        let n = self.states.len();
        self.matrices
            .entry(symbol)
            .or_insert_with(|| BoolMatrix::new(n, n))
    }

    pub fn or_into(&mut self, symbol: Symbol, other: &BoolMatrix) {
        self.ensure_matrix(symbol).or_assign(other);
    }

    pub fn set_edge(&mut self, symbol: Symbol, from: usize, to: usize) {
        self.ensure_matrix(symbol).set(from, to);
    }

    /// Build an ABM over `Nfa<Symbol>`'s own `0..n` state space.
    pub fn from_nfa(nfa: &Nfa<Symbol>) -> Abm<usize> {
        Abm::from_nfa_labeled(nfa, (0..nfa.state_count()).collect())
    }

    /// Build an ABM from an `Nfa<Symbol>`, relabeling its `0..n` states with `states`
    /// (e.g. graph `NodeId`s, or RSM `(nonterminal, substate)` pairs).
    pub fn from_nfa_labeled(nfa: &Nfa<Symbol>, states: Vec<S>) -> Abm<S> {
        assert_eq!(
            states.len(),
            nfa.state_count(),
            "state label count must match the NFA's state count"
        );
        let n = nfa.state_count();
        let mut matrices: IndexMap<Symbol, BoolMatrix> = IndexMap::new();
        for (from, a, to) in nfa.all_edges() {
            matrices
                .entry(a)
                .or_insert_with(|| BoolMatrix::new(n, n))
                .set(from, to);
        }
        Abm {
            states,
            matrices,
            start: nfa.start.clone(),
            finals: nfa.finals.clone(),
        }
    }

    /// `to_nfa(ABM(N))` is language-equivalent to `N`. Reconstructs at
    /// the index level, not back through `S`, since `S` need not be `Symbol`.
    pub fn to_nfa(&self) -> Nfa<Symbol> {
        let n = self.states.len();
        let mut nfa = Nfa::new(n);
        for (&symbol, matrix) in &self.matrices {
            for (i, j) in matrix.nonzero() {
                nfa.add_edge(i, symbol, j);
            }
        }
        nfa.start = self.start.clone();
        nfa.finals = self.finals.clone();
        nfa
    }

    /// Tensor product. Shared-symbol matrices only: absent matrices are the zero
    /// matrix, and `false ∧ anything = false`, so omitting them is equivalent and cheaper.
    pub fn intersect<T: Clone + Eq + Hash>(&self, other: &Abm<T>) -> Abm<(S, T)> {
        let na = self.states.len();
        let nb = other.states.len();

        let mut matrices = IndexMap::new();
        for (symbol, ma) in &self.matrices {
            if let Some(mb) = other.matrices.get(symbol) {
                matrices.insert(*symbol, ma.kron(mb));
            }
        }

        let mut states = Vec::with_capacity(na * nb);
        let mut start = BTreeSet::new();
        let mut finals = BTreeSet::new();
        for i in 0..na {
            for j in 0..nb {
                let idx = i * nb + j;
                states.push((self.states[i].clone(), other.states[j].clone()));
                if self.start.contains(&i) && other.start.contains(&j) {
                    start.insert(idx);
                }
                if self.finals.contains(&i) && other.finals.contains(&j) {
                    finals.insert(idx);
                }
            }
        }

        Abm {
            states,
            matrices,
            start,
            finals,
        }
    }

    /// Transitive closure of the union matrix. Empty ABM (no symbols at all)
    /// returns a 0x0 matrix.
    pub fn transitive_closure(&self) -> BoolMatrix {
        if self.matrices.is_empty() {
            return BoolMatrix::new(0, 0);
        }

        let n = self.states.len();
        let mut closure = BoolMatrix::new(n, n);
        for matrix in self.matrices.values() {
            closure.or_assign(matrix);
        }

        let mut doublings = 0;
        loop {
            let before = closure.nnz();
            let squared = closure.matmul(&closure);
            closure.or_assign(&squared);
            doublings += 1;
            if closure.nnz() == before {
                break;
            }
        }
        log::debug!("transitive closure converged after {doublings} doublings, nnz={}", closure.nnz());
        closure
    }

    /// `self` plays the constraint role, `data` the data/graph role:
    /// `M'[σ] = block_diag(M_data[σ], M_self[σ])`, state space `data` then `self`,
    /// matching the frontier convention in `make_front`/`make_separate_front`.
    pub fn direct_sum<T: Clone + Eq + Hash>(&self, data: &Abm<T>) -> IndexMap<Symbol, BoolMatrix> {
        let mut out = IndexMap::new();
        for (symbol, constraint_m) in &self.matrices {
            if let Some(data_m) = data.matrices.get(symbol) {
                out.insert(*symbol, data_m.block_diag(constraint_m));
            }
        }
        out
    }

    /// Merged frontier: `self` is the constraint side (size `n`), `data` the data
    /// side (size `k`). Shape `k × (n + k)`.
    pub fn make_front<T: Clone + Eq + Hash>(&self, data: &Abm<T>) -> BoolMatrix {
        let n = self.states.len();
        let k = data.states.len();
        let mut front = BoolMatrix::new(k, n + k);
        for i in 0..k {
            front.set(i, i);
            for &s in &self.start {
                front.set(i, k + s);
            }
        }
        front
    }

    /// Separate frontier: one block per element of `data.start` (the per-source split
    /// tracks graph sources, not constraint states), each block restricted to the single
    /// row of its own source rather than every data row, as `make_front` gives. Empty
    /// `data.start` yields the `(k, n+k)` zero matrix.
    pub fn make_separate_front<T: Clone + Eq + Hash>(&self, data: &Abm<T>) -> BoolMatrix {
        let n = self.states.len();
        let k = data.states.len();
        if data.start.is_empty() {
            return BoolMatrix::new(k, n + k);
        }

        let sources: Vec<usize> = data.start.iter().copied().collect();
        let mut front = BoolMatrix::new(k * sources.len(), n + k);
        for (block, &src) in sources.iter().enumerate() {
            let row = block * k + src;
            front.set(row, src);
            for &s in &self.start {
                front.set(row, k + s);
            }
        }
        front
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn single_edge_abm(from: usize, symbol: Symbol, to: usize, n: usize) -> Abm<usize> {
        let mut nfa = Nfa::new(n);
        nfa.add_edge(from, symbol, to);
        nfa.start.insert(from);
        nfa.finals.insert(to);
        Abm::from_nfa(&nfa)
    }

    fn fresh_symbols(table: &mut crate::symbol::SymbolTable, names: &[&str]) -> Vec<Symbol> {
        names.iter().map(|n| table.intern(n)).collect()
    }

    #[test]
    fn round_trip_matches_invariant_1() {
        let mut table = crate::symbol::SymbolTable::new();
        let [a] = <[Symbol; 1]>::try_from(fresh_symbols(&mut table, &["a"])).unwrap();

        let mut nfa = Nfa::new(2);
        nfa.add_edge(0, a, 1);
        nfa.start.insert(0);
        nfa.finals.insert(1);

        let abm = Abm::from_nfa(&nfa);
        let back = abm.to_nfa();
        assert_eq!(back.state_count(), nfa.state_count());
        assert_eq!(back.start, nfa.start);
        assert_eq!(back.finals, nfa.finals);
        assert_eq!(
            back.all_edges().collect::<Vec<_>>(),
            nfa.all_edges().collect::<Vec<_>>()
        );
    }

    #[test]
    fn intersect_builds_product_states() {
        let mut table = crate::symbol::SymbolTable::new();
        let [a] = <[Symbol; 1]>::try_from(fresh_symbols(&mut table, &["a"])).unwrap();

        let left = single_edge_abm(0, a, 1, 2);
        let right = single_edge_abm(0, a, 1, 2);
        let product = left.intersect(&right);
        assert_eq!(product.state_count(), 4);
        assert!(product.start_indices().contains(&0)); // (0,0)
        assert!(product.final_indices().contains(&3)); // (1,1) -> 1*2+1
    }

    #[test]
    fn transitive_closure_of_empty_abm_is_0x0() {
        let abm: Abm<usize> = Abm::from_nfa(&Nfa::new(0));
        assert_eq!(abm.transitive_closure().shape(), (0, 0));
    }

    #[test]
    fn make_front_has_identity_left_block_and_start_indicator() {
        let mut table = crate::symbol::SymbolTable::new();
        let [a] = <[Symbol; 1]>::try_from(fresh_symbols(&mut table, &["a"])).unwrap();

        let constraint = single_edge_abm(0, a, 1, 2); // n = 2, start = {0}
        let data = single_edge_abm(0, a, 1, 3); // k = 3

        let front = constraint.make_front(&data);
        assert_eq!(front.shape(), (3, 5));
        for i in 0..3 {
            assert!(front.get(i, i));
            assert!(front.get(i, 3)); // constraint start 0 -> column k+0
            assert!(!front.get(i, 4));
        }
    }

    #[test]
    fn make_separate_front_is_per_source_restricted() {
        let mut table = crate::symbol::SymbolTable::new();
        let [a] = <[Symbol; 1]>::try_from(fresh_symbols(&mut table, &["a"])).unwrap();

        // constraint (n = 2) has a single start state; data (k = 3) has two: the
        // per-source split below must follow data's starts, not constraint's.
        let constraint = single_edge_abm(0, a, 1, 2);

        let mut data_nfa = Nfa::new(3);
        data_nfa.add_edge(0, a, 1);
        data_nfa.start.insert(0);
        data_nfa.start.insert(1);
        data_nfa.finals.insert(1);
        let data: Abm<usize> = Abm::from_nfa(&data_nfa);

        let front = constraint.make_separate_front(&data);
        assert_eq!(front.shape(), (6, 5)); // 2 sources * k=3 rows
        // block 0 (source 0): row 0 only, identity at col 0 and constraint start at col 3
        assert!(front.get(0, 0));
        assert!(front.get(0, 3));
        assert!(!front.get(1, 0) && !front.get(2, 0));
        // block 1 (source 1): row 3+1=4 only
        assert!(front.get(4, 1));
        assert!(front.get(4, 3));
        assert!(!front.get(3, 1) && !front.get(5, 1));
    }

    #[test]
    fn set_edge_creates_matrix_on_first_touch() {
        let mut table = crate::symbol::SymbolTable::new();
        let [a, b] = <[Symbol; 2]>::try_from(fresh_symbols(&mut table, &["a", "b"])).unwrap();

        let mut abm: Abm<usize> = Abm::from_nfa(&{
            let mut nfa = Nfa::new(2);
            nfa.add_edge(0, a, 1);
            nfa
        });
        assert!(abm.matrix(b).is_none());
        abm.set_edge(b, 1, 0);
        assert!(abm.matrix(b).unwrap().get(1, 0));
    }

    #[test]
    fn make_separate_front_with_no_starts_is_zero_shaped() {
        let mut table = crate::symbol::SymbolTable::new();
        let [a] = <[Symbol; 1]>::try_from(fresh_symbols(&mut table, &["a"])).unwrap();

        let constraint = single_edge_abm(0, a, 1, 2);
        let mut data_nfa = Nfa::new(3);
        data_nfa.add_edge(0, a, 1);
        let data: Abm<usize> = Abm::from_nfa(&data_nfa); // no start states marked

        let front = constraint.make_separate_front(&data);
        assert_eq!(front.shape(), (3, 5));
        assert_eq!(front.nnz(), 0);
    }
}
