//! Plain (non-epsilon) NFA, the epsilon-NFA used as a Thompson-construction target, and
//! deterministic automata with subset construction / minimization.
use std::collections::{BTreeMap, BTreeSet, HashMap, VecDeque};

use crate::Alphabet;

/// An automaton with epsilon transitions, the natural target of Thompson construction.
///
/// Single start state, with `epsilon_reach` computing epsilon-closures; generalized over
/// arbitrary `Alphabet` symbols and exposes the state-building API that
/// `Regex::to_epsilon_nfa` needs.
pub struct EpsilonNfa<A: Alphabet> {
    edges: Vec<Vec<(A, usize)>>,
    epsilons: Vec<Vec<usize>>,
    start: usize,
    finals: BTreeSet<usize>,
}

impl<A: Alphabet> EpsilonNfa<A> {
    pub fn new() -> Self {
        EpsilonNfa {
            edges: Vec::new(),
            epsilons: Vec::new(),
            start: 0,
            finals: BTreeSet::new(),
        }
    }

    pub fn add_state(&mut self) -> usize {
        let id = self.edges.len();
        self.edges.push(Vec::new());
        self.epsilons.push(Vec::new());
        id
    }

    pub fn add_edge(&mut self, from: usize, a: A, to: usize) {
        self.edges[from].push((a, to));
    }

    pub fn add_epsilon(&mut self, from: usize, to: usize) {
        self.epsilons[from].push(to);
    }

    pub fn set_start(&mut self, state: usize) {
        self.start = state;
    }

    pub fn set_final(&mut self, state: usize) {
        self.finals.insert(state);
    }

    /// All states reachable from `start` purely via epsilon transitions (including
    /// `start` itself).
    fn epsilon_reach(&self, start: usize) -> BTreeSet<usize> {
        let mut reached = BTreeSet::new();
        let mut todo = vec![start];
        reached.insert(start);

        while let Some(next) = todo.pop() {
            for &target in &self.epsilons[next] {
                if reached.insert(target) {
                    todo.push(target);
                }
            }
        }
        reached
    }

    /// Eliminate epsilon transitions, producing a plain NFA.
    pub fn to_nfa(&self) -> Nfa<A> {
        let n = self.edges.len();
        let closures: Vec<BTreeSet<usize>> = (0..n).map(|q| self.epsilon_reach(q)).collect();

        let mut nfa = Nfa::new(n);
        for q in 0..n {
            for &q2 in &closures[q] {
                for &(a, t) in &self.edges[q2] {
                    for &t2 in &closures[t] {
                        nfa.add_edge(q, a, t2);
                    }
                }
            }
        }

        if n > 0 {
            nfa.start.insert(self.start);
        }
        for q in 0..n {
            if closures[q].iter().any(|s| self.finals.contains(s)) {
                nfa.finals.insert(q);
            }
        }
        nfa
    }
}

impl<A: Alphabet> Default for EpsilonNfa<A> {
    fn default() -> Self {
        Self::new()
    }
}

/// A non-deterministic automaton without epsilon transitions: `(Q, Σ, δ, Q_s, Q_f)`.
#[derive(Clone, Debug)]
pub struct Nfa<A: Alphabet> {
    n: usize,
    edges: Vec<Vec<(A, usize)>>,
    pub start: BTreeSet<usize>,
    pub finals: BTreeSet<usize>,
}

impl<A: Alphabet> Nfa<A> {
    pub fn new(n: usize) -> Self {
        Nfa {
            n,
            edges: vec![Vec::new(); n],
            start: BTreeSet::new(),
            finals: BTreeSet::new(),
        }
    }

    pub fn state_count(&self) -> usize {
        self.n
    }

    pub fn add_edge(&mut self, from: usize, a: A, to: usize) {
        // Multi-edges on the same (q, a, q') collapse: the transition set, not a
        // multiset, so skip inserting an exact duplicate.
        if !self.edges[from].contains(&(a, to)) {
            self.edges[from].push((a, to));
        }
    }

    pub fn edges(&self, from: usize) -> &[(A, usize)] {
        &self.edges[from]
    }

    pub fn all_edges(&self) -> impl Iterator<Item = (usize, A, usize)> + '_ {
        self.edges
            .iter()
            .enumerate()
            .flat_map(|(from, outs)| outs.iter().map(move |&(a, to)| (from, a, to)))
    }

    /// Subset construction: determinize this NFA.
    pub fn determinize(&self) -> Dfa<A> {
        let mut alphabet: BTreeSet<A> = BTreeSet::new();
        for outs in &self.edges {
            for &(a, _) in outs {
                alphabet.insert(a);
            }
        }
        let alphabet: Vec<A> = alphabet.into_iter().collect();

        let start_set: BTreeSet<usize> = self.start.clone();
        let mut state_of: HashMap<BTreeSet<usize>, usize> = HashMap::new();
        let mut dfa_states: Vec<BTreeSet<usize>> = Vec::new();
        let mut queue = VecDeque::new();
        let mut edges: Vec<BTreeMap<A, usize>> = Vec::new();

        let start_id = 0;
        state_of.insert(start_set.clone(), start_id);
        dfa_states.push(start_set.clone());
        edges.push(BTreeMap::new());
        queue.push_back(start_set);

        while let Some(subset) = queue.pop_front() {
            let from_id = state_of[&subset];
            for &a in &alphabet {
                let mut target: BTreeSet<usize> = BTreeSet::new();
                for &q in &subset {
                    for &(sym, to) in &self.edges[q] {
                        if sym == a {
                            target.insert(to);
                        }
                    }
                }
                if target.is_empty() {
                    continue;
                }
                let to_id = *state_of.entry(target.clone()).or_insert_with(|| {
                    let id = dfa_states.len();
                    dfa_states.push(target.clone());
                    edges.push(BTreeMap::new());
                    queue.push_back(target.clone());
                    id
                });
                edges[from_id].insert(a, to_id);
            }
        }

        let finals = dfa_states
            .iter()
            .enumerate()
            .filter(|(_, set)| set.iter().any(|s| self.finals.contains(s)))
            .map(|(i, _)| i)
            .collect();

        Dfa {
            n: dfa_states.len(),
            edges,
            start: start_id,
            finals,
            alphabet,
        }
    }
}

/// A deterministic (possibly partial) automaton over `A`.
#[derive(Clone, Debug)]
pub struct Dfa<A: Alphabet> {
    n: usize,
    edges: Vec<BTreeMap<A, usize>>,
    start: usize,
    finals: BTreeSet<usize>,
    alphabet: Vec<A>,
}

impl<A: Alphabet> Dfa<A> {
    pub fn state_count(&self) -> usize {
        self.n
    }

    pub fn start(&self) -> usize {
        self.start
    }

    pub fn is_final(&self, state: usize) -> bool {
        self.finals.contains(&state)
    }

    pub fn step(&self, state: usize, a: A) -> Option<usize> {
        self.edges[state].get(&a).copied()
    }

    pub fn all_edges(&self) -> impl Iterator<Item = (usize, A, usize)> + '_ {
        self.edges
            .iter()
            .enumerate()
            .flat_map(|(from, outs)| outs.iter().map(move |(&a, &to)| (from, a, to)))
    }

    /// Hopcroft-style partition refinement. Completes the transition function against a
    /// virtual trap state first (so missing transitions behave consistently), then drops
    /// the trap's equivalence class from the minimized result: an automaton with no
    /// live path to a final state minimizes down to the empty automaton (`n == 0`).
    pub fn minimize(&self) -> Dfa<A> {
        let trap = self.n;
        let total_n = self.n + 1;
        let alphabet = self.alphabet.clone();

        let target = |q: usize, a: A| -> usize {
            if q == trap {
                trap
            } else {
                *self.edges[q].get(&a).unwrap_or(&trap)
            }
        };

        let mut partition: Vec<usize> = (0..total_n)
            .map(|q| if q != trap && self.finals.contains(&q) { 1 } else { 0 })
            .collect();
        let mut num_blocks = 2;

        loop {
            let mut sig_map: HashMap<Vec<usize>, usize> = HashMap::new();
            let mut new_partition = vec![0; total_n];
            for q in 0..total_n {
                let mut sig = Vec::with_capacity(alphabet.len() + 1);
                sig.push(partition[q]);
                for &a in &alphabet {
                    sig.push(partition[target(q, a)]);
                }
                let next_id = sig_map.len();
                let id = *sig_map.entry(sig).or_insert(next_id);
                new_partition[q] = id;
            }
            let new_num_blocks = sig_map.len();
            partition = new_partition;
            if new_num_blocks == num_blocks {
                break;
            }
            num_blocks = new_num_blocks;
        }

        let trap_block = partition[trap];
        let mut surviving: Vec<usize> = partition
            .iter()
            .copied()
            .filter(|&b| b != trap_block)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        surviving.sort_unstable();
        let remap: HashMap<usize, usize> = surviving
            .iter()
            .enumerate()
            .map(|(i, &b)| (b, i))
            .collect();

        if partition[self.start] == trap_block {
            return Dfa {
                n: 0,
                edges: Vec::new(),
                start: 0,
                finals: BTreeSet::new(),
                alphabet,
            };
        }

        let m = surviving.len();
        let mut edges = vec![BTreeMap::new(); m];
        let mut finals = BTreeSet::new();
        let start = remap[&partition[self.start]];

        for q in 0..self.n {
            let b = partition[q];
            if b == trap_block {
                continue;
            }
            let new_id = remap[&b];
            if self.finals.contains(&q) {
                finals.insert(new_id);
            }
            for &a in &alphabet {
                let t = target(q, a);
                let tb = partition[t];
                if tb == trap_block {
                    continue;
                }
                edges[new_id].insert(a, remap[&tb]);
            }
        }

        Dfa {
            n: m,
            edges,
            start,
            finals,
            alphabet,
        }
    }

    pub fn to_nfa(&self) -> Nfa<A> {
        let mut nfa = Nfa::new(self.n);
        for (from, a, to) in self.all_edges() {
            nfa.add_edge(from, a, to);
        }
        if self.n > 0 {
            nfa.start.insert(self.start);
        }
        nfa.finals = self.finals.clone();
        nfa
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn epsilon_elimination_preserves_language() {
        // 0 -a-> 1 -eps-> 2, final {2}. Should accept "a".
        let mut e = EpsilonNfa::<char>::new();
        let s0 = e.add_state();
        let s1 = e.add_state();
        let s2 = e.add_state();
        e.add_edge(s0, 'a', s1);
        e.add_epsilon(s1, s2);
        e.set_start(s0);
        e.set_final(s2);

        let nfa = e.to_nfa();
        assert!(nfa.start.contains(&s0));
        assert!(nfa.finals.contains(&s1));
    }

    #[test]
    fn determinize_and_minimize_roundtrip() {
        let mut nfa = Nfa::<char>::new(3);
        nfa.add_edge(0, 'a', 1);
        nfa.add_edge(1, 'b', 2);
        nfa.start.insert(0);
        nfa.finals.insert(2);

        let dfa = nfa.determinize().minimize();
        let mut state = dfa.start();
        for ch in "ab".chars() {
            state = dfa.step(state, ch).expect("transition should exist");
        }
        assert!(dfa.is_final(state));
    }

    #[test]
    fn dead_automaton_minimizes_to_empty() {
        let nfa = Nfa::<char>::new(1); // no start state marked: accepts nothing ever
        let dfa = nfa.determinize().minimize();
        assert_eq!(dfa.state_count(), 0);
    }
}
