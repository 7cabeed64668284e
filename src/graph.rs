//! Graph → NFA adapter: a labeled directed multigraph and its conversion into an
//! `Abm`/`Nfa` over interned edge-label symbols.
use std::collections::BTreeSet;

use crate::abm::Abm;
use crate::automaton::Nfa;
use crate::error::{Error, Result};
use crate::symbol::Symbol;

/// A node identifier, `0..node_count`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub usize);

/// A labeled directed multigraph: parallel edges and self-loops are both allowed.
#[derive(Clone, Debug, Default)]
pub struct Graph {
    node_count: usize,
    edges: Vec<(NodeId, Symbol, NodeId)>,
}

impl Graph {
    pub fn new(node_count: usize) -> Self {
        Graph {
            node_count,
            edges: Vec::new(),
        }
    }

    /// Adds node `id` if it is new, growing `node_count` to cover it.
    pub fn ensure_node(&mut self, id: NodeId) {
        if id.0 >= self.node_count {
            self.node_count = id.0 + 1;
        }
    }

    pub fn add_edge(&mut self, from: NodeId, label: Symbol, to: NodeId) {
        self.ensure_node(from);
        self.ensure_node(to);
        self.edges.push((from, label, to));
    }

    pub fn node_count(&self) -> usize {
        self.node_count
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn edges(&self) -> impl Iterator<Item = (NodeId, Symbol, NodeId)> + '_ {
        self.edges.iter().copied()
    }

    fn validate(&self, nodes: &BTreeSet<NodeId>) -> Result<()> {
        for &n in nodes {
            if n.0 >= self.node_count {
                return Err(Error::UnknownNode(n));
            }
        }
        Ok(())
    }

    /// Build an `Nfa<Symbol>` over this graph's node space. `start`/`final` of
    /// `None, None` marks every node both start and final (full-graph reachability);
    /// otherwise only the supplied sets are marked. A node outside `0..node_count` in
    /// either set is an `UnknownNode` error.
    pub fn to_nfa(
        &self,
        start: Option<&BTreeSet<NodeId>>,
        finals: Option<&BTreeSet<NodeId>>,
    ) -> Result<Nfa<Symbol>> {
        if let Some(s) = start {
            self.validate(s)?;
        }
        if let Some(f) = finals {
            self.validate(f)?;
        }

        let mut nfa = Nfa::new(self.node_count);
        for &(from, label, to) in &self.edges {
            nfa.add_edge(from.0, label, to.0);
        }

        match (start, finals) {
            (None, None) => {
                for i in 0..self.node_count {
                    nfa.start.insert(i);
                    nfa.finals.insert(i);
                }
            }
            _ => {
                if let Some(s) = start {
                    nfa.start = s.iter().map(|n| n.0).collect();
                }
                if let Some(f) = finals {
                    nfa.finals = f.iter().map(|n| n.0).collect();
                }
            }
        }

        Ok(nfa)
    }

    /// Graph-as-ABM, states labeled by `NodeId`.
    pub fn to_abm(
        &self,
        start: Option<&BTreeSet<NodeId>>,
        finals: Option<&BTreeSet<NodeId>>,
    ) -> Result<Abm<NodeId>> {
        let nfa = self.to_nfa(start, finals)?;
        let states = (0..self.node_count).map(NodeId).collect();
        Ok(Abm::from_nfa_labeled(&nfa, states))
    }

    /// `(node_count, edge_count, label_set)`.
    pub fn stats(&self) -> (usize, usize, BTreeSet<Symbol>) {
        let labels = self.edges.iter().map(|&(_, label, _)| label).collect();
        (self.node_count, self.edges.len(), labels)
    }
}

/// Two cycles sharing node `0`: the first cycle has `n1` additional nodes labeled
/// `labels.0`, the second `n2` additional nodes labeled `labels.1`. Used by benchmarks and
/// tests as a synthetic, size-parameterized graph.
pub fn labeled_two_cycle_graph(n1: usize, n2: usize, labels: (Symbol, Symbol)) -> Graph {
    let mut graph = Graph::new(1 + n1 + n2);

    let mut prev = NodeId(0);
    for i in 1..=n1 {
        graph.add_edge(prev, labels.0, NodeId(i));
        prev = NodeId(i);
    }
    graph.add_edge(prev, labels.0, NodeId(0));

    let mut prev = NodeId(0);
    for i in (n1 + 1)..=(n1 + n2) {
        graph.add_edge(prev, labels.1, NodeId(i));
        prev = NodeId(i);
    }
    graph.add_edge(prev, labels.1, NodeId(0));

    graph
}
