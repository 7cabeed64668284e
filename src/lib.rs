pub mod abm;
pub mod automaton;
pub mod bfs;
pub mod cfg;
pub mod cfpq;
pub mod dot;
pub mod ecfg;
pub mod error;
pub mod graph;
pub mod matrix;
pub mod regex;
pub mod rpq;
pub mod rsm;
pub mod symbol;

use std::fmt::Debug;
use std::hash::Hash;

/// A generic alphabet.
///
/// `Eq`, `Ord`, and `Hash` are assumed to be provided for the finite set to
/// simplify data structures by allowing use of different map and set types.
///
/// An interesting case may be using `Option<A> where A: Alphabet` which
/// provides the possibility to consider an 'anything else' case and an actually
/// infinte alphabet of which the automaton just uses a finite set.
pub trait Alphabet: Hash + Eq + Debug + Clone + Copy + Ord { }

impl<T> Alphabet for T where T: Hash + Eq + Debug + Clone + Copy + Ord { }
