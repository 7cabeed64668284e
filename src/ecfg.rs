//! Extended CFG: one regex per nonterminal, built by unioning each production's
//! body.
use indexmap::IndexMap;

use crate::cfg::Cfg;
use crate::regex::Regex;
use crate::symbol::Symbol;

/// One alternation regex per nonterminal. Keyed with `IndexMap` so box construction in
/// `Rsm::from_ecfg` iterates in the grammar's own nonterminal-introduction order.
pub struct Ecfg {
    pub start: Symbol,
    pub productions: IndexMap<Symbol, Regex<Symbol>>,
}

impl Ecfg {
    /// For each production `A -> α`, append `α` (as a concatenation regex, `{ε}` for an
    /// empty body) to `R[A]` via alternation.
    pub fn from_cfg(cfg: &Cfg) -> Ecfg {
        let mut productions: IndexMap<Symbol, Regex<Symbol>> = IndexMap::new();
        for p in &cfg.productions {
            let symbols: Vec<Symbol> = p.body.iter().map(|s| s.symbol()).collect();
            let body_regex = Regex::concat_of(&symbols);
            match productions.get_mut(&p.head) {
                Some(existing) => {
                    let taken = std::mem::replace(existing, Regex::new());
                    *existing = taken.union(body_regex);
                }
                None => {
                    productions.insert(p.head, body_regex);
                }
            }
        }
        Ecfg {
            start: cfg.start,
            productions,
        }
    }
}
