//! Context-free grammars, weak Chomsky Normal Form normalization, and the plain-text
//! grammar text format.
use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::error::{Error, Result};
use crate::symbol::{Symbol, SymbolTable};

/// A symbol occurring in a production body: distinguished at parse time (capitalized =
/// nonterminal, lowercase = terminal), not re-derived from spelling afterward.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum CfgSymbol {
    Terminal(Symbol),
    NonTerminal(Symbol),
}

impl CfgSymbol {
    pub fn as_nonterminal(self) -> Option<Symbol> {
        match self {
            CfgSymbol::NonTerminal(s) => Some(s),
            CfgSymbol::Terminal(_) => None,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, CfgSymbol::Terminal(_))
    }

    /// The underlying interned symbol, regardless of kind: the ECFG/RSM alphabet
    /// deliberately mixes terminals and nonterminals.
    pub fn symbol(self) -> Symbol {
        match self {
            CfgSymbol::Terminal(s) | CfgSymbol::NonTerminal(s) => s,
        }
    }
}

#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct Production {
    pub head: Symbol,
    pub body: Vec<CfgSymbol>,
}

/// A context-free grammar: a start symbol and a flat production list. `nonterminals` is
/// tracked explicitly (not inferred from productions) so symbols with no productions yet
/// are still known to be nonterminals.
#[derive(Clone, Debug)]
pub struct Cfg {
    pub start: Symbol,
    pub nonterminals: BTreeSet<Symbol>,
    pub productions: Vec<Production>,
}

impl Cfg {
    pub fn new(start: Symbol) -> Self {
        Cfg {
            start,
            nonterminals: [start].into_iter().collect(),
            productions: Vec::new(),
        }
    }

    pub fn add_production(&mut self, head: Symbol, body: Vec<CfgSymbol>) {
        self.nonterminals.insert(head);
        for &s in &body {
            if let CfgSymbol::NonTerminal(nt) = s {
                self.nonterminals.insert(nt);
            }
        }
        self.productions.push(Production { head, body });
    }

    fn bodies_of(&self, head: Symbol) -> impl Iterator<Item = &[CfgSymbol]> {
        self.productions
            .iter()
            .filter(move |p| p.head == head)
            .map(|p| p.body.as_slice())
    }

    /// Text format: `HEAD -> body`, alternatives via `|`, body tokens space-separated,
    /// lowercase = terminal, capitalized = nonterminal. An empty alternative denotes ε.
    /// Start symbol defaults to `S`.
    pub fn parse(text: &str, table: &mut SymbolTable) -> Result<Cfg> {
        let start = table.intern("S");
        let mut cfg = Cfg::new(start);

        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let (head_text, body_text) = line.split_once("->").ok_or_else(|| {
                Error::InvalidGrammar(format!("missing '->' in production line: {line:?}"))
            })?;
            let head_text = head_text.trim();
            if head_text.is_empty() || !is_nonterminal_spelling(head_text) {
                return Err(Error::InvalidGrammar(format!(
                    "production head must be a capitalized nonterminal: {head_text:?}"
                )));
            }
            let head = table.intern(head_text);
            cfg.nonterminals.insert(head);

            for alt in body_text.split('|') {
                let body = alt
                    .split_whitespace()
                    .map(|tok| {
                        if is_nonterminal_spelling(tok) {
                            let nt = table.intern(tok);
                            cfg.nonterminals.insert(nt);
                            CfgSymbol::NonTerminal(nt)
                        } else {
                            CfgSymbol::Terminal(table.intern(tok))
                        }
                    })
                    .collect();
                cfg.productions.push(Production { head, body });
            }
        }

        Ok(cfg)
    }

    pub fn to_text(&self, table: &SymbolTable) -> String {
        let mut out = String::new();
        for p in &self.productions {
            out.push_str(table.resolve(p.head));
            out.push_str(" -> ");
            if p.body.is_empty() {
                // ε: nothing after "->", consistent with the parser's reading of it back.
            } else {
                let tokens: Vec<&str> = p
                    .body
                    .iter()
                    .map(|s| match s {
                        CfgSymbol::Terminal(t) => table.resolve(*t),
                        CfgSymbol::NonTerminal(nt) => table.resolve(*nt),
                    })
                    .collect();
                out.push_str(&tokens.join(" "));
            }
            out.push('\n');
        }
        out
    }
}

fn is_nonterminal_spelling(token: &str) -> bool {
    token.chars().next().is_some_and(|c| c.is_uppercase())
}

/// Unit-production elimination, useless-symbol removal, terminal substitution in
/// mixed bodies, and binarization of long bodies, in that order, matching
/// `cfg_to_wcnf`'s pipeline.
pub fn cfg_to_wcnf(cfg: &Cfg, table: &mut SymbolTable) -> Cfg {
    let cfg = eliminate_unit_productions(cfg);
    let cfg = remove_useless_symbols(&cfg);
    let cfg = substitute_terminals_in_mixed_bodies(&cfg, table);
    decompose_long_bodies(&cfg, table)
}

fn is_unit_body(body: &[CfgSymbol]) -> Option<Symbol> {
    match body {
        [CfgSymbol::NonTerminal(nt)] => Some(*nt),
        _ => None,
    }
}

/// Standard unit-pair closure: for each `A`, the set of `B` reachable via chains of unit
/// productions `A -> B` (including `A` itself), then replace every unit production with
/// the non-unit productions of everything in its closure.
fn eliminate_unit_productions(cfg: &Cfg) -> Cfg {
    let mut unit_reach: HashMap<Symbol, BTreeSet<Symbol>> = cfg
        .nonterminals
        .iter()
        .map(|&nt| (nt, [nt].into_iter().collect()))
        .collect();

    loop {
        let mut changed = false;
        for p in &cfg.productions {
            if let Some(target) = is_unit_body(&p.body) {
                let addition: Vec<Symbol> = unit_reach[&target].iter().copied().collect();
                let head_set = unit_reach.get_mut(&p.head).unwrap();
                for s in addition {
                    changed |= head_set.insert(s);
                }
            }
        }
        if !changed {
            break;
        }
    }

    let mut out = Cfg::new(cfg.start);
    out.nonterminals = cfg.nonterminals.clone();
    let mut seen = BTreeSet::new();
    for (&head, reach) in &unit_reach {
        for &via in reach {
            for body in cfg.bodies_of(via) {
                if is_unit_body(body).is_some() {
                    continue;
                }
                let key = (head, body.to_vec());
                if seen.insert(key.clone()) {
                    out.productions.push(Production {
                        head,
                        body: key.1,
                    });
                }
            }
        }
    }
    out
}

/// Non-generating/non-reachable symbol removal, in that order (removing non-generating
/// symbols first avoids reintroducing them via a reachability pass).
fn remove_useless_symbols(cfg: &Cfg) -> Cfg {
    let mut generating: BTreeSet<Symbol> = BTreeSet::new();
    loop {
        let mut changed = false;
        for p in &cfg.productions {
            if generating.contains(&p.head) {
                continue;
            }
            let ok = p.body.iter().all(|s| match s {
                CfgSymbol::Terminal(_) => true,
                CfgSymbol::NonTerminal(nt) => generating.contains(nt),
            });
            if ok {
                changed |= generating.insert(p.head);
            }
        }
        if !changed {
            break;
        }
    }

    let generating_productions: Vec<Production> = cfg
        .productions
        .iter()
        .filter(|p| {
            generating.contains(&p.head)
                && p.body.iter().all(|s| match s {
                    CfgSymbol::Terminal(_) => true,
                    CfgSymbol::NonTerminal(nt) => generating.contains(nt),
                })
        })
        .cloned()
        .collect();

    let mut reachable: BTreeSet<Symbol> = [cfg.start].into_iter().collect();
    loop {
        let mut changed = false;
        for p in &generating_productions {
            if !reachable.contains(&p.head) {
                continue;
            }
            for s in &p.body {
                if let CfgSymbol::NonTerminal(nt) = s {
                    changed |= reachable.insert(*nt);
                }
            }
        }
        if !changed {
            break;
        }
    }

    let mut out = Cfg::new(cfg.start);
    out.nonterminals = cfg
        .nonterminals
        .iter()
        .filter(|nt| generating.contains(nt) && reachable.contains(nt))
        .copied()
        .collect();
    out.productions = generating_productions
        .into_iter()
        .filter(|p| reachable.contains(&p.head))
        .collect();
    out
}

/// Any production body of length >= 2 containing a terminal has each terminal occurrence
/// replaced by a fresh nonterminal whose sole production rewrites it back to that
/// terminal, so every multi-symbol body becomes all-nonterminal before binarization.
fn substitute_terminals_in_mixed_bodies(cfg: &Cfg, table: &mut SymbolTable) -> Cfg {
    let mut out = cfg.clone();
    let mut fresh_for: HashMap<Symbol, Symbol> = HashMap::new();
    let mut counter = 0usize;
    let mut extra_productions = Vec::new();

    for p in &mut out.productions {
        if p.body.len() < 2 {
            continue;
        }
        for s in &mut p.body {
            if let CfgSymbol::Terminal(t) = *s {
                let nt = *fresh_for.entry(t).or_insert_with(|| {
                    let name = format!("#term{counter}");
                    counter += 1;
                    let nt = table.intern(&name);
                    extra_productions.push(Production {
                        head: nt,
                        body: vec![CfgSymbol::Terminal(t)],
                    });
                    nt
                });
                *s = CfgSymbol::NonTerminal(nt);
            }
        }
    }

    for nt in fresh_for.values() {
        out.nonterminals.insert(*nt);
    }
    out.productions.extend(extra_productions);
    out
}

/// `A -> X1 X2 .. Xn` (n > 2, all nonterminal after substitution) becomes a chain of
/// fresh-nonterminal binary productions: `A -> X1 Y1`, `Y1 -> X2 Y2`, ..., `Y_{n-2} ->
/// X_{n-1} Xn`.
fn decompose_long_bodies(cfg: &Cfg, table: &mut SymbolTable) -> Cfg {
    let mut out = Cfg::new(cfg.start);
    out.nonterminals = cfg.nonterminals.clone();
    let mut counter = 0usize;

    for p in &cfg.productions {
        if p.body.len() <= 2 {
            out.productions.push(p.clone());
            continue;
        }

        let n = p.body.len();
        let mut head = p.head;
        for i in 0..n - 1 {
            let left = p.body[i];
            let right = if i == n - 2 {
                p.body[i + 1]
            } else {
                let name = format!("#bin{counter}");
                counter += 1;
                let nt = table.intern(&name);
                out.nonterminals.insert(nt);
                CfgSymbol::NonTerminal(nt)
            };
            out.productions.push(Production {
                head,
                body: vec![left, right],
            });
            if i < n - 2 {
                head = right
                    .as_nonterminal()
                    .expect("chain continuation is always fresh");
            }
        }
    }
    out
}

/// Per-nonterminal production bodies, grouped for the CFPQ evaluators,
/// classified by the correct predicate: ε has `body.len() == 0`, not the original
/// tool's `body.len() > 2`.
pub struct WcnfView<'a> {
    pub terminal: BTreeMap<Symbol, Vec<Symbol>>,
    pub binary: BTreeMap<Symbol, Vec<(Symbol, Symbol)>>,
    pub nullable: BTreeSet<Symbol>,
    pub start: Symbol,
    pub cfg: &'a Cfg,
}

impl<'a> WcnfView<'a> {
    pub fn new(cfg: &'a Cfg) -> Self {
        let mut terminal: BTreeMap<Symbol, Vec<Symbol>> = BTreeMap::new();
        let mut binary: BTreeMap<Symbol, Vec<(Symbol, Symbol)>> = BTreeMap::new();
        let mut nullable = BTreeSet::new();

        for p in &cfg.productions {
            match p.body.as_slice() {
                [] => {
                    nullable.insert(p.head);
                }
                [CfgSymbol::Terminal(t)] => terminal.entry(p.head).or_default().push(*t),
                [CfgSymbol::NonTerminal(b), CfgSymbol::NonTerminal(c)] => {
                    binary.entry(p.head).or_default().push((*b, *c))
                }
                _ => {
                    // Not reachable after `cfg_to_wcnf`; anything else is a caller bug.
                }
            }
        }

        WcnfView {
            terminal,
            binary,
            nullable,
            start: cfg.start,
            cfg,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_alternatives_and_epsilon() {
        let mut table = SymbolTable::new();
        let cfg = Cfg::parse("S -> A B |\nA -> a\nB -> b", &mut table).unwrap();
        assert_eq!(cfg.productions.len(), 3);
        let s = table.intern("S");
        let empty_alt = cfg.bodies_of(s).any(|b| b.is_empty());
        assert!(empty_alt);
    }

    #[test]
    fn rejects_missing_arrow() {
        let mut table = SymbolTable::new();
        assert!(Cfg::parse("S A B", &mut table).is_err());
    }

    #[test]
    fn wcnf_produces_only_short_bodies() {
        let mut table = SymbolTable::new();
        // S -> A B C (long body with a trailing unit chain and a useless symbol D).
        let cfg = Cfg::parse(
            "S -> A B C\nA -> a\nB -> b\nC -> D\nD -> d\nUnused -> u",
            &mut table,
        )
        .unwrap();
        let wcnf = cfg_to_wcnf(&cfg, &mut table);
        for p in &wcnf.productions {
            assert!(p.body.len() <= 2);
            if p.body.len() == 2 {
                assert!(p.body.iter().all(|s| !s.is_terminal()));
            }
        }
        // `Unused` is unreachable from S, so it must not survive.
        let unused = table.intern("Unused");
        assert!(!wcnf.nonterminals.contains(&unused));
    }

    #[test]
    fn wcnf_eliminates_unit_chains() {
        let mut table = SymbolTable::new();
        let cfg = Cfg::parse("S -> A\nA -> B\nB -> b", &mut table).unwrap();
        let wcnf = cfg_to_wcnf(&cfg, &mut table);
        let b = table.intern("b");
        let view = WcnfView::new(&wcnf);
        assert_eq!(view.terminal.get(&wcnf.start), Some(&vec![b]));
    }
}
