//! Regular expressions over a symbol alphabet, compiled to a minimal DFA.
//!
//! The operation-graph representation (`Regex`/`Op`/`Handle`/`Cached`): pushing an `Op`
//! returns a `Handle` into a shared arena, and `Cached` deduplicates repeated
//! subexpressions so that, e.g., `(ab)*|(ab)*` shares one `Concat` node. A text parser and
//! a Thompson construction into an `EpsilonNfa` sit on top of that representation.
use std::collections::HashMap;
use std::fmt::Write as _;
use std::iter::Peekable;
use std::str::CharIndices;

use crate::automaton::EpsilonNfa;
use crate::error::Error;
use crate::symbol::{Symbol, SymbolTable};
use crate::Alphabet;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Handle(usize);

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Op<A: Alphabet> {
    /// The language `{ε}`. Only produced internally (e.g. by the grammar layer for an
    /// empty production body); the text parser never emits it for an empty string.
    Epsilon,
    Match(A),
    Star(Handle),
    Or(Handle, Handle),
    Concat(Handle, Handle),
}

/// Represents regular expressions over some finite alphabet.
///
/// An empty `Regex` (no root) denotes the empty language `{}`, not `{ε}`.
pub struct Regex<A: Alphabet> {
    subs: Vec<Op<A>>,
}

/// Provides access to creating new regex expressions with cached results, deduplicating
/// structurally identical subexpressions onto the same `Handle`.
pub struct Cached<A: Alphabet> {
    regex: Regex<A>,
    cache: HashMap<Op<A>, Handle>,
}

impl<A: Alphabet> Regex<A> {
    pub fn new() -> Self {
        Regex { subs: Vec::new() }
    }

    pub fn push(&mut self, op: Op<A>) -> Handle {
        match op {
            Op::Epsilon => (),
            Op::Match(_) => (),
            Op::Star(Handle(i)) => assert!(i < self.subs.len()),
            Op::Or(Handle(i), Handle(j)) => assert!(i < self.subs.len() && j < self.subs.len()),
            Op::Concat(Handle(i), Handle(j)) => {
                assert!(i < self.subs.len() && j < self.subs.len())
            }
        }

        let handle = Handle(self.subs.len());
        self.subs.push(op);
        handle
    }

    pub fn root(&self) -> Option<Handle> {
        self.subs.len().checked_sub(1).map(Handle)
    }

    pub fn cached(self) -> Cached<A> {
        Cached {
            regex: self,
            cache: HashMap::new(),
        }
    }

    /// Build a `Regex` that matches only `{ε}`.
    pub fn epsilon() -> Self {
        let mut r = Regex::new();
        r.push(Op::Epsilon);
        r
    }

    /// Build a `Regex` matching the literal concatenation of `symbols` (empty slice ⇒
    /// `epsilon()`, matching `Ecfg::from_cfg`'s treatment of an empty production body).
    pub fn concat_of(symbols: &[A]) -> Self {
        let mut r = Regex::new();
        match symbols.split_first() {
            None => {
                r.push(Op::Epsilon);
            }
            Some((&first, rest)) => {
                let mut handle = r.push(Op::Match(first));
                for &sym in rest {
                    let next = r.push(Op::Match(sym));
                    handle = r.push(Op::Concat(handle, next));
                }
            }
        }
        r
    }

    /// `self | other`, splicing `other`'s ops after `self`'s and keeping the new `Or` as
    /// the root. Either side being the empty language (`{}`) returns the other unchanged.
    pub fn union(mut self, other: Regex<A>) -> Regex<A> {
        let Some(left_root) = self.root() else {
            return other;
        };
        let Some(other_root) = other.root() else {
            return self;
        };

        let offset = self.subs.len();
        self.subs.extend(other.subs.into_iter().map(|op| match op {
            Op::Epsilon => Op::Epsilon,
            Op::Match(a) => Op::Match(a),
            Op::Star(Handle(i)) => Op::Star(Handle(i + offset)),
            Op::Or(Handle(i), Handle(j)) => Op::Or(Handle(i + offset), Handle(j + offset)),
            Op::Concat(Handle(i), Handle(j)) => {
                Op::Concat(Handle(i + offset), Handle(j + offset))
            }
        }));
        self.push(Op::Or(left_root, Handle(other_root.0 + offset)));
        self
    }

    pub fn to_string_debug(&self) -> String
    where
        A: std::fmt::Debug,
    {
        let mut string = String::new();
        match self.root() {
            Some(root) => self.push_from_root(root, &mut string),
            None => string.push_str("{}"),
        }
        string
    }

    fn push_from_root(&self, Handle(root): Handle, string: &mut String)
    where
        A: std::fmt::Debug,
    {
        match self.subs[root] {
            Op::Epsilon => string.push_str("{e}"),
            Op::Match(a) => write!(string, "{:?}", a).unwrap(),
            Op::Star(sub) => {
                string.push('(');
                self.push_from_root(sub, string);
                string.push_str(")*");
            }
            Op::Or(a, b) => {
                string.push('(');
                self.push_from_root(a, string);
                string.push('|');
                self.push_from_root(b, string);
                string.push(')');
            }
            Op::Concat(a, b) => {
                self.push_from_root(a, string);
                self.push_from_root(b, string);
            }
        }
    }

    /// Thompson construction into an epsilon-NFA.
    pub fn to_epsilon_nfa(&self) -> EpsilonNfa<A> {
        let mut nfa = EpsilonNfa::new();
        match self.root() {
            None => {
                let s = nfa.add_state();
                nfa.set_start(s);
            }
            Some(root) => {
                let (start, end) = self.build(root, &mut nfa);
                nfa.set_start(start);
                nfa.set_final(end);
            }
        }
        nfa
    }

    fn build(&self, Handle(idx): Handle, nfa: &mut EpsilonNfa<A>) -> (usize, usize) {
        match self.subs[idx] {
            Op::Epsilon => {
                let s = nfa.add_state();
                let f = nfa.add_state();
                nfa.add_epsilon(s, f);
                (s, f)
            }
            Op::Match(a) => {
                let s = nfa.add_state();
                let f = nfa.add_state();
                nfa.add_edge(s, a, f);
                (s, f)
            }
            Op::Star(sub) => {
                let (s1, f1) = self.build(sub, nfa);
                let s = nfa.add_state();
                let f = nfa.add_state();
                nfa.add_epsilon(s, s1);
                nfa.add_epsilon(f1, f);
                nfa.add_epsilon(s, f);
                nfa.add_epsilon(f1, s1);
                (s, f)
            }
            Op::Or(a, b) => {
                let (sa, fa) = self.build(a, nfa);
                let (sb, fb) = self.build(b, nfa);
                let s = nfa.add_state();
                let f = nfa.add_state();
                nfa.add_epsilon(s, sa);
                nfa.add_epsilon(s, sb);
                nfa.add_epsilon(fa, f);
                nfa.add_epsilon(fb, f);
                (s, f)
            }
            Op::Concat(a, b) => {
                let (sa, fa) = self.build(a, nfa);
                let (sb, fb) = self.build(b, nfa);
                nfa.add_epsilon(fa, sb);
                (sa, fb)
            }
        }
    }
}

impl<A: Alphabet> Cached<A> {
    pub fn new() -> Self {
        Regex::new().cached()
    }

    /// Deduplicates same operations to also point to the same handle, so you can **not**
    /// generally assert that the returned handle is the new root of the regex.
    pub fn insert(&mut self, op: Op<A>) -> Handle {
        let regex = &mut self.regex;
        let value = self.cache.entry(op).or_insert_with(|| regex.push(op));
        *value
    }

    pub fn inner(&self) -> &Regex<A> {
        &self.regex
    }

    pub fn into_inner(self) -> Regex<A> {
        self.regex
    }
}

impl<A: Alphabet> Default for Regex<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A: Alphabet> Default for Cached<A> {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse regex source (`|`, `*`, concatenation by juxtaposition/whitespace,
/// parentheses, alphanumeric literal tokens) into a `Regex<Symbol>`. An all-whitespace or
/// empty `source` parses to the empty regex (the empty language).
///
/// Builds the operation graph directly (no `Cached` dedup) so that the parsed
/// expression's root is always the final value returned, matching `Regex::root()`.
pub fn parse(source: &str, table: &mut SymbolTable) -> Result<Regex<Symbol>, Error> {
    let mut parser = Parser {
        chars: source.char_indices().peekable(),
        source,
        regex: Regex::new(),
        table,
    };
    parser.skip_ws();
    if parser.chars.peek().is_none() {
        return Ok(Regex::new());
    }

    parser.parse_union()?;
    parser.skip_ws();
    if let Some((pos, ch)) = parser.chars.peek().copied() {
        return Err(Error::InvalidRegex(format!(
            "unexpected character {:?} at byte {} in {:?}",
            ch, pos, source
        )));
    }

    Ok(parser.regex)
}

struct Parser<'a> {
    chars: Peekable<CharIndices<'a>>,
    source: &'a str,
    regex: Regex<Symbol>,
    table: &'a mut SymbolTable,
}

impl<'a> Parser<'a> {
    fn skip_ws(&mut self) {
        while matches!(self.chars.peek(), Some((_, c)) if c.is_whitespace()) {
            self.chars.next();
        }
    }

    fn peek_char(&mut self) -> Option<char> {
        self.skip_ws();
        self.chars.peek().map(|&(_, c)| c)
    }

    // union := concat ('|' concat)*
    fn parse_union(&mut self) -> Result<Handle, Error> {
        let mut handle = self.parse_concat()?;
        loop {
            self.skip_ws();
            match self.chars.peek() {
                Some(&(_, '|')) => {
                    self.chars.next();
                    let rhs = self.parse_concat()?;
                    handle = self.regex.push(Op::Or(handle, rhs));
                }
                _ => break,
            }
        }
        Ok(handle)
    }

    // concat := star+
    fn parse_concat(&mut self) -> Result<Handle, Error> {
        let mut handle = self.parse_star()?;
        loop {
            match self.peek_char() {
                Some(c) if c != '|' && c != ')' => {
                    let rhs = self.parse_star()?;
                    handle = self.regex.push(Op::Concat(handle, rhs));
                }
                _ => break,
            }
        }
        Ok(handle)
    }

    // star := atom '*'*
    fn parse_star(&mut self) -> Result<Handle, Error> {
        let mut handle = self.parse_atom()?;
        loop {
            self.skip_ws();
            match self.chars.peek() {
                Some(&(_, '*')) => {
                    self.chars.next();
                    handle = self.regex.push(Op::Star(handle));
                }
                _ => break,
            }
        }
        Ok(handle)
    }

    // atom := '(' union ')' | token
    fn parse_atom(&mut self) -> Result<Handle, Error> {
        self.skip_ws();
        match self.chars.peek().copied() {
            Some((_, '(')) => {
                self.chars.next();
                let inner = self.parse_union()?;
                self.skip_ws();
                match self.chars.next() {
                    Some((_, ')')) => Ok(inner),
                    _ => Err(Error::InvalidRegex(format!(
                        "unterminated group in {:?}",
                        self.source
                    ))),
                }
            }
            Some((start, c)) if c.is_alphanumeric() || c == '_' => {
                let mut end = start + c.len_utf8();
                self.chars.next();
                while let Some(&(pos, c2)) = self.chars.peek() {
                    if c2.is_alphanumeric() || c2 == '_' {
                        end = pos + c2.len_utf8();
                        self.chars.next();
                    } else {
                        break;
                    }
                }
                let token = &self.source[start..end];
                let symbol = self.table.intern(token);
                Ok(self.regex.push(Op::Match(symbol)))
            }
            Some((pos, c)) => Err(Error::InvalidRegex(format!(
                "unexpected character {:?} at byte {} in {:?}",
                c, pos, self.source
            ))),
            None => Err(Error::InvalidRegex(format!(
                "unexpected end of input in {:?}",
                self.source
            ))),
        }
    }
}

/// Compile regex source to its minimal DFA (parse → Thompson → epsilon-elimination →
/// subset construction → minimization).
pub fn to_minimal_dfa(
    source: &str,
    table: &mut SymbolTable,
) -> Result<crate::automaton::Dfa<Symbol>, Error> {
    let regex = parse(source, table)?;
    Ok(regex.to_epsilon_nfa().to_nfa().determinize().minimize())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dfa_accepts(
        dfa: &crate::automaton::Dfa<Symbol>,
        table: &mut SymbolTable,
        word: &[&str],
    ) -> bool {
        if dfa.state_count() == 0 {
            return false;
        }
        let mut state = dfa.start();
        for tok in word {
            let sym = table.intern(tok);
            match dfa.step(state, sym) {
                Some(next) => state = next,
                None => return false,
            }
        }
        dfa.is_final(state)
    }

    #[test]
    fn empty_source_is_empty_language() {
        let mut table = SymbolTable::new();
        let dfa = to_minimal_dfa("", &mut table).unwrap();
        assert_eq!(dfa.state_count(), 0);
    }

    #[test]
    fn concatenation_union_and_star() {
        let mut table = SymbolTable::new();
        let dfa = to_minimal_dfa("a (b|c) d*", &mut table).unwrap();

        assert!(dfa_accepts(&dfa, &mut table, &["a", "b"]));
        assert!(dfa_accepts(&dfa, &mut table, &["a", "c", "d", "d"]));
        assert!(!dfa_accepts(&dfa, &mut table, &["a", "b", "c"]));
        assert!(!dfa_accepts(&dfa, &mut table, &["a"]));
    }

    #[test]
    fn rpq_regex_from_scenario_s1() {
        let mut table = SymbolTable::new();
        let dfa = to_minimal_dfa("R P Q", &mut table).unwrap();
        assert!(dfa_accepts(&dfa, &mut table, &["R", "P", "Q"]));
        assert!(!dfa_accepts(&dfa, &mut table, &["R", "P"]));
    }

    #[test]
    fn bfs_regex_from_scenario_s2() {
        let mut table = SymbolTable::new();
        let dfa = to_minimal_dfa("b* a b", &mut table).unwrap();
        assert!(dfa_accepts(&dfa, &mut table, &["a", "b"]));
        assert!(dfa_accepts(&dfa, &mut table, &["b", "b", "a", "b"]));
        assert!(!dfa_accepts(&dfa, &mut table, &["a"]));
    }
}
