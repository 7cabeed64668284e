//! Constrained Multi-Source BFS: linear-algebraic BFS over a direct-sum matrix
//! family, in merged or per-source ("separate") mode.
use std::collections::BTreeSet;
use std::hash::Hash;

use crate::abm::Abm;
use crate::matrix::BoolMatrix;

/// Either every reached target folded together (`Merged`), or tagged by which element of
/// the data/graph ABM's start set produced it (`Separate`).
#[derive(Debug, PartialEq, Eq)]
pub enum BfsResult<S> {
    Merged(BTreeSet<usize>),
    Separate(BTreeSet<(S, usize)>),
}

/// `constraint` is the regex/RSM side (size `n`), `data` the graph side (size
/// `k`). Returns data-state indices (merged mode) or `(data source-state label,
/// data-state index)` pairs (separate mode) that the BFS reached and that satisfy the
/// final-state conditions below.
///
/// If `constraint` and `data` share no symbol, the result is empty immediately (no
/// transitions exist to explore).
pub fn constraint_bfs<C: Clone + Eq + Hash, D: Clone + Eq + Hash>(
    constraint: &Abm<C>,
    data: &Abm<D>,
    separate: bool,
) -> BfsResult<D> {
    let n = constraint.state_count();
    let k = data.state_count();

    let shared: Vec<_> = constraint
        .symbols()
        .filter(|s| data.matrix(*s).is_some())
        .collect();

    if shared.is_empty() {
        return if separate {
            BfsResult::Separate(BTreeSet::new())
        } else {
            BfsResult::Merged(BTreeSet::new())
        };
    }

    let direct_sum = constraint.direct_sum(data);
    let mut visited = if separate {
        constraint.make_separate_front(data)
    } else {
        constraint.make_front(data)
    };

    let mut rounds = 0;
    loop {
        let before = visited.nnz();
        for &symbol in &shared {
            let s = direct_sum.get(&symbol).expect("symbol filtered as shared");
            let raw = visited.matmul(s);
            let transformed = normalize(&raw, k);
            visited.or_assign(&transformed);
        }
        rounds += 1;
        if visited.nnz() == before {
            break;
        }
    }
    log::debug!("constrained BFS settled after {rounds} rounds, visited nnz={}", visited.nnz());

    extract(&visited, constraint, data, n, k, separate)
}

/// The semantic heart of the algorithm: for each nonzero `(r, c)` with `c < k` (a data-state move),
/// if row `r` of `raw` has more than one nonzero total, the row is repositioned to
/// `⌊r/k⌋·k + c` (so the row's identity tracks "which source, at which data state") and
/// OR'd in; a row with only that single nonzero contributes nothing (no productive move).
fn normalize(raw: &BoolMatrix, k: usize) -> BoolMatrix {
    let mut out = BoolMatrix::new(raw.rows(), raw.cols());
    for r in 0..raw.rows() {
        let row = raw.row(r);
        if row.len() <= 1 {
            continue;
        }
        for &c in row {
            if c < k {
                let new_row = (r / k) * k + c;
                for &c2 in row {
                    out.set(new_row, c2);
                }
            }
        }
    }
    out
}

fn extract<C: Clone + Eq + Hash, D: Clone + Eq + Hash>(
    visited: &BoolMatrix,
    constraint: &Abm<C>,
    data: &Abm<D>,
    n: usize,
    k: usize,
    separate: bool,
) -> BfsResult<D> {
    let _ = n;
    let sources: Vec<usize> = data.start_indices().iter().copied().collect();

    let mut merged = BTreeSet::new();
    let mut sep = BTreeSet::new();

    for (r, c) in visited.nonzero() {
        if c < k {
            continue;
        }
        let constraint_state = c - k;
        let data_state = r % k;
        if !data.final_indices().contains(&data_state) {
            continue;
        }
        if !constraint.final_indices().contains(&constraint_state) {
            continue;
        }
        if separate {
            let block = r / k;
            let source_idx = sources[block];
            sep.insert((data.states()[source_idx].clone(), data_state));
        } else {
            merged.insert(data_state);
        }
    }

    if separate {
        BfsResult::Separate(sep)
    } else {
        BfsResult::Merged(merged)
    }
}
