//! Sparse boolean matrix kernel.
//!
//! A CSR-like representation: each row is a sorted, deduplicated `Vec<usize>` of nonzero
//! column indices. `false` is the additive identity and `+` is logical OR throughout; see
//! the rationale in DESIGN.md for why this is hand-rolled rather than built on a
//! numeric sparse-linear-algebra crate.

/// A square-or-rectangular sparse boolean matrix.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BoolMatrix {
    rows: usize,
    cols: usize,
    data: Vec<Vec<usize>>,
}

impl BoolMatrix {
    /// The zero matrix of the given shape.
    pub fn new(rows: usize, cols: usize) -> Self {
        BoolMatrix {
            rows,
            cols,
            data: vec![Vec::new(); rows],
        }
    }

    /// The `n×n` identity matrix.
    pub fn identity(n: usize) -> Self {
        let mut m = BoolMatrix::new(n, n);
        for i in 0..n {
            m.data[i].push(i);
        }
        m
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn get(&self, i: usize, j: usize) -> bool {
        assert!(i < self.rows && j < self.cols, "index out of bounds");
        self.data[i].binary_search(&j).is_ok()
    }

    pub fn set(&mut self, i: usize, j: usize) {
        assert!(i < self.rows && j < self.cols, "index out of bounds");
        let row = &mut self.data[i];
        if let Err(pos) = row.binary_search(&j) {
            row.insert(pos, j);
        }
    }

    /// Nonzero column indices of row `i`, ascending.
    pub fn row(&self, i: usize) -> &[usize] {
        &self.data[i]
    }

    pub fn nnz(&self) -> usize {
        self.data.iter().map(Vec::len).sum()
    }

    /// All nonzero `(row, col)` pairs, row-major.
    pub fn nonzero(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.data
            .iter()
            .enumerate()
            .flat_map(|(i, row)| row.iter().map(move |&j| (i, j)))
    }

    fn assert_same_shape(&self, other: &BoolMatrix) {
        assert_eq!(
            (self.rows, self.cols),
            (other.rows, other.cols),
            "shape mismatch in elementwise op: {:?} vs {:?}",
            (self.rows, self.cols),
            (other.rows, other.cols)
        );
    }

    /// Elementwise OR; `self` and `other` must share a shape.
    pub fn add(&self, other: &BoolMatrix) -> BoolMatrix {
        self.assert_same_shape(other);
        let mut out = self.clone();
        out.or_assign(other);
        out
    }

    /// In-place elementwise OR; `self` and `other` must share a shape.
    pub fn or_assign(&mut self, other: &BoolMatrix) {
        self.assert_same_shape(other);
        for (row, other_row) in self.data.iter_mut().zip(other.data.iter()) {
            if other_row.is_empty() {
                continue;
            }
            merge_sorted_into(row, other_row);
        }
    }

    /// Boolean matrix multiply: `self` is `m×k`, `other` is `k×n`, result is `m×n`.
    pub fn matmul(&self, other: &BoolMatrix) -> BoolMatrix {
        assert_eq!(
            self.cols, other.rows,
            "shape mismatch in matmul: {:?} x {:?}",
            (self.rows, self.cols),
            (other.rows, other.cols)
        );

        let mut out = BoolMatrix::new(self.rows, other.cols);
        for i in 0..self.rows {
            let mut acc: Vec<usize> = Vec::new();
            for &k in &self.data[i] {
                if other.data[k].is_empty() {
                    continue;
                }
                merge_sorted_into(&mut acc, &other.data[k]);
            }
            out.data[i] = acc;
        }
        out
    }

    /// Kronecker product: `self` is `p×q`, `other` is `r×s`, result is `(pr)×(qs)`.
    pub fn kron(&self, other: &BoolMatrix) -> BoolMatrix {
        let (p, q) = (self.rows, self.cols);
        let (r, s) = (other.rows, other.cols);
        let mut out = BoolMatrix::new(p * r, q * s);

        for (i, j) in self.nonzero() {
            for (i2, j2) in other.nonzero() {
                out.set(i * r + i2, j * s + j2);
            }
        }
        out
    }

    /// Block-diagonal sum: result is `(ra+rb)×(ca+cb)` with `self` top-left, `other`
    /// bottom-right.
    pub fn block_diag(&self, other: &BoolMatrix) -> BoolMatrix {
        let mut out = BoolMatrix::new(self.rows + other.rows, self.cols + other.cols);
        for (i, j) in self.nonzero() {
            out.set(i, j);
        }
        for (i, j) in other.nonzero() {
            out.set(self.rows + i, self.cols + j);
        }
        out
    }
}

/// Merge `src`'s sorted, deduplicated entries into `dst` (also sorted/deduplicated).
fn merge_sorted_into(dst: &mut Vec<usize>, src: &[usize]) {
    if dst.is_empty() {
        dst.extend_from_slice(src);
        return;
    }

    let mut merged = Vec::with_capacity(dst.len() + src.len());
    let (mut a, mut b) = (0, 0);
    while a < dst.len() && b < src.len() {
        match dst[a].cmp(&src[b]) {
            std::cmp::Ordering::Less => {
                merged.push(dst[a]);
                a += 1;
            }
            std::cmp::Ordering::Greater => {
                merged.push(src[b]);
                b += 1;
            }
            std::cmp::Ordering::Equal => {
                merged.push(dst[a]);
                a += 1;
                b += 1;
            }
        }
    }
    merged.extend_from_slice(&dst[a..]);
    merged.extend_from_slice(&src[b..]);
    *dst = merged;
}
