use crate::blas::{vector_add_scaled, vector_dot_product, vector_scale};

/// Column-major Mat
///
/// Hessians are stored as symmetric matrices with only the lower triangle
/// (`i >= j`) populated; the strict upper triangle stays zero.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mat {
    pub data: Vec<f64>,
    pub m: usize,
    pub n: usize,
}

impl Mat {
    pub fn new(m: usize, n: usize) -> Self {
        Self {
            data: vec![0.0; m * n],
            m,
            n,
        }
    }

    /// Builds a row-major literal, convenient in tests and demos.
    pub fn from_rows(rows: &[&[f64]]) -> Self {
        let m = rows.len();
        let n = rows.first().map_or(0, |r| r.len());
        let mut mat = Self::new(m, n);
        for (i, row) in rows.iter().enumerate() {
            assert_eq!(row.len(), n);
            for (j, &val) in row.iter().enumerate() {
                mat[(i, j)] = val;
            }
        }
        mat
    }

    /// Dense matrix from coordinate triplets. Duplicate entries are summed.
    pub fn from_coord(m: usize, n: usize, rows: &[usize], cols: &[usize], vals: &[f64]) -> Self {
        let mut mat = Self::new(m, n);
        for ((&i, &j), &val) in rows.iter().zip(cols).zip(vals) {
            mat[(i, j)] += val;
        }
        mat
    }

    /// Lower triangle of a symmetric matrix from coordinate triplets.
    ///
    /// Entries given in the upper triangle are mirrored into the lower one.
    pub fn from_coord_lower(n: usize, rows: &[usize], cols: &[usize], vals: &[f64]) -> Self {
        let mut mat = Self::new(n, n);
        for ((&i, &j), &val) in rows.iter().zip(cols).zip(vals) {
            let (i, j) = if i >= j { (i, j) } else { (j, i) };
            mat[(i, j)] += val;
        }
        mat
    }

    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.data[j * self.m + i]
    }

    pub fn col(&self, j: usize) -> &[f64] {
        let start = j * self.m;
        &self.data[start..start + self.m]
    }

    pub fn col_mut(&mut self, j: usize) -> &mut [f64] {
        let start = j * self.m;
        &mut self.data[start..start + self.m]
    }

    pub fn scale(&mut self, alpha: f64) {
        let len = self.data.len();
        vector_scale(len, alpha, &mut self.data);
    }

    pub fn rows(&self) -> usize {
        self.m
    }

    pub fn cols(&self) -> usize {
        self.n
    }

    /// out = A * v
    pub fn mul_vec(&self, v: &[f64], out: &mut [f64]) {
        out[..self.m].iter_mut().for_each(|o| *o = 0.0);
        for j in 0..self.n {
            vector_add_scaled(self.m, v[j], self.col(j), out);
        }
    }

    /// out = A^T * w
    pub fn transpose_mul_vec(&self, w: &[f64], out: &mut [f64]) {
        for (j, o) in out[..self.n].iter_mut().enumerate() {
            *o = vector_dot_product(self.m, self.col(j), w);
        }
    }

    /// out = S * v where S is the symmetric matrix whose lower triangle is stored.
    pub fn sym_lower_mul_vec(&self, v: &[f64], out: &mut [f64]) {
        debug_assert_eq!(self.m, self.n);
        out[..self.n].iter_mut().for_each(|o| *o = 0.0);
        for j in 0..self.n {
            out[j] += self[(j, j)] * v[j];
            for i in j + 1..self.n {
                let a_ij = self[(i, j)];
                out[i] += a_ij * v[j];
                out[j] += a_ij * v[i];
            }
        }
    }

    /// Adds the lower triangle of `other` into the lower triangle of `self`.
    pub fn add_lower(&mut self, other: &Mat) {
        assert_eq!((self.m, self.n), (other.m, other.n));
        for j in 0..self.n {
            for i in j..self.m {
                self[(i, j)] += other[(i, j)];
            }
        }
    }

    /// Lower triangle of A^T * A, an `n x n` matrix.
    pub fn gram_lower(&self) -> Mat {
        let mut out = Mat::new(self.n, self.n);
        for j in 0..self.n {
            for i in j..self.n {
                out[(i, j)] = vector_dot_product(self.m, self.col(i), self.col(j));
            }
        }
        out
    }

    /// Embeds `self` as the leading block of a zero `m x n` matrix.
    pub fn padded(&self, m: usize, n: usize) -> Mat {
        assert!(m >= self.m && n >= self.n);
        let mut out = Mat::new(m, n);
        for j in 0..self.n {
            out.col_mut(j)[..self.m].copy_from_slice(self.col(j));
        }
        out
    }
}

impl std::ops::Index<(usize, usize)> for Mat {
    type Output = f64;
    fn index(&self, index: (usize, usize)) -> &f64 {
        &self.data[index.1 * self.m + index.0]
    }
}

impl std::ops::IndexMut<(usize, usize)> for Mat {
    fn index_mut(&mut self, index: (usize, usize)) -> &mut f64 {
        &mut self.data[index.1 * self.m + index.0]
    }
}

impl std::fmt::Display for Mat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for i in 0..self.m {
            for j in 0..self.n {
                write!(f, "{:10.4} ", self.get(i, j))?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
