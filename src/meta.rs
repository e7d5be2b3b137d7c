//! Problem metadata.
//!
//! [`NlpMeta`] describes a general nonlinear program
//!
//! ```text
//! minimize f(x)  subject to  lcon <= c(x) <= ucon,  lvar <= x <= uvar
//! ```
//!
//! and classifies every constraint row and variable by which of its bounds
//! are finite. [`NlsMeta`] describes the residual space of a least-squares
//! problem `minimize 1/2 ||F(x)||^2`.

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result, ensure_len};

/// Index sets of rows (or variables) grouped by bound type.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BoundClasses {
    /// lower == upper
    pub fixed: Vec<usize>,
    /// finite lower, infinite upper
    pub lower: Vec<usize>,
    /// infinite lower, finite upper
    pub upper: Vec<usize>,
    /// both finite and different
    pub range: Vec<usize>,
    /// both infinite
    pub free: Vec<usize>,
}

impl BoundClasses {
    fn classify(context: &'static str, lower: &[f64], upper: &[f64]) -> Result<Self> {
        let mut classes = Self::default();
        for (i, (&l, &u)) in lower.iter().zip(upper).enumerate() {
            if l > u {
                return Err(ModelError::InvalidBounds {
                    context,
                    index: i,
                    lower: l,
                    upper: u,
                });
            }
            let bucket = match (l.is_finite(), u.is_finite()) {
                _ if l == u => &mut classes.fixed,
                (true, false) => &mut classes.lower,
                (false, true) => &mut classes.upper,
                (true, true) => &mut classes.range,
                (false, false) => &mut classes.free,
            };
            bucket.push(i);
        }
        Ok(classes)
    }
}

/// Metadata of a nonlinear program.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NlpMeta {
    pub name: String,
    pub nvar: usize,
    pub x0: Vec<f64>,
    pub lvar: Vec<f64>,
    pub uvar: Vec<f64>,
    pub ncon: usize,
    /// Initial multipliers.
    pub y0: Vec<f64>,
    pub lcon: Vec<f64>,
    pub ucon: Vec<f64>,
    /// Nonzeros of the constraint Jacobian.
    pub nnzj: usize,
    /// Nonzeros of the lower triangle of the Lagrangian Hessian.
    pub nnzh: usize,
    /// Linear constraint rows, sorted.
    pub lin: Vec<usize>,
    pub minimize: bool,
    /// Constraint rows grouped by bound type.
    pub rows: BoundClasses,
    /// Variables grouped by bound type.
    pub vars: BoundClasses,
}

impl NlpMeta {
    /// Unconstrained, unbounded problem starting at `x0`.
    pub fn new(x0: Vec<f64>) -> Self {
        let nvar = x0.len();
        Self {
            name: "Generic".to_string(),
            nvar,
            lvar: vec![f64::NEG_INFINITY; nvar],
            uvar: vec![f64::INFINITY; nvar],
            x0,
            ncon: 0,
            y0: Vec::new(),
            lcon: Vec::new(),
            ucon: Vec::new(),
            nnzj: 0,
            nnzh: nvar * (nvar + 1) / 2,
            lin: Vec::new(),
            minimize: true,
            rows: BoundClasses::default(),
            vars: BoundClasses {
                free: (0..nvar).collect(),
                ..BoundClasses::default()
            },
        }
    }

    pub fn with_bounds(mut self, lvar: Vec<f64>, uvar: Vec<f64>) -> Result<Self> {
        ensure_len("NlpMeta lvar", self.nvar, lvar.len())?;
        ensure_len("NlpMeta uvar", self.nvar, uvar.len())?;
        self.vars = BoundClasses::classify("variable bounds", &lvar, &uvar)?;
        self.lvar = lvar;
        self.uvar = uvar;
        Ok(self)
    }

    /// Sets the constraint bounds. Resets `y0` to zero and `nnzj` to a dense count.
    pub fn with_constraints(mut self, lcon: Vec<f64>, ucon: Vec<f64>) -> Result<Self> {
        ensure_len("NlpMeta ucon", lcon.len(), ucon.len())?;
        self.rows = BoundClasses::classify("constraint bounds", &lcon, &ucon)?;
        self.ncon = lcon.len();
        self.y0 = vec![0.0; self.ncon];
        self.nnzj = self.ncon * self.nvar;
        self.lin.retain(|&i| i < lcon.len());
        self.lcon = lcon;
        self.ucon = ucon;
        Ok(self)
    }

    pub fn with_nnzj(mut self, nnzj: usize) -> Self {
        self.nnzj = nnzj;
        self
    }

    pub fn with_nnzh(mut self, nnzh: usize) -> Self {
        self.nnzh = nnzh;
        self
    }

    pub fn with_lin(mut self, mut lin: Vec<usize>) -> Self {
        lin.sort_unstable();
        lin.dedup();
        self.lin = lin;
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_minimize(mut self, minimize: bool) -> Self {
        self.minimize = minimize;
        self
    }

    pub fn is_unconstrained(&self) -> bool {
        self.ncon == 0
    }

    /// True when there is at least one constraint and every row is an equality.
    pub fn is_equality_constrained(&self) -> bool {
        self.ncon > 0 && self.rows.fixed.len() == self.ncon
    }

    /// No general constraints, but at least one finite variable bound.
    pub fn is_bound_constrained(&self) -> bool {
        self.ncon == 0 && self.vars.free.len() < self.nvar
    }

    pub fn nlin(&self) -> usize {
        self.lin.len()
    }

    pub fn nnln(&self) -> usize {
        self.ncon - self.lin.len()
    }

    /// Nonlinear constraint rows.
    pub fn nln(&self) -> Vec<usize> {
        complement(self.ncon, &self.lin)
    }
}

/// Metadata of the residual space of a least-squares problem.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NlsMeta {
    /// Number of residuals.
    pub nequ: usize,
    pub nvar: usize,
    pub x0: Vec<f64>,
    /// Nonzeros of the residual Jacobian.
    pub nnzj: usize,
    /// Nonzeros of the lower triangle of the weighted residual Hessian.
    pub nnzh: usize,
    /// Linear residual rows, sorted.
    pub lin: Vec<usize>,
}

impl NlsMeta {
    pub fn new(nequ: usize, x0: Vec<f64>) -> Self {
        let nvar = x0.len();
        Self {
            nequ,
            nvar,
            x0,
            nnzj: nequ * nvar,
            nnzh: nvar * (nvar + 1) / 2,
            lin: Vec::new(),
        }
    }

    pub fn with_nnzj(mut self, nnzj: usize) -> Self {
        self.nnzj = nnzj;
        self
    }

    pub fn with_nnzh(mut self, nnzh: usize) -> Self {
        self.nnzh = nnzh;
        self
    }

    pub fn with_lin(mut self, mut lin: Vec<usize>) -> Self {
        lin.sort_unstable();
        lin.dedup();
        lin.retain(|&i| i < self.nequ);
        self.lin = lin;
        self
    }

    /// Nonlinear residual rows.
    pub fn nln(&self) -> Vec<usize> {
        complement(self.nequ, &self.lin)
    }
}

fn complement(len: usize, sorted: &[usize]) -> Vec<usize> {
    (0..len).filter(|i| sorted.binary_search(i).is_err()).collect()
}
