//! Model interfaces.
//!
//! Every evaluation takes `&mut self`: models count their evaluations and may
//! reuse internal buffers, so one instance serves one caller at a time.
//!
//! Sparse structures use zero-based `(row, col)` coordinates. Hessian
//! structures list the lower triangle only, and dense Hessians come back as an
//! `n x n` [`Mat`] whose strict upper triangle is zero.

use crate::counters::Counters;
use crate::error::Result;
use crate::matrix::Mat;
use crate::meta::{NlpMeta, NlsMeta};

/// Whether a model also exposes the least-squares residual interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelKind {
    Plain,
    LeastSquares,
}

/// A nonlinear program `min f(x) s.t. lcon <= c(x) <= ucon, lvar <= x <= uvar`.
pub trait NlpModel {
    fn meta(&self) -> &NlpMeta;

    fn counters(&self) -> &Counters;

    fn counters_mut(&mut self) -> &mut Counters;

    fn reset_counters(&mut self) {
        self.counters_mut().reset();
    }

    fn kind(&self) -> ModelKind {
        ModelKind::Plain
    }

    /// Objective value f(x).
    fn obj(&mut self, x: &[f64]) -> Result<f64>;

    /// Objective gradient, written into `g` (len nvar).
    fn grad(&mut self, x: &[f64], g: &mut [f64]) -> Result<()>;

    /// Constraint values, written into `c` (len ncon).
    fn cons(&mut self, x: &[f64], c: &mut [f64]) -> Result<()>;

    /// Sparsity pattern of the constraint Jacobian (len nnzj each).
    fn jac_structure(&self, rows: &mut [usize], cols: &mut [usize]) -> Result<()>;

    /// Values of the constraint Jacobian matching [`NlpModel::jac_structure`].
    fn jac_coord(&mut self, x: &[f64], vals: &mut [f64]) -> Result<()>;

    /// Dense constraint Jacobian, `ncon x nvar`.
    fn jac(&mut self, x: &[f64]) -> Result<Mat> {
        let (ncon, nvar, nnzj) = (self.meta().ncon, self.meta().nvar, self.meta().nnzj);
        let mut rows = vec![0; nnzj];
        let mut cols = vec![0; nnzj];
        self.jac_structure(&mut rows, &mut cols)?;
        let mut vals = vec![0.0; nnzj];
        self.jac_coord(x, &mut vals)?;
        Ok(Mat::from_coord(ncon, nvar, &rows, &cols, &vals))
    }

    /// jv = J(x) v
    fn jprod(&mut self, x: &[f64], v: &[f64], jv: &mut [f64]) -> Result<()>;

    /// jtw = J(x)^T w
    fn jtprod(&mut self, x: &[f64], w: &[f64], jtw: &mut [f64]) -> Result<()>;

    /// Sparsity pattern of the lower triangle of the Lagrangian Hessian (len nnzh each).
    fn hess_structure(&self, rows: &mut [usize], cols: &mut [usize]) -> Result<()>;

    /// Values of `obj_weight * Hess f(x) + sum_i y_i Hess c_i(x)` matching
    /// [`NlpModel::hess_structure`].
    fn hess_coord(&mut self, x: &[f64], y: &[f64], obj_weight: f64, vals: &mut [f64])
    -> Result<()>;

    /// Dense lower triangle of `obj_weight * Hess f(x) + sum_i y_i Hess c_i(x)`.
    fn hess(&mut self, x: &[f64], y: &[f64], obj_weight: f64) -> Result<Mat> {
        let (nvar, nnzh) = (self.meta().nvar, self.meta().nnzh);
        let mut rows = vec![0; nnzh];
        let mut cols = vec![0; nnzh];
        self.hess_structure(&mut rows, &mut cols)?;
        let mut vals = vec![0.0; nnzh];
        self.hess_coord(x, y, obj_weight, &mut vals)?;
        Ok(Mat::from_coord_lower(nvar, &rows, &cols, &vals))
    }

    /// hv = (obj_weight * Hess f(x) + sum_i y_i Hess c_i(x)) v
    fn hprod(
        &mut self,
        x: &[f64],
        y: &[f64],
        v: &[f64],
        obj_weight: f64,
        hv: &mut [f64],
    ) -> Result<()>;
}

/// A least-squares model `min 1/2 ||F(x)||^2`, with the program interface of
/// [`NlpModel`] describing the same problem.
pub trait NlsModel: NlpModel {
    fn nls_meta(&self) -> &NlsMeta;

    /// Residual F(x), written into `fx` (len nequ).
    fn residual(&mut self, x: &[f64], fx: &mut [f64]) -> Result<()>;

    /// Sparsity pattern of the residual Jacobian (len nls nnzj each).
    fn jac_structure_residual(&self, rows: &mut [usize], cols: &mut [usize]) -> Result<()>;

    fn jac_coord_residual(&mut self, x: &[f64], vals: &mut [f64]) -> Result<()>;

    /// Dense residual Jacobian, `nequ x nvar`.
    fn jac_residual(&mut self, x: &[f64]) -> Result<Mat> {
        let (nequ, nvar, nnzj) = {
            let meta = self.nls_meta();
            (meta.nequ, meta.nvar, meta.nnzj)
        };
        let mut rows = vec![0; nnzj];
        let mut cols = vec![0; nnzj];
        self.jac_structure_residual(&mut rows, &mut cols)?;
        let mut vals = vec![0.0; nnzj];
        self.jac_coord_residual(x, &mut vals)?;
        Ok(Mat::from_coord(nequ, nvar, &rows, &cols, &vals))
    }

    fn jprod_residual(&mut self, x: &[f64], v: &[f64], jv: &mut [f64]) -> Result<()>;

    fn jtprod_residual(&mut self, x: &[f64], w: &[f64], jtw: &mut [f64]) -> Result<()>;

    /// Sparsity pattern of the lower triangle of `sum_i v_i Hess F_i` (len nls nnzh each).
    fn hess_structure_residual(&self, rows: &mut [usize], cols: &mut [usize]) -> Result<()>;

    fn hess_coord_residual(&mut self, x: &[f64], v: &[f64], vals: &mut [f64]) -> Result<()>;

    /// Dense lower triangle of `sum_i v_i Hess F_i(x)`.
    fn hess_residual(&mut self, x: &[f64], v: &[f64]) -> Result<Mat> {
        let (nvar, nnzh) = {
            let meta = self.nls_meta();
            (meta.nvar, meta.nnzh)
        };
        let mut rows = vec![0; nnzh];
        let mut cols = vec![0; nnzh];
        self.hess_structure_residual(&mut rows, &mut cols)?;
        let mut vals = vec![0.0; nnzh];
        self.hess_coord_residual(x, v, &mut vals)?;
        Ok(Mat::from_coord_lower(nvar, &rows, &cols, &vals))
    }

    /// Dense lower triangle of `Hess F_i(x)`.
    fn jth_hess_residual(&mut self, x: &[f64], i: usize) -> Result<Mat>;

    /// hv = Hess F_i(x) v
    fn hprod_residual(&mut self, x: &[f64], i: usize, v: &[f64], hv: &mut [f64]) -> Result<()>;
}

/// An owned model tagged with its capability.
pub enum Model {
    Plain(Box<dyn NlpModel>),
    LeastSquares(Box<dyn NlsModel>),
}

impl Model {
    pub fn plain(model: impl NlpModel + 'static) -> Self {
        Model::Plain(Box::new(model))
    }

    pub fn least_squares(model: impl NlsModel + 'static) -> Self {
        Model::LeastSquares(Box::new(model))
    }

    pub fn kind(&self) -> ModelKind {
        match self {
            Model::Plain(_) => ModelKind::Plain,
            Model::LeastSquares(_) => ModelKind::LeastSquares,
        }
    }

    pub fn meta(&self) -> &NlpMeta {
        self.as_nlp().meta()
    }

    pub fn as_nlp(&self) -> &dyn NlpModel {
        match self {
            Model::Plain(model) => &**model,
            Model::LeastSquares(model) => &**model,
        }
    }

    pub fn as_nlp_mut(&mut self) -> &mut dyn NlpModel {
        match self {
            Model::Plain(model) => &mut **model,
            Model::LeastSquares(model) => &mut **model,
        }
    }

    pub fn as_nls(&self) -> Option<&dyn NlsModel> {
        match self {
            Model::Plain(_) => None,
            Model::LeastSquares(model) => Some(&**model),
        }
    }

    pub fn as_nls_mut(&mut self) -> Option<&mut dyn NlsModel> {
        match self {
            Model::Plain(_) => None,
            Model::LeastSquares(model) => Some(&mut **model),
        }
    }
}

impl std::fmt::Debug for Model {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Model")
            .field("kind", &self.kind())
            .field("name", &self.meta().name)
            .field("nvar", &self.meta().nvar)
            .field("ncon", &self.meta().ncon)
            .finish()
    }
}
