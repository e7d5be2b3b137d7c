//! Slack reformulation of general constraints.
//!
//! Every constraint row `r` that is not an equality gets a slack variable
//! `s_k`, appended after the original variables:
//!
//! ```text
//! lcon_r <= c_r(x) <= ucon_r   becomes   c_r(x) - s_k = 0,  lcon_r <= s_k <= ucon_r
//! ```
//!
//! Equality rows are left untouched, so the transformed model is always
//! equality-constrained. Objective and Hessians do not depend on the slacks.

use log::debug;

use crate::counters::Counters;
use crate::error::{Result, ensure_len};
use crate::matrix::Mat;
use crate::meta::{NlpMeta, NlsMeta};
use crate::model::{ModelKind, NlpModel, NlsModel};

/// Index bookkeeping shared by [`SlackModel`] and [`SlackNlsModel`].
#[derive(Debug, Clone)]
struct SlackLayout {
    /// Number of original variables.
    n: usize,
    /// Constraint row of each slack, ascending.
    slack_rows: Vec<usize>,
    /// Jacobian nonzeros of the original model.
    nnzj: usize,
    meta: NlpMeta,
}

impl SlackLayout {
    fn new(inner: &NlpMeta) -> Result<Self> {
        let slack_rows: Vec<usize> = (0..inner.ncon)
            .filter(|&r| inner.lcon[r] != inner.ucon[r])
            .collect();
        let n = inner.nvar;
        let ns = slack_rows.len();

        let mut x0 = inner.x0.clone();
        x0.resize(n + ns, 0.0);
        let mut lvar = inner.lvar.clone();
        let mut uvar = inner.uvar.clone();
        lvar.extend(slack_rows.iter().map(|&r| inner.lcon[r]));
        uvar.extend(slack_rows.iter().map(|&r| inner.ucon[r]));

        let mut lcon = inner.lcon.clone();
        let mut ucon = inner.ucon.clone();
        for &r in &slack_rows {
            lcon[r] = 0.0;
            ucon[r] = 0.0;
        }

        let meta = NlpMeta::new(x0)
            .with_name(format!("{}-slack", inner.name))
            .with_bounds(lvar, uvar)?
            .with_constraints(lcon, ucon)?
            .with_nnzj(inner.nnzj + ns)
            .with_nnzh(inner.nnzh)
            .with_lin(inner.lin.clone())
            .with_minimize(inner.minimize);

        debug!(
            "slack reformulation of {}: {} slack variables, nvar {} -> {}",
            inner.name,
            ns,
            n,
            n + ns
        );

        Ok(Self {
            n,
            slack_rows,
            nnzj: inner.nnzj,
            meta,
        })
    }

    fn nvar(&self) -> usize {
        self.meta.nvar
    }

    fn check_x(&self, x: &[f64]) -> Result<()> {
        ensure_len("slack model x", self.nvar(), x.len())
    }

    fn obj(&self, inner: &mut dyn NlpModel, x: &[f64]) -> Result<f64> {
        self.check_x(x)?;
        inner.obj(&x[..self.n])
    }

    fn grad(&self, inner: &mut dyn NlpModel, x: &[f64], g: &mut [f64]) -> Result<()> {
        self.check_x(x)?;
        ensure_len("slack model grad", self.nvar(), g.len())?;
        inner.grad(&x[..self.n], &mut g[..self.n])?;
        g[self.n..].iter_mut().for_each(|g_k| *g_k = 0.0);
        Ok(())
    }

    fn cons(&self, inner: &mut dyn NlpModel, x: &[f64], c: &mut [f64]) -> Result<()> {
        self.check_x(x)?;
        inner.cons(&x[..self.n], c)?;
        for (k, &r) in self.slack_rows.iter().enumerate() {
            c[r] -= x[self.n + k];
        }
        Ok(())
    }

    fn jac_structure(
        &self,
        inner: &dyn NlpModel,
        rows: &mut [usize],
        cols: &mut [usize],
    ) -> Result<()> {
        ensure_len("slack model jac_structure rows", self.meta.nnzj, rows.len())?;
        ensure_len("slack model jac_structure cols", self.meta.nnzj, cols.len())?;
        inner.jac_structure(&mut rows[..self.nnzj], &mut cols[..self.nnzj])?;
        for (k, &r) in self.slack_rows.iter().enumerate() {
            rows[self.nnzj + k] = r;
            cols[self.nnzj + k] = self.n + k;
        }
        Ok(())
    }

    fn jac_coord(&self, inner: &mut dyn NlpModel, x: &[f64], vals: &mut [f64]) -> Result<()> {
        self.check_x(x)?;
        ensure_len("slack model jac_coord", self.meta.nnzj, vals.len())?;
        inner.jac_coord(&x[..self.n], &mut vals[..self.nnzj])?;
        vals[self.nnzj..].iter_mut().for_each(|v| *v = -1.0);
        Ok(())
    }

    fn jac(&self, inner: &mut dyn NlpModel, x: &[f64]) -> Result<Mat> {
        self.check_x(x)?;
        let mut jac = inner.jac(&x[..self.n])?.padded(self.meta.ncon, self.nvar());
        for (k, &r) in self.slack_rows.iter().enumerate() {
            jac[(r, self.n + k)] = -1.0;
        }
        Ok(jac)
    }

    fn jprod(&self, inner: &mut dyn NlpModel, x: &[f64], v: &[f64], jv: &mut [f64]) -> Result<()> {
        self.check_x(x)?;
        ensure_len("slack model jprod v", self.nvar(), v.len())?;
        inner.jprod(&x[..self.n], &v[..self.n], jv)?;
        for (k, &r) in self.slack_rows.iter().enumerate() {
            jv[r] -= v[self.n + k];
        }
        Ok(())
    }

    fn jtprod(
        &self,
        inner: &mut dyn NlpModel,
        x: &[f64],
        w: &[f64],
        jtw: &mut [f64],
    ) -> Result<()> {
        self.check_x(x)?;
        ensure_len("slack model jtprod", self.nvar(), jtw.len())?;
        inner.jtprod(&x[..self.n], w, &mut jtw[..self.n])?;
        for (k, &r) in self.slack_rows.iter().enumerate() {
            jtw[self.n + k] = -w[r];
        }
        Ok(())
    }

    fn hess_coord(
        &self,
        inner: &mut dyn NlpModel,
        x: &[f64],
        y: &[f64],
        obj_weight: f64,
        vals: &mut [f64],
    ) -> Result<()> {
        self.check_x(x)?;
        inner.hess_coord(&x[..self.n], y, obj_weight, vals)
    }

    fn hess(&self, inner: &mut dyn NlpModel, x: &[f64], y: &[f64], obj_weight: f64) -> Result<Mat> {
        self.check_x(x)?;
        let hess = inner.hess(&x[..self.n], y, obj_weight)?;
        Ok(hess.padded(self.nvar(), self.nvar()))
    }

    fn hprod(
        &self,
        inner: &mut dyn NlpModel,
        x: &[f64],
        y: &[f64],
        v: &[f64],
        obj_weight: f64,
        hv: &mut [f64],
    ) -> Result<()> {
        self.check_x(x)?;
        ensure_len("slack model hprod v", self.nvar(), v.len())?;
        ensure_len("slack model hprod", self.nvar(), hv.len())?;
        inner.hprod(&x[..self.n], y, &v[..self.n], obj_weight, &mut hv[..self.n])?;
        hv[self.n..].iter_mut().for_each(|h| *h = 0.0);
        Ok(())
    }
}

/// Slack reformulation of a plain model.
///
/// Counters are shared with the wrapped model.
pub struct SlackModel {
    inner: Box<dyn NlpModel>,
    layout: SlackLayout,
}

impl SlackModel {
    pub fn new(inner: Box<dyn NlpModel>) -> Result<Self> {
        let layout = SlackLayout::new(inner.meta())?;
        Ok(Self { inner, layout })
    }

    /// Number of slack variables.
    pub fn num_slacks(&self) -> usize {
        self.layout.slack_rows.len()
    }

    /// Constraint row of each slack variable.
    pub fn slack_rows(&self) -> &[usize] {
        &self.layout.slack_rows
    }

    pub fn inner(&self) -> &dyn NlpModel {
        &*self.inner
    }

    pub fn into_inner(self) -> Box<dyn NlpModel> {
        self.inner
    }
}

/// Slack reformulation of a least-squares model.
///
/// The residual interface of the wrapped model is kept; slacks do not enter
/// the residual, so their Jacobian columns and Hessian blocks are zero.
pub struct SlackNlsModel {
    inner: Box<dyn NlsModel>,
    layout: SlackLayout,
    nls_meta: NlsMeta,
}

impl SlackNlsModel {
    pub fn new(inner: Box<dyn NlsModel>) -> Result<Self> {
        let layout = SlackLayout::new(inner.meta())?;
        let inner_nls = inner.nls_meta();
        let nls_meta = NlsMeta::new(inner_nls.nequ, layout.meta.x0.clone())
            .with_nnzj(inner_nls.nnzj)
            .with_nnzh(inner_nls.nnzh)
            .with_lin(inner_nls.lin.clone());
        Ok(Self {
            inner,
            layout,
            nls_meta,
        })
    }

    pub fn num_slacks(&self) -> usize {
        self.layout.slack_rows.len()
    }

    pub fn slack_rows(&self) -> &[usize] {
        &self.layout.slack_rows
    }

    pub fn inner(&self) -> &dyn NlsModel {
        &*self.inner
    }

    pub fn into_inner(self) -> Box<dyn NlsModel> {
        self.inner
    }
}

macro_rules! impl_slack_nlp_model {
    ($ty:ty, $kind:expr) => {
        impl NlpModel for $ty {
            fn meta(&self) -> &NlpMeta {
                &self.layout.meta
            }

            fn counters(&self) -> &Counters {
                self.inner.counters()
            }

            fn counters_mut(&mut self) -> &mut Counters {
                self.inner.counters_mut()
            }

            fn kind(&self) -> ModelKind {
                $kind
            }

            fn obj(&mut self, x: &[f64]) -> Result<f64> {
                self.layout.obj(&mut *self.inner, x)
            }

            fn grad(&mut self, x: &[f64], g: &mut [f64]) -> Result<()> {
                self.layout.grad(&mut *self.inner, x, g)
            }

            fn cons(&mut self, x: &[f64], c: &mut [f64]) -> Result<()> {
                self.layout.cons(&mut *self.inner, x, c)
            }

            fn jac_structure(&self, rows: &mut [usize], cols: &mut [usize]) -> Result<()> {
                self.layout.jac_structure(&*self.inner, rows, cols)
            }

            fn jac_coord(&mut self, x: &[f64], vals: &mut [f64]) -> Result<()> {
                self.layout.jac_coord(&mut *self.inner, x, vals)
            }

            fn jac(&mut self, x: &[f64]) -> Result<Mat> {
                self.layout.jac(&mut *self.inner, x)
            }

            fn jprod(&mut self, x: &[f64], v: &[f64], jv: &mut [f64]) -> Result<()> {
                self.layout.jprod(&mut *self.inner, x, v, jv)
            }

            fn jtprod(&mut self, x: &[f64], w: &[f64], jtw: &mut [f64]) -> Result<()> {
                self.layout.jtprod(&mut *self.inner, x, w, jtw)
            }

            fn hess_structure(&self, rows: &mut [usize], cols: &mut [usize]) -> Result<()> {
                self.inner.hess_structure(rows, cols)
            }

            fn hess_coord(
                &mut self,
                x: &[f64],
                y: &[f64],
                obj_weight: f64,
                vals: &mut [f64],
            ) -> Result<()> {
                self.layout.hess_coord(&mut *self.inner, x, y, obj_weight, vals)
            }

            fn hess(&mut self, x: &[f64], y: &[f64], obj_weight: f64) -> Result<Mat> {
                self.layout.hess(&mut *self.inner, x, y, obj_weight)
            }

            fn hprod(
                &mut self,
                x: &[f64],
                y: &[f64],
                v: &[f64],
                obj_weight: f64,
                hv: &mut [f64],
            ) -> Result<()> {
                self.layout.hprod(&mut *self.inner, x, y, v, obj_weight, hv)
            }
        }
    };
}

impl_slack_nlp_model!(SlackModel, ModelKind::Plain);
impl_slack_nlp_model!(SlackNlsModel, ModelKind::LeastSquares);

impl NlsModel for SlackNlsModel {
    fn nls_meta(&self) -> &NlsMeta {
        &self.nls_meta
    }

    fn residual(&mut self, x: &[f64], fx: &mut [f64]) -> Result<()> {
        self.layout.check_x(x)?;
        self.inner.residual(&x[..self.layout.n], fx)
    }

    fn jac_structure_residual(&self, rows: &mut [usize], cols: &mut [usize]) -> Result<()> {
        self.inner.jac_structure_residual(rows, cols)
    }

    fn jac_coord_residual(&mut self, x: &[f64], vals: &mut [f64]) -> Result<()> {
        self.layout.check_x(x)?;
        self.inner.jac_coord_residual(&x[..self.layout.n], vals)
    }

    fn jac_residual(&mut self, x: &[f64]) -> Result<Mat> {
        self.layout.check_x(x)?;
        let jac = self.inner.jac_residual(&x[..self.layout.n])?;
        Ok(jac.padded(self.nls_meta.nequ, self.layout.nvar()))
    }

    fn jprod_residual(&mut self, x: &[f64], v: &[f64], jv: &mut [f64]) -> Result<()> {
        let n = self.layout.n;
        self.layout.check_x(x)?;
        ensure_len("slack model jprod_residual v", self.layout.nvar(), v.len())?;
        self.inner.jprod_residual(&x[..n], &v[..n], jv)
    }

    fn jtprod_residual(&mut self, x: &[f64], w: &[f64], jtw: &mut [f64]) -> Result<()> {
        let n = self.layout.n;
        self.layout.check_x(x)?;
        ensure_len("slack model jtprod_residual", self.layout.nvar(), jtw.len())?;
        self.inner.jtprod_residual(&x[..n], w, &mut jtw[..n])?;
        jtw[n..].iter_mut().for_each(|v| *v = 0.0);
        Ok(())
    }

    fn hess_structure_residual(&self, rows: &mut [usize], cols: &mut [usize]) -> Result<()> {
        self.inner.hess_structure_residual(rows, cols)
    }

    fn hess_coord_residual(&mut self, x: &[f64], v: &[f64], vals: &mut [f64]) -> Result<()> {
        self.layout.check_x(x)?;
        self.inner.hess_coord_residual(&x[..self.layout.n], v, vals)
    }

    fn hess_residual(&mut self, x: &[f64], v: &[f64]) -> Result<Mat> {
        let nvar = self.layout.nvar();
        self.layout.check_x(x)?;
        let hess = self.inner.hess_residual(&x[..self.layout.n], v)?;
        Ok(hess.padded(nvar, nvar))
    }

    fn jth_hess_residual(&mut self, x: &[f64], i: usize) -> Result<Mat> {
        let nvar = self.layout.nvar();
        self.layout.check_x(x)?;
        let hess = self.inner.jth_hess_residual(&x[..self.layout.n], i)?;
        Ok(hess.padded(nvar, nvar))
    }

    fn hprod_residual(&mut self, x: &[f64], i: usize, v: &[f64], hv: &mut [f64]) -> Result<()> {
        let n = self.layout.n;
        self.layout.check_x(x)?;
        ensure_len("slack model hprod_residual v", self.layout.nvar(), v.len())?;
        ensure_len("slack model hprod_residual", self.layout.nvar(), hv.len())?;
        self.inner
            .hprod_residual(&x[..n], i, &v[..n], &mut hv[..n])?;
        hv[n..].iter_mut().for_each(|h| *h = 0.0);
        Ok(())
    }
}
