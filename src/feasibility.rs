//! Feasibility residual of a constrained program.
//!
//! Given an equality-constrained model `c(x) = b, lvar <= x <= uvar`,
//! [`FeasibilityResidual`] is the bound-constrained least-squares model
//!
//! ```text
//! minimize 1/2 ||F(x)||^2,  F(x) = c(x) - b,  lvar <= x <= uvar
//! ```
//!
//! Models with inequality rows are first passed through the slack
//! reformulation, so `F` measures the violation of `c(x) - s = 0` with the
//! slacks bounded by the original constraint bounds.

use log::{debug, trace};

use crate::blas::{unit_vector, vector_add_scaled, vector_dot_product, vector_scale};
use crate::counters::{Counters, EvalKind};
use crate::error::{ModelError, Result, ensure_len};
use crate::matrix::Mat;
use crate::meta::{NlpMeta, NlsMeta};
use crate::model::{Model, ModelKind, NlpModel, NlsModel};
use crate::slack::{SlackModel, SlackNlsModel};

/// Least-squares view of the constraints of a model.
///
/// The wrapped model is owned and dropped with the adapter. Evaluations reuse
/// three internal buffers, hence `&mut self` on every call.
pub struct FeasibilityResidual {
    meta: NlpMeta,
    nls_meta: NlsMeta,
    counters: Counters,
    model: Model,
    /// Residual-space buffer (len nequ).
    fx: Vec<f64>,
    /// Variable-space buffer (len nvar).
    gx: Vec<f64>,
    /// Constraint-space buffer (len nequ).
    cx: Vec<f64>,
}

impl FeasibilityResidual {
    /// Wraps `model`, named `"<model name>-feasres"`.
    pub fn new(model: Model) -> Result<Self> {
        Self::build(model, None)
    }

    pub fn with_name(model: Model, name: impl Into<String>) -> Result<Self> {
        Self::build(model, Some(name.into()))
    }

    fn build(model: Model, name: Option<String>) -> Result<Self> {
        let meta = model.meta();
        if meta.is_unconstrained() {
            return Err(ModelError::Configuration(format!(
                "a feasibility residual requires constraints, but {} has none",
                meta.name
            )));
        }

        if !meta.is_equality_constrained() {
            debug!(
                "{} has {} non-equality constraints, introducing slack variables",
                meta.name,
                meta.ncon - meta.rows.fixed.len()
            );
            let model = match model {
                Model::Plain(inner) => Model::plain(SlackModel::new(inner)?),
                Model::LeastSquares(inner) => Model::least_squares(SlackNlsModel::new(inner)?),
            };
            return Self::build(model, name);
        }

        let nvar = meta.nvar;
        let nequ = meta.ncon;
        let name = name.unwrap_or_else(|| format!("{}-feasres", meta.name));
        let outer = NlpMeta::new(meta.x0.clone())
            .with_name(name)
            .with_bounds(meta.lvar.clone(), meta.uvar.clone())?
            .with_minimize(true);
        let nls_meta = NlsMeta::new(nequ, meta.x0.clone())
            .with_nnzj(meta.nnzj)
            .with_nnzh(meta.nnzh)
            .with_lin(meta.lin.clone());

        debug!(
            "feasibility residual {}: nvar {}, nequ {}, nnzj {}, nnzh {}",
            outer.name, nvar, nequ, nls_meta.nnzj, nls_meta.nnzh
        );

        Ok(Self {
            meta: outer,
            nls_meta,
            counters: Counters::new(),
            model,
            fx: vec![0.0; nequ],
            gx: vec![0.0; nvar],
            cx: vec![0.0; nequ],
        })
    }

    /// The wrapped equality-constrained model.
    pub fn inner(&self) -> &dyn NlpModel {
        self.model.as_nlp()
    }

    /// Whether the wrapped model is a plain program or a least-squares model.
    pub fn inner_kind(&self) -> ModelKind {
        self.model.kind()
    }

    pub fn into_inner(self) -> Model {
        self.model
    }

    /// Right-hand side `b` of the wrapped equalities `c(x) = b`.
    pub fn rhs(&self) -> &[f64] {
        &self.model.meta().lcon
    }

    /// `fx <- c(x) - b` through the wrapped model, without touching counters.
    fn eval_residual(model: &mut Model, x: &[f64], fx: &mut [f64]) -> Result<()> {
        let nlp = model.as_nlp_mut();
        nlp.cons(x, fx)?;
        for (f_i, b_i) in fx.iter_mut().zip(&nlp.meta().lcon) {
            *f_i -= b_i;
        }
        Ok(())
    }

    fn check_row(&self, context: &'static str, i: usize) -> Result<()> {
        if i < self.nls_meta.nequ {
            Ok(())
        } else {
            Err(ModelError::IndexOutOfRange {
                context,
                index: i,
                len: self.nls_meta.nequ,
            })
        }
    }

    /// Objective Hessian-vector product with caller-owned scratch space.
    ///
    /// `jv` must hold nequ entries and `hv_partial` nvar entries; both are
    /// overwritten. The result is
    /// `obj_weight * (J^T J v + sum_i c_i(x) Hess c_i(x) v)`.
    pub fn hprod_with_workspace(
        &mut self,
        x: &[f64],
        v: &[f64],
        obj_weight: f64,
        hv: &mut [f64],
        jv: &mut [f64],
        hv_partial: &mut [f64],
    ) -> Result<()> {
        self.counters.increment(EvalKind::Hprod);
        objective_hprod(
            self.model.as_nlp_mut(),
            x,
            v,
            obj_weight,
            hv,
            jv,
            hv_partial,
        )
    }

    /// Objective value and gradient in one pass over the residual.
    pub fn objgrad(&mut self, x: &[f64], g: &mut [f64]) -> Result<f64> {
        self.counters.increment(EvalKind::Obj);
        self.counters.increment(EvalKind::Grad);
        Self::eval_residual(&mut self.model, x, &mut self.fx)?;
        self.model.as_nlp_mut().jtprod(x, &self.fx, g)?;
        Ok(0.5 * vector_dot_product(self.fx.len(), &self.fx, &self.fx))
    }
}

/// `hv <- obj_weight * (J^T J v + sum_i c_i(x) Hess c_i(x) v)`
///
/// `jv` first holds `J v`, then `c(x)`.
fn objective_hprod(
    model: &mut dyn NlpModel,
    x: &[f64],
    v: &[f64],
    obj_weight: f64,
    hv: &mut [f64],
    jv: &mut [f64],
    hv_partial: &mut [f64],
) -> Result<()> {
    let nvar = model.meta().nvar;
    ensure_len("feasibility residual hprod", nvar, hv.len())?;
    ensure_len("feasibility residual hprod workspace", nvar, hv_partial.len())?;

    model.jprod(x, v, jv)?;
    model.jtprod(x, jv, hv)?;
    model.cons(x, jv)?;
    model.hprod(x, jv, v, 0.0, hv_partial)?;

    vector_add_scaled(nvar, 1.0, hv_partial, hv);
    vector_scale(nvar, obj_weight, hv);
    Ok(())
}

impl std::fmt::Debug for FeasibilityResidual {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FeasibilityResidual")
            .field("name", &self.meta.name)
            .field("nvar", &self.meta.nvar)
            .field("nequ", &self.nls_meta.nequ)
            .field("model", &self.model)
            .field("counters", &self.counters)
            .finish()
    }
}

impl NlpModel for FeasibilityResidual {
    fn meta(&self) -> &NlpMeta {
        &self.meta
    }

    fn counters(&self) -> &Counters {
        &self.counters
    }

    fn counters_mut(&mut self) -> &mut Counters {
        &mut self.counters
    }

    fn kind(&self) -> ModelKind {
        ModelKind::LeastSquares
    }

    fn obj(&mut self, x: &[f64]) -> Result<f64> {
        self.counters.increment(EvalKind::Obj);
        Self::eval_residual(&mut self.model, x, &mut self.fx)?;
        Ok(0.5 * vector_dot_product(self.fx.len(), &self.fx, &self.fx))
    }

    fn grad(&mut self, x: &[f64], g: &mut [f64]) -> Result<()> {
        self.counters.increment(EvalKind::Grad);
        Self::eval_residual(&mut self.model, x, &mut self.fx)?;
        self.model.as_nlp_mut().jtprod(x, &self.fx, g)
    }

    fn cons(&mut self, _x: &[f64], c: &mut [f64]) -> Result<()> {
        self.counters.increment(EvalKind::Cons);
        ensure_len("feasibility residual cons", 0, c.len())
    }

    fn jac_structure(&self, rows: &mut [usize], cols: &mut [usize]) -> Result<()> {
        ensure_len("feasibility residual jac_structure rows", 0, rows.len())?;
        ensure_len("feasibility residual jac_structure cols", 0, cols.len())
    }

    fn jac_coord(&mut self, _x: &[f64], vals: &mut [f64]) -> Result<()> {
        self.counters.increment(EvalKind::Jac);
        ensure_len("feasibility residual jac_coord", 0, vals.len())
    }

    fn jprod(&mut self, _x: &[f64], _v: &[f64], jv: &mut [f64]) -> Result<()> {
        self.counters.increment(EvalKind::Jprod);
        ensure_len("feasibility residual jprod", 0, jv.len())
    }

    fn jtprod(&mut self, _x: &[f64], w: &[f64], jtw: &mut [f64]) -> Result<()> {
        self.counters.increment(EvalKind::Jtprod);
        ensure_len("feasibility residual jtprod w", 0, w.len())?;
        ensure_len("feasibility residual jtprod", self.meta.nvar, jtw.len())?;
        jtw.iter_mut().for_each(|v| *v = 0.0);
        Ok(())
    }

    fn hess_structure(&self, _rows: &mut [usize], _cols: &mut [usize]) -> Result<()> {
        Err(ModelError::UnsupportedOperation(
            "sparse structure of the feasibility objective Hessian is not available; \
             use hess_structure_residual, or hess / hprod for the objective"
                .to_string(),
        ))
    }

    fn hess_coord(
        &mut self,
        _x: &[f64],
        _y: &[f64],
        _obj_weight: f64,
        _vals: &mut [f64],
    ) -> Result<()> {
        Err(ModelError::UnsupportedOperation(
            "sparse coordinates of the feasibility objective Hessian are not available; \
             use hess_coord_residual, or hess / hprod for the objective"
                .to_string(),
        ))
    }

    /// Lower triangle of `obj_weight * (J^T J + sum_i c_i(x) Hess c_i(x))`.
    ///
    /// The constraint Hessians are weighted by the raw constraint values
    /// `c(x)`, not by the shifted residual `c(x) - b`.
    fn hess(&mut self, x: &[f64], y: &[f64], obj_weight: f64) -> Result<Mat> {
        self.counters.increment(EvalKind::Hess);
        ensure_len("feasibility residual hess y", 0, y.len())?;

        let nlp = self.model.as_nlp_mut();
        nlp.cons(x, &mut self.cx)?;
        let jac = nlp.jac(x)?;
        let mut hess = jac.gram_lower();
        let weighted = nlp.hess(x, &self.cx, 0.0)?;
        hess.add_lower(&weighted);
        hess.scale(obj_weight);
        trace!("feasibility residual hess assembled, nvar {}", hess.cols());
        Ok(hess)
    }

    fn hprod(
        &mut self,
        x: &[f64],
        y: &[f64],
        v: &[f64],
        obj_weight: f64,
        hv: &mut [f64],
    ) -> Result<()> {
        self.counters.increment(EvalKind::Hprod);
        ensure_len("feasibility residual hprod y", 0, y.len())?;
        objective_hprod(
            self.model.as_nlp_mut(),
            x,
            v,
            obj_weight,
            hv,
            &mut self.cx,
            &mut self.gx,
        )
    }
}

impl NlsModel for FeasibilityResidual {
    fn nls_meta(&self) -> &NlsMeta {
        &self.nls_meta
    }

    fn residual(&mut self, x: &[f64], fx: &mut [f64]) -> Result<()> {
        self.counters.increment(EvalKind::Residual);
        Self::eval_residual(&mut self.model, x, fx)
    }

    fn jac_structure_residual(&self, rows: &mut [usize], cols: &mut [usize]) -> Result<()> {
        self.model.as_nlp().jac_structure(rows, cols)
    }

    fn jac_coord_residual(&mut self, x: &[f64], vals: &mut [f64]) -> Result<()> {
        self.counters.increment(EvalKind::JacResidual);
        self.model.as_nlp_mut().jac_coord(x, vals)
    }

    fn jac_residual(&mut self, x: &[f64]) -> Result<Mat> {
        self.counters.increment(EvalKind::JacResidual);
        self.model.as_nlp_mut().jac(x)
    }

    fn jprod_residual(&mut self, x: &[f64], v: &[f64], jv: &mut [f64]) -> Result<()> {
        self.counters.increment(EvalKind::JprodResidual);
        self.model.as_nlp_mut().jprod(x, v, jv)
    }

    fn jtprod_residual(&mut self, x: &[f64], w: &[f64], jtw: &mut [f64]) -> Result<()> {
        self.counters.increment(EvalKind::JtprodResidual);
        self.model.as_nlp_mut().jtprod(x, w, jtw)
    }

    fn hess_structure_residual(&self, rows: &mut [usize], cols: &mut [usize]) -> Result<()> {
        self.model.as_nlp().hess_structure(rows, cols)
    }

    fn hess_coord_residual(&mut self, x: &[f64], v: &[f64], vals: &mut [f64]) -> Result<()> {
        self.counters.increment(EvalKind::HessResidual);
        self.model.as_nlp_mut().hess_coord(x, v, 0.0, vals)
    }

    fn hess_residual(&mut self, x: &[f64], v: &[f64]) -> Result<Mat> {
        self.counters.increment(EvalKind::HessResidual);
        self.model.as_nlp_mut().hess(x, v, 0.0)
    }

    fn jth_hess_residual(&mut self, x: &[f64], i: usize) -> Result<Mat> {
        self.counters.increment(EvalKind::JhessResidual);
        self.check_row("jth_hess_residual", i)?;
        unit_vector(i, &mut self.fx);
        self.model.as_nlp_mut().hess(x, &self.fx, 0.0)
    }

    fn hprod_residual(&mut self, x: &[f64], i: usize, v: &[f64], hv: &mut [f64]) -> Result<()> {
        self.counters.increment(EvalKind::HprodResidual);
        self.check_row("hprod_residual", i)?;
        unit_vector(i, &mut self.fx);
        self.model.as_nlp_mut().hprod(x, &self.fx, v, 0.0, hv)
    }
}
