use crate::counters::{Counters, EvalKind};
use crate::error::{Result, ensure_len};
use crate::meta::NlpMeta;
use crate::model::NlpModel;

/// Two quadratic equalities in two variables.
///
/// ```text
/// minimize (x1 - 2)^2 + (x2 - 1)^2
/// s.t.     x1^2 + x2 - shift = 1 - shift
///          x1 - x2^2         = 0
/// ```
///
/// `shift` moves a constant between the constraint function and its
/// right-hand side; the feasible set does not change.
#[derive(Debug, Clone)]
pub struct QuadraticEqualities {
    shift: f64,
    meta: NlpMeta,
    counters: Counters,
}

impl QuadraticEqualities {
    /// Right-hand side `[1, 0]`.
    pub fn new() -> Result<Self> {
        Self::with_shift(0.0)
    }

    /// `c(x) = [x1^2 + x2 - 1, x1 - x2^2]` with a zero right-hand side.
    pub fn centered() -> Result<Self> {
        Self::with_shift(1.0)
    }

    pub fn with_shift(shift: f64) -> Result<Self> {
        let rhs = vec![1.0 - shift, 0.0];
        let meta = NlpMeta::new(vec![0.5, 0.5])
            .with_constraints(rhs.clone(), rhs)?
            .with_name("quadratic_equalities")
            .with_nnzj(4)
            .with_nnzh(2);
        Ok(Self {
            shift,
            meta,
            counters: Counters::new(),
        })
    }

    fn check_x(x: &[f64]) -> Result<()> {
        ensure_len("quadratic_equalities x", 2, x.len())
    }
}

impl NlpModel for QuadraticEqualities {
    fn meta(&self) -> &NlpMeta {
        &self.meta
    }

    fn counters(&self) -> &Counters {
        &self.counters
    }

    fn counters_mut(&mut self) -> &mut Counters {
        &mut self.counters
    }

    fn obj(&mut self, x: &[f64]) -> Result<f64> {
        Self::check_x(x)?;
        self.counters.increment(EvalKind::Obj);
        Ok((x[0] - 2.0).powi(2) + (x[1] - 1.0).powi(2))
    }

    fn grad(&mut self, x: &[f64], g: &mut [f64]) -> Result<()> {
        Self::check_x(x)?;
        ensure_len("quadratic_equalities grad", 2, g.len())?;
        self.counters.increment(EvalKind::Grad);
        g[0] = 2.0 * (x[0] - 2.0);
        g[1] = 2.0 * (x[1] - 1.0);
        Ok(())
    }

    fn cons(&mut self, x: &[f64], c: &mut [f64]) -> Result<()> {
        Self::check_x(x)?;
        ensure_len("quadratic_equalities cons", 2, c.len())?;
        self.counters.increment(EvalKind::Cons);
        c[0] = x[0].powi(2) + x[1] - self.shift;
        c[1] = x[0] - x[1].powi(2);
        Ok(())
    }

    fn jac_structure(&self, rows: &mut [usize], cols: &mut [usize]) -> Result<()> {
        ensure_len("quadratic_equalities jac_structure rows", 4, rows.len())?;
        ensure_len("quadratic_equalities jac_structure cols", 4, cols.len())?;
        rows.copy_from_slice(&[0, 0, 1, 1]);
        cols.copy_from_slice(&[0, 1, 0, 1]);
        Ok(())
    }

    fn jac_coord(&mut self, x: &[f64], vals: &mut [f64]) -> Result<()> {
        Self::check_x(x)?;
        ensure_len("quadratic_equalities jac_coord", 4, vals.len())?;
        self.counters.increment(EvalKind::Jac);
        vals.copy_from_slice(&[2.0 * x[0], 1.0, 1.0, -2.0 * x[1]]);
        Ok(())
    }

    fn jprod(&mut self, x: &[f64], v: &[f64], jv: &mut [f64]) -> Result<()> {
        Self::check_x(x)?;
        ensure_len("quadratic_equalities jprod v", 2, v.len())?;
        ensure_len("quadratic_equalities jprod", 2, jv.len())?;
        self.counters.increment(EvalKind::Jprod);
        jv[0] = 2.0 * x[0] * v[0] + v[1];
        jv[1] = v[0] - 2.0 * x[1] * v[1];
        Ok(())
    }

    fn jtprod(&mut self, x: &[f64], w: &[f64], jtw: &mut [f64]) -> Result<()> {
        Self::check_x(x)?;
        ensure_len("quadratic_equalities jtprod w", 2, w.len())?;
        ensure_len("quadratic_equalities jtprod", 2, jtw.len())?;
        self.counters.increment(EvalKind::Jtprod);
        jtw[0] = 2.0 * x[0] * w[0] + w[1];
        jtw[1] = w[0] - 2.0 * x[1] * w[1];
        Ok(())
    }

    fn hess_structure(&self, rows: &mut [usize], cols: &mut [usize]) -> Result<()> {
        ensure_len("quadratic_equalities hess_structure rows", 2, rows.len())?;
        ensure_len("quadratic_equalities hess_structure cols", 2, cols.len())?;
        rows.copy_from_slice(&[0, 1]);
        cols.copy_from_slice(&[0, 1]);
        Ok(())
    }

    fn hess_coord(
        &mut self,
        x: &[f64],
        y: &[f64],
        obj_weight: f64,
        vals: &mut [f64],
    ) -> Result<()> {
        Self::check_x(x)?;
        ensure_len("quadratic_equalities hess_coord y", 2, y.len())?;
        ensure_len("quadratic_equalities hess_coord", 2, vals.len())?;
        self.counters.increment(EvalKind::Hess);
        vals[0] = 2.0 * obj_weight + 2.0 * y[0];
        vals[1] = 2.0 * obj_weight - 2.0 * y[1];
        Ok(())
    }

    fn hprod(
        &mut self,
        x: &[f64],
        y: &[f64],
        v: &[f64],
        obj_weight: f64,
        hv: &mut [f64],
    ) -> Result<()> {
        Self::check_x(x)?;
        ensure_len("quadratic_equalities hprod y", 2, y.len())?;
        ensure_len("quadratic_equalities hprod v", 2, v.len())?;
        ensure_len("quadratic_equalities hprod", 2, hv.len())?;
        self.counters.increment(EvalKind::Hprod);
        hv[0] = (2.0 * obj_weight + 2.0 * y[0]) * v[0];
        hv[1] = (2.0 * obj_weight - 2.0 * y[1]) * v[1];
        Ok(())
    }
}
