use crate::counters::{Counters, EvalKind};
use crate::error::{Result, ensure_len};
use crate::meta::NlpMeta;
use crate::model::NlpModel;

/// One constraint row of each bound type in three variables.
///
/// ```text
/// minimize x1^2 + 2 x2^2 + x3^2
/// s.t.     x1 + x2 + x3 = 1          (equality, linear)
///          x1^2 + x2^2 >= 0.5        (lower)
///          x1 x3 <= 2                (upper)
///          -1 <= x2 - x3^2 <= 1      (range)
///          -5 <= x1 <= 5,  x3 >= 0
/// ```
#[derive(Debug, Clone)]
pub struct MixedInequalities {
    meta: NlpMeta,
    counters: Counters,
}

const NNZJ: usize = 9;
const NNZH: usize = 4;

impl MixedInequalities {
    pub fn new() -> Result<Self> {
        let inf = f64::INFINITY;
        let meta = NlpMeta::new(vec![1.0, 0.5, 0.5])
            .with_bounds(vec![-5.0, -inf, 0.0], vec![5.0, inf, inf])?
            .with_constraints(vec![1.0, 0.5, -inf, -1.0], vec![1.0, inf, 2.0, 1.0])?
            .with_name("mixed_inequalities")
            .with_nnzj(NNZJ)
            .with_nnzh(NNZH)
            .with_lin(vec![0]);
        Ok(Self {
            meta,
            counters: Counters::new(),
        })
    }

    fn check_x(x: &[f64]) -> Result<()> {
        ensure_len("mixed_inequalities x", 3, x.len())
    }

    /// Lower-triangle entries (0,0), (1,1), (2,2), (2,0) of the Lagrangian Hessian.
    fn hess_entries(y: &[f64], obj_weight: f64) -> [f64; NNZH] {
        [
            2.0 * obj_weight + 2.0 * y[1],
            4.0 * obj_weight + 2.0 * y[1],
            2.0 * obj_weight - 2.0 * y[3],
            y[2],
        ]
    }
}

impl NlpModel for MixedInequalities {
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
        Ok(x[0].powi(2) + 2.0 * x[1].powi(2) + x[2].powi(2))
    }

    fn grad(&mut self, x: &[f64], g: &mut [f64]) -> Result<()> {
        Self::check_x(x)?;
        ensure_len("mixed_inequalities grad", 3, g.len())?;
        self.counters.increment(EvalKind::Grad);
        g[0] = 2.0 * x[0];
        g[1] = 4.0 * x[1];
        g[2] = 2.0 * x[2];
        Ok(())
    }

    fn cons(&mut self, x: &[f64], c: &mut [f64]) -> Result<()> {
        Self::check_x(x)?;
        ensure_len("mixed_inequalities cons", 4, c.len())?;
        self.counters.increment(EvalKind::Cons);
        c[0] = x[0] + x[1] + x[2];
        c[1] = x[0].powi(2) + x[1].powi(2);
        c[2] = x[0] * x[2];
        c[3] = x[1] - x[2].powi(2);
        Ok(())
    }

    fn jac_structure(&self, rows: &mut [usize], cols: &mut [usize]) -> Result<()> {
        ensure_len("mixed_inequalities jac_structure rows", NNZJ, rows.len())?;
        ensure_len("mixed_inequalities jac_structure cols", NNZJ, cols.len())?;
        rows.copy_from_slice(&[0, 0, 0, 1, 1, 2, 2, 3, 3]);
        cols.copy_from_slice(&[0, 1, 2, 0, 1, 0, 2, 1, 2]);
        Ok(())
    }

    fn jac_coord(&mut self, x: &[f64], vals: &mut [f64]) -> Result<()> {
        Self::check_x(x)?;
        ensure_len("mixed_inequalities jac_coord", NNZJ, vals.len())?;
        self.counters.increment(EvalKind::Jac);
        vals.copy_from_slice(&[
            1.0,
            1.0,
            1.0,
            2.0 * x[0],
            2.0 * x[1],
            x[2],
            x[0],
            1.0,
            -2.0 * x[2],
        ]);
        Ok(())
    }

    fn jprod(&mut self, x: &[f64], v: &[f64], jv: &mut [f64]) -> Result<()> {
        Self::check_x(x)?;
        ensure_len("mixed_inequalities jprod v", 3, v.len())?;
        ensure_len("mixed_inequalities jprod", 4, jv.len())?;
        self.counters.increment(EvalKind::Jprod);
        jv[0] = v[0] + v[1] + v[2];
        jv[1] = 2.0 * x[0] * v[0] + 2.0 * x[1] * v[1];
        jv[2] = x[2] * v[0] + x[0] * v[2];
        jv[3] = v[1] - 2.0 * x[2] * v[2];
        Ok(())
    }

    fn jtprod(&mut self, x: &[f64], w: &[f64], jtw: &mut [f64]) -> Result<()> {
        Self::check_x(x)?;
        ensure_len("mixed_inequalities jtprod w", 4, w.len())?;
        ensure_len("mixed_inequalities jtprod", 3, jtw.len())?;
        self.counters.increment(EvalKind::Jtprod);
        jtw[0] = w[0] + 2.0 * x[0] * w[1] + x[2] * w[2];
        jtw[1] = w[0] + 2.0 * x[1] * w[1] + w[3];
        jtw[2] = w[0] + x[0] * w[2] - 2.0 * x[2] * w[3];
        Ok(())
    }

    fn hess_structure(&self, rows: &mut [usize], cols: &mut [usize]) -> Result<()> {
        ensure_len("mixed_inequalities hess_structure rows", NNZH, rows.len())?;
        ensure_len("mixed_inequalities hess_structure cols", NNZH, cols.len())?;
        rows.copy_from_slice(&[0, 1, 2, 2]);
        cols.copy_from_slice(&[0, 1, 2, 0]);
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
        ensure_len("mixed_inequalities hess_coord y", 4, y.len())?;
        ensure_len("mixed_inequalities hess_coord", NNZH, vals.len())?;
        self.counters.increment(EvalKind::Hess);
        vals.copy_from_slice(&Self::hess_entries(y, obj_weight));
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
        ensure_len("mixed_inequalities hprod y", 4, y.len())?;
        ensure_len("mixed_inequalities hprod v", 3, v.len())?;
        ensure_len("mixed_inequalities hprod", 3, hv.len())?;
        self.counters.increment(EvalKind::Hprod);
        let [h00, h11, h22, h20] = Self::hess_entries(y, obj_weight);
        hv[0] = h00 * v[0] + h20 * v[2];
        hv[1] = h11 * v[1];
        hv[2] = h20 * v[0] + h22 * v[2];
        Ok(())
    }
}
