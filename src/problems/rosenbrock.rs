use crate::counters::{Counters, EvalKind};
use crate::error::{Result, ensure_len};
use crate::meta::NlpMeta;
use crate::model::NlpModel;

/// `f(x) = (1 - x1)^2 + 100 (x2 - x1^2)^2`, no constraints (HS1 without bounds).
#[derive(Debug, Clone)]
pub struct Rosenbrock {
    meta: NlpMeta,
    counters: Counters,
}

impl Rosenbrock {
    pub fn new() -> Self {
        Self {
            meta: NlpMeta::new(vec![-1.2, 1.0])
                .with_name("rosenbrock")
                .with_nnzh(3),
            counters: Counters::new(),
        }
    }

    fn check_x(x: &[f64]) -> Result<()> {
        ensure_len("rosenbrock x", 2, x.len())
    }
}

impl Default for Rosenbrock {
    fn default() -> Self {
        Self::new()
    }
}

impl NlpModel for Rosenbrock {
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
        Ok((1.0 - x[0]).powi(2) + 100.0 * (x[1] - x[0].powi(2)).powi(2))
    }

    fn grad(&mut self, x: &[f64], g: &mut [f64]) -> Result<()> {
        Self::check_x(x)?;
        ensure_len("rosenbrock grad", 2, g.len())?;
        self.counters.increment(EvalKind::Grad);
        let t = x[1] - x[0].powi(2);
        g[0] = -2.0 * (1.0 - x[0]) - 400.0 * x[0] * t;
        g[1] = 200.0 * t;
        Ok(())
    }

    fn cons(&mut self, x: &[f64], c: &mut [f64]) -> Result<()> {
        Self::check_x(x)?;
        ensure_len("rosenbrock cons", 0, c.len())?;
        self.counters.increment(EvalKind::Cons);
        Ok(())
    }

    fn jac_structure(&self, rows: &mut [usize], cols: &mut [usize]) -> Result<()> {
        ensure_len("rosenbrock jac_structure rows", 0, rows.len())?;
        ensure_len("rosenbrock jac_structure cols", 0, cols.len())
    }

    fn jac_coord(&mut self, x: &[f64], vals: &mut [f64]) -> Result<()> {
        Self::check_x(x)?;
        ensure_len("rosenbrock jac_coord", 0, vals.len())?;
        self.counters.increment(EvalKind::Jac);
        Ok(())
    }

    fn jprod(&mut self, x: &[f64], _v: &[f64], jv: &mut [f64]) -> Result<()> {
        Self::check_x(x)?;
        ensure_len("rosenbrock jprod", 0, jv.len())?;
        self.counters.increment(EvalKind::Jprod);
        Ok(())
    }

    fn jtprod(&mut self, x: &[f64], _w: &[f64], jtw: &mut [f64]) -> Result<()> {
        Self::check_x(x)?;
        ensure_len("rosenbrock jtprod", 2, jtw.len())?;
        self.counters.increment(EvalKind::Jtprod);
        jtw.iter_mut().for_each(|v| *v = 0.0);
        Ok(())
    }

    fn hess_structure(&self, rows: &mut [usize], cols: &mut [usize]) -> Result<()> {
        ensure_len("rosenbrock hess_structure rows", 3, rows.len())?;
        ensure_len("rosenbrock hess_structure cols", 3, cols.len())?;
        rows.copy_from_slice(&[0, 1, 1]);
        cols.copy_from_slice(&[0, 0, 1]);
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
        ensure_len("rosenbrock hess_coord y", 0, y.len())?;
        ensure_len("rosenbrock hess_coord", 3, vals.len())?;
        self.counters.increment(EvalKind::Hess);
        vals[0] = obj_weight * (2.0 - 400.0 * x[1] + 1200.0 * x[0].powi(2));
        vals[1] = obj_weight * (-400.0 * x[0]);
        vals[2] = obj_weight * 200.0;
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
        ensure_len("rosenbrock hprod y", 0, y.len())?;
        ensure_len("rosenbrock hprod v", 2, v.len())?;
        ensure_len("rosenbrock hprod", 2, hv.len())?;
        self.counters.increment(EvalKind::Hprod);
        let h00 = 2.0 - 400.0 * x[1] + 1200.0 * x[0].powi(2);
        let h10 = -400.0 * x[0];
        hv[0] = obj_weight * (h00 * v[0] + h10 * v[1]);
        hv[1] = obj_weight * (h10 * v[0] + 200.0 * v[1]);
        Ok(())
    }
}
