use crate::counters::{Counters, EvalKind};
use crate::error::{ModelError, Result, ensure_len};
use crate::matrix::Mat;
use crate::meta::{NlpMeta, NlsMeta};
use crate::model::{ModelKind, NlpModel, NlsModel};

/// Rosenbrock in residual form with a disc constraint.
///
/// ```text
/// minimize 1/2 ||F(x)||^2,  F(x) = [1 - x1, 10 (x2 - x1^2)]
/// s.t.     x1^2 + x2^2 <= 2
///          -2 <= x <= 2
/// ```
#[derive(Debug, Clone)]
pub struct ConstrainedRosenbrockNls {
    meta: NlpMeta,
    nls_meta: NlsMeta,
    counters: Counters,
}

impl ConstrainedRosenbrockNls {
    pub fn new() -> Result<Self> {
        let x0 = vec![-1.2, 1.0];
        let meta = NlpMeta::new(x0.clone())
            .with_bounds(vec![-2.0, -2.0], vec![2.0, 2.0])?
            .with_constraints(vec![f64::NEG_INFINITY], vec![2.0])?
            .with_name("constrained_rosenbrock_nls")
            .with_nnzj(2)
            .with_nnzh(3);
        let nls_meta = NlsMeta::new(2, x0)
            .with_nnzj(3)
            .with_nnzh(1)
            .with_lin(vec![0]);
        Ok(Self {
            meta,
            nls_meta,
            counters: Counters::new(),
        })
    }

    fn check_x(x: &[f64]) -> Result<()> {
        ensure_len("constrained_rosenbrock_nls x", 2, x.len())
    }

    fn eval_f(x: &[f64]) -> [f64; 2] {
        [1.0 - x[0], 10.0 * (x[1] - x[0].powi(2))]
    }

    fn check_row(i: usize) -> Result<()> {
        if i < 2 {
            Ok(())
        } else {
            Err(ModelError::IndexOutOfRange {
                context: "constrained_rosenbrock_nls residual row",
                index: i,
                len: 2,
            })
        }
    }
}

impl NlpModel for ConstrainedRosenbrockNls {
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
        Self::check_x(x)?;
        self.counters.increment(EvalKind::Obj);
        let [f1, f2] = Self::eval_f(x);
        Ok(0.5 * (f1 * f1 + f2 * f2))
    }

    fn grad(&mut self, x: &[f64], g: &mut [f64]) -> Result<()> {
        Self::check_x(x)?;
        ensure_len("constrained_rosenbrock_nls grad", 2, g.len())?;
        self.counters.increment(EvalKind::Grad);
        let [f1, f2] = Self::eval_f(x);
        g[0] = -f1 - 20.0 * x[0] * f2;
        g[1] = 10.0 * f2;
        Ok(())
    }

    fn cons(&mut self, x: &[f64], c: &mut [f64]) -> Result<()> {
        Self::check_x(x)?;
        ensure_len("constrained_rosenbrock_nls cons", 1, c.len())?;
        self.counters.increment(EvalKind::Cons);
        c[0] = x[0].powi(2) + x[1].powi(2);
        Ok(())
    }

    fn jac_structure(&self, rows: &mut [usize], cols: &mut [usize]) -> Result<()> {
        ensure_len("constrained_rosenbrock_nls jac_structure rows", 2, rows.len())?;
        ensure_len("constrained_rosenbrock_nls jac_structure cols", 2, cols.len())?;
        rows.copy_from_slice(&[0, 0]);
        cols.copy_from_slice(&[0, 1]);
        Ok(())
    }

    fn jac_coord(&mut self, x: &[f64], vals: &mut [f64]) -> Result<()> {
        Self::check_x(x)?;
        ensure_len("constrained_rosenbrock_nls jac_coord", 2, vals.len())?;
        self.counters.increment(EvalKind::Jac);
        vals[0] = 2.0 * x[0];
        vals[1] = 2.0 * x[1];
        Ok(())
    }

    fn jprod(&mut self, x: &[f64], v: &[f64], jv: &mut [f64]) -> Result<()> {
        Self::check_x(x)?;
        ensure_len("constrained_rosenbrock_nls jprod v", 2, v.len())?;
        ensure_len("constrained_rosenbrock_nls jprod", 1, jv.len())?;
        self.counters.increment(EvalKind::Jprod);
        jv[0] = 2.0 * (x[0] * v[0] + x[1] * v[1]);
        Ok(())
    }

    fn jtprod(&mut self, x: &[f64], w: &[f64], jtw: &mut [f64]) -> Result<()> {
        Self::check_x(x)?;
        ensure_len("constrained_rosenbrock_nls jtprod w", 1, w.len())?;
        ensure_len("constrained_rosenbrock_nls jtprod", 2, jtw.len())?;
        self.counters.increment(EvalKind::Jtprod);
        jtw[0] = 2.0 * x[0] * w[0];
        jtw[1] = 2.0 * x[1] * w[0];
        Ok(())
    }

    fn hess_structure(&self, rows: &mut [usize], cols: &mut [usize]) -> Result<()> {
        ensure_len("constrained_rosenbrock_nls hess_structure rows", 3, rows.len())?;
        ensure_len("constrained_rosenbrock_nls hess_structure cols", 3, cols.len())?;
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
        ensure_len("constrained_rosenbrock_nls hess_coord y", 1, y.len())?;
        ensure_len("constrained_rosenbrock_nls hess_coord", 3, vals.len())?;
        self.counters.increment(EvalKind::Hess);
        let [_, f2] = Self::eval_f(x);
        vals[0] = obj_weight * (1.0 + 400.0 * x[0].powi(2) - 20.0 * f2) + 2.0 * y[0];
        vals[1] = obj_weight * (-200.0 * x[0]);
        vals[2] = obj_weight * 100.0 + 2.0 * y[0];
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
        ensure_len("constrained_rosenbrock_nls hprod y", 1, y.len())?;
        ensure_len("constrained_rosenbrock_nls hprod v", 2, v.len())?;
        ensure_len("constrained_rosenbrock_nls hprod", 2, hv.len())?;
        self.counters.increment(EvalKind::Hprod);
        let [_, f2] = Self::eval_f(x);
        let h00 = obj_weight * (1.0 + 400.0 * x[0].powi(2) - 20.0 * f2) + 2.0 * y[0];
        let h10 = obj_weight * (-200.0 * x[0]);
        let h11 = obj_weight * 100.0 + 2.0 * y[0];
        hv[0] = h00 * v[0] + h10 * v[1];
        hv[1] = h10 * v[0] + h11 * v[1];
        Ok(())
    }
}

impl NlsModel for ConstrainedRosenbrockNls {
    fn nls_meta(&self) -> &NlsMeta {
        &self.nls_meta
    }

    fn residual(&mut self, x: &[f64], fx: &mut [f64]) -> Result<()> {
        Self::check_x(x)?;
        ensure_len("constrained_rosenbrock_nls residual", 2, fx.len())?;
        self.counters.increment(EvalKind::Residual);
        fx.copy_from_slice(&Self::eval_f(x));
        Ok(())
    }

    fn jac_structure_residual(&self, rows: &mut [usize], cols: &mut [usize]) -> Result<()> {
        ensure_len("constrained_rosenbrock_nls jac_structure_residual rows", 3, rows.len())?;
        ensure_len("constrained_rosenbrock_nls jac_structure_residual cols", 3, cols.len())?;
        rows.copy_from_slice(&[0, 1, 1]);
        cols.copy_from_slice(&[0, 0, 1]);
        Ok(())
    }

    fn jac_coord_residual(&mut self, x: &[f64], vals: &mut [f64]) -> Result<()> {
        Self::check_x(x)?;
        ensure_len("constrained_rosenbrock_nls jac_coord_residual", 3, vals.len())?;
        self.counters.increment(EvalKind::JacResidual);
        vals.copy_from_slice(&[-1.0, -20.0 * x[0], 10.0]);
        Ok(())
    }

    fn jprod_residual(&mut self, x: &[f64], v: &[f64], jv: &mut [f64]) -> Result<()> {
        Self::check_x(x)?;
        ensure_len("constrained_rosenbrock_nls jprod_residual v", 2, v.len())?;
        ensure_len("constrained_rosenbrock_nls jprod_residual", 2, jv.len())?;
        self.counters.increment(EvalKind::JprodResidual);
        jv[0] = -v[0];
        jv[1] = -20.0 * x[0] * v[0] + 10.0 * v[1];
        Ok(())
    }

    fn jtprod_residual(&mut self, x: &[f64], w: &[f64], jtw: &mut [f64]) -> Result<()> {
        Self::check_x(x)?;
        ensure_len("constrained_rosenbrock_nls jtprod_residual w", 2, w.len())?;
        ensure_len("constrained_rosenbrock_nls jtprod_residual", 2, jtw.len())?;
        self.counters.increment(EvalKind::JtprodResidual);
        jtw[0] = -w[0] - 20.0 * x[0] * w[1];
        jtw[1] = 10.0 * w[1];
        Ok(())
    }

    fn hess_structure_residual(&self, rows: &mut [usize], cols: &mut [usize]) -> Result<()> {
        ensure_len("constrained_rosenbrock_nls hess_structure_residual rows", 1, rows.len())?;
        ensure_len("constrained_rosenbrock_nls hess_structure_residual cols", 1, cols.len())?;
        rows[0] = 0;
        cols[0] = 0;
        Ok(())
    }

    fn hess_coord_residual(&mut self, x: &[f64], v: &[f64], vals: &mut [f64]) -> Result<()> {
        Self::check_x(x)?;
        ensure_len("constrained_rosenbrock_nls hess_coord_residual v", 2, v.len())?;
        ensure_len("constrained_rosenbrock_nls hess_coord_residual", 1, vals.len())?;
        self.counters.increment(EvalKind::HessResidual);
        vals[0] = -20.0 * v[1];
        Ok(())
    }

    fn jth_hess_residual(&mut self, x: &[f64], i: usize) -> Result<Mat> {
        Self::check_x(x)?;
        Self::check_row(i)?;
        self.counters.increment(EvalKind::JhessResidual);
        let mut hess = Mat::new(2, 2);
        if i == 1 {
            hess[(0, 0)] = -20.0;
        }
        Ok(hess)
    }

    fn hprod_residual(&mut self, x: &[f64], i: usize, v: &[f64], hv: &mut [f64]) -> Result<()> {
        Self::check_x(x)?;
        Self::check_row(i)?;
        ensure_len("constrained_rosenbrock_nls hprod_residual v", 2, v.len())?;
        ensure_len("constrained_rosenbrock_nls hprod_residual", 2, hv.len())?;
        self.counters.increment(EvalKind::HprodResidual);
        hv[0] = if i == 1 { -20.0 * v[0] } else { 0.0 };
        hv[1] = 0.0;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_objective_is_half_squared_residual_norm() {
        let mut model = ConstrainedRosenbrockNls::new().unwrap();
        let x = [0.7, -0.3];
        let mut fx = [0.0; 2];
        model.residual(&x, &mut fx).unwrap();
        let f = model.obj(&x).unwrap();
        assert_abs_diff_eq!(f, 0.5 * (fx[0] * fx[0] + fx[1] * fx[1]), epsilon = 1e-14);

        let mut g = [0.0; 2];
        let mut jtf = [0.0; 2];
        model.grad(&x, &mut g).unwrap();
        model.jtprod_residual(&x, &fx, &mut jtf).unwrap();
        assert_abs_diff_eq!(g[0], jtf[0], epsilon = 1e-14);
        assert_abs_diff_eq!(g[1], jtf[1], epsilon = 1e-14);
    }

    #[test]
    fn test_residual_hessians() {
        let mut model = ConstrainedRosenbrockNls::new().unwrap();
        let x = [0.2, 0.4];
        assert_eq!(model.jth_hess_residual(&x, 0).unwrap(), Mat::new(2, 2));
        let h1 = model.jth_hess_residual(&x, 1).unwrap();
        assert_eq!(h1[(0, 0)], -20.0);
        let weighted = model.hess_residual(&x, &[3.0, 0.5]).unwrap();
        assert_eq!(weighted[(0, 0)], -10.0);
        assert!(model.jth_hess_residual(&x, 2).is_err());
    }
}
