//! Matrix-free views of Jacobians and Hessians.
//!
//! An operator borrows a model and a fixed point; every application is one
//! counted model call.

use crate::error::{ModelError, Result, ensure_len};
use crate::model::{NlpModel, NlsModel};

pub trait LinearOperator {
    fn nrows(&self) -> usize;

    fn ncols(&self) -> usize;

    /// out = A v
    fn apply(&mut self, v: &[f64], out: &mut [f64]) -> Result<()>;

    /// out = A^T w
    fn apply_transpose(&mut self, w: &[f64], out: &mut [f64]) -> Result<()>;
}

/// Residual Jacobian `J_F(x)`, `nequ x nvar`.
pub struct JacobianResidualOperator<'a> {
    model: &'a mut dyn NlsModel,
    x: &'a [f64],
}

impl LinearOperator for JacobianResidualOperator<'_> {
    fn nrows(&self) -> usize {
        self.model.nls_meta().nequ
    }

    fn ncols(&self) -> usize {
        self.model.nls_meta().nvar
    }

    fn apply(&mut self, v: &[f64], out: &mut [f64]) -> Result<()> {
        self.model.jprod_residual(self.x, v, out)
    }

    fn apply_transpose(&mut self, w: &[f64], out: &mut [f64]) -> Result<()> {
        self.model.jtprod_residual(self.x, w, out)
    }
}

/// Lagrangian Hessian `obj_weight * Hess f(x) + sum_i y_i Hess c_i(x)`.
pub struct HessianOperator<'a> {
    model: &'a mut dyn NlpModel,
    x: &'a [f64],
    y: &'a [f64],
    obj_weight: f64,
}

impl LinearOperator for HessianOperator<'_> {
    fn nrows(&self) -> usize {
        self.model.meta().nvar
    }

    fn ncols(&self) -> usize {
        self.model.meta().nvar
    }

    fn apply(&mut self, v: &[f64], out: &mut [f64]) -> Result<()> {
        self.model.hprod(self.x, self.y, v, self.obj_weight, out)
    }

    fn apply_transpose(&mut self, w: &[f64], out: &mut [f64]) -> Result<()> {
        self.apply(w, out)
    }
}

/// Hessian of the single residual `F_i` at `x`.
pub struct HessianResidualOperator<'a> {
    model: &'a mut dyn NlsModel,
    x: &'a [f64],
    i: usize,
}

impl LinearOperator for HessianResidualOperator<'_> {
    fn nrows(&self) -> usize {
        self.model.nls_meta().nvar
    }

    fn ncols(&self) -> usize {
        self.model.nls_meta().nvar
    }

    fn apply(&mut self, v: &[f64], out: &mut [f64]) -> Result<()> {
        self.model.hprod_residual(self.x, self.i, v, out)
    }

    fn apply_transpose(&mut self, w: &[f64], out: &mut [f64]) -> Result<()> {
        self.apply(w, out)
    }
}

pub fn jac_op_residual<'a>(
    model: &'a mut dyn NlsModel,
    x: &'a [f64],
) -> Result<JacobianResidualOperator<'a>> {
    ensure_len("jac_op_residual x", model.nls_meta().nvar, x.len())?;
    Ok(JacobianResidualOperator { model, x })
}

pub fn hess_op<'a>(
    model: &'a mut dyn NlpModel,
    x: &'a [f64],
    y: &'a [f64],
    obj_weight: f64,
) -> Result<HessianOperator<'a>> {
    ensure_len("hess_op x", model.meta().nvar, x.len())?;
    ensure_len("hess_op y", model.meta().ncon, y.len())?;
    Ok(HessianOperator {
        model,
        x,
        y,
        obj_weight,
    })
}

pub fn hess_op_residual<'a>(
    model: &'a mut dyn NlsModel,
    x: &'a [f64],
    i: usize,
) -> Result<HessianResidualOperator<'a>> {
    let meta = model.nls_meta();
    ensure_len("hess_op_residual x", meta.nvar, x.len())?;
    if i >= meta.nequ {
        return Err(ModelError::IndexOutOfRange {
            context: "hess_op_residual",
            index: i,
            len: meta.nequ,
        });
    }
    Ok(HessianResidualOperator { model, x, i })
}
