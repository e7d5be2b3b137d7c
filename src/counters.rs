use serde::{Deserialize, Serialize};

/// Kind of evaluation tracked by [`Counters`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EvalKind {
    Obj,
    Grad,
    Cons,
    Jac,
    Jprod,
    Jtprod,
    Hess,
    Hprod,
    Residual,
    JacResidual,
    JprodResidual,
    JtprodResidual,
    HessResidual,
    JhessResidual,
    HprodResidual,
}

impl EvalKind {
    pub const COUNT: usize = 15;

    pub const ALL: [EvalKind; Self::COUNT] = [
        EvalKind::Obj,
        EvalKind::Grad,
        EvalKind::Cons,
        EvalKind::Jac,
        EvalKind::Jprod,
        EvalKind::Jtprod,
        EvalKind::Hess,
        EvalKind::Hprod,
        EvalKind::Residual,
        EvalKind::JacResidual,
        EvalKind::JprodResidual,
        EvalKind::JtprodResidual,
        EvalKind::HessResidual,
        EvalKind::JhessResidual,
        EvalKind::HprodResidual,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            EvalKind::Obj => "obj",
            EvalKind::Grad => "grad",
            EvalKind::Cons => "cons",
            EvalKind::Jac => "jac",
            EvalKind::Jprod => "jprod",
            EvalKind::Jtprod => "jtprod",
            EvalKind::Hess => "hess",
            EvalKind::Hprod => "hprod",
            EvalKind::Residual => "residual",
            EvalKind::JacResidual => "jac_residual",
            EvalKind::JprodResidual => "jprod_residual",
            EvalKind::JtprodResidual => "jtprod_residual",
            EvalKind::HessResidual => "hess_residual",
            EvalKind::JhessResidual => "jhess_residual",
            EvalKind::HprodResidual => "hprod_residual",
        }
    }

    /// Kinds that belong to the residual interface of a least-squares model.
    pub fn is_residual(&self) -> bool {
        (*self as usize) >= (EvalKind::Residual as usize)
    }
}

impl std::fmt::Display for EvalKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Number of evaluations performed per [`EvalKind`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Counters {
    counts: [usize; EvalKind::COUNT],
}

impl Counters {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn increment(&mut self, kind: EvalKind) {
        self.counts[kind as usize] += 1;
    }

    #[inline]
    pub fn get(&self, kind: EvalKind) -> usize {
        self.counts[kind as usize]
    }

    pub fn reset(&mut self) {
        self.counts = [0; EvalKind::COUNT];
    }

    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }

    /// Evaluations of the plain program interface (objective, constraints and derivatives).
    pub fn total_nlp(&self) -> usize {
        self.iter()
            .filter(|(kind, _)| !kind.is_residual())
            .map(|(_, count)| count)
            .sum()
    }

    /// Evaluations of the residual interface.
    pub fn total_residual(&self) -> usize {
        self.total() - self.total_nlp()
    }

    pub fn iter(&self) -> impl Iterator<Item = (EvalKind, usize)> + '_ {
        EvalKind::ALL.iter().map(|&kind| (kind, self.get(kind)))
    }
}

impl std::fmt::Display for Counters {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (kind, count) in self.iter().filter(|(_, count)| *count > 0) {
            writeln!(f, "{:>16}: {}", kind.name(), count)?;
        }
        Ok(())
    }
}
