//! Small problems with closed-form derivatives.
//!
//! They exercise every bound type and both model kinds, and are used by the
//! tests, the benchmark and the demo.

mod mixed_inequalities;
mod quadratic_equalities;
mod rosenbrock;
mod rosenbrock_nls;

pub use mixed_inequalities::MixedInequalities;
pub use quadratic_equalities::QuadraticEqualities;
pub use rosenbrock::Rosenbrock;
pub use rosenbrock_nls::ConstrainedRosenbrockNls;
