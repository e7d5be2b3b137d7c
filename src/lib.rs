//! Views of constrained nonlinear programs as nonlinear least-squares problems.
//!
//! [`FeasibilityResidual`] turns `c(x) = b, lvar <= x <= uvar` into
//! `min 1/2 ||c(x) - b||^2` over the same box, adding slack variables first
//! when the program has inequality rows. A zero objective certifies a
//! feasible point.
//!
//! ```
//! use feasibility_nls::problems::QuadraticEqualities;
//! use feasibility_nls::{FeasibilityResidual, Model, NlpModel, NlsModel};
//!
//! let mut nls = FeasibilityResidual::new(Model::plain(QuadraticEqualities::new()?))?;
//! let mut fx = vec![0.0; nls.nls_meta().nequ];
//! nls.residual(&[1.0, 0.0], &mut fx)?;
//! assert_eq!(fx, vec![0.0, 1.0]);
//! assert_eq!(nls.obj(&[1.0, 1.0])?, 0.5);
//! # Ok::<(), feasibility_nls::ModelError>(())
//! ```

pub mod blas;
pub mod counters;
pub use counters::{Counters, EvalKind};
pub mod error;
pub use error::{ModelError, Result};
pub mod feasibility;
pub use feasibility::FeasibilityResidual;
pub mod matrix;
pub use matrix::Mat;
pub mod meta;
pub use meta::{BoundClasses, NlpMeta, NlsMeta};
pub mod model;
pub use model::{Model, ModelKind, NlpModel, NlsModel};
pub mod operator;
pub use operator::{LinearOperator, hess_op, hess_op_residual, jac_op_residual};
pub mod problems;
pub mod slack;
pub use slack::{SlackModel, SlackNlsModel};
