use approx::assert_abs_diff_eq;
use feasibility_nls::problems::{
    ConstrainedRosenbrockNls, MixedInequalities, QuadraticEqualities, Rosenbrock,
};
use feasibility_nls::{
    Counters, EvalKind, FeasibilityResidual, Mat, Model, ModelError, ModelKind, NlpModel,
    NlsModel,
};

const POINTS: [[f64; 2]; 5] = [
    [0.5, 0.5],
    [0.0, 0.0],
    [-1.3, 0.8],
    [2.1, -0.7],
    [0.37, 1.91],
];

fn quadratic() -> FeasibilityResidual {
    FeasibilityResidual::new(Model::plain(QuadraticEqualities::new().unwrap())).unwrap()
}

fn mixed() -> FeasibilityResidual {
    FeasibilityResidual::new(Model::plain(MixedInequalities::new().unwrap())).unwrap()
}

fn assert_mat_eq(actual: &Mat, expected: &Mat, epsilon: f64) {
    assert_eq!((actual.rows(), actual.cols()), (expected.rows(), expected.cols()));
    for j in 0..actual.cols() {
        for i in 0..actual.rows() {
            assert_abs_diff_eq!(actual[(i, j)], expected[(i, j)], epsilon = epsilon);
        }
    }
}

#[test]
fn test_residual_is_constraint_minus_rhs() {
    let mut nls = quadratic();
    let mut reference = QuadraticEqualities::new().unwrap();
    let b = reference.meta().lcon.clone();

    let x0 = nls.meta().x0.clone();
    for x in std::iter::once(x0.as_slice()).chain(POINTS.iter().map(|p| p.as_slice())) {
        let mut fx = [0.0; 2];
        let mut cx = [0.0; 2];
        nls.residual(x, &mut fx).unwrap();
        reference.cons(x, &mut cx).unwrap();
        for i in 0..2 {
            assert_abs_diff_eq!(fx[i], cx[i] - b[i], epsilon = 1e-15);
        }
    }
}

#[test]
fn test_objective_and_gradient() {
    let mut nls = quadratic();
    let x = [1.0, 2.0];
    // c(x) - b = [2, -3]
    assert_abs_diff_eq!(nls.obj(&x).unwrap(), 6.5, epsilon = 1e-15);

    // J^T F with J = [[2, 1], [1, -4]]
    let mut g = [0.0; 2];
    nls.grad(&x, &mut g).unwrap();
    assert_abs_diff_eq!(g[0], 1.0, epsilon = 1e-15);
    assert_abs_diff_eq!(g[1], 14.0, epsilon = 1e-15);
}

#[test]
fn test_residual_jacobian_equals_constraint_jacobian() {
    let mut nls = quadratic();
    let mut reference = QuadraticEqualities::new().unwrap();
    for x in &POINTS {
        let jac = nls.jac_residual(x).unwrap();
        assert_mat_eq(&jac, &reference.jac(x).unwrap(), 0.0);

        let mut rows = [0; 4];
        let mut cols = [0; 4];
        let mut vals = [0.0; 4];
        nls.jac_structure_residual(&mut rows, &mut cols).unwrap();
        nls.jac_coord_residual(x, &mut vals).unwrap();
        assert_mat_eq(&Mat::from_coord(2, 2, &rows, &cols, &vals), &jac, 0.0);

        let v = [0.3, -1.7];
        let mut jv = [0.0; 2];
        let mut expected = [0.0; 2];
        nls.jprod_residual(x, &v, &mut jv).unwrap();
        jac.mul_vec(&v, &mut expected);
        assert_abs_diff_eq!(jv[0], expected[0], epsilon = 1e-14);
        assert_abs_diff_eq!(jv[1], expected[1], epsilon = 1e-14);

        let mut jtw = [0.0; 2];
        nls.jtprod_residual(x, &v, &mut jtw).unwrap();
        jac.transpose_mul_vec(&v, &mut expected);
        assert_abs_diff_eq!(jtw[0], expected[0], epsilon = 1e-14);
        assert_abs_diff_eq!(jtw[1], expected[1], epsilon = 1e-14);
    }
}

#[test]
fn test_residual_hessian_equals_weighted_constraint_hessian() {
    let mut nls = quadratic();
    let mut reference = QuadraticEqualities::new().unwrap();
    let w = [0.75, -2.5];
    for x in &POINTS {
        let hess = nls.hess_residual(x, &w).unwrap();
        assert_mat_eq(&hess, &reference.hess(x, &w, 0.0).unwrap(), 0.0);

        let mut rows = [0; 2];
        let mut cols = [0; 2];
        let mut vals = [0.0; 2];
        nls.hess_structure_residual(&mut rows, &mut cols).unwrap();
        nls.hess_coord_residual(x, &w, &mut vals).unwrap();
        assert_mat_eq(&Mat::from_coord_lower(2, &rows, &cols, &vals), &hess, 0.0);
    }

    let x = [0.4, 0.6];
    assert_mat_eq(
        &nls.jth_hess_residual(&x, 0).unwrap(),
        &Mat::from_rows(&[&[2.0, 0.0], &[0.0, 0.0]]),
        0.0,
    );
    assert_mat_eq(
        &nls.jth_hess_residual(&x, 1).unwrap(),
        &Mat::from_rows(&[&[0.0, 0.0], &[0.0, -2.0]]),
        0.0,
    );

    let mut hv = [0.0; 2];
    nls.hprod_residual(&x, 1, &[1.0, 3.0], &mut hv).unwrap();
    assert_eq!(hv, [0.0, -6.0]);
}

#[test]
fn test_objective_hessian_formula() {
    let mut nls = quadratic();
    let obj_weight = 1.5;
    for x in &POINTS {
        let (x1, x2) = (x[0], x[1]);
        let c1 = x1 * x1 + x2;
        let c2 = x1 - x2 * x2;
        // tril(J^T J) + c1 Hess c1 + c2 Hess c2, weighted by the raw constraint values
        let expected = Mat::from_rows(&[
            &[obj_weight * (4.0 * x1 * x1 + 1.0 + 2.0 * c1), 0.0],
            &[
                obj_weight * (2.0 * x1 - 2.0 * x2),
                obj_weight * (1.0 + 4.0 * x2 * x2 - 2.0 * c2),
            ],
        ]);
        let hess = nls.hess(x, &[], obj_weight).unwrap();
        assert_mat_eq(&hess, &expected, 1e-12);
    }
}

#[test]
fn test_objective_hessian_matches_finite_differences() {
    let mut nls =
        FeasibilityResidual::new(Model::plain(QuadraticEqualities::centered().unwrap())).unwrap();
    let h = 1e-6;
    for x in &POINTS {
        let hess = nls.hess(x, &[], 1.0).unwrap();
        for j in 0..2 {
            let mut xp = *x;
            let mut xm = *x;
            xp[j] += h;
            xm[j] -= h;
            let mut gp = [0.0; 2];
            let mut gm = [0.0; 2];
            nls.grad(&xp, &mut gp).unwrap();
            nls.grad(&xm, &mut gm).unwrap();
            for i in j..2 {
                let fd = (gp[i] - gm[i]) / (2.0 * h);
                assert_abs_diff_eq!(hess[(i, j)], fd, epsilon = 1e-6);
            }
        }
    }
}

#[test]
fn test_hprod_matches_dense_hessian() {
    let v = [0.9, -0.4];
    for mut nls in [quadratic(), FeasibilityResidual::new(Model::plain(
        QuadraticEqualities::centered().unwrap(),
    ))
    .unwrap()]
    {
        for x in &POINTS {
            let hess = nls.hess(x, &[], 0.5).unwrap();
            let mut expected = [0.0; 2];
            hess.sym_lower_mul_vec(&v, &mut expected);

            let mut hv = [0.0; 2];
            nls.hprod(x, &[], &v, 0.5, &mut hv).unwrap();
            assert_abs_diff_eq!(hv[0], expected[0], epsilon = 1e-12);
            assert_abs_diff_eq!(hv[1], expected[1], epsilon = 1e-12);

            let mut jv = [0.0; 2];
            let mut partial = [0.0; 2];
            let mut hv2 = [0.0; 2];
            nls.hprod_with_workspace(x, &v, 0.5, &mut hv2, &mut jv, &mut partial)
                .unwrap();
            assert_eq!(hv, hv2);
        }
    }
}

#[test]
fn test_hprod_matches_dense_hessian_with_slacks() {
    let mut nls = mixed();
    let x = [0.6, -0.2, 1.3, 0.9, -0.5, 0.1];
    let v = [1.0, -2.0, 0.5, 0.25, 3.0, -1.0];
    let hess = nls.hess(&x, &[], 1.0).unwrap();
    let mut expected = [0.0; 6];
    hess.sym_lower_mul_vec(&v, &mut expected);
    let mut hv = [0.0; 6];
    nls.hprod(&x, &[], &v, 1.0, &mut hv).unwrap();
    for i in 0..6 {
        assert_abs_diff_eq!(hv[i], expected[i], epsilon = 1e-12);
    }
}

#[test]
fn test_inequalities_become_slack_residuals() {
    let mut nls = mixed();
    let inf = f64::INFINITY;
    assert_eq!(nls.nls_meta().nequ, 4);
    assert_eq!(nls.meta().nvar, 6);
    assert_eq!(nls.meta().lvar, vec![-5.0, -inf, 0.0, 0.5, -inf, -1.0]);
    assert_eq!(nls.meta().uvar, vec![5.0, inf, inf, inf, 2.0, 1.0]);
    assert_eq!(nls.meta().x0, vec![1.0, 0.5, 0.5, 0.0, 0.0, 0.0]);
    assert_eq!(nls.nls_meta().nnzj, 12);
    assert_eq!(nls.nls_meta().lin, vec![0]);

    let x = [1.0, 2.0, 3.0, 0.5, 1.5, -0.5];
    let mut fx = [0.0; 4];
    nls.residual(&x, &mut fx).unwrap();
    // c(x) = [6, 5, 3, -7]
    assert_eq!(fx, [5.0, 4.5, 1.5, -6.5]);
}

#[test]
fn test_unconstrained_model_is_rejected() {
    let err = FeasibilityResidual::new(Model::plain(Rosenbrock::new())).unwrap_err();
    assert!(matches!(err, ModelError::Configuration(_)));
}

#[test]
fn test_sparse_objective_hessian_is_unsupported() {
    let mut nls = quadratic();
    let mut rows = [0; 3];
    let mut cols = [0; 3];
    let mut vals = [0.0; 3];
    assert!(matches!(
        nls.hess_structure(&mut rows, &mut cols),
        Err(ModelError::UnsupportedOperation(_))
    ));
    assert!(matches!(
        nls.hess_coord(&[0.0, 0.0], &[], 1.0, &mut vals),
        Err(ModelError::UnsupportedOperation(_))
    ));
}

/// Runs `eval` and checks that only the `kind` counter moved, by one.
fn check(nls: &mut FeasibilityResidual, kind: EvalKind, eval: impl FnOnce(&mut FeasibilityResidual)) {
    let before = nls.counters().clone();
    eval(nls);
    for (k, count) in nls.counters().iter() {
        let expected = before.get(k) + usize::from(k == kind);
        assert_eq!(count, expected, "{kind} changed the {k} counter");
    }
}

#[test]
fn test_each_evaluation_counts_once() {
    let mut nls = quadratic();
    let x = [0.2, -0.3];
    let v = [1.0, 1.0];
    let mut out = [0.0; 2];
    let mut nz = [0.0; 4];

    check(&mut nls, EvalKind::Obj, |m| {
        m.obj(&x).unwrap();
    });
    check(&mut nls, EvalKind::Grad, |m| m.grad(&x, &mut out).unwrap());
    check(&mut nls, EvalKind::Cons, |m| m.cons(&x, &mut []).unwrap());
    check(&mut nls, EvalKind::Jac, |m| m.jac_coord(&x, &mut []).unwrap());
    check(&mut nls, EvalKind::Jprod, |m| m.jprod(&x, &v, &mut []).unwrap());
    check(&mut nls, EvalKind::Jtprod, |m| {
        m.jtprod(&x, &[], &mut out).unwrap()
    });
    check(&mut nls, EvalKind::Hess, |m| {
        m.hess(&x, &[], 1.0).unwrap();
    });
    check(&mut nls, EvalKind::Hprod, |m| {
        m.hprod(&x, &[], &v, 1.0, &mut out).unwrap()
    });
    check(&mut nls, EvalKind::Residual, |m| {
        m.residual(&x, &mut out).unwrap()
    });
    check(&mut nls, EvalKind::JacResidual, |m| {
        m.jac_coord_residual(&x, &mut nz).unwrap()
    });
    check(&mut nls, EvalKind::JacResidual, |m| {
        m.jac_residual(&x).unwrap();
    });
    check(&mut nls, EvalKind::JprodResidual, |m| {
        m.jprod_residual(&x, &v, &mut out).unwrap()
    });
    check(&mut nls, EvalKind::JtprodResidual, |m| {
        m.jtprod_residual(&x, &v, &mut out).unwrap()
    });
    check(&mut nls, EvalKind::HessResidual, |m| {
        m.hess_coord_residual(&x, &v, &mut out).unwrap()
    });
    check(&mut nls, EvalKind::HessResidual, |m| {
        m.hess_residual(&x, &v).unwrap();
    });
    check(&mut nls, EvalKind::JhessResidual, |m| {
        m.jth_hess_residual(&x, 0).unwrap();
    });
    check(&mut nls, EvalKind::HprodResidual, |m| {
        m.hprod_residual(&x, 1, &v, &mut out).unwrap()
    });

    assert_eq!(nls.counters().total(), 17);
    assert_eq!(nls.counters().total_residual(), 9);
    for kind in EvalKind::ALL {
        assert!(nls.counters().get(kind) >= 1, "{kind} was never counted");
    }

    nls.reset_counters();
    assert_eq!(nls.counters(), &Counters::new());
}

#[test]
fn test_counter_snapshot_round_trips_through_json() {
    let mut nls = quadratic();
    let x = [0.1, 0.2];
    let mut fx = [0.0; 2];
    nls.residual(&x, &mut fx).unwrap();
    nls.residual(&x, &mut fx).unwrap();
    nls.obj(&x).unwrap();

    let json = serde_json::to_string(nls.counters()).unwrap();
    let restored: Counters = serde_json::from_str(&json).unwrap();
    assert_eq!(&restored, nls.counters());
    assert_eq!(restored.get(EvalKind::Residual), 2);
}

#[test]
fn test_least_squares_input_keeps_its_residual_interface() {
    let nls = FeasibilityResidual::new(Model::least_squares(
        ConstrainedRosenbrockNls::new().unwrap(),
    ))
    .unwrap();
    assert_eq!(nls.inner_kind(), ModelKind::LeastSquares);
    assert_eq!(nls.meta().nvar, 3);
    assert_eq!(nls.nls_meta().nequ, 1);
    assert_eq!(nls.meta().lvar[2], f64::NEG_INFINITY);
    assert_eq!(nls.meta().uvar[2], 2.0);

    let mut inner = nls.into_inner();
    assert_eq!(inner.kind(), ModelKind::LeastSquares);
    let slack = inner.as_nls_mut().unwrap();
    assert_eq!(slack.meta().name, "constrained_rosenbrock_nls-slack");
    assert_eq!(slack.nls_meta().nequ, 2);
    assert_eq!(slack.nls_meta().nvar, 3);

    let x = [0.5, 0.5, 1.0];
    let mut fx = [0.0; 2];
    slack.residual(&x, &mut fx).unwrap();
    assert_abs_diff_eq!(fx[0], 0.5, epsilon = 1e-15);
    assert_abs_diff_eq!(fx[1], 2.5, epsilon = 1e-15);

    let jac = slack.jac_residual(&x).unwrap();
    assert_mat_eq(
        &jac,
        &Mat::from_rows(&[&[-1.0, 0.0, 0.0], &[-10.0, 10.0, 0.0]]),
        1e-15,
    );

    let mut jtw = [9.0; 3];
    slack.jtprod_residual(&x, &[1.0, 1.0], &mut jtw).unwrap();
    assert_eq!(jtw, [-11.0, 10.0, 0.0]);
}

#[test]
fn test_feasibility_of_slackened_least_squares_model() {
    let mut nls = FeasibilityResidual::new(Model::least_squares(
        ConstrainedRosenbrockNls::new().unwrap(),
    ))
    .unwrap();
    // x1^2 + x2^2 - s = 0 at (1, 1, 2)
    let x = [1.0, 1.0, 2.0];
    assert_eq!(nls.obj(&x).unwrap(), 0.0);
    let mut g = [1.0; 3];
    nls.grad(&x, &mut g).unwrap();
    assert_eq!(g, [0.0, 0.0, 0.0]);
}
