use approx::assert_abs_diff_eq;
use feasibility_nls::problems::{MixedInequalities, QuadraticEqualities};
use feasibility_nls::{Mat, ModelKind, NlpModel, SlackModel};

fn slack_model() -> SlackModel {
    SlackModel::new(Box::new(MixedInequalities::new().unwrap())).unwrap()
}

#[test]
fn test_bound_classification() {
    let meta = MixedInequalities::new().unwrap().meta().clone();
    assert_eq!(meta.rows.fixed, vec![0]);
    assert_eq!(meta.rows.lower, vec![1]);
    assert_eq!(meta.rows.upper, vec![2]);
    assert_eq!(meta.rows.range, vec![3]);
    assert!(meta.rows.free.is_empty());
    assert_eq!(meta.vars.range, vec![0]);
    assert_eq!(meta.vars.free, vec![1]);
    assert_eq!(meta.vars.lower, vec![2]);
    assert_eq!(meta.nlin(), 1);
    assert_eq!(meta.nln(), vec![1, 2, 3]);
    assert!(!meta.is_equality_constrained());
}

#[test]
fn test_slack_metadata() {
    let model = slack_model();
    let meta = model.meta();
    assert_eq!(model.kind(), ModelKind::Plain);
    assert_eq!(model.num_slacks(), 3);
    assert_eq!(model.slack_rows(), &[1, 2, 3]);
    assert_eq!(meta.name, "mixed_inequalities-slack");
    assert_eq!(meta.nvar, 6);
    assert_eq!(meta.ncon, 4);
    assert_eq!(meta.lcon, vec![1.0, 0.0, 0.0, 0.0]);
    assert_eq!(meta.ucon, vec![1.0, 0.0, 0.0, 0.0]);
    assert_eq!(meta.nnzj, 12);
    assert_eq!(meta.nnzh, 4);
    assert!(meta.is_equality_constrained());
    assert_eq!(meta.rows.fixed, vec![0, 1, 2, 3]);
}

#[test]
fn test_equality_rows_get_no_slack() {
    let model = SlackModel::new(Box::new(QuadraticEqualities::new().unwrap())).unwrap();
    assert_eq!(model.num_slacks(), 0);
    assert_eq!(model.meta().nvar, 2);
    assert_eq!(model.meta().lcon, vec![1.0, 0.0]);
}

#[test]
fn test_slack_jacobian_is_consistent() {
    let mut model = slack_model();
    let x = [0.8, -1.1, 0.4, 2.0, 0.3, -0.7];

    let nnzj = model.meta().nnzj;
    let mut rows = vec![0; nnzj];
    let mut cols = vec![0; nnzj];
    let mut vals = vec![0.0; nnzj];
    model.jac_structure(&mut rows, &mut cols).unwrap();
    model.jac_coord(&x, &mut vals).unwrap();
    assert_eq!(&rows[9..], &[1, 2, 3]);
    assert_eq!(&cols[9..], &[3, 4, 5]);
    assert_eq!(&vals[9..], &[-1.0, -1.0, -1.0]);

    let from_coord = Mat::from_coord(4, 6, &rows, &cols, &vals);
    let dense = model.jac(&x).unwrap();
    assert_eq!(dense, from_coord);

    let v = [0.5, 1.0, -1.5, 2.0, -0.25, 0.75];
    let mut jv = [0.0; 4];
    let mut expected = [0.0; 4];
    model.jprod(&x, &v, &mut jv).unwrap();
    dense.mul_vec(&v, &mut expected);
    for i in 0..4 {
        assert_abs_diff_eq!(jv[i], expected[i], epsilon = 1e-14);
    }

    let w = [1.0, -2.0, 0.5, 3.0];
    let mut jtw = [0.0; 6];
    let mut expected = [0.0; 6];
    model.jtprod(&x, &w, &mut jtw).unwrap();
    dense.transpose_mul_vec(&w, &mut expected);
    for j in 0..6 {
        assert_abs_diff_eq!(jtw[j], expected[j], epsilon = 1e-14);
    }
}

#[test]
fn test_objective_ignores_slacks() {
    let mut model = slack_model();
    let mut plain = MixedInequalities::new().unwrap();
    let x = [0.8, -1.1, 0.4, 2.0, 0.3, -0.7];
    assert_eq!(model.obj(&x).unwrap(), plain.obj(&x[..3]).unwrap());

    let mut g = [7.0; 6];
    model.grad(&x, &mut g).unwrap();
    assert_eq!(&g[3..], &[0.0, 0.0, 0.0]);

    let y = [0.1, 0.2, 0.3, 0.4];
    let hess = model.hess(&x, &y, 1.0).unwrap();
    assert_eq!((hess.rows(), hess.cols()), (6, 6));
    let small = plain.hess(&x[..3], &y, 1.0).unwrap();
    for j in 0..6 {
        for i in 0..6 {
            let expected = if i < 3 && j < 3 { small[(i, j)] } else { 0.0 };
            assert_eq!(hess[(i, j)], expected);
        }
    }

    let mut hv = [7.0; 6];
    model.hprod(&x, &y, &[1.0; 6], 1.0, &mut hv).unwrap();
    assert_eq!(&hv[3..], &[0.0, 0.0, 0.0]);
}

#[test]
fn test_counters_are_shared_with_the_wrapped_model() {
    let mut model = slack_model();
    let x = [0.0; 6];
    let mut c = [0.0; 4];
    model.cons(&x, &mut c).unwrap();
    model.cons(&x, &mut c).unwrap();
    assert_eq!(model.inner().counters().get(feasibility_nls::EvalKind::Cons), 2);
    model.reset_counters();
    assert_eq!(model.inner().counters().total(), 0);

    let inner = model.into_inner();
    assert_eq!(inner.meta().name, "mixed_inequalities");
}

#[test]
fn test_slack_point_has_wrong_length() {
    let mut model = slack_model();
    assert!(model.obj(&[0.0; 3]).is_err());
}
