use feasibility_nls::blas::vector_norm;
use feasibility_nls::problems::{ConstrainedRosenbrockNls, MixedInequalities};
use feasibility_nls::{FeasibilityResidual, Model, NlpModel, NlsModel};

fn main() -> feasibility_nls::Result<()> {
    let mut nls = FeasibilityResidual::new(Model::plain(MixedInequalities::new()?))?;
    println!(
        "{}: nvar = {}, nequ = {}",
        nls.meta().name,
        nls.meta().nvar,
        nls.nls_meta().nequ
    );

    // Projected gradient steps on 1/2 ||F(x)||^2 inside the variable bounds.
    let mut x = nls.meta().x0.clone();
    let (lvar, uvar) = (nls.meta().lvar.clone(), nls.meta().uvar.clone());
    let mut g = vec![0.0; x.len()];
    let step = 0.1;
    for iter in 0..200 {
        let f = nls.objgrad(&x, &mut g)?;
        if iter % 40 == 0 {
            println!("iter {iter:>3}: 1/2 ||F||^2 = {f:.3e}");
        }
        for i in 0..x.len() {
            x[i] = (x[i] - step * g[i]).clamp(lvar[i], uvar[i]);
        }
    }

    let mut fx = vec![0.0; nls.nls_meta().nequ];
    nls.residual(&x, &mut fx)?;
    println!("Final x: {x:?}");
    println!("Residual: {fx:?}, norm {:.3e}", vector_norm(fx.len(), &fx));
    print!("{}", nls.counters());

    let nls = FeasibilityResidual::new(Model::least_squares(ConstrainedRosenbrockNls::new()?))?;
    println!(
        "{} wraps a {:?} model with {} variables",
        nls.meta().name,
        nls.inner_kind(),
        nls.meta().nvar
    );

    Ok(())
}
