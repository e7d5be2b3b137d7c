//! Small level-1 vector kernels.

/// AXPY: y = alpha * x + y
pub fn vector_add_scaled(n: usize, alpha: f64, x: &[f64], y: &mut [f64]) {
    if n == 0 || alpha == 0.0 {
        return;
    }

    y[..n]
        .iter_mut()
        .zip(x[..n].iter())
        .for_each(|(y_i, x_i)| {
            *y_i += alpha * x_i;
        });
}

/// SCAL: x = alpha * x
pub fn vector_scale(n: usize, alpha: f64, x: &mut [f64]) {
    if n == 0 {
        return;
    }

    x[..n].iter_mut().for_each(|x_i| *x_i *= alpha);
}

/// DOT: sum of x_i * y_i over the first n entries.
pub fn vector_dot_product(n: usize, x: &[f64], y: &[f64]) -> f64 {
    x[..n].iter().zip(y[..n].iter()).map(|(x_i, y_i)| x_i * y_i).sum()
}

/// NRM2: Euclidean norm, scaled by the largest magnitude to avoid overflow.
pub fn vector_norm(n: usize, x: &[f64]) -> f64 {
    let scale = x[..n].iter().fold(0.0f64, |acc, x_i| acc.max(x_i.abs()));
    if scale == 0.0 || !scale.is_finite() {
        return scale;
    }

    let sum_squares: f64 = x[..n].iter().map(|x_i| (x_i / scale).powi(2)).sum();
    scale * sum_squares.sqrt()
}

/// One-hot vector: e[i] = 1, zero elsewhere.
pub fn unit_vector(i: usize, e: &mut [f64]) {
    e.iter_mut().for_each(|e_k| *e_k = 0.0);
    e[i] = 1.0;
}
