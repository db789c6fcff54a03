//! Growth-rate helpers for regret curves.

/// Least-squares slope of `ln(y)` against `ln(x)`.
///
/// Points with a non-positive coordinate are skipped. Returns `None` when
/// fewer than two usable points remain or all `x` coincide. A slope below 1
/// means `y` grows sub-linearly in `x`.
pub fn log_log_slope(points: &[(f64, f64)]) -> Option<f64> {
    let logs: Vec<(f64, f64)> = points
        .iter()
        .filter(|(x, y)| *x > 0.0 && *y > 0.0)
        .map(|(x, y)| (x.ln(), y.ln()))
        .collect();
    if logs.len() < 2 {
        return None;
    }
    let n = logs.len() as f64;
    let mean_x = logs.iter().map(|(x, _)| x).sum::<f64>() / n;
    let mean_y = logs.iter().map(|(_, y)| y).sum::<f64>() / n;
    let mut cov = 0.0;
    let mut var = 0.0;
    for (x, y) in &logs {
        cov += (x - mean_x) * (y - mean_y);
        var += (x - mean_x).powi(2);
    }
    if var == 0.0 { None } else { Some(cov / var) }
}
