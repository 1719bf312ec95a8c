use crate::state::history::History;

pub const MIN_SAMPLES: usize = 10;

/// Offsets past the end of the history at which the fitted line is sampled.
const HORIZONS: [usize; 3] = [0, 5, 10];

/// Short-horizon load forecast: least-squares line through the recorded load
/// scores against sample index, averaged over three future points. Returns 0
/// with fewer than ten samples or on a degenerate fit; never fails past the
/// caller.
pub fn forecast(history: &History) -> f64 {
    let loads = history.iter().map(|s| s.load()).collect::<Vec<f64>>();
    let n = loads.len();
    if n < MIN_SAMPLES {
        return 0.0;
    }
    let Some((slope, intercept)) = fit_line(&loads) else {
        return 0.0;
    };
    let sum = HORIZONS
        .iter()
        .map(|h| slope * (n + h) as f64 + intercept)
        .sum::<f64>();
    let mean = sum / HORIZONS.len() as f64;
    if mean.is_finite() { mean } else { 0.0 }
}

fn fit_line(y: &[f64]) -> Option<(f64, f64)> {
    let n = y.len() as f64;
    let sum_x = (0..y.len()).sum::<usize>() as f64;
    let sum_xx = (0..y.len()).map(|i| i * i).sum::<usize>() as f64;
    let sum_y = y.iter().sum::<f64>();
    let sum_xy = y.iter().enumerate().map(|(i, v)| i as f64 * v).sum::<f64>();

    let denom = n * sum_xx - sum_x * sum_x;
    if !denom.is_finite() || denom.abs() < f64::EPSILON {
        return None;
    }
    let slope = (n * sum_xy - sum_x * sum_y) / denom;
    let intercept = (sum_y - slope * sum_x) / n;
    (slope.is_finite() && intercept.is_finite()).then_some((slope, intercept))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::history::Sample;
    use approx::assert_relative_eq;

    fn history_of(loads: impl IntoIterator<Item = f64>) -> History {
        let mut history = History::new();
        for (i, load) in loads.into_iter().enumerate() {
            history.push(Sample::new(i as f64, 0.0, 0.0, 0.0, load));
        }
        history
    }

    #[test]
    fn test_exact_line_extrapolates() {
        // y = 2x + 1 over indices 0..9; the line sampled at 10, 15 and 20
        // gives (21 + 31 + 41) / 3.
        let history = history_of((0..10).map(|x| 2.0 * x as f64 + 1.0));
        assert_relative_eq!(31.0, forecast(&history), epsilon = 1e-9);
    }

    #[test]
    fn test_too_few_samples_give_zero() {
        let history = history_of((0..9).map(|x| x as f64));
        assert_relative_eq!(0.0, forecast(&history));
    }

    #[test]
    fn test_flat_history_forecasts_itself() {
        let history = history_of(std::iter::repeat(42.0).take(20));
        assert_relative_eq!(42.0, forecast(&history), epsilon = 1e-9);
    }

    #[test]
    fn test_non_finite_loads_give_zero() {
        let history = history_of((0..12).map(|i| if i == 5 { f64::NAN } else { 1.0 }));
        assert_relative_eq!(0.0, forecast(&history));
    }
}
