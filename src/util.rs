//! Numeric helpers shared by the report and its rendering.

/// Arithmetic mean, None when there is nothing to average.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Population standard deviation.
pub fn std_dev(values: &[f64]) -> Option<f64> {
    let centre = mean(values)?;
    let variance = values
        .iter()
        .map(|v| (v - centre).powi(2))
        .sum::<f64>()
        / values.len() as f64;
    Some(variance.sqrt())
}

/// Whole numbers print without decimals ("60"), anything else with two.
pub fn format_number(val: f64) -> String {
    if val.fract() == 0.0 {
        format!("{val:.0}")
    } else {
        format!("{val:.2}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_number_drops_trailing_zeroes() {
        assert_eq!(format_number(60.0), "60");
        assert_eq!(format_number(33.333), "33.33");
        assert_eq!(format_number(0.0), "0");
        assert_eq!(format_number(66.67), "66.67");
    }

    #[test]
    fn mean_of_session_scores() {
        assert_eq!(mean(&[60.0, 80.0, 100.0]), Some(80.0));
        assert_eq!(mean(&[42.0]), Some(42.0));
        assert_eq!(mean(&[]), None);
    }

    #[test]
    fn std_dev_is_population() {
        assert_eq!(std_dev(&[60.0, 80.0]), Some(10.0));
        assert_eq!(std_dev(&[70.0, 70.0, 70.0]), Some(0.0));
        assert_eq!(std_dev(&[]), None);

        let sd = std_dev(&[40.0, 60.0, 90.0]).unwrap();
        assert!((sd - 20.548046676563256).abs() < 1e-9);
    }
}
