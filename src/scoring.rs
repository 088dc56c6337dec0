use crate::codes::TrialCode;

/// Each trial-by-trial target is run exactly this many times per session.
pub const TRIALS_PER_TARGET: usize = 10;

/// Percentage of trials scored correct (`+` or `I`), rounded to 2 decimals.
pub fn accuracy(trials: &[TrialCode; TRIALS_PER_TARGET]) -> f64 {
    let correct = trials.iter().filter(|t| t.is_correct()).count();
    percent_of_trials(correct)
}

/// Same as [`accuracy`] over raw sheet codes. Unknown codes never match and
/// the denominator stays fixed at [`TRIALS_PER_TARGET`].
pub fn accuracy_from_codes<S: AsRef<str>>(codes: &[S]) -> f64 {
    let correct = codes
        .iter()
        .filter(|c| TrialCode::parse(c.as_ref()).is_some_and(TrialCode::is_correct))
        .count();
    percent_of_trials(correct)
}

fn percent_of_trials(correct: usize) -> f64 {
    round2(correct as f64 * 100.0 / TRIALS_PER_TARGET as f64)
}

pub fn round2(val: f64) -> f64 {
    (val * 100.0).round() / 100.0
}
