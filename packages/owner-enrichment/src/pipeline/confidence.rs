//! Deterministic confidence heuristic for (email, name) pairs.

use regex::Regex;
use std::sync::LazyLock;

static RE_NAME_TOKEN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\p{Alphabetic}+").unwrap());

/// Score every email starts from.
pub const BASELINE_CONFIDENCE: f64 = 0.5;

/// Added per name token found in the email's local part.
pub const TOKEN_MATCH_BONUS: f64 = 0.2;

/// Score how plausibly `email` belongs to `name`, in `[0.5, 1.0]`.
///
/// Each alphabetic token of the lower-cased name that appears in the
/// lower-cased local part adds [`TOKEN_MATCH_BONUS`]. An email without `@`
/// scores the baseline.
pub fn score_email(email: &str, name: &str) -> f64 {
    let Some((local, _domain)) = email.split_once('@') else {
        return BASELINE_CONFIDENCE;
    };
    let local = local.to_lowercase();
    let name = name.to_lowercase();

    let matched = RE_NAME_TOKEN
        .find_iter(&name)
        .filter(|token| local.contains(token.as_str()))
        .count();

    (BASELINE_CONFIDENCE + TOKEN_MATCH_BONUS * matched as f64).min(1.0)
}
