//! Statistics calculation primitives.
//!
//! Pure arithmetic used by the aggregate updater and the ranking pass:
//! - Winning percentage with ties counted as half a win
//! - Pythagorean expectation from points scored and allowed
//! - Division that yields `None` instead of `inf`/`NaN`

/// Exponent tuned for professional football scoring.
pub const DEFAULT_PYTHAGOREAN_EXPONENT: f64 = 2.37;

/// Calculate winning percentage from a won-loss-tie record.
///
/// Ties count as half a win. `losses` is implied by `games` and is only
/// accepted so call sites read like the record they come from.
pub fn winning_percentage(wins: u32, _losses: u32, ties: u32, games: u32) -> Option<f64> {
    divide(
        f64::from(2 * wins + ties),
        multiply(2.0, f64::from(games)),
    )
}

/// Pythagorean winning percentage with the default exponent.
pub fn pythagorean_winning_percentage(points_for: u32, points_against: u32) -> Option<f64> {
    pythagorean_winning_percentage_with_exponent(
        points_for,
        points_against,
        DEFAULT_PYTHAGOREAN_EXPONENT,
    )
}

/// `pf^e / (pf^e + pa^e)`; `None` when both sides are zero.
pub fn pythagorean_winning_percentage_with_exponent(
    points_for: u32,
    points_against: u32,
    exponent: f64,
) -> Option<f64> {
    let scored = f64::from(points_for).powf(exponent);
    let allowed = f64::from(points_against).powf(exponent);
    divide(scored, add(scored, allowed))
}

/// Expected wins and losses over `games` for a Pythagorean percentage.
///
/// An undefined percentage yields `(0.0, 0.0)` so stale values never linger.
pub fn pythagorean_record(percentage: Option<f64>, games: u32) -> (f64, f64) {
    match percentage {
        Some(pct) => {
            let games = f64::from(games);
            (multiply(pct, games), multiply(subtract(1.0, pct), games))
        }
        None => (0.0, 0.0),
    }
}

pub fn add(a: f64, b: f64) -> f64 {
    a + b
}

pub fn subtract(a: f64, b: f64) -> f64 {
    a - b
}

pub fn multiply(a: f64, b: f64) -> f64 {
    a * b
}

/// Divide, returning `None` for a zero divisor.
pub fn divide(a: f64, b: f64) -> Option<f64> {
    if b == 0.0 {
        None
    } else {
        Some(a / b)
    }
}
