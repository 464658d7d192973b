//! Release-year sampling biased toward recent years.

use chrono::Datelike;
use rand::Rng;

/// Year of the first Academy Awards; the sampler never goes below it.
pub const FIRST_AWARDS_YEAR: i32 = 1929;

/// The current calendar year in local time.
#[must_use]
pub fn current_year() -> i32 {
    chrono::Local::now().year()
}

/// Draws a year in `[FIRST_AWARDS_YEAR, current_year]`.
///
/// The uniform draw is square-root shaped before scaling, so roughly three
/// quarters of the draws land in the more recent half of the range.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn sample_year<R: Rng + ?Sized>(rng: &mut R, current_year: i32) -> i32 {
    let current = current_year.max(FIRST_AWARDS_YEAR);
    let span = f64::from(current - FIRST_AWARDS_YEAR + 1);
    let shaped = rng.r#gen::<f64>().sqrt();
    let offset = (shaped * span).floor() as i32;
    (FIRST_AWARDS_YEAR + offset).min(current)
}

/// Draws a year with the thread-local RNG and today's date.
#[must_use]
pub fn random_year() -> i32 {
    sample_year(&mut rand::thread_rng(), current_year())
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    #[test]
    fn test_ten_thousand_draws_within_bounds() {
        let mut rng = StdRng::seed_from_u64(1929);
        let now = current_year();
        for _ in 0..10_000 {
            let year = sample_year(&mut rng, now);
            assert!(
                (FIRST_AWARDS_YEAR..=now).contains(&year),
                "year {year} outside [{FIRST_AWARDS_YEAR}, {now}]"
            );
        }
    }

    #[test]
    fn test_distribution_skews_toward_recent_years() {
        let mut rng = StdRng::seed_from_u64(42);
        let now = current_year();
        let midpoint = FIRST_AWARDS_YEAR + (now - FIRST_AWARDS_YEAR) / 2;
        let recent = (0..10_000)
            .filter(|_| sample_year(&mut rng, now) > midpoint)
            .count();
        // Expected share is ~75%.
        assert!(recent > 6_500, "only {recent} of 10000 draws in the upper half");
    }

    #[test]
    fn test_current_year_before_floor_is_clamped() {
        let mut rng = StdRng::seed_from_u64(3);
        assert_eq!(sample_year(&mut rng, 1900), FIRST_AWARDS_YEAR);
    }

    #[test]
    fn test_random_year_within_bounds() {
        let year = random_year();
        assert!((FIRST_AWARDS_YEAR..=current_year()).contains(&year));
    }
}
