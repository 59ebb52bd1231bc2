//! Revenue split between the instructor of a course and the platform.

use crate::{EngineError, MoneyCents, ResultEngine};

const BASIS_POINTS: i64 = 10_000;

/// Instructor share used when no other rate is configured (80%).
pub const DEFAULT_INSTRUCTOR_SHARE_BPS: u32 = 8_000;

/// The two parts a course price is split into at purchase time.
///
/// `instructor + platform` always equals the price that was split.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Shares {
    pub instructor: MoneyCents,
    pub platform: MoneyCents,
}

impl Shares {
    pub fn total(&self) -> MoneyCents {
        self.instructor + self.platform
    }
}

/// Computes the instructor/platform split of a price.
///
/// The instructor share is `price * rate` rounded to the cent with
/// round-half-up; the platform keeps the remainder, so no cent is lost or
/// created by rounding.
///
/// ```rust
/// use engine::{MoneyCents, PricingPolicy};
///
/// let shares = PricingPolicy::default().split(MoneyCents::new(100_00)).unwrap();
/// assert_eq!(shares.instructor, MoneyCents::new(80_00));
/// assert_eq!(shares.platform, MoneyCents::new(20_00));
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PricingPolicy {
    instructor_share_bps: u32,
}

impl Default for PricingPolicy {
    fn default() -> Self {
        Self {
            instructor_share_bps: DEFAULT_INSTRUCTOR_SHARE_BPS,
        }
    }
}

impl PricingPolicy {
    /// Creates a policy granting `instructor_share_bps / 10000` of each price
    /// to the instructor.
    pub fn new(instructor_share_bps: u32) -> ResultEngine<Self> {
        if i64::from(instructor_share_bps) > BASIS_POINTS {
            return Err(EngineError::InvalidAmount(format!(
                "instructor share must be <= {BASIS_POINTS} bps, got {instructor_share_bps}"
            )));
        }
        Ok(Self {
            instructor_share_bps,
        })
    }

    pub fn instructor_share_bps(self) -> u32 {
        self.instructor_share_bps
    }

    pub fn split(self, price: MoneyCents) -> ResultEngine<Shares> {
        if price.is_negative() {
            return Err(EngineError::InvalidAmount(
                "price must be >= 0".to_string(),
            ));
        }

        let scaled = i128::from(price.cents()) * i128::from(self.instructor_share_bps);
        let rounded = (scaled + i128::from(BASIS_POINTS / 2)) / i128::from(BASIS_POINTS);
        // rounded <= price, so it always fits back into i64.
        let instructor = i64::try_from(rounded)
            .map(MoneyCents::new)
            .map_err(|_| EngineError::InvalidAmount("price too large".to_string()))?;

        Ok(Shares {
            instructor,
            platform: price - instructor,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn split(bps: u32, cents: i64) -> (i64, i64) {
        let shares = PricingPolicy::new(bps)
            .unwrap()
            .split(MoneyCents::new(cents))
            .unwrap();
        (shares.instructor.cents(), shares.platform.cents())
    }

    #[test]
    fn default_split_is_eighty_twenty() {
        assert_eq!(split(8_000, 100_00), (80_00, 20_00));
        assert_eq!(split(8_000, 50_00), (40_00, 10_00));
        assert_eq!(split(8_000, 0), (0, 0));
    }

    #[test]
    fn fractional_cents_round_to_nearest() {
        // 99.99 * 0.8 = 79.992
        assert_eq!(split(8_000, 99_99), (79_99, 20_00));
        // 0.03 * 0.8 = 0.024
        assert_eq!(split(8_000, 3), (2, 1));
        // 0.01 * 0.8 = 0.008
        assert_eq!(split(8_000, 1), (1, 0));
    }

    #[test]
    fn exact_halves_round_up() {
        // 0.02 * 0.75 = 0.015 and 0.06 * 0.75 = 0.045: half-even would give 2 and 4.
        assert_eq!(split(7_500, 2), (2, 0));
        assert_eq!(split(7_500, 6), (5, 1));
        // 0.01 * 0.5 = 0.005
        assert_eq!(split(5_000, 1), (1, 0));
    }

    #[test]
    fn shares_always_add_up_to_price() {
        for bps in [0, 1, 3_333, 5_000, 7_500, 8_000, 9_999, 10_000] {
            let policy = PricingPolicy::new(bps).unwrap();
            for cents in (0..2_000).chain([99_99, 1_234_567]) {
                let price = MoneyCents::new(cents);
                let shares = policy.split(price).unwrap();
                assert_eq!(shares.total(), price, "bps={bps} cents={cents}");
                assert!(!shares.instructor.is_negative());
                assert!(!shares.platform.is_negative());
            }
        }
    }

    #[test]
    fn rejects_negative_price_and_bad_rate() {
        assert!(PricingPolicy::default().split(MoneyCents::new(-1)).is_err());
        assert!(PricingPolicy::new(10_001).is_err());
    }
}
