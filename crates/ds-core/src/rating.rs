//! Pool-relative horse rating.
//!
//! Externals are rated on an absolute 0..100 scale; internals relative to
//! the pool (z-score mapped onto a 50-centered scale). The blend weighs
//! externals slightly heavier, matching how field selection sorts a round
//! pool.

use crate::model::Horse;

/// Mean and standard deviation of internal sums across a pool.
pub fn pool_int_stats(horses: &[Horse]) -> (f64, f64) {
    let n = horses.len().max(1) as f64;
    let vals: Vec<f64> = horses.iter().map(|h| f64::from(h.internals.sum())).collect();
    let mu = vals.iter().sum::<f64>() / n;
    let var = vals.iter().map(|v| (v - mu).powi(2)).sum::<f64>() / n;
    let sd = if var > 1e-9 { var.sqrt() } else { 1.0 };
    (mu, sd)
}

/// Rating blend: 55% normalized external sum, 45% pool-relative internals.
pub fn compute_rating(horse: &Horse, pool_int_mean: f64, pool_int_sd: f64) -> f64 {
    let en = f64::from(horse.externals.sum() - 48) / f64::from(288 - 48) * 100.0;
    let z = (f64::from(horse.internals.sum()) - pool_int_mean) / pool_int_sd;
    let inn = z * 15.0 + 50.0;
    0.55 * en + 0.45 * inn
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Externals, Internals, LegType, Sex};

    fn horse(int: i32, ext: i32) -> Horse {
        Horse::new(
            "X",
            "X",
            Sex::M,
            LegType::AL,
            128,
            Internals {
                stamina: int,
                speed: int,
                sharp: int,
            },
            Externals {
                start: ext,
                corner: ext,
                oob: ext,
                competing: ext,
                tenacious: ext,
                spurt: ext,
            },
        )
    }

    #[test]
    fn test_pool_stats_flat_pool() {
        let pool = vec![horse(30, 20), horse(30, 20)];
        let (mu, sd) = pool_int_stats(&pool);
        assert_eq!(mu, 90.0);
        assert_eq!(sd, 1.0); // degenerate variance falls back to 1
    }

    #[test]
    fn test_rating_orders_by_strength() {
        let pool = vec![horse(20, 12), horse(30, 24), horse(40, 40)];
        let (mu, sd) = pool_int_stats(&pool);
        let r: Vec<f64> = pool.iter().map(|h| compute_rating(h, mu, sd)).collect();
        assert!(r[0] < r[1] && r[1] < r[2]);
    }

    #[test]
    fn test_rating_bounds_on_externals() {
        let (mu, sd) = (90.0, 1.0);
        // All-minimum externals contribute 0 to the external term.
        let weak = horse(30, 8);
        let strong = horse(30, 48);
        let rw = compute_rating(&weak, mu, sd);
        let rs = compute_rating(&strong, mu, sd);
        assert!((rs - rw - 55.0).abs() < 1e-9);
    }
}
