//! Price estimation for submitted devices.
//!
//! Pure computation: a base value per device type, scaled by a condition
//! multiplier, with a bounded random jitter on top. Safe to call from any
//! handler concurrently.

use rand::Rng;

/// Jitter stays within this fraction of the base price
const PRICE_JITTER_RATIO: f64 = 0.1;

fn base_value(device_type: &str) -> i64 {
    match device_type.to_ascii_lowercase().as_str() {
        "smartphone" => 120,
        "laptop" => 250,
        "tablet" => 150,
        _ => 120,
    }
}

fn condition_multiplier(condition: &str) -> f64 {
    match condition.to_ascii_lowercase().as_str() {
        "like-new" | "new" => 1.0,
        "good" => 0.7,
        "broken" | "poor" => 0.3,
        _ => 0.7,
    }
}

/// The deterministic part of the estimate, before jitter
pub fn base_price(device_type: &str, condition: &str) -> i64 {
    (base_value(device_type) as f64 * condition_multiplier(condition)).floor() as i64
}

/// Estimate a price for a device. The result carries a uniform jitter of at
/// most 10% of the base price in either direction and never goes below zero.
pub fn estimate(device_type: &str, condition: &str) -> i64 {
    estimate_with_rng(device_type, condition, &mut rand::rng())
}

pub fn estimate_with_rng<R: Rng + ?Sized>(
    device_type: &str,
    condition: &str,
    rng: &mut R,
) -> i64 {
    let base = base_price(device_type, condition);
    // Flooring the variance keeps the draw integral and strictly inside the
    // +/-10% band
    let variance = (base as f64 * PRICE_JITTER_RATIO).floor() as i64;
    let jitter = if variance > 0 {
        rng.random_range(-variance..=variance)
    } else {
        0
    };
    (base + jitter).max(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    const KNOWN_DEVICES: &[&str] = &["smartphone", "laptop", "tablet"];
    const KNOWN_CONDITIONS: &[&str] = &["like-new", "good", "broken"];

    #[test]
    fn test_base_table() {
        assert_eq!(base_price("smartphone", "like-new"), 120);
        assert_eq!(base_price("laptop", "like-new"), 250);
        assert_eq!(base_price("tablet", "like-new"), 150);
        assert_eq!(base_price("laptop", "good"), 175);
        assert_eq!(base_price("laptop", "broken"), 75);
        assert_eq!(base_price("smartphone", "broken"), 36);
    }

    #[test]
    fn test_unknown_inputs_fall_back() {
        // Unknown device -> 120, unknown condition -> 0.7
        assert_eq!(base_price("unknown-device", "unknown-condition"), 84);
        assert_eq!(base_price("desktop", "fair"), 84);
        assert_eq!(base_price("electrical-wire", "good"), 84);
    }

    #[test]
    fn test_marketplace_grades_map_onto_table() {
        assert_eq!(base_price("smartphone", "new"), 120);
        assert_eq!(base_price("smartphone", "poor"), 36);
        assert_eq!(base_price("smartphone", "fair"), 84);
    }

    #[test]
    fn test_estimate_within_ten_percent_inclusive() {
        let mut rng = rand::rng();
        for device in KNOWN_DEVICES {
            for condition in KNOWN_CONDITIONS {
                let base = base_price(device, condition);
                let variance = (base as f64 * PRICE_JITTER_RATIO).floor() as i64;
                for _ in 0..500 {
                    let price = estimate_with_rng(device, condition, &mut rng);
                    assert!(
                        price >= base - variance && price <= base + variance,
                        "{device}/{condition}: {price} outside [{}, {}]",
                        base - variance,
                        base + variance
                    );
                }
            }
        }
    }

    #[test]
    fn test_estimate_never_negative() {
        let mut rng = rand::rng();
        for _ in 0..500 {
            assert!(estimate_with_rng("unknown", "broken", &mut rng) >= 0);
        }
    }

    #[test]
    fn test_estimate_is_case_insensitive() {
        assert_eq!(base_price("Smartphone", "Like-New"), 120);
        assert_eq!(base_price("LAPTOP", "GOOD"), 175);
    }
}
