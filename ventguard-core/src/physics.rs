//! Humidity Physics Conversions
//!
//! ## Overview
//!
//! Relative humidity alone is a misleading signal for ventilation advice:
//! opening a window in winter drops the temperature, which *raises* relative
//! humidity even while the absolute amount of water in the air falls. The
//! decision engine therefore works on two derived quantities:
//!
//! - **Absolute humidity** (g/m³): mass of water vapor per cubic meter.
//!   Independent of temperature, so it tells us whether drying is actually
//!   happening.
//! - **Dew point** (°C): the temperature at which the current moisture
//!   content condenses. The gap between wall temperature and dew point is
//!   the practical mold-risk signal.
//!
//! ## Method
//!
//! Both derive from a Magnus-type saturation-vapor-pressure approximation:
//!
//! ```text
//! svp(t)        = 6.112 · e^(17.67·t / (t + 243.5))          [hPa]
//! absHum(t, rh) = svp(t) · rh · 2.1674 / (273.15 + t)        [g/m³]
//! γ(t, rh)      = 17.27·t / (237.7 + t) + ln(rh / 100)
//! dewPoint      = 237.7·γ / (17.27 − γ)                      [°C]
//! ```
//!
//! Accuracy is within ±0.4°C / ±0.1 g/m³ over indoor conditions, far inside
//! the ±2% RH the sensor itself delivers.
//!
//! ## Contract
//!
//! These are pure, total functions. An undefined input (NaN or infinite)
//! yields `None`; so do the pathological non-physical corners where the
//! formulas degenerate (relative humidity ≤ 0 for dew point). No panics,
//! no global state.

use crate::constants::physics::{
    ABS_HUMIDITY_FACTOR, CELSIUS_TO_KELVIN, DEW_POINT_A, DEW_POINT_B_C,
    MAGNUS_SVP_BASE_HPA, MAGNUS_SVP_COEFF, MAGNUS_SVP_TEMP_OFFSET_C,
};

/// Saturation vapor pressure in hPa at the given temperature.
///
/// Magnus approximation; NaN input propagates to a NaN output. Use the
/// checked conversions below unless the input is already known finite.
pub fn saturation_vapor_pressure(temp_c: f32) -> f32 {
    let exponent = (MAGNUS_SVP_COEFF * temp_c) / (temp_c + MAGNUS_SVP_TEMP_OFFSET_C);
    MAGNUS_SVP_BASE_HPA * libm::expf(exponent)
}

/// Absolute humidity in g/m³ from temperature (°C) and relative humidity (%).
///
/// Returns `None` iff either input is undefined (non-finite), or if the
/// result itself degenerates (possible only far outside sensor range).
pub fn absolute_humidity(temp_c: f32, humidity_pct: f32) -> Option<f32> {
    if !temp_c.is_finite() || !humidity_pct.is_finite() {
        return None;
    }

    let svp = saturation_vapor_pressure(temp_c);
    let abs = (svp * humidity_pct * ABS_HUMIDITY_FACTOR) / (CELSIUS_TO_KELVIN + temp_c);

    if abs.is_finite() {
        Some(abs)
    } else {
        None
    }
}

/// Dew point in °C from temperature (°C) and relative humidity (%).
///
/// Returns `None` iff either input is undefined, or for `humidity_pct <= 0`
/// where the logarithm is undefined.
pub fn dew_point(temp_c: f32, humidity_pct: f32) -> Option<f32> {
    if !temp_c.is_finite() || !humidity_pct.is_finite() {
        return None;
    }
    if humidity_pct <= 0.0 {
        return None;
    }

    let gamma = (DEW_POINT_A * temp_c) / (DEW_POINT_B_C + temp_c)
        + libm::logf(humidity_pct / 100.0);
    let dp = (DEW_POINT_B_C * gamma) / (DEW_POINT_A - gamma);

    if dp.is_finite() {
        Some(dp)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn absolute_humidity_reference_point() {
        // 20°C at 50% RH is ~8.6 g/m³ in standard psychrometric tables
        let abs = absolute_humidity(20.0, 50.0).unwrap();
        assert!((abs - 8.6).abs() < 0.2, "got {abs}");
    }

    #[test]
    fn dew_point_reference_point() {
        // 20°C at 50% RH dews at ~9.3°C
        let dp = dew_point(20.0, 50.0).unwrap();
        assert!((dp - 9.3).abs() < 0.2, "got {dp}");
    }

    #[test]
    fn saturated_air_dews_at_air_temperature() {
        let dp = dew_point(15.0, 100.0).unwrap();
        assert!((dp - 15.0).abs() < 0.1, "got {dp}");
    }

    #[test]
    fn undefined_inputs_propagate() {
        assert!(absolute_humidity(f32::NAN, 50.0).is_none());
        assert!(absolute_humidity(20.0, f32::NAN).is_none());
        assert!(absolute_humidity(f32::INFINITY, 50.0).is_none());
        assert!(dew_point(f32::NAN, 50.0).is_none());
        assert!(dew_point(20.0, f32::NAN).is_none());
    }

    #[test]
    fn zero_humidity_has_no_dew_point() {
        assert!(dew_point(20.0, 0.0).is_none());
        // ...but carries exactly zero water
        assert_eq!(absolute_humidity(20.0, 0.0), Some(0.0));
    }

    #[test]
    fn warmer_air_holds_more_water() {
        let cold = absolute_humidity(5.0, 60.0).unwrap();
        let warm = absolute_humidity(25.0, 60.0).unwrap();
        assert!(warm > cold);
    }

    proptest! {
        #[test]
        fn dew_point_never_exceeds_temperature(
            t in -30.0f32..50.0,
            rh in 0.5f32..100.0,
        ) {
            let dp = dew_point(t, rh).unwrap();
            // Equality only at saturation; allow float slack at that corner
            prop_assert!(dp <= t + 0.05, "dp {} > t {}", dp, t);
        }

        #[test]
        fn conversions_defined_for_plausible_inputs(
            t in -30.0f32..50.0,
            rh in 0.0f32..100.0,
        ) {
            let abs = absolute_humidity(t, rh).unwrap();
            prop_assert!(abs >= 0.0);
            if rh > 0.0 {
                prop_assert!(dew_point(t, rh).is_some());
            }
        }

        #[test]
        fn more_humidity_means_higher_dew_point(
            t in -10.0f32..40.0,
            rh in 1.0f32..85.0,
        ) {
            let lower = dew_point(t, rh).unwrap();
            let higher = dew_point(t, rh + 10.0).unwrap();
            prop_assert!(higher > lower);
        }
    }
}
