//! Physical Constants for Humidity Conversions
//!
//! Coefficients for the Magnus-type saturation-vapor-pressure approximation
//! and the derived absolute-humidity and dew-point computations. Two Magnus
//! parameter sets appear here on purpose: absolute humidity uses the
//! Bolton-style fit, dew point the classic Magnus-Tetens fit, matching the
//! calibration the decision thresholds were tuned against.

// ===== SATURATION VAPOR PRESSURE (Magnus, Bolton 1980 fit) =====

/// Base saturation vapor pressure at 0°C (hPa).
///
/// Source: Bolton (1980), "The Computation of Equivalent Potential
/// Temperature"
pub const MAGNUS_SVP_BASE_HPA: f32 = 6.112;

/// Magnus exponent coefficient (dimensionless).
///
/// Valid for -35°C to +35°C, well within indoor conditions.
pub const MAGNUS_SVP_COEFF: f32 = 17.67;

/// Magnus temperature offset (°C).
pub const MAGNUS_SVP_TEMP_OFFSET_C: f32 = 243.5;

// ===== ABSOLUTE HUMIDITY =====

/// Conversion factor from vapor pressure to mass density.
///
/// Derived from the molecular weight of water vapor (18.02 g/mol) and the
/// universal gas constant: 18.02 / 8.314 × 1000 ≈ 2.1674, yielding g/m³
/// when multiplied by pressure in hPa and divided by temperature in kelvin.
pub const ABS_HUMIDITY_FACTOR: f32 = 2.1674;

/// Offset from Celsius to Kelvin.
pub const CELSIUS_TO_KELVIN: f32 = 273.15;

// ===== DEW POINT (Magnus-Tetens) =====

/// Magnus-Tetens coefficient a (dimensionless).
///
/// Source: Magnus-Tetens approximation, accurate to ±0.4°C for
/// 0°C < T < 60°C, 1% < RH < 100%.
pub const DEW_POINT_A: f32 = 17.27;

/// Magnus-Tetens coefficient b (°C).
pub const DEW_POINT_B_C: f32 = 237.7;
