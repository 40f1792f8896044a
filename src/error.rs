//! Error kinds for the crate.
//!
//! The daily simulation step is total: it never returns `Err`. Recoverable
//! arithmetic issues (out-of-range trig arguments, divisions by zero) are
//! clamped or substituted in place and logged via `tracing`, not surfaced
//! as errors. `MonicaError` exists for the genuinely fallible paths: parsing
//! a parameter file and resolving a dangling cross-reference between crop
//! parameter sets.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum MonicaError {
    #[error("parameter value out of range: {message}")]
    ParameterOutOfRange { message: String },

    #[error("developmental stage became invalid ({stage}); retained previous stage {retained}")]
    IrregularDevelopmentalStage { stage: i32, retained: usize },

    #[error("parameter reference '{reference}' could not be resolved")]
    ParameterReferenceUnresolved { reference: String },

    #[error("failed to parse parameter file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("failed to parse JSON parameter file: {0}")]
    JsonParseError(#[from] serde_json::Error),

    #[error("failed to read parameter file: {0}")]
    Io(#[from] std::io::Error),
}

/// Clamps an `asin`/`acos` argument into `[-1, 1]`, logging when it had to.
///
/// Radiation-geometry formulas (declination, day length) occasionally push
/// the argument a few ULPs outside the domain at high latitudes or extreme
/// declinations; MONICA clamps rather than propagating `NaN`.
pub fn clamp_trig_arg(x: f64) -> f64 {
    if !(-1.0..=1.0).contains(&x) {
        tracing::warn!(value = x, "clamping asin/acos argument to [-1, 1]");
        x.clamp(-1.0, 1.0)
    } else {
        x
    }
}

/// Divides `num / den`, substituting `default` when `den` is (numerically)
/// zero instead of propagating `inf`/`NaN`.
pub fn safe_div(num: f64, den: f64, default: f64) -> f64 {
    if den.abs() < 1e-12 {
        default
    } else {
        num / den
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamp_trig_arg_passes_through_in_domain() {
        assert_eq!(clamp_trig_arg(0.5), 0.5);
    }

    #[test]
    fn clamp_trig_arg_clamps_above_one() {
        assert_eq!(clamp_trig_arg(1.2), 1.0);
    }

    #[test]
    fn clamp_trig_arg_clamps_below_negative_one() {
        assert_eq!(clamp_trig_arg(-1.2), -1.0);
    }

    #[test]
    fn safe_div_substitutes_default_on_zero_denominator() {
        assert_eq!(safe_div(5.0, 0.0, -1.0), -1.0);
    }

    #[test]
    fn safe_div_normal_case() {
        assert!((safe_div(10.0, 4.0, 0.0) - 2.5).abs() < 1e-9);
    }
}
