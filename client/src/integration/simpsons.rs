use super::{function, IntegrationStrategy};
use integration_core::params::{validate_interval, ParameterError};

/// Composite Simpson's rule, the production default.
///
/// The rule needs an even interval count, so the count derived from the
/// requested step is rounded up to the next even integer and the effective
/// step re-derived from it.
pub struct SimpsonsRule;

impl IntegrationStrategy for SimpsonsRule {
    fn integrate(&self, lower: f64, upper: f64, step: f64) -> Result<f64, ParameterError> {
        validate_interval(lower, upper, step)?;

        let mut n = ((upper - lower) / step).ceil() as u64;
        if n % 2 == 1 {
            n += 1;
        }

        let h = (upper - lower) / n as f64;

        let mut sum = function(lower) + function(upper);
        for i in 1..n {
            let x = lower + i as f64 * h;
            if i % 2 == 0 {
                sum += 2.0 * function(x);
            } else {
                sum += 4.0 * function(x);
            }
        }

        Ok(sum * h / 3.0)
    }

    fn method_name(&self) -> &'static str {
        "Simpson's rule"
    }
}
