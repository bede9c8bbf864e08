use super::{function, IntegrationStrategy};
use integration_core::params::{validate_interval, ParameterError};

/// Composite trapezoid rule. The last sub-step is clipped to the upper
/// bound, so the interval width does not have to be a multiple of the step.
pub struct TrapezoidalRule;

impl IntegrationStrategy for TrapezoidalRule {
    fn integrate(&self, lower: f64, upper: f64, step: f64) -> Result<f64, ParameterError> {
        validate_interval(lower, upper, step)?;

        let mut sum = 0.0;
        let mut x = lower;
        let mut f_prev = function(x);

        while x < upper {
            let x_next = (x + step).min(upper);
            let f_next = function(x_next);

            sum += (f_prev + f_next) * (x_next - x) / 2.0;

            x = x_next;
            f_prev = f_next;
        }

        Ok(sum)
    }

    fn method_name(&self) -> &'static str {
        "Trapezoidal rule"
    }
}
