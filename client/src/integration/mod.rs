// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

pub mod simpsons;
pub mod trapezoidal;

pub use simpsons::SimpsonsRule;
pub use trapezoidal::TrapezoidalRule;

use integration_core::params::ParameterError;

/// The integrand of the whole system.
pub(crate) fn function(x: f64) -> f64 {
    1.0 / x.ln()
}

/// A numerical rule for the definite integral of 1/ln(x) over a
/// sub-interval. Implementations validate their inputs and report
/// violations instead of computing through them.
pub trait IntegrationStrategy: Send + Sync {
    /// Computes the integral from `lower` to `upper` using `step` as the
    /// characteristic spacing.
    fn integrate(&self, lower: f64, upper: f64, step: f64) -> Result<f64, ParameterError>;

    /// Human-readable rule identifier.
    fn method_name(&self) -> &'static str;
}
