// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Interval endpoints closer to x = 1 than this are treated as touching the
/// singularity of 1/ln(x).
pub const SINGULARITY_EPSILON: f64 = 1e-10;

/// A rejected integration interval, either at job admission on the
/// coordinator or at task validation on a worker.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParameterError {
    #[error("lower bound must be positive, got {0}")]
    NonPositiveLower(f64),
    #[error("upper bound {upper} must exceed lower bound {lower}")]
    EmptyInterval { lower: f64, upper: f64 },
    #[error("interval [{lower}, {upper}] touches the singularity of 1/ln(x) at x = 1")]
    ContainsSingularity { lower: f64, upper: f64 },
    #[error("step must be positive, got {0}")]
    NonPositiveStep(f64),
    #[error("step {step} must be smaller than the interval width {width}")]
    StepTooLarge { step: f64, width: f64 },
}

/// Validates an integration interval against the constraints of 1/ln(x):
/// positive lower bound, non-empty interval that stays clear of x = 1, and a
/// positive step strictly smaller than the interval width.
pub fn validate_interval(lower: f64, upper: f64, step: f64) -> Result<(), ParameterError> {
    if !(lower > 0.0) {
        return Err(ParameterError::NonPositiveLower(lower));
    }
    if !(upper > lower) {
        return Err(ParameterError::EmptyInterval { lower, upper });
    }
    if (lower - 1.0).abs() < SINGULARITY_EPSILON
        || (upper - 1.0).abs() < SINGULARITY_EPSILON
        || (lower < 1.0 && upper > 1.0)
    {
        return Err(ParameterError::ContainsSingularity { lower, upper });
    }
    if !(step > 0.0) {
        return Err(ParameterError::NonPositiveStep(step));
    }
    if step >= upper - lower {
        return Err(ParameterError::StepTooLarge {
            step,
            width: upper - lower,
        });
    }
    Ok(())
}

/// The one global job description entered by the operator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IntegrationParameters {
    pub lower_limit: f64,
    pub upper_limit: f64,
    pub step: f64,
}

impl IntegrationParameters {
    pub fn new(lower_limit: f64, upper_limit: f64, step: f64) -> Self {
        Self {
            lower_limit,
            upper_limit,
            step,
        }
    }

    pub fn validate(&self) -> Result<(), ParameterError> {
        validate_interval(self.lower_limit, self.upper_limit, self.step)
    }
}
