// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::integration::IntegrationStrategy;
use integration_core::messages::{Task, TaskResult};
use tracing::{debug, error, info};

/// Executes single tasks against the configured integration strategy.
///
/// All failure modes surface as failed `TaskResult`s; nothing propagates to
/// the caller, so a bad task never takes a worker thread down with it.
pub struct Integrator {
    strategy: Box<dyn IntegrationStrategy>,
}

impl Integrator {
    pub fn new(strategy: Box<dyn IntegrationStrategy>) -> Self {
        info!(method = strategy.method_name(), "integrator initialized");
        Self { strategy }
    }

    pub fn set_strategy(&mut self, strategy: Box<dyn IntegrationStrategy>) {
        info!(
            from = self.strategy.method_name(),
            to = strategy.method_name(),
            "integration strategy changed"
        );
        self.strategy = strategy;
    }

    pub fn method_name(&self) -> &'static str {
        self.strategy.method_name()
    }

    pub fn execute_task(&self, task: &Task) -> TaskResult {
        if !task.is_valid() {
            error!(task_id = task.id, "task validation failed");
            return TaskResult::failure(task.id, "Invalid task parameters");
        }

        debug!(
            task_id = task.id,
            begin = task.begin,
            end = task.end,
            step = task.step,
            "executing task"
        );

        match self.strategy.integrate(task.begin, task.end, task.step) {
            Ok(value) if value.is_finite() => {
                debug!(task_id = task.id, value, "task completed");
                TaskResult::success(task.id, value)
            }
            Ok(value) => {
                error!(task_id = task.id, value, "non-finite integration result");
                TaskResult::failure(task.id, format!("non-finite integration result: {value}"))
            }
            Err(e) => {
                error!(task_id = task.id, error = %e, "task failed");
                TaskResult::failure(task.id, e.to_string())
            }
        }
    }
}
