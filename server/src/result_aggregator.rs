// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use integration_core::messages::{ResultBatch, TaskResult};
use std::sync::{Condvar, Mutex};
use std::time::Duration;
use tracing::{debug, error, info, warn};

struct AggregatorState {
    total_sum: f64,
    received_count: usize,
    successful_count: usize,
    error_count: usize,
    all_results: Vec<TaskResult>,
}

/// Thread-safe fan-in point for worker result batches.
///
/// Collectors call `add` from independent threads; the orchestrator blocks
/// in `wait_for_all` until every expected result arrived or the deadline
/// passed. The sum is a plain f64 accumulation: floating-point
/// associativity loss is accepted, so the final value may differ in the last
/// bits depending on arrival order.
pub struct ResultAggregator {
    expected_count: usize,
    state: Mutex<AggregatorState>,
    completion: Condvar,
}

impl ResultAggregator {
    pub fn new(expected_count: usize) -> Self {
        info!(expected_count, "result aggregator initialized");
        Self {
            expected_count,
            state: Mutex::new(AggregatorState {
                total_sum: 0.0,
                received_count: 0,
                successful_count: 0,
                error_count: 0,
                all_results: Vec::with_capacity(expected_count),
            }),
            completion: Condvar::new(),
        }
    }

    /// Folds one result batch into the running totals and wakes all waiters.
    pub fn add(&self, batch: &ResultBatch) {
        let mut state = self.state.lock().unwrap();

        debug!(
            client_id = batch.client_id,
            results = batch.results.len(),
            time_seconds = batch.total_time_seconds,
            "result batch received"
        );

        for result in &batch.results {
            if result.success {
                state.total_sum += result.value;
                state.successful_count += 1;
            } else {
                state.error_count += 1;
                error!(
                    task_id = result.task_id,
                    error = %result.error_message,
                    "task failed on worker"
                );
            }
            state.all_results.push(result.clone());
        }

        state.received_count += batch.results.len();

        info!(
            received = state.received_count,
            expected = self.expected_count,
            "collection progress"
        );

        self.completion.notify_all();
    }

    /// Blocks until every expected result arrived. Returns false if the
    /// timeout elapsed first; `timeout_seconds == 0` waits forever.
    pub fn wait_for_all(&self, timeout_seconds: u64) -> bool {
        let state = self.state.lock().unwrap();

        if timeout_seconds == 0 {
            let _state = self
                .completion
                .wait_while(state, |s| s.received_count < self.expected_count)
                .unwrap();
            return true;
        }

        let (state, wait_result) = self
            .completion
            .wait_timeout_while(
                state,
                Duration::from_secs(timeout_seconds),
                |s| s.received_count < self.expected_count,
            )
            .unwrap();

        if wait_result.timed_out() {
            warn!(
                received = state.received_count,
                expected = self.expected_count,
                "timed out waiting for results"
            );
            false
        } else {
            true
        }
    }

    /// Running sum over all successful results. Well-defined before
    /// completion, where it reflects the partial sum (diagnostics only).
    pub fn final_result(&self) -> f64 {
        self.state.lock().unwrap().total_sum
    }

    pub fn expected_count(&self) -> usize {
        self.expected_count
    }

    pub fn received_count(&self) -> usize {
        self.state.lock().unwrap().received_count
    }

    pub fn successful_count(&self) -> usize {
        self.state.lock().unwrap().successful_count
    }

    pub fn error_count(&self) -> usize {
        self.state.lock().unwrap().error_count
    }

    /// All results in arrival order. The order carries no task_id contract.
    pub fn all_results(&self) -> Vec<TaskResult> {
        self.state.lock().unwrap().all_results.clone()
    }

    pub fn log_summary(&self) {
        let state = self.state.lock().unwrap();
        info!(
            expected = self.expected_count,
            received = state.received_count,
            successful = state.successful_count,
            errors = state.error_count,
            result = state.total_sum,
            "integration results"
        );
    }
}
