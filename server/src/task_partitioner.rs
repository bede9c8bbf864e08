// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use integration_core::messages::{Task, TaskBatch};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use thiserror::Error;
use tracing::info;

/// Process-wide monotonic task id source, starting at 1.
static NEXT_TASK_ID: AtomicU64 = AtomicU64::new(1);

/// Restarts task id assignment at 1 for a fresh coordinator run.
pub fn reset_task_ids() {
    NEXT_TASK_ID.store(1, Ordering::SeqCst);
}

#[derive(Debug, Error)]
pub enum PartitionError {
    #[error("no workers registered at partition time")]
    NoWorkers,
    #[error(
        "partitioning produced unintegrable task {id} over [{begin}, {end}]; \
         refusing to dispatch the job"
    )]
    InvalidTask { id: u64, begin: f64, end: f64 },
}

/// Splits a global integration interval into per-worker task batches sized
/// by each worker's share of the pool's CPU cores.
///
/// Every worker gets one contiguous task per reported core, so its local
/// thread pool runs fully occupied. Walking the workers in registry order
/// with a running cursor keeps the cover contiguous; the very last task is
/// clamped to the exact upper bound to cancel accumulated floating-point
/// drift.
pub struct TaskPartitioner {
    total_tasks: usize,
}

impl Default for TaskPartitioner {
    fn default() -> Self {
        Self::new()
    }
}

impl TaskPartitioner {
    pub fn new() -> Self {
        Self { total_tasks: 0 }
    }

    /// Total number of tasks created by the last `distribute` call. The
    /// result aggregator reads this as its expected count.
    pub fn total_tasks(&self) -> usize {
        self.total_tasks
    }

    /// Builds the per-worker task batches for `clients`, given as
    /// `(client_id, cpu_cores)` pairs in registry order.
    ///
    /// A worker reporting zero cores should have been rejected at handshake;
    /// if one slips through it is treated as a single-core worker. After
    /// construction every task is re-validated: floating-point drift that
    /// lands a sub-interval endpoint in the forbidden zone around x = 1
    /// rejects the whole job before anything is dispatched.
    pub fn distribute(
        &mut self,
        clients: &[(u64, u32)],
        lower: f64,
        upper: f64,
        step: f64,
    ) -> Result<HashMap<u64, TaskBatch>, PartitionError> {
        if clients.is_empty() {
            return Err(PartitionError::NoWorkers);
        }

        info!(
            lower,
            upper,
            step,
            clients = clients.len(),
            "distributing integration interval"
        );

        let total_cores: u32 = clients.iter().map(|&(_, cores)| cores.max(1)).sum();
        let total_range = upper - lower;
        let mut position = lower;

        let mut batches = HashMap::with_capacity(clients.len());
        self.total_tasks = 0;

        for (client_index, &(client_id, cores)) in clients.iter().enumerate() {
            let num_tasks = cores.max(1);
            let client_range = total_range * f64::from(num_tasks) / f64::from(total_cores);
            let task_range = client_range / f64::from(num_tasks);

            let mut batch = TaskBatch {
                tasks: Vec::with_capacity(num_tasks as usize),
            };

            for task_index in 0..num_tasks {
                let last_of_job =
                    client_index == clients.len() - 1 && task_index == num_tasks - 1;
                let task = Task {
                    id: NEXT_TASK_ID.fetch_add(1, Ordering::SeqCst),
                    begin: position,
                    end: if last_of_job {
                        upper
                    } else {
                        position + task_range
                    },
                    step,
                };

                if !task.is_valid() {
                    return Err(PartitionError::InvalidTask {
                        id: task.id,
                        begin: task.begin,
                        end: task.end,
                    });
                }

                position = task.end;
                self.total_tasks += 1;
                batch.tasks.push(task);
            }

            info!(
                client_id,
                tasks = batch.tasks.len(),
                begin = batch.tasks.first().map(|t| t.begin),
                end = batch.tasks.last().map(|t| t.end),
                "worker share"
            );

            batches.insert(client_id, batch);
        }

        info!(total_tasks = self.total_tasks, "partition complete");

        Ok(batches)
    }
}
